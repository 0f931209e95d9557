//! Core types, values, and errors for Trogdor.
//!
//! This crate provides:
//! - [`Value`] - Typed values produced by the validator from raw source text
//! - [`EntityType`] - The closed entity type hierarchy and its name table
//! - [`Arity`] - Operation arity rules
//! - [`Error`] - The single error type shared by every compiler phase

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod types;
pub mod value;

pub use error::{Error, ErrorContext, ErrorKind, Result, UnresolvedName};
pub use types::{Arity, EntityType, ValueType};
pub use value::Value;
