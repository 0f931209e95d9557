//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, EntityType, Arity and Error.

mod errors;
mod types;
mod values;
