//! Integration tests for Layer 3: Runtime backend
//!
//! Tests for compiled games, property setters and script delivery.

mod game;
mod scripts;
mod setters;
