//! End-to-end tests: source files in, games out.

mod files;
mod pipeline;
