//! Test fixtures and data generators
//!
//! This module contains builders for raw PSID test files.

pub mod builders;

pub use builders::*;
