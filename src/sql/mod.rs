//! Command processing module
//!
//! This module provides:
//! - `parser`: command lexer and parser
//! - `types`: column types and values
//! - `schema`: table and column schema definitions
//! - `cache`: select result cache
//! - `executor`: statement execution
//! - `engine`: schema and data access, sessions

pub mod cache;
pub mod engine;
pub mod executor;
pub mod parser;
pub mod schema;
pub mod types;
