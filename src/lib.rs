//! tabledb - a small line-oriented table database
//!
//! This crate provides:
//! - A constrained command language (parser, AST)
//! - Typed tables with an auto-increment ID column
//! - Statement execution with a select result cache
//! - JSON document storage with atomic writes
//! - A dispatch shell for interactive use

pub mod config;
pub mod error;
pub mod shell;
pub mod sql;
pub mod storage;
