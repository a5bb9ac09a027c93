//! migcheck-core: static analysis of SQL migration DDL
//!
//! This library provides the core functionality for checking schema
//! definition files for structural consistency - foreign key ordering,
//! referential integrity, and integer type compatibility - without
//! requiring a database connection.

pub mod analyzer;
pub mod error;
pub mod schema;
pub mod types;

pub use analyzer::Validator;
pub use error::{Finding, FindingKind, SchemaError, Severity};
pub use schema::{Column, ForeignKey, Schema, SchemaParser, Table};
pub use types::{DeclaredType, IntWidth, TypeCompatibility};
