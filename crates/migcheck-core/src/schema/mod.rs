//! Schema model and DDL parser

mod model;
mod parser;

pub use model::{Column, ForeignKey, Schema, Table};
pub use parser::SchemaParser;
