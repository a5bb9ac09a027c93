//! Structural schema model extracted from DDL

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::DeclaredType;

/// A parsed schema - tables keyed by name, in first-appearance order.
///
/// The insertion order is what the forward-reference check runs on: it is
/// the order in which a sequential statement executor would apply the
/// definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub tables: IndexMap<String, Table>,
}

impl Schema {
    pub fn new() -> Self {
        Self {
            tables: IndexMap::new(),
        }
    }

    /// Insert a table. A same-named earlier definition is replaced but
    /// keeps its original position (last definition wins, first-appearance
    /// order is preserved). Returns the replaced definition, if any.
    pub fn add_table(&mut self, table: Table) -> Option<Table> {
        self.tables.insert(table.name.clone(), table)
    }

    /// Position of a table in first-appearance order
    pub fn table_index(&self, name: &str) -> Option<usize> {
        self.tables.get_index_of(name).or_else(|| {
            // Case-insensitive fallback
            self.tables.keys().position(|k| k.eq_ignore_ascii_case(name))
        })
    }

    /// Look up a table by name
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.table_index(name)
            .and_then(|i| self.tables.get_index(i))
            .map(|(_, table)| table)
    }

    /// Check if a table exists
    pub fn table_exists(&self, name: &str) -> bool {
        self.get_table(name).is_some()
    }

    /// Get all table names in first-appearance order
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(|s| s.as_str()).collect()
    }
}

/// A single CREATE TABLE definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    /// Columns in declaration order
    pub columns: IndexMap<String, Column>,
    /// Foreign keys in declaration order
    pub foreign_keys: Vec<ForeignKey>,
    /// Whether the statement said CREATE TABLE IF NOT EXISTS
    pub if_not_exists: bool,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: IndexMap::new(),
            foreign_keys: Vec::new(),
            if_not_exists: false,
        }
    }

    /// Get a column by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        // Case-insensitive lookup
        self.columns
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Check if a column exists
    pub fn column_exists(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Get all column names in declaration order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(|s| s.as_str()).collect()
    }
}

/// A column definition - the name plus the raw uppercased type text,
/// modifiers included (`INT UNSIGNED NOT NULL`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub declared_type: String,
}

impl Column {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }

    /// Normalized view of the declared type, for compatibility checks
    pub fn normalized_type(&self) -> DeclaredType {
        DeclaredType::parse(&self.declared_type)
    }
}

/// A declared foreign key. A declaration, not an enforced constraint:
/// the model only records what the DDL says.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub source_column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_look_up_table() {
        let mut schema = Schema::new();
        schema.add_table(Table::new("users"));

        assert!(schema.table_exists("users"));
        assert!(schema.table_exists("USERS"));
        assert!(!schema.table_exists("orders"));
    }

    #[test]
    fn test_redefinition_keeps_first_position() {
        let mut schema = Schema::new();
        schema.add_table(Table::new("users"));
        schema.add_table(Table::new("orders"));

        let mut replacement = Table::new("users");
        replacement.columns.insert(
            "id".to_string(),
            Column::new("id", "INT UNSIGNED"),
        );
        let previous = schema.add_table(replacement);

        assert!(previous.is_some());
        assert_eq!(schema.table_index("users"), Some(0));
        assert!(schema.get_table("users").unwrap().column_exists("id"));
    }

    #[test]
    fn test_column_lookup_is_case_insensitive() {
        let mut table = Table::new("users");
        table
            .columns
            .insert("id".to_string(), Column::new("id", "INT UNSIGNED"));

        assert!(table.column_exists("ID"));
        assert_eq!(table.column_names(), vec!["id"]);
    }
}
