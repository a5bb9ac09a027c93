//! Finding and error types

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Finding severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single structural inconsistency reported for a schema file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    /// Table the finding is about
    pub table: String,
    /// Column the finding is about, when one applies
    pub column: Option<String>,
    pub message: String,
    pub help: Option<String>,
}

impl Finding {
    pub fn error(kind: FindingKind, table: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            table: table.into(),
            column: None,
            message: message.into(),
            help: None,
        }
    }

    pub fn warning(
        kind: FindingKind,
        table: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            table: table.into(),
            column: None,
            message: message.into(),
            help: None,
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Get the rule code string (e.g., "E0001")
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

/// Kinds of findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingKind {
    /// E0001: Foreign key references a table defined later in the file
    ForwardReference,
    /// E0002: Foreign key references a table that is never defined
    MissingTable,
    /// E0003: Foreign key references a column absent from the target table
    MissingColumn,
    /// E0004: Foreign key column type incompatible with the referenced column
    TypeMismatch,
    /// E0005: Table defined more than once in the same file
    DuplicateTable,
}

impl FindingKind {
    pub fn code(&self) -> &'static str {
        match self {
            FindingKind::ForwardReference => "E0001",
            FindingKind::MissingTable => "E0002",
            FindingKind::MissingColumn => "E0003",
            FindingKind::TypeMismatch => "E0004",
            FindingKind::DuplicateTable => "E0005",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FindingKind::ForwardReference => "forward-reference",
            FindingKind::MissingTable => "missing-table",
            FindingKind::MissingColumn => "missing-column",
            FindingKind::TypeMismatch => "type-mismatch",
            FindingKind::DuplicateTable => "duplicate-table",
        }
    }
}

/// Fatal error while loading schema input. Findings are data, not errors;
/// this type covers the cases where no report can be produced at all.
#[derive(Debug, Error, Diagnostic)]
pub enum SchemaError {
    #[error("failed to read schema file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("schema file '{path}' is not valid UTF-8")]
    #[diagnostic(help("re-encode the file as UTF-8 before checking it"))]
    NotUtf8 { path: String },
}
