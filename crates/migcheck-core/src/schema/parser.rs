//! DDL parser - extracts a structural model from raw schema text
//!
//! Deliberately permissive: only CREATE TABLE statements are examined, and
//! within them only column definitions and single-column FOREIGN KEY
//! declarations. Every other statement and clause is skipped without error,
//! and one damaged statement never aborts analysis of the rest of the file.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Finding, FindingKind, SchemaError};
use crate::schema::{Column, ForeignKey, Schema, Table};

/// CREATE TABLE header, optionally quoted identifier
static CREATE_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)^\s*CREATE\s+TABLE\s+(IF\s+NOT\s+EXISTS\s+)?[`"]?(\w+)[`"]?"#)
        .expect("hardcoded regex is valid")
});

/// Out-of-line foreign key clause, optionally named via CONSTRAINT
static FOREIGN_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)^(?:CONSTRAINT\s+[`"]?\w+[`"]?\s+)?FOREIGN\s+KEY\s*\(\s*[`"]?(\w+)[`"]?\s*\)\s*REFERENCES\s+[`"]?(\w+)[`"]?\s*\(\s*[`"]?(\w+)[`"]?\s*\)"#,
    )
    .expect("hardcoded regex is valid")
});

/// Inline REFERENCES on a column clause
static INLINE_REFERENCES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bREFERENCES\s+[`"]?(\w+)[`"]?\s*\(\s*[`"]?(\w+)[`"]?\s*\)"#)
        .expect("hardcoded regex is valid")
});

/// Column clause: identifier followed by its type text
static COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)^[`"]?(\w+)[`"]?\s+(.+)$"#).expect("hardcoded regex is valid")
});

/// Clause-leading keywords that mark constraint clauses, which carry no
/// structure this model tracks
const CONSTRAINT_KEYWORDS: &[&str] = &[
    "CONSTRAINT", "PRIMARY", "FOREIGN", "UNIQUE", "KEY", "INDEX", "CHECK", "FULLTEXT", "SPATIAL",
];

/// Parser for building a Schema from raw DDL text
pub struct SchemaParser {
    schema: Schema,
    findings: Vec<Finding>,
}

impl SchemaParser {
    pub fn new() -> Self {
        Self {
            schema: Schema::new(),
            findings: Vec::new(),
        }
    }

    /// Read and parse a schema file in one step
    pub fn parse_file(path: impl AsRef<Path>) -> Result<(Schema, Vec<Finding>), SchemaError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let sql = String::from_utf8(bytes).map_err(|_| SchemaError::NotUtf8 {
            path: path.display().to_string(),
        })?;

        let mut parser = Self::new();
        parser.parse(&sql);
        Ok(parser.build())
    }

    /// Parse schema text, accumulating tables and parse-time findings.
    /// Comments are removed before statement splitting because their
    /// content may contain `;` or parentheses.
    pub fn parse(&mut self, sql: &str) {
        let stripped = strip_comments(sql);
        for stmt in split_statements(&stripped) {
            self.process_statement(stmt);
        }
    }

    /// Consume the parser and return the model plus parse-time findings
    pub fn build(self) -> (Schema, Vec<Finding>) {
        (self.schema, self.findings)
    }

    /// Get a reference to the schema built so far
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    fn process_statement(&mut self, stmt: &str) {
        let Some(caps) = CREATE_TABLE.captures(stmt) else {
            // Other DDL/DML is not this parser's concern
            return;
        };
        let if_not_exists = caps.get(1).is_some();
        let name = caps[2].to_string();
        let header_end = caps.get(0).map_or(0, |m| m.end());

        let Some(body) = extract_body(&stmt[header_end..]) else {
            tracing::debug!(table = %name, "unbalanced CREATE TABLE body, statement skipped");
            return;
        };

        let mut table = Table::new(&name);
        table.if_not_exists = if_not_exists;
        for clause in split_clauses(body) {
            self.process_clause(&mut table, clause);
        }

        if self.schema.add_table(table).is_some() {
            let message = format!("table '{name}' is defined more than once");
            let finding = if if_not_exists {
                Finding::warning(FindingKind::DuplicateTable, &name, message).with_help(
                    "IF NOT EXISTS makes the later statement a no-op against an existing database",
                )
            } else {
                Finding::error(FindingKind::DuplicateTable, &name, message)
                    .with_help("the later definition silently shadows the earlier one")
            };
            self.findings.push(finding);
        }
    }

    fn process_clause(&mut self, table: &mut Table, clause: &str) {
        let clause = clause.trim();
        if clause.is_empty() {
            return;
        }

        // A clause is a foreign key or a column, never both
        if let Some(caps) = FOREIGN_KEY.captures(clause) {
            table.foreign_keys.push(ForeignKey {
                source_column: caps[1].to_string(),
                referenced_table: caps[2].to_string(),
                referenced_column: caps[3].to_string(),
            });
            return;
        }

        if is_constraint_clause(clause) {
            return;
        }

        let Some(caps) = COLUMN.captures(clause) else {
            tracing::debug!(table = %table.name, clause, "unrecognized clause skipped");
            return;
        };
        let col_name = caps[1].to_string();
        let declared_type = normalize_type_text(&caps[2]);

        if let Some(refs) = INLINE_REFERENCES.captures(clause) {
            table.foreign_keys.push(ForeignKey {
                source_column: col_name.clone(),
                referenced_table: refs[1].to_string(),
                referenced_column: refs[2].to_string(),
            });
        }

        table
            .columns
            .insert(col_name.clone(), Column::new(col_name, declared_type));
    }
}

impl Default for SchemaParser {
    fn default() -> Self {
        Self::new()
    }
}

/// True when the clause opens with a constraint keyword. A backtick- or
/// double-quote-led clause is always a column: quoting marks an identifier,
/// so a column named `key` is not mistaken for an index clause.
fn is_constraint_clause(clause: &str) -> bool {
    if clause.starts_with('`') || clause.starts_with('"') {
        return false;
    }
    let first = clause.split_whitespace().next().unwrap_or("");
    CONSTRAINT_KEYWORDS
        .iter()
        .any(|kw| first.eq_ignore_ascii_case(kw))
}

/// Uppercase and collapse runs of whitespace so declared types compare
/// stably regardless of source formatting
fn normalize_type_text(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

/// Remove `--` line comments and `/* ... */` block comments. Single-quoted
/// strings are copied verbatim so quote content is never mistaken for a
/// comment delimiter. Line comments keep their trailing newline; block
/// comments collapse to a single space so tokens stay separated.
fn strip_comments(sql: &str) -> String {
    let bytes = sql.as_bytes();
    let len = bytes.len();
    let mut out = String::with_capacity(len);
    let mut seg_start = 0;
    let mut i = 0;

    while i < len {
        match bytes[i] {
            b'\'' => {
                i = skip_quoted(bytes, i);
            }
            b'-' if i + 1 < len && bytes[i + 1] == b'-' => {
                out.push_str(&sql[seg_start..i]);
                while i < len && bytes[i] != b'\n' {
                    i += 1;
                }
                seg_start = i;
            }
            b'/' if i + 1 < len && bytes[i + 1] == b'*' => {
                out.push_str(&sql[seg_start..i]);
                out.push(' ');
                i += 2;
                loop {
                    if i + 1 >= len {
                        i = len; // unterminated block comment consumes the rest
                        break;
                    }
                    if bytes[i] == b'*' && bytes[i + 1] == b'/' {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
                seg_start = i;
            }
            _ => {
                i += 1;
            }
        }
    }

    out.push_str(&sql[seg_start..]);
    out
}

/// Split comment-free SQL into statements on `;`, honoring single-quoted
/// strings. Blank statements are dropped.
fn split_statements(sql: &str) -> Vec<&str> {
    let bytes = sql.as_bytes();
    let len = bytes.len();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < len {
        match bytes[i] {
            b'\'' => {
                i = skip_quoted(bytes, i);
            }
            b';' => {
                let stmt = &sql[start..i];
                if !stmt.trim().is_empty() {
                    statements.push(stmt);
                }
                start = i + 1;
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    // Last statement, without trailing semicolon
    let last = &sql[start..];
    if !last.trim().is_empty() {
        statements.push(last);
    }

    statements
}

/// Extract the parenthesized body following a CREATE TABLE header.
///
/// Walks the text tracking nesting depth, so type arguments like
/// `DECIMAL(10,2)` cannot terminate the body early. Returns None when the
/// parentheses never balance; the caller skips just that statement.
fn extract_body(rest: &str) -> Option<&str> {
    let bytes = rest.as_bytes();
    let len = bytes.len();
    let open = rest.find('(')?;
    let mut depth = 0usize;
    let mut i = open;

    while i < len {
        match bytes[i] {
            b'\'' => {
                i = skip_quoted(bytes, i);
            }
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&rest[open + 1..i]);
                }
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    None
}

/// Split a table body into clauses at depth-zero commas only, so a comma
/// inside `DECIMAL(10,2)` or an ENUM value list never starts a new clause
fn split_clauses(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let len = bytes.len();
    let mut clauses = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut i = 0;

    while i < len {
        match bytes[i] {
            b'\'' => {
                i = skip_quoted(bytes, i);
            }
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            b',' if depth == 0 => {
                clauses.push(&body[start..i]);
                start = i + 1;
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    clauses.push(&body[start..]);
    clauses
}

/// Advance past a single-quoted string starting at `i`, treating `''` as an
/// escaped quote. Returns the index just past the closing quote.
fn skip_quoted(bytes: &[u8], mut i: usize) -> usize {
    i += 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            i += 1;
            if i < bytes.len() && bytes[i] == b'\'' {
                i += 1; // escaped quote ''
            } else {
                break;
            }
        } else {
            i += 1;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> (Schema, Vec<Finding>) {
        let mut parser = SchemaParser::new();
        parser.parse(sql);
        parser.build()
    }

    #[test]
    fn test_parse_simple_table() {
        let sql = r#"
            CREATE TABLE users (
                id INT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                email VARCHAR(255)
            );
        "#;

        let (schema, findings) = parse(sql);
        assert!(findings.is_empty());

        let table = schema.get_table("users").unwrap();
        assert_eq!(table.column_names(), vec!["id", "name", "email"]);
        assert_eq!(
            table.get_column("id").unwrap().declared_type,
            "INT UNSIGNED AUTO_INCREMENT PRIMARY KEY"
        );
    }

    #[test]
    fn test_comments_are_stripped_before_splitting() {
        let sql = r#"
            -- leading comment with a stray ; and ( in it
            CREATE TABLE users (
                id INT UNSIGNED, -- trailing comment )
                /* block comment,
                   spanning lines ( ; */
                name VARCHAR(50)
            );
        "#;

        let (schema, _) = parse(sql);
        let table = schema.get_table("users").unwrap();
        assert_eq!(table.column_names(), vec!["id", "name"]);
    }

    #[test]
    fn test_nested_parens_do_not_split_columns() {
        let sql = "CREATE TABLE products (price DECIMAL(10,2) NOT NULL, qty INT);";

        let (schema, _) = parse(sql);
        let table = schema.get_table("products").unwrap();
        assert_eq!(table.column_names(), vec!["price", "qty"]);
        assert_eq!(
            table.get_column("price").unwrap().declared_type,
            "DECIMAL(10,2) NOT NULL"
        );
    }

    #[test]
    fn test_out_of_line_foreign_keys() {
        let sql = r#"
            CREATE TABLE order_items (
                id INT UNSIGNED PRIMARY KEY,
                order_id INT UNSIGNED,
                FOREIGN KEY (order_id) REFERENCES orders(id),
                CONSTRAINT fk_user FOREIGN KEY (`user_id`) REFERENCES `users` (`id`)
            );
        "#;

        let (schema, _) = parse(sql);
        let table = schema.get_table("order_items").unwrap();
        assert_eq!(table.foreign_keys.len(), 2);
        assert_eq!(table.foreign_keys[0].source_column, "order_id");
        assert_eq!(table.foreign_keys[0].referenced_table, "orders");
        assert_eq!(table.foreign_keys[1].referenced_table, "users");
        assert_eq!(table.foreign_keys[1].referenced_column, "id");
        // the FK clauses themselves are not columns
        assert_eq!(table.column_names(), vec!["id", "order_id"]);
    }

    #[test]
    fn test_inline_references_registers_a_foreign_key() {
        let sql = "CREATE TABLE posts (id INT, author_id INT REFERENCES users(id));";

        let (schema, _) = parse(sql);
        let table = schema.get_table("posts").unwrap();
        assert_eq!(table.foreign_keys.len(), 1);
        assert_eq!(table.foreign_keys[0].source_column, "author_id");
        assert_eq!(table.foreign_keys[0].referenced_table, "users");
        assert!(table.column_exists("author_id"));
    }

    #[test]
    fn test_constraint_clauses_are_skipped() {
        let sql = r#"
            CREATE TABLE t (
                a INT,
                b INT,
                PRIMARY KEY (a, b),
                UNIQUE KEY uq_b (b),
                KEY idx_a (a),
                CHECK (a > 0)
            );
        "#;

        let (schema, _) = parse(sql);
        let table = schema.get_table("t").unwrap();
        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert!(table.foreign_keys.is_empty());
    }

    #[test]
    fn test_quoted_identifier_is_not_a_keyword() {
        let sql = "CREATE TABLE t (`key` VARCHAR(64) NOT NULL, a INT);";

        let (schema, _) = parse(sql);
        let table = schema.get_table("t").unwrap();
        assert!(table.column_exists("key"));
        assert_eq!(table.columns.len(), 2);
    }

    #[test]
    fn test_unbalanced_statement_is_skipped_not_fatal() {
        let sql = r#"
            CREATE TABLE broken (id INT, name VARCHAR(10;
            CREATE TABLE fine (id INT);
        "#;

        let (schema, _) = parse(sql);
        assert!(!schema.table_exists("broken"));
        assert!(schema.table_exists("fine"));
    }

    #[test]
    fn test_other_statements_are_ignored() {
        let sql = r#"
            DROP TABLE IF EXISTS old_stuff;
            CREATE TABLE users (id INT);
            INSERT INTO users (id) VALUES (1);
            ALTER TABLE users ADD COLUMN name VARCHAR(20);
        "#;

        let (schema, _) = parse(sql);
        assert_eq!(schema.table_names(), vec!["users"]);
        // the parser does not model ALTER TABLE
        assert_eq!(schema.get_table("users").unwrap().column_names(), vec!["id"]);
    }

    #[test]
    fn test_duplicate_definition_without_guard_is_an_error() {
        let sql = r#"
            CREATE TABLE users (id INT);
            CREATE TABLE users (id INT, name VARCHAR(10));
        "#;

        let (schema, findings) = parse(sql);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::DuplicateTable);
        assert_eq!(findings[0].severity, crate::error::Severity::Error);
        // last definition wins
        assert!(schema.get_table("users").unwrap().column_exists("name"));
    }

    #[test]
    fn test_duplicate_definition_with_guard_is_a_warning() {
        let sql = r#"
            CREATE TABLE users (id INT);
            CREATE TABLE IF NOT EXISTS users (id INT);
        "#;

        let (_, findings) = parse(sql);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, crate::error::Severity::Warning);
    }

    #[test]
    fn test_if_not_exists_header_variants() {
        let sql = "CREATE TABLE IF NOT EXISTS `logs` (id BIGINT UNSIGNED);";

        let (schema, _) = parse(sql);
        let table = schema.get_table("logs").unwrap();
        assert!(table.if_not_exists);
        assert!(table.column_exists("id"));
    }

    #[test]
    fn test_quoted_string_content_is_inert() {
        let sql = "CREATE TABLE t (note VARCHAR(50) DEFAULT 'semi; colon -- and (paren', a INT);";

        let (schema, _) = parse(sql);
        let table = schema.get_table("t").unwrap();
        assert_eq!(table.column_names(), vec!["note", "a"]);
    }
}
