//! Schema validator - forward-reference and referential-integrity checks

use crate::error::{Finding, FindingKind};
use crate::schema::{Schema, Table};
use crate::types::TypeCompatibility;

/// Validates a parsed schema and collects findings.
///
/// Findings come out grouped by subject table in first-appearance order;
/// within one table, forward-reference findings precede referential ones.
/// The pass never stops early, so a report is always exhaustive.
pub struct Validator<'a> {
    schema: &'a Schema,
    findings: Vec<Finding>,
}

impl<'a> Validator<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            findings: Vec::new(),
        }
    }

    /// Run all checks and return the findings
    pub fn validate(&mut self) -> Vec<Finding> {
        self.findings.clear();

        for (index, table) in self.schema.tables.values().enumerate() {
            self.check_forward_references(index, table);
            self.check_referential_integrity(table);
        }

        std::mem::take(&mut self.findings)
    }

    /// Flag foreign keys that reference a table defined later in the file.
    /// The check runs against the set of tables defined *before* this one,
    /// not the final set: ordering is the entire point, since a sequential
    /// executor applies statements in file order. Self-references are always
    /// permitted.
    fn check_forward_references(&mut self, index: usize, table: &Table) {
        for fk in &table.foreign_keys {
            if fk.referenced_table.eq_ignore_ascii_case(&table.name) {
                continue;
            }

            match self.schema.table_index(&fk.referenced_table) {
                Some(ref_index) if ref_index < index => {}
                Some(_) => {
                    self.findings.push(
                        Finding::error(
                            FindingKind::ForwardReference,
                            &table.name,
                            format!(
                                "foreign key on '{}.{}' references '{}' before it is defined",
                                table.name, fk.source_column, fk.referenced_table
                            ),
                        )
                        .with_column(&fk.source_column)
                        .with_help(format!(
                            "move the definition of '{}' earlier in the file",
                            fk.referenced_table
                        )),
                    );
                }
                // Never defined at all: the referential pass reports it
                None => {}
            }
        }
    }

    /// Check every foreign key against the fully-populated schema: the
    /// referenced table and column must exist, and integer-family column
    /// pairs must agree on width and signedness.
    fn check_referential_integrity(&mut self, table: &Table) {
        for fk in &table.foreign_keys {
            let Some(referenced) = self.schema.get_table(&fk.referenced_table) else {
                // Soft by choice: at this point the table set is complete,
                // so an unknown name more likely means the referenced
                // statement did not parse than that the schema is broken.
                self.findings.push(
                    Finding::warning(
                        FindingKind::MissingTable,
                        &table.name,
                        format!(
                            "foreign key on '{}.{}' references unknown table '{}'",
                            table.name, fk.source_column, fk.referenced_table
                        ),
                    )
                    .with_column(&fk.source_column)
                    .with_help(
                        "the table may be defined in another file, or its statement may not have parsed",
                    ),
                );
                continue;
            };

            let Some(ref_column) = referenced.get_column(&fk.referenced_column) else {
                self.findings.push(
                    Finding::error(
                        FindingKind::MissingColumn,
                        &table.name,
                        format!(
                            "foreign key on '{}.{}' references '{}.{}', which does not exist",
                            table.name, fk.source_column, fk.referenced_table, fk.referenced_column
                        ),
                    )
                    .with_column(&fk.source_column),
                );
                continue;
            };

            let Some(source_column) = table.get_column(&fk.source_column) else {
                // The FK names a column its own table never declared; the
                // permissive parser may have skipped it, nothing to compare
                tracing::debug!(
                    table = %table.name,
                    column = %fk.source_column,
                    "foreign key source column not in model, type check skipped"
                );
                continue;
            };

            let source_type = source_column.normalized_type();
            let ref_type = ref_column.normalized_type();
            let detail = match source_type.compatibility_with(&ref_type) {
                TypeCompatibility::Compatible | TypeCompatibility::NotChecked => continue,
                TypeCompatibility::SignednessMismatch => "signedness differs",
                TypeCompatibility::WidthMismatch => "integer width differs",
            };

            self.findings.push(
                Finding::error(
                    FindingKind::TypeMismatch,
                    &table.name,
                    format!(
                        "foreign key column '{}.{}' is {} but '{}.{}' is {} ({})",
                        table.name,
                        fk.source_column,
                        source_type.display_name(),
                        fk.referenced_table,
                        fk.referenced_column,
                        ref_type.display_name(),
                        detail
                    ),
                )
                .with_column(&fk.source_column),
            );
        }
    }
}
