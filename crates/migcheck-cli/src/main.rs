//! migcheck CLI - static consistency checker for SQL migration files
//!
//! Exit codes: 0 when no error-severity findings were produced (warnings
//! alone do not fail a run), 1 when at least one error finding exists,
//! 2 on fatal problems such as an unreadable input file.

mod args;
mod config;
mod output;

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use migcheck_core::{SchemaParser, Severity, Validator};

use crate::args::{Args, Command, OutputFormat};
use crate::config::Config;
use crate::output::ReportFormatter;

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let quiet = args.quiet;

    match args.command {
        Command::Check {
            files,
            config: config_path,
            output,
            format,
            disable,
        } => {
            // Load configuration
            let config = if let Some(path) = config_path {
                Config::from_file(&path)?
            } else {
                // Try to find migcheck.toml
                Config::find_and_load()?.unwrap_or_default()
            };

            // Merge CLI args with config (CLI takes precedence)
            let config = config.merge_with_args(&files, &format, &output, &disable);

            // Expand glob patterns into the schema file list
            let mut schema_files: Vec<std::path::PathBuf> = Vec::new();
            for pattern in &config.files {
                if pattern.contains('*') {
                    for path in glob::glob(pattern).into_diagnostic()?.flatten() {
                        schema_files.push(path);
                    }
                } else {
                    schema_files.push(std::path::PathBuf::from(pattern));
                }
            }
            // Migration files apply in name order; report in the same order
            schema_files.sort();

            if schema_files.is_empty() {
                miette::bail!(
                    "No schema files specified. Pass file paths or configure them in migcheck.toml"
                );
            }

            // Determine output format
            let output_format = if let Some(fmt_str) = &config.format {
                match fmt_str.as_str() {
                    "json" => OutputFormat::Json,
                    "sarif" => OutputFormat::Sarif,
                    _ => OutputFormat::Human,
                }
            } else {
                OutputFormat::Human
            };

            // Get disabled rules
            let disabled_rules: std::collections::HashSet<String> =
                config.disable.iter().cloned().collect();

            let to_stdout = config.output.is_none();
            let mut report = String::new();
            let mut total_errors = 0;
            let mut total_warnings = 0;

            for schema_file in &schema_files {
                // Each file is an independent schema: parse, validate, report
                let (schema, mut findings) =
                    SchemaParser::parse_file(schema_file).map_err(miette::Report::new)?;
                let mut validator = Validator::new(&schema);
                findings.extend(validator.validate());

                // Filter out disabled rules
                let filtered_findings: Vec<_> = findings
                    .into_iter()
                    .filter(|f| !disabled_rules.contains(f.code()))
                    .collect();

                for finding in &filtered_findings {
                    match finding.severity {
                        Severity::Error => total_errors += 1,
                        Severity::Warning => total_warnings += 1,
                    }
                }

                let formatter =
                    ReportFormatter::new(output_format, schema_file.display().to_string())
                        .with_color(to_stdout && output_format == OutputFormat::Human);
                report.push_str(&formatter.render(&filtered_findings));
            }

            // Deliver the report to stdout or the configured destination
            if let Some(path) = &config.output {
                fs::write(path, &report).into_diagnostic()?;
            } else {
                print!("{report}");
            }

            // Print summary
            if !quiet {
                if total_errors > 0 || total_warnings > 0 {
                    eprintln!();
                    eprintln!(
                        "Found {} error(s), {} warning(s) in {} file(s)",
                        total_errors,
                        total_warnings,
                        schema_files.len()
                    );
                } else {
                    eprintln!("All {} file(s) passed validation", schema_files.len());
                }
            }

            Ok(total_errors > 0)
        }

        Command::Schema { files } => {
            // Parse and display the structural model
            println!("Schema Information:");
            println!("==================");

            for schema_file in &files {
                let (schema, _) =
                    SchemaParser::parse_file(schema_file).map_err(miette::Report::new)?;

                println!("\nFile: {}", schema_file.display());
                for (table_name, table) in &schema.tables {
                    println!("  Table: {}", table_name);
                    for (col_name, col) in &table.columns {
                        println!("    - {} {}", col_name, col.declared_type);
                    }
                    for fk in &table.foreign_keys {
                        println!(
                            "    FK: {} -> {}.{}",
                            fk.source_column, fk.referenced_table, fk.referenced_column
                        );
                    }
                }
            }

            Ok(false)
        }
    }
}
