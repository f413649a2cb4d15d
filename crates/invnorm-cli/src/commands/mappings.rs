//! Mappings command - inspect and validate vendor mappings.

use std::path::Path;

use clap::{Args, Subcommand};
use console::style;

use invnorm_core::{DEFAULT_MAPPING, FieldMapping, InMemoryMappingStore};

use super::normalize::load_store;

/// Arguments for the mappings command.
#[derive(Args)]
pub struct MappingsArgs {
    #[command(subcommand)]
    command: MappingsCommand,
}

#[derive(Subcommand)]
enum MappingsCommand {
    /// List stored vendor mappings
    List,

    /// Validate stored vendor mappings
    Validate,

    /// Show the built-in default mapping
    Default,
}

pub fn run(args: MappingsArgs, mappings_path: Option<&Path>) -> anyhow::Result<()> {
    match args.command {
        MappingsCommand::List => list(&load_store(mappings_path)?),
        MappingsCommand::Validate => validate(&load_store(mappings_path)?),
        MappingsCommand::Default => show_default(),
    }
}

fn list(store: &InMemoryMappingStore) -> anyhow::Result<()> {
    if store.records().is_empty() {
        println!(
            "{} No vendor mappings loaded, only the default mapping applies.",
            style("ℹ").blue()
        );
        return Ok(());
    }

    for record in store.records() {
        let status = if record.is_active {
            style("active").green()
        } else {
            style("inactive").red()
        };

        let detail = match FieldMapping::from_json(
            &record.field_mappings,
            record.regex_patterns.as_deref(),
        ) {
            Ok(mapping) => format!(
                "{} header fields, {} line item fields, {} patterns",
                mapping.field_mappings.len(),
                mapping.line_items.len(),
                mapping.regex_patterns.len()
            ),
            Err(_) => style("invalid").red().to_string(),
        };

        println!("{} [{}] {}", record.vendor_name, status, detail);
    }

    Ok(())
}

/// Report configuration problems per record. Validation itself always
/// succeeds; a broken mapping means the vendor silently falls back to
/// the default at runtime, which is exactly what this surfaces.
fn validate(store: &InMemoryMappingStore) -> anyhow::Result<()> {
    let mut problems = 0usize;

    for record in store.records() {
        match FieldMapping::from_json(&record.field_mappings, record.regex_patterns.as_deref()) {
            Ok(mapping) => {
                let unknown = unknown_targets(&mapping);
                if unknown.is_empty() {
                    println!("{} {}", style("✓").green(), record.vendor_name);
                } else {
                    println!(
                        "{} {}: unknown targets (ignored at runtime): {}",
                        style("⚠").yellow(),
                        record.vendor_name,
                        unknown.join(", ")
                    );
                }
            }
            Err(e) => {
                problems += 1;
                println!(
                    "{} {}: {} (falls back to default mapping)",
                    style("✗").red(),
                    record.vendor_name,
                    e
                );
            }
        }
    }

    println!();
    if problems == 0 {
        println!("{} All mappings parse.", style("✓").green());
    } else {
        println!(
            "{} {} mapping(s) will fall back to the default at runtime.",
            style("⚠").yellow(),
            problems
        );
    }

    Ok(())
}

/// Mapping targets with no canonical counterpart.
fn unknown_targets(mapping: &FieldMapping) -> Vec<String> {
    let mut unknown = Vec::new();

    for target in mapping.field_mappings.keys() {
        if !DEFAULT_MAPPING.field_mappings.contains_key(target) {
            unknown.push(target.clone());
        }
    }
    for target in mapping.line_items.keys() {
        if !DEFAULT_MAPPING.line_items.contains_key(target) {
            unknown.push(format!("line_items.{}", target));
        }
    }
    // Regex backfill only ever writes the string line-item fields.
    for target in mapping.regex_patterns.keys() {
        if !matches!(target.as_str(), "project_number" | "project_name" | "activity_code") {
            unknown.push(format!("regex_patterns.{}", target));
        }
    }

    unknown
}

fn show_default() -> anyhow::Result<()> {
    println!("Header fields:");
    for (target, candidates) in &DEFAULT_MAPPING.field_mappings {
        println!("  {}: {}", target, candidates.join(", "));
    }

    println!("\nLine item fields:");
    for (target, candidates) in &DEFAULT_MAPPING.line_items {
        println!("  {}: {}", target, candidates.join(", "));
    }

    println!("\nRegex patterns:");
    for (target, pattern) in &DEFAULT_MAPPING.regex_patterns {
        println!("  {}: {}", target, pattern.as_str());
    }

    Ok(())
}
