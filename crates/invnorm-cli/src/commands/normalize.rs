//! Normalize command - run the pipeline on a single extraction payload.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::{debug, info};

use invnorm_core::{CanonicalInvoice, InMemoryMappingStore, process};

/// Arguments for the normalize command.
#[derive(Args)]
pub struct NormalizeArgs {
    /// Input extraction payload (JSON)
    #[arg(required = true)]
    input: PathBuf,

    /// Original invoice file name (default: the input file name)
    #[arg(long)]
    file_name: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: NormalizeArgs, mappings_path: Option<&Path>) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let store = load_store(mappings_path)?;
    let invoice = normalize_file(&args.input, args.file_name.as_deref(), &store)?;

    if let Some(error) = &invoice.error {
        eprintln!(
            "{} Payload was unusable: {}",
            style("⚠").yellow(),
            error
        );
    }

    let output = format_invoice(&invoice, args.format, args.pretty)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Load the vendor mapping store, empty when no file was given.
pub fn load_store(path: Option<&Path>) -> anyhow::Result<InMemoryMappingStore> {
    match path {
        Some(path) => {
            let store = InMemoryMappingStore::from_json_file(path)
                .map_err(|e| anyhow::anyhow!("Failed to load mappings from {}: {}", path.display(), e))?;
            info!("Loaded {} vendor mappings from {}", store.records().len(), path.display());
            Ok(store)
        }
        None => {
            debug!("No mappings file given, using default mapping only");
            Ok(InMemoryMappingStore::new())
        }
    }
}

pub fn normalize_file(
    path: &Path,
    file_name: Option<&str>,
    store: &InMemoryMappingStore,
) -> anyhow::Result<CanonicalInvoice> {
    let content = fs::read_to_string(path)?;
    let raw: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("{} is not valid JSON: {}", path.display(), e))?;

    let file_name = match file_name {
        Some(name) => name.to_string(),
        None => path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("invoice")
            .to_string(),
    };

    debug!("Normalizing {} as {}", path.display(), file_name);
    Ok(process(&raw, &file_name, store))
}

pub fn format_invoice(
    invoice: &CanonicalInvoice,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            if pretty {
                Ok(serde_json::to_string_pretty(invoice)?)
            } else {
                Ok(serde_json::to_string(invoice)?)
            }
        }
        OutputFormat::Csv => format_csv(invoice),
        OutputFormat::Text => Ok(format_text(invoice)),
    }
}

/// One row per line item with the invoice header repeated; a single
/// row when the invoice has no items.
pub fn format_csv(invoice: &CanonicalInvoice) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "vendor_name",
        "invoice_number",
        "invoice_date",
        "due_date",
        "total_amount",
        "description",
        "project_number",
        "project_name",
        "activity_code",
        "quantity",
        "unit_price",
        "amount",
        "tax",
    ])?;

    let header = [
        invoice.vendor_name.clone().unwrap_or_default(),
        invoice.invoice_number.clone().unwrap_or_default(),
        invoice.invoice_date.clone().unwrap_or_default(),
        invoice.due_date.clone().unwrap_or_default(),
        invoice.total_amount.to_string(),
    ];

    if invoice.line_items.is_empty() {
        let mut record = header.to_vec();
        record.extend(std::iter::repeat_n(String::new(), 8));
        wtr.write_record(&record)?;
    } else {
        for item in &invoice.line_items {
            let mut record = header.to_vec();
            record.extend([
                item.description.clone(),
                item.project_number.clone(),
                item.project_name.clone(),
                item.activity_code.clone(),
                item.quantity.to_string(),
                item.unit_price.to_string(),
                item.amount.to_string(),
                item.tax.to_string(),
            ]);
            wtr.write_record(&record)?;
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub fn format_text(invoice: &CanonicalInvoice) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Vendor:  {}\n",
        invoice.vendor_name.as_deref().unwrap_or("(unknown)")
    ));
    output.push_str(&format!(
        "Invoice: {}\n",
        invoice.invoice_number.as_deref().unwrap_or("(none)")
    ));
    if let Some(date) = &invoice.invoice_date {
        output.push_str(&format!("Date:    {}\n", date));
    }
    if let Some(due) = &invoice.due_date {
        output.push_str(&format!("Due:     {}\n", due));
    }
    output.push_str(&format!("Total:   {:.2}\n", invoice.total_amount));

    if !invoice.line_items.is_empty() {
        output.push_str("\nLine items:\n");
        for item in &invoice.line_items {
            output.push_str(&format!(
                "  - {} (qty {}, unit {:.2}, amount {:.2})\n",
                item.description, item.quantity, item.unit_price, item.amount
            ));
            if !item.project_number.is_empty() {
                output.push_str(&format!("    project: {}\n", item.project_number));
            }
            if !item.activity_code.is_empty() {
                output.push_str(&format!("    activity: {}\n", item.activity_code));
            }
        }
    }

    if let Some(error) = &invoice.error {
        output.push_str(&format!("\nError: {}\n", error));
    }

    output
}
