mod config;
mod error;
mod layout;
mod pdf;
mod receipt;
mod store;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

use crate::config::{
    config_dir, load_config, load_services, load_state, resolve_output_dir, save_state, Config,
    CONFIG_TEMPLATE, SERVICES_TEMPLATE,
};
use crate::error::{ReceiptError, Result};
use crate::layout::{compute_layout, HeightPolicy, PageFormat, ReceiptStyle, WordsBasis};
use crate::receipt::{
    amount_to_words, coerce_amount, day_key, format_invoice_number, InvoiceRecord, LineItem,
    LogoBlock,
};
use crate::store::{open_store, RecordStore};

#[derive(Parser)]
#[command(name = "receipt")]
#[command(version, about = "Thermal receipt generator for clinic invoices", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.receipt or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with template files
    Init,

    /// Generate a new receipt
    Generate {
        /// Name of the payer (patient or doctor)
        #[arg(short, long)]
        payer: String,

        /// Items: a service id from services.toml, or 'Label:Amount' (can be repeated)
        #[arg(short, long, value_name = "SERVICE|LABEL:AMOUNT")]
        item: Vec<String>,

        /// Invoice date shown on the receipt (default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// Declared total overriding the item sum on the rupees row
        #[arg(short, long)]
        total: Option<f64>,

        /// Custom output file path (default: output_dir/INV-XXXXXXXX-XXX.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Send the receipt straight to the system printer (best effort)
        #[arg(long)]
        print: bool,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// List billable services from services.toml
    Services,

    /// List stored invoices
    List {
        /// Number of invoices to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show next invoice number and config summary
    Status,

    /// Re-render a receipt PDF from the stored record
    Regenerate {
        /// Invoice number or index from 'list' (e.g., 1 or INV-20240101-001)
        invoice: String,

        /// Open regenerated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Replace a stored invoice's line items and re-render
    Edit {
        /// Invoice number or index from 'list'
        invoice: String,

        /// New items (replaces existing), same format as generate
        #[arg(short, long, value_name = "SERVICE|LABEL:AMOUNT")]
        item: Vec<String>,
    },

    /// Open a receipt PDF
    Open {
        /// Invoice number or index from 'list'
        invoice: String,
    },

    /// Print a rupee amount in words (Indian grouping)
    Words {
        /// Amount in rupees
        amount: f64,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Generate {
            payer,
            item,
            date,
            total,
            output,
            print,
            open,
        } => cmd_generate(&cfg_dir, &payer, &item, date, total, output, print, open),
        Commands::Services => cmd_services(&cfg_dir),
        Commands::List { limit } => cmd_list(&cfg_dir, limit),
        Commands::Status => cmd_status(&cfg_dir),
        Commands::Regenerate { invoice, open } => cmd_regenerate(&cfg_dir, &invoice, open),
        Commands::Edit { invoice, item } => cmd_edit(&cfg_dir, &invoice, &item),
        Commands::Open { invoice } => cmd_open(&cfg_dir, &invoice),
        Commands::Words { amount } => {
            println!("{}", amount_to_words(amount));
            Ok(())
        }
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &PathBuf) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(ReceiptError::AlreadyInitialized(cfg_dir.clone()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;

    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(cfg_dir.join("services.toml"), SERVICES_TEMPLATE)?;

    println!("Initialized receipt config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your clinic details:   $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!(
        "  2. Configure billable services: $EDITOR {}/services.toml",
        cfg_dir.display()
    );
    println!();
    println!("Then generate your first receipt:");
    println!("  receipt generate --payer \"Patient Name\" --item consultation");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "LABEL")]
    label: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "PAYER")]
    payer: String,
    #[tabled(rename = "TOTAL")]
    total: String,
}

/// List billable services
fn cmd_services(cfg_dir: &PathBuf) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(ReceiptError::ConfigNotFound(cfg_dir.clone()));
    }

    let services = load_services(cfg_dir)?;

    if services.is_empty() {
        println!("No services configured.");
        println!("Add services to: {}/services.toml", cfg_dir.display());
        return Ok(());
    }

    let mut sorted: Vec<_> = services.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    let rows: Vec<ServiceRow> = sorted
        .iter()
        .map(|(id, service)| ServiceRow {
            id: id.to_string(),
            label: service.label.clone(),
            amount: format!("Rs {:.2}", service.amount),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Show next invoice number and config summary
fn cmd_status(cfg_dir: &PathBuf) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(ReceiptError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let services = load_services(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    let today = Local::now().date_naive();
    let key = day_key(today);
    let next_number = format_invoice_number(today, state.counter.peek(&key));

    println!("Receipt Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Clinic:           {}", config.clinic.name);
    println!(
        "Page:             {}mm wide, {} height",
        config.receipt.page_width_mm, config.receipt.height_policy
    );
    println!("Store backend:    {}", config.store.backend);
    println!("Services:         {}", services.len());
    println!("Next invoice:     {}", next_number);

    Ok(())
}

/// Parse one --item input: either a catalog id or 'Label:Amount'.
/// Malformed amounts coerce to zero by policy; unknown catalog ids are
/// an input error.
fn parse_item_input(
    input: &str,
    services: &std::collections::HashMap<String, config::Service>,
) -> Result<LineItem> {
    if let Some((label, amount)) = input.rsplit_once(':') {
        let label = label.trim();
        return Ok(LineItem {
            label: if label.is_empty() { "Other" } else { label }.to_string(),
            amount: coerce_amount(amount),
        });
    }
    let service = services
        .get(input)
        .ok_or_else(|| ReceiptError::ServiceNotFound(input.to_string()))?;
    Ok(LineItem {
        label: service.label.clone(),
        amount: service.amount,
    })
}

fn parse_items(
    cfg_dir: &PathBuf,
    items_input: &[String],
) -> Result<Vec<LineItem>> {
    let services = load_services(cfg_dir)?;
    items_input
        .iter()
        .map(|input| parse_item_input(input, &services))
        .collect()
}

/// Page format from config, both axes independently configurable.
fn page_format(config: &Config) -> Result<PageFormat> {
    let height = match config.receipt.height_policy.as_str() {
        "dynamic" => HeightPolicy::Dynamic {
            min_height_mm: config.receipt.min_height_mm,
        },
        "fixed" => HeightPolicy::Fixed {
            height_mm: config.receipt.fixed_height_mm,
            shrink_floor: config.receipt.shrink_floor,
        },
        other => {
            return Err(ReceiptError::InvalidConfig(format!(
                "height_policy '{other}' (use 'dynamic' or 'fixed')"
            )))
        }
    };
    Ok(PageFormat {
        width_mm: config.receipt.page_width_mm,
        height,
    })
}

fn words_basis(config: &Config) -> Result<WordsBasis> {
    match config.receipt.words_basis.as_str() {
        "declared-total" => Ok(WordsBasis::DeclaredTotal),
        "item-sum" => Ok(WordsBasis::ItemSum),
        other => Err(ReceiptError::InvalidConfig(format!(
            "words_basis '{other}' (use 'declared-total' or 'item-sum')"
        ))),
    }
}

fn logo_path(config: &Config, cfg_dir: &PathBuf) -> Option<PathBuf> {
    config.clinic.logo.as_ref().map(|p| cfg_dir.join(p))
}

/// Compute the layout and write the PDF for one record.
fn render_receipt(
    config: &Config,
    record: &InvoiceRecord,
    pdf_path: &PathBuf,
) -> Result<()> {
    let format = page_format(config)?;
    let basis = words_basis(config)?;
    let plan = compute_layout(
        record,
        &config.clinic.name,
        &config.clinic.address,
        &ReceiptStyle::default(),
        &format,
        basis,
    );
    let logo_image = match &record.logo {
        LogoBlock::Loaded(image) => Some(image),
        _ => None,
    };
    pdf::render_pdf(&plan, logo_image, &record.invoice_no, pdf_path)
}

/// JSON row persisted to the record store for one invoice.
fn invoice_row(record: &InvoiceRecord) -> Value {
    json!({
        "invoice_no": record.invoice_no,
        "date": record.date.to_string(),
        "payer": record.payer,
        "items": record.line_items.iter().map(|i| json!({
            "label": i.label,
            "amount": i.amount,
        })).collect::<Vec<_>>(),
        "declared_total": record.declared_total,
        "total": record.bottom_amount(),
        "file": format!("{}.pdf", record.invoice_no),
    })
}

/// Generate a new receipt
#[allow(clippy::too_many_arguments)]
fn cmd_generate(
    cfg_dir: &PathBuf,
    payer: &str,
    items_input: &[String],
    date: Option<String>,
    total: Option<f64>,
    output: Option<PathBuf>,
    print: bool,
    open: bool,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(ReceiptError::ConfigNotFound(cfg_dir.clone()));
    }

    if items_input.is_empty() {
        return Err(ReceiptError::NoItems);
    }

    let config = load_config(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;
    let line_items = parse_items(cfg_dir, items_input)?;

    let display_date = match date {
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map_err(|_| ReceiptError::InvalidDate(s))?,
        None => Local::now().date_naive(),
    };

    // The number is minted from the issuing day, not the display date:
    // the daily sequence resets at local midnight.
    let today = Local::now().date_naive();
    let key = day_key(today);
    let invoice_no = format_invoice_number(today, state.counter.peek(&key));

    let record = InvoiceRecord {
        invoice_no: invoice_no.clone(),
        date: display_date,
        payer: payer.trim().to_string(),
        line_items,
        declared_total: total,
        logo: pdf::load_logo(logo_path(&config, cfg_dir).as_ref()),
    };

    let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
    let pdf_path = output.unwrap_or_else(|| output_dir.join(format!("{invoice_no}.pdf")));

    render_receipt(&config, &record, &pdf_path)?;

    // Commit the daily counter only after the PDF exists: exactly one
    // increment per successful render
    state.counter.next(&key);
    save_state(cfg_dir, &state)?;

    // Persist the record. Store trouble must not fail a receipt that is
    // already printed, so it only warns.
    match open_store(&config, cfg_dir) {
        Ok(store) => {
            let duplicate = store
                .find_by("invoices", "invoice_no", &invoice_no)
                .map(|rows| !rows.is_empty())
                .unwrap_or(false);
            if !duplicate {
                if let Err(e) = store.insert("invoices", &invoice_row(&record)) {
                    eprintln!("Warning: invoice not persisted: {e}");
                }
            }
        }
        Err(e) => eprintln!("Warning: record store unavailable: {e}"),
    }

    println!("Generated {invoice_no}");
    println!("  Payer:  {}", record.payer);
    println!("  Total:  Rs {:.2}", record.bottom_amount());
    println!("  Saved:  {}", pdf_path.display());

    if print {
        pdf::print_pdf(&pdf_path);
    }
    if open {
        open_path(&pdf_path)?;
    }

    Ok(())
}

/// List stored invoices, newest first
fn cmd_list(cfg_dir: &PathBuf, limit: Option<usize>) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(ReceiptError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let store = open_store(&config, cfg_dir)?;
    let rows_json = store.all("invoices")?;

    if rows_json.is_empty() {
        println!("No invoices stored yet.");
        return Ok(());
    }

    let invoices: Vec<_> = rows_json.iter().rev().enumerate().collect();
    let invoices = match limit {
        Some(n) => &invoices[..n.min(invoices.len())],
        None => &invoices[..],
    };

    let rows: Vec<InvoiceRow> = invoices
        .iter()
        .map(|(idx, row)| InvoiceRow {
            index: idx + 1,
            number: str_field(row, "invoice_no"),
            date: str_field(row, "date"),
            payer: str_field(row, "payer"),
            total: format!("Rs {:.2}", row["total"].as_f64().unwrap_or(0.0)),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    println!();
    println!("Total: {} invoices", rows_json.len());
    println!("Use index number with open/regenerate/edit (e.g., 'receipt open 1')");

    Ok(())
}

fn str_field(row: &Value, field: &str) -> String {
    row[field].as_str().unwrap_or("").to_string()
}

/// Resolve an invoice reference to the actual invoice number.
/// Accepts either an index (1-based, newest first) from 'list' or the
/// full invoice number.
fn resolve_invoice_number(store: &dyn RecordStore, reference: &str) -> Result<String> {
    if let Ok(idx) = reference.parse::<usize>() {
        if idx == 0 {
            return Err(ReceiptError::InvalidInvoiceIndex(reference.to_string()));
        }
        let rows = store.all("invoices")?;
        let newest_first: Vec<_> = rows.iter().rev().collect();
        if idx > newest_first.len() {
            return Err(ReceiptError::InvalidInvoiceIndex(reference.to_string()));
        }
        return Ok(str_field(newest_first[idx - 1], "invoice_no"));
    }

    let matches = store.find_by("invoices", "invoice_no", reference)?;
    if matches.is_empty() {
        Err(ReceiptError::InvoiceNotFound(reference.to_string()))
    } else {
        Ok(reference.to_string())
    }
}

/// Rebuild an InvoiceRecord from a stored JSON row.
fn record_from_row(row: &Value, logo: LogoBlock) -> Result<InvoiceRecord> {
    let invoice_no = str_field(row, "invoice_no");
    let date_str = str_field(row, "date");
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|_| ReceiptError::InvalidDate(date_str))?;

    let line_items = row["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|i| LineItem {
                    label: str_field(i, "label"),
                    amount: i["amount"].as_f64().unwrap_or(0.0),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(InvoiceRecord {
        invoice_no,
        date,
        payer: str_field(row, "payer"),
        line_items,
        declared_total: row["declared_total"].as_f64(),
        logo,
    })
}

/// Fetch a stored invoice row by reference.
fn fetch_invoice(store: &dyn RecordStore, reference: &str) -> Result<(String, Value)> {
    let invoice_no = resolve_invoice_number(store, reference)?;
    let rows = store.find_by("invoices", "invoice_no", &invoice_no)?;
    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| ReceiptError::InvoiceNotFound(invoice_no.clone()))?;
    Ok((invoice_no, row))
}

/// Re-render a receipt PDF from the stored record
fn cmd_regenerate(cfg_dir: &PathBuf, invoice_ref: &str, open: bool) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(ReceiptError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let store = open_store(&config, cfg_dir)?;
    let (invoice_no, row) = fetch_invoice(store.as_ref(), invoice_ref)?;

    let logo = pdf::load_logo(logo_path(&config, cfg_dir).as_ref());
    let record = record_from_row(&row, logo)?;

    let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
    let pdf_path = output_dir.join(format!("{invoice_no}.pdf"));
    render_receipt(&config, &record, &pdf_path)?;

    println!("Regenerated {invoice_no}");
    println!("  Saved: {}", pdf_path.display());

    if open {
        open_path(&pdf_path)?;
    }

    Ok(())
}

/// Replace a stored invoice's line items and re-render
fn cmd_edit(cfg_dir: &PathBuf, invoice_ref: &str, items_input: &[String]) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(ReceiptError::ConfigNotFound(cfg_dir.clone()));
    }

    if items_input.is_empty() {
        return Err(ReceiptError::NoItems);
    }

    let config = load_config(cfg_dir)?;
    let store = open_store(&config, cfg_dir)?;
    let (invoice_no, row) = fetch_invoice(store.as_ref(), invoice_ref)?;
    let line_items = parse_items(cfg_dir, items_input)?;

    let logo = pdf::load_logo(logo_path(&config, cfg_dir).as_ref());
    let mut record = record_from_row(&row, logo)?;
    record.line_items = line_items;

    let patch = json!({
        "items": record.line_items.iter().map(|i| json!({
            "label": i.label,
            "amount": i.amount,
        })).collect::<Vec<_>>(),
        "total": record.bottom_amount(),
    });
    store.update("invoices", "invoice_no", &invoice_no, &patch)?;

    let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
    let pdf_path = output_dir.join(format!("{invoice_no}.pdf"));
    render_receipt(&config, &record, &pdf_path)?;

    println!("Updated {invoice_no}");
    println!("  Items:  {}", items_input.join(", "));
    println!("  Total:  Rs {:.2}", record.bottom_amount());
    println!("  Saved:  {}", pdf_path.display());

    Ok(())
}

/// Open a receipt PDF
fn cmd_open(cfg_dir: &PathBuf, invoice_ref: &str) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(ReceiptError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let store = open_store(&config, cfg_dir)?;
    let invoice_no = resolve_invoice_number(store.as_ref(), invoice_ref)?;

    let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
    let pdf_path = output_dir.join(format!("{invoice_no}.pdf"));
    if !pdf_path.exists() {
        return Err(ReceiptError::InvoiceFileNotFound(pdf_path));
    }

    open_path(&pdf_path)?;

    println!("Opened {}", pdf_path.display());
    Ok(())
}

fn open_path(pdf_path: &PathBuf) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(pdf_path)
            .spawn()
            .map_err(ReceiptError::Io)?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(pdf_path)
            .spawn()
            .map_err(ReceiptError::Io)?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", pdf_path.to_str().unwrap_or("")])
            .spawn()
            .map_err(ReceiptError::Io)?;
    }
    Ok(())
}
