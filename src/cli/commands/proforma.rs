//! `ferre proforma` command - quotations and their reports

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::cli::context::AppContext;
use crate::cli::helpers::print_error;
use crate::cli::output::{effective_format, is_decorated};
use crate::cli::table::TableData;
use crate::cli::wizard;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::error::{ClientError, ErrorKind};
use crate::entities::measure::MeasureRef;
use crate::entities::proforma::{ProformaCreatedResponse, ProformaResponse};
use crate::view::columns::{format_money, proforma_columns};
use crate::view::list::ListView;
use crate::view::proforma_form::ProformaForm;
use crate::view::table::TableView;

use super::{load_page, print_page_footer};

#[derive(Subcommand, Debug)]
pub enum ProformaCommands {
    /// List proformas, one page at a time
    List(ListArgs),

    /// Show a proforma and its line items
    Show(ShowArgs),

    /// Create a new proforma
    New(NewArgs),

    /// Download the PDF report of a proforma
    Pdf(PdfArgs),

    /// Fetch the HTML preview of a proforma
    Preview(PreviewArgs),
}

/// Columns available for sorting
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ProformaColumn {
    Id,
    Number,
    Date,
    Client,
    Address,
    Items,
    Total,
}

impl ProformaColumn {
    pub fn key(&self) -> &'static str {
        match self {
            ProformaColumn::Id => "id",
            ProformaColumn::Number => "number",
            ProformaColumn::Date => "date",
            ProformaColumn::Client => "client",
            ProformaColumn::Address => "address",
            ProformaColumn::Items => "items",
            ProformaColumn::Total => "total",
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Page number (starting at 1)
    #[arg(long, short = 'p', default_value_t = 1)]
    pub page: u32,

    /// Page size (5, 10, 20 or 50)
    #[arg(long, short = 'n')]
    pub limit: Option<u32>,

    /// Filter the page by client, address or number
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Sort the page by column
    #[arg(long)]
    pub sort: Option<ProformaColumn>,

    /// Reverse sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Show only the number of matching rows
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Proforma ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Client name
    #[arg(long)]
    pub client: Option<String>,

    /// Delivery address
    #[arg(long)]
    pub address: Option<String>,

    /// Line item as PRODUCT_ID or PRODUCT_ID:QUANTITY (repeatable)
    #[arg(long = "item", value_parser = parse_item)]
    pub items: Vec<(String, u32)>,

    /// Interactive mode (pick products page by page)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct PdfArgs {
    /// Proforma ID
    pub id: String,

    /// Directory to save into (default: reports.download_dir)
    #[arg(long, short = 'd')]
    pub dir: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct PreviewArgs {
    /// Proforma ID
    pub id: String,

    /// Write the HTML to a file instead of stdout
    #[arg(long, short = 'O')]
    pub out: Option<PathBuf>,

    /// Open the preview in the configured browser
    #[arg(long)]
    pub open: bool,
}

/// Parse `ID` or `ID:QTY`
fn parse_item(s: &str) -> std::result::Result<(String, u32), String> {
    let (id, quantity) = match s.rsplit_once(':') {
        Some((id, qty)) => {
            let qty: u32 = qty
                .trim()
                .parse()
                .map_err(|_| format!("invalid quantity '{}'", qty))?;
            (id.trim(), qty)
        }
        None => (s.trim(), 1),
    };
    if id.is_empty() {
        return Err("product ID is empty".to_string());
    }
    if quantity < 1 {
        return Err("quantity must be at least 1".to_string());
    }
    Ok((id.to_string(), quantity))
}

/// Run a proforma subcommand
pub fn run(cmd: ProformaCommands, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::new(global)?;
    match cmd {
        ProformaCommands::List(args) => run_list(&ctx, args, global),
        ProformaCommands::Show(args) => run_show(&ctx, args, global),
        ProformaCommands::New(args) => run_new(&ctx, args, global),
        ProformaCommands::Pdf(args) => run_pdf(&ctx, args),
        ProformaCommands::Preview(args) => run_preview(&ctx, args),
    }
}

fn run_list(ctx: &AppContext, args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut view: ListView<ProformaResponse> = ListView::new(ctx.config.page_size());
    if let Some(limit) = args.limit {
        view.set_limit(limit)?;
    }
    view.set_page(args.page)?;
    let data = load_page(&mut view, &ctx.proformas)?;

    let mut table = TableView::new(proforma_columns(ctx.currency()), view.page_sizes());
    table.set_data(data);
    if let Some(ref search) = args.search {
        table.set_filter(search);
    }
    if let Some(column) = args.sort {
        table.toggle_sort(column.key());
        if args.reverse {
            table.toggle_sort(column.key());
        }
    }

    let rows = table.rows();
    if args.count {
        println!("{}", rows.len());
        return Ok(());
    }

    let format = effective_format(global.output, true);
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rows).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&rows).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => {
            for p in &rows {
                println!("{}", p.id);
            }
        }
        _ => {
            if rows.is_empty() {
                println!("No proformas found.");
            } else {
                TableData::from_view(&table).print(format)?;
            }
            if is_decorated(format) {
                if let Some(controls) = table.controls("proformas") {
                    print_page_footer(&controls);
                }
            }
        }
    }

    Ok(())
}

fn run_show(ctx: &AppContext, args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let proforma = ctx.proformas.get(&args.id)?;

    match global.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&*proforma).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&*proforma).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => println!("{}", proforma.id),
        _ => print_proforma(ctx, &proforma)?,
    }

    Ok(())
}

fn print_proforma(ctx: &AppContext, p: &ProformaResponse) -> Result<()> {
    let currency = ctx.currency();
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {}  {}",
        style("Proforma").bold(),
        style(p.display_number()).yellow(),
        style(format!("(id {})", p.id)).dim()
    );
    println!("{}: {}", style("Date").bold(), p.date_proforma);
    println!("{}: {}", style("Client").bold(), p.client);
    println!("{}: {}", style("Address").bold(), p.address);
    println!("{}", style("─".repeat(60)).dim());

    if p.items.is_empty() {
        println!("{}", style("No line items").dim());
    } else {
        let mut table = TableData::new(vec![
            "PRODUCT".into(),
            "DESCRIPTION".into(),
            "QTY".into(),
            "UNIT".into(),
            "UNIT PRICE".into(),
            "AMOUNT".into(),
        ]);
        for item in &p.items {
            table = table.row(vec![
                item.product.clone(),
                item.description.clone().unwrap_or_default(),
                item.quantity.map(|q| q.to_string()).unwrap_or_default(),
                item.unit_measure
                    .as_ref()
                    .map(MeasureRef::label)
                    .unwrap_or_default(),
                format_money(currency, item.unit_price),
                item.amount()
                    .map(|a| format_money(currency, a))
                    .unwrap_or_default(),
            ]);
        }
        table.print(OutputFormat::Table)?;
    }

    println!(
        "{}: {}",
        style("Total").bold(),
        style(format_money(currency, p.total)).cyan()
    );
    Ok(())
}

fn run_new(ctx: &AppContext, args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut form = ProformaForm::new();
    if let Some(client) = args.client {
        form.client = client;
    }
    if let Some(address) = args.address {
        form.address = address;
    }

    for (id, quantity) in &args.items {
        let product = ctx.products.get(id)?;
        if !form.select_product(&product) {
            return Err(miette::miette!("Product {} is listed more than once", id));
        }
        form.set_quantity(form.len() - 1, *quantity);
    }

    if args.interactive {
        wizard::proforma_form(&mut form, &ctx.products, ctx.currency())?;
    }

    let created = form
        .submit(|dto| ctx.proformas.create(&dto))
        .map_err(|e| {
            if e.kind() == ErrorKind::Validation {
                print_error(&e);
                miette::miette!("Proforma was not created")
            } else {
                e.into()
            }
        })?;

    if let Some(created) = created {
        print_created(ctx, &created, global)?;
    }
    Ok(())
}

fn print_created(
    ctx: &AppContext,
    created: &ProformaCreatedResponse,
    global: &GlobalOpts,
) -> Result<()> {
    match global.output {
        OutputFormat::Id => println!("{}", created.id),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(created).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(created).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            let currency = ctx.currency();
            println!(
                "{} Created proforma {} {}",
                style("✓").green(),
                style(format!("Nº {}", created.number_proforma)).yellow(),
                style(format!("(id {})", created.id)).dim()
            );
            println!("   {} · {}", created.client, created.address);
            for item in &created.items {
                println!(
                    "   {} × {} @ {} = {}",
                    item.quantity,
                    item.product,
                    format_money(currency, item.unit_amount),
                    format_money(currency, item.subtotal)
                );
            }
            println!(
                "   {} {}",
                style("Total:").bold(),
                style(format_money(currency, created.total)).cyan()
            );
            println!(
                "   {}",
                style(format!("ferre proforma pdf {}", created.id)).dim()
            );
        }
    }
    Ok(())
}

fn run_pdf(ctx: &AppContext, args: PdfArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| ctx.config.download_dir());
    let path = ctx.proformas.download_pdf(&args.id, &dir)?;
    println!(
        "{} Saved {}",
        style("✓").green(),
        style(path.display()).cyan()
    );
    Ok(())
}

fn run_preview(ctx: &AppContext, args: PreviewArgs) -> Result<()> {
    let html = ctx.proformas.preview_html(&args.id)?;

    if args.open {
        let path = match args.out {
            Some(path) => {
                fs::write(&path, &html).map_err(|e| ClientError::io(&path, e))?;
                path
            }
            None => {
                let mut file = tempfile::Builder::new()
                    .prefix("ferre-proforma-")
                    .suffix(".html")
                    .tempfile()
                    .into_diagnostic()?;
                file.write_all(html.as_bytes()).into_diagnostic()?;
                let (_, path) = file.keep().into_diagnostic()?;
                path
            }
        };
        ctx.config
            .run_browser(&path)
            .map_err(|e| ClientError::io(&path, e))?;
        println!(
            "{} Opened preview {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
        return Ok(());
    }

    match args.out {
        Some(path) => {
            fs::write(&path, &html).map_err(|e| ClientError::io(&path, e))?;
            println!(
                "{} Saved {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
        None => print!("{}", html),
    }
    Ok(())
}
