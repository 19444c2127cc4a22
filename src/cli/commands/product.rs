//! `ferre product` command - catalog management

use clap::{Subcommand, ValueEnum};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::context::AppContext;
use crate::cli::helpers::{is_interactive, print_error, read_ids_from_stdin};
use crate::cli::output::{effective_format, is_decorated};
use crate::cli::table::TableData;
use crate::cli::wizard;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::error::{ClientError, ErrorKind};
use crate::entities::measure::UnitMeasure;
use crate::entities::product::{Product, UpdateProductDto};
use crate::view::columns::{format_money, inventory_summary, product_columns, stock_label};
use crate::view::list::ListView;
use crate::view::product_form::ProductForm;
use crate::view::table::{DeleteOutcome, TableView};

use super::{confirm_delete, load_page, print_page_footer};

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// List products, one page at a time
    List(ListArgs),

    /// Show a product's details
    Show(ShowArgs),

    /// Create a new product
    New(NewArgs),

    /// Update a product
    Edit(EditArgs),

    /// Delete products
    Delete(DeleteArgs),

    /// Browse the catalog interactively (page, sort, filter, create, edit, delete)
    Browse(BrowseArgs),
}

/// Columns available for sorting
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ProductColumn {
    Id,
    Name,
    Brand,
    Price,
    Stock,
    Unit,
    Sku,
}

impl ProductColumn {
    pub fn key(&self) -> &'static str {
        match self {
            ProductColumn::Id => "id",
            ProductColumn::Name => "name",
            ProductColumn::Brand => "brand",
            ProductColumn::Price => "price",
            ProductColumn::Stock => "stock",
            ProductColumn::Unit => "unit",
            ProductColumn::Sku => "sku",
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

    /// Filter the page by text (case-insensitive)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Sort the page by column
    #[arg(long)]
    pub sort: Option<ProductColumn>,

    /// Reverse sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Show only the number of matching rows
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Product ID
    pub id: String,
}

/// Product fields settable from the command line
#[derive(clap::Args, Debug, Default)]
pub struct ProductFields {
    /// Product name
    #[arg(long)]
    pub name: Option<String>,

    /// Unit price
    #[arg(long)]
    pub price: Option<f64>,

    /// Units in stock
    #[arg(long)]
    pub stock: Option<u32>,

    /// Unit of measure code (see `ferre measure list`)
    #[arg(long, short = 'u')]
    pub unit: Option<UnitMeasure>,

    #[arg(long)]
    pub brand: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub sku: Option<String>,

    /// Category ID
    #[arg(long)]
    pub category: Option<String>,
}

impl ProductFields {
    /// Overwrite the form fields that were given
    pub fn apply(&self, form: &mut ProductForm) {
        if let Some(ref name) = self.name {
            form.name = name.clone();
        }
        if let Some(price) = self.price {
            form.price = price.to_string();
        }
        if let Some(stock) = self.stock {
            form.stock = stock.to_string();
        }
        if let Some(unit) = self.unit {
            form.unit_measure = unit.code().to_string();
        }
        if let Some(ref brand) = self.brand {
            form.brand = brand.clone();
        }
        if let Some(ref model) = self.model {
            form.model = model.clone();
        }
        if let Some(ref description) = self.description {
            form.description = description.clone();
        }
        if let Some(ref sku) = self.sku {
            form.sku = sku.clone();
        }
        if let Some(ref category) = self.category {
            form.category_id = category.clone();
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[command(flatten)]
    pub fields: ProductFields,

    /// Interactive mode (prompt for fields)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Product ID
    pub id: String,

    #[command(flatten)]
    pub fields: ProductFields,

    /// Interactive mode (prompt for fields, seeded with current values)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Product IDs (read from stdin when omitted)
    pub ids: Vec<String>,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Suppress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(clap::Args, Debug)]
pub struct BrowseArgs {
    /// Page to start on
    #[arg(long, short = 'p', default_value_t = 1)]
    pub page: u32,

    /// Page size (5, 10, 20 or 50)
    #[arg(long, short = 'n')]
    pub limit: Option<u32>,
}

/// Run a product subcommand
pub fn run(cmd: ProductCommands, global: &GlobalOpts) -> Result<()> {
    let ctx = AppContext::new(global)?;
    match cmd {
        ProductCommands::List(args) => run_list(&ctx, args, global),
        ProductCommands::Show(args) => run_show(&ctx, args, global),
        ProductCommands::New(args) => run_new(&ctx, args, global),
        ProductCommands::Edit(args) => run_edit(&ctx, args, global),
        ProductCommands::Delete(args) => run_delete(&ctx, args),
        ProductCommands::Browse(args) => run_browse(&ctx, args),
    }
}

fn new_view(ctx: &AppContext, page: u32, limit: Option<u32>) -> Result<ListView<Product>> {
    let mut view = ListView::new(ctx.config.page_size());
    if let Some(limit) = limit {
        view.set_limit(limit)?;
    }
    view.set_page(page)?;
    Ok(view)
}

fn run_list(ctx: &AppContext, args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut view = new_view(ctx, args.page, args.limit)?;
    let data = load_page(&mut view, &ctx.products)?;

    let mut table = TableView::new(product_columns(ctx.currency()), view.page_sizes());
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
            for id in rows.iter().filter_map(|p| p.id()) {
                println!("{}", id);
            }
        }
        _ => {
            if rows.is_empty() {
                println!("No products found.");
            } else {
                TableData::from_view(&table).print(format)?;
            }
            if is_decorated(format) {
                print_footer(ctx, &table, &rows);
            }
        }
    }

    Ok(())
}

fn print_footer(ctx: &AppContext, table: &TableView<Product>, rows: &[&Product]) {
    if let Some(controls) = table.controls("products") {
        print_page_footer(&controls);
    }
    let summary = inventory_summary(rows.iter().copied());
    if summary.count > 0 {
        println!(
            "{} {} · {} low · {} out of stock",
            style("Inventory value:").dim(),
            style(format_money(ctx.currency(), summary.value)).cyan(),
            summary.low_stock,
            summary.out_of_stock
        );
    }
}

fn run_show(ctx: &AppContext, args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let product = ctx.products.get(&args.id)?;

    match global.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&*product).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&*product).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => {
            println!("{}", product.id().unwrap_or(&args.id));
        }
        _ => print_product(ctx, &product),
    }

    Ok(())
}

fn print_product(ctx: &AppContext, p: &Product) {
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {}",
        style("ID").bold(),
        style(p.id().unwrap_or("-")).cyan()
    );
    println!("{}: {}", style("Name").bold(), style(&p.name).yellow());
    if let Some(ref brand) = p.brand {
        println!("{}: {}", style("Brand").bold(), brand);
    }
    if let Some(ref model) = p.model {
        println!("{}: {}", style("Model").bold(), model);
    }
    if let Some(ref sku) = p.sku {
        println!("{}: {}", style("SKU").bold(), sku);
    }
    println!(
        "{}: {}",
        style("Price").bold(),
        format_money(ctx.currency(), p.price)
    );
    println!("{}: {}", style("Stock").bold(), stock_label(p));
    match p.unit() {
        Some(unit) => println!(
            "{}: {} ({})",
            style("Unit").bold(),
            unit.description(),
            style(unit.code()).dim()
        ),
        None => println!("{}: {}", style("Unit").bold(), p.measure_label()),
    }
    println!("{}", style("─".repeat(60)).dim());

    if let Some(ref description) = p.description {
        if !description.is_empty() {
            println!();
            println!("{}", style("Description:").bold());
            println!("{}", description);
        }
    }

    let stamp = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    println!(
        "{}: {} | {}: {}",
        style("Created").dim(),
        stamp(p.created_at),
        style("Updated").dim(),
        stamp(p.updated_at)
    );
}

/// Report a failed save; validation failures are listed per field
fn save_failed(err: ClientError, action: &str) -> miette::Report {
    if err.kind() == ErrorKind::Validation {
        print_error(&err);
        miette::miette!("Product was not {}", action)
    } else {
        err.into()
    }
}

fn run_new(ctx: &AppContext, args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut form = ProductForm::new();
    if args.interactive {
        wizard::product_form(&mut form)?;
    } else {
        args.fields.apply(&mut form);
    }

    let created = form
        .submit(|dto| ctx.products.create(&dto))
        .map_err(|e| save_failed(e, "created"))?;
    if let Some(product) = created {
        print_saved(&product, "Created", global);
    }
    Ok(())
}

fn run_edit(ctx: &AppContext, args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let product = ctx.products.get(&args.id)?;
    let mut form = ProductForm::for_product(&product);
    if args.interactive {
        wizard::product_form(&mut form)?;
    } else {
        args.fields.apply(&mut form);
    }

    let updated = form
        .submit(|dto| {
            let changes = UpdateProductDto::changes(&product, &dto);
            if changes.is_empty() {
                return Ok(None);
            }
            ctx.products.update(&args.id, &changes).map(Some)
        })
        .map_err(|e| save_failed(e, "updated"))?;

    match updated.flatten() {
        Some(product) => print_saved(&product, "Updated", global),
        None => println!("No changes to {}", style(&args.id).cyan()),
    }
    Ok(())
}

fn print_saved(product: &Product, verb: &str, global: &GlobalOpts) {
    match global.output {
        OutputFormat::Id => {
            if let Some(id) = product.id() {
                println!("{}", id);
            }
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(product) {
                println!("{}", json);
            }
        }
        _ => {
            println!(
                "{} {} product {}",
                style("✓").green(),
                verb,
                style(product.id().unwrap_or("-")).cyan()
            );
            println!("   {}", style(&product.name).yellow());
        }
    }
}

fn run_delete(ctx: &AppContext, args: DeleteArgs) -> Result<()> {
    let ids = if args.ids.is_empty() {
        read_ids_from_stdin().unwrap_or_default()
    } else {
        args.ids
    };
    if ids.is_empty() {
        return Err(miette::miette!("No product IDs given"));
    }

    let mut failed = 0;
    for id in &ids {
        let label = match ctx.products.get(id) {
            Ok(p) => format!("product {} ({})", id, p.name),
            Err(e) => {
                print_error(&e);
                failed += 1;
                continue;
            }
        };
        if !confirm_delete(&label, args.yes)? {
            continue;
        }
        match ctx.products.delete(id) {
            Ok(()) => {
                if !args.quiet {
                    println!("{} Deleted {}", style("✓").green(), label);
                }
            }
            Err(e) => {
                print_error(&e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(miette::miette!("{} of {} deletions failed", failed, ids.len()));
    }
    Ok(())
}

// =========================================================================
// Interactive browser
// =========================================================================

fn run_browse(ctx: &AppContext, args: BrowseArgs) -> Result<()> {
    if !is_interactive() {
        return Err(miette::miette!(
            "`ferre product browse` needs an interactive terminal; use `ferre product list` instead"
        ));
    }

    let theme = ColorfulTheme::default();
    let mut view = new_view(ctx, args.page, args.limit)?;
    let mut table = TableView::new(product_columns(ctx.currency()), view.page_sizes());

    loop {
        match load_page(&mut view, &ctx.products) {
            Ok(data) => table.set_data(data),
            Err(e) => {
                print_error(&e);
                let retry = Confirm::with_theme(&theme)
                    .with_prompt("Retry?")
                    .default(true)
                    .interact()
                    .into_diagnostic()?;
                if retry {
                    continue;
                }
                return Err(e.into());
            }
        }

        println!();
        let rows = table.rows();
        if rows.is_empty() {
            println!("No products found.");
        } else {
            TableData::from_view(&table).print(OutputFormat::Table)?;
        }
        print_footer(ctx, &table, &rows);
        if !table.filter().is_empty() {
            println!("{} {}", style("Filter:").dim(), table.filter());
        }
        if let Some(at) = view.current_key().and_then(|key| ctx.queries.fetched_at(key)) {
            println!(
                "{} {}",
                style("Fetched:").dim(),
                at.with_timezone(&chrono::Local).format("%H:%M:%S")
            );
        }

        let actions = [
            "Next page",
            "Previous page",
            "Go to page",
            "Page size",
            "Filter",
            "Sort",
            "New product",
            "Edit product",
            "Delete product",
            "Quit",
        ];
        let choice = Select::with_theme(&theme)
            .with_prompt("Action")
            .items(&actions)
            .default(0)
            .interact()
            .into_diagnostic()?;

        match actions[choice] {
            "Next page" => {
                view.next_page();
            }
            "Previous page" => {
                view.previous_page();
            }
            "Go to page" => {
                let page: u32 = Input::with_theme(&theme)
                    .with_prompt("Page")
                    .with_initial_text(view.page().to_string())
                    .interact_text()
                    .into_diagnostic()?;
                if let Err(e) = view.set_page(page) {
                    print_error(&e);
                }
            }
            "Page size" => {
                let sizes: Vec<String> = view.page_sizes().iter().map(|n| n.to_string()).collect();
                let current = view
                    .page_sizes()
                    .iter()
                    .position(|n| *n == view.limit())
                    .unwrap_or(0);
                let index = Select::with_theme(&theme)
                    .with_prompt("Products per page")
                    .items(&sizes)
                    .default(current)
                    .interact()
                    .into_diagnostic()?;
                if let Err(e) = view.set_limit(view.page_sizes()[index]) {
                    print_error(&e);
                }
            }
            "Filter" => {
                let filter: String = Input::with_theme(&theme)
                    .with_prompt("Filter")
                    .with_initial_text(table.filter().to_string())
                    .allow_empty(true)
                    .interact_text()
                    .into_diagnostic()?;
                table.set_filter(&filter);
            }
            "Sort" => {
                let headers: Vec<&str> = table.columns().iter().map(|c| c.header).collect();
                let index = Select::with_theme(&theme)
                    .with_prompt("Sort by (select again to flip or clear)")
                    .items(&headers)
                    .default(0)
                    .interact()
                    .into_diagnostic()?;
                let key = table.columns()[index].key;
                table.toggle_sort(key);
            }
            "New product" => {
                view.open_create();
                edit_in_view(ctx, &mut view)?;
            }
            "Edit product" => {
                if let Some(product) = pick_row(&theme, &table, "Edit")? {
                    view.open_edit(product);
                    edit_in_view(ctx, &mut view)?;
                }
            }
            "Delete product" => {
                if let Some(product) = pick_row(&theme, &table, "Delete")? {
                    let Some(id) = product.id() else {
                        continue;
                    };
                    let label = format!("product {} ({})", id, product.name);
                    let outcome = table.request_delete(
                        id,
                        || confirm_delete(&label, false).unwrap_or(false),
                        |id| ctx.products.delete(id),
                    );
                    match outcome {
                        DeleteOutcome::Deleted => {
                            println!("{} Deleted {}", style("✓").green(), label)
                        }
                        DeleteOutcome::Failed(e) => print_error(&e),
                        DeleteOutcome::AlreadyInFlight => println!(
                            "{}",
                            style("That product is already being deleted").yellow()
                        ),
                        DeleteOutcome::Cancelled => {}
                    }
                }
            }
            _ => break,
        }
    }

    Ok(())
}

fn pick_row(theme: &ColorfulTheme, table: &TableView<Product>, verb: &str) -> Result<Option<Product>> {
    let rows = table.rows();
    if rows.is_empty() {
        println!("No products on this page.");
        return Ok(None);
    }
    let labels: Vec<String> = rows
        .iter()
        .map(|p| {
            let id = p.id().unwrap_or("-");
            if table.is_deleting(id) {
                style(format!("{} {} (deleting)", id, p.name)).dim().to_string()
            } else {
                format!("{} {}", id, p.name)
            }
        })
        .collect();
    let index = Select::with_theme(theme)
        .with_prompt(format!("{} which product?", verb))
        .items(&labels)
        .default(0)
        .interact_opt()
        .into_diagnostic()?;
    Ok(index.map(|i| rows[i].clone()))
}

/// Fill and submit the form for the view's current mode
fn edit_in_view(ctx: &AppContext, view: &mut ListView<Product>) -> Result<()> {
    let mut form = ProductForm::new();
    form.set_initial_data(view.editing());

    while view.form_visible() {
        wizard::product_form(&mut form)?;
        println!("{}", style(form.submit_label()).dim());

        let result = view.submit(|editing| {
            form.submit(|dto| match editing {
                Some(product) => {
                    let id = product
                        .id()
                        .ok_or_else(|| ClientError::invalid("productId", "Product has no id"))?;
                    let changes = UpdateProductDto::changes(product, &dto);
                    if changes.is_empty() {
                        return Ok(product.clone());
                    }
                    ctx.products.update(id, &changes)
                }
                None => ctx.products.create(&dto),
            })
        });

        match result {
            Ok(Some(product)) => println!(
                "{} Saved product {}",
                style("✓").green(),
                style(product.id().unwrap_or("-")).cyan()
            ),
            Ok(None) => {}
            Err(e) => {
                print_error(&e);
                let again = Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt("Edit and try again?")
                    .default(true)
                    .interact()
                    .into_diagnostic()?;
                if !again {
                    view.close_form();
                }
            }
        }
    }
    Ok(())
}
