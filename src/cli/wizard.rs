//! Interactive prompts that fill the product and proforma forms

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{print_error, truncate_str};
use crate::entities::measure::UnitMeasure;
use crate::services::ProductService;
use crate::view::columns::format_money;
use crate::view::product_form::ProductForm;
use crate::view::proforma_form::{ProductPicker, ProformaForm};

/// Prompt for every product field, starting from what the form holds
pub fn product_form(form: &mut ProductForm) -> Result<()> {
    let theme = ColorfulTheme::default();

    form.name = Input::with_theme(&theme)
        .with_prompt("Name")
        .with_initial_text(form.name.clone())
        .validate_with(|s: &String| -> std::result::Result<(), &'static str> {
            if s.trim().is_empty() {
                Err("Name is required")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .into_diagnostic()?;

    form.brand = optional_input(&theme, "Brand", &form.brand)?;
    form.model = optional_input(&theme, "Model", &form.model)?;

    form.price = Input::with_theme(&theme)
        .with_prompt("Price")
        .with_initial_text(form.price.clone())
        .validate_with(|s: &String| -> std::result::Result<(), &'static str> {
            match s.trim().parse::<f64>() {
                Ok(p) if p.is_finite() && p > 0.0 => Ok(()),
                Ok(_) => Err("Price must be positive"),
                Err(_) => Err("Price must be a number"),
            }
        })
        .interact_text()
        .into_diagnostic()?;

    let untracked = form.stock_untracked();
    form.stock = Input::with_theme(&theme)
        .with_prompt(if untracked { "Stock (empty = untracked)" } else { "Stock" })
        .with_initial_text(form.stock.clone())
        .allow_empty(untracked)
        .validate_with(move |s: &String| -> std::result::Result<(), &'static str> {
            if untracked && s.trim().is_empty() {
                return Ok(());
            }
            match s.trim().parse::<i64>() {
                Ok(n) if n < 0 => Err("Stock cannot be negative"),
                Ok(_) => Ok(()),
                Err(_) => Err("Stock must be a whole number"),
            }
        })
        .interact_text()
        .into_diagnostic()?;

    let units = UnitMeasure::all();
    let labels: Vec<String> = units
        .iter()
        .map(|u| format!("{:<22} {}", u.description(), style(u.category()).dim()))
        .collect();
    let current = form
        .unit_measure
        .parse::<UnitMeasure>()
        .ok()
        .and_then(|u| units.iter().position(|x| *x == u))
        .unwrap_or(0);
    let unit = Select::with_theme(&theme)
        .with_prompt("Unit of measure")
        .items(&labels)
        .default(current)
        .max_length(12)
        .interact()
        .into_diagnostic()?;
    form.unit_measure = units[unit].code().to_string();

    form.sku = optional_input(&theme, "SKU", &form.sku)?;
    form.description = optional_input(&theme, "Description", &form.description)?;

    Ok(())
}

fn optional_input(theme: &ColorfulTheme, prompt: &str, initial: &str) -> Result<String> {
    Input::with_theme(theme)
        .with_prompt(format!("{} (optional)", prompt))
        .with_initial_text(initial.to_string())
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()
}

/// Prompt for client details and line items
pub fn proforma_form(
    form: &mut ProformaForm,
    products: &ProductService,
    currency: &str,
) -> Result<()> {
    let theme = ColorfulTheme::default();

    form.client = Input::with_theme(&theme)
        .with_prompt("Client")
        .with_initial_text(form.client.clone())
        .interact_text()
        .into_diagnostic()?;
    form.address = Input::with_theme(&theme)
        .with_prompt("Address")
        .with_initial_text(form.address.clone())
        .interact_text()
        .into_diagnostic()?;

    let mut picker = ProductPicker::new();
    loop {
        print_lines(form, currency);

        let mut actions = vec!["Add product"];
        if !form.is_empty() {
            actions.extend(["Change quantity", "Remove line"]);
        }
        actions.push("Done");

        let choice = Select::with_theme(&theme)
            .with_prompt("Items")
            .items(&actions)
            .default(0)
            .interact()
            .into_diagnostic()?;

        match actions[choice] {
            "Add product" => pick_product(&theme, form, &mut picker, products, currency)?,
            "Change quantity" => {
                let index = select_line(&theme, form, currency)?;
                let current = form.line(index).map_or(1, |l| l.quantity);
                let quantity: u32 = Input::with_theme(&theme)
                    .with_prompt("Quantity")
                    .with_initial_text(current.to_string())
                    .validate_with(|q: &u32| -> std::result::Result<(), &'static str> {
                        if *q >= 1 {
                            Ok(())
                        } else {
                            Err("Quantity must be at least 1")
                        }
                    })
                    .interact_text()
                    .into_diagnostic()?;
                form.set_quantity(index, quantity);
            }
            "Remove line" => {
                let index = select_line(&theme, form, currency)?;
                form.remove_item(index);
            }
            _ => {
                if form.is_empty()
                    && !Confirm::with_theme(&theme)
                        .with_prompt("No products selected. Finish anyway?")
                        .default(false)
                        .interact()
                        .into_diagnostic()?
                {
                    continue;
                }
                return Ok(());
            }
        }
    }
}

fn print_lines(form: &ProformaForm, currency: &str) {
    if form.is_empty() {
        println!("{}", style("No products selected yet").dim());
        return;
    }
    println!();
    for (i, line) in form.lines().enumerate() {
        println!(
            "  {}. {} × {} @ {} = {}",
            i + 1,
            style(&line.product.name).yellow(),
            line.quantity,
            format_money(currency, line.product.price),
            style(format_money(currency, line.subtotal())).cyan()
        );
    }
    println!(
        "  {} {}",
        style("Estimated total:").bold(),
        style(format_money(currency, form.estimated_total())).cyan()
    );
    println!();
}

fn select_line(theme: &ColorfulTheme, form: &ProformaForm, currency: &str) -> Result<usize> {
    let labels: Vec<String> = form
        .lines()
        .map(|l| {
            format!(
                "{} × {} ({})",
                l.product.name,
                l.quantity,
                format_money(currency, l.subtotal())
            )
        })
        .collect();
    Select::with_theme(theme)
        .with_prompt("Line")
        .items(&labels)
        .default(0)
        .interact()
        .into_diagnostic()
}

/// Browse products page by page and add the chosen one
fn pick_product(
    theme: &ColorfulTheme,
    form: &mut ProformaForm,
    picker: &mut ProductPicker,
    products: &ProductService,
    currency: &str,
) -> Result<()> {
    if let Err(e) = picker.open(products) {
        print_error(&e);
        picker.close();
        return Ok(());
    }

    while picker.is_open() {
        enum Pick {
            Product(String),
            Next,
            Previous,
            Search,
            Cancel,
        }

        let mut options: Vec<(String, Pick)> = picker
            .entries(form)
            .into_iter()
            .filter_map(|entry| {
                let id = entry.product.product_id.clone()?;
                let label = format!(
                    "{}{} {}",
                    truncate_str(&entry.product.name, 40),
                    entry
                        .product
                        .brand
                        .as_deref()
                        .map(|b| format!(" ({})", b))
                        .unwrap_or_default(),
                    format_money(currency, entry.product.price)
                );
                let label = if entry.selected {
                    style(format!("✓ {} (already added)", label)).dim().to_string()
                } else {
                    label
                };
                Some((label, Pick::Product(id)))
            })
            .collect();

        if let Some(page) = picker.current() {
            if page.has_next() {
                options.push(("» Next page".to_string(), Pick::Next));
            }
            if page.has_previous() {
                options.push(("« Previous page".to_string(), Pick::Previous));
            }
        }
        let search_label = if picker.search().is_empty() {
            "Search by name or brand".to_string()
        } else {
            format!("Search (current: {})", picker.search())
        };
        options.push((search_label, Pick::Search));
        options.push(("Cancel".to_string(), Pick::Cancel));

        let labels: Vec<&str> = options.iter().map(|(l, _)| l.as_str()).collect();
        let prompt = match picker.current() {
            Some(page) => format!(
                "Select product (page {} of {})",
                page.meta.current_page,
                page.meta.total_pages.max(1)
            ),
            None => "Select product".to_string(),
        };
        let choice = Select::with_theme(theme)
            .with_prompt(prompt)
            .items(&labels)
            .default(0)
            .max_length(14)
            .interact()
            .into_diagnostic()?;

        let result = match &options[choice].1 {
            Pick::Product(id) => {
                if !picker.pick(form, id) {
                    println!("{}", style("That product is already on the proforma").yellow());
                }
                Ok(())
            }
            Pick::Next => picker.next_page(products).map(|_| ()),
            Pick::Previous => picker.previous_page(products).map(|_| ()),
            Pick::Search => {
                let term: String = Input::with_theme(theme)
                    .with_prompt("Search")
                    .with_initial_text(picker.search().to_string())
                    .allow_empty(true)
                    .interact_text()
                    .into_diagnostic()?;
                picker.set_search(&term);
                Ok(())
            }
            Pick::Cancel => {
                picker.close();
                Ok(())
            }
        };
        if let Err(e) = result {
            print_error(&e);
        }
    }
    Ok(())
}
