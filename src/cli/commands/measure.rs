//! `ferre measure` command - units of measure

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::output::effective_format;
use crate::cli::table::TableData;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::measure::{MeasureCategory, UnitMeasure};

#[derive(Subcommand, Debug)]
pub enum MeasureCommands {
    /// List the units products can be sold in
    List {
        /// Only units of this category
        #[arg(long, short = 'c')]
        category: Option<MeasureCategory>,
    },
}

#[derive(Serialize)]
struct MeasureRow {
    code: &'static str,
    description: &'static str,
    category: String,
}

pub fn run(cmd: MeasureCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        MeasureCommands::List { category } => run_list(category, global),
    }
}

fn run_list(category: Option<MeasureCategory>, global: &GlobalOpts) -> Result<()> {
    let units: Vec<UnitMeasure> = UnitMeasure::all()
        .iter()
        .copied()
        .filter(|u| category.map_or(true, |c| u.category() == c))
        .collect();

    let format = effective_format(global.output, true);
    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let rows: Vec<MeasureRow> = units
                .iter()
                .map(|u| MeasureRow {
                    code: u.code(),
                    description: u.description(),
                    category: u.category().to_string(),
                })
                .collect();
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&rows).into_diagnostic()?);
            } else {
                print!("{}", serde_yml::to_string(&rows).into_diagnostic()?);
            }
        }
        OutputFormat::Id => {
            for unit in &units {
                println!("{}", unit.code());
            }
        }
        _ => {
            let mut table = TableData::new(vec![
                "CODE".to_string(),
                "DESCRIPTION".to_string(),
                "CATEGORY".to_string(),
            ]);
            for unit in &units {
                table = table.row(vec![
                    unit.code().to_string(),
                    unit.description().to_string(),
                    unit.category().to_string(),
                ]);
            }
            table.print(format)?;
            if format == OutputFormat::Table {
                println!();
                println!("{} unit(s)", style(units.len()).cyan());
            }
        }
    }
    Ok(())
}
