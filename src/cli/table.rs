//! Tabular rendering of list output

use miette::{IntoDiagnostic, Result};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;
use crate::core::entity::Entity;
use crate::view::table::TableView;

/// Header and rows ready to print
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, cells: Vec<String>) -> Self {
        self.rows.push(cells);
        self
    }

    /// Visible rows of a table view, sorted and filtered
    pub fn from_view<T: Entity>(table: &TableView<T>) -> Self {
        Self {
            headers: table.headers(),
            rows: table.rows().into_iter().map(|r| table.cells(r)).collect(),
        }
    }

    /// Render for one of the tabular formats
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Csv => self.to_csv(),
            OutputFormat::Md => Ok(self.to_markdown()),
            OutputFormat::Table | OutputFormat::Auto => Ok(self.to_boxed()),
            _ => Ok(self.to_tsv()),
        }
    }

    pub fn print(&self, format: OutputFormat) -> Result<()> {
        let rendered = self.render(format)?;
        if rendered.ends_with('\n') {
            print!("{}", rendered);
        } else {
            println!("{}", rendered);
        }
        Ok(())
    }

    fn builder(&self) -> Builder {
        let mut builder = Builder::default();
        builder.push_record(self.headers.iter().cloned());
        for row in &self.rows {
            builder.push_record(row.iter().cloned());
        }
        builder
    }

    fn to_boxed(&self) -> String {
        self.builder().build().with(Style::rounded()).to_string()
    }

    fn to_markdown(&self) -> String {
        self.builder().build().with(Style::markdown()).to_string()
    }

    fn to_tsv(&self) -> String {
        let clean = |s: &String| s.replace(['\t', '\n'], " ");
        let mut out = String::new();
        out.push_str(&self.headers.iter().map(clean).collect::<Vec<_>>().join("\t"));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.iter().map(clean).collect::<Vec<_>>().join("\t"));
            out.push('\n');
        }
        out
    }

    fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers).into_diagnostic()?;
        for row in &self.rows {
            writer.write_record(row).into_diagnostic()?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| miette::miette!("could not finish CSV output: {}", e.error()))?;
        String::from_utf8(bytes).into_diagnostic()
    }
}
