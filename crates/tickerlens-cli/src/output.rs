use std::io::{self, Write};

use crate::cli::OutputFormat;
use crate::commands::CommandResult;
use crate::error::CliError;

/// Column-aligned text table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub title: Option<String>,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    pub footer: Vec<String>,
}

impl Table {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn push_footer(&mut self, line: impl Into<String>) {
        self.footer.push(line.into());
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (index, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(index) {
                    Some(width) => *width = (*width).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if let Some(title) = &self.title {
            writeln!(out, "{title}")?;
        }

        let widths = self.widths();
        if !self.headers.is_empty() {
            writeln!(out, "{}", join_cells(self.headers.iter().copied(), &widths))?;
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            writeln!(out, "{}", rule.join("  "))?;
        }
        for row in &self.rows {
            writeln!(out, "{}", join_cells(row.iter().map(String::as_str), &widths))?;
        }
        for note in &self.footer {
            writeln!(out, "{note}")?;
        }
        Ok(())
    }
}

fn join_cells<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_owned()
}

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(&result.data)?
            } else {
                serde_json::to_string(&result.data)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => {
            for (index, table) in result.tables.iter().enumerate() {
                if index > 0 {
                    writeln!(out)?;
                }
                table.write_to(&mut out)?;
            }
        }
    }

    Ok(())
}

/// `-` for missing values.
pub fn number(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| String::from("-"), |v| format!("{v:.decimals$}"))
}

/// Fraction rendered as a percentage (`0.153` -> `15.3%`).
pub fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| String::from("-"), |v| format!("{:.1}%", v * 100.0))
}

pub fn text(value: Option<&str>) -> String {
    value.map_or_else(|| String::from("-"), str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_are_padded_to_widest_cell() {
        let mut table = Table::new(vec!["TICKER", "P/L"]).with_title("scan");
        table.push_row(vec!["PETR4.SA".into(), "4.10".into()]);
        table.push_row(vec!["ABEV3.SA".into(), "15.22".into()]);
        table.push_footer("2 tickers");

        let mut out = Vec::new();
        table.write_to(&mut out).expect("write to vec");
        let rendered = String::from_utf8(out).expect("utf8");

        assert_eq!(
            rendered,
            "scan\nTICKER    P/L\n--------  -----\nPETR4.SA  4.10\nABEV3.SA  15.22\n2 tickers\n"
        );
    }

    #[test]
    fn missing_values_render_as_dash() {
        assert_eq!(number(None, 2), "-");
        assert_eq!(number(Some(1.23456), 2), "1.23");
        assert_eq!(percent(Some(0.153)), "15.3%");
        assert_eq!(text(None), "-");
    }
}
