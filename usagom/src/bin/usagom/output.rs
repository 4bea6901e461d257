//! Rendering of command reports and status lines.

use anyhow::Result;
use clap::ValueEnum;
use colored::{Color, Colorize};
use comfy_table::{Attribute, Cell, Color as TableColor, Table, presets};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One table per report
    #[default]
    Table,
    /// Pretty-printed JSON for scripting
    Json,
    /// A single summary line
    Compact,
}

/// Result of a command, renderable in every [`OutputFormat`].
pub trait Report: Serialize {
    fn table(&self, output: &Output) -> Table;
    fn compact(&self) -> String;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Ok,
    Warn,
    Fail,
    Note,
}

impl Tone {
    fn symbol(self) -> &'static str {
        match self {
            Tone::Ok => "✓",
            Tone::Warn => "⚠",
            Tone::Fail => "✗",
            Tone::Note => "•",
        }
    }

    fn color(self) -> Color {
        match self {
            Tone::Ok => Color::Green,
            Tone::Warn => Color::Yellow,
            Tone::Fail => Color::Red,
            Tone::Note => Color::BrightBlack,
        }
    }
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
    color: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool, color: bool) -> Self {
        Self { format, quiet, color }
    }

    /// Status and heading lines only accompany table output.
    fn chatty(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Table
    }

    pub fn emit<R: Report>(&self, report: &R) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        match self.format {
            OutputFormat::Table => println!("{}", report.table(self)),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
            OutputFormat::Compact => println!("{}", report.compact()),
        }
        Ok(())
    }

    /// Failures go to stderr even in quiet mode.
    pub fn status(&self, tone: Tone, message: &str) {
        let line = format!("{} {message}", tone.symbol().color(tone.color()));
        if tone == Tone::Fail {
            eprintln!("{line}");
        } else if self.chatty() {
            println!("{line}");
        }
    }

    pub fn heading(&self, text: &str) {
        if self.chatty() {
            println!("{}", text.bold());
        }
    }

    pub fn table(&self, headers: &[&str]) -> Table {
        let mut table = Table::new();
        table.load_preset(if self.color {
            presets::UTF8_FULL_CONDENSED
        } else {
            presets::ASCII_FULL
        });
        table.set_header(headers.iter().map(|header| {
            let cell = Cell::new(header).add_attribute(Attribute::Bold);
            if self.color { cell.fg(TableColor::Cyan) } else { cell }
        }));
        table
    }

    /// Cell for a failed constraint or an unresolved usage.
    pub fn flagged(&self, text: &str) -> Cell {
        let cell = Cell::new(text);
        if self.color { cell.fg(TableColor::Yellow) } else { cell }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct UsageCount {
        entity: String,
        usages: usize,
    }

    impl Report for UsageCount {
        fn table(&self, output: &Output) -> Table {
            let mut table = output.table(&["Entity", "Usages"]);
            table.add_row(vec![Cell::new(&self.entity), Cell::new(self.usages)]);
            table
        }

        fn compact(&self) -> String {
            format!("{}={}", self.entity, self.usages)
        }
    }

    fn count() -> UsageCount {
        UsageCount {
            entity: "core\\Permission".to_string(),
            usages: 8,
        }
    }

    #[test]
    fn plain_tables_use_ascii_borders() {
        let output = Output::new(OutputFormat::Table, false, false);
        let rendered = count().table(&output).to_string();
        assert!(rendered.contains("Usages"));
        assert!(rendered.contains("core\\Permission"));
        assert!(rendered.contains('+'));
    }

    #[test]
    fn every_format_emits() {
        for format in [OutputFormat::Table, OutputFormat::Json, OutputFormat::Compact] {
            assert!(Output::new(format, false, false).emit(&count()).is_ok());
        }
        assert!(Output::new(OutputFormat::Json, true, false).emit(&count()).is_ok());
    }

    #[test]
    fn only_table_output_is_chatty() {
        assert!(Output::new(OutputFormat::Table, false, true).chatty());
        assert!(!Output::new(OutputFormat::Json, false, true).chatty());
        assert!(!Output::new(OutputFormat::Table, true, true).chatty());
    }
}
