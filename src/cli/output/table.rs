//! Table output formatting using comfy-table.

use std::env;

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};

use crate::cli::commands::extract::Reveal;
use crate::cli::output::truncate;
use crate::domain::models::RuleCatalog;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Format the rule catalog.
    pub fn format_rules(&self, catalog: &RuleCatalog) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            self.header("#"),
            self.header("Rule"),
            self.header("Checks"),
        ]);

        for (index, rule) in catalog.rules().iter().enumerate() {
            table.add_row(vec![
                Cell::new(index + 1),
                self.accent(rule.name),
                Cell::new(rule.description),
            ]);
        }

        table.to_string()
    }

    /// Format the points at which prefixes of a buffer revealed new fields.
    pub fn format_reveals(&self, reveals: &[Reveal]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            self.header("Offset"),
            self.header("Field"),
            self.header("Value"),
        ]);

        for reveal in reveals {
            table.add_row(vec![
                Cell::new(reveal.offset),
                self.accent(&reveal.field),
                Cell::new(truncate(&reveal.value, 60)),
            ]);
        }

        table.to_string()
    }

    fn header(&self, text: &str) -> Cell {
        Cell::new(text).add_attribute(Attribute::Bold)
    }

    fn accent(&self, text: &str) -> Cell {
        let cell = Cell::new(text);
        if self.use_colors {
            cell.fg(Color::Cyan)
        } else {
            cell
        }
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_table_lists_every_rule() {
        let formatter = TableFormatter::with_config(false, Some(120));
        let rendered = formatter.format_rules(&RuleCatalog::standard());
        for rule in RuleCatalog::standard().rules() {
            assert!(rendered.contains(rule.name), "missing {}", rule.name);
        }
    }

    #[test]
    fn test_reveals_table() {
        let formatter = TableFormatter::with_config(false, Some(120));
        let rendered = formatter.format_reveals(&[Reveal {
            offset: 14,
            field: "score".to_string(),
            value: "7".to_string(),
        }]);
        assert!(rendered.contains("score"));
        assert!(rendered.contains("14"));
    }
}
