use tabled::{Table, Tabled, settings::Style};

use crate::storage::StoreStats;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

/// Render store statistics for the `stats` command
pub fn stats_table(stats: &StoreStats, threshold: f32) -> String {
    let mut builder = TableBuilder::new();
    builder.add_row("FAQ rows", &stats.faqs.to_string());
    builder.add_row("Vectors", &stats.vectors.to_string());
    builder.add_row(
        "Dimensions",
        &stats.dimensions.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
    );
    builder.add_row("Threshold", &format!("{:.2}", threshold));
    builder.build()
}
