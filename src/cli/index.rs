use super::{chart, ui};
use crate::core::basket::Basket;
use crate::core::config::IndexConfig;
use crate::core::{HistoryProvider, IndexReport, pipeline};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::Cell;
use std::path::Path;
use tracing::info;

impl IndexReport {
    pub fn display_summary(&self) -> String {
        let mut output = format!(
            "{}\n\n",
            ui::style_text(&self.title, ui::StyleType::Title)
        );

        let (first, last) = (self.index.first_date(), self.index.last_date());
        if let (Some(first), Some(last)) = (first, last) {
            output.push_str(&format!(
                "{} {} to {} {}\n",
                ui::style_text("Period:", ui::StyleType::Label),
                first,
                last,
                ui::style_text(
                    &format!("({} trading days)", self.index.dates.len()),
                    ui::StyleType::Subtle
                )
            ));
        }
        if let (Some(level), Some(change)) =
            (self.index.levels.last(), self.index.total_change_pct())
        {
            output.push_str(&format!(
                "{} {:.2} ({} since start)\n",
                ui::style_text("Index level:", ui::StyleType::Label),
                level,
                ui::style_change(change)
            ));
        }

        output
    }

    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();

        table.set_header(vec![
            ui::header_cell("Asset"),
            ui::header_cell("Initial Weight"),
            ui::header_cell("Final Weight"),
        ]);

        for (asset, initial, end) in self.weight_rows() {
            table.add_row(vec![
                Cell::new(asset),
                ui::pct_cell(initial),
                ui::drift_cell(end, end - initial),
            ]);
        }

        table.to_string()
    }
}

async fn compute_with_progress(
    config: &IndexConfig,
    provider: &(dyn HistoryProvider + Send + Sync),
    end: NaiveDate,
) -> Result<IndexReport> {
    let symbols = Basket::from_config(config)?.required_symbols().len() as u64;
    let pb = ui::new_progress_bar(symbols);
    pb.set_message("Fetching prices...");

    let result = pipeline::compute(config, provider, end, &|| pb.inc(1)).await;
    pb.finish_and_clear();

    Ok(result?)
}

/// Computes the index, prints summary and weights, and writes the chart.
pub async fn run(
    config: &IndexConfig,
    provider: &(dyn HistoryProvider + Send + Sync),
    end: NaiveDate,
    chart_path: &Path,
) -> Result<()> {
    let report = compute_with_progress(config, provider, end).await?;

    println!("{}", report.display_summary());
    println!("{}", report.display_as_table());

    std::fs::write(chart_path, chart::render_figure(&report))
        .with_context(|| format!("Failed to write chart to {}", chart_path.display()))?;
    info!("Chart written to {}", chart_path.display());
    println!(
        "\n{} {}",
        ui::style_text("Chart:", ui::StyleType::Label),
        chart_path.display()
    );

    Ok(())
}

/// Computes the index and prints only the weights table.
pub async fn run_weights(
    config: &IndexConfig,
    provider: &(dyn HistoryProvider + Send + Sync),
    end: NaiveDate,
) -> Result<()> {
    let report = compute_with_progress(config, provider, end).await?;
    println!("{}", report.display_as_table());
    Ok(())
}
