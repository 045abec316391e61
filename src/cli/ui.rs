use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Label,
    Positive,
    Negative,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).bold(),
        StyleType::Positive => style(text).green().bold(),
        StyleType::Negative => style(text).red().bold(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Styles a percent change green when non-negative, red otherwise.
pub fn style_change(change: f64) -> String {
    let text = format!("{change:+.2}%");
    if change >= 0.0 {
        style_text(&text, StyleType::Positive)
    } else {
        style_text(&text, StyleType::Negative)
    }
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right-aligned percentage with two decimals.
pub fn pct_cell(value: f64) -> Cell {
    Cell::new(format!("{value:.2}%")).set_alignment(CellAlignment::Right)
}

/// Percentage cell colored by the sign of `delta`.
pub fn drift_cell(value: f64, delta: f64) -> Cell {
    let cell = pct_cell(value);
    if delta > 0.0 {
        cell.fg(Color::Green)
    } else if delta < 0.0 {
        cell.fg(Color::Red)
    } else {
        cell
    }
}

/// Creates a new `indicatif::ProgressBar` with standard styling.
pub fn new_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}",
            )
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}
