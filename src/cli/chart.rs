//! SVG figure: index level line chart above the weights table.

use crate::core::IndexReport;
use chrono::{Datelike, NaiveDate};

const WIDTH: f64 = 960.0;
// Chart to table height ratio is 3:1 unless the table needs more room
const CHART_HEIGHT: f64 = 576.0;
const ROW_HEIGHT: f64 = 22.0;
const MARGIN: f64 = 36.0;
const MARGIN_LEFT: f64 = 64.0;
const MARGIN_TOP: f64 = 56.0;
const LINE_COLOR: &str = "#348dc1";
const GRID_COLOR: &str = "#cccccc";
const Y_TICKS: usize = 5;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Value range padded by 5%, widened when flat.
fn extent(values: &[f64]) -> Option<(f64, f64)> {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let min = finite.clone().fold(f64::INFINITY, f64::min);
    let max = finite.fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    if min == max {
        return Some((min - 1.0, max + 1.0));
    }
    let pad = (max - min) * 0.05;
    Some((min - pad, max + pad))
}

fn x_positions(len: usize) -> Vec<f64> {
    let inner = WIDTH - MARGIN_LEFT - MARGIN;
    match len {
        0 => Vec::new(),
        1 => vec![MARGIN_LEFT + inner / 2.0],
        _ => (0..len)
            .map(|i| MARGIN_LEFT + inner * i as f64 / (len - 1) as f64)
            .collect(),
    }
}

fn y_position(value: f64, min: f64, max: f64) -> f64 {
    let inner = CHART_HEIGHT - MARGIN_TOP - MARGIN;
    MARGIN_TOP + (1.0 - (value - min) / (max - min)) * inner
}

fn draw_y_axis(svg: &mut String, min: f64, max: f64) {
    for i in 0..Y_TICKS {
        let value = min + (max - min) * i as f64 / (Y_TICKS - 1) as f64;
        let y = y_position(value, min, max);
        svg.push_str(&format!(
            r#"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{GRID_COLOR}" stroke-opacity="0.4" stroke-dasharray="4 3" />"#,
            x1 = MARGIN_LEFT,
            x2 = WIDTH - MARGIN,
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="end" dy="3">{value:.1}</text>"#,
            x = MARGIN_LEFT - 6.0,
        ));
    }
    svg.push_str(&format!(
        r#"<text x="14" y="{y:.2}" text-anchor="middle" transform="rotate(-90 14 {y:.2})">Index Level</text>"#,
        y = (MARGIN_TOP + CHART_HEIGHT - MARGIN) / 2.0,
    ));
}

/// Monthly ticks and labels along the bottom of the chart.
fn draw_time_axis(svg: &mut String, dates: &[NaiveDate], xs: &[f64]) {
    let axis_y = CHART_HEIGHT - MARGIN;
    svg.push_str(&format!(
        r##"<line x1="{x1:.2}" y1="{axis_y:.2}" x2="{x2:.2}" y2="{axis_y:.2}" stroke="#000" stroke-width="1" />"##,
        x1 = MARGIN_LEFT,
        x2 = WIDTH - MARGIN,
    ));

    let mut last_month = None;
    for (date, x) in dates.iter().zip(xs) {
        let key = (date.year(), date.month());
        if last_month == Some(key) {
            continue;
        }
        last_month = Some(key);

        svg.push_str(&format!(
            r#"<line x1="{x:.2}" y1="{MARGIN_TOP:.2}" x2="{x:.2}" y2="{axis_y:.2}" stroke="{GRID_COLOR}" stroke-opacity="0.4" stroke-dasharray="4 3" />"#,
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"#,
            y = axis_y + 16.0,
            label = date.format("%Y-%m"),
        ));
    }
    svg.push_str(&format!(
        r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">Date</text>"#,
        x = (MARGIN_LEFT + WIDTH - MARGIN) / 2.0,
        y = axis_y + 32.0,
    ));
}

fn draw_legend(svg: &mut String, label: &str) {
    let x = MARGIN_LEFT + 12.0;
    let y = MARGIN_TOP + 18.0;
    svg.push_str(&format!(
        r##"<rect x="{rx:.2}" y="{ry:.2}" width="{w:.2}" height="24" fill="#fff" stroke="{GRID_COLOR}" />"##,
        rx = x - 6.0,
        ry = y - 15.0,
        w = 40.0 + label.chars().count() as f64 * 6.5,
    ));
    svg.push_str(&format!(
        r#"<line x1="{x:.2}" y1="{ly:.2}" x2="{x2:.2}" y2="{ly:.2}" stroke="{LINE_COLOR}" stroke-width="2" />"#,
        ly = y - 4.0,
        x2 = x + 22.0,
    ));
    svg.push_str(&format!(
        r##"<text x="{tx:.2}" y="{y:.2}" fill="#333">{label}</text>"##,
        tx = x + 28.0,
        label = escape(label),
    ));
}

fn draw_chart(svg: &mut String, report: &IndexReport) {
    let title = format!("{}: {} to {}", report.title, report.start, report.end);
    svg.push_str(&format!(
        r##"<text x="{x:.2}" y="28" text-anchor="middle" font-size="16" fill="#222">{title}</text>"##,
        x = WIDTH / 2.0,
        title = escape(&title),
    ));

    let levels = &report.index.levels;
    let Some((min, max)) = extent(levels) else {
        return;
    };
    let xs = x_positions(levels.len());

    draw_y_axis(svg, min, max);
    draw_time_axis(svg, &report.index.dates, &xs);

    let points = xs
        .iter()
        .zip(levels)
        .map(|(x, level)| format!("{x:.2},{:.2}", y_position(*level, min, max)))
        .collect::<Vec<_>>()
        .join(" ");
    svg.push_str(&format!(
        r#"<polyline fill="none" stroke="{LINE_COLOR}" stroke-width="1.5" points="{points}" />"#,
    ));

    if let Some(change) = report.index.total_change_pct() {
        draw_legend(svg, &format!("{}: {change:+.2}% since start", report.title));
    }
}

fn draw_weights_table(svg: &mut String, rows: &[(&str, f64, f64)], top: f64) {
    let headers = ["Asset", "Initial Weight", "Final Weight"];
    let table_width = WIDTH / 2.0;
    let col_width = table_width / headers.len() as f64;
    let left = (WIDTH - table_width) / 2.0;

    let draw_row = |svg: &mut String, index: usize, cells: [String; 3], header: bool| {
        let y = top + MARGIN / 2.0 + index as f64 * ROW_HEIGHT;
        let fill = if header { "#f0f0f0" } else { "#ffffff" };
        for (col, text) in cells.iter().enumerate() {
            let x = left + col as f64 * col_width;
            svg.push_str(&format!(
                r#"<rect x="{x:.2}" y="{y:.2}" width="{col_width:.2}" height="{ROW_HEIGHT:.2}" fill="{fill}" stroke="{GRID_COLOR}" />"#,
            ));
            svg.push_str(&format!(
                r##"<text x="{tx:.2}" y="{ty:.2}" text-anchor="middle" font-size="12" fill="#222"{weight}>{text}</text>"##,
                tx = x + col_width / 2.0,
                ty = y + ROW_HEIGHT / 2.0 + 4.0,
                weight = if header { r#" font-weight="bold""# } else { "" },
                text = escape(text),
            ));
        }
    };

    draw_row(svg, 0, headers.map(str::to_string), true);
    for (i, (asset, initial, end)) in rows.iter().enumerate() {
        draw_row(
            svg,
            i + 1,
            [
                asset.to_string(),
                format!("{initial:.2}%"),
                format!("{end:.2}%"),
            ],
            false,
        );
    }
}

/// Renders the combined figure as a standalone SVG document.
pub fn render_figure(report: &IndexReport) -> String {
    let rows: Vec<(&str, f64, f64)> = report.weight_rows().collect();
    let table_height = (ROW_HEIGHT * (rows.len() + 1) as f64 + MARGIN).max(CHART_HEIGHT / 3.0);
    let height = CHART_HEIGHT + table_height;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{height}" viewBox="0 0 {WIDTH} {height}"><style>text{{font-family:Arial,sans-serif;font-size:11px;fill:#555}}</style>"#,
    );
    svg.push_str(&format!(
        r##"<rect width="{WIDTH}" height="{height}" fill="#ffffff" />"##
    ));
    draw_chart(&mut svg, report);
    draw_weights_table(&mut svg, &rows, CHART_HEIGHT);
    svg.push_str("</svg>");
    svg
}
