//! Terminal rendering of the area chart

use std::fmt::Write;

use super::options::ChartOptions;
use super::LegendEntry;
use crate::view::ChartSeries;

const BAR_CHARS: [char; 2] = ['█', '▒'];

pub(super) fn draw(
    options: &ChartOptions,
    series: &[ChartSeries],
    legend: &[LegendEntry],
    width: usize,
) -> String {
    let mut out = String::new();

    for (idx, entry) in legend.iter().enumerate() {
        let marker = BAR_CHARS[idx % BAR_CHARS.len()];
        let _ = write!(out, "{} {} ({})", marker, entry.name, entry.color);
        if let Some(period) = &entry.period {
            let _ = write!(out, "  {}", period);
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "y-axis: {} .. {}",
        format_value(options.yaxis.min),
        format_value(options.yaxis.max)
    );

    let categories = &options.xaxis.categories;
    let rows = series
        .iter()
        .map(|s| s.data.len())
        .chain(std::iter::once(categories.len()))
        .max()
        .unwrap_or(0);

    if rows == 0 {
        out.push_str("(no data)\n");
        return out;
    }

    let name_width = series.iter().map(|s| s.name.len()).max().unwrap_or(0);

    for row in 0..rows {
        let label = categories.get(row).map(String::as_str).unwrap_or("");
        for (idx, s) in series.iter().enumerate() {
            let shown_label = if idx == 0 { label } else { "" };
            let (value, fill) = match s.data.get(row) {
                Some(&v) => (
                    format_value(v),
                    bar(v, options.yaxis.min, options.yaxis.max, width, BAR_CHARS[idx % BAR_CHARS.len()]),
                ),
                None => ("-".to_string(), String::new()),
            };
            let _ = writeln!(
                out,
                "{:<8} {:<name_width$} {:>8} {}",
                shown_label,
                s.name,
                value,
                fill,
                name_width = name_width
            );
        }
    }

    out
}

/// Bar proportional to `value` within the axis bounds, clamped at both ends
fn bar(value: f64, min: f64, max: f64, width: usize, ch: char) -> String {
    let span = max - min;
    if span <= 0.0 || width == 0 {
        return String::new();
    }
    let ratio = ((value - min) / span).clamp(0.0, 1.0);
    let len = (ratio * width as f64).round() as usize;
    std::iter::repeat(ch).take(len).collect()
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.1}", v)
    }
}
