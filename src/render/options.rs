//! Area chart options, serialized in the camelCase layout chart libraries expect.

use serde::Serialize;

use crate::config::ChartConfig;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub chart: ChartSection,
    pub colors: Vec<String>,
    pub legend: Legend,
    pub stroke: Stroke,
    pub grid: Grid,
    pub data_labels: Enabled,
    pub markers: Markers,
    pub xaxis: XAxis,
    pub yaxis: YAxis,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSection {
    #[serde(rename = "type")]
    pub kind: String,
    pub height: u32,
    pub toolbar: Visible,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    pub show: bool,
    pub position: String,
    pub horizontal_align: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Stroke {
    pub width: Vec<u32>,
    pub curve: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Grid {
    pub xaxis: GridLines,
    pub yaxis: GridLines,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridLines {
    pub lines: Visible,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Markers {
    pub size: u32,
    pub colors: String,
    pub stroke_colors: Vec<String>,
    pub stroke_width: u32,
    pub stroke_opacity: f64,
    pub fill_opacity: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XAxis {
    #[serde(rename = "type")]
    pub kind: String,
    pub categories: Vec<String>,
    pub axis_border: Visible,
    pub axis_ticks: Visible,
}

#[derive(Debug, Clone, Serialize)]
pub struct YAxis {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Visible {
    pub show: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Enabled {
    pub enabled: bool,
}

impl ChartOptions {
    /// Options for the two-series area chart over `categories`
    pub fn area(config: &ChartConfig, categories: Vec<String>) -> Self {
        Self {
            chart: ChartSection {
                kind: "area".to_string(),
                height: config.height,
                toolbar: Visible { show: false },
            },
            colors: config.colors.to_vec(),
            legend: Legend {
                show: false,
                position: "top".to_string(),
                horizontal_align: "left".to_string(),
            },
            stroke: Stroke {
                width: vec![config.stroke_width; 2],
                curve: "straight".to_string(),
            },
            grid: Grid {
                xaxis: GridLines {
                    lines: Visible { show: true },
                },
                yaxis: GridLines {
                    lines: Visible { show: true },
                },
            },
            data_labels: Enabled { enabled: false },
            markers: Markers {
                size: config.marker_size,
                colors: "#fff".to_string(),
                stroke_colors: config.marker_stroke_colors.to_vec(),
                stroke_width: 3,
                stroke_opacity: 0.9,
                fill_opacity: 1.0,
            },
            xaxis: XAxis {
                kind: "category".to_string(),
                categories,
                axis_border: Visible { show: false },
                axis_ticks: Visible { show: false },
            },
            yaxis: YAxis {
                min: config.y_min,
                max: config.y_max,
            },
        }
    }
}
