//! Radar and bar chart geometry computed by hand so the report stays a
//! static document with no runtime charting dependency.

use super::markup::{escape_html, format_coord};
use crate::assessment::readiness::SeverityBand;
use serde::Serialize;
use std::f64::consts::PI;
use std::fmt::Write;

pub const RADAR_SIZE: f64 = 300.0;
pub const RADAR_CENTER: f64 = RADAR_SIZE / 2.0;
pub const RADAR_RADIUS: f64 = 100.0;
pub const RADAR_RING_COUNT: usize = 5;
pub const RADAR_LABEL_OFFSET: f64 = 25.0;
pub const RADAR_LABEL_MAX_CHARS: usize = 15;

pub const BAR_CHART_WIDTH: f64 = 320.0;
pub const BAR_MAX_WIDTH: f64 = 160.0;
pub const BAR_HEIGHT: f64 = 16.0;
pub const BAR_ROW_SPACING: f64 = 28.0;
pub const BAR_TOP_OFFSET: f64 = 15.0;
pub const BAR_LEFT_MARGIN: f64 = 100.0;
pub const BAR_LABEL_MAX_CHARS: usize = 20;
pub const BAR_TRACK_COLOR: &str = "#e5e7eb";

const GRID_STROKE: &str = "#e5e7eb";
const LABEL_FILL: &str = "#374151";

/// One category plotted on a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartEntry {
    pub label: String,
    pub percentage: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    fn polar(radius: f64, angle: f64) -> Self {
        Self {
            x: RADAR_CENTER + radius * angle.cos(),
            y: RADAR_CENTER + radius * angle.sin(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarLabel {
    pub anchor: Point,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarChart {
    pub center: Point,
    pub ring_radii: Vec<f64>,
    /// Outer end of each spoke; spokes start at `center`.
    pub spoke_ends: Vec<Point>,
    pub vertices: Vec<Point>,
    pub labels: Vec<RadarLabel>,
}

/// Angle of category `index` out of `count`, starting at the top and
/// advancing clockwise in screen coordinates.
pub fn radar_angle(index: usize, count: usize) -> f64 {
    (index as f64 * 2.0 * PI) / count as f64 - PI / 2.0
}

pub fn radar_chart(entries: &[ChartEntry]) -> RadarChart {
    let count = entries.len();
    let ring_radii = (1..=RADAR_RING_COUNT)
        .map(|step| RADAR_RADIUS * step as f64 / RADAR_RING_COUNT as f64)
        .collect();

    let mut spoke_ends = Vec::with_capacity(count);
    let mut vertices = Vec::with_capacity(count);
    let mut labels = Vec::with_capacity(count);

    for (index, entry) in entries.iter().enumerate() {
        let angle = radar_angle(index, count);
        spoke_ends.push(Point::polar(RADAR_RADIUS, angle));

        let score = f64::from(entry.percentage.min(100));
        vertices.push(Point::polar(RADAR_RADIUS * score / 100.0, angle));

        labels.push(RadarLabel {
            anchor: Point::polar(RADAR_RADIUS + RADAR_LABEL_OFFSET, angle),
            text: truncate_label(&entry.label, RADAR_LABEL_MAX_CHARS, RADAR_LABEL_MAX_CHARS),
        });
    }

    RadarChart {
        center: Point {
            x: RADAR_CENTER,
            y: RADAR_CENTER,
        },
        ring_radii,
        spoke_ends,
        vertices,
        labels,
    }
}

impl RadarChart {
    /// SVG path through every vertex in category order, closed back to the first.
    pub fn polygon_path(&self) -> String {
        let mut path = String::new();
        for (index, vertex) in self.vertices.iter().enumerate() {
            let command = if index == 0 { "M" } else { " L" };
            let _ = write!(
                path,
                "{command} {} {}",
                format_coord(vertex.x),
                format_coord(vertex.y)
            );
        }
        if !path.is_empty() {
            path.push_str(" Z");
        }
        path
    }

    pub fn to_svg(&self) -> String {
        let center_x = format_coord(self.center.x);
        let center_y = format_coord(self.center.y);
        let mut svg = String::new();
        let height = RADAR_SIZE + 40.0;
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = format_coord(RADAR_SIZE),
            h = format_coord(height),
        );

        for radius in &self.ring_radii {
            let _ = write!(
                svg,
                r#"<circle cx="{center_x}" cy="{center_y}" r="{}" fill="none" stroke="{GRID_STROKE}" stroke-width="1"/>"#,
                format_coord(*radius)
            );
        }

        for end in &self.spoke_ends {
            let _ = write!(
                svg,
                r#"<line x1="{center_x}" y1="{center_y}" x2="{}" y2="{}" stroke="{GRID_STROKE}" stroke-width="1"/>"#,
                format_coord(end.x),
                format_coord(end.y)
            );
        }

        let path = self.polygon_path();
        if !path.is_empty() {
            let _ = write!(
                svg,
                r##"<path d="{path}" fill="rgba(37, 99, 235, 0.2)" stroke="#2563eb" stroke-width="2"/>"##
            );
        }

        for label in &self.labels {
            let _ = write!(
                svg,
                r#"<text x="{}" y="{}" text-anchor="middle" dominant-baseline="middle" font-size="8" fill="{LABEL_FILL}">{}</text>"#,
                format_coord(label.anchor.x),
                format_coord(label.anchor.y),
                escape_html(&label.text)
            );
        }

        svg.push_str("</svg>");
        svg
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarRow {
    pub track: Rect,
    pub bar: Rect,
    pub color: &'static str,
    pub name: String,
    pub value: String,
    /// Baseline for both text labels.
    pub text_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub width: f64,
    pub height: f64,
    pub rows: Vec<BarRow>,
}

pub fn bar_length(percentage: u8) -> f64 {
    f64::from(percentage.min(100)) / 100.0 * BAR_MAX_WIDTH
}

pub fn bar_chart(entries: &[ChartEntry]) -> BarChart {
    let rows = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let y = index as f64 * BAR_ROW_SPACING + BAR_TOP_OFFSET;
            BarRow {
                track: Rect {
                    x: BAR_LEFT_MARGIN,
                    y,
                    width: BAR_MAX_WIDTH,
                    height: BAR_HEIGHT,
                },
                bar: Rect {
                    x: BAR_LEFT_MARGIN,
                    y,
                    width: bar_length(entry.percentage),
                    height: BAR_HEIGHT,
                },
                color: SeverityBand::for_percentage(entry.percentage).chart_color(),
                name: truncate_label(&entry.label, BAR_LABEL_MAX_CHARS, BAR_LABEL_MAX_CHARS - 2),
                value: format!("{}%", entry.percentage),
                text_y: y + 12.0,
            }
        })
        .collect();

    BarChart {
        width: BAR_CHART_WIDTH,
        height: entries.len() as f64 * BAR_ROW_SPACING + 30.0,
        rows,
    }
}

impl BarChart {
    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" style="margin: 0 auto; display: block;">"#,
            w = format_coord(self.width),
            h = format_coord(self.height),
        );

        for row in &self.rows {
            let _ = write!(
                svg,
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{BAR_TRACK_COLOR}" rx="2"/>"#,
                format_coord(row.track.x),
                format_coord(row.track.y),
                format_coord(row.track.width),
                format_coord(row.track.height)
            );
            let _ = write!(
                svg,
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" rx="2"/>"#,
                format_coord(row.bar.x),
                format_coord(row.bar.y),
                format_coord(row.bar.width),
                format_coord(row.bar.height),
                row.color
            );
            let _ = write!(
                svg,
                r#"<text x="{}" y="{}" text-anchor="end" font-size="9" fill="{LABEL_FILL}">{}</text>"#,
                format_coord(BAR_LEFT_MARGIN - 5.0),
                format_coord(row.text_y),
                escape_html(&row.name)
            );
            let _ = write!(
                svg,
                r#"<text x="{}" y="{}" font-size="9" fill="{LABEL_FILL}" font-weight="bold">{}</text>"#,
                format_coord(BAR_LEFT_MARGIN + BAR_MAX_WIDTH + 5.0),
                format_coord(row.text_y),
                escape_html(&row.value)
            );
        }

        svg.push_str("</svg>");
        svg
    }
}

/// Shortens labels longer than `max_chars` to `keep` characters plus "...".
pub fn truncate_label(label: &str, max_chars: usize, keep: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let mut truncated: String = label.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}
