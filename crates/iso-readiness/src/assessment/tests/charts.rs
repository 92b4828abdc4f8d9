use crate::assessment::report::charts::{
    bar_chart, radar_angle, radar_chart, truncate_label, ChartEntry, Point, BAR_MAX_WIDTH,
    BAR_TRACK_COLOR, RADAR_CENTER,
};
use std::f64::consts::PI;

fn entries(percentages: &[u8]) -> Vec<ChartEntry> {
    percentages
        .iter()
        .enumerate()
        .map(|(index, percentage)| ChartEntry {
            label: format!("Area {index}"),
            percentage: *percentage,
        })
        .collect()
}

fn assert_close(actual: Point, expected: (f64, f64)) {
    assert!(
        (actual.x - expected.0).abs() < 1e-9 && (actual.y - expected.1).abs() < 1e-9,
        "expected {expected:?}, got ({}, {})",
        actual.x,
        actual.y
    );
}

#[test]
fn full_scores_sit_on_the_outer_radius() {
    let chart = radar_chart(&entries(&[100, 100, 100, 100]));

    assert_close(chart.vertices[0], (150.0, 50.0));
    assert_close(chart.vertices[1], (250.0, 150.0));
    assert_close(chart.vertices[2], (150.0, 250.0));
    assert_close(chart.vertices[3], (50.0, 150.0));
    assert_eq!(chart.vertices, chart.spoke_ends);
    assert_eq!(chart.polygon_path(), "M 150 50 L 250 150 L 150 250 L 50 150 Z");
}

#[test]
fn zero_scores_collapse_to_the_centre() {
    let chart = radar_chart(&entries(&[0, 0, 0, 0, 0, 0, 0]));
    for vertex in &chart.vertices {
        assert_close(*vertex, (RADAR_CENTER, RADAR_CENTER));
    }
}

#[test]
fn first_axis_points_up_and_advances_clockwise() {
    assert!((radar_angle(0, 7) + PI / 2.0).abs() < 1e-12);
    assert!((radar_angle(1, 4)).abs() < 1e-12);
    assert!((radar_angle(2, 4) - PI / 2.0).abs() < 1e-12);
}

#[test]
fn grid_has_five_evenly_spaced_rings() {
    let chart = radar_chart(&entries(&[50, 60, 70]));
    assert_eq!(chart.ring_radii, vec![20.0, 40.0, 60.0, 80.0, 100.0]);
    assert_eq!(chart.spoke_ends.len(), 3);
    assert_close(chart.labels[0].anchor, (150.0, 25.0));
}

#[test]
fn radar_labels_are_truncated_with_ellipsis() {
    let chart = radar_chart(&[ChartEntry {
        label: "Context of the Organization".to_string(),
        percentage: 40,
    }]);
    assert_eq!(chart.labels[0].text, "Context of the ...");
    assert_eq!(truncate_label("Leadership", 15, 15), "Leadership");
}

#[test]
fn empty_radar_has_no_polygon() {
    let chart = radar_chart(&[]);
    assert!(chart.polygon_path().is_empty());
    let svg = chart.to_svg();
    assert!(svg.starts_with("<svg"));
    assert!(!svg.contains("<path"));
    assert_eq!(svg.matches("<circle").count(), 5);
}

#[test]
fn bars_scale_and_colour_by_severity() {
    let chart = bar_chart(&[
        ChartEntry {
            label: "Leadership".to_string(),
            percentage: 85,
        },
        ChartEntry {
            label: "Performance Evaluation".to_string(),
            percentage: 45,
        },
    ]);

    assert_eq!(chart.width, 320.0);
    assert_eq!(chart.height, 86.0);

    let first = &chart.rows[0];
    assert_eq!(first.bar.width, 136.0);
    assert_eq!(first.track.width, BAR_MAX_WIDTH);
    assert_eq!(first.color, "#22c55e");
    assert_eq!(first.value, "85%");

    let second = &chart.rows[1];
    assert_eq!(second.bar.y, 43.0);
    assert_eq!(second.text_y, 55.0);
    assert_eq!(second.bar.width, 72.0);
    assert_eq!(second.color, "#ef4444");
    assert_eq!(second.name, "Performance Evalua...");

    let svg = chart.to_svg();
    assert_eq!(
        svg.matches(&format!("fill=\"{BAR_TRACK_COLOR}\"")).count(),
        2
    );
    assert!(svg.contains(">85%</text>"));
}

#[test]
fn chart_labels_are_escaped() {
    let chart = bar_chart(&[ChartEntry {
        label: "R&D <Ops>".to_string(),
        percentage: 70,
    }]);
    let svg = chart.to_svg();
    assert!(svg.contains("R&amp;D &lt;Ops&gt;"));
    assert!(!svg.contains("<Ops>"));
}
