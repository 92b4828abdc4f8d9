use crate::assessment::readiness::{SeverityBand, APP_READINESS_POLICY, REPORT_READINESS_POLICY};

#[test]
fn report_policy_boundaries_belong_to_the_higher_tier() {
    let cases = [
        (100, "High Readiness"),
        (80, "High Readiness"),
        (79, "Moderate Readiness"),
        (60, "Moderate Readiness"),
        (59, "Developing Readiness"),
        (40, "Developing Readiness"),
        (39, "Early Stage"),
        (0, "Early Stage"),
    ];
    for (percentage, level) in cases {
        assert_eq!(
            REPORT_READINESS_POLICY.classify(percentage).level,
            level,
            "report policy at {percentage}%"
        );
    }
}

#[test]
fn app_policy_uses_its_own_cut_points() {
    let cases = [
        (90, "Audit Ready"),
        (89, "Nearly Ready"),
        (75, "Nearly Ready"),
        (74, "Moderate Readiness"),
        (60, "Moderate Readiness"),
        (59, "Not Ready"),
    ];
    for (percentage, level) in cases {
        assert_eq!(
            APP_READINESS_POLICY.classify(percentage).level,
            level,
            "app policy at {percentage}%"
        );
    }
}

#[test]
fn policies_disagree_for_the_same_score() {
    let report = REPORT_READINESS_POLICY.classify(85);
    let app = APP_READINESS_POLICY.classify(85);
    assert_eq!(report.level, "High Readiness");
    assert_eq!(report.severity_color, "#22c55e");
    assert_eq!(app.level, "Nearly Ready");
    assert_eq!(app.severity_color, "primary");
}

#[test]
fn tiers_are_ordered_and_cover_zero() {
    for policy in [REPORT_READINESS_POLICY, APP_READINESS_POLICY] {
        let bounds: Vec<u8> = policy.tiers().iter().map(|t| t.min_percentage).collect();
        assert_eq!(bounds.len(), 4, "{} policy", policy.name);
        assert!(bounds.windows(2).all(|pair| pair[0] > pair[1]));
        assert_eq!(bounds.last(), Some(&0));
    }
}

#[test]
fn severity_band_colours_and_labels() {
    let strong = SeverityBand::for_percentage(80);
    assert_eq!(strong, SeverityBand::Strong);
    assert_eq!(strong.chart_color(), "#22c55e");
    assert_eq!(strong.progress_color(), "#10b981");
    assert_eq!(strong.label(), "Good");

    let attention = SeverityBand::for_percentage(60);
    assert_eq!(attention.chart_color(), "#f59e0b");
    assert_eq!(attention.label(), "Needs Attention");

    let critical = SeverityBand::for_percentage(59);
    assert_eq!(critical.chart_color(), "#ef4444");
    assert_eq!(critical.progress_color(), "#ef4444");
    assert_eq!(critical.label(), "Critical");
}
