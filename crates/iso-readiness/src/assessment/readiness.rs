use serde::Serialize;

/// One row of a readiness threshold table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadinessTier {
    /// Inclusive lower bound of the tier, in whole percent.
    pub min_percentage: u8,
    pub level: &'static str,
    pub severity_color: &'static str,
    pub description: &'static str,
}

/// Ordered threshold table mapping an aggregate percentage to a tier.
///
/// Two tables ship with the crate and they deliberately disagree on cut
/// points: the emailed report uses 80/60/40, the in-app summary 90/75/60.
/// Keep them separate; merging would change labels users already see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadinessPolicy {
    pub name: &'static str,
    /// Sorted by descending `min_percentage`; the last tier starts at 0.
    tiers: &'static [ReadinessTier],
}

impl ReadinessPolicy {
    /// Picks the tier with the highest lower bound not exceeding `percentage`.
    pub fn classify(&self, percentage: u8) -> ReadinessTier {
        self.tiers
            .iter()
            .copied()
            .filter(|tier| tier.min_percentage <= percentage)
            .max_by_key(|tier| tier.min_percentage)
            .unwrap_or(self.tiers[self.tiers.len() - 1])
    }

    pub fn tiers(&self) -> &'static [ReadinessTier] {
        self.tiers
    }
}

pub const REPORT_READINESS_POLICY: ReadinessPolicy = ReadinessPolicy {
    name: "report",
    tiers: &[
        ReadinessTier {
            min_percentage: 80,
            level: "High Readiness",
            severity_color: "#22c55e",
            description: "Your organization demonstrates excellent ISO 9001 readiness with strong QMS foundations.",
        },
        ReadinessTier {
            min_percentage: 60,
            level: "Moderate Readiness",
            severity_color: "#f59e0b",
            description: "Your organization shows good progress but requires focused improvements in key areas.",
        },
        ReadinessTier {
            min_percentage: 40,
            level: "Developing Readiness",
            severity_color: "#f97316",
            description: "Your organization has basic foundations but needs significant development to meet ISO 9001 requirements.",
        },
        ReadinessTier {
            min_percentage: 0,
            level: "Early Stage",
            severity_color: "#ef4444",
            description: "Your organization requires comprehensive QMS development to achieve ISO 9001 compliance.",
        },
    ],
};

pub const APP_READINESS_POLICY: ReadinessPolicy = ReadinessPolicy {
    name: "app",
    tiers: &[
        ReadinessTier {
            min_percentage: 90,
            level: "Audit Ready",
            severity_color: "success",
            description: "Your organization demonstrates excellent ISO 9001 compliance and is ready for certification audit.",
        },
        ReadinessTier {
            min_percentage: 75,
            level: "Nearly Ready",
            severity_color: "primary",
            description: "Good compliance level. Address remaining gaps before scheduling your audit.",
        },
        ReadinessTier {
            min_percentage: 60,
            level: "Moderate Readiness",
            severity_color: "warning",
            description: "Several areas need improvement. Focus on critical gaps before considering audit.",
        },
        ReadinessTier {
            min_percentage: 0,
            level: "Not Ready",
            severity_color: "destructive",
            description: "Significant work required. Consider engaging a consultant to address major compliance gaps.",
        },
    ],
};

/// Three-step colouring shared by chart bars, progress indicators and the
/// in-app chapter summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityBand {
    Strong,
    Attention,
    Critical,
}

impl SeverityBand {
    pub const fn for_percentage(percentage: u8) -> Self {
        if percentage >= 80 {
            Self::Strong
        } else if percentage >= 60 {
            Self::Attention
        } else {
            Self::Critical
        }
    }

    /// Fill used by the bar chart.
    pub const fn chart_color(self) -> &'static str {
        match self {
            Self::Strong => "#22c55e",
            Self::Attention => "#f59e0b",
            Self::Critical => "#ef4444",
        }
    }

    /// Fill used by the per-chapter progress indicators in the report.
    pub const fn progress_color(self) -> &'static str {
        match self {
            Self::Strong => "#10b981",
            Self::Attention => "#f59e0b",
            Self::Critical => "#ef4444",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Strong => "Good",
            Self::Attention => "Needs Attention",
            Self::Critical => "Critical",
        }
    }
}
