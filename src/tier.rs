use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    High,
    MidHigh,
    MidLow,
    Low,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Tier::High => "high",
            Tier::MidHigh => "mid-high",
            Tier::MidLow => "mid-low",
            Tier::Low => "low",
        }
    }

    /// Bar color used by the dashboard charts.
    pub fn color(self) -> &'static str {
        match self {
            Tier::High => "rgba(74, 222, 128, 0.9)",
            Tier::MidHigh => "rgba(250, 204, 21, 0.9)",
            Tier::MidLow => "rgba(251, 146, 60, 0.9)",
            Tier::Low => "rgba(239, 68, 68, 0.9)",
        }
    }
}

pub fn classify_tier(score: f64) -> Tier {
    if score >= 25.0 {
        Tier::High
    } else if score >= 20.0 {
        Tier::MidHigh
    } else if score >= 15.0 {
        Tier::MidLow
    } else {
        Tier::Low
    }
}
