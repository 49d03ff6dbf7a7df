use std::fmt;

/// Breeding-risk band for an inbreeding coefficient.
///
/// Bands follow the usual herd-book cut-offs: 6.25 % (first cousins), 12.5 %
/// (half siblings) and 25 %.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub const MODERATE_THRESHOLD: f64 = 0.0625;
    pub const HIGH_THRESHOLD: f64 = 0.125;
    pub const VERY_HIGH_THRESHOLD: f64 = 0.25;

    /// Classify a coefficient given as a fraction in `[0, 1]`.
    pub fn classify(coefficient: f64) -> Self {
        if coefficient >= Self::VERY_HIGH_THRESHOLD {
            RiskLevel::VeryHigh
        } else if coefficient >= Self::HIGH_THRESHOLD {
            RiskLevel::High
        } else if coefficient >= Self::MODERATE_THRESHOLD {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::VeryHigh => "very high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
