//! Savings goal progress

use serde::Serialize;

/// Coarse bucket for the savings progress bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingsTier {
    /// No target, or nothing left over
    None,
    /// Some progress, under half way
    Low,
    /// At least half way
    High,
    /// Target reached (over-achievement is not distinguished)
    Complete,
}

impl SavingsTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::High => "high",
            Self::Complete => "complete",
        }
    }

    fn for_percentage(percentage: f64) -> Self {
        if percentage >= 100.0 {
            Self::Complete
        } else if percentage >= 50.0 {
            Self::High
        } else if percentage > 0.0 {
            Self::Low
        } else {
            Self::None
        }
    }
}

impl std::fmt::Display for SavingsTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress toward the savings target
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SavingsProgress {
    pub target: f64,
    /// Percentage of the target covered, in `[0, 100]`
    pub percentage: f64,
    pub tier: SavingsTier,
}

impl SavingsProgress {
    pub fn empty() -> Self {
        Self {
            target: 0.0,
            percentage: 0.0,
            tier: SavingsTier::None,
        }
    }
}

/// Evaluate how much of `target` the remaining balance covers
pub fn evaluate(target: f64, remaining_balance: f64) -> SavingsProgress {
    if !target.is_finite() || target <= 0.0 {
        return SavingsProgress::empty();
    }

    let raw = remaining_balance / target * 100.0;
    let percentage = if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 100.0)
    };

    SavingsProgress {
        target,
        percentage,
        tier: SavingsTier::for_percentage(percentage),
    }
}
