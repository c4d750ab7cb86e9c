//! Time horizons the consolidator runs against.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Horizon {
    pub const ALL: [Horizon; 5] =
        [Horizon::Daily, Horizon::Weekly, Horizon::Monthly, Horizon::Quarterly, Horizon::Yearly];

    /// Minimum age, in days, a memory must have to be a candidate for this
    /// horizon's run (e.g. weekly selects memories at least 7 days old).
    pub fn threshold_days(self) -> f64 {
        match self {
            Horizon::Daily => 1.0,
            Horizon::Weekly => 7.0,
            Horizon::Monthly => 30.0,
            Horizon::Quarterly => 90.0,
            Horizon::Yearly => 365.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Horizon::Daily => "daily",
            Horizon::Weekly => "weekly",
            Horizon::Monthly => "monthly",
            Horizon::Quarterly => "quarterly",
            Horizon::Yearly => "yearly",
        }
    }
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_increase_with_horizon_length() {
        assert!(Horizon::Daily.threshold_days() < Horizon::Weekly.threshold_days());
        assert!(Horizon::Weekly.threshold_days() < Horizon::Monthly.threshold_days());
        assert!(Horizon::Monthly.threshold_days() < Horizon::Quarterly.threshold_days());
        assert!(Horizon::Quarterly.threshold_days() < Horizon::Yearly.threshold_days());
    }
}
