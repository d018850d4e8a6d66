//! Approval thresholds for rule consensus
//!
//! A rule is approved only when both the absolute and the relative bar are met.

use serde::{Deserialize, Serialize};

/// Threshold pair taken from a voting configuration
///
/// - `min_approvals`: at least this many yes ballots
/// - `min_percentage`: yes ballots make up at least this share (0-100) of all ballots
///
/// Equality on either bar counts as met.
///
/// # Example
///
/// ```
/// use consensus_domain::voting::ApprovalThreshold;
///
/// let threshold = ApprovalThreshold::new(2, 50.0);
/// assert!(threshold.is_satisfied(2, 4));  // 2 >= 2, 50% >= 50%
/// assert!(!threshold.is_satisfied(1, 2)); // 1 < 2
/// assert!(!threshold.is_satisfied(2, 5)); // 40% < 50%
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApprovalThreshold {
    pub min_approvals: u32,
    pub min_percentage: f64,
}

impl ApprovalThreshold {
    pub fn new(min_approvals: u32, min_percentage: f64) -> Self {
        Self {
            min_approvals,
            min_percentage,
        }
    }

    /// Check if the threshold is satisfied given approval count and total ballots
    ///
    /// No ballots never satisfy a threshold, even a zero one.
    pub fn is_satisfied(&self, approvals: usize, total: usize) -> bool {
        if total == 0 {
            return false;
        }

        let enough_approvals = approvals as u64 >= u64::from(self.min_approvals);
        // approvals / total * 100 >= p, kept in multiplied form so that exact
        // boundaries (1 of 2 at 50%) do not lose precision.
        let enough_share = approvals as f64 * 100.0 >= self.min_percentage * total as f64;

        enough_approvals && enough_share
    }

    /// Get a human-readable description of this threshold
    pub fn description(&self) -> String {
        format!(
            "at least {} approvals and {}% approval",
            self.min_approvals, self.min_percentage
        )
    }
}

impl std::fmt::Display for ApprovalThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_counts_as_met() {
        let threshold = ApprovalThreshold::new(2, 50.0);
        // yes == min_approvals and share == min_percentage
        assert!(threshold.is_satisfied(2, 4));
    }

    #[test]
    fn test_absolute_bar() {
        let threshold = ApprovalThreshold::new(3, 0.0);
        assert!(!threshold.is_satisfied(2, 2));
        assert!(threshold.is_satisfied(3, 10));
    }

    #[test]
    fn test_percentage_bar() {
        let threshold = ApprovalThreshold::new(0, 75.0);
        assert!(!threshold.is_satisfied(2, 4));
        assert!(threshold.is_satisfied(3, 4));
        assert!(!threshold.is_satisfied(3, 5));
        assert!(threshold.is_satisfied(4, 5));
    }

    #[test]
    fn test_thirds_boundary() {
        let threshold = ApprovalThreshold::new(1, 100.0 / 3.0);
        assert!(threshold.is_satisfied(1, 3));
        assert!(!threshold.is_satisfied(1, 4));
    }

    #[test]
    fn test_zero_total() {
        assert!(!ApprovalThreshold::new(0, 0.0).is_satisfied(0, 0));
        assert!(!ApprovalThreshold::new(1, 50.0).is_satisfied(0, 0));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ApprovalThreshold::new(2, 50.0).to_string(),
            "at least 2 approvals and 50% approval"
        );
    }
}
