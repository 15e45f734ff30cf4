//! Allocation Policy

/// Identifier of the payment method that represents a loyalty points balance.
pub const DEFAULT_LOYALTY_METHOD_ID: &str = "PUNKTY";

/// Discount granted when at least this share of an order is paid with points.
pub const PARTIAL_POINTS_PERCENT: u8 = 10;

/// Fixed rules the allocation engine runs under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPolicy {
    /// Identifier of the loyalty points method in the catalog
    pub loyalty_method_id: String,

    /// Percentage of the order value that must be paid with points to earn the
    /// partial-points discount, and the discount it earns.
    ///
    /// A card promotion offering at least this percentage always beats partial points.
    pub partial_points_percent: u8,
}

impl AllocationPolicy {
    /// Policy with a custom loyalty method identifier and the default partial-points rule.
    pub fn with_loyalty_method(loyalty_method_id: impl Into<String>) -> Self {
        Self {
            loyalty_method_id: loyalty_method_id.into(),
            ..Self::default()
        }
    }

    /// Whether `method_id` names the loyalty points method.
    pub fn is_loyalty(&self, method_id: &str) -> bool {
        self.loyalty_method_id == method_id
    }
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            loyalty_method_id: DEFAULT_LOYALTY_METHOD_ID.to_string(),
            partial_points_percent: PARTIAL_POINTS_PERCENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_uses_points_and_ten_percent() {
        let policy = AllocationPolicy::default();

        assert!(policy.is_loyalty("PUNKTY"));
        assert!(!policy.is_loyalty("mZysk"));
        assert_eq!(policy.partial_points_percent, 10);
    }

    #[test]
    fn custom_loyalty_method_keeps_partial_rule() {
        let policy = AllocationPolicy::with_loyalty_method("POINTS");

        assert!(policy.is_loyalty("POINTS"));
        assert!(!policy.is_loyalty("PUNKTY"));
        assert_eq!(policy.partial_points_percent, PARTIAL_POINTS_PERCENT);
    }
}
