use serde::{Deserialize, Serialize};

const GUEST_MAX_ITEMS_PER_FLOW: usize = 6;
const FREE_MAX_ITEMS_PER_FLOW: usize = 8;
const FREE_MAX_SAVED_FLOWS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Pro,
}

impl SubscriptionTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            _ => Err("subscription tier must be one of: free, pro".to_string()),
        }
    }
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The quota class an identity falls into. Derived state: recomputed from the
/// identity whenever auth or subscription changes, never mutated on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Guest,
    Free,
    Pro,
}

impl Tier {
    pub fn classify(is_authenticated: bool, subscription: SubscriptionTier) -> Self {
        if !is_authenticated {
            return Self::Guest;
        }
        match subscription {
            SubscriptionTier::Free => Self::Free,
            SubscriptionTier::Pro => Self::Pro,
        }
    }

    pub fn quota(self) -> QuotaPolicy {
        match self {
            Self::Guest => QuotaPolicy {
                max_saved_flows: Some(0),
                max_items_per_flow: Some(GUEST_MAX_ITEMS_PER_FLOW),
                can_save: false,
            },
            Self::Free => QuotaPolicy {
                max_saved_flows: Some(FREE_MAX_SAVED_FLOWS),
                max_items_per_flow: Some(FREE_MAX_ITEMS_PER_FLOW),
                can_save: true,
            },
            Self::Pro => QuotaPolicy {
                max_saved_flows: None,
                max_items_per_flow: None,
                can_save: true,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Free => "free",
            Self::Pro => "pro",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Numeric limits for a tier. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    pub max_saved_flows: Option<usize>,
    pub max_items_per_flow: Option<usize>,
    pub can_save: bool,
}

impl QuotaPolicy {
    pub fn allows_item_count(&self, count: usize) -> bool {
        match self.max_items_per_flow {
            Some(cap) => count <= cap,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_cannot_save_and_caps_items() {
        let quota = Tier::classify(false, SubscriptionTier::Pro).quota();
        assert!(!quota.can_save);
        assert_eq!(quota.max_items_per_flow, Some(6));
        assert_eq!(quota.max_saved_flows, Some(0));
    }

    #[test]
    fn unauthenticated_identity_is_guest_regardless_of_subscription() {
        assert_eq!(Tier::classify(false, SubscriptionTier::Free), Tier::Guest);
        assert_eq!(Tier::classify(false, SubscriptionTier::Pro), Tier::Guest);
    }

    #[test]
    fn free_tier_caps_flows_and_items() {
        let quota = Tier::classify(true, SubscriptionTier::Free).quota();
        assert!(quota.can_save);
        assert_eq!(quota.max_items_per_flow, Some(8));
        assert_eq!(quota.max_saved_flows, Some(3));
    }

    #[test]
    fn pro_tier_is_unbounded() {
        let quota = Tier::classify(true, SubscriptionTier::Pro).quota();
        assert!(quota.can_save);
        assert_eq!(quota.max_items_per_flow, None);
        assert_eq!(quota.max_saved_flows, None);
        assert!(quota.allows_item_count(usize::MAX));
    }

    #[test]
    fn item_count_check_is_inclusive_of_cap() {
        let quota = Tier::Free.quota();
        assert!(quota.allows_item_count(8));
        assert!(!quota.allows_item_count(9));
    }

    #[test]
    fn subscription_tier_parse_round_trips() {
        assert_eq!(SubscriptionTier::parse("pro").expect("pro"), SubscriptionTier::Pro);
        assert_eq!(
            SubscriptionTier::parse(" Free ").expect("free"),
            SubscriptionTier::Free
        );
        assert!(SubscriptionTier::parse("gold").is_err());
    }
}
