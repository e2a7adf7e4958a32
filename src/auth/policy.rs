use super::types::Tier;

/// Enterprise keys are effectively unmetered; the limit only exists so the
/// quota check stays a plain comparison.
pub const ENTERPRISE_SENTINEL: i64 = 999_999;

/// Canonical monthly request quota per tier.
///
/// Built once at start-up and shared read-only. Tests and deployments can
/// override individual limits with [`TierPolicy::with_limit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPolicy {
    limits: [i64; 4],
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            limits: [50, 500, 2_000, ENTERPRISE_SENTINEL],
        }
    }
}

impl TierPolicy {
    pub fn with_limit(mut self, tier: Tier, limit: i64) -> Self {
        self.limits[tier.index()] = limit;
        self
    }

    pub fn limit_for(&self, tier: Tier) -> i64 {
        self.limits[tier.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tier, i64)> + '_ {
        Tier::ALL.iter().map(move |tier| (*tier, self.limit_for(*tier)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let policy = TierPolicy::default();
        assert_eq!(policy.limit_for(Tier::Free), 50);
        assert_eq!(policy.limit_for(Tier::Basic), 500);
        assert_eq!(policy.limit_for(Tier::Pro), 2_000);
        assert_eq!(policy.limit_for(Tier::Enterprise), ENTERPRISE_SENTINEL);
    }

    #[test]
    fn test_lookup_is_stable() {
        let policy = TierPolicy::default();
        for tier in Tier::ALL {
            let first = policy.limit_for(tier);
            for _ in 0..10 {
                assert_eq!(policy.limit_for(tier), first);
            }
        }
        assert_eq!(policy, TierPolicy::default());
    }

    #[test]
    fn test_override_touches_one_tier() {
        let policy = TierPolicy::default().with_limit(Tier::Free, 3);
        assert_eq!(policy.limit_for(Tier::Free), 3);
        assert_eq!(policy.limit_for(Tier::Basic), 500);

        let listed: Vec<_> = policy.iter().collect();
        assert_eq!(listed[0], (Tier::Free, 3));
        assert_eq!(listed.len(), 4);
    }
}
