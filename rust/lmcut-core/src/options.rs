use serde::{Deserialize, Serialize};

use crate::cost::CostPolicy;

pub const DEFAULT_INITIAL_BUCKETS: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicOptions {
    pub cost_policy: CostPolicy,
    /// Buckets preallocated by the relaxation queue; it grows past this on demand.
    /// The queue keeps one bucket per relaxed cost value up to the largest
    /// pushed, which the builder bounds through `MAX_ACTION_COST`.
    pub initial_buckets: usize,
}

impl Default for HeuristicOptions {
    fn default() -> Self {
        Self { cost_policy: CostPolicy::UseCost, initial_buckets: DEFAULT_INITIAL_BUCKETS }
    }
}

impl HeuristicOptions {
    pub fn with_policy(cost_policy: CostPolicy) -> Self {
        Self { cost_policy, ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_use_declared_costs() {
        let o = HeuristicOptions::default();
        assert_eq!(o.cost_policy, CostPolicy::UseCost);
        assert_eq!(o.initial_buckets, DEFAULT_INITIAL_BUCKETS);
    }

    #[test]
    fn deserializes_with_defaults_when_missing_fields() {
        let v = json!({ "cost_policy": "cost_plus_one" });
        let o: HeuristicOptions = serde_json::from_value(v).unwrap();
        assert_eq!(o.cost_policy, CostPolicy::CostPlusOne);
        assert_eq!(o.initial_buckets, DEFAULT_INITIAL_BUCKETS);

        let empty: HeuristicOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty, HeuristicOptions::default());
    }

    #[test]
    fn rejects_unknown_policy_names() {
        let v = json!({ "cost_policy": "lama" });
        assert!(serde_json::from_value::<HeuristicOptions>(v).is_err());
    }
}
