use serde::{Deserialize, Serialize};

/// Relaxed cost of a fluent, a trigger or a whole goal.
pub type Cost = u32;

/// Value of anything not reachable under the delete relaxation.
pub const INFINITY: Cost = Cost::MAX;

/// Largest declared action cost a problem may carry. Relaxed costs index the
/// buckets of the propagation queue, so they have to stay small.
pub const MAX_ACTION_COST: Cost = 1 << 20;

/// How declared action costs are turned into the costs the heuristic charges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostPolicy {
    /// Every action costs 1.
    Ignore,
    /// The declared cost.
    #[default]
    UseCost,
    /// Declared cost plus one, so zero-cost actions still count.
    CostPlusOne,
}

impl CostPolicy {
    pub fn apply(self, declared: Cost) -> Cost {
        match self {
            CostPolicy::Ignore => 1,
            CostPolicy::UseCost => declared,
            CostPolicy::CostPlusOne => declared.saturating_add(1),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "ignore" | "unit" => Some(CostPolicy::Ignore),
            "use_cost" | "cost" => Some(CostPolicy::UseCost),
            "cost_plus_one" | "plus_one" => Some(CostPolicy::CostPlusOne),
            _ => None,
        }
    }
}

pub fn display_cost(c: Cost) -> String {
    if c == INFINITY { "inf".to_string() } else { c.to_string() }
}
