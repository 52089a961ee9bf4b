use std::env;

use anyhow::{anyhow, Context};

use lmcut_core::{CostPolicy, HeuristicOptions};

/// Heuristic settings taken from the environment. Command-line flags override them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub cost_policy: Option<CostPolicy>,
    pub initial_buckets: Option<usize>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let cost_policy = lookup("LMCUT_COST_POLICY")
            .map(|s| CostPolicy::parse(&s).ok_or_else(|| anyhow!("LMCUT_COST_POLICY: unknown cost policy {s:?}")))
            .transpose()?;
        let initial_buckets = lookup("LMCUT_INITIAL_BUCKETS")
            .map(|s| s.trim().parse::<usize>().with_context(|| format!("LMCUT_INITIAL_BUCKETS: invalid count {s:?}")))
            .transpose()?;
        Ok(Self { cost_policy, initial_buckets })
    }

    /// Layer `policy` and `buckets` from the command line over the environment.
    pub fn options(&self, policy: Option<CostPolicy>, buckets: Option<usize>) -> HeuristicOptions {
        let defaults = HeuristicOptions::default();
        HeuristicOptions {
            cost_policy: policy.or(self.cost_policy).unwrap_or(defaults.cost_policy),
            initial_buckets: buckets.or(self.initial_buckets).unwrap_or(defaults.initial_buckets),
        }
    }
}
