pub mod cost;
pub mod engine;
pub mod errors;
pub mod gridworld;
pub mod model;
pub mod options;
pub mod state;

pub use cost::{Cost, CostPolicy, INFINITY, MAX_ACTION_COST};
pub use engine::{BestSupporter, BucketQueue, EvalStats, LmCutHeuristic, NestedBucketQueue};
pub use errors::ModelError;
pub use model::{Action, ActionId, ConditionalEffect, FluentId, ProblemBuilder, StripsProblem};
pub use options::HeuristicOptions;
pub use state::{FluentSet, State};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
