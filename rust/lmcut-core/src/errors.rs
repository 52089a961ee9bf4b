use thiserror::Error;

use crate::cost::Cost;
use crate::model::FluentId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("{context} refers to fluent {fluent}, but the problem has {num_fluents} fluents")]
    UnknownFluent { context: String, fluent: FluentId, num_fluents: usize },
    #[error("action {0:?} is defined more than once")]
    DuplicateAction(String),
    #[error("action {action:?} costs {cost}, above the limit of {max}")]
    CostTooLarge { action: String, cost: Cost, max: Cost },
    #[error("invalid instance: {0}")]
    InvalidInstance(String),
}
