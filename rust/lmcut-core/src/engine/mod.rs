pub mod bucket_queue;
pub mod lmcut;
pub mod nested_bucket_queue;
pub mod relevance;

pub use bucket_queue::BucketQueue;
pub use lmcut::{BestSupporter, EvalStats, LmCutHeuristic};
pub use nested_bucket_queue::NestedBucketQueue;
pub use relevance::{RelaxedTask, Trigger, TriggerId};
