pub mod common;
pub mod propagation;
pub mod reachability;

pub use common::{GraphView, NodeId};
pub use propagation::{propagate, PropagationConfig, PropagationResult, Reached};
pub use reachability::{reachable_within, Direction};
