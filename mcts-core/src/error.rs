use thiserror::Error;

/// Errors produced at the boundary of the search core.
///
/// Every variant here corresponds to a precondition violation by the
/// caller (a shape mismatch between batch-sized arguments, an out-of-range
/// action, or an invalid player marker) rather than anything recoverable
/// from within a single search step. Situations the core instead resolves
/// silently — looking up a child that was never expanded, or replaying a
/// trajectory from a leaf with no recorded selection — are not errors; see
/// [`crate::node::Node::get_trajectory`] and [`crate::node::Node::get_child`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MctsError {
    #[error("batch size mismatch: expected {expected}, got {actual}")]
    BatchSizeMismatch { expected: usize, actual: usize },

    #[error("legal action {action} out of range for {actions_per_head} actions per head")]
    LegalActionsOutOfRange { action: i32, actions_per_head: u32 },

    #[error("invalid to_play marker {to_play}: must be -1 (single player) or in 1..=2")]
    InvalidToPlay { to_play: i32 },
}
