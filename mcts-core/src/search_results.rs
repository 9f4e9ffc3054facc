use crate::arena::NodeId;

/// Everything one round of [`crate::traverse::batch_traverse`] produces,
/// consumed by the caller's external model and then by
/// [`crate::backprop::batch_backpropagate`].
#[derive(Debug, Clone)]
pub struct SearchResults {
    /// Root-to-leaf path for each batch element, root first.
    pub search_paths: Vec<Vec<NodeId>>,
    /// The leaf each path ended at (an unexpanded node).
    pub leaf_node_ids: Vec<NodeId>,
    /// Head-0 actions taken at each step of the path, one shorter than the
    /// path itself.
    pub actions: Vec<Vec<i32>>,
    /// Index of the leaf's parent within its own search path (0 if the
    /// root itself was the leaf), i.e. the depth the external recurrent
    /// model should treat as the last-known latent state.
    pub latent_state_index_in_search_path: Vec<usize>,
    /// The latent state index, in the external model's own batch
    /// bookkeeping, to feed into the dynamics function together with the
    /// final action in `actions[i]`.
    pub latent_state_index_in_batch: Vec<usize>,
}

impl SearchResults {
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.search_paths.len()
    }
}
