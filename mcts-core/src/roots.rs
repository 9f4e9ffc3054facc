use crate::action_codec::ActionCodec;
use crate::arena::{Arena, NodeId};
use crate::error::MctsError;
use crate::node::{add_exploration_noise, expand_node, get_trajectory, Node};

/// A fixed-size batch of independent root subtrees. Roots never share
/// nodes — each is its own arborescence inside the shared [`Arena`] — so a
/// batch of searches over unrelated game states can be driven in lock-step
/// through one `Roots` value.
pub struct Roots {
    pub arena: Arena,
    pub root_ids: Vec<NodeId>,
    pub codec: ActionCodec,
    pub legal_actions: Vec<Vec<i32>>,
}

impl Roots {
    /// Allocates `batch_size` empty, unexpanded roots, one per entry of
    /// `legal_actions`. Call [`Self::prepare`] or [`Self::prepare_no_noise`]
    /// before the first traversal.
    pub fn new(batch_size: usize, codec: ActionCodec, legal_actions: Vec<Vec<i32>>) -> Result<Self, MctsError> {
        if legal_actions.len() != batch_size {
            return Err(MctsError::BatchSizeMismatch {
                expected: batch_size,
                actual: legal_actions.len(),
            });
        }
        for actions in &legal_actions {
            codec.validate_legal_actions(actions)?;
        }

        let mut arena = Arena::new();
        let root_ids = (0..batch_size)
            .map(|batch_index| arena.push(Node::new_unexpanded(batch_index, -1, None)))
            .collect();
        Ok(Self {
            arena,
            root_ids,
            codec,
            legal_actions,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.root_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root_ids.is_empty()
    }

    fn validate_batch<T>(&self, name: &'static str, values: &[T]) -> Result<(), MctsError> {
        if values.len() != self.root_ids.len() {
            return Err(MctsError::BatchSizeMismatch {
                expected: self.root_ids.len(),
                actual: values.len(),
            });
        }
        let _ = name;
        Ok(())
    }

    /// Expands every root from the external model's initial inference and
    /// blends in Dirichlet exploration noise. Only `visit_count` (set to 1,
    /// reflecting the expansion itself) is touched beyond what
    /// [`expand_node`] sets — `value_sum` stays at 0 until the first
    /// simulation backpropagates through it.
    pub fn prepare(
        &mut self,
        root_exploration_fraction: f32,
        noises: &[Vec<f32>],
        value_prefixes: &[f32],
        policy_logits: &[Vec<f32>],
        to_plays: &[i32],
    ) -> Result<(), MctsError> {
        self.prepare_no_noise(value_prefixes, policy_logits, to_plays)?;
        self.validate_batch("noises", noises)?;
        for (batch_index, &root_id) in self.root_ids.iter().enumerate() {
            add_exploration_noise(&mut self.arena, root_id, &noises[batch_index], root_exploration_fraction);
        }
        Ok(())
    }

    /// Like [`Self::prepare`] but without exploration noise, for evaluation
    /// or deterministic play.
    pub fn prepare_no_noise(
        &mut self,
        value_prefixes: &[f32],
        policy_logits: &[Vec<f32>],
        to_plays: &[i32],
    ) -> Result<(), MctsError> {
        self.validate_batch("value_prefixes", value_prefixes)?;
        self.validate_batch("policy_logits", policy_logits)?;
        self.validate_batch("to_plays", to_plays)?;

        for (batch_index, &root_id) in self.root_ids.iter().enumerate() {
            expand_node(
                &mut self.arena,
                root_id,
                &self.codec,
                &self.legal_actions[batch_index],
                &policy_logits[batch_index],
                to_plays[batch_index],
                value_prefixes[batch_index],
                false,
                0,
            )?;
            self.arena.get_mut(root_id).visit_count = 1;
        }
        Ok(())
    }

    /// `(head-0 action, visit count)` pairs per root, the raw material for
    /// an external visit-count policy target.
    #[must_use]
    pub fn get_distributions(&self) -> Vec<Vec<(i32, u32)>> {
        self.root_ids
            .iter()
            .map(|&id| self.arena.get(id).get_children_distribution(&self.arena))
            .collect()
    }

    #[must_use]
    pub fn get_values(&self) -> Vec<f64> {
        self.root_ids.iter().map(|&id| self.arena.get(id).value()).collect()
    }

    #[must_use]
    pub fn get_trajectories(&self) -> Vec<Vec<i32>> {
        self.root_ids
            .iter()
            .map(|&id| get_trajectory(&self.arena, id, &self.codec))
            .collect()
    }
}
