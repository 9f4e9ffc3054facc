use std::collections::HashMap;

use crate::action_codec::ActionCodec;
use crate::arena::{Arena, NodeId};
use crate::error::MctsError;

/// One vertex of a search tree.
///
/// `value_prefix` and `is_reset` describe the edge leading into this node
/// (an LSTM-style accumulated reward, and whether that accumulator was just
/// reset rather than continued from the parent): see
/// [`expand_node`] for how a child's true one-step reward is recovered from
/// them during backpropagation.
#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub batch_index: usize,
    /// Player to move at this node. `-1` for single-player search; `1` or
    /// `2` for two-player search. Meaningless on an unexpanded node — it is
    /// only assigned when the node itself is expanded.
    pub to_play: i32,
    pub prior: f32,
    pub visit_count: u32,
    pub value_sum: f64,
    pub value_prefix: f32,
    /// Cached copy of the parent's `value_prefix`, captured at expansion
    /// time so backpropagation never needs a second arena lookup per step.
    pub parent_value_prefix: f32,
    /// Cached copy of the parent's `is_reset`, captured alongside
    /// `parent_value_prefix` — see [`child_true_reward`].
    pub parent_is_reset: bool,
    pub is_reset: bool,
    pub current_latent_state_index: usize,
    pub legal_actions: Vec<i32>,
    /// Flat action key (via [`ActionCodec`]) to `(head-0 action, child id)`.
    pub children: HashMap<u32, (i32, NodeId)>,
    /// The head-0 action selected the last time this node was traversed;
    /// `-1` if it has never been selected through.
    pub best_action: i32,
}

impl Node {
    #[must_use]
    pub fn new_unexpanded(batch_index: usize, to_play: i32, parent: Option<NodeId>) -> Self {
        Self {
            parent,
            batch_index,
            to_play,
            prior: 0.0,
            visit_count: 0,
            value_sum: 0.0,
            value_prefix: 0.0,
            parent_value_prefix: 0.0,
            parent_is_reset: false,
            is_reset: false,
            current_latent_state_index: 0,
            legal_actions: Vec::new(),
            children: HashMap::new(),
            best_action: -1,
        }
    }

    #[must_use]
    pub fn expanded(&self) -> bool {
        !self.children.is_empty()
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / f64::from(self.visit_count)
        }
    }

    #[must_use]
    pub fn get_child(&self, head_zero_action: i32, codec: &ActionCodec) -> Option<NodeId> {
        self.children
            .get(&codec.encode_selected_action(head_zero_action))
            .map(|&(_, id)| id)
    }

    /// `(head-0 action, visit count)` for every expanded child, used to
    /// build an external policy training target.
    #[must_use]
    pub fn get_children_distribution(&self, arena: &Arena) -> Vec<(i32, u32)> {
        let mut dist: Vec<(i32, u32)> = self
            .children
            .values()
            .map(|&(action, id)| (action, arena.get(id).visit_count))
            .collect();
        dist.sort_by_key(|&(action, _)| action);
        dist
    }

    /// Average backed-up value across visited children, used as a fallback
    /// ("first play urgency") Q estimate for children that have never been
    /// visited.
    #[must_use]
    pub fn compute_mean_q(&self, arena: &Arena, discount: f64) -> f64 {
        let mut total = 0.0;
        let mut count = 0u32;
        for &(_, child_id) in self.children.values() {
            let child = arena.get(child_id);
            if child.visit_count == 0 {
                continue;
            }
            let true_reward = child_true_reward(child);
            let q = if self.to_play != child.to_play && self.to_play != -1 {
                -true_reward + discount * child.value()
            } else {
                true_reward + discount * child.value()
            };
            total += q;
            count += 1;
        }
        if count == 0 {
            self.value()
        } else {
            total / f64::from(count)
        }
    }
}

/// A child's one-step reward, recovered from its own `value_prefix` and its
/// parent's cached `value_prefix`/`is_reset` (the parent's reset flag, not
/// the child's own — the accumulator either continues through the child or
/// was just reset at the parent, and either way it is the parent's state
/// that decides which).
#[must_use]
pub fn child_true_reward(child: &Node) -> f64 {
    if child.parent_is_reset {
        f64::from(child.value_prefix)
    } else {
        f64::from(child.value_prefix) - f64::from(child.parent_value_prefix)
    }
}

/// Expands a leaf: assigns it the inference outputs it was just given
/// (`to_play`, `value_prefix`, `is_reset`, `current_latent_state_index`)
/// and creates one unexpanded child per legal action, with priors from a
/// softmax of `policy_logits` restricted to `legal_actions`.
///
/// `is_reset` here describes *this* node's own accumulator — it becomes the
/// parent's cached flag children read back via [`child_true_reward`] once
/// they themselves are expanded.
pub fn expand_node(
    arena: &mut Arena,
    id: NodeId,
    codec: &ActionCodec,
    legal_actions: &[i32],
    policy_logits: &[f32],
    to_play: i32,
    value_prefix: f32,
    is_reset: bool,
    latent_state_index: usize,
) -> Result<(), MctsError> {
    if to_play != -1 && !(1..=2).contains(&to_play) {
        return Err(MctsError::InvalidToPlay { to_play });
    }
    codec.validate_legal_actions(legal_actions)?;

    let (parent_value_prefix, parent_is_reset) = match arena.get(id).parent {
        Some(p) => (arena.get(p).value_prefix, arena.get(p).is_reset),
        None => (0.0, false),
    };
    let batch_index = arena.get(id).batch_index;

    let priors = softmax_over(legal_actions, policy_logits);

    let mut children = HashMap::with_capacity(legal_actions.len());
    for (&action, &prior) in legal_actions.iter().zip(priors.iter()) {
        let mut child = Node::new_unexpanded(batch_index, -1, Some(id));
        child.prior = prior;
        let child_id = arena.push(child);
        children.insert(codec.encode_selected_action(action), (action, child_id));
    }

    let node = arena.get_mut(id);
    node.to_play = to_play;
    node.value_prefix = value_prefix;
    node.is_reset = is_reset;
    node.current_latent_state_index = latent_state_index;
    node.legal_actions = legal_actions.to_vec();
    node.parent_value_prefix = parent_value_prefix;
    node.parent_is_reset = parent_is_reset;
    node.children = children;
    Ok(())
}

/// Blends each child's prior with caller-supplied Dirichlet noise. `noise`
/// must have one entry per legal action, in ascending action order (the
/// same order [`Node::get_children_distribution`] returns).
pub fn add_exploration_noise(arena: &mut Arena, id: NodeId, noise: &[f32], exploration_fraction: f32) {
    let mut child_ids: Vec<(i32, NodeId)> = arena
        .get(id)
        .children
        .values()
        .map(|&(action, child_id)| (action, child_id))
        .collect();
    child_ids.sort_by_key(|&(action, _)| action);

    for (i, (_, child_id)) in child_ids.into_iter().enumerate() {
        let n = noise.get(i).copied().unwrap_or(0.0);
        let child = arena.get_mut(child_id);
        child.prior = child.prior * (1.0 - exploration_fraction) + n * exploration_fraction;
    }
}

/// Replays the chain of `best_action` links starting at `start`, stopping
/// at the first node with no recorded selection (`best_action < 0`) or
/// whose selected child was never expanded. Returns an empty vector rather
/// than erroring in either case — there is no malformed input here, only a
/// trajectory that ended.
#[must_use]
pub fn get_trajectory(arena: &Arena, start: NodeId, codec: &ActionCodec) -> Vec<i32> {
    let mut trajectory = Vec::new();
    let mut current = start;
    loop {
        let node = arena.get(current);
        if node.best_action < 0 {
            break;
        }
        trajectory.push(node.best_action);
        match node.get_child(node.best_action, codec) {
            Some(next) => current = next,
            None => break,
        }
    }
    trajectory
}

fn softmax_over(legal_actions: &[i32], policy_logits: &[f32]) -> Vec<f32> {
    let logits: Vec<f32> = legal_actions
        .iter()
        .map(|&a| policy_logits.get(a as usize).copied().unwrap_or(f32::NEG_INFINITY))
        .collect();
    let max_logit = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max_logit).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum <= 0.0 {
        let uniform = 1.0 / legal_actions.len().max(1) as f32;
        return vec![uniform; legal_actions.len()];
    }
    exps.into_iter().map(|e| e / sum).collect()
}
