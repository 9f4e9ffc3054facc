use tracing::instrument;

use crate::config::SearchConfig;
use crate::error::MctsError;
use crate::minmax::MinMaxStatsList;
use crate::node::{child_true_reward, expand_node};
use crate::roots::Roots;
use crate::search_results::SearchResults;

/// Per-leaf outputs from the external model, one entry per batch element,
/// in the same order as [`SearchResults`].
#[derive(Debug, Clone)]
pub struct LeafEvaluations {
    pub values: Vec<f32>,
    pub value_prefixes: Vec<f32>,
    pub policy_logits: Vec<Vec<f32>>,
    pub legal_actions: Vec<Vec<i32>>,
    pub to_plays: Vec<i32>,
    pub is_reset: Vec<bool>,
    pub latent_state_indices: Vec<usize>,
}

impl LeafEvaluations {
    fn validate(&self, expected: usize) -> Result<(), MctsError> {
        let actual = self.values.len();
        if actual != expected
            || self.value_prefixes.len() != expected
            || self.policy_logits.len() != expected
            || self.legal_actions.len() != expected
            || self.to_plays.len() != expected
            || self.is_reset.len() != expected
            || self.latent_state_indices.len() != expected
        {
            return Err(MctsError::BatchSizeMismatch {
                expected,
                actual,
            });
        }
        Ok(())
    }
}

/// Expands every leaf from `evaluations` and walks each search path
/// leaf-to-root, updating `visit_count`/`value_sum` and the per-root
/// [`crate::minmax::MinMaxStats`].
///
/// The backed-up value flips sign at every node whose `to_play` differs
/// from the root's (two-player search); in single-player search
/// (`to_play == -1` throughout) it never flips. A node's own `is_reset`
/// flag (set at its own expansion) decides whether its one-step reward is
/// its raw `value_prefix` or the delta against its parent's — see
/// [`child_true_reward`].
#[instrument(level = "debug", skip_all, fields(batch_size = results.batch_size()))]
pub fn batch_backpropagate(
    roots: &mut Roots,
    minmax_list: &mut MinMaxStatsList,
    results: &SearchResults,
    evaluations: &LeafEvaluations,
    config: &SearchConfig,
) -> Result<(), MctsError> {
    evaluations.validate(results.batch_size())?;

    for batch_index in 0..results.batch_size() {
        let leaf_id = results.leaf_node_ids[batch_index];
        expand_node(
            &mut roots.arena,
            leaf_id,
            &roots.codec,
            &evaluations.legal_actions[batch_index],
            &evaluations.policy_logits[batch_index],
            evaluations.to_plays[batch_index],
            evaluations.value_prefixes[batch_index],
            evaluations.is_reset[batch_index],
            evaluations.latent_state_indices[batch_index],
        )?;

        let path = &results.search_paths[batch_index];
        let root_to_play = roots.arena.get(path[0]).to_play;
        let mut bootstrap_value = f64::from(evaluations.values[batch_index]);

        for &node_id in path.iter().rev() {
            let node = roots.arena.get_mut(node_id);
            let flip = root_to_play != -1 && node.to_play != -1 && node.to_play != root_to_play;

            node.value_sum += if flip { -bootstrap_value } else { bootstrap_value };
            node.visit_count += 1;

            let true_reward = child_true_reward(node);
            let backed_up = true_reward + config.discount * node.value();
            minmax_list.get_mut(node.batch_index).update(backed_up);

            bootstrap_value = (if flip { -true_reward } else { true_reward }) + config.discount * bootstrap_value;
        }
    }

    Ok(())
}
