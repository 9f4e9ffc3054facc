use rand::Rng;
use tree_policy::prior_score;

use crate::action_codec::ActionCodec;
use crate::arena::{Arena, NodeId};
use crate::config::SearchConfig;
use crate::minmax::MinMaxStats;
use crate::node::{child_true_reward, Node};

const TIE_EPSILON: f64 = 1e-6;

/// Scores one child under PUCT: the prior term from [`tree_policy`] plus a
/// normalized, clamped Q estimate. Unvisited children fall back to the
/// parent's [`Node::compute_mean_q`] rather than a flat constant, so a
/// freshly expanded node's children are ranked by prior alone only once
/// every sibling has had a chance to look equally uninformative.
fn score_child(parent: &Node, arena: &Arena, child_id: NodeId, minmax: &MinMaxStats, config: &SearchConfig) -> f64 {
    let child = arena.get(child_id);
    let prior_term = prior_score(parent.visit_count, child.visit_count, child.prior, config.puct);

    let q = if child.visit_count == 0 {
        parent.compute_mean_q(arena, config.discount)
    } else {
        let true_reward = child_true_reward(child);
        if parent.to_play != -1 && parent.to_play != child.to_play {
            -true_reward + config.discount * child.value()
        } else {
            true_reward + config.discount * child.value()
        }
    };

    prior_term + minmax.normalize(q).clamp(0.0, 1.0)
}

/// Picks the highest-scoring child of `id`, breaking ties within
/// [`TIE_EPSILON`] uniformly at random. Returns `None` if the node has no
/// children (not yet expanded).
pub fn select_child(
    arena: &Arena,
    id: NodeId,
    minmax: &MinMaxStats,
    config: &SearchConfig,
    rng: &mut impl Rng,
) -> Option<(i32, NodeId)> {
    let parent = arena.get(id);
    if parent.children.is_empty() {
        return None;
    }

    let mut best_score = f64::NEG_INFINITY;
    let mut candidates: Vec<(i32, NodeId)> = Vec::new();
    let mut ordered: Vec<(i32, NodeId)> = parent.children.values().copied().collect();
    ordered.sort_by_key(|&(action, _)| action);

    for &(action, child_id) in &ordered {
        let score = score_child(parent, arena, child_id, minmax, config);
        if score > best_score + TIE_EPSILON {
            best_score = score;
            candidates.clear();
            candidates.push((action, child_id));
        } else if score > best_score - TIE_EPSILON {
            if score > best_score {
                best_score = score;
            }
            candidates.push((action, child_id));
        }
    }

    if candidates.len() == 1 {
        Some(candidates[0])
    } else {
        let idx = rng.gen_range(0..candidates.len());
        Some(candidates[idx])
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::node::expand_node;

    fn codec() -> ActionCodec {
        ActionCodec::new(1, 2)
    }

    #[test]
    fn select_child_prefers_higher_prior_when_unvisited() {
        let mut arena = Arena::new();
        let root = arena.push(Node::new_unexpanded(0, -1, None));
        expand_node(&mut arena, root, &codec(), &[0, 1], &[0.0, 5.0], -1, 0.0, false, 0).unwrap();

        let minmax = MinMaxStats::new();
        let config = SearchConfig::new(1, 2, 0.99);
        let mut rng = StdRng::seed_from_u64(0);

        let (action, _) = select_child(&arena, root, &minmax, &config, &mut rng).unwrap();
        assert_eq!(action, 1);
    }

    #[test]
    fn select_child_breaks_ties_without_panicking() {
        let mut arena = Arena::new();
        let root = arena.push(Node::new_unexpanded(0, -1, None));
        expand_node(&mut arena, root, &codec(), &[0, 1], &[1.0, 1.0], -1, 0.0, false, 0).unwrap();

        let minmax = MinMaxStats::new();
        let config = SearchConfig::new(1, 2, 0.99);
        let mut rng = StdRng::seed_from_u64(42);

        let result = select_child(&arena, root, &minmax, &config, &mut rng);
        assert!(result.is_some());
    }

    #[test]
    fn tie_breaking_is_uniform_over_many_trials() {
        let mut arena = Arena::new();
        let root = arena.push(Node::new_unexpanded(0, -1, None));
        expand_node(&mut arena, root, &codec(), &[0, 1], &[1.0, 1.0], -1, 0.0, false, 0).unwrap();

        let minmax = MinMaxStats::new();
        let config = SearchConfig::new(1, 2, 0.99);
        let mut rng = StdRng::seed_from_u64(1234);

        let mut counts = [0u32; 2];
        const TRIALS: u32 = 4000;
        for _ in 0..TRIALS {
            let (action, _) = select_child(&arena, root, &minmax, &config, &mut rng).unwrap();
            counts[action as usize] += 1;
        }

        let expected = f64::from(TRIALS) / 2.0;
        let stddev = (f64::from(TRIALS) * 0.5 * 0.5).sqrt();
        for &count in &counts {
            assert!((f64::from(count) - expected).abs() < 3.0 * stddev);
        }
    }
}
