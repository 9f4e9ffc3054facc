use rand::Rng;
use tracing::info_span;

use crate::backprop::{batch_backpropagate, LeafEvaluations};
use crate::config::SearchConfig;
use crate::error::MctsError;
use crate::minmax::MinMaxStatsList;
use crate::roots::Roots;
use crate::search_results::SearchResults;
use crate::traverse::batch_traverse;

/// Runs `num_simulations` rounds of `prepare → traverse → (external
/// inference) → expand+backprop` against an already-[`Roots::prepare`]d
/// batch. `infer` is handed each round's [`SearchResults`] and must return
/// one [`LeafEvaluations`] entry per batch element; the core does no work
/// between phases beyond moving data in and out of `infer`.
pub fn run_simulations(
    roots: &mut Roots,
    minmax_list: &mut MinMaxStatsList,
    config: &SearchConfig,
    num_simulations: u32,
    rng: &mut impl Rng,
    mut infer: impl FnMut(&SearchResults) -> LeafEvaluations,
) -> Result<(), MctsError> {
    let span = info_span!("mcts_simulations", batch_size = roots.len(), num_simulations);
    let _enter = span.enter();

    for simulation in 0..num_simulations {
        tracing::debug!(simulation, "starting simulation round");
        let results = batch_traverse(roots, minmax_list, config, rng);
        let evaluations = infer(&results);
        batch_backpropagate(roots, minmax_list, &results, &evaluations, config)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::action_codec::ActionCodec;

    #[test]
    fn run_simulations_increases_root_visit_counts() {
        let codec = ActionCodec::new(1, 2);
        let mut roots = Roots::new(2, codec, vec![vec![0, 1], vec![0, 1]]).unwrap();
        roots
            .prepare_no_noise(&[0.0, 0.0], &[vec![1.0, 1.0], vec![1.0, 1.0]], &[-1, -1])
            .unwrap();

        let mut minmax_list = MinMaxStatsList::new(2);
        let config = SearchConfig::new(1, 2, 0.99);
        let mut rng = StdRng::seed_from_u64(3);

        run_simulations(&mut roots, &mut minmax_list, &config, 4, &mut rng, |results| LeafEvaluations {
            values: vec![0.5; results.batch_size()],
            value_prefixes: vec![0.0; results.batch_size()],
            policy_logits: vec![vec![1.0, 1.0]; results.batch_size()],
            legal_actions: vec![vec![0, 1]; results.batch_size()],
            to_plays: vec![-1; results.batch_size()],
            is_reset: vec![false; results.batch_size()],
            latent_state_indices: vec![0; results.batch_size()],
        })
        .unwrap();

        for &root_id in &roots.root_ids {
            assert_eq!(roots.arena.get(root_id).visit_count, 5);
        }
    }
}
