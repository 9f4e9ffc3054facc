use rand::Rng;
use tracing::instrument;

use crate::config::SearchConfig;
use crate::minmax::MinMaxStatsList;
use crate::roots::Roots;
use crate::search_results::SearchResults;
use crate::selection::select_child;

/// Descends every root simultaneously until each hits an unexpanded leaf,
/// recording the path taken. Each node along the way has its `best_action`
/// updated to the child just selected, so a finished search can replay full
/// trajectories from the root without any extra bookkeeping.
#[instrument(level = "debug", skip_all, fields(batch_size = roots.len()))]
pub fn batch_traverse(
    roots: &mut Roots,
    minmax_list: &MinMaxStatsList,
    config: &SearchConfig,
    rng: &mut impl Rng,
) -> SearchResults {
    let mut search_paths = Vec::with_capacity(roots.len());
    let mut leaf_node_ids = Vec::with_capacity(roots.len());
    let mut actions = Vec::with_capacity(roots.len());
    let mut latent_state_index_in_search_path = Vec::with_capacity(roots.len());
    let mut latent_state_index_in_batch = Vec::with_capacity(roots.len());

    for batch_index in 0..roots.len() {
        let root_id = roots.root_ids[batch_index];
        let mut path = vec![root_id];
        let mut taken = Vec::new();
        let mut current = root_id;

        loop {
            if !roots.arena.get(current).expanded() {
                break;
            }
            let minmax = minmax_list.get(batch_index);
            match select_child(&roots.arena, current, minmax, config, rng) {
                Some((action, child_id)) => {
                    roots.arena.get_mut(current).best_action = action;
                    taken.push(action);
                    path.push(child_id);
                    current = child_id;
                }
                None => break,
            }
        }

        let latent_batch_index = match roots.arena.get(current).parent {
            Some(parent_id) => roots.arena.get(parent_id).current_latent_state_index,
            None => roots.arena.get(current).current_latent_state_index,
        };

        leaf_node_ids.push(current);
        latent_state_index_in_search_path.push(path.len().saturating_sub(2));
        latent_state_index_in_batch.push(latent_batch_index);
        actions.push(taken);
        search_paths.push(path);
    }

    SearchResults {
        search_paths,
        leaf_node_ids,
        actions,
        latent_state_index_in_search_path,
        latent_state_index_in_batch,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::action_codec::ActionCodec;
    use crate::roots::Roots;

    #[test]
    fn traverse_stops_at_an_unexpanded_root() {
        let mut roots = Roots::new(2, ActionCodec::new(1, 4), vec![Vec::new(), Vec::new()]).unwrap();
        let minmax_list = MinMaxStatsList::new(2);
        let config = SearchConfig::new(1, 4, 0.99);
        let mut rng = StdRng::seed_from_u64(0);

        let results = batch_traverse(&mut roots, &minmax_list, &config, &mut rng);
        assert_eq!(results.batch_size(), 2);
        for path in &results.search_paths {
            assert_eq!(path.len(), 1);
        }
        for taken in &results.actions {
            assert!(taken.is_empty());
        }
    }

    #[test]
    fn traverse_descends_one_step_through_a_multi_head_prepared_root() {
        let codec = ActionCodec::new(3, 4);
        let mut roots = Roots::new(1, codec, vec![vec![0, 1, 2, 3]]).unwrap();
        roots.prepare_no_noise(&[0.0], &[vec![1.0, 2.0, 3.0, 4.0]], &[-1]).unwrap();

        let minmax_list = MinMaxStatsList::new(1);
        let config = SearchConfig::new(3, 4, 0.99);
        let mut rng = StdRng::seed_from_u64(11);

        let results = batch_traverse(&mut roots, &minmax_list, &config, &mut rng);
        assert_eq!(results.search_paths[0].len(), 2);
        assert_eq!(results.actions[0].len(), 1);
        assert!((0..4).contains(&results.actions[0][0]));
    }
}
