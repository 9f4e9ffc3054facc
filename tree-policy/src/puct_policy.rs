/// Parameters of the visit-count-dependent exploration schedule used by PUCT.
///
/// `pb_c_base` and `pb_c_init` shape how quickly the exploration term grows
/// with the parent's visit count, matching the schedule used by `AlphaZero`
/// and its descendants.
#[derive(Debug, Clone, Copy)]
pub struct PuctParams {
    pub pb_c_base: f64,
    pub pb_c_init: f64,
}

impl Default for PuctParams {
    fn default() -> Self {
        Self {
            pb_c_base: 19_652.0,
            pb_c_init: 1.25,
        }
    }
}

/// The visit-count-dependent coefficient `pb_c`, before it is scaled by the
/// per-child `sqrt(N) / (1 + n)` term and multiplied with the child's prior.
#[must_use]
pub fn exploration_coefficient(parent_visit_count: u32, params: PuctParams) -> f64 {
    let n = f64::from(parent_visit_count);
    ((n + params.pb_c_base + 1.0) / params.pb_c_base).ln() + params.pb_c_init
}

/// The full PUCT prior term `pb_c · prior` for one child.
///
/// # Arguments
///
/// * `parent_visit_count` - Visit count of the parent node.
/// * `child_visit_count` - Visit count of the candidate child.
/// * `child_prior` - The child's prior probability from the policy head.
/// * `params` - The exploration schedule parameters.
#[must_use]
pub fn prior_score(parent_visit_count: u32, child_visit_count: u32, child_prior: f32, params: PuctParams) -> f64 {
    let pb_c = exploration_coefficient(parent_visit_count, params) * f64::from(parent_visit_count).sqrt()
        / (1.0 + f64::from(child_visit_count));

    pb_c * f64::from(child_prior)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn exploration_coefficient_grows_with_parent_visits() {
        let params = PuctParams::default();
        let low = exploration_coefficient(1, params);
        let high = exploration_coefficient(10_000, params);
        assert!(high > low);
    }

    #[test]
    fn prior_score_is_zero_for_zero_prior() {
        let params = PuctParams::default();
        assert_eq!(prior_score(10, 0, 0.0, params), 0.0);
    }

    #[test]
    fn prior_score_decreases_as_child_is_visited_more() {
        let params = PuctParams::default();
        let fresh = prior_score(100, 0, 0.5, params);
        let visited = prior_score(100, 50, 0.5, params);
        assert!(fresh > visited);
    }
}
