mod puct_policy;

pub use puct_policy::{exploration_coefficient, prior_score, PuctParams};
