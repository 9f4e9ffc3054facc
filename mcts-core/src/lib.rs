//! Batched Monte Carlo Tree Search core for a multi-head ("x-hot") action
//! space: one agent, `H` action heads of `A_per_head` actions each,
//! searching `N` independent roots in lock-step while sharing policy,
//! value and value-prefix inference with an external model. This crate
//! owns the tree; the model, the environment, and the training loop all
//! live outside it.

mod action_codec;
mod arena;
mod backprop;
mod config;
mod error;
mod minmax;
mod node;
mod roots;
mod search_results;
mod selection;
mod traverse;

pub mod driver;

pub use action_codec::ActionCodec;
pub use arena::{Arena, NodeId};
pub use backprop::{batch_backpropagate, LeafEvaluations};
pub use config::SearchConfig;
pub use error::MctsError;
pub use minmax::{MinMaxStats, MinMaxStatsList};
pub use node::{child_true_reward, Node};
pub use roots::Roots;
pub use search_results::SearchResults;
pub use selection::select_child;
pub use traverse::batch_traverse;
