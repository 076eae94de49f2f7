//! Explorer controllers: the state behind each graph page, as pure transitions from
//! user events to the next state and an optional request, plus the mapping from query
//! results to renderable graphs.

use crate::query::SettlePolicy;

mod call_graph;
mod data_flow;
mod package_graph;

pub use call_graph::*;
pub use data_flow::*;
pub use package_graph::*;

/// Settle policy of every controller query: whichever response settles last is applied,
/// even when a newer request was issued after it.
pub const CONTROLLER_SETTLE_POLICY: SettlePolicy = SettlePolicy::LastSettled;
