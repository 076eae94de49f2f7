//! Asynchronous query state: `{data, loading, error}` in eager and lazy variants.
//!
//! [`QueryMachine`] holds the request bookkeeping and knows nothing about Leptos; the
//! hooks wrap it in a signal and drive requests with `spawn_local`.

mod hooks;
mod machine;

pub use hooks::{LazyQuery, Query, use_lazy_query, use_query};
pub use machine::{MachineCell, QueryMachine, QueryState, SettlePolicy, Ticket, dispatch};
