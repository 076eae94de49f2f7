use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use log::warn;

use crate::api::ApiError;

/// Observable state of one query.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryState<T> {
	/// Last applied successful result. A later failure leaves it in place.
	pub data: Option<T>,
	/// At least one issued request is still unsettled.
	pub loading: bool,
	/// Message of the last applied failure, cleared when a new request is issued.
	pub error: Option<String>,
}

impl<T> Default for QueryState<T> {
	fn default() -> Self {
		Self {
			data: None,
			loading: false,
			error: None,
		}
	}
}

/// Which settling responses are written to state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SettlePolicy {
	/// Every response is applied as it settles; the last one to settle wins even if
	/// it was issued before a newer request.
	#[default]
	LastSettled,
	/// Only the response to the most recently issued request is applied.
	LatestIssued,
}

/// Receipt for an issued request, handed back when it settles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Framework-free request bookkeeping behind the reactive query hooks.
#[derive(Clone, Debug)]
pub struct QueryMachine<T> {
	state: QueryState<T>,
	policy: SettlePolicy,
	issued: u64,
	in_flight: usize,
}

impl<T> Default for QueryMachine<T> {
	fn default() -> Self {
		Self::new(SettlePolicy::default())
	}
}

impl<T> QueryMachine<T> {
	/// Creates an idle machine.
	pub fn new(policy: SettlePolicy) -> Self {
		Self {
			state: QueryState::default(),
			policy,
			issued: 0,
			in_flight: 0,
		}
	}

	/// Creates a machine that reports `loading` before its first request, for queries
	/// that run as soon as they are mounted.
	pub fn pending(policy: SettlePolicy) -> Self {
		let mut machine = Self::new(policy);
		machine.state.loading = true;
		machine
	}

	/// Current state.
	pub fn state(&self) -> &QueryState<T> {
		&self.state
	}

	/// Settle policy in force.
	pub fn policy(&self) -> SettlePolicy {
		self.policy
	}

	/// Records a new request: enters loading and clears the previous error.
	pub fn begin(&mut self) -> Ticket {
		self.issued += 1;
		self.in_flight += 1;
		self.state.loading = true;
		self.state.error = None;
		Ticket(self.issued)
	}

	/// Whether `ticket` belongs to the most recently issued request.
	pub fn is_latest(&self, ticket: Ticket) -> bool {
		ticket.0 == self.issued
	}

	/// Applies the outcome of the request identified by `ticket`.
	///
	/// Returns `false` when the outcome was discarded as stale.
	pub fn settle(&mut self, ticket: Ticket, outcome: Result<T, ApiError>) -> bool {
		self.in_flight = self.in_flight.saturating_sub(1);
		self.state.loading = self.in_flight > 0;

		if self.policy == SettlePolicy::LatestIssued && !self.is_latest(ticket) {
			return false;
		}
		match outcome {
			Ok(data) => self.state.data = Some(data),
			Err(err) => {
				warn!("query failed: {err}");
				self.state.error = Some(err.to_string());
			}
		}
		true
	}
}

/// Shared handle to a [`QueryMachine`], either a reactive signal or a plain cell.
pub trait MachineCell<T>: Clone + 'static {
	/// Runs `f` with mutable access to the machine, or returns `None` when the machine
	/// no longer exists.
	fn update_machine<R>(&self, f: impl FnOnce(&mut QueryMachine<T>) -> R) -> Option<R>;
}

impl<T: 'static> MachineCell<T> for Rc<RefCell<QueryMachine<T>>> {
	fn update_machine<R>(&self, f: impl FnOnce(&mut QueryMachine<T>) -> R) -> Option<R> {
		Some(f(&mut self.borrow_mut()))
	}
}

/// Issues a request against `cell` now and returns the future that settles it.
///
/// `begin` runs synchronously, before the returned future is polled, so the issue
/// order is the call order regardless of how the futures are later scheduled. A
/// machine that is gone by then (its page unmounted) is left alone.
pub fn dispatch<T, C, F>(cell: C, request: F) -> impl Future<Output = ()> + 'static
where
	T: 'static,
	C: MachineCell<T>,
	F: Future<Output = Result<T, ApiError>> + 'static,
{
	let ticket = cell.update_machine(QueryMachine::begin);
	async move {
		let outcome = request.await;
		if let Some(ticket) = ticket {
			cell.update_machine(|m| m.settle(ticket, outcome));
		}
	}
}

#[cfg(test)]
mod tests {
	use futures::channel::oneshot;
	use futures::executor::LocalPool;
	use futures::task::LocalSpawnExt;

	use super::*;

	fn failure(msg: &str) -> ApiError {
		ApiError::Transport(msg.to_string())
	}

	#[test]
	fn begin_enters_loading_and_clears_error() {
		let mut m = QueryMachine::<u32>::default();
		let t = m.begin();
		m.settle(t, Err(failure("boom")));
		assert_eq!(m.state().error.as_deref(), Some("boom"));
		assert!(!m.state().loading);

		m.begin();
		assert!(m.state().loading);
		assert_eq!(m.state().error, None);
	}

	#[test]
	fn failure_keeps_previous_data() {
		let mut m = QueryMachine::default();
		let t = m.begin();
		m.settle(t, Ok(vec![1, 2, 3]));
		let t = m.begin();
		m.settle(t, Err(ApiError::from_response(500, "")));

		assert_eq!(m.state().data, Some(vec![1, 2, 3]));
		assert_eq!(
			m.state().error.as_deref(),
			Some("request failed with status 500")
		);
	}

	#[test]
	fn loading_stays_on_until_every_request_settles() {
		let mut m = QueryMachine::default();
		let a = m.begin();
		let b = m.begin();
		m.settle(b, Ok("b"));
		assert!(m.state().loading);
		m.settle(a, Ok("a"));
		assert!(!m.state().loading);
	}

	/// Issues A then B, lets B's response arrive first, then A's.
	fn race(policy: SettlePolicy) -> QueryState<&'static str> {
		let cell = Rc::new(RefCell::new(QueryMachine::new(policy)));
		let (tx_a, rx_a) = oneshot::channel::<&'static str>();
		let (tx_b, rx_b) = oneshot::channel::<&'static str>();

		let mut pool = LocalPool::new();
		let spawner = pool.spawner();
		spawner
			.spawn_local(dispatch(cell.clone(), async move {
				Ok(rx_a.await.unwrap())
			}))
			.unwrap();
		spawner
			.spawn_local(dispatch(cell.clone(), async move {
				Ok(rx_b.await.unwrap())
			}))
			.unwrap();

		pool.run_until_stalled();
		tx_b.send("B").unwrap();
		pool.run_until_stalled();
		assert_eq!(cell.borrow().state().data, Some("B"));
		tx_a.send("A").unwrap();
		pool.run_until_stalled();

		cell.borrow().state().clone()
	}

	#[test]
	fn last_settled_response_wins_by_default() {
		let state = race(SettlePolicy::LastSettled);
		assert_eq!(state.data, Some("A"));
		assert!(!state.loading);
	}

	#[test]
	fn latest_issued_policy_discards_stale_response() {
		let state = race(SettlePolicy::LatestIssued);
		assert_eq!(state.data, Some("B"));
		assert!(!state.loading);
	}

	#[test]
	fn stale_failure_does_not_surface_under_latest_issued() {
		let mut m = QueryMachine::new(SettlePolicy::LatestIssued);
		let old = m.begin();
		let new = m.begin();
		assert!(m.settle(new, Ok(7)));
		assert!(!m.settle(old, Err(failure("late"))));
		assert_eq!(m.state().error, None);
		assert_eq!(m.state().data, Some(7));
	}
}
