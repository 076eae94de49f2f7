use std::future::Future;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use leptos::prelude::*;
use log::debug;
use wasm_bindgen_futures::spawn_local;

use super::machine::{MachineCell, QueryMachine, QueryState, SettlePolicy, dispatch};
use crate::api::ApiError;

impl<T: Send + Sync + 'static> MachineCell<T> for RwSignal<QueryMachine<T>> {
	fn update_machine<R>(&self, f: impl FnOnce(&mut QueryMachine<T>) -> R) -> Option<R> {
		self.try_update(f)
	}
}

type Fetcher<A, T> = Rc<dyn Fn(A) -> LocalBoxFuture<'static, Result<T, ApiError>>>;
type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

fn boxed<A, T, F, Fut>(fetcher: F) -> Fetcher<A, T>
where
	F: Fn(A) -> Fut + 'static,
	Fut: Future<Output = Result<T, ApiError>> + 'static,
{
	Rc::new(move |args| Box::pin(fetcher(args)))
}

fn browser_spawner() -> Spawner {
	Rc::new(|fut: LocalBoxFuture<'static, ()>| spawn_local(fut))
}

/// Builds a request with the fetcher and dispatches it against one machine.
struct Runner<A, T, C> {
	cell: C,
	fetcher: Fetcher<A, T>,
	spawn: Spawner,
}

impl<A, T: 'static, C: MachineCell<T>> Runner<A, T, C> {
	fn run(&self, args: A) {
		(self.spawn)(Box::pin(dispatch(self.cell.clone(), (self.fetcher)(args))));
	}
}

/// A [`Runner`] whose argument is read from a key function at call time.
struct KeyedRunner<K, T, C> {
	runner: Runner<K, T, C>,
	key: Rc<dyn Fn() -> K>,
}

impl<K, T: 'static, C: MachineCell<T>> KeyedRunner<K, T, C> {
	fn run_current(&self) {
		self.runner.run((self.key)());
	}
}

/// Reactive readers shared by both query variants.
macro_rules! state_readers {
	() => {
		/// Snapshot of the whole state. Tracked.
		pub fn state(&self) -> QueryState<T>
		where
			T: Clone,
		{
			self.machine.with(|m| m.state().clone())
		}

		/// Last applied data. Tracked.
		pub fn data(&self) -> Option<T>
		where
			T: Clone,
		{
			self.machine.with(|m| m.state().data.clone())
		}

		/// Whether any data has been applied yet. Tracked.
		pub fn has_data(&self) -> bool {
			self.machine.with(|m| m.state().data.is_some())
		}

		/// Whether a request is in flight. Tracked.
		pub fn loading(&self) -> bool {
			self.machine.with(|m| m.state().loading)
		}

		/// Last applied failure message. Tracked.
		pub fn error(&self) -> Option<String> {
			self.machine.with(|m| m.state().error.clone())
		}
	};
}

/// Query that runs only when [`LazyQuery::execute`] is called.
pub struct LazyQuery<A: 'static, T: Send + Sync + 'static> {
	machine: RwSignal<QueryMachine<T>>,
	runner: StoredValue<Runner<A, T, RwSignal<QueryMachine<T>>>, LocalStorage>,
}

impl<A: 'static, T: Send + Sync + 'static> Clone for LazyQuery<A, T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<A: 'static, T: Send + Sync + 'static> Copy for LazyQuery<A, T> {}

impl<A: 'static, T: Send + Sync + 'static> LazyQuery<A, T> {
	/// Issues a request for `args`. Requests already in flight keep running.
	pub fn execute(&self, args: A) {
		self.runner.try_with_value(|runner| runner.run(args));
	}

	state_readers!();
}

/// Creates a [`LazyQuery`] around `fetcher`.
pub fn use_lazy_query<A, T, F, Fut>(policy: SettlePolicy, fetcher: F) -> LazyQuery<A, T>
where
	A: 'static,
	T: Send + Sync + 'static,
	F: Fn(A) -> Fut + 'static,
	Fut: Future<Output = Result<T, ApiError>> + 'static,
{
	let machine = RwSignal::new(QueryMachine::new(policy));
	LazyQuery {
		machine,
		runner: StoredValue::new_local(Runner {
			cell: machine,
			fetcher: boxed(fetcher),
			spawn: browser_spawner(),
		}),
	}
}

/// Query that runs on mount and again whenever its key changes.
pub struct Query<T: Send + Sync + 'static> {
	machine: RwSignal<QueryMachine<T>>,
	refetch: StoredValue<Rc<dyn Fn()>, LocalStorage>,
}

impl<T: Send + Sync + 'static> Clone for Query<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T: Send + Sync + 'static> Copy for Query<T> {}

impl<T: Send + Sync + 'static> Query<T> {
	/// Re-issues the request for the current key.
	pub fn refetch(&self) {
		self.refetch.with_value(|refetch| refetch());
	}

	state_readers!();
}

/// Creates an eager [`Query`]. Signals read by `key` are tracked; each change issues
/// `fetcher(key())`.
pub fn use_query<K, T, KF, F, Fut>(key: KF, fetcher: F) -> Query<T>
where
	K: 'static,
	T: Send + Sync + 'static,
	KF: Fn() -> K + 'static,
	F: Fn(K) -> Fut + 'static,
	Fut: Future<Output = Result<T, ApiError>> + 'static,
{
	let machine = RwSignal::new(QueryMachine::pending(SettlePolicy::LastSettled));
	let keyed = Rc::new(KeyedRunner {
		runner: Runner {
			cell: machine,
			fetcher: boxed(fetcher),
			spawn: browser_spawner(),
		},
		key: Rc::new(key),
	});

	Effect::new({
		let keyed = keyed.clone();
		move |_| {
			debug!("query key changed");
			keyed.run_current();
		}
	});

	let refetch: Rc<dyn Fn()> = Rc::new(move || untrack(|| keyed.run_current()));
	Query {
		machine,
		refetch: StoredValue::new_local(refetch),
	}
}

#[cfg(test)]
mod tests {
	use std::cell::{Cell, RefCell};

	use futures::channel::oneshot;
	use futures::executor::LocalPool;
	use futures::task::LocalSpawnExt;

	use super::*;

	type SharedMachine = Rc<RefCell<QueryMachine<String>>>;

	fn pool_spawner(pool: &LocalPool) -> Spawner {
		let spawner = pool.spawner();
		Rc::new(move |fut| spawner.spawn_local(fut).unwrap())
	}

	/// Fetcher echoing its argument, recording every call.
	fn echo(calls: Rc<RefCell<Vec<u32>>>) -> Fetcher<u32, String> {
		boxed(move |k: u32| {
			calls.borrow_mut().push(k);
			async move { Ok(format!("result {k}")) }
		})
	}

	#[test]
	fn execute_issues_a_request_and_applies_its_result() {
		let mut pool = LocalPool::new();
		let cell: SharedMachine = Rc::new(RefCell::new(QueryMachine::new(SettlePolicy::LastSettled)));
		let (tx, rx) = oneshot::channel::<String>();
		let rx = Rc::new(RefCell::new(Some(rx)));
		let runner = Runner {
			cell: cell.clone(),
			fetcher: boxed(move |id: String| {
				let rx = rx.borrow_mut().take();
				async move {
					let reply = rx.unwrap().await.unwrap();
					Ok(format!("{id}: {reply}"))
				}
			}),
			spawn: pool_spawner(&pool),
		};

		assert!(!cell.borrow().state().loading);
		runner.run("fn:main".to_string());
		assert!(cell.borrow().state().loading);
		pool.run_until_stalled();
		assert!(cell.borrow().state().loading);

		tx.send("ok".into()).unwrap();
		pool.run_until_stalled();
		let state = cell.borrow().state().clone();
		assert_eq!(state.data.as_deref(), Some("fn:main: ok"));
		assert!(!state.loading);
	}

	#[test]
	fn eager_query_is_loading_before_its_first_response() {
		let mut pool = LocalPool::new();
		let cell: SharedMachine = Rc::new(RefCell::new(QueryMachine::pending(SettlePolicy::LastSettled)));
		assert!(cell.borrow().state().loading);

		let calls = Rc::new(RefCell::new(Vec::new()));
		let keyed = KeyedRunner {
			runner: Runner {
				cell: cell.clone(),
				fetcher: echo(calls.clone()),
				spawn: pool_spawner(&pool),
			},
			key: Rc::new(|| 1u32),
		};
		keyed.run_current();
		pool.run_until_stalled();
		assert_eq!(cell.borrow().state().data.as_deref(), Some("result 1"));
		assert!(!cell.borrow().state().loading);
	}

	#[test]
	fn each_run_reads_the_key_at_call_time() {
		let mut pool = LocalPool::new();
		let cell: SharedMachine = Rc::new(RefCell::new(QueryMachine::pending(SettlePolicy::LastSettled)));
		let calls = Rc::new(RefCell::new(Vec::new()));
		let key = Rc::new(Cell::new(1u32));
		let keyed = KeyedRunner {
			runner: Runner {
				cell: cell.clone(),
				fetcher: echo(calls.clone()),
				spawn: pool_spawner(&pool),
			},
			key: {
				let key = key.clone();
				Rc::new(move || key.get())
			},
		};

		keyed.run_current();
		key.set(2);
		keyed.run_current();
		// a refetch without a key change re-issues the same key
		keyed.run_current();
		pool.run_until_stalled();

		assert_eq!(*calls.borrow(), [1, 2, 2]);
		assert_eq!(cell.borrow().state().data.as_deref(), Some("result 2"));
		assert!(!cell.borrow().state().loading);
	}
}
