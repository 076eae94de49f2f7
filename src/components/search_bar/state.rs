use gloo_timers::callback::Timeout;

use crate::api::SearchResult;

/// Queries shorter than this many characters are never sent.
pub const MIN_QUERY_CHARS: usize = 2;

/// Keys the result list reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchKey {
	Up,
	Down,
	Enter,
	Escape,
}

impl SearchKey {
	pub fn from_key(key: &str) -> Option<Self> {
		match key {
			"ArrowUp" => Some(Self::Up),
			"ArrowDown" => Some(Self::Down),
			"Enter" => Some(Self::Enter),
			"Escape" => Some(Self::Escape),
			_ => None,
		}
	}
}

/// Text, results and cursor of one search control.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchState {
	pub query: String,
	pub results: Vec<SearchResult>,
	pub open: bool,
	pub cursor: Option<usize>,
	kind: Option<String>,
	/// Set by a selection or Escape; responses then update the rows without
	/// reopening the list.
	dismissed: bool,
}

impl SearchState {
	/// `kind` restricts displayed results to one entity kind.
	pub fn new(kind: Option<String>) -> Self {
		Self {
			kind,
			..Self::default()
		}
	}

	/// Records typed text. Returns the query to send once the input goes quiet, or
	/// `None` when the text is too short, in which case the list is already cleared.
	pub fn input(&mut self, text: String) -> Option<String> {
		self.query = text;
		self.cursor = None;
		self.dismissed = false;
		if self.query.trim().chars().count() < MIN_QUERY_CHARS {
			self.results.clear();
			self.open = false;
			return None;
		}
		Some(self.query.trim().to_string())
	}

	/// Shows the response to `query`. Ignored unless `query` is still what the box
	/// holds; a list the user closed stays closed.
	pub fn apply_results(&mut self, query: &str, results: Vec<SearchResult>) {
		if self.query.trim() != query || query.chars().count() < MIN_QUERY_CHARS {
			return;
		}
		self.results = match &self.kind {
			Some(kind) => results.into_iter().filter(|r| &r.kind == kind).collect(),
			None => results,
		};
		self.open = !self.dismissed && !self.results.is_empty();
		self.cursor = self
			.cursor
			.filter(|_| !self.results.is_empty())
			.map(|c| c.min(self.results.len() - 1));
	}

	/// Clears the list after the search for `query` failed, unless the box has moved on.
	pub fn fail(&mut self, query: &str) {
		if self.query.trim() != query {
			return;
		}
		self.results.clear();
		self.open = false;
		self.cursor = None;
	}

	/// Handles a navigation key; Enter over a valid row yields the selection.
	pub fn key(&mut self, key: SearchKey) -> Option<SearchResult> {
		let n = self.results.len();
		match key {
			SearchKey::Down if n > 0 => {
				self.cursor = Some(self.cursor.map_or(0, |c| (c + 1).min(n - 1)));
			}
			SearchKey::Up if n > 0 => {
				self.cursor = Some(self.cursor.map_or(0, |c| c.saturating_sub(1)));
			}
			SearchKey::Enter => {
				return self.cursor.and_then(|c| self.select(c));
			}
			SearchKey::Escape => self.close(),
			_ => {}
		}
		None
	}

	/// Picks row `idx`: the text becomes its name and the list closes.
	pub fn select(&mut self, idx: usize) -> Option<SearchResult> {
		let picked = self.results.get(idx)?.clone();
		self.query = picked.name.clone();
		self.close();
		Some(picked)
	}

	pub fn close(&mut self) {
		self.open = false;
		self.cursor = None;
		self.dismissed = true;
	}

	pub fn focus(&mut self) {
		self.dismissed = false;
		self.open = !self.results.is_empty();
	}

	pub fn hover(&mut self, idx: usize) {
		if idx < self.results.len() {
			self.cursor = Some(idx);
		}
	}
}

/// Runs a callback once input has been quiet for the delay. Re-arming drops the
/// pending timer, which cancels it; nothing already dispatched is touched.
pub struct Debouncer {
	delay_ms: u32,
	pending: Option<Timeout>,
}

impl Debouncer {
	pub fn new(delay_ms: u32) -> Self {
		Self {
			delay_ms,
			pending: None,
		}
	}

	pub fn arm(&mut self, f: impl FnOnce() + 'static) {
		self.pending = Some(Timeout::new(self.delay_ms, f));
	}

	pub fn cancel(&mut self) {
		self.pending = None;
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;
	use rstest::rstest;

	use super::*;

	fn hit(name: &str, kind: &str) -> SearchResult {
		SearchResult {
			id: format!("{kind}:{name}"),
			name: name.into(),
			kind: kind.into(),
			..SearchResult::default()
		}
	}

	fn with_results(n: usize) -> SearchState {
		let mut state = SearchState::default();
		state.input("par".into());
		state.apply_results("par", (0..n).map(|i| hit(&format!("f{i}"), "function")).collect());
		state
	}

	#[rstest]
	#[case("")]
	#[case("p")]
	#[case(" p ")]
	#[case("ä")]
	fn short_input_never_dispatches(#[case] text: &str) {
		let mut state = with_results(3);
		assert!(state.open);
		assert_eq!(state.input(text.into()), None);
		assert!(state.results.is_empty());
		assert!(!state.open);
	}

	#[test]
	fn late_response_for_cleared_input_is_ignored() {
		let mut state = SearchState::default();
		assert_eq!(state.input("pa".into()).as_deref(), Some("pa"));
		state.input("p".into());
		state.apply_results("pa", vec![hit("parse", "function")]);
		assert!(state.results.is_empty());
		assert!(!state.open);
	}

	#[test]
	fn kind_filter_applies_before_display() {
		let mut state = SearchState::new(Some("package".into()));
		state.input("cmd".into());
		state.apply_results("cmd", vec![hit("cmd/run", "function"), hit("cmd", "package")]);
		assert_eq!(state.results.len(), 1);
		assert!(state.open);

		state.apply_results("cmd", vec![hit("cmd/run", "function")]);
		assert!(!state.open);
	}

	#[test]
	fn enter_selects_and_rewrites_text() {
		let mut state = with_results(3);
		state.key(SearchKey::Down);
		state.key(SearchKey::Down);
		let picked = state.key(SearchKey::Enter);
		assert_eq!(picked.map(|r| r.name), Some("f1".into()));
		assert_eq!(state.query, "f1");
		assert!(!state.open);
	}

	#[test]
	fn late_response_after_a_selection_keeps_the_list_closed() {
		let mut state = SearchState::default();
		state.input("parseC".into());
		state.apply_results("parseC", vec![hit("parseConfig", "function")]);
		state.key(SearchKey::Down);
		assert!(state.key(SearchKey::Enter).is_some());
		assert!(!state.open);

		state.apply_results("parseC", vec![hit("parseConfig", "function"), hit("parseCache", "function")]);
		assert!(!state.open);
		assert_eq!(state.query, "parseConfig");
		assert_eq!(state.results.len(), 1);
	}

	#[test]
	fn response_after_escape_does_not_reopen() {
		let mut state = with_results(2);
		state.key(SearchKey::Escape);
		state.apply_results("par", vec![hit("a", "function")]);
		assert!(!state.open);
		assert_eq!(state.results.len(), 1);

		state.input("parse".into());
		state.apply_results("parse", vec![hit("parse", "function")]);
		assert!(state.open);
	}

	#[test]
	fn response_to_an_older_query_is_dropped() {
		let mut state = SearchState::default();
		state.input("pa".into());
		state.input("parse".into());
		state.apply_results("pa", vec![hit("pager", "function")]);
		assert!(state.results.is_empty());
		assert!(!state.open);
	}

	#[test]
	fn enter_selects_the_cursor_row_even_when_closed() {
		let mut state = with_results(3);
		state.key(SearchKey::Escape);
		state.key(SearchKey::Down);
		let picked = state.key(SearchKey::Enter);
		assert_eq!(picked.map(|r| r.name), Some("f0".into()));
		assert!(!state.open);
	}

	#[test]
	fn enter_without_cursor_selects_nothing() {
		let mut state = with_results(2);
		assert_eq!(state.key(SearchKey::Enter), None);
		assert!(state.open);
	}

	#[test]
	fn escape_keeps_text() {
		let mut state = with_results(2);
		state.key(SearchKey::Escape);
		assert!(!state.open);
		assert_eq!(state.query, "par");
		state.focus();
		assert!(state.open);
	}

	#[test]
	fn failure_clears_results() {
		let mut state = with_results(2);
		state.fail("pa");
		assert_eq!(state.results.len(), 2);
		state.fail("par");
		assert!(state.results.is_empty());
		assert!(!state.open);
	}

	#[test]
	fn cursor_is_clamped_when_results_shrink() {
		let mut state = with_results(5);
		state.hover(4);
		state.apply_results("par", vec![hit("a", "function"), hit("b", "function")]);
		assert_eq!(state.cursor, Some(1));
	}

	fn keys() -> impl Strategy<Value = SearchKey> {
		prop_oneof![Just(SearchKey::Up), Just(SearchKey::Down)]
	}

	proptest! {
		#[test]
		fn cursor_stays_in_bounds(n in 1usize..12, presses in prop::collection::vec(keys(), 0..40)) {
			let mut state = with_results(n);
			for key in presses {
				let before = state.cursor;
				state.key(key);
				let c = state.cursor.unwrap();
				prop_assert!(c < n);
				if before == Some(n - 1) && key == SearchKey::Down {
					prop_assert_eq!(c, n - 1);
				}
				if before == Some(0) && key == SearchKey::Up {
					prop_assert_eq!(c, 0);
				}
			}
		}
	}
}
