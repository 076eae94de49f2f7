use leptos::ev;
use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{KeyboardEvent, MouseEvent};

use super::state::{Debouncer, SearchKey, SearchState};
use crate::api::{ApiClient, SearchResult};
use crate::config::AppConfig;

/// Debounced search box over the global symbol search. `kind` hides every result of a
/// different entity kind.
#[component]
pub fn SearchBar(
	#[prop(into)] on_select: Callback<SearchResult>,
	#[prop(optional, into)] kind: Option<String>,
	#[prop(into, default = "Search functions, types, packages...".to_string())]
	placeholder: String,
) -> impl IntoView {
	let config = use_context::<AppConfig>().unwrap_or_default();
	let client = expect_context::<ApiClient>();
	let limit = config.search_limit;

	let state = RwSignal::new(SearchState::new(kind));
	let debouncer = StoredValue::new_local(Debouncer::new(config.search_debounce_ms));
	let root_ref = NodeRef::<leptos::html::Div>::new();

	let run_search = move |q: String| {
		let client = client.clone();
		debug!("searching for {q:?}");
		spawn_local(async move {
			match client.global_search(&q, limit).await {
				Ok(results) => {
					state.try_update(|s| s.apply_results(&q, results));
				}
				Err(err) => {
					warn!("search for {q:?} failed: {err}");
					state.try_update(|s| s.fail(&q));
				}
			}
		});
	};

	let on_input = move |ev: ev::Event| {
		let text = event_target_value(&ev);
		let pending = state.try_update(|s| s.input(text)).flatten();
		debouncer.update_value(|d| match pending {
			Some(q) => {
				let run = run_search.clone();
				d.arm(move || run(q));
			}
			None => d.cancel(),
		});
	};

	let on_keydown = move |ev: KeyboardEvent| {
		let Some(key) = SearchKey::from_key(&ev.key()) else {
			return;
		};
		if key != SearchKey::Escape {
			ev.prevent_default();
		}
		let picked = state.try_update(|s| s.key(key)).flatten();
		if key == SearchKey::Escape || picked.is_some() {
			debouncer.try_update_value(Debouncer::cancel);
		}
		if let Some(picked) = picked {
			on_select.run(picked);
		}
	};

	let pick = move |idx: usize| {
		if let Some(picked) = state.try_update(|s| s.select(idx)).flatten() {
			debouncer.try_update_value(Debouncer::cancel);
			on_select.run(picked);
		}
	};

	let outside = window_event_listener(ev::mousedown, move |ev: MouseEvent| {
		let Some(root) = root_ref.get_untracked() else {
			return;
		};
		let target = ev.target().and_then(|t| t.dyn_into::<web_sys::Node>().ok());
		if !root.contains(target.as_ref()) && state.with_untracked(|s| s.open) {
			state.update(SearchState::close);
		}
	});
	on_cleanup(move || {
		outside.remove();
		debouncer.try_update_value(Debouncer::cancel);
	});

	let rows = move || {
		state.with(|s| {
			s.results
				.iter()
				.enumerate()
				.map(|(i, r)| {
					let active = s.cursor == Some(i);
					view! {
						<li
							class="search-result"
							class:active=active
							on:mouseenter=move |_| state.update(|s| s.hover(i))
							on:mousedown=move |ev: MouseEvent| {
								ev.prevent_default();
								pick(i);
							}
						>
							<span class="result-name">{r.name.clone()}</span>
							<span class=format!("result-kind kind-{}", r.kind)>{r.kind.clone()}</span>
							<span class="result-package">{r.package.clone()}</span>
						</li>
					}
				})
				.collect_view()
		})
	};

	view! {
		<div class="search-bar" node_ref=root_ref>
			<input
				type="text"
				class="search-input"
				placeholder=placeholder
				prop:value=move || state.with(|s| s.query.clone())
				on:input=on_input
				on:keydown=on_keydown
				on:focus=move |_| state.update(SearchState::focus)
			/>
			<Show when=move || state.with(|s| s.open)>
				<ul class="search-results">{rows}</ul>
			</Show>
		</div>
	}
}
