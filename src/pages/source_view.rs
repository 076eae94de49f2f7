use std::collections::BTreeSet;

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_query_map;

use crate::api::{ApiClient, FunctionItem, Package};
use crate::components::{ErrorMessage, LoadingOverlay, source_href};
use crate::explorer::CONTROLLER_SETTLE_POLICY;
use crate::query::{use_lazy_query, use_query};

const PACKAGE_LIMIT: u32 = 300;
const FILES_PER_PACKAGE: u32 = 100;

/// Distinct files the functions of a package live in, sorted.
fn package_files(functions: &[FunctionItem]) -> Vec<String> {
	functions
		.iter()
		.map(|f| f.file.as_str())
		.filter(|f| !f.is_empty())
		.collect::<BTreeSet<_>>()
		.into_iter()
		.map(str::to_string)
		.collect()
}

fn file_name(path: &str) -> &str {
	path.rsplit('/').next().unwrap_or(path)
}

fn line_anchor(line: u32) -> String {
	format!("L{line}")
}

/// One sidebar entry; its files are fetched the first time it is opened.
#[component]
fn PackageEntry(package: Package, #[prop(into)] current: Signal<Option<String>>) -> impl IntoView {
	let client = expect_context::<ApiClient>();
	let open = RwSignal::new(false);
	let files = use_lazy_query(CONTROLLER_SETTLE_POLICY, move |name: String| {
		let client = client.clone();
		async move { client.package_functions(&name, FILES_PER_PACKAGE).await }
	});

	let name = package.name.clone();
	let toggle = move |_| {
		let opening = !open.get_untracked();
		open.set(opening);
		if opening && !files.has_data() && !files.loading() {
			files.execute(name.clone());
		}
	};

	let list = move || {
		if files.loading() {
			return view! { <p class="muted">"Loading..."</p> }.into_any();
		}
		let paths = files.data().map(|fs| package_files(&fs)).unwrap_or_default();
		paths
			.into_iter()
			.map(|path| {
				let href = source_href(&path, 0);
				let label = file_name(&path).to_string();
				let title = path.clone();
				let active = move || current.with(|c| c.as_deref() == Some(path.as_str()));
				view! {
					<A href=href attr:class="file-link" attr:title=title>
						<span class:active=active>{label}</span>
					</A>
				}
			})
			.collect_view()
			.into_any()
	};

	view! {
		<li class="package-entry">
			<button class="package-toggle" on:click=toggle>
				<span class="caret">{move || if open.get() { "▾" } else { "▸" }}</span>
				{package.name}
				<span class="muted">{format!(" ({})", package.file_count)}</span>
			</button>
			<Show when=move || open.get()>
				<div class="file-list">
					<ErrorMessage error=Signal::derive(move || files.error()) />
					{list}
				</div>
			</Show>
		</li>
	}
}

/// Read-only source browser. `?file=` picks the file, `?line=` highlights a line.
#[component]
pub fn SourceViewPage() -> impl IntoView {
	let client = expect_context::<ApiClient>();
	let query = use_query_map();
	let file = Memo::new(move |_| query.with(|q| q.get("file")).filter(|f| !f.is_empty()));
	let line = Memo::new(move |_| {
		query
			.with(|q| q.get("line"))
			.and_then(|l| l.parse::<u32>().ok())
			.filter(|&l| l > 0)
	});

	let packages = use_query(|| (), {
		let client = client.clone();
		move |()| {
			let client = client.clone();
			async move { client.packages(PACKAGE_LIMIT, "package").await }
		}
	});
	let source = use_lazy_query(CONTROLLER_SETTLE_POLICY, move |file: String| {
		let client = client.clone();
		async move { client.source(&file).await }
	});

	Effect::new(move |_| {
		if let Some(f) = file.get() {
			source.execute(f);
		}
	});

	// bring the highlighted line into view once its row exists
	Effect::new(move |_| {
		let (Some(line), true) = (line.get(), source.has_data()) else {
			return;
		};
		request_animation_frame(move || {
			if let Some(row) = document().get_element_by_id(&line_anchor(line)) {
				row.scroll_into_view();
			}
		});
	});

	let sidebar = move || {
		packages.data().map(|ps| {
			ps.into_iter()
				.map(|p| view! { <PackageEntry package=p current=file /> })
				.collect_view()
		})
	};

	let content = move || {
		let src = source.data()?;
		let highlight = line.get();
		let rows = src
			.content
			.lines()
			.enumerate()
			.map(|(i, text)| {
				let n = i as u32 + 1;
				view! {
					<tr id=line_anchor(n) class:highlighted={highlight == Some(n)}>
						<td class="line-number">{n}</td>
						<td class="line-text">
							<pre>{text.to_string()}</pre>
						</td>
					</tr>
				}
			})
			.collect_view();
		Some(view! {
			<header class="source-header">
				<h3>{src.file}</h3>
				<span class="muted">{src.package}</span>
			</header>
			<table class="source-table">
				<tbody>{rows}</tbody>
			</table>
		})
	};

	view! {
		<div class="source-view">
			<aside class="source-sidebar">
				<h3>"Packages"</h3>
				<ErrorMessage error=Signal::derive(move || packages.error()) />
				<ul class="package-list">{sidebar}</ul>
			</aside>
			<section class="source-content">
				<Show
					when=move || file.with(Option::is_some)
					fallback=|| {
						view! {
							<div class="empty-state">
								<p class="empty-title">"Source Browser"</p>
								<p class="empty-hint">"Pick a file from the sidebar"</p>
							</div>
						}
					}
				>
					<LoadingOverlay
						when=Signal::derive(move || source.loading())
						message="Loading source..."
					/>
					<ErrorMessage error=Signal::derive(move || source.error()) />
					{content}
				</Show>
			</section>
		</div>
	}
}
