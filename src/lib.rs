//! Leptos client-side app for exploring a Code Property Graph: wiring and routes.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, error, info};

// Modules
pub mod api;
pub mod config;
pub mod params;
pub mod query;
mod components;
mod explorer;
mod pages;

use crate::api::ApiClient;
use crate::config::AppConfig;

// Top-Level pages
use crate::pages::call_graph::CallGraphPage;
use crate::pages::dashboard::DashboardPage;
use crate::pages::data_flow::DataFlowPage;
use crate::pages::not_found::NotFound;
use crate::pages::package_map::PackageMapPage;
use crate::pages::source_view::SourceViewPage;

const NAV_ITEMS: &[(&str, &str)] = &[
	("/", "Dashboard"),
	("/callgraph", "Call Graph"),
	("/packages", "Packages"),
	("/dataflow", "Data Flow"),
	("/source", "Source"),
];

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

#[component]
fn Nav() -> impl IntoView {
	let links = NAV_ITEMS
		.iter()
		.map(|&(href, label)| {
			view! {
				<A href=href exact={href == "/"} attr:class="nav-link">
					{label}
				</A>
			}
		})
		.collect_view();
	view! {
		<nav class="sidebar">
			<div class="brand">
				<h1>"CPG Explorer"</h1>
				<p class="muted">"Code Property Graph IDE"</p>
			</div>
			<div class="nav-links">{links}</div>
		</nav>
	}
}

/// Application root: provides configuration and the API client, then routes between the
/// explorer pages.
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	let config = AppConfig::default();
	let client = ApiClient::from_config(&config);
	provide_context(config);

	let body = match client {
		Ok(client) => {
			provide_context(client);
			view! {
				<Router>
					<div class="layout">
						<Nav />
						<main class="content">
							<Routes fallback=|| view! { <NotFound /> }>
								<Route path=path!("/") view=DashboardPage />
								<Route path=path!("/callgraph") view=CallGraphPage />
								<Route path=path!("/dataflow") view=DataFlowPage />
								<Route path=path!("/packages") view=PackageMapPage />
								<Route path=path!("/source") view=SourceViewPage />
							</Routes>
						</main>
					</div>
				</Router>
			}
			.into_any()
		}
		Err(err) => {
			error!("cannot reach the query service: {err}");
			view! { <p class="error-message">{err.to_string()}</p> }.into_any()
		}
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		// sets the document title
		<Title text="CPG Explorer" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		{body}
	}
}
