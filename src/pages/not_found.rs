use leptos::prelude::*;
use leptos_router::components::A;

/// Fallback for unknown routes.
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="empty-state">
			<p class="empty-title">"Page not found"</p>
			<A href="/" attr:class="btn">
				"Back to the dashboard"
			</A>
		</div>
	}
}
