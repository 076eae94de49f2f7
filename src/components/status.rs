use leptos::prelude::*;

/// Spinner over the content area while `when` holds.
#[component]
pub fn LoadingOverlay(#[prop(into)] when: Signal<bool>, message: &'static str) -> impl IntoView {
	view! {
		<Show when=move || when.get()>
			<div class="overlay">
				<div class="spinner"></div>
				<span>{message}</span>
			</div>
		</Show>
	}
}

#[component]
pub fn ErrorMessage(#[prop(into)] error: Signal<Option<String>>) -> impl IntoView {
	move || error.get().map(|message| view! { <p class="error-message">{message}</p> })
}

/// Placeholder shown while there is nothing to draw.
#[component]
pub fn EmptyState(
	#[prop(into)] when: Signal<bool>,
	title: &'static str,
	hint: &'static str,
) -> impl IntoView {
	view! {
		<Show when=move || when.get()>
			<div class="empty-state">
				<p class="empty-title">{title}</p>
				<p class="empty-hint">{hint}</p>
			</div>
		</Show>
	}
}
