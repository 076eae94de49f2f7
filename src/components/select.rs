use leptos::prelude::*;

use crate::params::Choice;

/// Labelled `<select>` over a closed set of choices. `options` narrows the set a page
/// offers; it defaults to every value.
#[component]
pub fn ChoiceSelect<C>(
	label: &'static str,
	#[prop(into)] value: Signal<C>,
	on_change: impl Fn(C) + Send + Sync + 'static,
	#[prop(optional)] options: Option<&'static [C]>,
) -> impl IntoView
where
	C: Choice,
{
	let options = options.unwrap_or(C::ALL);
	view! {
		<label class="control">
			<span class="control-label">{label}</span>
			<select
				class="control-select"
				prop:value=move || value.get().value()
				on:change=move |ev| {
					if let Some(choice) = C::parse(&event_target_value(&ev)) {
						on_change(choice);
					}
				}
			>
				{options
					.iter()
					.map(|&c| {
						view! {
							<option value=c.value() selected=move || value.get() == c>
								{c.label()}
							</option>
						}
					})
					.collect_view()}
			</select>
		</label>
	}
}
