//! Build-time configuration.

/// Path of the query service when `CPG_API_BASE` is not set at build time.
pub const DEFAULT_API_BASE: &str = "/api";

/// Application settings, provided to every page through context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
	/// Path (or absolute URL) of the query service.
	pub api_base: String,
	/// Quiet period after the last keystroke before a search is dispatched.
	pub search_debounce_ms: u32,
	/// Maximum number of search hits requested per query.
	pub search_limit: u32,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			api_base: option_env!("CPG_API_BASE")
				.unwrap_or(DEFAULT_API_BASE)
				.to_string(),
			search_debounce_ms: 200,
			search_limit: 20,
		}
	}
}

impl AppConfig {
	/// Origin of the current page, used to resolve a relative `api_base`.
	pub fn page_origin() -> String {
		web_sys::window()
			.and_then(|w| w.location().origin().ok())
			.unwrap_or_else(|| "http://localhost".to_string())
	}
}
