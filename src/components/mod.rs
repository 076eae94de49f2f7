mod function_detail;
pub mod graph_view;
mod search_bar;
mod select;
mod status;

pub use function_detail::{FunctionDetailPanel, call_graph_href, source_href};
pub use search_bar::SearchBar;
pub use select::ChoiceSelect;
pub use status::{EmptyState, ErrorMessage, LoadingOverlay};
