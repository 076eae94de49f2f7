fn main() {
	cpg_explorer::init_logging();
	leptos::mount::mount_to_body(cpg_explorer::App)
}
