use gloo_net::http::Request;
use log::debug;
use serde::de::DeserializeOwned;
use url::Url;

use super::error::{ApiError, Result};
use super::types::*;
use crate::config::AppConfig;
use crate::params::{CallDepth, CallDirection, Choice, FlowDepth, FlowDirection};

/// Client for the query service.
///
/// Every call is a single GET returning parsed JSON. Empty query parameters are left
/// out of the URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiClient {
	base: Url,
}

impl ApiClient {
	/// Resolves `api_base` against `origin`; an absolute `api_base` ignores the origin.
	pub fn new(origin: &str, api_base: &str) -> Result<Self> {
		let base = Url::parse(origin)?.join(api_base)?;
		if base.cannot_be_a_base() {
			return Err(ApiError::Url(format!("{base} cannot carry a path")));
		}
		Ok(Self { base })
	}

	/// Client for the page the application is served from.
	pub fn from_config(config: &AppConfig) -> Result<Self> {
		Self::new(&AppConfig::page_origin(), &config.api_base)
	}

	fn endpoint(&self, segments: &[&str], params: &[(&str, String)]) -> Result<Url> {
		let mut url = self.base.clone();
		url.path_segments_mut()
			.map_err(|()| ApiError::Url(format!("{} cannot carry a path", self.base)))?
			.pop_if_empty()
			.extend(segments);
		url.query_pairs_mut()
			.extend_pairs(params.iter().filter(|(_, v)| !v.is_empty()));
		if url.query() == Some("") {
			url.set_query(None);
		}
		Ok(url)
	}

	async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
		debug!("GET {url}");
		let response = Request::get(url.as_str()).send().await?;
		if !response.ok() {
			let status = response.status();
			let body = response.text().await.unwrap_or_default();
			return Err(ApiError::from_response(status, &body));
		}
		Ok(response.json::<T>().await?)
	}

	async fn get_list<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>> {
		Ok(self.get::<Option<Vec<T>>>(url).await?.unwrap_or_default())
	}

	/// Aggregate counters.
	pub async fn overview(&self) -> Result<Overview> {
		self.get(self.endpoint(&["overview"], &[])?).await
	}

	/// Dashboard histograms.
	pub async fn distributions(&self) -> Result<Distributions> {
		self.get(self.endpoint(&["distributions"], &[])?).await
	}

	/// Packages ordered by `sort`.
	pub async fn packages(&self, limit: u32, sort: &str) -> Result<Vec<Package>> {
		let url = self.endpoint(
			&["packages"],
			&[("limit", limit.to_string()), ("sort", sort.to_string())],
		)?;
		self.get_list(url).await
	}

	/// Whole package dependency graph.
	pub async fn package_graph(&self) -> Result<PackageGraph> {
		self.get(self.endpoint(&["packages", "graph"], &[])?).await
	}

	/// Functions declared in package `name`.
	pub async fn package_functions(&self, name: &str, limit: u32) -> Result<Vec<FunctionItem>> {
		let url = self.endpoint(
			&["packages", name, "functions"],
			&[("limit", limit.to_string())],
		)?;
		self.get_list(url).await
	}

	/// Functions whose name matches `search`, optionally restricted to `package`.
	pub async fn search_functions(
		&self,
		search: &str,
		package: &str,
		limit: u32,
	) -> Result<Vec<FunctionItem>> {
		self.get_list(self.search_functions_url(search, package, limit)?)
			.await
	}

	fn search_functions_url(&self, search: &str, package: &str, limit: u32) -> Result<Url> {
		self.endpoint(
			&["functions"],
			&[
				("search", search.to_string()),
				("package", package.to_string()),
				("limit", limit.to_string()),
			],
		)
	}

	/// Full metric set of one function.
	pub async fn function_detail(&self, id: &str) -> Result<FunctionDetail> {
		let url = self.endpoint(&["functions", "detail"], &[("id", id.to_string())])?;
		self.get(url).await
	}

	/// Call graph neighborhood of function `id`.
	pub async fn call_graph(
		&self,
		id: &str,
		depth: CallDepth,
		direction: CallDirection,
	) -> Result<CallGraph> {
		self.get(self.call_graph_url(id, depth, direction)?).await
	}

	fn call_graph_url(&self, id: &str, depth: CallDepth, direction: CallDirection) -> Result<Url> {
		self.endpoint(
			&["callgraph"],
			&[
				("id", id.to_string()),
				("depth", depth.to_string()),
				("direction", direction.value().to_string()),
			],
		)
	}

	/// Data-flow slice around node `id`.
	pub async fn data_flow(
		&self,
		id: &str,
		depth: FlowDepth,
		direction: FlowDirection,
	) -> Result<DataFlowGraph> {
		let url = self.endpoint(
			&["dataflow"],
			&[
				("id", id.to_string()),
				("depth", depth.to_string()),
				("direction", direction.value().to_string()),
			],
		)?;
		self.get(url).await
	}

	/// Contents of `file`.
	pub async fn source(&self, file: &str) -> Result<SourceFile> {
		self.get(self.endpoint(&["source"], &[("file", file.to_string())])?)
			.await
	}

	/// Riskiest functions first.
	pub async fn hotspots(&self, limit: u32) -> Result<Vec<Hotspot>> {
		self.get_list(self.endpoint(&["hotspots"], &[("limit", limit.to_string())])?)
			.await
	}

	/// Functions, types and packages whose name matches `q`.
	pub async fn global_search(&self, q: &str, limit: u32) -> Result<Vec<SearchResult>> {
		let url = self.endpoint(
			&["search"],
			&[("q", q.to_string()), ("limit", limit.to_string())],
		)?;
		self.get_list(url).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn client() -> ApiClient {
		ApiClient::new("http://localhost:8080", "/api").unwrap()
	}

	#[test]
	fn call_graph_url_carries_depth_and_direction() {
		let url = client()
			.call_graph_url(
				"fn:main.parseConfig",
				CallDepth::new(2).unwrap(),
				CallDirection::Both,
			)
			.unwrap();
		assert_eq!(url.path(), "/api/callgraph");
		let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
		assert_eq!(
			pairs,
			vec![
				("id".into(), "fn:main.parseConfig".into()),
				("depth".into(), "2".into()),
				("direction".into(), "both".into()),
			]
		);
	}

	#[test]
	fn empty_parameters_are_omitted() {
		let url = client().search_functions_url("parse", "", 50).unwrap();
		assert_eq!(url.query(), Some("search=parse&limit=50"));

		let url = client().endpoint(&["overview"], &[]).unwrap();
		assert_eq!(url.as_str(), "http://localhost:8080/api/overview");
	}

	#[test]
	fn package_name_is_one_encoded_segment() {
		let url = client()
			.endpoint(
				&["packages", "cpg-explorer/internal/db", "functions"],
				&[("limit", "50".into())],
			)
			.unwrap();
		assert_eq!(
			url.path(),
			"/api/packages/cpg-explorer%2Finternal%2Fdb/functions"
		);
	}

	#[test]
	fn trailing_slash_and_absolute_bases_resolve() {
		let slashed = ApiClient::new("http://localhost:8080", "/api/").unwrap();
		assert_eq!(
			slashed.endpoint(&["search"], &[]).unwrap().as_str(),
			"http://localhost:8080/api/search"
		);

		let absolute = ApiClient::new("http://localhost:8080", "https://cpg.example.com/v1").unwrap();
		assert_eq!(
			absolute.endpoint(&["hotspots"], &[]).unwrap().as_str(),
			"https://cpg.example.com/v1/hotspots"
		);
	}

	#[test]
	fn invalid_origin_is_a_url_error() {
		assert!(matches!(
			ApiClient::new("not a url", "/api"),
			Err(ApiError::Url(_))
		));
	}
}
