//! OpenCTI upstream client: validated call → GraphQL request.

use crate::queries;
use async_trait::async_trait;
use intelgate_core::upstream::{
    HttpExecutor, RawResponse, UpstreamClient, UpstreamError, UpstreamRequest,
};
use intelgate_core::validate::ValidatedCall;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{Map, Value, json};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const USER_AGENT: &str = concat!("intelgate-opencti/", env!("CARGO_PKG_VERSION"));

pub struct OpenCtiClient {
    executor: HttpExecutor,
}

impl OpenCtiClient {
    /// Build a client with a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error for a token with non-header characters or a
    /// malformed base URL.
    pub fn new(base_url: &str, token: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| anyhow::anyhow!("API token contains non-header characters"))?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);
        headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(USER_AGENT),
        );

        Ok(Self {
            executor: HttpExecutor::new(base_url, headers)?,
        })
    }
}

#[async_trait]
impl UpstreamClient for OpenCtiClient {
    fn prepare(&self, call: &ValidatedCall) -> Result<UpstreamRequest, UpstreamError> {
        let arguments = &call.arguments;
        let (query, variables) = match call.tool.as_str() {
            "get_latest_reports" => (queries::LATEST_REPORTS, first_variables(arguments)?),
            "get_report_by_id" => (queries::REPORT_BY_ID, id_variables(arguments)?),
            "search_indicators" => (queries::SEARCH_INDICATORS, search_variables(arguments)?),
            "search_malware" => (queries::SEARCH_MALWARE, search_variables(arguments)?),
            "search_threat_actors" => {
                (queries::SEARCH_THREAT_ACTORS, search_variables(arguments)?)
            }
            "get_user_by_id" => (queries::USER_BY_ID, id_variables(arguments)?),
            "list_users" => (queries::ALL_USERS, json!({})),
            "list_groups" => (queries::ALL_GROUPS, first_variables(arguments)?),
            "list_attack_patterns" => (queries::ALL_ATTACK_PATTERNS, first_variables(arguments)?),
            "get_campaign_by_name" => (
                queries::CAMPAIGN_BY_NAME,
                json!({ "name": str_arg(arguments, "name")? }),
            ),
            "list_connectors" => (queries::ALL_CONNECTORS, json!({})),
            "list_status_templates" => (queries::ALL_STATUS_TEMPLATES, json!({})),
            "get_file_by_id" => (queries::FILE_BY_ID, id_variables(arguments)?),
            "list_files" => (queries::ALL_FILES, json!({})),
            "list_marking_definitions" => (queries::ALL_MARKING_DEFINITIONS, json!({})),
            "list_labels" => (queries::ALL_LABELS, json!({})),
            other => return Err(UpstreamError::Mapping(other.to_string())),
        };

        Ok(UpstreamRequest::post(
            "/graphql",
            json!({ "query": query, "variables": variables }),
        ))
    }

    async fn execute(&self, request: &UpstreamRequest) -> Result<RawResponse, UpstreamError> {
        self.executor.send(request).await
    }
}

fn str_arg<'a>(arguments: &'a Map<String, Value>, name: &str) -> Result<&'a str, UpstreamError> {
    arguments
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| UpstreamError::Mapping(format!("validated call lost field '{name}'")))
}

fn first_arg(arguments: &Map<String, Value>) -> Result<i64, UpstreamError> {
    arguments
        .get("first")
        .and_then(Value::as_i64)
        .ok_or_else(|| UpstreamError::Mapping("validated call lost field 'first'".to_string()))
}

fn first_variables(arguments: &Map<String, Value>) -> Result<Value, UpstreamError> {
    Ok(json!({ "first": first_arg(arguments)? }))
}

fn id_variables(arguments: &Map<String, Value>) -> Result<Value, UpstreamError> {
    Ok(json!({ "id": str_arg(arguments, "id")? }))
}

fn search_variables(arguments: &Map<String, Value>) -> Result<Value, UpstreamError> {
    Ok(json!({
        "search": str_arg(arguments, "query")?,
        "first": first_arg(arguments)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use intelgate_core::validate;

    fn client() -> OpenCtiClient {
        OpenCtiClient::new(DEFAULT_BASE_URL, "test-token").expect("client builds")
    }

    fn prepared(tool: &str, arguments: Value) -> UpstreamRequest {
        let registry = crate::catalog::registry().expect("catalog");
        let call = validate::validate(&registry, tool, Some(&arguments)).expect("validates");
        client().prepare(&call).expect("prepare")
    }

    #[test]
    fn every_tool_posts_to_graphql() {
        let registry = crate::catalog::registry().expect("catalog");
        for tool in registry.list() {
            let arguments = match tool.name {
                "get_report_by_id" | "get_user_by_id" | "get_file_by_id" => {
                    json!({"id": "abc-123"})
                }
                "get_campaign_by_name" => json!({"name": "APT28 Campaign"}),
                name if name.starts_with("search_") => json!({"query": "apt"}),
                _ => json!({}),
            };
            let request = prepared(tool.name, arguments);
            assert_eq!(request.method, reqwest::Method::POST);
            assert_eq!(request.path, "/graphql");
            let body = request.body.expect("body");
            assert!(body["query"].as_str().expect("query").contains("query "));
            assert!(body["variables"].is_object());
        }
    }

    #[test]
    fn search_renames_query_to_the_search_variable() {
        let request = prepared("search_indicators", json!({"query": "apt28", "first": 25}));
        let body = request.body.expect("body");
        assert_eq!(body["variables"], json!({"search": "apt28", "first": 25}));
        assert!(body["query"].as_str().expect("query").contains("Indicator"));
    }

    #[test]
    fn paging_default_reaches_the_wire() {
        let request = prepared("get_latest_reports", json!({}));
        let body = request.body.expect("body");
        assert_eq!(body["variables"], json!({"first": 10}));
    }

    #[test]
    fn campaign_lookup_filters_by_name() {
        let request = prepared("get_campaign_by_name", json!({"name": "Sandworm"}));
        let body = request.body.expect("body");
        assert_eq!(body["variables"], json!({"name": "Sandworm"}));
        assert!(body["query"].as_str().expect("query").contains("campaigns"));
    }

    #[test]
    fn file_tools_map_to_their_file_queries() {
        let request = prepared("get_file_by_id", json!({"id": "import/global/report.pdf"}));
        let body = request.body.expect("body");
        assert!(body["query"].as_str().expect("query").contains("file(id: $id)"));
        assert_eq!(body["variables"], json!({"id": "import/global/report.pdf"}));

        let request = prepared("list_files", json!({}));
        let body = request.body.expect("body");
        assert!(body["query"].as_str().expect("query").contains("importFiles"));

        let request = prepared("list_status_templates", json!({}));
        let body = request.body.expect("body");
        assert!(body["query"].as_str().expect("query").contains("statusTemplates"));
    }

    #[test]
    fn token_with_control_characters_is_rejected() {
        assert!(OpenCtiClient::new(DEFAULT_BASE_URL, "bad\ntoken").is_err());
    }
}
