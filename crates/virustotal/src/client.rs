//! VirusTotal v3 upstream client: validated call → REST request.

use crate::catalog;
use async_trait::async_trait;
use intelgate_core::upstream::{
    HttpExecutor, RawResponse, UpstreamClient, UpstreamError, UpstreamRequest,
};
use intelgate_core::validate::ValidatedCall;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{Map, Value, json};

pub const DEFAULT_BASE_URL: &str = "https://www.virustotal.com";
const USER_AGENT: &str = concat!("intelgate-virustotal/", env!("CARGO_PKG_VERSION"));

pub struct VirusTotalClient {
    executor: HttpExecutor,
}

impl VirusTotalClient {
    /// Build a client; validates the credential shape up front so a broken
    /// key is a startup failure, not a per-call surprise.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed API key or base URL.
    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let api_key = validate_api_key(api_key)?;

        let mut headers = HeaderMap::new();
        let mut key_value = HeaderValue::from_str(&api_key)
            .map_err(|_| anyhow::anyhow!("API key contains non-header characters"))?;
        key_value.set_sensitive(true);
        headers.insert("x-apikey", key_value);
        headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(USER_AGENT),
        );

        Ok(Self {
            executor: HttpExecutor::new(base_url, headers)?,
        })
    }
}

/// Minimum plausible key length plus a word-character check; anything else
/// is rejected before the process starts serving.
fn validate_api_key(raw: &str) -> anyhow::Result<String> {
    let key = raw.trim();
    anyhow::ensure!(key.len() >= 32, "API key is too short");
    anyhow::ensure!(
        key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'),
        "API key contains unexpected characters"
    );
    Ok(key.to_string())
}

#[async_trait]
impl UpstreamClient for VirusTotalClient {
    fn prepare(&self, call: &ValidatedCall) -> Result<UpstreamRequest, UpstreamError> {
        match call.tool.as_str() {
            "create_hunting_ruleset" => ruleset_request(&call.arguments),
            "create_collection" => collection_request(&call.arguments),
            "list_hunting_rulesets" => Ok(list_rulesets_request(&call.arguments)),
            other => Err(UpstreamError::Mapping(other.to_string())),
        }
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

fn str_items<'a>(arguments: &'a Map<String, Value>, name: &str) -> Vec<&'a str> {
    arguments
        .get(name)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn ruleset_request(arguments: &Map<String, Value>) -> Result<UpstreamRequest, UpstreamError> {
    let name = str_arg(arguments, "name")?;
    let rules = str_arg(arguments, "rules")?;
    let enabled = arguments
        .get("enabled")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    // Livehunt rules referencing vt.* need the module import; add it when
    // the author left it out.
    let rules = if rules.contains("import \"vt\"") {
        rules.to_string()
    } else {
        format!("import \"vt\"\n{rules}")
    };

    let body = json!({
        "data": {
            "type": "hunting_ruleset",
            "attributes": {
                "name": name,
                "rules": rules,
                "enabled": enabled,
                "match_object_type": "file",
                "limit": 100,
            },
        },
    });
    Ok(UpstreamRequest::post(
        "/api/v3/intelligence/hunting_rulesets",
        body,
    ))
}

fn collection_request(arguments: &Map<String, Value>) -> Result<UpstreamRequest, UpstreamError> {
    let name = str_arg(arguments, "name")?;
    let description = arguments
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("");

    let domains = str_items(arguments, "domains");
    let urls = str_items(arguments, "urls");
    let ip_addresses = str_items(arguments, "ip_addresses");
    let file_hashes = str_items(arguments, "file_hashes");

    if domains.is_empty() && urls.is_empty() && ip_addresses.is_empty() && file_hashes.is_empty() {
        return Err(UpstreamError::Domain(
            "collection requires at least one IOC (domain, URL, IP address, or file hash)"
                .to_string(),
        ));
    }

    if domains.len() + urls.len() + ip_addresses.len() + file_hashes.len()
        > catalog::MAX_COLLECTION_IOCS
    {
        return Err(UpstreamError::Domain(
            "collection exceeds the total IOC ceiling".to_string(),
        ));
    }

    let mut relationships = Map::new();
    if !domains.is_empty() {
        relationships.insert(
            "domains".to_string(),
            json!({ "data": domains.iter().map(|d| json!({"type": "domain", "id": d})).collect::<Vec<_>>() }),
        );
    }
    if !urls.is_empty() {
        // URLs are keyed by `url`, not `id`, in the v3 relationship shape.
        relationships.insert(
            "urls".to_string(),
            json!({ "data": urls.iter().map(|u| json!({"type": "url", "url": u})).collect::<Vec<_>>() }),
        );
    }
    if !ip_addresses.is_empty() {
        relationships.insert(
            "ip_addresses".to_string(),
            json!({ "data": ip_addresses.iter().map(|ip| json!({"type": "ip_address", "id": ip})).collect::<Vec<_>>() }),
        );
    }
    if !file_hashes.is_empty() {
        relationships.insert(
            "files".to_string(),
            json!({ "data": file_hashes.iter().map(|h| json!({"type": "file", "id": h})).collect::<Vec<_>>() }),
        );
    }

    let body = json!({
        "data": {
            "type": "collection",
            "attributes": { "name": name, "description": description },
            "relationships": relationships,
        },
    });
    Ok(UpstreamRequest::post("/api/v3/collections", body))
}

fn list_rulesets_request(arguments: &Map<String, Value>) -> UpstreamRequest {
    let limit = arguments.get("limit").and_then(Value::as_i64).unwrap_or(20);
    UpstreamRequest::get("/api/v3/intelligence/hunting_rulesets")
        .with_query("limit", limit.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use intelgate_core::validate;

    fn valid_key() -> String {
        "a".repeat(64)
    }

    fn client() -> VirusTotalClient {
        VirusTotalClient::new(DEFAULT_BASE_URL, &valid_key()).expect("client builds")
    }

    fn validated(tool: &str, arguments: Value) -> ValidatedCall {
        let registry = crate::catalog::registry().expect("catalog");
        validate::validate(&registry, tool, Some(&arguments)).expect("arguments validate")
    }

    #[test]
    fn api_key_shape_is_checked_at_startup() {
        assert!(VirusTotalClient::new(DEFAULT_BASE_URL, "short").is_err());
        assert!(VirusTotalClient::new(DEFAULT_BASE_URL, &format!("{}!", "a".repeat(40))).is_err());
        assert!(VirusTotalClient::new(DEFAULT_BASE_URL, &format!("  {}  ", valid_key())).is_ok());
    }

    #[test]
    fn ruleset_request_prepends_vt_import_exactly_once() {
        let call = validated(
            "create_hunting_ruleset",
            json!({"name": "Demo", "rules": "rule demo { condition: true }"}),
        );
        let request = client().prepare(&call).expect("prepare");
        assert_eq!(request.path, "/api/v3/intelligence/hunting_rulesets");

        let rules = request.body.as_ref().expect("body")["data"]["attributes"]["rules"]
            .as_str()
            .expect("rules string")
            .to_string();
        assert!(rules.starts_with("import \"vt\"\n"));

        let call = validated(
            "create_hunting_ruleset",
            json!({"name": "Demo", "rules": "import \"vt\"\nrule demo { condition: true }"}),
        );
        let request = client().prepare(&call).expect("prepare");
        let rules = request.body.as_ref().expect("body")["data"]["attributes"]["rules"]
            .as_str()
            .expect("rules string")
            .to_string();
        assert_eq!(rules.matches("import \"vt\"").count(), 1);
    }

    #[test]
    fn ruleset_request_carries_safety_defaults() {
        let call = validated(
            "create_hunting_ruleset",
            json!({"name": "Demo", "rules": "rule demo { condition: true }"}),
        );
        let request = client().prepare(&call).expect("prepare");
        let attributes = &request.body.as_ref().expect("body")["data"]["attributes"];
        assert_eq!(attributes["enabled"], json!(false));
        assert_eq!(attributes["match_object_type"], json!("file"));
        assert_eq!(attributes["limit"], json!(100));
    }

    #[test]
    fn collection_without_iocs_is_a_domain_error_before_any_request() {
        let call = validated("create_collection", json!({"name": "Test"}));
        let err = client().prepare(&call).expect_err("no IOCs");
        assert!(matches!(err, UpstreamError::Domain(_)));
    }

    #[test]
    fn collection_relationships_use_per_kind_shapes() {
        let call = validated(
            "create_collection",
            json!({
                "name": "Campaign",
                "domains": ["malicious-site.com"],
                "urls": ["https://evil.com/malware.exe"],
                "ip_addresses": ["10.0.0.50"],
                "file_hashes": ["d".repeat(64)],
            }),
        );
        let request = client().prepare(&call).expect("prepare");
        assert_eq!(request.path, "/api/v3/collections");

        let relationships = &request.body.as_ref().expect("body")["data"]["relationships"];
        assert_eq!(
            relationships["domains"]["data"][0],
            json!({"type": "domain", "id": "malicious-site.com"})
        );
        assert_eq!(
            relationships["urls"]["data"][0],
            json!({"type": "url", "url": "https://evil.com/malware.exe"})
        );
        assert_eq!(
            relationships["ip_addresses"]["data"][0],
            json!({"type": "ip_address", "id": "10.0.0.50"})
        );
        assert_eq!(
            relationships["files"]["data"][0]["type"],
            json!("file")
        );
    }

    #[test]
    fn collection_omits_empty_relationship_kinds() {
        let call = validated(
            "create_collection",
            json!({"name": "Test", "domains": ["a.example.com"]}),
        );
        let request = client().prepare(&call).expect("prepare");
        let relationships = &request.body.as_ref().expect("body")["data"]["relationships"];
        assert!(relationships.get("urls").is_none());
        assert!(relationships.get("files").is_none());
    }

    #[test]
    fn list_rulesets_maps_to_a_bounded_get() {
        let call = validated("list_hunting_rulesets", json!({}));
        let request = client().prepare(&call).expect("prepare");
        assert_eq!(request.method, reqwest::Method::GET);
        assert_eq!(request.path, "/api/v3/intelligence/hunting_rulesets");
        assert_eq!(request.query, vec![("limit".to_string(), "20".to_string())]);
    }
}
