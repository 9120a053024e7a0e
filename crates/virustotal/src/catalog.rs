//! Tool catalog for the VirusTotal v3 API.

use intelgate_core::registry::{
    FieldKind, FieldSpec, Pattern, Registry, RegistryError, ScalarKind, StringConstraint,
    ToolDescriptor,
};
use serde_json::json;

/// 512 KiB ceiling on YARA source.
pub const MAX_YARA_BYTES: usize = 512 * 1024;
/// IOC ceiling for collections (applied per array and to the total).
pub const MAX_COLLECTION_IOCS: usize = 1000;

/// Build the catalog in its published order.
///
/// # Errors
///
/// Propagates registry construction failures (duplicate names).
pub fn registry() -> Result<Registry, RegistryError> {
    Registry::new(vec![
        create_hunting_ruleset(),
        create_collection(),
        list_hunting_rulesets(),
    ])
}

fn name_field(description: &'static str) -> FieldSpec {
    FieldSpec::required(
        "name",
        description,
        FieldKind::Scalar(ScalarKind::String(StringConstraint::pattern(
            1,
            100,
            Pattern::Identifier,
        ))),
    )
}

fn ioc_array(name: &'static str, description: &'static str, pattern: Pattern, max_len: usize) -> FieldSpec {
    FieldSpec::optional(
        name,
        description,
        FieldKind::Array {
            element: ScalarKind::String(StringConstraint::pattern(1, max_len, pattern)),
            max_items: MAX_COLLECTION_IOCS,
        },
        Some(json!([])),
    )
}

fn create_hunting_ruleset() -> ToolDescriptor {
    ToolDescriptor {
        name: "create_hunting_ruleset",
        description: "Create a new hunting ruleset in VirusTotal Livehunt with YARA rules",
        fields: vec![
            name_field("Name of the hunting ruleset"),
            FieldSpec::required(
                "rules",
                "YARA rules content (the vt module is auto-imported)",
                FieldKind::Scalar(ScalarKind::String(StringConstraint::pattern(
                    10,
                    MAX_YARA_BYTES,
                    Pattern::YaraSource,
                ))),
            ),
            FieldSpec::optional(
                "enabled",
                "Whether the ruleset should be enabled (default: false for safety)",
                FieldKind::Scalar(ScalarKind::Boolean),
                Some(json!(false)),
            ),
        ],
    }
}

fn create_collection() -> ToolDescriptor {
    ToolDescriptor {
        name: "create_collection",
        description: "Create a new IOC collection in VirusTotal. IOCs (Indicators of Compromise) \
                      are security artifacts like domains, URLs, IP addresses, and file hashes. \
                      At least one IOC is required.",
        fields: vec![
            name_field("Name of the collection"),
            FieldSpec::optional(
                "description",
                "Description of the collection",
                FieldKind::Scalar(ScalarKind::String(StringConstraint::bounded(0, 500))),
                Some(json!("")),
            ),
            ioc_array(
                "domains",
                "Domain names - e.g., ['malicious-site.com']",
                Pattern::Hostname,
                255,
            ),
            ioc_array(
                "urls",
                "URLs - e.g., ['https://evil.com/malware.exe']",
                Pattern::Url,
                2048,
            ),
            ioc_array(
                "ip_addresses",
                "IPv4 addresses - e.g., ['192.168.1.100']",
                Pattern::Ipv4,
                15,
            ),
            ioc_array(
                "file_hashes",
                "File hashes (MD5/SHA1/SHA256)",
                Pattern::HexDigest,
                64,
            ),
        ],
    }
}

fn list_hunting_rulesets() -> ToolDescriptor {
    ToolDescriptor {
        name: "list_hunting_rulesets",
        description: "List the hunting rulesets in the account",
        fields: vec![FieldSpec::optional(
            "limit",
            "Maximum number of rulesets to return",
            FieldKind::Scalar(ScalarKind::Integer { min: 1, max: 40 }),
            Some(json!(20)),
        )],
    }
}
