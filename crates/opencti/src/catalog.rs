//! Tool catalog for the OpenCTI GraphQL API. All tools are read-only.

use intelgate_core::registry::{
    FieldKind, FieldSpec, Registry, RegistryError, ScalarKind, StringConstraint, ToolDescriptor,
};
use serde_json::json;

/// Cap on page-size arguments; the platform itself refuses more.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Build the catalog in its published order.
///
/// # Errors
///
/// Propagates registry construction failures (duplicate names).
pub fn registry() -> Result<Registry, RegistryError> {
    Registry::new(vec![
        ToolDescriptor {
            name: "get_latest_reports",
            description: "Get the most recent reports, newest first",
            fields: vec![first_field()],
        },
        ToolDescriptor {
            name: "get_report_by_id",
            description: "Get a single report by its internal ID",
            fields: vec![id_field("Report ID")],
        },
        search_tool("search_indicators", "Search indicators by keyword"),
        search_tool("search_malware", "Search malware entries by keyword"),
        search_tool("search_threat_actors", "Search threat actor groups by keyword"),
        ToolDescriptor {
            name: "get_user_by_id",
            description: "Get a platform user by ID, including group membership",
            fields: vec![id_field("User ID")],
        },
        ToolDescriptor {
            name: "list_users",
            description: "List all platform users",
            fields: vec![],
        },
        ToolDescriptor {
            name: "list_groups",
            description: "List groups with a sample of their members",
            fields: vec![first_field()],
        },
        ToolDescriptor {
            name: "list_attack_patterns",
            description: "List attack patterns with MITRE IDs and kill chain phases",
            fields: vec![first_field()],
        },
        ToolDescriptor {
            name: "get_campaign_by_name",
            description: "Look up a campaign by exact name",
            fields: vec![FieldSpec::required(
                "name",
                "Campaign name",
                text_kind(),
            )],
        },
        ToolDescriptor {
            name: "list_connectors",
            description: "List registered connectors and their state",
            fields: vec![],
        },
        ToolDescriptor {
            name: "list_status_templates",
            description: "List workflow status templates",
            fields: vec![],
        },
        ToolDescriptor {
            name: "get_file_by_id",
            description: "Get an uploaded file's metadata by ID",
            fields: vec![id_field("File ID")],
        },
        ToolDescriptor {
            name: "list_files",
            description: "List uploaded import files",
            fields: vec![],
        },
        ToolDescriptor {
            name: "list_marking_definitions",
            description: "List marking definitions (TLP and others)",
            fields: vec![],
        },
        ToolDescriptor {
            name: "list_labels",
            description: "List labels",
            fields: vec![],
        },
    ])
}

fn text_kind() -> FieldKind {
    FieldKind::Scalar(ScalarKind::String(StringConstraint::bounded(1, 256)))
}

fn first_field() -> FieldSpec {
    FieldSpec::optional(
        "first",
        "Maximum number of results to return",
        FieldKind::Scalar(ScalarKind::Integer {
            min: 1,
            max: MAX_PAGE_SIZE,
        }),
        Some(json!(10)),
    )
}

fn id_field(description: &'static str) -> FieldSpec {
    FieldSpec::required("id", description, text_kind())
}

fn search_tool(name: &'static str, description: &'static str) -> ToolDescriptor {
    ToolDescriptor {
        name,
        description,
        fields: vec![
            FieldSpec::required("query", "Search keyword", text_kind()),
            first_field(),
        ],
    }
}
