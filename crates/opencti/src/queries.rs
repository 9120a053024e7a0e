//! Static GraphQL documents, one per tool.
//!
//! Variable signatures are part of the wire contract with the platform;
//! selection sets stay modest so responses remain a sane size for a
//! line-delimited transport.

pub const LATEST_REPORTS: &str = r#"
query LatestReport($first: Int) {
  reports(first: $first, orderBy: created, orderMode: desc) {
    edges {
      node {
        id
        standard_id
        entity_type
        name
        description
        content
        report_types
        published
        confidence
        created
        modified
        createdBy {
          id
          name
          entity_type
        }
        objectMarking {
          id
          definition
        }
        objectLabel {
          id
          value
          color
        }
      }
    }
  }
}
"#;

pub const REPORT_BY_ID: &str = r#"
query ReportById($id: String!) {
  report(id: $id) {
    id
    standard_id
    entity_type
    name
    description
    content
    report_types
    published
    confidence
    created
    modified
    createdBy {
      id
      name
      entity_type
    }
    objectMarking {
      id
      definition
    }
    objectLabel {
      id
      value
      color
    }
    externalReferences {
      edges {
        node {
          id
          source_name
          url
          external_id
        }
      }
    }
  }
}
"#;

pub const SEARCH_INDICATORS: &str = r#"
query Indicators($search: String, $first: Int) {
  stixCoreObjects(search: $search, first: $first, types: ["Indicator"]) {
    edges {
      node {
        ... on Indicator {
          id
          name
          description
          created_at
          pattern
          valid_from
          valid_until
          x_opencti_score
        }
      }
    }
  }
}
"#;

pub const SEARCH_MALWARE: &str = r#"
query Malware($search: String, $first: Int) {
  stixCoreObjects(search: $search, first: $first, types: ["Malware"]) {
    edges {
      node {
        ... on Malware {
          id
          name
          description
          created
          modified
          malware_types
          is_family
          first_seen
          last_seen
        }
      }
    }
  }
}
"#;

pub const SEARCH_THREAT_ACTORS: &str = r#"
query ThreatActors($search: String, $first: Int) {
  stixCoreObjects(search: $search, first: $first, types: ["ThreatActorGroup"]) {
    edges {
      node {
        ... on ThreatActorGroup {
          id
          name
          description
          created
          modified
          threat_actor_types
          first_seen
          last_seen
          sophistication
          resource_level
          roles
          goals
        }
      }
    }
  }
}
"#;

pub const USER_BY_ID: &str = r#"
query UserById($id: String!) {
  user(id: $id) {
    id
    standard_id
    entity_type
    user_email
    name
    firstname
    lastname
    groups {
      edges {
        node {
          id
          name
        }
      }
    }
  }
}
"#;

pub const ALL_USERS: &str = r#"
query AllUsers {
  users {
    edges {
      node {
        id
        standard_id
        entity_type
        user_email
        name
        firstname
        lastname
        external
        created_at
        updated_at
      }
    }
  }
}
"#;

pub const ALL_GROUPS: &str = r#"
query AllGroups($first: Int) {
  groups(first: $first) {
    pageInfo {
      hasNextPage
      endCursor
    }
    edges {
      node {
        id
        standard_id
        entity_type
        name
        description
        members(first: 5) {
          edges {
            node {
              id
              name
              user_email
            }
          }
        }
      }
    }
  }
}
"#;

pub const ALL_ATTACK_PATTERNS: &str = r#"
query AllAttackPatterns($first: Int) {
  attackPatterns(first: $first) {
    pageInfo {
      hasNextPage
      endCursor
    }
    edges {
      node {
        id
        standard_id
        entity_type
        name
        description
        x_mitre_id
        killChainPhases {
          id
          kill_chain_name
          phase_name
        }
      }
    }
  }
}
"#;

pub const CAMPAIGN_BY_NAME: &str = r#"
query CampaignByName($name: Any!) {
  campaigns(
    first: 1,
    filters: {
      mode: and,
      filters: [{ key: "name", values: [$name], operator: eq, mode: or }],
      filterGroups: []
    }
  ) {
    edges {
      node {
        id
        standard_id
        entity_type
        name
        description
        first_seen
        last_seen
        created
        modified
      }
    }
  }
}
"#;

pub const ALL_CONNECTORS: &str = r#"
query AllConnectors {
  connectors {
    id
    name
    active
    auto
    connector_type
    connector_scope
    connector_state
    updated_at
    created_at
  }
}
"#;

pub const ALL_STATUS_TEMPLATES: &str = r#"
query AllStatusTemplates {
  statusTemplates {
    edges {
      node {
        id
        name
        color
        usages
      }
    }
  }
}
"#;

pub const FILE_BY_ID: &str = r#"
query FileById($id: String!) {
  file(id: $id) {
    id
    name
    size
    lastModified
    uploadStatus
  }
}
"#;

pub const ALL_FILES: &str = r#"
query AllFiles {
  importFiles(first: 100) {
    edges {
      node {
        id
        name
        size
        uploadStatus
        lastModified
        metaData {
          mimetype
          version
        }
      }
    }
  }
}
"#;

pub const ALL_MARKING_DEFINITIONS: &str = r#"
query AllMarkingDefinitions {
  markingDefinitions {
    edges {
      node {
        id
        standard_id
        entity_type
        definition_type
        definition
        x_opencti_order
        x_opencti_color
      }
    }
  }
}
"#;

pub const ALL_LABELS: &str = r#"
query AllLabels {
  labels {
    edges {
      node {
        id
        standard_id
        entity_type
        value
        color
      }
    }
  }
}
"#;
