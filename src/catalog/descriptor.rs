//! Resource descriptors
//!
//! A descriptor names one resource type together with the command used to
//! retrieve it. The same resource type may appear several times with
//! different commands (e.g. `group lists` and `group listUsers`).

use serde::{Deserialize, Serialize};

/// How a resource type is retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalCapability {
    /// Enumerable collection, fetched with a list command
    Listable,
    /// Single record, fetched with a get command
    Singleton,
}

/// Whether a resource type needs identifiers from another type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Independent,
    Dependent,
}

/// A dependent listing that attaches existing entities instead of creating
/// new ones.
///
/// Each persisted record names a member (its `id`); restoring it means
/// calling `resource command` with both the translated source identifier and
/// the translated member identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRoute {
    /// Backend resource that performs the attachment
    pub resource: String,
    /// Backend command that performs the attachment
    pub command: String,
    /// Resource type the member identifiers belong to
    pub member_type: String,
    /// Parameter name for the member identifier
    pub member_parameter: String,
}

impl AssignmentRoute {
    pub fn new(
        resource: impl Into<String>,
        command: impl Into<String>,
        member_type: impl Into<String>,
        member_parameter: impl Into<String>,
    ) -> Self {
        Self {
            resource: resource.into(),
            command: command.into(),
            member_type: member_type.into(),
            member_parameter: member_parameter.into(),
        }
    }
}

/// Static description of one resource type and how to fetch it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    /// camelCase resource name, as understood by the backend
    pub name: String,

    pub retrieval: RetrievalCapability,

    pub dependency: DependencyKind,

    /// Command that lists the collection (empty for singletons)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub list_command: String,

    /// Command that fetches one record
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub get_command: String,

    /// Resource type supplying parameter identifiers (dependent only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,

    /// Parameter name under which the source identifier is passed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<AssignmentRoute>,
}

impl ResourceDescriptor {
    /// An independent, listable resource
    pub fn independent(name: impl Into<String>, list_command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            retrieval: RetrievalCapability::Listable,
            dependency: DependencyKind::Independent,
            list_command: list_command.into(),
            get_command: String::new(),
            source_type: None,
            parameter: None,
            assignment: None,
        }
    }

    /// A listable resource parameterized by identifiers of `source_type`
    pub fn dependent(
        name: impl Into<String>,
        list_command: impl Into<String>,
        source_type: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let parameter = parameter_flag_for(&name).to_string();
        Self {
            name,
            retrieval: RetrievalCapability::Listable,
            dependency: DependencyKind::Dependent,
            list_command: list_command.into(),
            get_command: String::new(),
            source_type: Some(source_type.into()),
            parameter: Some(parameter),
            assignment: None,
        }
    }

    /// A singleton resource fetched with `get_command`
    pub fn singleton(name: impl Into<String>, get_command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            retrieval: RetrievalCapability::Singleton,
            dependency: DependencyKind::Independent,
            list_command: String::new(),
            get_command: get_command.into(),
            source_type: None,
            parameter: None,
            assignment: None,
        }
    }

    pub fn with_get(mut self, get_command: impl Into<String>) -> Self {
        self.get_command = get_command.into();
        self
    }

    pub fn with_assignment(mut self, route: AssignmentRoute) -> Self {
        self.assignment = Some(route);
        self
    }

    pub fn is_singleton(&self) -> bool {
        self.retrieval == RetrievalCapability::Singleton
    }

    pub fn is_dependent(&self) -> bool {
        self.dependency == DependencyKind::Dependent
    }

    /// The command whose output this descriptor persists
    pub fn command(&self) -> &str {
        match self.retrieval {
            RetrievalCapability::Listable => &self.list_command,
            RetrievalCapability::Singleton => &self.get_command,
        }
    }

    /// Parameter name for the source identifier, `id` when unspecified
    pub fn parameter_flag(&self) -> &str {
        self.parameter.as_deref().unwrap_or("id")
    }
}

/// Map a resource name to the parameter its source identifier is passed as
pub fn parameter_flag_for(resource: &str) -> &'static str {
    match resource {
        "group" | "groupOwner" => "groupId",
        "user" | "userFactor" | "roleAssignment" => "userId",
        "application" => "applicationId",
        "authorizationServer"
        | "authorizationServerPolicies"
        | "authorizationServerClaims"
        | "authorizationServerScopes"
        | "authorizationServerClients" => "authServerId",
        "authorizationServerRules" | "policy" => "policyId",
        "identityProvider" => "idpId",
        "applicationGroups" | "applicationUsers" | "applicationTokens"
        | "applicationCredentials" | "applicationFeatures" | "applicationGrants" => "appId",
        _ => "id",
    }
}
