//! Dynamic permission collaborator.
//!
//! Org-level roles (`owner` / `admin` / `member`) are a closed set carried
//! on the member row; everything finer-grained is a dynamically assigned
//! `(action, resource)` grant evaluated by an external RBAC service behind
//! [`RbacProvider`]. [`StaticRbacProvider`] is the in-memory rendition used
//! by tests and development setups.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use org_guard_core::StoreError;

/// Resource types for permission checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Organization,
    Member,
    Team,
    Invitation,
}

impl Resource {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "organization" => Some(Self::Organization),
            "member" | "members" => Some(Self::Member),
            "team" | "teams" => Some(Self::Team),
            "invitation" | "invitations" => Some(Self::Invitation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Member => "member",
            Self::Team => "team",
            Self::Invitation => "invitation",
        }
    }
}

/// Actions that can be performed on resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Cancel,
}

impl Action {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "create" => Some(Self::Create),
            "read" => Some(Self::Read),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Cancel => "cancel",
        }
    }
}

/// A named, categorized capability grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub name: String,
    pub category: String,
    pub action: Action,
    pub resource: Resource,
}

impl Permission {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        action: Action,
        resource: Resource,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            action,
            resource,
        }
    }
}

/// A role carrying permission grants.
///
/// With `organization_id` unset the role is a reusable template; cloning it
/// for an organization produces the bound instance actually assignable to
/// users. `owner_role` marks the one role designated as the organization's
/// owner role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub id: String,
    pub name: String,
    #[serde(rename = "organizationId")]
    pub organization_id: Option<String>,
    #[serde(rename = "ownerRole")]
    pub owner_role: bool,
    pub permissions: Vec<Permission>,
}

impl RoleDefinition {
    /// Create a reusable role template.
    pub fn template(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            organization_id: None,
            owner_role: false,
            permissions: Vec::new(),
        }
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    pub fn mark_owner_role(mut self) -> Self {
        self.owner_role = true;
        self
    }

    pub fn is_template(&self) -> bool {
        self.organization_id.is_none()
    }

    /// Instantiate a template as an organization-bound role with a fresh id.
    pub fn clone_for_organization(&self, organization_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: self.name.clone(),
            organization_id: Some(organization_id.into()),
            owner_role: self.owner_role,
            permissions: self.permissions.clone(),
        }
    }

    pub fn allows(&self, action: Action, resource: Resource) -> bool {
        self.permissions
            .iter()
            .any(|p| p.action == action && p.resource == resource)
    }
}

/// External RBAC collaborator.
///
/// The access engine treats the answer as authoritative only on
/// `Ok(true)`; errors are swallowed fail-closed by the caller, never
/// propagated as a grant.
#[async_trait]
pub trait RbacProvider: Send + Sync + 'static {
    async fn check_permission(
        &self,
        organization_id: &str,
        user_id: &str,
        action: Action,
        resource: Resource,
    ) -> Result<bool, StoreError>;
}

/// In-memory RBAC provider backed by role definitions and per-organization
/// assignments.
#[derive(Default)]
pub struct StaticRbacProvider {
    roles: Mutex<HashMap<String, RoleDefinition>>,
    /// (organization_id, user_id) -> assigned role ids
    assignments: Mutex<HashMap<(String, String), Vec<String>>>,
}

impl StaticRbacProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a role definition, returning its id.
    pub fn register_role(&self, role: RoleDefinition) -> String {
        let id = role.id.clone();
        self.roles.lock().unwrap().insert(id.clone(), role);
        id
    }

    /// Assign a registered role to a user within an organization.
    pub fn assign(&self, organization_id: &str, user_id: &str, role_id: &str) {
        self.assignments
            .lock()
            .unwrap()
            .entry((organization_id.to_string(), user_id.to_string()))
            .or_default()
            .push(role_id.to_string());
    }

    /// Register a single-permission role and assign it in one step.
    pub fn grant(&self, organization_id: &str, user_id: &str, action: Action, resource: Resource) {
        let role = RoleDefinition::template(format!("{}-{}", action.as_str(), resource.as_str()))
            .with_permission(Permission::new(
                format!("{}:{}", action.as_str(), resource.as_str()),
                "granted",
                action,
                resource,
            ))
            .clone_for_organization(organization_id);
        let role_id = self.register_role(role);
        self.assign(organization_id, user_id, &role_id);
    }
}

#[async_trait]
impl RbacProvider for StaticRbacProvider {
    async fn check_permission(
        &self,
        organization_id: &str,
        user_id: &str,
        action: Action,
        resource: Resource,
    ) -> Result<bool, StoreError> {
        let assignments = self.assignments.lock().unwrap();
        let roles = self.roles.lock().unwrap();

        let key = (organization_id.to_string(), user_id.to_string());
        let Some(role_ids) = assignments.get(&key) else {
            return Ok(false);
        };

        Ok(role_ids.iter().any(|id| {
            roles
                .get(id)
                .is_some_and(|role| role.allows(action, resource))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Resource::parse("Members"), Some(Resource::Member));
        assert_eq!(Resource::parse("ORGANIZATION"), Some(Resource::Organization));
        assert_eq!(Action::parse("Create"), Some(Action::Create));
        assert_eq!(Action::parse("destroy"), None);
        assert_eq!(Resource::parse("widgets"), None);
    }

    #[test]
    fn test_template_cloning_binds_to_organization() {
        let template = RoleDefinition::template("billing-admin")
            .with_permission(Permission::new(
                "update:organization",
                "billing",
                Action::Update,
                Resource::Organization,
            ))
            .mark_owner_role();

        assert!(template.is_template());

        let bound = template.clone_for_organization("org-1");
        assert!(!bound.is_template());
        assert_ne!(bound.id, template.id);
        assert_eq!(bound.organization_id.as_deref(), Some("org-1"));
        assert!(bound.owner_role);
        assert!(bound.allows(Action::Update, Resource::Organization));
        assert!(!bound.allows(Action::Delete, Resource::Organization));
    }

    #[tokio::test]
    async fn test_static_provider_checks_assignments() {
        let rbac = StaticRbacProvider::new();
        rbac.grant("org-1", "u1", Action::Create, Resource::Member);

        assert!(
            rbac.check_permission("org-1", "u1", Action::Create, Resource::Member)
                .await
                .unwrap()
        );
        // Same user, other organization: no grant.
        assert!(
            !rbac
                .check_permission("org-2", "u1", Action::Create, Resource::Member)
                .await
                .unwrap()
        );
        // Same organization, other action: no grant.
        assert!(
            !rbac
                .check_permission("org-1", "u1", Action::Delete, Resource::Member)
                .await
                .unwrap()
        );
    }
}
