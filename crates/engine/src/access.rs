//! The organization access decision.
//!
//! `can_manage` combines three independent authority sources in strict
//! short-circuit order: app-level administrative roles, dynamic RBAC
//! grants, and the org-level membership role. Each tier is a named method
//! so the precedence stays explicit and each signal is testable alone.

use std::sync::Arc;

use org_guard_core::entity::MemberRecord;
use org_guard_core::store::{MemberOps, OrganizationStore, UserOps};
use org_guard_core::{MemberRole, MemberStatus, OrgResult};

use crate::rbac::{Action, RbacProvider, Resource};

/// App-level role names that grant management rights over every
/// organization in the application.
const APP_ADMIN_ROLES: [&str; 3] = ["owner", "admin", "superadmin"];

/// The dynamic grant consulted by `can_manage`.
const MANAGEMENT_ACTION: Action = Action::Create;
const MANAGEMENT_RESOURCE: Resource = Resource::Member;

/// Stateless per-request access decisions over a store and an RBAC
/// collaborator. Holds no mutable state; safe to clone and share.
pub struct AccessEngine<S, R> {
    store: Arc<S>,
    rbac: Arc<R>,
}

impl<S, R> Clone for AccessEngine<S, R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            rbac: Arc::clone(&self.rbac),
        }
    }
}

impl<S, R> AccessEngine<S, R>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    pub fn new(store: Arc<S>, rbac: Arc<R>) -> Self {
        Self { store, rbac }
    }

    /// Can `user_id` perform management actions on `organization_id`?
    ///
    /// App admins pass unconditionally and are never isolated from any
    /// organization; callers relying on org-scoped isolation must account
    /// for that. If no tier grants, the answer is no.
    pub async fn can_manage(&self, organization_id: &str, user_id: &str) -> OrgResult<bool> {
        if self.is_app_admin(user_id).await? {
            return Ok(true);
        }
        if self.has_management_grant(organization_id, user_id).await {
            return Ok(true);
        }
        self.has_managing_membership(organization_id, user_id).await
    }

    /// Tier 1: does the user hold a platform-wide owner/admin/superadmin
    /// role? Evaluated first; bypasses RBAC and membership entirely, so an
    /// RBAC misconfiguration cannot lock out platform administrators.
    pub async fn is_app_admin(&self, user_id: &str) -> OrgResult<bool> {
        let roles = self.store.list_user_app_roles(user_id).await?;
        Ok(roles
            .iter()
            .any(|role| APP_ADMIN_ROLES.iter().any(|a| role.eq_ignore_ascii_case(a))))
    }

    /// Tier 2: dynamic RBAC grant. Authoritative only on `Ok(true)`; a
    /// provider failure is logged and treated as "no". An RBAC outage must
    /// never grant access.
    pub(crate) async fn has_management_grant(&self, organization_id: &str, user_id: &str) -> bool {
        match self
            .rbac
            .check_permission(organization_id, user_id, MANAGEMENT_ACTION, MANAGEMENT_RESOURCE)
            .await
        {
            Ok(granted) => granted,
            Err(err) => {
                tracing::warn!(
                    organization_id,
                    user_id,
                    error = %err,
                    "rbac permission check failed, denying"
                );
                false
            }
        }
    }

    /// Tier 3: org-level membership fallback. Grants only for an active
    /// row with role owner or admin.
    pub(crate) async fn has_managing_membership(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> OrgResult<bool> {
        let member = self.store.get_member(organization_id, user_id).await?;
        Ok(member.is_some_and(|m| {
            m.status() == MemberStatus::Active
                && matches!(m.role(), MemberRole::Owner | MemberRole::Admin)
        }))
    }

    /// Does a member row exist for the user, in any status?
    pub async fn is_member(&self, organization_id: &str, user_id: &str) -> OrgResult<bool> {
        Ok(self.store.get_member(organization_id, user_id).await?.is_some())
    }

    pub async fn is_owner(&self, organization_id: &str, user_id: &str) -> OrgResult<bool> {
        let member = self.store.get_member(organization_id, user_id).await?;
        Ok(member.is_some_and(|m| m.role() == MemberRole::Owner))
    }

    pub async fn is_admin(&self, organization_id: &str, user_id: &str) -> OrgResult<bool> {
        let member = self.store.get_member(organization_id, user_id).await?;
        Ok(member.is_some_and(|m| m.role() == MemberRole::Admin))
    }

    /// The user's role label in the organization, for display and granular
    /// gating. Derived from the member row; an app admin without a row is
    /// shown as admin. That synthesis is a presentation convenience; the
    /// security grant is [`Self::can_manage`], not this label.
    pub async fn effective_role(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> OrgResult<Option<MemberRole>> {
        if let Some(member) = self.store.get_member(organization_id, user_id).await? {
            return Ok(Some(member.role()));
        }
        if self.is_app_admin(user_id).await? {
            return Ok(Some(MemberRole::Admin));
        }
        Ok(None)
    }
}
