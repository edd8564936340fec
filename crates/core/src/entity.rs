//! Entity accessor traits for the org-guard store boundary.
//!
//! The engine reads entity fields through these trait methods, so a store
//! implementation may supply its own structs with extra fields and custom
//! names. The built-in types in [`crate::types`] implement all of them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{
    Invitation, InvitationStatus, Member, MemberRole, MemberStatus, Organization, Team, User,
};

/// Read-only view of a platform user.
pub trait UserRecord: Clone + Send + Sync + Serialize + std::fmt::Debug + 'static {
    fn id(&self) -> &str;
    fn email(&self) -> Option<&str>;
    fn name(&self) -> Option<&str>;
    fn created_at(&self) -> DateTime<Utc>;
}

/// Read-only view of an organization.
pub trait OrganizationRecord: Clone + Send + Sync + Serialize + std::fmt::Debug + 'static {
    fn id(&self) -> &str;
    fn app_id(&self) -> &str;
    fn environment_id(&self) -> &str;
    fn name(&self) -> &str;
    fn slug(&self) -> &str;
    fn logo(&self) -> Option<&str>;
    fn created_by(&self) -> &str;
    fn metadata(&self) -> Option<&serde_json::Value>;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
}

/// Read-only view of a member row.
pub trait MemberRecord: Clone + Send + Sync + Serialize + std::fmt::Debug + 'static {
    fn id(&self) -> &str;
    fn organization_id(&self) -> &str;
    fn user_id(&self) -> &str;
    fn role(&self) -> MemberRole;
    fn status(&self) -> MemberStatus;
    fn created_at(&self) -> DateTime<Utc>;
}

/// Read-only view of a team.
pub trait TeamRecord: Clone + Send + Sync + Serialize + std::fmt::Debug + 'static {
    fn id(&self) -> &str;
    fn organization_id(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> Option<&str>;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
}

/// Read-only view of an invitation.
pub trait InvitationRecord: Clone + Send + Sync + Serialize + std::fmt::Debug + 'static {
    fn id(&self) -> &str;
    fn organization_id(&self) -> &str;
    fn email(&self) -> &str;
    fn role(&self) -> MemberRole;
    fn status(&self) -> InvitationStatus;
    fn token(&self) -> &str;
    fn inviter_id(&self) -> &str;
    fn expires_at(&self) -> DateTime<Utc>;
    fn created_at(&self) -> DateTime<Utc>;

    /// Check if the invitation is still pending.
    fn is_pending(&self) -> bool {
        self.status() == InvitationStatus::Pending
    }

    /// Check if the invitation's expiry has passed, regardless of whether
    /// the stored status has been lazily transitioned yet.
    fn is_expired(&self) -> bool {
        self.expires_at() < Utc::now()
    }
}

// ---------------------------------------------------------------------------
// Built-in type impls
// ---------------------------------------------------------------------------

impl UserRecord for User {
    fn id(&self) -> &str {
        &self.id
    }
    fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl OrganizationRecord for Organization {
    fn id(&self) -> &str {
        &self.id
    }
    fn app_id(&self) -> &str {
        &self.app_id
    }
    fn environment_id(&self) -> &str {
        &self.environment_id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn slug(&self) -> &str {
        &self.slug
    }
    fn logo(&self) -> Option<&str> {
        self.logo.as_deref()
    }
    fn created_by(&self) -> &str {
        &self.created_by
    }
    fn metadata(&self) -> Option<&serde_json::Value> {
        self.metadata.as_ref()
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl MemberRecord for Member {
    fn id(&self) -> &str {
        &self.id
    }
    fn organization_id(&self) -> &str {
        &self.organization_id
    }
    fn user_id(&self) -> &str {
        &self.user_id
    }
    fn role(&self) -> MemberRole {
        self.role
    }
    fn status(&self) -> MemberStatus {
        self.status
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl TeamRecord for Team {
    fn id(&self) -> &str {
        &self.id
    }
    fn organization_id(&self) -> &str {
        &self.organization_id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl InvitationRecord for Invitation {
    fn id(&self) -> &str {
        &self.id
    }
    fn organization_id(&self) -> &str {
        &self.organization_id
    }
    fn email(&self) -> &str {
        &self.email
    }
    fn role(&self) -> MemberRole {
        self.role
    }
    fn status(&self) -> InvitationStatus {
        self.status
    }
    fn token(&self) -> &str {
        &self.token
    }
    fn inviter_id(&self) -> &str {
        &self.inviter_id
    }
    fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
