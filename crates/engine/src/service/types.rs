use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use org_guard_core::entity::{MemberRecord, UserRecord};
use org_guard_core::{MemberRole, MemberStatus};

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let well_formed = !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if well_formed {
        Ok(())
    } else {
        let mut err = ValidationError::new("slug");
        err.message = Some("Slug must be lowercase letters, digits, and inner hyphens".into());
        Err(err)
    }
}

// ---------------------------------------------------------------------------
// Validated inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrganizationInput {
    #[serde(rename = "appId")]
    #[validate(length(min = 1, message = "App id is required"))]
    pub app_id: String,
    #[serde(rename = "environmentId")]
    #[validate(length(min = 1, message = "Environment id is required"))]
    pub environment_id: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(
        length(min = 1, max = 100, message = "Slug must be 1-100 characters"),
        custom(function = "validate_slug")
    )]
    pub slug: String,
    pub logo: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateOrganizationInput {
    pub name: Option<String>,
    #[validate(custom(function = "validate_slug_opt"))]
    pub slug: Option<String>,
    pub logo: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

fn validate_slug_opt(slug: &str) -> Result<(), ValidationError> {
    validate_slug(slug)
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddMemberInput {
    #[serde(rename = "organizationId")]
    #[validate(length(min = 1, message = "Organization id is required"))]
    pub organization_id: String,
    #[serde(rename = "userId")]
    #[validate(length(min = 1, message = "User id is required"))]
    pub user_id: String,
    pub role: MemberRole,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTeamInput {
    #[serde(rename = "organizationId")]
    #[validate(length(min = 1, message = "Organization id is required"))]
    pub organization_id: String,
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTeamInput {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InviteMemberInput {
    #[serde(rename = "organizationId")]
    #[validate(length(min = 1, message = "Organization id is required"))]
    pub organization_id: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub role: MemberRole,
}

/// How to pick the member targeted by a removal.
#[derive(Debug, Clone)]
pub enum MemberSelector {
    ById(String),
    ByEmail(String),
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Minimal user info projected into member-facing responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl UserSummary {
    pub fn from_record(user: &impl UserRecord) -> Self {
        Self {
            id: user.id().to_string(),
            email: user.email().map(|s| s.to_string()),
            name: user.name().map(|s| s.to_string()),
        }
    }
}

/// A member row enriched with the user behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberProfile {
    pub id: String,
    #[serde(rename = "organizationId")]
    pub organization_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub role: MemberRole,
    pub status: MemberStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub user: UserSummary,
}

impl MemberProfile {
    pub fn from_member_and_user(member: &impl MemberRecord, user: &impl UserRecord) -> Self {
        Self {
            id: member.id().to_string(),
            organization_id: member.organization_id().to_string(),
            user_id: member.user_id().to_string(),
            role: member.role(),
            status: member.status(),
            created_at: member.created_at(),
            user: UserSummary::from_record(user),
        }
    }
}

/// Result of creating an organization: the row plus the creator membership.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedOrganization<O> {
    pub organization: O,
    pub member: MemberProfile,
}

/// One page of organizations.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationPage<O> {
    pub organizations: Vec<O>,
    pub total: usize,
}

/// One page of enriched members.
#[derive(Debug, Clone, Serialize)]
pub struct MemberPage {
    pub members: Vec<MemberProfile>,
    pub total: usize,
}

/// One page of teams.
#[derive(Debug, Clone, Serialize)]
pub struct TeamPage<T> {
    pub teams: Vec<T>,
    pub total: usize,
}

/// Organization with everything under it.
#[derive(Debug, Clone, Serialize)]
pub struct FullOrganization<O, T, I> {
    #[serde(flatten)]
    pub organization: O,
    pub members: Vec<MemberProfile>,
    pub teams: Vec<T>,
    pub invitations: Vec<I>,
}

/// Invitation with the display context the invitee sees.
#[derive(Debug, Clone, Serialize)]
pub struct InvitationDetails<I> {
    pub invitation: I,
    #[serde(rename = "organizationName")]
    pub organization_name: String,
    #[serde(rename = "organizationSlug")]
    pub organization_slug: String,
    #[serde(rename = "inviterEmail")]
    pub inviter_email: Option<String>,
}

/// Result of a successful acceptance: the consumed invitation and the new
/// membership.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptedInvitation<I> {
    pub invitation: I,
    pub member: MemberProfile,
}
