//! Caller-facing organization operations.
//!
//! Every mutation re-checks authority through the access engine; the
//! structural protections around ownership fire even when that check
//! passes.

pub mod invitation;
pub mod member;
pub mod org;
pub mod team;
pub mod types;

pub use types::*;

use validator::Validate;

use org_guard_core::store::OrganizationStore;
use org_guard_core::{OrgError, OrgResult};

use crate::context::OrgContext;
use crate::rbac::RbacProvider;

/// Validate a service input, mapping failures into the error taxonomy.
pub(crate) fn check_input(input: &impl Validate) -> OrgResult<()> {
    input
        .validate()
        .map_err(|e| OrgError::validation(e.to_string()))
}

/// Require management rights on the organization.
pub(crate) async fn require_manage<S, R>(
    ctx: &OrgContext<S, R>,
    organization_id: &str,
    user_id: &str,
) -> OrgResult<()>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    if ctx.access.can_manage(organization_id, user_id).await? {
        Ok(())
    } else {
        Err(OrgError::permission_denied(
            "you don't have permission to manage this organization",
        ))
    }
}

/// Require visibility into the organization: membership in any status, or
/// management rights (app admins see everything).
pub(crate) async fn require_view<S, R>(
    ctx: &OrgContext<S, R>,
    organization_id: &str,
    user_id: &str,
) -> OrgResult<()>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    if ctx.access.is_member(organization_id, user_id).await?
        || ctx.access.can_manage(organization_id, user_id).await?
    {
        Ok(())
    } else {
        Err(OrgError::permission_denied(
            "not a member of this organization",
        ))
    }
}
