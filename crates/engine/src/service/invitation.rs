use chrono::{Duration, Utc};

use org_guard_core::entity::{InvitationRecord, OrganizationRecord, UserRecord};
use org_guard_core::store::{
    InvitationOps, MemberOps, OrganizationOps, OrganizationStore, UserOps,
};
use org_guard_core::{
    CreateInvitation, CreateMember, InvitationStatus, ListParams, OrgError, OrgResult,
};

use super::{check_input, require_manage, require_view};
use crate::context::OrgContext;
use crate::rbac::RbacProvider;
use crate::service::types::{
    AcceptedInvitation, InvitationDetails, InviteMemberInput, MemberProfile,
};

pub async fn invite_member<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    input: InviteMemberInput,
) -> OrgResult<S::Invitation>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    check_input(&input)?;
    require_manage(ctx, &input.organization_id, actor.id()).await?;

    if let Some(limit) = ctx.config.max_members_per_organization {
        let count = ctx.store.count_members(&input.organization_id).await?;
        if count >= limit {
            return Err(OrgError::validation(format!(
                "membership limit of {limit} reached"
            )));
        }
    }

    if let Some(limit) = ctx.config.max_pending_invitations {
        let invitations = ctx
            .store
            .list_organization_invitations(&input.organization_id, &ListParams::default())
            .await?;
        let pending = invitations.iter().filter(|i| i.is_pending()).count();
        if pending >= limit {
            return Err(OrgError::validation(format!(
                "pending invitation limit of {limit} reached"
            )));
        }
    }

    if let Some(existing_user) = ctx.store.get_user_by_email(&input.email).await?
        && ctx
            .store
            .get_member(&input.organization_id, existing_user.id())
            .await?
            .is_some()
    {
        return Err(OrgError::conflict(
            "user is already a member of this organization",
        ));
    }

    // Re-issue the open invitation instead of piling up duplicates.
    if let Some(existing) = ctx
        .store
        .get_pending_invitation(&input.organization_id, &input.email)
        .await?
    {
        return Ok(existing);
    }

    let expires_at = Utc::now() + Duration::seconds(ctx.config.invitation_expires_in as i64);

    let invitation = ctx
        .store
        .create_invitation(CreateInvitation::new(
            &input.organization_id,
            &input.email,
            input.role,
            actor.id(),
            expires_at,
        ))
        .await?;

    tracing::info!(
        organization_id = invitation.organization_id(),
        invitation_id = invitation.id(),
        "member invited"
    );

    Ok(invitation)
}

/// Look up an invitation by its token, with the context the invitee sees.
/// The token itself is the credential; no session gate here.
pub async fn get_invitation<S, R>(
    ctx: &OrgContext<S, R>,
    token: &str,
) -> OrgResult<InvitationDetails<S::Invitation>>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    let invitation = ctx
        .store
        .get_invitation_by_token(token)
        .await?
        .ok_or_else(|| OrgError::not_found("invitation not found"))?;

    let organization = ctx
        .store
        .get_organization_by_id(invitation.organization_id())
        .await?
        .ok_or_else(|| OrgError::not_found("organization not found"))?;

    let inviter_email = match ctx.store.get_user_by_id(invitation.inviter_id()).await? {
        Some(inviter) => inviter.email().map(|s| s.to_string()),
        None => None,
    };

    Ok(InvitationDetails {
        invitation,
        organization_name: organization.name().to_string(),
        organization_slug: organization.slug().to_string(),
        inviter_email,
    })
}

pub async fn list_invitations<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    organization_id: &str,
    params: &ListParams,
) -> OrgResult<Vec<S::Invitation>>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    require_view(ctx, organization_id, actor.id()).await?;

    let page = ctx.clamp_page(params);
    ctx.store
        .list_organization_invitations(organization_id, &page)
        .await
}

/// Pending, unexpired invitations addressed to the caller.
pub async fn list_user_invitations<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
) -> OrgResult<Vec<S::Invitation>>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    let email = actor
        .email()
        .ok_or_else(|| OrgError::validation("user has no email"))?;

    ctx.store.list_invitations_for_email(email).await
}

/// Accept an invitation by token, consuming it into a member row.
///
/// Racing acceptances of the same token are resolved by the store's
/// membership uniqueness constraint: exactly one `create_member` wins.
pub async fn accept_invitation<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    token: &str,
) -> OrgResult<AcceptedInvitation<S::Invitation>>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    let invitation = ctx
        .store
        .get_invitation_by_token(token)
        .await?
        .ok_or_else(|| OrgError::not_found("invitation not found"))?;

    let email = actor
        .email()
        .ok_or_else(|| OrgError::validation("user has no email"))?;

    if !invitation.email().eq_ignore_ascii_case(email) {
        return Err(OrgError::permission_denied("this invitation is not for you"));
    }

    if !invitation.is_pending() {
        return Err(OrgError::conflict(format!(
            "invitation is {}",
            invitation.status()
        )));
    }

    // Expiry wins over the stored status, which may not have been lazily
    // transitioned yet.
    if invitation.is_expired() {
        ctx.store
            .update_invitation_status(invitation.id(), InvitationStatus::Expired)
            .await?;
        return Err(OrgError::conflict("invitation has expired"));
    }

    if let Some(limit) = ctx.config.max_members_per_organization {
        let count = ctx.store.count_members(invitation.organization_id()).await?;
        if count >= limit {
            return Err(OrgError::validation(format!(
                "membership limit of {limit} reached"
            )));
        }
    }

    if ctx
        .store
        .get_member(invitation.organization_id(), actor.id())
        .await?
        .is_some()
    {
        // Consume the invitation anyway; the membership already exists.
        ctx.store
            .update_invitation_status(invitation.id(), InvitationStatus::Accepted)
            .await?;
        return Err(OrgError::conflict(
            "already a member of this organization",
        ));
    }

    let member = ctx
        .store
        .create_member(CreateMember::new(
            invitation.organization_id(),
            actor.id(),
            invitation.role(),
        ))
        .await?;

    let accepted = ctx
        .store
        .update_invitation_status(invitation.id(), InvitationStatus::Accepted)
        .await?;

    tracing::info!(
        organization_id = accepted.organization_id(),
        invitation_id = accepted.id(),
        "invitation accepted"
    );

    Ok(AcceptedInvitation {
        invitation: accepted,
        member: MemberProfile::from_member_and_user(&member, actor),
    })
}

pub async fn decline_invitation<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    token: &str,
) -> OrgResult<S::Invitation>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    let invitation = ctx
        .store
        .get_invitation_by_token(token)
        .await?
        .ok_or_else(|| OrgError::not_found("invitation not found"))?;

    let email = actor
        .email()
        .ok_or_else(|| OrgError::validation("user has no email"))?;

    if !invitation.email().eq_ignore_ascii_case(email) {
        return Err(OrgError::permission_denied("this invitation is not for you"));
    }

    if !invitation.is_pending() {
        return Err(OrgError::conflict(format!(
            "invitation is already {}",
            invitation.status()
        )));
    }

    ctx.store
        .update_invitation_status(invitation.id(), InvitationStatus::Declined)
        .await
}

pub async fn cancel_invitation<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    invitation_id: &str,
) -> OrgResult<S::Invitation>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    let invitation = ctx
        .store
        .get_invitation_by_id(invitation_id)
        .await?
        .ok_or_else(|| OrgError::not_found("invitation not found"))?;

    require_manage(ctx, invitation.organization_id(), actor.id()).await?;

    if !invitation.is_pending() {
        return Err(OrgError::conflict(format!(
            "invitation is already {}",
            invitation.status()
        )));
    }

    ctx.store
        .update_invitation_status(invitation.id(), InvitationStatus::Cancelled)
        .await
}

/// Lazily transition stale pending invitations to expired. Returns how
/// many rows were swept.
pub async fn expire_invitations<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    organization_id: &str,
) -> OrgResult<usize>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    require_manage(ctx, organization_id, actor.id()).await?;
    ctx.store.expire_pending_invitations(organization_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::org::create_organization;
    use crate::test_util::{context, new_org_input, user};
    use org_guard_core::MemberRole;

    async fn invite(
        ctx: &crate::test_util::TestContext,
        actor: &org_guard_core::User,
        org_id: &str,
        email: &str,
    ) -> org_guard_core::Invitation {
        invite_member(
            ctx,
            actor,
            InviteMemberInput {
                organization_id: org_id.to_string(),
                email: email.to_string(),
                role: MemberRole::Member,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn invitation_flow_creates_exactly_one_member() {
        let ctx = context();
        let alice = user(&ctx, "alice@example.com").await;
        let org = create_organization(&ctx, &alice, new_org_input("acme"))
            .await
            .unwrap()
            .organization;
        let bob = user(&ctx, "bob@example.com").await;

        let invitation = invite(&ctx, &alice, &org.id, "bob@example.com").await;
        assert_eq!(invitation.status, InvitationStatus::Pending);

        let accepted = accept_invitation(&ctx, &bob, &invitation.token)
            .await
            .unwrap();
        assert_eq!(accepted.invitation.status, InvitationStatus::Accepted);
        assert_eq!(accepted.member.user_id, bob.id);

        // Second acceptance of the same token must not mint another row.
        let again = accept_invitation(&ctx, &bob, &invitation.token).await;
        assert!(matches!(again, Err(OrgError::Conflict(_))));
        assert_eq!(ctx.store.count_members(&org.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn acceptance_is_bound_to_the_invited_email() {
        let ctx = context();
        let alice = user(&ctx, "alice@example.com").await;
        let org = create_organization(&ctx, &alice, new_org_input("acme"))
            .await
            .unwrap()
            .organization;
        let invitation = invite(&ctx, &alice, &org.id, "bob@example.com").await;

        let mallory = user(&ctx, "mallory@example.com").await;
        let denied = accept_invitation(&ctx, &mallory, &invitation.token).await;
        assert!(matches!(denied, Err(OrgError::PermissionDenied(_))));

        // Case differences in the email do not block the real invitee.
        let bob = user(&ctx, "Bob@Example.com").await;
        accept_invitation(&ctx, &bob, &invitation.token)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn stale_pending_invitation_is_expired_on_touch() {
        let ctx = context();
        let alice = user(&ctx, "alice@example.com").await;
        let org = create_organization(&ctx, &alice, new_org_input("acme"))
            .await
            .unwrap()
            .organization;
        let bob = user(&ctx, "bob@example.com").await;

        // Plant an already-expired row whose status is still pending.
        let stale = ctx
            .store
            .create_invitation(CreateInvitation::new(
                &org.id,
                "bob@example.com",
                MemberRole::Member,
                &alice.id,
                Utc::now() - Duration::hours(1),
            ))
            .await
            .unwrap();
        assert_eq!(stale.status, InvitationStatus::Pending);

        let refused = accept_invitation(&ctx, &bob, &stale.token).await;
        assert!(matches!(refused, Err(OrgError::Conflict(_))));

        let after = ctx
            .store
            .get_invitation_by_id(&stale.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.status, InvitationStatus::Expired);
        assert_eq!(ctx.store.count_members(&org.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn inviting_is_idempotent_per_pending_email() {
        let ctx = context();
        let alice = user(&ctx, "alice@example.com").await;
        let org = create_organization(&ctx, &alice, new_org_input("acme"))
            .await
            .unwrap()
            .organization;

        let first = invite(&ctx, &alice, &org.id, "bob@example.com").await;
        let second = invite(&ctx, &alice, &org.id, "bob@example.com").await;
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn existing_members_are_not_invitable() {
        let ctx = context();
        let alice = user(&ctx, "alice@example.com").await;
        let org = create_organization(&ctx, &alice, new_org_input("acme"))
            .await
            .unwrap()
            .organization;

        let conflict = invite_member(
            &ctx,
            &alice,
            InviteMemberInput {
                organization_id: org.id.clone(),
                email: "alice@example.com".to_string(),
                role: MemberRole::Member,
            },
        )
        .await;
        assert!(matches!(conflict, Err(OrgError::Conflict(_))));
    }

    #[tokio::test]
    async fn decline_and_cancel_are_terminal_transitions() {
        let ctx = context();
        let alice = user(&ctx, "alice@example.com").await;
        let org = create_organization(&ctx, &alice, new_org_input("acme"))
            .await
            .unwrap()
            .organization;
        let bob = user(&ctx, "bob@example.com").await;

        let invitation = invite(&ctx, &alice, &org.id, "bob@example.com").await;
        let declined = decline_invitation(&ctx, &bob, &invitation.token)
            .await
            .unwrap();
        assert_eq!(declined.status, InvitationStatus::Declined);

        // No transition leaves a terminal state.
        let accept_after = accept_invitation(&ctx, &bob, &invitation.token).await;
        assert!(matches!(accept_after, Err(OrgError::Conflict(_))));
        let cancel_after = cancel_invitation(&ctx, &alice, &invitation.id).await;
        assert!(matches!(cancel_after, Err(OrgError::Conflict(_))));

        // A fresh invitation can be cancelled by a manager, but not by the
        // invitee.
        let invitation = invite(&ctx, &alice, &org.id, "carol@example.com").await;
        let carol = user(&ctx, "carol@example.com").await;
        let denied = cancel_invitation(&ctx, &carol, &invitation.id).await;
        assert!(matches!(denied, Err(OrgError::PermissionDenied(_))));
        let cancelled = cancel_invitation(&ctx, &alice, &invitation.id)
            .await
            .unwrap();
        assert_eq!(cancelled.status, InvitationStatus::Cancelled);
    }

    #[tokio::test]
    async fn invitee_sees_organization_context_by_token() {
        let ctx = context();
        let alice = user(&ctx, "alice@example.com").await;
        let org = create_organization(&ctx, &alice, new_org_input("acme"))
            .await
            .unwrap()
            .organization;
        let invitation = invite(&ctx, &alice, &org.id, "bob@example.com").await;

        let details = get_invitation(&ctx, &invitation.token).await.unwrap();
        assert_eq!(details.organization_slug, "acme");
        assert_eq!(details.inviter_email.as_deref(), Some("alice@example.com"));

        let missing = get_invitation(&ctx, "inv_nonexistent").await;
        assert!(matches!(missing, Err(OrgError::NotFound(_))));
    }

    #[tokio::test]
    async fn user_inbox_lists_only_live_invitations() {
        let ctx = context();
        let alice = user(&ctx, "alice@example.com").await;
        let org = create_organization(&ctx, &alice, new_org_input("acme"))
            .await
            .unwrap()
            .organization;
        let bob = user(&ctx, "bob@example.com").await;

        invite(&ctx, &alice, &org.id, "bob@example.com").await;
        // A stale one for the same user, different org.
        let other = create_organization(&ctx, &alice, new_org_input("other"))
            .await
            .unwrap()
            .organization;
        ctx.store
            .create_invitation(CreateInvitation::new(
                &other.id,
                "bob@example.com",
                MemberRole::Member,
                &alice.id,
                Utc::now() - Duration::hours(1),
            ))
            .await
            .unwrap();

        let inbox = list_user_invitations(&ctx, &bob).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].organization_id, org.id);
    }

    #[tokio::test]
    async fn sweep_reports_expired_rows() {
        let ctx = context();
        let alice = user(&ctx, "alice@example.com").await;
        let org = create_organization(&ctx, &alice, new_org_input("acme"))
            .await
            .unwrap()
            .organization;

        ctx.store
            .create_invitation(CreateInvitation::new(
                &org.id,
                "bob@example.com",
                MemberRole::Member,
                &alice.id,
                Utc::now() - Duration::hours(1),
            ))
            .await
            .unwrap();

        assert_eq!(expire_invitations(&ctx, &alice, &org.id).await.unwrap(), 1);
        assert_eq!(expire_invitations(&ctx, &alice, &org.id).await.unwrap(), 0);
    }
}
