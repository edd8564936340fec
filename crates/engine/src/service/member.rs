use org_guard_core::entity::{MemberRecord, UserRecord};
use org_guard_core::store::{MemberOps, OrganizationStore, UserOps};
use org_guard_core::{
    CreateMember, ListParams, MemberRole, MemberStatus, OrgError, OrgResult,
};

use super::{check_input, require_manage, require_view};
use crate::context::OrgContext;
use crate::rbac::RbacProvider;
use crate::service::types::{AddMemberInput, MemberPage, MemberProfile, MemberSelector};

/// Require that the acting user's own membership row carries the owner
/// role. Ownership is structurally protected: neither app-admin status nor
/// an RBAC grant substitutes for it.
async fn require_owner_actor<S, R>(
    ctx: &OrgContext<S, R>,
    organization_id: &str,
    user_id: &str,
    denial: &str,
) -> OrgResult<()>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    let actor_member = ctx.store.get_member(organization_id, user_id).await?;
    if actor_member.is_some_and(|m| m.role() == MemberRole::Owner) {
        Ok(())
    } else {
        Err(OrgError::permission_denied(denial))
    }
}

async fn require_not_last_owner<S, R>(
    ctx: &OrgContext<S, R>,
    organization_id: &str,
    refusal: &str,
) -> OrgResult<()>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    if ctx.store.count_owners(organization_id).await? <= 1 {
        Err(OrgError::conflict(refusal))
    } else {
        Ok(())
    }
}

pub async fn add_member<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    input: AddMemberInput,
) -> OrgResult<MemberProfile>
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

    let user = ctx
        .store
        .get_user_by_id(&input.user_id)
        .await?
        .ok_or_else(|| OrgError::not_found("user not found"))?;

    let member = ctx
        .store
        .create_member(CreateMember::new(
            &input.organization_id,
            &input.user_id,
            input.role,
        ))
        .await?;

    Ok(MemberProfile::from_member_and_user(&member, &user))
}

async fn resolve_target<S, R>(
    ctx: &OrgContext<S, R>,
    organization_id: &str,
    selector: &MemberSelector,
) -> OrgResult<S::Member>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    let member = match selector {
        MemberSelector::ById(member_id) => ctx
            .store
            .get_member_by_id(member_id)
            .await?
            .ok_or_else(|| OrgError::not_found("member not found"))?,
        MemberSelector::ByEmail(email) => {
            let user = ctx
                .store
                .get_user_by_email(email)
                .await?
                .ok_or_else(|| OrgError::not_found("user not found"))?;
            ctx.store
                .get_member(organization_id, user.id())
                .await?
                .ok_or_else(|| OrgError::not_found("member not found"))?
        }
    };

    if member.organization_id() != organization_id {
        return Err(OrgError::validation("member not in this organization"));
    }

    Ok(member)
}

/// Remove a member.
///
/// Self-removal (leaving) needs no management rights. An owner row may only
/// be removed by another owner, and never when it is the last one.
pub async fn remove_member<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    organization_id: &str,
    selector: MemberSelector,
) -> OrgResult<S::Member>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    let target = resolve_target(ctx, organization_id, &selector).await?;

    let is_self_removal = target.user_id() == actor.id();
    if !is_self_removal {
        require_manage(ctx, organization_id, actor.id()).await?;
    }

    if target.role() == MemberRole::Owner {
        require_owner_actor(
            ctx,
            organization_id,
            actor.id(),
            "only an owner can remove an owner",
        )
        .await?;
        require_not_last_owner(
            ctx,
            organization_id,
            "cannot remove the last owner from an organization",
        )
        .await?;
    }

    ctx.store.delete_member(target.id()).await?;

    tracing::info!(
        organization_id,
        member_id = target.id(),
        "member removed"
    );

    Ok(target)
}

pub async fn update_member_role<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    organization_id: &str,
    member_id: &str,
    role: MemberRole,
) -> OrgResult<S::Member>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    require_manage(ctx, organization_id, actor.id()).await?;

    let target = resolve_target(ctx, organization_id, &MemberSelector::ById(member_id.into()))
        .await?;

    // Demoting an owner is structurally restricted.
    if target.role() == MemberRole::Owner && role != MemberRole::Owner {
        require_owner_actor(
            ctx,
            organization_id,
            actor.id(),
            "only an owner can demote an owner",
        )
        .await?;
        require_not_last_owner(
            ctx,
            organization_id,
            "cannot demote the last owner, transfer ownership first",
        )
        .await?;
    }

    ctx.store.update_member_role(member_id, role).await
}

pub async fn update_member_status<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    organization_id: &str,
    member_id: &str,
    status: MemberStatus,
) -> OrgResult<S::Member>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    require_manage(ctx, organization_id, actor.id()).await?;

    let target = resolve_target(ctx, organization_id, &MemberSelector::ById(member_id.into()))
        .await?;

    if target.role() == MemberRole::Owner && status != MemberStatus::Active {
        require_owner_actor(
            ctx,
            organization_id,
            actor.id(),
            "only an owner can suspend an owner",
        )
        .await?;
    }

    ctx.store.update_member_status(member_id, status).await
}

pub async fn list_members<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    organization_id: &str,
    params: &ListParams,
) -> OrgResult<MemberPage>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    require_view(ctx, organization_id, actor.id()).await?;

    let page = ctx.clamp_page(params);
    let members_raw = ctx.store.list_members(organization_id, &page).await?;
    let total = ctx.store.count_members(organization_id).await?;

    let mut members = Vec::with_capacity(members_raw.len());
    for member in &members_raw {
        if let Some(user) = ctx.store.get_user_by_id(member.user_id()).await? {
            members.push(MemberProfile::from_member_and_user(member, &user));
        }
    }

    Ok(MemberPage { members, total })
}

pub async fn get_member_profile<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    organization_id: &str,
    user_id: &str,
) -> OrgResult<MemberProfile>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    if user_id != actor.id() {
        require_view(ctx, organization_id, actor.id()).await?;
    }

    let member = ctx
        .store
        .get_member(organization_id, user_id)
        .await?
        .ok_or_else(|| OrgError::not_found("member not found"))?;
    let user = ctx
        .store
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| OrgError::not_found("user not found"))?;

    Ok(MemberProfile::from_member_and_user(&member, &user))
}
