use org_guard_core::entity::{MemberRecord, OrganizationRecord, UserRecord};
use org_guard_core::store::{
    InvitationOps, MemberOps, OrganizationOps, OrganizationStore, TeamOps, UserOps,
};
use org_guard_core::{
    CreateMember, CreateOrganization, ListParams, MemberRole, OrgError, OrgResult,
    UpdateOrganization,
};

use super::{check_input, require_manage, require_view};
use crate::context::OrgContext;
use crate::rbac::RbacProvider;
use crate::service::types::{
    CreateOrganizationInput, CreatedOrganization, FullOrganization, MemberProfile,
    OrganizationPage, UpdateOrganizationInput,
};

pub async fn create_organization<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    input: CreateOrganizationInput,
) -> OrgResult<CreatedOrganization<S::Organization>>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    check_input(&input)?;

    if !ctx.config.allow_user_to_create_organization {
        return Err(OrgError::permission_denied(
            "organization creation is not allowed",
        ));
    }

    if let Some(limit) = ctx.config.max_organizations_per_user {
        let user_orgs = ctx.store.list_user_organizations(actor.id()).await?;
        if user_orgs.len() >= limit {
            return Err(OrgError::validation(format!(
                "organization limit of {limit} reached"
            )));
        }
    }

    if ctx
        .store
        .get_organization_by_slug(&input.app_id, &input.environment_id, &input.slug)
        .await?
        .is_some()
    {
        return Err(OrgError::conflict("slug is already taken"));
    }

    let org_data = CreateOrganization {
        id: None,
        app_id: input.app_id,
        environment_id: input.environment_id,
        name: input.name,
        slug: input.slug,
        logo: input.logo,
        created_by: actor.id().to_string(),
        metadata: input.metadata,
    };

    let organization = ctx.store.create_organization(org_data).await?;

    let member = ctx
        .store
        .create_member(CreateMember::new(
            organization.id(),
            actor.id(),
            ctx.config.creator_role,
        ))
        .await?;

    tracing::info!(
        organization_id = organization.id(),
        slug = organization.slug(),
        "organization created"
    );

    Ok(CreatedOrganization {
        organization,
        member: MemberProfile::from_member_and_user(&member, actor),
    })
}

pub async fn update_organization<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    organization_id: &str,
    input: UpdateOrganizationInput,
) -> OrgResult<S::Organization>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    check_input(&input)?;
    require_manage(ctx, organization_id, actor.id()).await?;

    let organization = ctx
        .store
        .get_organization_by_id(organization_id)
        .await?
        .ok_or_else(|| OrgError::not_found("organization not found"))?;

    if let Some(new_slug) = &input.slug
        && let Some(existing) = ctx
            .store
            .get_organization_by_slug(
                organization.app_id(),
                organization.environment_id(),
                new_slug,
            )
            .await?
        && existing.id() != organization_id
    {
        return Err(OrgError::conflict("slug is already taken"));
    }

    let update = UpdateOrganization {
        name: input.name,
        slug: input.slug,
        logo: input.logo,
        metadata: input.metadata,
    };

    ctx.store.update_organization(organization_id, update).await
}

/// Delete an organization.
///
/// The strictest gate in the subsystem: only a member whose own row carries
/// the owner role qualifies. This is not `can_manage`; app admins and RBAC
/// grantees are refused here.
pub async fn delete_organization<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    organization_id: &str,
) -> OrgResult<()>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    if ctx.config.disable_organization_deletion {
        return Err(OrgError::permission_denied(
            "organization deletion is disabled",
        ));
    }

    let member = ctx
        .store
        .get_member(organization_id, actor.id())
        .await?
        .ok_or_else(|| OrgError::permission_denied("not a member of this organization"))?;

    if member.role() != MemberRole::Owner {
        return Err(OrgError::permission_denied(
            "only an organization owner can delete an organization",
        ));
    }

    ctx.store.delete_organization(organization_id).await?;

    tracing::info!(organization_id, "organization deleted");

    Ok(())
}

pub async fn get_full_organization<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    organization_id: &str,
) -> OrgResult<FullOrganization<S::Organization, S::Team, S::Invitation>>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    require_view(ctx, organization_id, actor.id()).await?;

    let organization = ctx
        .store
        .get_organization_by_id(organization_id)
        .await?
        .ok_or_else(|| OrgError::not_found("organization not found"))?;

    let all = ListParams::default();
    let members_raw = ctx.store.list_members(organization_id, &all).await?;
    let mut members = Vec::with_capacity(members_raw.len());
    for member in &members_raw {
        if let Some(user) = ctx.store.get_user_by_id(member.user_id()).await? {
            members.push(MemberProfile::from_member_and_user(member, &user));
        }
    }

    let teams = ctx.store.list_teams(organization_id, &all).await?;
    let invitations = ctx
        .store
        .list_organization_invitations(organization_id, &all)
        .await?;

    Ok(FullOrganization {
        organization,
        members,
        teams,
        invitations,
    })
}

/// Paginated listing across a whole `(app, environment)` scope. This is a
/// platform surface, so it is gated on the app-admin role rather than any
/// single organization's membership.
pub async fn list_organizations<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    app_id: &str,
    environment_id: &str,
    params: &ListParams,
) -> OrgResult<OrganizationPage<S::Organization>>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    if !ctx.access.is_app_admin(actor.id()).await? {
        return Err(OrgError::permission_denied(
            "platform administrator role required",
        ));
    }

    let page = ctx.clamp_page(params);
    let organizations = ctx
        .store
        .list_organizations(app_id, environment_id, &page)
        .await?;
    let total = ctx.store.count_organizations(app_id, environment_id).await?;

    Ok(OrganizationPage {
        organizations,
        total,
    })
}

pub async fn list_user_organizations<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
) -> OrgResult<Vec<S::Organization>>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    ctx.store.list_user_organizations(actor.id()).await
}

pub async fn is_slug_available<S, R>(
    ctx: &OrgContext<S, R>,
    app_id: &str,
    environment_id: &str,
    slug: &str,
) -> OrgResult<bool>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    Ok(ctx
        .store
        .get_organization_by_slug(app_id, environment_id, slug)
        .await?
        .is_none())
}
