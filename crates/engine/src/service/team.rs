use org_guard_core::entity::{TeamRecord, UserRecord};
use org_guard_core::store::{OrganizationOps, OrganizationStore, TeamOps};
use org_guard_core::{CreateTeam, ListParams, OrgError, OrgResult, UpdateTeam};

use super::{check_input, require_manage, require_view};
use crate::context::OrgContext;
use crate::rbac::RbacProvider;
use crate::service::types::{CreateTeamInput, TeamPage, UpdateTeamInput};

pub async fn create_team<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    input: CreateTeamInput,
) -> OrgResult<S::Team>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    check_input(&input)?;

    ctx.store
        .get_organization_by_id(&input.organization_id)
        .await?
        .ok_or_else(|| OrgError::not_found("organization not found"))?;

    require_manage(ctx, &input.organization_id, actor.id()).await?;

    if let Some(limit) = ctx.config.max_teams_per_organization {
        let count = ctx.store.count_teams(&input.organization_id).await?;
        if count >= limit {
            return Err(OrgError::validation(format!(
                "team limit of {limit} reached"
            )));
        }
    }

    let team = CreateTeam {
        organization_id: input.organization_id,
        name: input.name,
        description: input.description,
    };

    ctx.store.create_team(team).await
}

pub async fn update_team<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    team_id: &str,
    input: UpdateTeamInput,
) -> OrgResult<S::Team>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    check_input(&input)?;

    let team = ctx
        .store
        .get_team_by_id(team_id)
        .await?
        .ok_or_else(|| OrgError::not_found("team not found"))?;

    require_manage(ctx, team.organization_id(), actor.id()).await?;

    let update = UpdateTeam {
        name: input.name,
        description: input.description,
    };

    ctx.store.update_team(team_id, update).await
}

pub async fn delete_team<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    team_id: &str,
) -> OrgResult<()>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    let team = ctx
        .store
        .get_team_by_id(team_id)
        .await?
        .ok_or_else(|| OrgError::not_found("team not found"))?;

    require_manage(ctx, team.organization_id(), actor.id()).await?;

    ctx.store.delete_team(team_id).await
}

pub async fn get_team<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    team_id: &str,
) -> OrgResult<S::Team>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    let team = ctx
        .store
        .get_team_by_id(team_id)
        .await?
        .ok_or_else(|| OrgError::not_found("team not found"))?;

    require_view(ctx, team.organization_id(), actor.id()).await?;

    Ok(team)
}

pub async fn list_teams<S, R>(
    ctx: &OrgContext<S, R>,
    actor: &S::User,
    organization_id: &str,
    params: &ListParams,
) -> OrgResult<TeamPage<S::Team>>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    require_view(ctx, organization_id, actor.id()).await?;

    let page = ctx.clamp_page(params);
    let teams = ctx.store.list_teams(organization_id, &page).await?;
    let total = ctx.store.count_teams(organization_id).await?;

    Ok(TeamPage { teams, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::org::create_organization;
    use crate::test_util::{add_as, context, context_with, new_org_input, user};
    use org_guard_core::MemberRole;

    #[tokio::test]
    async fn team_crud_follows_management_rights() {
        let ctx = context();
        let alice = user(&ctx, "alice@example.com").await;
        let org = create_organization(&ctx, &alice, new_org_input("acme"))
            .await
            .unwrap()
            .organization;

        let team = create_team(
            &ctx,
            &alice,
            CreateTeamInput {
                organization_id: org.id.clone(),
                name: "platform".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();

        let bob = user(&ctx, "bob@example.com").await;
        add_as(&ctx, &org.id, &bob, MemberRole::Member).await;

        // A plain member sees teams but cannot change them.
        let seen = get_team(&ctx, &bob, &team.id).await.unwrap();
        assert_eq!(seen.name, "platform");
        let denied = update_team(
            &ctx,
            &bob,
            &team.id,
            UpdateTeamInput {
                name: Some("renamed".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(denied, Err(OrgError::PermissionDenied(_))));

        let renamed = update_team(
            &ctx,
            &alice,
            &team.id,
            UpdateTeamInput {
                name: Some("infra".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.name, "infra");

        delete_team(&ctx, &alice, &team.id).await.unwrap();
        let gone = get_team(&ctx, &alice, &team.id).await;
        assert!(matches!(gone, Err(OrgError::NotFound(_))));
    }

    #[tokio::test]
    async fn team_limit_is_enforced() {
        let ctx = context_with(|c| c.max_teams_per_organization(1));
        let alice = user(&ctx, "alice@example.com").await;
        let org = create_organization(&ctx, &alice, new_org_input("acme"))
            .await
            .unwrap()
            .organization;

        create_team(
            &ctx,
            &alice,
            CreateTeamInput {
                organization_id: org.id.clone(),
                name: "one".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();

        let second = create_team(
            &ctx,
            &alice,
            CreateTeamInput {
                organization_id: org.id.clone(),
                name: "two".to_string(),
                description: None,
            },
        )
        .await;
        assert!(matches!(second, Err(OrgError::Validation(_))));
    }

    #[tokio::test]
    async fn teams_for_unknown_organizations_are_rejected() {
        let ctx = context();
        let alice = user(&ctx, "alice@example.com").await;

        let missing = create_team(
            &ctx,
            &alice,
            CreateTeamInput {
                organization_id: "nope".to_string(),
                name: "ghost".to_string(),
                description: None,
            },
        )
        .await;
        assert!(matches!(missing, Err(OrgError::NotFound(_))));
    }

    #[tokio::test]
    async fn listing_teams_pages_and_counts() {
        let ctx = context();
        let alice = user(&ctx, "alice@example.com").await;
        let org = create_organization(&ctx, &alice, new_org_input("acme"))
            .await
            .unwrap()
            .organization;

        for name in ["a", "b", "c"] {
            create_team(
                &ctx,
                &alice,
                CreateTeamInput {
                    organization_id: org.id.clone(),
                    name: name.to_string(),
                    description: Some("squad".to_string()),
                },
            )
            .await
            .unwrap();
        }

        let page = list_teams(&ctx, &alice, &org.id, &ListParams::new(0, 2))
            .await
            .unwrap();
        assert_eq!(page.teams.len(), 2);
        assert_eq!(page.total, 3);
    }
}
