use async_trait::async_trait;

use crate::entity::{
    InvitationRecord, MemberRecord, OrganizationRecord, TeamRecord, UserRecord,
};
use crate::error::OrgResult;
use crate::types::{
    CreateInvitation, CreateMember, CreateOrganization, CreateTeam, CreateUser, InvitationStatus,
    ListParams, MemberRole, MemberStatus, UpdateOrganization, UpdateTeam,
};

/// User persistence operations.
#[async_trait]
pub trait UserOps: Send + Sync + 'static {
    type User: UserRecord;

    async fn create_user(&self, user: CreateUser) -> OrgResult<Self::User>;
    async fn get_user_by_id(&self, id: &str) -> OrgResult<Option<Self::User>>;
    async fn get_user_by_email(&self, email: &str) -> OrgResult<Option<Self::User>>;
    /// App-level role names held by the user (e.g. `"admin"`), independent
    /// of any organization membership.
    async fn list_user_app_roles(&self, user_id: &str) -> OrgResult<Vec<String>>;
    async fn set_user_app_roles(&self, user_id: &str, roles: Vec<String>) -> OrgResult<()>;
}

/// Organization persistence operations.
///
/// Lookups and listings are keyed by `(app_id, environment_id)`; slugs are
/// unique only within that scope.
#[async_trait]
pub trait OrganizationOps: Send + Sync + 'static {
    type Organization: OrganizationRecord;

    async fn create_organization(&self, org: CreateOrganization)
    -> OrgResult<Self::Organization>;
    async fn get_organization_by_id(&self, id: &str) -> OrgResult<Option<Self::Organization>>;
    async fn get_organization_by_slug(
        &self,
        app_id: &str,
        environment_id: &str,
        slug: &str,
    ) -> OrgResult<Option<Self::Organization>>;
    async fn update_organization(
        &self,
        id: &str,
        update: UpdateOrganization,
    ) -> OrgResult<Self::Organization>;
    /// Deletes the organization and everything under it (members, teams,
    /// invitations).
    async fn delete_organization(&self, id: &str) -> OrgResult<()>;
    async fn list_organizations(
        &self,
        app_id: &str,
        environment_id: &str,
        params: &ListParams,
    ) -> OrgResult<Vec<Self::Organization>>;
    async fn count_organizations(&self, app_id: &str, environment_id: &str) -> OrgResult<usize>;
    async fn list_user_organizations(&self, user_id: &str)
    -> OrgResult<Vec<Self::Organization>>;
}

/// Organization member persistence operations.
#[async_trait]
pub trait MemberOps: Send + Sync + 'static {
    type Member: MemberRecord;

    /// Fails with `Conflict` if a row for `(organization_id, user_id)`
    /// already exists. This constraint is what collapses racing invitation
    /// acceptances into a single membership.
    async fn create_member(&self, member: CreateMember) -> OrgResult<Self::Member>;
    /// `Ok(None)` is the valid non-member state, not a failure.
    async fn get_member(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> OrgResult<Option<Self::Member>>;
    async fn get_member_by_id(&self, id: &str) -> OrgResult<Option<Self::Member>>;
    async fn update_member_role(&self, member_id: &str, role: MemberRole)
    -> OrgResult<Self::Member>;
    async fn update_member_status(
        &self,
        member_id: &str,
        status: MemberStatus,
    ) -> OrgResult<Self::Member>;
    async fn delete_member(&self, member_id: &str) -> OrgResult<()>;
    async fn list_members(
        &self,
        organization_id: &str,
        params: &ListParams,
    ) -> OrgResult<Vec<Self::Member>>;
    async fn count_members(&self, organization_id: &str) -> OrgResult<usize>;
    async fn count_owners(&self, organization_id: &str) -> OrgResult<usize>;
}

/// Team persistence operations.
#[async_trait]
pub trait TeamOps: Send + Sync + 'static {
    type Team: TeamRecord;

    async fn create_team(&self, team: CreateTeam) -> OrgResult<Self::Team>;
    async fn get_team_by_id(&self, id: &str) -> OrgResult<Option<Self::Team>>;
    async fn update_team(&self, id: &str, update: UpdateTeam) -> OrgResult<Self::Team>;
    async fn delete_team(&self, id: &str) -> OrgResult<()>;
    async fn list_teams(
        &self,
        organization_id: &str,
        params: &ListParams,
    ) -> OrgResult<Vec<Self::Team>>;
    async fn count_teams(&self, organization_id: &str) -> OrgResult<usize>;
}

/// Invitation persistence operations.
#[async_trait]
pub trait InvitationOps: Send + Sync + 'static {
    type Invitation: InvitationRecord;

    /// The store assigns the id and the lookup token.
    async fn create_invitation(
        &self,
        invitation: CreateInvitation,
    ) -> OrgResult<Self::Invitation>;
    async fn get_invitation_by_id(&self, id: &str) -> OrgResult<Option<Self::Invitation>>;
    async fn get_invitation_by_token(&self, token: &str)
    -> OrgResult<Option<Self::Invitation>>;
    async fn get_pending_invitation(
        &self,
        organization_id: &str,
        email: &str,
    ) -> OrgResult<Option<Self::Invitation>>;
    async fn update_invitation_status(
        &self,
        id: &str,
        status: InvitationStatus,
    ) -> OrgResult<Self::Invitation>;
    async fn list_organization_invitations(
        &self,
        organization_id: &str,
        params: &ListParams,
    ) -> OrgResult<Vec<Self::Invitation>>;
    /// Pending, unexpired invitations addressed to `email`.
    async fn list_invitations_for_email(&self, email: &str)
    -> OrgResult<Vec<Self::Invitation>>;
    /// Lazily transition pending-but-expired invitations to `Expired`.
    /// Returns how many rows were transitioned.
    async fn expire_pending_invitations(&self, organization_id: &str) -> OrgResult<usize>;
}

/// The full store collaborator consumed by the access engine and the
/// organization services.
pub trait OrganizationStore:
    UserOps + OrganizationOps + MemberOps + TeamOps + InvitationOps
{
}

impl<T> OrganizationStore for T where
    T: UserOps + OrganizationOps + MemberOps + TeamOps + InvitationOps
{
}
