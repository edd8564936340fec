use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::entity::{
    InvitationRecord, MemberRecord, OrganizationRecord, TeamRecord, UserRecord,
};
use crate::error::{OrgError, OrgResult};
use crate::types::{
    CreateInvitation, CreateMember, CreateOrganization, CreateTeam, CreateUser, Invitation,
    InvitationStatus, ListParams, Member, MemberRole, MemberStatus, Organization, Team,
    UpdateOrganization, UpdateTeam, User,
};

use super::{InvitationOps, MemberOps, OrganizationOps, TeamOps, UserOps};

// ─── Memory entity traits ──────────────────────────────────────────────
//
// These traits extend the read-only record traits with construction and
// mutation methods needed by `MemoryOrganizationStore`. Implement them on
// custom entity types to use those with the in-memory store.

/// Construction for user entities stored in memory.
pub trait MemoryUser: UserRecord {
    fn from_create(id: String, create: &CreateUser, now: DateTime<Utc>) -> Self;
}

/// Construction and mutation for organization entities stored in memory.
pub trait MemoryOrganization: OrganizationRecord {
    fn from_create(id: String, create: &CreateOrganization, now: DateTime<Utc>) -> Self;
    fn apply_update(&mut self, update: &UpdateOrganization);
}

/// Construction and mutation for member entities stored in memory.
pub trait MemoryMember: MemberRecord {
    fn from_create(id: String, create: &CreateMember, now: DateTime<Utc>) -> Self;
    fn set_role(&mut self, role: MemberRole);
    fn set_status(&mut self, status: MemberStatus);
}

/// Construction and mutation for team entities stored in memory.
pub trait MemoryTeam: TeamRecord {
    fn from_create(id: String, create: &CreateTeam, now: DateTime<Utc>) -> Self;
    fn apply_update(&mut self, update: &UpdateTeam);
}

/// Construction and mutation for invitation entities stored in memory.
pub trait MemoryInvitation: InvitationRecord {
    fn from_create(id: String, token: String, create: &CreateInvitation, now: DateTime<Utc>)
    -> Self;
    fn set_status(&mut self, status: InvitationStatus);
}

// ─── Default implementations for built-in types ─────────────────────────

impl MemoryUser for User {
    fn from_create(id: String, create: &CreateUser, now: DateTime<Utc>) -> Self {
        User {
            id,
            email: create.email.clone(),
            name: create.name.clone(),
            created_at: now,
        }
    }
}

impl MemoryOrganization for Organization {
    fn from_create(id: String, create: &CreateOrganization, now: DateTime<Utc>) -> Self {
        Organization {
            id,
            app_id: create.app_id.clone(),
            environment_id: create.environment_id.clone(),
            name: create.name.clone(),
            slug: create.slug.clone(),
            logo: create.logo.clone(),
            created_by: create.created_by.clone(),
            metadata: create.metadata.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, update: &UpdateOrganization) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(slug) = &update.slug {
            self.slug = slug.clone();
        }
        if let Some(logo) = &update.logo {
            self.logo = Some(logo.clone());
        }
        if let Some(metadata) = &update.metadata {
            self.metadata = Some(metadata.clone());
        }
        self.updated_at = Utc::now();
    }
}

impl MemoryMember for Member {
    fn from_create(id: String, create: &CreateMember, now: DateTime<Utc>) -> Self {
        Member {
            id,
            organization_id: create.organization_id.clone(),
            user_id: create.user_id.clone(),
            role: create.role,
            status: create.status,
            created_at: now,
        }
    }

    fn set_role(&mut self, role: MemberRole) {
        self.role = role;
    }

    fn set_status(&mut self, status: MemberStatus) {
        self.status = status;
    }
}

impl MemoryTeam for Team {
    fn from_create(id: String, create: &CreateTeam, now: DateTime<Utc>) -> Self {
        Team {
            id,
            organization_id: create.organization_id.clone(),
            name: create.name.clone(),
            description: create.description.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, update: &UpdateTeam) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        self.updated_at = Utc::now();
    }
}

impl MemoryInvitation for Invitation {
    fn from_create(
        id: String,
        token: String,
        create: &CreateInvitation,
        now: DateTime<Utc>,
    ) -> Self {
        Invitation {
            id,
            organization_id: create.organization_id.clone(),
            email: create.email.clone(),
            role: create.role,
            status: InvitationStatus::Pending,
            token,
            inviter_id: create.inviter_id.clone(),
            expires_at: create.expires_at,
            created_at: now,
        }
    }

    fn set_status(&mut self, status: InvitationStatus) {
        self.status = status;
    }
}

// ─── Generic in-memory store ────────────────────────────────────────────

/// In-memory organization store for testing and development.
///
/// Generic over entity types: use default type parameters for the
/// built-in types, or supply custom structs implementing the `Memory*`
/// traits. Uniqueness of `(app_id, environment_id, slug)` and of
/// `(organization_id, user_id)` is enforced here, the way a SQL adapter
/// would enforce it with unique indexes.
pub struct MemoryOrganizationStore<
    U = User,
    O = Organization,
    M = Member,
    T = Team,
    I = Invitation,
> {
    users: Arc<Mutex<HashMap<String, U>>>,
    email_index: Arc<Mutex<HashMap<String, String>>>,
    app_roles: Arc<Mutex<HashMap<String, Vec<String>>>>,
    organizations: Arc<Mutex<HashMap<String, O>>>,
    slug_index: Arc<Mutex<HashMap<(String, String, String), String>>>,
    members: Arc<Mutex<HashMap<String, M>>>,
    teams: Arc<Mutex<HashMap<String, T>>>,
    invitations: Arc<Mutex<HashMap<String, I>>>,
    token_index: Arc<Mutex<HashMap<String, String>>>,
}

/// Constructor for the default (built-in) entity types.
/// Use `Default::default()` for custom type parameterizations.
impl MemoryOrganizationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<U, O, M, T, I> Default for MemoryOrganizationStore<U, O, M, T, I> {
    fn default() -> Self {
        Self {
            users: Arc::new(Mutex::new(HashMap::new())),
            email_index: Arc::new(Mutex::new(HashMap::new())),
            app_roles: Arc::new(Mutex::new(HashMap::new())),
            organizations: Arc::new(Mutex::new(HashMap::new())),
            slug_index: Arc::new(Mutex::new(HashMap::new())),
            members: Arc::new(Mutex::new(HashMap::new())),
            teams: Arc::new(Mutex::new(HashMap::new())),
            invitations: Arc::new(Mutex::new(HashMap::new())),
            token_index: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// Stable window over an unordered table: oldest first, id as tiebreaker.
fn paginate<R, K>(mut rows: Vec<R>, params: &ListParams, key: K) -> Vec<R>
where
    K: Fn(&R) -> (DateTime<Utc>, String),
{
    rows.sort_by_key(&key);
    rows.into_iter()
        .skip(params.offset.unwrap_or(0))
        .take(params.limit.unwrap_or(usize::MAX))
        .collect()
}

#[async_trait]
impl<U, O, M, T, I> UserOps for MemoryOrganizationStore<U, O, M, T, I>
where
    U: MemoryUser,
    O: MemoryOrganization,
    M: MemoryMember,
    T: MemoryTeam,
    I: MemoryInvitation,
{
    type User = U;

    async fn create_user(&self, create: CreateUser) -> OrgResult<U> {
        let mut users = self.users.lock().unwrap();
        let mut email_index = self.email_index.lock().unwrap();
        let mut app_roles = self.app_roles.lock().unwrap();

        let id = create.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());

        if let Some(email) = &create.email
            && email_index.contains_key(&email.to_lowercase())
        {
            return Err(OrgError::conflict("a user with this email already exists"));
        }

        let user = U::from_create(id.clone(), &create, Utc::now());
        users.insert(id.clone(), user.clone());

        if let Some(email) = &create.email {
            email_index.insert(email.to_lowercase(), id.clone());
        }
        if !create.app_roles.is_empty() {
            app_roles.insert(id, create.app_roles.clone());
        }

        Ok(user)
    }

    async fn get_user_by_id(&self, id: &str) -> OrgResult<Option<U>> {
        let users = self.users.lock().unwrap();
        Ok(users.get(id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> OrgResult<Option<U>> {
        let email_index = self.email_index.lock().unwrap();
        let users = self.users.lock().unwrap();

        if let Some(user_id) = email_index.get(&email.to_lowercase()) {
            Ok(users.get(user_id).cloned())
        } else {
            Ok(None)
        }
    }

    async fn list_user_app_roles(&self, user_id: &str) -> OrgResult<Vec<String>> {
        let app_roles = self.app_roles.lock().unwrap();
        Ok(app_roles.get(user_id).cloned().unwrap_or_default())
    }

    async fn set_user_app_roles(&self, user_id: &str, roles: Vec<String>) -> OrgResult<()> {
        let mut app_roles = self.app_roles.lock().unwrap();
        if roles.is_empty() {
            app_roles.remove(user_id);
        } else {
            app_roles.insert(user_id.to_string(), roles);
        }
        Ok(())
    }
}

#[async_trait]
impl<U, O, M, T, I> OrganizationOps for MemoryOrganizationStore<U, O, M, T, I>
where
    U: MemoryUser,
    O: MemoryOrganization,
    M: MemoryMember,
    T: MemoryTeam,
    I: MemoryInvitation,
{
    type Organization = O;

    async fn create_organization(&self, create: CreateOrganization) -> OrgResult<O> {
        let mut organizations = self.organizations.lock().unwrap();
        let mut slug_index = self.slug_index.lock().unwrap();

        let slug_key = (
            create.app_id.clone(),
            create.environment_id.clone(),
            create.slug.clone(),
        );
        if slug_index.contains_key(&slug_key) {
            return Err(OrgError::conflict(
                "organization slug already exists in this environment",
            ));
        }

        let id = create.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
        let organization = O::from_create(id.clone(), &create, Utc::now());

        organizations.insert(id.clone(), organization.clone());
        slug_index.insert(slug_key, id);

        Ok(organization)
    }

    async fn get_organization_by_id(&self, id: &str) -> OrgResult<Option<O>> {
        let organizations = self.organizations.lock().unwrap();
        Ok(organizations.get(id).cloned())
    }

    async fn get_organization_by_slug(
        &self,
        app_id: &str,
        environment_id: &str,
        slug: &str,
    ) -> OrgResult<Option<O>> {
        let slug_index = self.slug_index.lock().unwrap();
        let organizations = self.organizations.lock().unwrap();

        let key = (
            app_id.to_string(),
            environment_id.to_string(),
            slug.to_string(),
        );
        if let Some(org_id) = slug_index.get(&key) {
            Ok(organizations.get(org_id).cloned())
        } else {
            Ok(None)
        }
    }

    async fn update_organization(&self, id: &str, update: UpdateOrganization) -> OrgResult<O> {
        let mut organizations = self.organizations.lock().unwrap();
        let mut slug_index = self.slug_index.lock().unwrap();

        let org = organizations
            .get_mut(id)
            .ok_or_else(|| OrgError::not_found("organization not found"))?;

        // Update the slug index BEFORE mutation.
        if let Some(new_slug) = &update.slug {
            let current_slug = org.slug().to_string();
            if *new_slug != current_slug {
                let new_key = (
                    org.app_id().to_string(),
                    org.environment_id().to_string(),
                    new_slug.clone(),
                );
                if slug_index.contains_key(&new_key) {
                    return Err(OrgError::conflict(
                        "organization slug already exists in this environment",
                    ));
                }
                slug_index.remove(&(
                    org.app_id().to_string(),
                    org.environment_id().to_string(),
                    current_slug,
                ));
                slug_index.insert(new_key, id.to_string());
            }
        }

        org.apply_update(&update);
        Ok(org.clone())
    }

    async fn delete_organization(&self, id: &str) -> OrgResult<()> {
        let mut organizations = self.organizations.lock().unwrap();
        let mut slug_index = self.slug_index.lock().unwrap();
        let mut members = self.members.lock().unwrap();
        let mut teams = self.teams.lock().unwrap();
        let mut invitations = self.invitations.lock().unwrap();
        let mut token_index = self.token_index.lock().unwrap();

        if let Some(org) = organizations.remove(id) {
            slug_index.remove(&(
                org.app_id().to_string(),
                org.environment_id().to_string(),
                org.slug().to_string(),
            ));
        }

        members.retain(|_, m| m.organization_id() != id);
        teams.retain(|_, t| t.organization_id() != id);
        token_index.retain(|_, inv_id| {
            invitations
                .get(inv_id)
                .is_none_or(|i| i.organization_id() != id)
        });
        invitations.retain(|_, i| i.organization_id() != id);

        Ok(())
    }

    async fn list_organizations(
        &self,
        app_id: &str,
        environment_id: &str,
        params: &ListParams,
    ) -> OrgResult<Vec<O>> {
        let organizations = self.organizations.lock().unwrap();
        let rows: Vec<O> = organizations
            .values()
            .filter(|o| o.app_id() == app_id && o.environment_id() == environment_id)
            .cloned()
            .collect();
        Ok(paginate(rows, params, |o: &O| {
            (o.created_at(), o.id().to_string())
        }))
    }

    async fn count_organizations(&self, app_id: &str, environment_id: &str) -> OrgResult<usize> {
        let organizations = self.organizations.lock().unwrap();
        Ok(organizations
            .values()
            .filter(|o| o.app_id() == app_id && o.environment_id() == environment_id)
            .count())
    }

    async fn list_user_organizations(&self, user_id: &str) -> OrgResult<Vec<O>> {
        let members = self.members.lock().unwrap();
        let organizations = self.organizations.lock().unwrap();

        let org_ids: Vec<String> = members
            .values()
            .filter(|m| m.user_id() == user_id)
            .map(|m| m.organization_id().to_string())
            .collect();

        let mut orgs: Vec<O> = org_ids
            .iter()
            .filter_map(|id| organizations.get(id).cloned())
            .collect();
        orgs.sort_by_key(|o| (o.created_at(), o.id().to_string()));

        Ok(orgs)
    }
}

#[async_trait]
impl<U, O, M, T, I> MemberOps for MemoryOrganizationStore<U, O, M, T, I>
where
    U: MemoryUser,
    O: MemoryOrganization,
    M: MemoryMember,
    T: MemoryTeam,
    I: MemoryInvitation,
{
    type Member = M;

    async fn create_member(&self, create: CreateMember) -> OrgResult<M> {
        let mut members = self.members.lock().unwrap();

        let exists = members.values().any(|m| {
            m.organization_id() == create.organization_id && m.user_id() == create.user_id
        });

        if exists {
            return Err(OrgError::conflict(
                "user is already a member of this organization",
            ));
        }

        let id = Uuid::new_v4().to_string();
        let member = M::from_create(id.clone(), &create, Utc::now());

        members.insert(id, member.clone());
        Ok(member)
    }

    async fn get_member(&self, organization_id: &str, user_id: &str) -> OrgResult<Option<M>> {
        let members = self.members.lock().unwrap();
        Ok(members
            .values()
            .find(|m| m.organization_id() == organization_id && m.user_id() == user_id)
            .cloned())
    }

    async fn get_member_by_id(&self, id: &str) -> OrgResult<Option<M>> {
        let members = self.members.lock().unwrap();
        Ok(members.get(id).cloned())
    }

    async fn update_member_role(&self, member_id: &str, role: MemberRole) -> OrgResult<M> {
        let mut members = self.members.lock().unwrap();
        let member = members
            .get_mut(member_id)
            .ok_or_else(|| OrgError::not_found("member not found"))?;
        member.set_role(role);
        Ok(member.clone())
    }

    async fn update_member_status(&self, member_id: &str, status: MemberStatus) -> OrgResult<M> {
        let mut members = self.members.lock().unwrap();
        let member = members
            .get_mut(member_id)
            .ok_or_else(|| OrgError::not_found("member not found"))?;
        member.set_status(status);
        Ok(member.clone())
    }

    async fn delete_member(&self, member_id: &str) -> OrgResult<()> {
        let mut members = self.members.lock().unwrap();
        members.remove(member_id);
        Ok(())
    }

    async fn list_members(
        &self,
        organization_id: &str,
        params: &ListParams,
    ) -> OrgResult<Vec<M>> {
        let members = self.members.lock().unwrap();
        let rows: Vec<M> = members
            .values()
            .filter(|m| m.organization_id() == organization_id)
            .cloned()
            .collect();
        Ok(paginate(rows, params, |m: &M| {
            (m.created_at(), m.id().to_string())
        }))
    }

    async fn count_members(&self, organization_id: &str) -> OrgResult<usize> {
        let members = self.members.lock().unwrap();
        Ok(members
            .values()
            .filter(|m| m.organization_id() == organization_id)
            .count())
    }

    async fn count_owners(&self, organization_id: &str) -> OrgResult<usize> {
        let members = self.members.lock().unwrap();
        Ok(members
            .values()
            .filter(|m| {
                m.organization_id() == organization_id && m.role() == MemberRole::Owner
            })
            .count())
    }
}

#[async_trait]
impl<U, O, M, T, I> TeamOps for MemoryOrganizationStore<U, O, M, T, I>
where
    U: MemoryUser,
    O: MemoryOrganization,
    M: MemoryMember,
    T: MemoryTeam,
    I: MemoryInvitation,
{
    type Team = T;

    async fn create_team(&self, create: CreateTeam) -> OrgResult<T> {
        let mut teams = self.teams.lock().unwrap();

        let id = Uuid::new_v4().to_string();
        let team = T::from_create(id.clone(), &create, Utc::now());

        teams.insert(id, team.clone());
        Ok(team)
    }

    async fn get_team_by_id(&self, id: &str) -> OrgResult<Option<T>> {
        let teams = self.teams.lock().unwrap();
        Ok(teams.get(id).cloned())
    }

    async fn update_team(&self, id: &str, update: UpdateTeam) -> OrgResult<T> {
        let mut teams = self.teams.lock().unwrap();
        let team = teams
            .get_mut(id)
            .ok_or_else(|| OrgError::not_found("team not found"))?;
        team.apply_update(&update);
        Ok(team.clone())
    }

    async fn delete_team(&self, id: &str) -> OrgResult<()> {
        let mut teams = self.teams.lock().unwrap();
        teams.remove(id);
        Ok(())
    }

    async fn list_teams(&self, organization_id: &str, params: &ListParams) -> OrgResult<Vec<T>> {
        let teams = self.teams.lock().unwrap();
        let rows: Vec<T> = teams
            .values()
            .filter(|t| t.organization_id() == organization_id)
            .cloned()
            .collect();
        Ok(paginate(rows, params, |t: &T| {
            (t.created_at(), t.id().to_string())
        }))
    }

    async fn count_teams(&self, organization_id: &str) -> OrgResult<usize> {
        let teams = self.teams.lock().unwrap();
        Ok(teams
            .values()
            .filter(|t| t.organization_id() == organization_id)
            .count())
    }
}

#[async_trait]
impl<U, O, M, T, I> InvitationOps for MemoryOrganizationStore<U, O, M, T, I>
where
    U: MemoryUser,
    O: MemoryOrganization,
    M: MemoryMember,
    T: MemoryTeam,
    I: MemoryInvitation,
{
    type Invitation = I;

    async fn create_invitation(&self, create: CreateInvitation) -> OrgResult<I> {
        let mut invitations = self.invitations.lock().unwrap();
        let mut token_index = self.token_index.lock().unwrap();

        let id = Uuid::new_v4().to_string();
        let token = format!("inv_{}", Uuid::new_v4());
        let invitation = I::from_create(id.clone(), token.clone(), &create, Utc::now());

        invitations.insert(id.clone(), invitation.clone());
        token_index.insert(token, id);

        Ok(invitation)
    }

    async fn get_invitation_by_id(&self, id: &str) -> OrgResult<Option<I>> {
        let invitations = self.invitations.lock().unwrap();
        Ok(invitations.get(id).cloned())
    }

    async fn get_invitation_by_token(&self, token: &str) -> OrgResult<Option<I>> {
        let token_index = self.token_index.lock().unwrap();
        let invitations = self.invitations.lock().unwrap();

        if let Some(id) = token_index.get(token) {
            Ok(invitations.get(id).cloned())
        } else {
            Ok(None)
        }
    }

    async fn get_pending_invitation(
        &self,
        organization_id: &str,
        email: &str,
    ) -> OrgResult<Option<I>> {
        let invitations = self.invitations.lock().unwrap();
        Ok(invitations
            .values()
            .find(|i| {
                i.organization_id() == organization_id
                    && i.email().to_lowercase() == email.to_lowercase()
                    && i.status() == InvitationStatus::Pending
            })
            .cloned())
    }

    async fn update_invitation_status(&self, id: &str, status: InvitationStatus) -> OrgResult<I> {
        let mut invitations = self.invitations.lock().unwrap();
        let invitation = invitations
            .get_mut(id)
            .ok_or_else(|| OrgError::not_found("invitation not found"))?;
        invitation.set_status(status);
        Ok(invitation.clone())
    }

    async fn list_organization_invitations(
        &self,
        organization_id: &str,
        params: &ListParams,
    ) -> OrgResult<Vec<I>> {
        let invitations = self.invitations.lock().unwrap();
        let rows: Vec<I> = invitations
            .values()
            .filter(|i| i.organization_id() == organization_id)
            .cloned()
            .collect();
        Ok(paginate(rows, params, |i: &I| {
            (i.created_at(), i.id().to_string())
        }))
    }

    async fn list_invitations_for_email(&self, email: &str) -> OrgResult<Vec<I>> {
        let invitations = self.invitations.lock().unwrap();
        let now = Utc::now();
        let mut rows: Vec<I> = invitations
            .values()
            .filter(|i| {
                i.email().to_lowercase() == email.to_lowercase()
                    && i.status() == InvitationStatus::Pending
                    && i.expires_at() > now
            })
            .cloned()
            .collect();
        rows.sort_by_key(|i| (i.created_at(), i.id().to_string()));
        Ok(rows)
    }

    async fn expire_pending_invitations(&self, organization_id: &str) -> OrgResult<usize> {
        let mut invitations = self.invitations.lock().unwrap();
        let now = Utc::now();
        let mut expired = 0;

        for invitation in invitations.values_mut() {
            if invitation.organization_id() == organization_id
                && invitation.status() == InvitationStatus::Pending
                && invitation.expires_at() < now
            {
                invitation.set_status(InvitationStatus::Expired);
                expired += 1;
            }
        }

        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn store() -> MemoryOrganizationStore {
        MemoryOrganizationStore::new()
    }

    async fn seed_org(store: &MemoryOrganizationStore, app: &str, env: &str, slug: &str) -> Organization {
        store
            .create_organization(CreateOrganization::new(app, env, "Acme", slug, "creator"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn slug_is_unique_per_app_and_environment() {
        let store = store();
        seed_org(&store, "app-a", "env-1", "acme").await;

        let duplicate = store
            .create_organization(CreateOrganization::new(
                "app-a", "env-1", "Acme Again", "acme", "creator",
            ))
            .await;
        assert!(matches!(duplicate, Err(OrgError::Conflict(_))));

        // Same slug under another environment is fine.
        let other_env = seed_org(&store, "app-a", "env-2", "acme").await;
        assert_eq!(other_env.slug, "acme");
    }

    #[tokio::test]
    async fn membership_is_unique_per_org_and_user() {
        let store = store();
        let org = seed_org(&store, "app-a", "env-1", "acme").await;

        store
            .create_member(CreateMember::new(&org.id, "u1", MemberRole::Member))
            .await
            .unwrap();

        let duplicate = store
            .create_member(CreateMember::new(&org.id, "u1", MemberRole::Admin))
            .await;
        assert!(matches!(duplicate, Err(OrgError::Conflict(_))));
    }

    #[tokio::test]
    async fn invitation_token_is_distinct_from_id_and_indexed() {
        let store = store();
        let org = seed_org(&store, "app-a", "env-1", "acme").await;

        let invitation = store
            .create_invitation(CreateInvitation::new(
                &org.id,
                "new@example.com",
                MemberRole::Member,
                "inviter",
                Utc::now() + Duration::hours(48),
            ))
            .await
            .unwrap();

        assert_ne!(invitation.id, invitation.token);
        let found = store
            .get_invitation_by_token(&invitation.token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, invitation.id);
    }

    #[tokio::test]
    async fn expiry_sweep_only_touches_stale_pending_rows() {
        let store = store();
        let org = seed_org(&store, "app-a", "env-1", "acme").await;

        store
            .create_invitation(CreateInvitation::new(
                &org.id,
                "stale@example.com",
                MemberRole::Member,
                "inviter",
                Utc::now() - Duration::hours(1),
            ))
            .await
            .unwrap();
        let fresh = store
            .create_invitation(CreateInvitation::new(
                &org.id,
                "fresh@example.com",
                MemberRole::Member,
                "inviter",
                Utc::now() + Duration::hours(1),
            ))
            .await
            .unwrap();

        assert_eq!(store.expire_pending_invitations(&org.id).await.unwrap(), 1);
        assert_eq!(store.expire_pending_invitations(&org.id).await.unwrap(), 0);

        let fresh = store.get_invitation_by_id(&fresh.id).await.unwrap().unwrap();
        assert_eq!(fresh.status, InvitationStatus::Pending);
    }

    #[tokio::test]
    async fn deleting_an_organization_cascades() {
        let store = store();
        let org = seed_org(&store, "app-a", "env-1", "acme").await;

        store
            .create_member(CreateMember::new(&org.id, "u1", MemberRole::Owner))
            .await
            .unwrap();
        store
            .create_team(CreateTeam::new(&org.id, "platform"))
            .await
            .unwrap();
        let invitation = store
            .create_invitation(CreateInvitation::new(
                &org.id,
                "new@example.com",
                MemberRole::Member,
                "u1",
                Utc::now() + Duration::hours(48),
            ))
            .await
            .unwrap();

        store.delete_organization(&org.id).await.unwrap();

        assert_eq!(store.count_members(&org.id).await.unwrap(), 0);
        assert_eq!(store.count_teams(&org.id).await.unwrap(), 0);
        assert!(
            store
                .get_invitation_by_token(&invitation.token)
                .await
                .unwrap()
                .is_none()
        );
        // The slug is free again.
        seed_org(&store, "app-a", "env-1", "acme").await;
    }

    #[tokio::test]
    async fn list_members_paginates_in_stable_order() {
        let store = store();
        let org = seed_org(&store, "app-a", "env-1", "acme").await;

        for i in 0..5 {
            store
                .create_member(CreateMember::new(
                    &org.id,
                    format!("u{i}"),
                    MemberRole::Member,
                ))
                .await
                .unwrap();
        }

        let first = store
            .list_members(&org.id, &ListParams::new(0, 2))
            .await
            .unwrap();
        let second = store
            .list_members(&org.id, &ListParams::new(2, 2))
            .await
            .unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        let ids: std::collections::HashSet<_> = first
            .iter()
            .chain(second.iter())
            .map(|m| m.id.clone())
            .collect();
        assert_eq!(ids.len(), 4);
    }
}
