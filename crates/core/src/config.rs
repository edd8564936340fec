use crate::types::MemberRole;

/// Limits and defaults for the organization subsystem.
///
/// Constructed once and threaded into the engine context; never a shared
/// mutable value.
#[derive(Debug, Clone)]
pub struct OrgConfig {
    /// Allow users to create organizations (default: true).
    pub allow_user_to_create_organization: bool,
    /// Maximum organizations per user (None = unlimited).
    pub max_organizations_per_user: Option<usize>,
    /// Maximum members per organization (None = unlimited).
    pub max_members_per_organization: Option<usize>,
    /// Maximum teams per organization (None = unlimited).
    pub max_teams_per_organization: Option<usize>,
    /// Maximum pending invitations per organization (None = unlimited).
    pub max_pending_invitations: Option<usize>,
    /// Invitation expiration in seconds (default: 48 hours).
    pub invitation_expires_in: u64,
    /// Role assigned to the organization creator (default: owner).
    pub creator_role: MemberRole,
    /// Disable organization deletion entirely (default: false).
    pub disable_organization_deletion: bool,
    /// Default number of rows returned by list operations (default: 50).
    pub default_page_limit: usize,
    /// Maximum number of rows returned by list operations (default: 100).
    pub max_page_limit: usize,
}

impl Default for OrgConfig {
    fn default() -> Self {
        Self {
            allow_user_to_create_organization: true,
            max_organizations_per_user: None,
            max_members_per_organization: Some(100),
            max_teams_per_organization: Some(20),
            max_pending_invitations: Some(100),
            invitation_expires_in: 60 * 60 * 48,
            creator_role: MemberRole::Owner,
            disable_organization_deletion: false,
            default_page_limit: 50,
            max_page_limit: 100,
        }
    }
}

impl OrgConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // Builder methods

    pub fn allow_user_to_create_organization(mut self, allow: bool) -> Self {
        self.allow_user_to_create_organization = allow;
        self
    }

    pub fn max_organizations_per_user(mut self, limit: usize) -> Self {
        self.max_organizations_per_user = Some(limit);
        self
    }

    pub fn max_members_per_organization(mut self, limit: usize) -> Self {
        self.max_members_per_organization = Some(limit);
        self
    }

    pub fn max_teams_per_organization(mut self, limit: usize) -> Self {
        self.max_teams_per_organization = Some(limit);
        self
    }

    pub fn max_pending_invitations(mut self, limit: usize) -> Self {
        self.max_pending_invitations = Some(limit);
        self
    }

    pub fn invitation_expires_in(mut self, seconds: u64) -> Self {
        self.invitation_expires_in = seconds;
        self
    }

    pub fn creator_role(mut self, role: MemberRole) -> Self {
        self.creator_role = role;
        self
    }

    pub fn disable_organization_deletion(mut self, disable: bool) -> Self {
        self.disable_organization_deletion = disable;
        self
    }
}
