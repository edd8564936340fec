//! # org-guard core
//!
//! Entity model, store boundary, errors, and configuration for the
//! organization access-control subsystem. The decision engine and the
//! caller-facing services live in `org-guard-engine`.

pub mod config;
pub mod entity;
pub mod error;
pub mod store;
pub mod types;

// Re-export commonly used items
pub use config::OrgConfig;
pub use entity::{
    InvitationRecord, MemberRecord, OrganizationRecord, TeamRecord, UserRecord,
};
pub use error::{OrgError, OrgResult, StoreError};
pub use store::{
    InvitationOps, MemberOps, MemoryInvitation, MemoryMember, MemoryOrganization,
    MemoryOrganizationStore, MemoryTeam, MemoryUser, OrganizationOps, OrganizationStore, TeamOps,
    UserOps,
};
pub use types::{
    CreateInvitation, CreateMember, CreateOrganization, CreateTeam, CreateUser, Invitation,
    InvitationStatus, ListParams, Member, MemberRole, MemberStatus, Organization, Team,
    UpdateOrganization, UpdateTeam, User,
};
