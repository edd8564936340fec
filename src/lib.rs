//! # org-guard
//!
//! Organization access control for a multi-tenant identity platform:
//! entities, the store boundary, the three-tier access decision, and the
//! caller-facing organization, member, team, and invitation operations.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use org_guard::service::{self, types::CreateOrganizationInput};
//! use org_guard::{MemoryOrganizationStore, OrgConfig, OrgContext, StaticRbacProvider};
//! use org_guard::{CreateUser, UserOps};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = OrgContext::new(
//!         Arc::new(MemoryOrganizationStore::new()),
//!         Arc::new(StaticRbacProvider::new()),
//!         OrgConfig::new(),
//!     );
//!
//!     let alice = ctx
//!         .store
//!         .create_user(CreateUser::new().with_email("alice@example.com"))
//!         .await?;
//!
//!     let created = service::org::create_organization(
//!         &ctx,
//!         &alice,
//!         CreateOrganizationInput {
//!             app_id: "app".into(),
//!             environment_id: "production".into(),
//!             name: "Acme".into(),
//!             slug: "acme".into(),
//!             logo: None,
//!             metadata: None,
//!         },
//!     )
//!     .await?;
//!
//!     assert!(ctx.access.can_manage(&created.organization.id, &alice.id).await?);
//!     Ok(())
//! }
//! ```

// Re-export the core model and store boundary
pub use org_guard_core::entity::{
    InvitationRecord, MemberRecord, OrganizationRecord, TeamRecord, UserRecord,
};
pub use org_guard_core::{
    CreateInvitation, CreateMember, CreateOrganization, CreateTeam, CreateUser, Invitation,
    InvitationOps, InvitationStatus, ListParams, Member, MemberOps, MemberRole, MemberStatus,
    MemoryInvitation, MemoryMember, MemoryOrganization, MemoryOrganizationStore, MemoryTeam,
    MemoryUser, OrgConfig, OrgError, OrgResult, Organization, OrganizationOps, OrganizationStore,
    StoreError, Team, TeamOps, UpdateOrganization, UpdateTeam, User, UserOps,
};

// Re-export the engine
pub use org_guard_engine::service;
pub use org_guard_engine::{
    AccessEngine, Action, OrgContext, Permission, RbacProvider, Resource, RoleDefinition,
    StaticRbacProvider,
};
