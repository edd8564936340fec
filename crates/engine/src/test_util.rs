//! Shared helpers for the service test modules.

use std::sync::Arc;

use org_guard_core::store::{MemberOps, UserOps};
use org_guard_core::{
    CreateMember, CreateUser, Member, MemberRole, MemoryOrganizationStore, OrgConfig, User,
};

use crate::context::OrgContext;
use crate::rbac::StaticRbacProvider;
use crate::service::types::CreateOrganizationInput;

pub(crate) type TestContext = OrgContext<MemoryOrganizationStore, StaticRbacProvider>;

pub(crate) fn context() -> TestContext {
    context_with(|config| config)
}

pub(crate) fn context_with(configure: impl FnOnce(OrgConfig) -> OrgConfig) -> TestContext {
    OrgContext::new(
        Arc::new(MemoryOrganizationStore::new()),
        Arc::new(StaticRbacProvider::new()),
        configure(OrgConfig::new()),
    )
}

pub(crate) fn new_org_input(slug: &str) -> CreateOrganizationInput {
    CreateOrganizationInput {
        app_id: "app-a".to_string(),
        environment_id: "env-1".to_string(),
        name: "Acme".to_string(),
        slug: slug.to_string(),
        logo: None,
        metadata: None,
    }
}

pub(crate) async fn user(ctx: &TestContext, email: &str) -> User {
    ctx.store
        .create_user(CreateUser::new().with_email(email))
        .await
        .unwrap()
}

pub(crate) async fn app_admin(ctx: &TestContext, email: &str) -> User {
    ctx.store
        .create_user(CreateUser::new().with_email(email).with_app_role("admin"))
        .await
        .unwrap()
}

pub(crate) async fn add_as(
    ctx: &TestContext,
    organization_id: &str,
    user: &User,
    role: MemberRole,
) -> Member {
    ctx.store
        .create_member(CreateMember::new(organization_id, &user.id, role))
        .await
        .unwrap()
}

pub(crate) async fn admin_of(ctx: &TestContext, organization_id: &str, email: &str) -> User {
    let u = user(ctx, email).await;
    add_as(ctx, organization_id, &u, MemberRole::Admin).await;
    u
}

pub(crate) async fn owner_of(ctx: &TestContext, organization_id: &str, email: &str) -> User {
    let u = user(ctx, email).await;
    add_as(ctx, organization_id, &u, MemberRole::Owner).await;
    u
}
