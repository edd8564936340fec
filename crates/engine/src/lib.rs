//! # org-guard engine
//!
//! Access decisions and caller-facing organization operations. The entity
//! model and the store boundary live in `org-guard-core`; this crate adds
//! the three-tier access decision ([`AccessEngine`]), the RBAC
//! collaborator boundary ([`rbac::RbacProvider`]), and the service
//! functions the presentation layer calls.

pub mod access;
pub mod context;
pub mod rbac;
pub mod service;

#[cfg(test)]
pub(crate) mod test_util;

pub use access::AccessEngine;
pub use context::OrgContext;
pub use rbac::{
    Action, Permission, RbacProvider, Resource, RoleDefinition, StaticRbacProvider,
};
