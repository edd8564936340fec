use std::sync::Arc;

use org_guard_core::store::OrganizationStore;
use org_guard_core::{ListParams, OrgConfig};

use crate::access::AccessEngine;
use crate::rbac::RbacProvider;

/// Collaborator bundle passed to every service operation.
///
/// Configuration is an immutable value fixed at construction; there is no
/// shared mutable state to coordinate.
pub struct OrgContext<S, R> {
    pub store: Arc<S>,
    pub rbac: Arc<R>,
    pub config: Arc<OrgConfig>,
    pub access: AccessEngine<S, R>,
}

impl<S, R> Clone for OrgContext<S, R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            rbac: Arc::clone(&self.rbac),
            config: Arc::clone(&self.config),
            access: self.access.clone(),
        }
    }
}

impl<S, R> OrgContext<S, R>
where
    S: OrganizationStore,
    R: RbacProvider,
{
    pub fn new(store: Arc<S>, rbac: Arc<R>, config: OrgConfig) -> Self {
        let access = AccessEngine::new(Arc::clone(&store), Arc::clone(&rbac));
        Self {
            store,
            rbac,
            config: Arc::new(config),
            access,
        }
    }

    /// Clamp a caller-supplied window to the configured page limits.
    pub(crate) fn clamp_page(&self, params: &ListParams) -> ListParams {
        ListParams {
            offset: Some(params.offset.unwrap_or(0)),
            limit: Some(
                params
                    .limit
                    .unwrap_or(self.config.default_page_limit)
                    .min(self.config.max_page_limit),
            ),
        }
    }
}
