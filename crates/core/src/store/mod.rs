//! Store boundary: persistence traits plus the in-memory implementation.

mod memory;
mod traits;

pub use memory::{
    MemoryInvitation, MemoryMember, MemoryOrganization, MemoryOrganizationStore, MemoryTeam,
    MemoryUser,
};
pub use traits::{
    InvitationOps, MemberOps, OrganizationOps, OrganizationStore, TeamOps, UserOps,
};
