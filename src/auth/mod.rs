//! Identities, the identity-provider adapter, and authorization policy.

pub mod identity;
pub mod policy;

pub use identity::{AuthError, AuthState, Identity, IdentityCallback, IdentityProvider, LocalIdentityProvider};
pub use policy::{AdminPolicy, FixedEmailAdmin};
