use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Admin,
    Customer,
    Anonymous,
}

/// Opaque session oracle, consulted only to gate the admin surface.
#[async_trait]
pub trait IdentityOracle: Send + Sync + 'static {
    async fn role(&self, token: Option<&str>) -> Role;
}
