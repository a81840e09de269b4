use async_trait::async_trait;
use storefront_types::ports::identity::{IdentityOracle, Role};

/// Bearer tokens listed in config are admins; any other token is a customer.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenIdentity {
    admin_tokens: Vec<String>,
}

impl StaticTokenIdentity {
    pub fn new(admin_tokens: Vec<String>) -> Self {
        Self { admin_tokens }
    }
}

#[async_trait]
impl IdentityOracle for StaticTokenIdentity {
    async fn role(&self, token: Option<&str>) -> Role {
        match token.map(str::trim).filter(|t| !t.is_empty()) {
            None => Role::Anonymous,
            Some(t) if self.admin_tokens.iter().any(|admin| admin == t) => Role::Admin,
            Some(_) => Role::Customer,
        }
    }
}
