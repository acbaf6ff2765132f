use storefront_auth::Role;
use storefront_core::UserId;

/// Authenticated caller for a request, derived only from the verified token.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UserContext {
    user_id: UserId,
    role: Role,
}

impl UserContext {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }
}
