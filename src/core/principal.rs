//! Actor context for authorization.
//!
//! Identity and sessions live outside this crate; callers resolve the
//! current user there and hand every core operation an explicit
//! [`Principal`]. This keeps authorization decisions testable without any
//! framework scaffolding, and nothing in the crate reaches for ambient
//! session state.

/// Marketplace role attached to a user by the external identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Books services and drives customer-side transitions.
    Customer,
    /// Offers services and drives freelancer-side transitions.
    Freelancer,
    /// May force statuses and delete orders outright.
    Admin,
}

/// The authenticated actor performing an operation.
#[derive(Debug, Clone)]
pub struct Principal {
    /// External identity id of the actor
    pub user_id: i64,
    roles: Vec<Role>,
}

impl Principal {
    /// Creates a principal with an explicit role set.
    #[must_use]
    pub fn new(user_id: i64, roles: Vec<Role>) -> Self {
        Self { user_id, roles }
    }

    /// Convenience constructor for a customer-only principal.
    #[must_use]
    pub fn customer(user_id: i64) -> Self {
        Self::new(user_id, vec![Role::Customer])
    }

    /// Convenience constructor for a freelancer-only principal.
    #[must_use]
    pub fn freelancer(user_id: i64) -> Self {
        Self::new(user_id, vec![Role::Freelancer])
    }

    /// Convenience constructor for an admin principal.
    #[must_use]
    pub fn admin(user_id: i64) -> Self {
        Self::new(user_id, vec![Role::Admin])
    }

    /// Returns `true` if the actor holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Returns `true` if the actor holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_membership() {
        let p = Principal::new(7, vec![Role::Customer, Role::Freelancer]);
        assert!(p.has_role(Role::Customer));
        assert!(p.has_role(Role::Freelancer));
        assert!(!p.is_admin());
    }

    #[test]
    fn test_convenience_constructors() {
        assert!(Principal::admin(1).is_admin());
        assert!(Principal::customer(2).has_role(Role::Customer));
        assert!(!Principal::customer(2).has_role(Role::Freelancer));
        assert!(Principal::freelancer(3).has_role(Role::Freelancer));
    }
}
