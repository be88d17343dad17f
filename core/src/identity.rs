//! Caller identity as handed over by the authentication layer.
//!
//! Authentication itself happens elsewhere; this crate only trusts the result.
//! Reads need any identity, writes to the catalog need an elevated (staff) one.

use crate::error::{BookingError, Result};
use crate::types::UserId;
use serde::{Deserialize, Serialize};

/// An authenticated caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The user
    pub user: UserId,
    /// Staff privilege
    pub elevated: bool,
}

impl Identity {
    /// A regular customer.
    #[must_use]
    pub const fn customer(user: UserId) -> Self {
        Self {
            user,
            elevated: false,
        }
    }

    /// A staff member.
    #[must_use]
    pub const fn staff(user: UserId) -> Self {
        Self {
            user,
            elevated: true,
        }
    }
}

/// Require an authenticated caller.
///
/// # Errors
///
/// Returns [`BookingError::Unauthorized`] if `identity` is `None`.
pub const fn authenticated(identity: Option<&Identity>) -> Result<&Identity> {
    match identity {
        Some(identity) => Ok(identity),
        None => Err(BookingError::Unauthorized),
    }
}

/// Require an authenticated staff caller.
///
/// # Errors
///
/// Returns [`BookingError::Unauthorized`] if `identity` is `None`,
/// [`BookingError::Forbidden`] if it is not elevated.
pub const fn elevated(identity: Option<&Identity>) -> Result<&Identity> {
    match identity {
        Some(identity) if identity.elevated => Ok(identity),
        Some(_) => Err(BookingError::Forbidden),
        None => Err(BookingError::Unauthorized),
    }
}

/// Which orders a caller may see.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderScope {
    /// Every order (staff)
    All,
    /// Only orders owned by this user
    Owner(UserId),
}

impl OrderScope {
    /// Scope granted to `identity`.
    #[must_use]
    pub const fn for_identity(identity: &Identity) -> Self {
        if identity.elevated {
            Self::All
        } else {
            Self::Owner(identity.user)
        }
    }

    /// Whether an order owned by `owner` is visible in this scope.
    #[must_use]
    pub fn includes(&self, owner: UserId) -> bool {
        match self {
            Self::All => true,
            Self::Owner(user) => *user == owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_identity_is_unauthorized() {
        assert_eq!(authenticated(None), Err(BookingError::Unauthorized));
        assert_eq!(elevated(None), Err(BookingError::Unauthorized));
    }

    #[test]
    fn test_customer_is_forbidden_from_staff_operations() {
        let customer = Identity::customer(UserId::new(1));
        assert_eq!(elevated(Some(&customer)), Err(BookingError::Forbidden));
        assert_eq!(authenticated(Some(&customer)), Ok(&customer));
    }

    #[test]
    fn test_order_scope() {
        let customer = Identity::customer(UserId::new(1));
        let staff = Identity::staff(UserId::new(2));

        let scope = OrderScope::for_identity(&customer);
        assert!(scope.includes(UserId::new(1)));
        assert!(!scope.includes(UserId::new(2)));

        assert_eq!(OrderScope::for_identity(&staff), OrderScope::All);
        assert!(OrderScope::All.includes(UserId::new(99)));
    }
}
