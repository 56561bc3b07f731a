//! The access-policy rule table.
//!
//! Pure functions over [`Role`] — the caller is responsible for fetching the
//! role from the profile store at call time. Failing a check must happen
//! before any mutation is attempted.

use std::fmt;

use thiserror::Error;

use crate::profile::Role;

/// The privileged operation classes the rule table gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  /// Dashboard figures, customer list and customer detail. Any role.
  ViewDashboard,
  /// Create customers, change subscription or client status, view the
  /// strategy catalog. Manager and above.
  ManageCustomers,
  /// Assign/unassign clients, change roles, invite staff, read audit logs.
  /// Super admin only.
  ManageUsers,
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Action::ViewDashboard => "view dashboard",
      Action::ManageCustomers => "manage customers",
      Action::ManageUsers => "manage users",
    };
    f.write_str(s)
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
  #[error("role {role:?} is not permitted to {action}")]
  Forbidden { role: Role, action: Action },
}

/// Check `role` against the rule table for `action`.
pub fn check(role: Role, action: Action) -> Result<(), PolicyError> {
  let allowed = match action {
    Action::ViewDashboard => true,
    Action::ManageCustomers => matches!(role, Role::SuperAdmin | Role::Manager),
    Action::ManageUsers => matches!(role, Role::SuperAdmin),
  };

  if allowed {
    Ok(())
  } else {
    Err(PolicyError::Forbidden { role, action })
  }
}
