//! crates/fleet_core/src/identity.rs
//!
//! Login and registration against the user collection.

use crate::domain::{new_id, NewUser, User, UserRole};
use crate::error::{FleetError, FleetResult};
use crate::state::FleetState;

impl FleetState {
    /// First user whose username or email matches and whose password is equal.
    pub fn login(&self, username_or_email: &str, password: &str) -> Option<&User> {
        self.users.iter().find(|u| {
            (u.username == username_or_email || u.email == username_or_email)
                && u.password.as_deref() == Some(password)
        })
    }

    pub fn register(&self, new_user: NewUser) -> FleetResult<(Self, User)> {
        let taken = self
            .users
            .iter()
            .any(|u| u.username == new_user.username || u.email == new_user.email);
        if taken {
            return Err(FleetError::DuplicateUser);
        }
        if new_user.role == UserRole::Operator {
            match new_user.assigned_site_id.as_deref() {
                None | Some("") => {
                    return Err(FleetError::InvalidInput(
                        "Please assign a site for the Operator role".to_string(),
                    ))
                }
                Some(site_id) if self.site(site_id).is_none() => {
                    return Err(FleetError::UnknownSite(site_id.to_string()))
                }
                Some(_) => {}
            }
        }

        let user = User {
            id: new_id("user"),
            username: new_user.username,
            full_name: new_user.full_name,
            email: new_user.email,
            password: Some(new_user.password),
            role: new_user.role,
            assigned_site_id: new_user.assigned_site_id,
        };
        let mut next = self.clone();
        next.users.push(user.clone());
        Ok((next, user))
    }
}
