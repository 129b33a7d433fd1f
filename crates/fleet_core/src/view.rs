//! crates/fleet_core/src/view.rs
//!
//! Page selection for the desk. A closed set of pages plus the drill-down
//! selections (site, truck) that some pages need.

use serde::{Deserialize, Serialize};

use crate::domain::{User, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum View {
    Login,
    Register,
    Sites,
    Trucks,
    Details,
    FleetDashboard,
    CustomerHome,
    VehicleMgmt,
    BookingDispatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigator {
    pub view: View,
    pub selected_site_id: Option<String>,
    pub selected_truck_id: Option<String>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            view: View::Login,
            selected_site_id: None,
            selected_truck_id: None,
        }
    }
}

impl Navigator {
    /// Where a user lands right after signing in.
    pub fn landing(user: &User) -> Self {
        let view = match user.role {
            UserRole::Customer => View::CustomerHome,
            UserRole::Admin | UserRole::Operator => View::Sites,
        };
        Self {
            view,
            ..Self::default()
        }
    }

    /// Jumps to a top-level page; drill-down selections are dropped.
    pub fn navigate(&mut self, view: View) {
        self.view = view;
        self.selected_site_id = None;
        self.selected_truck_id = None;
    }

    pub fn select_site(&mut self, site_id: &str) {
        self.selected_site_id = Some(site_id.to_string());
        self.view = View::Trucks;
    }

    pub fn select_truck(&mut self, truck_id: &str) {
        self.selected_truck_id = Some(truck_id.to_string());
        self.view = View::Details;
    }

    /// Each drill-down page has one fixed parent.
    pub fn back(&mut self) {
        self.view = match self.view {
            View::Details => View::Trucks,
            View::Trucks => View::Sites,
            View::Register => View::Login,
            other => other,
        };
    }

    pub fn logout(&mut self) {
        self.navigate(View::Login);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn drill_down_and_back() {
        let admin = seed::users().remove(0);
        let mut nav = Navigator::landing(&admin);
        assert_eq!(nav.view, View::Sites);

        nav.select_site("site-1");
        nav.select_truck("t1");
        assert_eq!(nav.view, View::Details);
        assert_eq!(nav.selected_truck_id.as_deref(), Some("t1"));

        nav.back();
        assert_eq!(nav.view, View::Trucks);
        nav.back();
        assert_eq!(nav.view, View::Sites);
        nav.back();
        assert_eq!(nav.view, View::Sites);
    }

    #[test]
    fn navigating_clears_selections() {
        let mut nav = Navigator::default();
        nav.select_site("site-2");
        nav.select_truck("t3");

        nav.navigate(View::FleetDashboard);
        assert_eq!(nav.view, View::FleetDashboard);
        assert!(nav.selected_site_id.is_none());
        assert!(nav.selected_truck_id.is_none());

        nav.logout();
        assert_eq!(nav, Navigator::default());
    }

    #[test]
    fn customers_land_on_customer_home() {
        let mut customer = seed::users().remove(0);
        customer.role = UserRole::Customer;
        assert_eq!(Navigator::landing(&customer).view, View::CustomerHome);
    }
}
