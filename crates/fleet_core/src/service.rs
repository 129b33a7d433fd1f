//! crates/fleet_core/src/service.rs
//!
//! Maintenance workflow: a service request carries a task checklist, and its
//! status follows the checklist.

use chrono::Utc;

use crate::domain::{new_id, NewServiceRequest, ServiceRequest, ServiceStatus, ServiceTask};
use crate::error::{FleetError, FleetResult};
use crate::state::FleetState;

impl ServiceRequest {
    /// Rounded share of completed tasks, 0 for an empty checklist.
    pub fn completion_percent(&self) -> u8 {
        let total = self.tasks.len();
        if total == 0 {
            return 0;
        }
        let done = self.tasks.iter().filter(|t| t.is_completed).count();
        (100.0 * done as f64 / total as f64).round() as u8
    }

    /// Status implied by the checklist once it has been touched.
    fn settle_status(&mut self) {
        self.status = if self.tasks.iter().all(|t| t.is_completed) {
            ServiceStatus::Completed
        } else {
            ServiceStatus::InProgress
        };
    }
}

impl FleetState {
    pub fn create_service_request(
        &self,
        new_request: NewServiceRequest,
    ) -> FleetResult<(Self, ServiceRequest)> {
        if self.truck(&new_request.truck_id).is_none() {
            return Err(FleetError::UnknownTruck(new_request.truck_id));
        }

        let tasks = new_request
            .tasks
            .into_iter()
            .map(|description| ServiceTask {
                id: new_id("task"),
                description,
                is_completed: false,
            })
            .collect();

        let request = ServiceRequest {
            id: new_id("sr"),
            truck_id: new_request.truck_id,
            kind: new_request.kind,
            priority: new_request.priority,
            description: new_request.description,
            estimated_cost: new_request.estimated_cost,
            expected_date: new_request.expected_date,
            status: ServiceStatus::Pending,
            tasks,
            timestamp: Utc::now(),
        };
        let mut next = self.clone();
        next.service_requests.push(request.clone());
        Ok((next, request))
    }

    /// Flips one task. A completed request whose task is reopened goes back to
    /// in-progress.
    pub fn toggle_task(&self, request_id: &str, task_id: &str) -> FleetResult<Self> {
        let mut next = self.clone();
        let request = next
            .service_requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or_else(|| FleetError::UnknownServiceRequest(request_id.to_string()))?;
        let task = request
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| FleetError::UnknownTask(task_id.to_string()))?;

        task.is_completed = !task.is_completed;
        request.settle_status();
        Ok(next)
    }

    pub fn service_request(&self, request_id: &str) -> Option<&ServiceRequest> {
        self.service_requests.iter().find(|r| r.id == request_id)
    }

    /// The open maintenance job for a truck, if any.
    pub fn active_service_for(&self, truck_id: &str) -> Option<&ServiceRequest> {
        self.service_requests
            .iter()
            .find(|r| r.truck_id == truck_id && r.status != ServiceStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ServicePriority;
    use crate::seed;

    fn oil_change(truck_id: &str, tasks: &[&str]) -> NewServiceRequest {
        NewServiceRequest {
            truck_id: truck_id.to_string(),
            kind: "Oil Change".to_string(),
            priority: ServicePriority::High,
            description: "Scheduled service".to_string(),
            estimated_cost: 4500.0,
            expected_date: "2024-03-01".to_string(),
            tasks: tasks.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn checklist_drives_status_and_percentage() {
        let state = seed::state();
        let (state, request) = state
            .create_service_request(oil_change("t1", &["Drain oil", "Replace filter"]))
            .unwrap();
        assert_eq!(request.status, ServiceStatus::Pending);
        assert_eq!(request.completion_percent(), 0);

        let first = request.tasks[0].id.clone();
        let second = request.tasks[1].id.clone();

        let state = state.toggle_task(&request.id, &first).unwrap();
        let current = state.service_request(&request.id).unwrap();
        assert_eq!(current.status, ServiceStatus::InProgress);
        assert_eq!(current.completion_percent(), 50);

        let state = state.toggle_task(&request.id, &second).unwrap();
        let current = state.service_request(&request.id).unwrap();
        assert_eq!(current.status, ServiceStatus::Completed);
        assert_eq!(current.completion_percent(), 100);
        assert!(state.active_service_for("t1").is_none());

        let state = state.toggle_task(&request.id, &first).unwrap();
        let current = state.service_request(&request.id).unwrap();
        assert_eq!(current.status, ServiceStatus::InProgress);
        assert_eq!(current.completion_percent(), 50);
        assert!(state.active_service_for("t1").is_some());
    }

    #[test]
    fn percentage_rounds() {
        let state = seed::state();
        let (state, request) = state
            .create_service_request(oil_change("t2", &["a", "b", "c"]))
            .unwrap();
        let state = state
            .toggle_task(&request.id, &request.tasks[0].id)
            .unwrap();
        let current = state.service_request(&request.id).unwrap();
        assert_eq!(current.completion_percent(), 33);
    }

    #[test]
    fn empty_checklist_is_zero_percent() {
        let state = seed::state();
        let (_, request) = state
            .create_service_request(oil_change("t1", &[]))
            .unwrap();
        assert_eq!(request.completion_percent(), 0);
    }

    #[test]
    fn unknown_targets_are_rejected() {
        let state = seed::state();
        assert!(matches!(
            state.create_service_request(oil_change("t-missing", &["x"])),
            Err(FleetError::UnknownTruck(_))
        ));

        let (state, request) = state
            .create_service_request(oil_change("t1", &["x"]))
            .unwrap();
        assert!(matches!(
            state.toggle_task(&request.id, "task-missing"),
            Err(FleetError::UnknownTask(_))
        ));
        assert!(matches!(
            state.toggle_task("sr-missing", &request.tasks[0].id),
            Err(FleetError::UnknownServiceRequest(_))
        ));
    }
}
