use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::role::Role;
use crate::store::CheckInStore;

/// Whose check-in a request creates.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActingFor {
    /// An employee checking in for themselves.
    Own(u64),
    /// A manager checking in on behalf of a team member.
    DirectReport { manager_id: u64, employee_id: u64 },
}

impl ActingFor {
    /// Employees always act for themselves; any `employee_id` they send is ignored.
    /// Managers must name the employee.
    pub fn resolve(requester: &AuthUser, employee_id: Option<u64>) -> Result<Self, AppError> {
        match (requester.role, employee_id) {
            (Role::Employee, _) => Ok(ActingFor::Own(requester.user_id)),
            (Role::Manager, Some(employee_id)) => Ok(ActingFor::DirectReport {
                manager_id: requester.user_id,
                employee_id,
            }),
            (Role::Manager, None) => Err(AppError::invalid("employee_id is required for managers")),
        }
    }

    pub fn employee_id(&self) -> u64 {
        match *self {
            ActingFor::Own(id) => id,
            ActingFor::DirectReport { employee_id, .. } => employee_id,
        }
    }
}

/// Reads assignment and reporting lines straight from the store on every call.
pub struct AssignmentValidator<'a> {
    store: &'a dyn CheckInStore,
}

impl<'a> AssignmentValidator<'a> {
    pub fn new(store: &'a dyn CheckInStore) -> Self {
        Self { store }
    }

    pub async fn is_assigned(&self, employee_id: u64, client_id: u64) -> Result<bool, AppError> {
        self.store.is_assigned(employee_id, client_id).await
    }

    pub async fn is_direct_report(
        &self,
        manager_id: u64,
        employee_id: u64,
    ) -> Result<bool, AppError> {
        self.store.is_direct_report(manager_id, employee_id).await
    }

    /// Returns the employee the check-in will be attributed to.
    pub async fn authorize(&self, acting: ActingFor, client_id: u64) -> Result<u64, AppError> {
        if let ActingFor::DirectReport {
            manager_id,
            employee_id,
        } = acting
        {
            if !self.is_direct_report(manager_id, employee_id).await? {
                return Err(AppError::forbidden("Employee does not belong to your team"));
            }
        }

        let employee_id = acting.employee_id();
        if !self.is_assigned(employee_id, client_id).await? {
            return Err(AppError::forbidden("Employee is not assigned to this client"));
        }

        Ok(employee_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn user(user_id: u64, role: Role) -> AuthUser {
        AuthUser {
            user_id,
            name: format!("user-{user_id}"),
            role,
        }
    }

    #[test]
    fn employee_acts_for_self_even_with_employee_id() {
        let acting = ActingFor::resolve(&user(2, Role::Employee), Some(99)).unwrap();
        assert_eq!(acting, ActingFor::Own(2));
        assert_eq!(acting.employee_id(), 2);
    }

    #[test]
    fn manager_must_name_employee() {
        let err = ActingFor::resolve(&user(1, Role::Manager), None).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));

        let acting = ActingFor::resolve(&user(1, Role::Manager), Some(2)).unwrap();
        assert_eq!(acting.employee_id(), 2);
    }

    #[actix_web::test]
    async fn rejects_manager_outside_reporting_line() {
        let store = MemoryStore::new();
        store.add_user(1, "Meera", None);
        store.add_user(5, "Other", None);
        store.add_user(2, "Asha", Some(1));
        store.add_client(10, "Acme", None);
        store.assign(2, 10);

        let validator = AssignmentValidator::new(&store);
        let err = validator
            .authorize(
                ActingFor::DirectReport {
                    manager_id: 5,
                    employee_id: 2,
                },
                10,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let employee = validator
            .authorize(
                ActingFor::DirectReport {
                    manager_id: 1,
                    employee_id: 2,
                },
                10,
            )
            .await
            .unwrap();
        assert_eq!(employee, 2);
    }

    #[actix_web::test]
    async fn assignment_changes_apply_immediately() {
        let store = MemoryStore::new();
        store.add_user(2, "Asha", None);
        store.add_client(10, "Acme", None);

        let validator = AssignmentValidator::new(&store);
        assert!(!validator.is_assigned(2, 10).await.unwrap());

        store.assign(2, 10);
        assert_eq!(validator.authorize(ActingFor::Own(2), 10).await.unwrap(), 2);

        store.unassign(2, 10);
        let err = validator.authorize(ActingFor::Own(2), 10).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
