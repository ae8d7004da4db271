use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::AppError;
use crate::model::{
    checkin::{CheckInRecord, NewCheckIn},
    client::Client,
    user::TeamMember,
};

#[cfg(test)]
pub mod memory;
pub mod mysql;

/// Persistence operations the check-in core depends on.
///
/// Implementations must reject `insert_checkin` with `AppError::Conflict`
/// when the employee already has an open check-in, at commit time.
#[async_trait]
pub trait CheckInStore: Send + Sync {
    async fn is_assigned(&self, employee_id: u64, client_id: u64) -> Result<bool, AppError>;
    async fn is_direct_report(&self, manager_id: u64, employee_id: u64) -> Result<bool, AppError>;
    async fn find_client(&self, id: u64) -> Result<Option<Client>, AppError>;
    async fn find_active_checkin(
        &self,
        employee_id: u64,
    ) -> Result<Option<CheckInRecord>, AppError>;
    async fn insert_checkin(&self, checkin: &NewCheckIn) -> Result<u64, AppError>;
    /// Closes the most recent open check-in. Returns false if there was none.
    async fn checkout_active(&self, employee_id: u64, at: DateTime<Utc>) -> Result<bool, AppError>;
    async fn list_history(
        &self,
        employee_id: u64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<CheckInRecord>, AppError>;
    async fn list_clients_for_employee(&self, employee_id: u64) -> Result<Vec<Client>, AppError>;
    async fn list_clients_for_team(&self, manager_id: u64) -> Result<Vec<Client>, AppError>;
    async fn list_team(&self, manager_id: u64) -> Result<Vec<TeamMember>, AppError>;
}

pub(crate) const ALREADY_CHECKED_IN: &str = "Employee already has an active check-in";
