use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::assignment::{ActingFor, AssignmentValidator};
use super::geo::{Coordinate, distance_km};
use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::{
    checkin::{CheckInRecord, CheckInRequest, IdField, NewCheckIn},
    client::Client,
    role::Role,
    user::TeamMember,
};
use crate::store::{ALREADY_CHECKED_IN, CheckInStore};

/// Default advisory radius around a client site.
pub const DEFAULT_WARNING_THRESHOLD_KM: f64 = 0.5;

/// Outcome of a committed check-in.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckInReceipt {
    pub id: u64,
    pub distance_from_client: f64,
    pub distance_warning: Option<String>,
}

pub struct CheckInService {
    store: Arc<dyn CheckInStore>,
    warning_threshold_km: f64,
}

impl CheckInService {
    pub fn new(store: Arc<dyn CheckInStore>, warning_threshold_km: f64) -> Self {
        Self {
            store,
            warning_threshold_km,
        }
    }

    /// Creates an open check-in for the acting employee.
    ///
    /// The active check-in lookup is only a fast path; the store rejects a
    /// second open record at insert time, which also yields `Conflict`.
    pub async fn submit_check_in(
        &self,
        requester: &AuthUser,
        request: CheckInRequest,
    ) -> Result<CheckInReceipt, AppError> {
        let client_id = request.client_id.as_ref().and_then(IdField::value);
        let (client_id, submitted) = match (client_id, request.latitude, request.longitude) {
            (Some(client_id), Some(latitude), Some(longitude)) => {
                (client_id, Coordinate::new(latitude, longitude))
            }
            _ => return Err(AppError::invalid("Client ID and location are required")),
        };
        if !submitted.is_valid() {
            return Err(AppError::invalid("Latitude or longitude out of range"));
        }

        // Blank or non-numeric employee ids count as missing.
        let employee_id = request.employee_id.as_ref().and_then(IdField::value);
        let acting = ActingFor::resolve(requester, employee_id)?;
        let employee_id = AssignmentValidator::new(self.store.as_ref())
            .authorize(acting, client_id)
            .await?;

        if self.store.find_active_checkin(employee_id).await?.is_some() {
            debug!(employee_id, "Active check-in already present");
            return Err(AppError::Conflict(ALREADY_CHECKED_IN.to_string()));
        }

        let site = self
            .store
            .find_client(client_id)
            .await?
            .as_ref()
            .and_then(Client::location)
            .ok_or_else(|| AppError::invalid("Client location not available"))?;

        let distance = distance_km(submitted, site);
        let distance_warning = self.distance_warning(distance);
        if distance_warning.is_some() {
            warn!(employee_id, client_id, distance, "Check-in far from client site");
        }

        let checkin = NewCheckIn {
            employee_id,
            client_id,
            latitude: submitted.latitude,
            longitude: submitted.longitude,
            distance_from_client: Some(distance),
            notes: request
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            checkin_time: Utc::now(),
        };
        let id = self.store.insert_checkin(&checkin).await?;

        info!(
            checkin_id = id,
            employee_id,
            client_id,
            acting_user = requester.user_id,
            "Checked in"
        );

        Ok(CheckInReceipt {
            id,
            distance_from_client: distance,
            distance_warning,
        })
    }

    pub async fn check_out(&self, employee_id: u64) -> Result<(), AppError> {
        if !self.store.checkout_active(employee_id, Utc::now()).await? {
            return Err(AppError::NotFound("No active check-in found".to_string()));
        }

        info!(employee_id, "Checked out");
        Ok(())
    }

    pub async fn active_check_in(
        &self,
        employee_id: u64,
    ) -> Result<Option<CheckInRecord>, AppError> {
        self.store.find_active_checkin(employee_id).await
    }

    pub async fn history(
        &self,
        employee_id: u64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<CheckInRecord>, AppError> {
        self.store.list_history(employee_id, start_date, end_date).await
    }

    /// Managers see every client their team is assigned to; employees their own.
    pub async fn clients_for(&self, requester: &AuthUser) -> Result<Vec<Client>, AppError> {
        match requester.role {
            Role::Manager => self.store.list_clients_for_team(requester.user_id).await,
            Role::Employee => self.store.list_clients_for_employee(requester.user_id).await,
        }
    }

    pub async fn team(&self, requester: &AuthUser) -> Result<Vec<TeamMember>, AppError> {
        requester.require_manager()?;
        self.store.list_team(requester.user_id).await
    }

    fn distance_warning(&self, distance: f64) -> Option<String> {
        (distance > self.warning_threshold_km).then(|| {
            format!("You are {distance:.2} km away from the client location")
        })
    }
}
