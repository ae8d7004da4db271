use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeSet;
use std::sync::Mutex;

use super::{ALREADY_CHECKED_IN, CheckInStore};
use crate::error::AppError;
use crate::model::{
    checkin::{CheckInRecord, CheckInStatus, NewCheckIn},
    client::Client,
    user::TeamMember,
};

struct UserRow {
    id: u64,
    name: String,
    email: String,
    manager_id: Option<u64>,
}

struct CheckInRow {
    id: u64,
    checkin: NewCheckIn,
    status: CheckInStatus,
    checkout_time: Option<DateTime<Utc>>,
}

impl CheckInRow {
    fn is_open_for(&self, employee_id: u64) -> bool {
        self.checkin.employee_id == employee_id && self.status == CheckInStatus::CheckedIn
    }
}

#[derive(Default)]
struct Tables {
    users: Vec<UserRow>,
    clients: Vec<Client>,
    assignments: BTreeSet<(u64, u64)>,
    checkins: Vec<CheckInRow>,
}

/// Store backed by process memory, with the same one-open-check-in
/// guarantee as the MySQL unique key.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, id: u64, name: &str, manager_id: Option<u64>) {
        self.tables.lock().unwrap().users.push(UserRow {
            id,
            name: name.to_string(),
            email: format!("{}@company.com", name.to_lowercase()),
            manager_id,
        });
    }

    pub fn add_client(&self, id: u64, name: &str, location: Option<(f64, f64)>) {
        self.tables.lock().unwrap().clients.push(Client {
            id,
            name: name.to_string(),
            address: None,
            latitude: location.map(|(lat, _)| lat),
            longitude: location.map(|(_, lon)| lon),
        });
    }

    pub fn assign(&self, employee_id: u64, client_id: u64) {
        self.tables
            .lock()
            .unwrap()
            .assignments
            .insert((employee_id, client_id));
    }

    pub fn unassign(&self, employee_id: u64, client_id: u64) {
        self.tables
            .lock()
            .unwrap()
            .assignments
            .remove(&(employee_id, client_id));
    }

    pub fn open_count(&self, employee_id: u64) -> usize {
        self.tables
            .lock()
            .unwrap()
            .checkins
            .iter()
            .filter(|r| r.is_open_for(employee_id))
            .count()
    }

    pub fn checkin_count(&self) -> usize {
        self.tables.lock().unwrap().checkins.len()
    }
}

impl Tables {
    fn record(&self, row: &CheckInRow) -> CheckInRecord {
        let client = self.clients.iter().find(|c| c.id == row.checkin.client_id);
        CheckInRecord {
            id: row.id,
            employee_id: row.checkin.employee_id,
            client_id: row.checkin.client_id,
            client_name: client.map(|c| c.name.clone()).unwrap_or_default(),
            client_address: client.and_then(|c| c.address.clone()),
            latitude: row.checkin.latitude,
            longitude: row.checkin.longitude,
            distance_from_client: row.checkin.distance_from_client,
            notes: row.checkin.notes.clone(),
            status: row.status,
            checkin_time: row.checkin.checkin_time,
            checkout_time: row.checkout_time,
        }
    }

    fn latest_open(&self, employee_id: u64) -> Option<&CheckInRow> {
        self.checkins
            .iter()
            .filter(|r| r.is_open_for(employee_id))
            .max_by_key(|r| (r.checkin.checkin_time, r.id))
    }

    fn latest_open_mut(&mut self, employee_id: u64) -> Option<&mut CheckInRow> {
        self.checkins
            .iter_mut()
            .filter(|r| r.is_open_for(employee_id))
            .max_by_key(|r| (r.checkin.checkin_time, r.id))
    }
}

#[async_trait]
impl CheckInStore for MemoryStore {
    async fn is_assigned(&self, employee_id: u64, client_id: u64) -> Result<bool, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.assignments.contains(&(employee_id, client_id)))
    }

    async fn is_direct_report(&self, manager_id: u64, employee_id: u64) -> Result<bool, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .any(|u| u.id == employee_id && u.manager_id == Some(manager_id)))
    }

    async fn find_client(&self, id: u64) -> Result<Option<Client>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.clients.iter().find(|c| c.id == id).cloned())
    }

    async fn find_active_checkin(
        &self,
        employee_id: u64,
    ) -> Result<Option<CheckInRecord>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.latest_open(employee_id).map(|r| tables.record(r)))
    }

    async fn insert_checkin(&self, checkin: &NewCheckIn) -> Result<u64, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.latest_open(checkin.employee_id).is_some() {
            return Err(AppError::Conflict(ALREADY_CHECKED_IN.to_string()));
        }

        let id = tables.checkins.len() as u64 + 1;
        tables.checkins.push(CheckInRow {
            id,
            checkin: checkin.clone(),
            status: CheckInStatus::CheckedIn,
            checkout_time: None,
        });
        Ok(id)
    }

    async fn checkout_active(&self, employee_id: u64, at: DateTime<Utc>) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        match tables.latest_open_mut(employee_id) {
            Some(row) => {
                row.status = CheckInStatus::CheckedOut;
                row.checkout_time = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_history(
        &self,
        employee_id: u64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<CheckInRecord>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<&CheckInRow> = tables
            .checkins
            .iter()
            .filter(|r| r.checkin.employee_id == employee_id)
            .filter(|r| {
                let day = r.checkin.checkin_time.date_naive();
                start_date.is_none_or(|s| day >= s) && end_date.is_none_or(|e| day <= e)
            })
            .collect();
        rows.sort_by_key(|r| std::cmp::Reverse((r.checkin.checkin_time, r.id)));

        Ok(rows.into_iter().map(|r| tables.record(r)).collect())
    }

    async fn list_clients_for_employee(&self, employee_id: u64) -> Result<Vec<Client>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut clients: Vec<Client> = tables
            .clients
            .iter()
            .filter(|c| tables.assignments.contains(&(employee_id, c.id)))
            .cloned()
            .collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    async fn list_clients_for_team(&self, manager_id: u64) -> Result<Vec<Client>, AppError> {
        let tables = self.tables.lock().unwrap();
        let team: Vec<u64> = tables
            .users
            .iter()
            .filter(|u| u.manager_id == Some(manager_id))
            .map(|u| u.id)
            .collect();
        let mut clients: Vec<Client> = tables
            .clients
            .iter()
            .filter(|c| team.iter().any(|e| tables.assignments.contains(&(*e, c.id))))
            .cloned()
            .collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    async fn list_team(&self, manager_id: u64) -> Result<Vec<TeamMember>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut team: Vec<TeamMember> = tables
            .users
            .iter()
            .filter(|u| u.manager_id == Some(manager_id))
            .map(|u| TeamMember {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
            })
            .collect();
        team.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_checkin(employee_id: u64) -> NewCheckIn {
        NewCheckIn {
            employee_id,
            client_id: 1,
            latitude: 28.46,
            longitude: 77.03,
            distance_from_client: Some(0.0),
            notes: None,
            checkin_time: Utc::now(),
        }
    }

    #[actix_web::test]
    async fn second_open_insert_is_rejected_at_commit() {
        let store = MemoryStore::new();
        store.add_client(1, "Acme", Some((28.46, 77.03)));

        store.insert_checkin(&new_checkin(7)).await.unwrap();
        let err = store.insert_checkin(&new_checkin(7)).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.open_count(7), 1);
        assert_eq!(store.checkin_count(), 1);

        // Other employees are unaffected.
        store.insert_checkin(&new_checkin(8)).await.unwrap();
        assert_eq!(store.open_count(8), 1);
    }

    #[actix_web::test]
    async fn reopens_after_checkout() {
        let store = MemoryStore::new();
        store.add_client(1, "Acme", None);

        store.insert_checkin(&new_checkin(7)).await.unwrap();
        assert!(store.checkout_active(7, Utc::now()).await.unwrap());
        assert!(!store.checkout_active(7, Utc::now()).await.unwrap());
        store.insert_checkin(&new_checkin(7)).await.unwrap();

        assert_eq!(store.open_count(7), 1);
        assert_eq!(store.checkin_count(), 2);
    }
}
