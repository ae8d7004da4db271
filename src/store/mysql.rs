use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};
use std::str::FromStr;
use tracing::error;

use super::{ALREADY_CHECKED_IN, CheckInStore};
use crate::error::AppError;
use crate::model::{
    checkin::{CheckInRecord, CheckInStatus, NewCheckIn},
    client::Client,
    user::TeamMember,
};

const CHECKIN_COLUMNS: &str = r#"
    ch.id, ch.employee_id, ch.client_id,
    c.name AS client_name, c.address AS client_address,
    ch.latitude, ch.longitude, ch.distance_from_client, ch.notes,
    ch.status, ch.checkin_time, ch.checkout_time
"#;

#[derive(FromRow)]
struct CheckInRow {
    id: u64,
    employee_id: u64,
    client_id: u64,
    client_name: String,
    client_address: Option<String>,
    latitude: f64,
    longitude: f64,
    distance_from_client: Option<f64>,
    notes: Option<String>,
    status: String,
    checkin_time: DateTime<Utc>,
    checkout_time: Option<DateTime<Utc>>,
}

impl TryFrom<CheckInRow> for CheckInRecord {
    type Error = AppError;

    fn try_from(row: CheckInRow) -> Result<Self, Self::Error> {
        let status = CheckInStatus::from_str(&row.status).map_err(|_| {
            error!(checkin_id = row.id, status = %row.status, "Unknown check-in status");
            AppError::Internal
        })?;

        Ok(CheckInRecord {
            id: row.id,
            employee_id: row.employee_id,
            client_id: row.client_id,
            client_name: row.client_name,
            client_address: row.client_address,
            latitude: row.latitude,
            longitude: row.longitude,
            distance_from_client: row.distance_from_client,
            notes: row.notes,
            status,
            checkin_time: row.checkin_time,
            checkout_time: row.checkout_time,
        })
    }
}

pub struct MySqlCheckInStore {
    pool: MySqlPool,
}

impl MySqlCheckInStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckInStore for MySqlCheckInStore {
    async fn is_assigned(&self, employee_id: u64, client_id: u64) -> Result<bool, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM employee_clients WHERE employee_id = ? AND client_id = ?",
        )
        .bind(employee_id)
        .bind(client_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn is_direct_report(&self, manager_id: u64, employee_id: u64) -> Result<bool, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE id = ? AND manager_id = ?",
        )
        .bind(employee_id)
        .bind(manager_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn find_client(&self, id: u64) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<_, Client>(
            "SELECT id, name, address, latitude, longitude FROM clients WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    async fn find_active_checkin(
        &self,
        employee_id: u64,
    ) -> Result<Option<CheckInRecord>, AppError> {
        let sql = format!(
            r#"
            SELECT {CHECKIN_COLUMNS}
            FROM checkins ch
            INNER JOIN clients c ON ch.client_id = c.id
            WHERE ch.employee_id = ? AND ch.status = 'checked_in'
            ORDER BY ch.checkin_time DESC, ch.id DESC
            LIMIT 1
            "#
        );

        sqlx::query_as::<_, CheckInRow>(&sql)
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?
            .map(CheckInRecord::try_from)
            .transpose()
    }

    async fn insert_checkin(&self, checkin: &NewCheckIn) -> Result<u64, AppError> {
        // uq_checkins_one_open rejects a second open row for the same employee.
        let result = sqlx::query(
            r#"
            INSERT INTO checkins
                (employee_id, client_id, latitude, longitude, distance_from_client,
                 notes, status, checkin_time)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(checkin.employee_id)
        .bind(checkin.client_id)
        .bind(checkin.latitude)
        .bind(checkin.longitude)
        .bind(checkin.distance_from_client)
        .bind(checkin.notes.as_deref())
        .bind(CheckInStatus::CheckedIn.to_string())
        .bind(checkin.checkin_time)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.last_insert_id()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::Conflict(ALREADY_CHECKED_IN.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn checkout_active(&self, employee_id: u64, at: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE checkins
            SET checkout_time = ?, status = 'checked_out'
            WHERE employee_id = ?
            AND status = 'checked_in'
            ORDER BY checkin_time DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(at)
        .bind(employee_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_history(
        &self,
        employee_id: u64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<CheckInRecord>, AppError> {
        let mut sql = format!(
            r#"
            SELECT {CHECKIN_COLUMNS}
            FROM checkins ch
            INNER JOIN clients c ON ch.client_id = c.id
            WHERE ch.employee_id = ?
            "#
        );

        if start_date.is_some() {
            sql.push_str(" AND DATE(ch.checkin_time) >= ?");
        }
        if end_date.is_some() {
            sql.push_str(" AND DATE(ch.checkin_time) <= ?");
        }
        sql.push_str(" ORDER BY ch.checkin_time DESC, ch.id DESC");

        let mut query = sqlx::query_as::<_, CheckInRow>(&sql).bind(employee_id);
        for date in [start_date, end_date].into_iter().flatten() {
            query = query.bind(date);
        }

        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(CheckInRecord::try_from)
            .collect()
    }

    async fn list_clients_for_employee(&self, employee_id: u64) -> Result<Vec<Client>, AppError> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT c.id, c.name, c.address, c.latitude, c.longitude
            FROM clients c
            INNER JOIN employee_clients ec ON c.id = ec.client_id
            WHERE ec.employee_id = ?
            ORDER BY c.name
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    async fn list_clients_for_team(&self, manager_id: u64) -> Result<Vec<Client>, AppError> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT DISTINCT c.id, c.name, c.address, c.latitude, c.longitude
            FROM clients c
            INNER JOIN employee_clients ec ON c.id = ec.client_id
            INNER JOIN users u ON ec.employee_id = u.id
            WHERE u.manager_id = ?
            ORDER BY c.name
            "#,
        )
        .bind(manager_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    async fn list_team(&self, manager_id: u64) -> Result<Vec<TeamMember>, AppError> {
        let team = sqlx::query_as::<_, TeamMember>(
            "SELECT id, name, email FROM users WHERE manager_id = ? ORDER BY name",
        )
        .bind(manager_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(team)
    }
}
