use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::checkin::CheckInRequest,
    service::checkin::CheckInService,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct HistoryQuery {
    /// Earliest check-in date, inclusive (YYYY-MM-DD)
    #[schema(example = "2026-01-01")]
    pub start_date: Option<String>,
    /// Latest check-in date, inclusive (YYYY-MM-DD)
    #[schema(example = "2026-01-31")]
    pub end_date: Option<String>,
}

fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::invalid(format!("{field} must be a date (YYYY-MM-DD)"))),
    }
}

/// Clients the caller may check in at
#[utoipa::path(
    get,
    path = "/api/checkin/clients",
    responses(
        (status = 200, description = "Managers get their team's clients, employees their own", body = Object, example = json!({
            "success": true,
            "data": [{"id": 1, "name": "Acme Logistics", "address": "Sector 44, Gurugram", "latitude": 28.4595, "longitude": 77.0266}]
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Check-in"
)]
pub async fn list_clients(
    auth: AuthUser,
    service: web::Data<CheckInService>,
) -> Result<impl Responder, AppError> {
    let clients = service.clients_for(&auth).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": clients })))
}

/// Check in at a client site
#[utoipa::path(
    post,
    path = "/api/checkin",
    request_body(
        content = CheckInRequest,
        description = "Check-in payload. Managers must supply employee_id.",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Checked in", body = Object, example = json!({
            "success": true,
            "message": "Checked in successfully",
            "id": 12,
            "distance_from_client": 4.45,
            "distance_warning": "You are 4.45 km away from the client location"
        })),
        (status = 400, description = "Missing fields or client location not available", body = Object, example = json!({
            "success": false,
            "message": "Client ID and location are required"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not assigned to this client, or not your team", body = Object, example = json!({
            "success": false,
            "message": "Employee is not assigned to this client"
        })),
        (status = 409, description = "Employee already has an active check-in", body = Object, example = json!({
            "success": false,
            "message": "Employee already has an active check-in"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Check-in"
)]
#[instrument(
    name = "checkin_submit",
    skip(auth, service, payload),
    fields(user_id = auth.user_id, role = %auth.role)
)]
pub async fn check_in(
    auth: AuthUser,
    service: web::Data<CheckInService>,
    payload: web::Json<CheckInRequest>,
) -> Result<impl Responder, AppError> {
    let receipt = service.submit_check_in(&auth, payload.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Checked in successfully",
        "id": receipt.id,
        "distance_from_client": receipt.distance_from_client,
        "distance_warning": receipt.distance_warning
    })))
}

/// Check out of the caller's active check-in
#[utoipa::path(
    put,
    path = "/api/checkin/checkout",
    responses(
        (status = 200, description = "Checked out", body = Object, example = json!({
            "success": true,
            "message": "Checked out successfully"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No active check-in", body = Object, example = json!({
            "success": false,
            "message": "No active check-in found"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Check-in"
)]
#[instrument(name = "checkin_checkout", skip(auth, service), fields(user_id = auth.user_id))]
pub async fn check_out(
    auth: AuthUser,
    service: web::Data<CheckInService>,
) -> Result<impl Responder, AppError> {
    service.check_out(auth.user_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Checked out successfully"
    })))
}

/// The caller's active check-in, or null
#[utoipa::path(
    get,
    path = "/api/checkin/active",
    responses(
        (status = 200, description = "Active check-in or null", body = Object, example = json!({
            "success": true,
            "data": null
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Check-in"
)]
pub async fn active(
    auth: AuthUser,
    service: web::Data<CheckInService>,
) -> Result<impl Responder, AppError> {
    let record = service.active_check_in(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": record })))
}

/// The caller's check-in history, newest first
#[utoipa::path(
    get,
    path = "/api/checkin/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Check-in history", body = Object, example = json!({
            "success": true,
            "data": []
        })),
        (status = 400, description = "Malformed date"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Check-in"
)]
pub async fn history(
    auth: AuthUser,
    service: web::Data<CheckInService>,
    query: web::Query<HistoryQuery>,
) -> Result<impl Responder, AppError> {
    let start_date = parse_date("start_date", query.start_date.as_deref())?;
    let end_date = parse_date("end_date", query.end_date.as_deref())?;

    let records = service.history(auth.user_id, start_date, end_date).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": records })))
}
