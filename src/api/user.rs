use crate::{auth::auth::AuthUser, error::AppError, service::checkin::CheckInService};
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

/// Direct reports of the calling manager
#[utoipa::path(
    get,
    path = "/api/users/team",
    responses(
        (status = 200, description = "Team members", body = Object, example = json!({
            "success": true,
            "data": [{"id": 2, "name": "Asha Verma", "email": "asha@company.com"}]
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Managers only"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn team(
    auth: AuthUser,
    service: web::Data<CheckInService>,
) -> Result<impl Responder, AppError> {
    let members = service.team(&auth).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": members })))
}
