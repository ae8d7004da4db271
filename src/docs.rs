use crate::api::checkin::HistoryQuery;
use crate::model::checkin::{CheckInRecord, CheckInRequest, CheckInStatus};
use crate::model::client::Client;
use crate::model::role::Role;
use crate::model::user::TeamMember;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracker API",
        version = "0.1.0",
        description = r#"
## Field Attendance Tracker

Employees check in and out at the client sites they are assigned to, with the
submitted location compared against the client's registered coordinate.
Managers can check in on behalf of their direct reports and see their team.

### Rules
- One active check-in per employee at a time
- Check-ins require an employee-client assignment
- Check-ins more than 0.5 km from the client carry a `distance_warning` (advisory only)

### Security
All `/api` endpoints require a **JWT Bearer** token carrying the user's id and role.

### Response Format
`{"success": true, ...}` on success, `{"success": false, "message": "..."}` on error.
"#,
    ),
    paths(
        crate::api::checkin::list_clients,
        crate::api::checkin::check_in,
        crate::api::checkin::check_out,
        crate::api::checkin::active,
        crate::api::checkin::history,

        crate::api::user::team
    ),
    components(
        schemas(
            CheckInRequest,
            CheckInRecord,
            CheckInStatus,
            Client,
            TeamMember,
            Role,
            HistoryQuery
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Check-in", description = "Check-in lifecycle APIs"),
        (name = "Users", description = "Team APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
