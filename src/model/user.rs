use serde::Serialize;
use utoipa::ToSchema;

/// Direct report as listed to a manager.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct TeamMember {
    #[schema(example = 2)]
    pub id: u64,
    #[schema(example = "Asha Verma")]
    pub name: String,
    #[schema(example = "asha@company.com")]
    pub email: String,
}
