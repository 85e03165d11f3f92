use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An active faculty member as seen by substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FacultyMember {
    #[schema(example = 12)]
    pub id: u64,
    #[schema(example = "A. Sharma")]
    pub name: String,
    #[schema(example = "Computer Engineering", nullable = true)]
    pub department: Option<String>,
}
