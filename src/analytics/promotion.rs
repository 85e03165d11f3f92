use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use super::aggregator::{aggregate, rounded_percentage};
use crate::store::{Store, StoreResult};

pub const LOW_ATTENDANCE: &str = "Low attendance - consider YD";
pub const DEFAULT_THRESHOLD: u8 = 75;

/// Percentage assumed for a student with no attendance history.
const NO_HISTORY_PERCENTAGE: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PromotionCandidate {
    pub student_id: u64,
    #[schema(nullable = true)]
    pub roll_no: Option<u32>,
    pub name: String,
    #[schema(nullable = true)]
    pub enrollment_no: Option<String>,
    /// Position in the promoted class, 1-based.
    pub new_roll_no: u32,
    pub percentage: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Active students of `class_id` in roll order, each with a new roll number
/// and a lifetime attendance figure.
pub async fn promotion_candidates(
    store: &dyn Store,
    class_id: u64,
    threshold: u8,
) -> StoreResult<Vec<PromotionCandidate>> {
    let students = store.active_students(Some(class_id)).await?;
    if students.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<u64> = students.iter().map(|s| s.id).collect();
    let records = store.records_for_students(&ids).await?;
    let rows = aggregate(&students, &records);

    let candidates: Vec<PromotionCandidate> = rows
        .into_iter()
        .zip(1u32..)
        .map(|(row, new_roll_no)| {
            let percentage = rounded_percentage(row.tally.present, row.tally.total).unwrap_or(NO_HISTORY_PERCENTAGE);
            PromotionCandidate {
                student_id: row.student.id,
                roll_no: row.student.roll_no,
                name: row.student.name,
                enrollment_no: row.student.enrollment_no,
                new_roll_no,
                percentage,
                suggestion: (percentage < threshold).then(|| LOW_ATTENDANCE.to_string()),
            }
        })
        .collect();

    let flagged = candidates.iter().filter(|c| c.suggestion.is_some()).count();
    info!(class_id, students = candidates.len(), flagged, "Promotion candidates computed");
    Ok(candidates)
}
