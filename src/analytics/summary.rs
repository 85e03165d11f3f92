//! Calendar-month roll-up across classes, rendered as a short narrative and
//! appended to the activity log.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use tracing::{error, info};
use utoipa::ToSchema;

use super::aggregator::{aggregate, defaulters, Tally, ZeroSessionPolicy};
use crate::store::{Store, StoreResult};

/// Threshold the summary counts defaulters against, independent of request
/// or configured defaults.
pub const SUMMARY_THRESHOLD: u8 = 75;

const EXCELLENT_FROM: u8 = 85;
const SATISFACTORY_FROM: u8 = 75;
const LOG_EXCERPT_CHARS: usize = 200;

/// A `YYYY-MM` month with its first and last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportMonth {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl ReportMonth {
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        let shaped = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes.iter().enumerate().all(|(i, b)| i == 4 || b.is_ascii_digit());
        if !shaped {
            return None;
        }
        let first = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").ok()?;
        let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
        Some(Self { first, last })
    }

    pub fn label(&self) -> String {
        self.first.format("%B %Y").to_string()
    }

    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.first.year(), self.first.month())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceTier {
    Excellent,
    Satisfactory,
    NeedsAttention,
}

impl AttendanceTier {
    pub fn of(average: u8) -> Self {
        if average >= EXCELLENT_FROM {
            AttendanceTier::Excellent
        } else if average >= SATISFACTORY_FROM {
            AttendanceTier::Satisfactory
        } else {
            AttendanceTier::NeedsAttention
        }
    }

    pub fn sentence(self) -> &'static str {
        match self {
            AttendanceTier::Excellent => "Overall attendance performance is excellent. Keep up the good work!",
            AttendanceTier::Satisfactory => {
                "Attendance performance is satisfactory but there's room for improvement."
            }
            AttendanceTier::NeedsAttention => {
                "Attendance performance needs immediate attention. Consider implementing measures to improve student attendance."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ClassStat {
    pub class_id: u64,
    #[schema(example = "SE A")]
    pub class_name: String,
    pub sessions: usize,
    pub average_attendance: u8,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlySummary {
    #[schema(example = "2024-03")]
    pub month: String,
    pub summary: String,
    pub total_sessions: usize,
    pub average_attendance: u8,
    pub defaulter_count: usize,
    pub tier: AttendanceTier,
    /// Best class first.
    pub class_stats: Vec<ClassStat>,
    #[schema(nullable = true)]
    pub activity_log_id: Option<u64>,
}

/// Builds the narrative. Best/worst sentence only when the top and bottom
/// classes differ.
fn render(
    month: &ReportMonth,
    total_sessions: usize,
    average: u8,
    class_stats: &[ClassStat],
    defaulter_count: usize,
    tier: AttendanceTier,
) -> String {
    let mut text = format!("Monthly Summary for {}:\n\n", month.label());
    text.push_str(&format!(
        "A total of {} attendance sessions were conducted during this month, \
         with an overall average attendance of {}%. ",
        total_sessions, average
    ));

    if let (Some(best), Some(worst)) = (class_stats.first(), class_stats.last()) {
        if best.class_id != worst.class_id {
            text.push_str(&format!(
                "{} showed the highest attendance at {}%, while {} had the lowest at {}%. ",
                best.class_name, best.average_attendance, worst.class_name, worst.average_attendance
            ));
        }
    }

    text.push_str(&format!(
        "\n\nThere are currently {} students below the {}% attendance threshold \
         who require attention and counseling. ",
        defaulter_count, SUMMARY_THRESHOLD
    ));
    text.push_str(tier.sentence());
    text
}

pub async fn monthly_summary(
    store: &dyn Store,
    month: ReportMonth,
    class_id: Option<u64>,
    policy: ZeroSessionPolicy,
) -> StoreResult<MonthlySummary> {
    info!(month = %month.key(), ?class_id, "Generating monthly summary");

    let sessions = store.sessions_between(class_id, month.first, month.last).await?;
    let session_ids: Vec<u64> = sessions.iter().map(|s| s.id).collect();
    let records = if session_ids.is_empty() {
        Vec::new()
    } else {
        store.records_for_sessions(&session_ids).await?
    };

    let overall = Tally::from_records(&records);
    let average = overall.percentage().unwrap_or(0);

    // class_id -> (sessions, tally)
    let session_class: BTreeMap<u64, u64> = sessions.iter().map(|s| (s.id, s.class_id)).collect();
    let mut per_class: BTreeMap<u64, (usize, Tally)> = BTreeMap::new();
    for s in &sessions {
        per_class.entry(s.class_id).or_default().0 += 1;
    }
    for r in &records {
        if let Some(entry) = session_class.get(&r.session_id).and_then(|c| per_class.get_mut(c)) {
            entry.1.record(r.status);
        }
    }

    let class_ids: Vec<u64> = per_class.keys().copied().collect();
    let labels = store.class_labels(&class_ids).await?;
    let mut class_stats: Vec<ClassStat> = per_class
        .into_iter()
        .map(|(id, (count, tally))| ClassStat {
            class_id: id,
            class_name: labels.get(&id).cloned().unwrap_or_else(|| format!("Class {}", id)),
            sessions: count,
            average_attendance: tally.percentage().unwrap_or(0),
        })
        .collect();
    class_stats.sort_by(|a, b| b.average_attendance.cmp(&a.average_attendance));

    let defaulter_count = if sessions.is_empty() {
        0
    } else {
        // only classes that held a session this month are judged
        let students: Vec<_> = store
            .active_students(class_id)
            .await?
            .into_iter()
            .filter(|s| class_ids.contains(&s.class_id))
            .collect();
        defaulters(&aggregate(&students, &records), SUMMARY_THRESHOLD, policy).len()
    };

    let tier = AttendanceTier::of(average);
    let summary = render(&month, sessions.len(), average, &class_stats, defaulter_count, tier);

    let excerpt: String = summary.chars().take(LOG_EXCERPT_CHARS).collect();
    let activity_log_id = match store
        .insert_activity(&format!("Monthly Summary ({}): {}...", month.key(), excerpt))
        .await
    {
        Ok(id) => Some(id),
        Err(e) => {
            error!(error = %e, "Failed to write summary to activity log");
            None
        }
    };

    Ok(MonthlySummary {
        month: month.key(),
        summary,
        total_sessions: sessions.len(),
        average_attendance: average,
        defaulter_count,
        tier,
        class_stats,
        activity_log_id,
    })
}
