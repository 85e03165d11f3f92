use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use super::availability::{AvailabilityIndex, without};
use super::ranker::{RankContext, Tier, pick};
use crate::model::{
    substitution::{AssignmentStatus, AssignmentType, NewSubstitution},
    timetable::{DayOfWeek, LeaveWindow, SlotDetail},
};
use crate::store::{Store, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AssignedSlot {
    #[schema(example = 41)]
    pub slot_id: u64,
    #[schema(example = 31)]
    pub sub_faculty_id: u64,
    #[schema(example = "A. Sharma")]
    pub sub_faculty_name: String,
    pub tier: Tier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    /// Everybody was busy or there is no other active faculty.
    NoCandidate,
    /// A store call for this slot failed, usually the assignment insert.
    StoreFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct SkippedSlot {
    #[schema(example = 42)]
    pub slot_id: u64,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignOutcome {
    pub assigned: Vec<AssignedSlot>,
    pub skipped: Vec<SkippedSlot>,
    /// Number of slots the window covered.
    pub affected: usize,
}

impl AssignOutcome {
    pub fn message(&self) -> String {
        if self.affected == 0 {
            "No slots found for the given criteria".to_string()
        } else {
            format!(
                "Assigned {} substitutes, skipped {} slots",
                self.assigned.len(),
                self.skipped.len()
            )
        }
    }
}

/// Finds cover for every lecture a faculty member misses during a leave.
///
/// The busy check reads only the timetable and the insert follows it with no
/// lock, so a second run for the same leave, concurrent or not, can hand the
/// same free faculty member another lecture at the same hour.
pub struct SubstitutionAssigner<'a> {
    store: &'a dyn Store,
    half_day_boundary: NaiveTime,
}

enum SlotResult {
    Assigned(AssignedSlot),
    Skipped(SkipReason),
}

impl<'a> SubstitutionAssigner<'a> {
    pub fn new(store: &'a dyn Store, half_day_boundary: NaiveTime) -> Self {
        Self {
            store,
            half_day_boundary,
        }
    }

    /// Runs the whole batch. Per-slot problems land in `skipped`; only an
    /// unreachable store ends the run early with an error.
    pub async fn assign(
        &self,
        faculty_id: u64,
        date: NaiveDate,
        window: LeaveWindow,
    ) -> StoreResult<AssignOutcome> {
        let day = DayOfWeek::from(date);
        info!(faculty_id, %date, %day, %window, "Processing substitute assignment");

        let slots: Vec<SlotDetail> = self
            .store
            .faculty_slots_on(faculty_id, day, date)
            .await?
            .into_iter()
            .filter(|d| window.covers(d.slot.start_time, self.half_day_boundary))
            .collect();

        let mut outcome = AssignOutcome {
            affected: slots.len(),
            ..Default::default()
        };
        if slots.is_empty() {
            info!(faculty_id, %date, "No affected slots");
            return Ok(outcome);
        }
        info!(faculty_id, slots = slots.len(), "Found affected slots");

        let department = self.store.faculty_department(faculty_id).await?;

        for detail in &slots {
            let slot_id = detail.slot.id;
            match self.resolve(faculty_id, date, day, detail, department.as_deref()).await {
                Ok(SlotResult::Assigned(assigned)) => outcome.assigned.push(assigned),
                Ok(SlotResult::Skipped(reason)) => outcome.skipped.push(SkippedSlot { slot_id, reason }),
                Err(e) if e.is_fatal() => {
                    error!(error = %e, slot_id, "Store unreachable, aborting assignment batch");
                    return Err(e);
                }
                Err(e) => {
                    warn!(error = %e, slot_id, "Slot processing failed, skipping");
                    outcome.skipped.push(SkippedSlot {
                        slot_id,
                        reason: SkipReason::StoreFailure,
                    });
                }
            }
        }

        info!(
            faculty_id,
            assigned = outcome.assigned.len(),
            skipped = outcome.skipped.len(),
            "Substitute assignment finished"
        );
        Ok(outcome)
    }

    async fn resolve(
        &self,
        faculty_id: u64,
        date: NaiveDate,
        day: DayOfWeek,
        detail: &SlotDetail,
        department: Option<&str>,
    ) -> StoreResult<SlotResult> {
        let slot = &detail.slot;

        let busy = AvailabilityIndex::new(self.store)
            .busy_set(day, slot.start_time, date)
            .await?;
        let mut pool = without(self.store.active_faculty_except(faculty_id).await?, &busy);
        pool.retain(|f| f.id != faculty_id);

        if pool.is_empty() {
            info!(slot_id = slot.id, "No available substitute");
            return Ok(SlotResult::Skipped(SkipReason::NoCandidate));
        }

        let allocated = self.store.subject_allocations(slot.subject_id).await?;
        let ctx = RankContext {
            allocated: &allocated,
            department,
        };
        let Some((chosen, tier)) = pick(&pool, &ctx) else {
            return Ok(SlotResult::Skipped(SkipReason::NoCandidate));
        };

        let row = NewSubstitution {
            src_faculty_id: faculty_id,
            sub_faculty_id: chosen.id,
            class_id: slot.class_id,
            subject_id: slot.subject_id,
            date,
            start_time: slot.start_time,
            status: AssignmentStatus::Pending,
            assignment_type: AssignmentType::Auto,
            notes: None,
        };
        match self.store.insert_substitution(row).await {
            Ok(_) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                error!(error = %e, slot_id = slot.id, "Error creating substitution");
                return Ok(SlotResult::Skipped(SkipReason::StoreFailure));
            }
        }

        let message = format!(
            "Assigned substitute Prof. {} for {} {} on {} at {}",
            chosen.name,
            detail.class_name,
            detail.subject_name,
            date,
            slot.start_time.format("%H:%M")
        );
        // The assignment already exists; a lost log line does not undo it.
        if let Err(e) = self.store.insert_activity(&message).await {
            if e.is_fatal() {
                return Err(e);
            }
            warn!(error = %e, slot_id = slot.id, "Failed to write activity log");
        }

        info!(slot_id = slot.id, sub_faculty_id = chosen.id, %tier, "Assigned substitute");
        Ok(SlotResult::Assigned(AssignedSlot {
            slot_id: slot.id,
            sub_faculty_id: chosen.id,
            sub_faculty_name: chosen.name.clone(),
            tier,
        }))
    }
}
