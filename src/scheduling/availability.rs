use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use crate::model::{faculty::FacultyMember, timetable::DayOfWeek};
use crate::store::{Store, StoreResult};

/// Answers "who already teaches at this time" from the timetable.
pub struct AvailabilityIndex<'a> {
    store: &'a dyn Store,
}

impl<'a> AvailabilityIndex<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Faculty with a valid timetable slot at `day`/`start_time` on `date`.
    /// One store round-trip per call; callers compute it once per slot.
    pub async fn busy_set(
        &self,
        day: DayOfWeek,
        start_time: NaiveTime,
        date: NaiveDate,
    ) -> StoreResult<HashSet<u64>> {
        let busy = self.store.busy_faculty(day, start_time, date).await?;
        debug!(%day, %start_time, %date, busy = busy.len(), "Computed busy set");
        Ok(busy)
    }

    /// Candidates for a manually picked substitute. Stricter than the
    /// automatic path: faculty on approved leave that day or already
    /// covering another lecture at that time are also excluded.
    pub async fn free_for_manual(
        &self,
        date: NaiveDate,
        start_time: NaiveTime,
        exclude_faculty_id: u64,
    ) -> StoreResult<Vec<FacultyMember>> {
        let day = DayOfWeek::from(date);
        let everyone = self.store.active_faculty_except(exclude_faculty_id).await?;

        let mut blocked = self.busy_set(day, start_time, date).await?;
        blocked.extend(self.store.faculty_on_leave(date).await?);
        blocked.extend(self.store.substituting_at(date, start_time).await?);

        Ok(without(everyone, &blocked))
    }
}

/// Drops every member of `busy`, keeping store order.
pub fn without(candidates: Vec<FacultyMember>, busy: &HashSet<u64>) -> Vec<FacultyMember> {
    candidates.into_iter().filter(|f| !busy.contains(&f.id)).collect()
}
