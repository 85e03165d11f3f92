use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::aggregator::rounded_percentage;
use crate::store::{Store, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UnitProgress {
    pub unit_no: u32,
    pub total: u32,
    pub covered: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SyllabusProgress {
    pub subject_id: u64,
    pub total_topics: u32,
    pub covered_topics: u32,
    pub percentage: u8,
    pub units: Vec<UnitProgress>,
}

pub async fn syllabus_progress(store: &dyn Store, subject_id: u64) -> StoreResult<SyllabusProgress> {
    let topics = store.syllabus_topics(subject_id).await?;
    let covered = store.covered_topics(subject_id).await?;

    let mut units: BTreeMap<u32, UnitProgress> = BTreeMap::new();
    for topic in &topics {
        let unit = units.entry(topic.unit_no).or_insert(UnitProgress {
            unit_no: topic.unit_no,
            total: 0,
            covered: 0,
        });
        unit.total += 1;
        if covered.contains(&topic.id) {
            unit.covered += 1;
        }
    }

    let total_topics = topics.len() as u32;
    let covered_topics = topics.iter().filter(|t| covered.contains(&t.id)).count() as u32;

    Ok(SyllabusProgress {
        subject_id,
        total_topics,
        covered_topics,
        percentage: rounded_percentage(covered_topics, total_topics).unwrap_or(0),
        units: units.into_values().collect(),
    })
}
