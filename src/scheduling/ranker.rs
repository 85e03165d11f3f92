use std::collections::HashSet;

use serde::Serialize;
use strum_macros::Display;
use utoipa::ToSchema;

use crate::model::faculty::FacultyMember;

/// What the ranker knows about the lecture being covered.
pub struct RankContext<'a> {
    /// Faculty allocated to the slot's subject.
    pub allocated: &'a HashSet<u64>,
    /// Department of the absent faculty, if recorded.
    pub department: Option<&'a str>,
}

/// Preference tiers, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    SameSubject,
    SameDepartment,
    AnyAvailable,
}

type TierPredicate = fn(&FacultyMember, &RankContext<'_>) -> bool;

fn same_subject(f: &FacultyMember, ctx: &RankContext<'_>) -> bool {
    ctx.allocated.contains(&f.id)
}

fn same_department(f: &FacultyMember, ctx: &RankContext<'_>) -> bool {
    matches!((ctx.department, f.department.as_deref()), (Some(want), Some(have)) if want == have)
}

fn anyone(_: &FacultyMember, _: &RankContext<'_>) -> bool {
    true
}

const TIERS: [(Tier, TierPredicate); 3] = [
    (Tier::SameSubject, same_subject),
    (Tier::SameDepartment, same_department),
    (Tier::AnyAvailable, anyone),
];

/// Best tier `faculty` qualifies for.
pub fn tier_of(faculty: &FacultyMember, ctx: &RankContext<'_>) -> Tier {
    TIERS
        .iter()
        .find(|(_, admits)| admits(faculty, ctx))
        .map(|(tier, _)| *tier)
        .unwrap_or(Tier::AnyAvailable)
}

/// Orders candidates by tier; within a tier the store order is kept.
pub fn rank<'c>(candidates: &'c [FacultyMember], ctx: &RankContext<'_>) -> Vec<(&'c FacultyMember, Tier)> {
    let mut ranked: Vec<_> = candidates.iter().map(|f| (f, tier_of(f, ctx))).collect();
    ranked.sort_by_key(|(_, tier)| *tier);
    ranked
}

/// The single substitute for a slot, or `None` if nobody is available.
pub fn pick<'c>(candidates: &'c [FacultyMember], ctx: &RankContext<'_>) -> Option<(&'c FacultyMember, Tier)> {
    rank(candidates, ctx).into_iter().next()
}
