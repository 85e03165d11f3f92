#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyllabusTopic {
    pub id: u64,
    pub subject_id: u64,
    pub unit_no: u32,
    pub topic_text: String,
}
