/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// In-memory entity identifiers. Time-ordered so that "earliest registered"
/// comparisons can fall back on them.
pub type EntityId = uuid::Uuid;

/// Generate a fresh entity identifier.
pub fn new_entity_id() -> EntityId {
    uuid::Uuid::now_v7()
}
