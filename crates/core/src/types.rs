/// All entity identifiers are random UUIDs (v4).
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
