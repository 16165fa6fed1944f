/// Backend-assigned record identity (the `_id` field on the wire).
pub type RecordId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
