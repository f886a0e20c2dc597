//! Deduplication ledger schema.
//!
//! This is the on-disk contract: a store reopened on the same file must find
//! every record written before the restart.

/// SQL to create the processed events table.
pub const CREATE_PROCESSED_EVENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS processed_events (
    topic        TEXT NOT NULL,
    event_id     TEXT NOT NULL,
    timestamp    TEXT NOT NULL,
    processed_at TEXT NOT NULL,
    PRIMARY KEY (topic, event_id)
)
";

/// SQL to create the per-topic index used by filtered reads and counts.
pub const CREATE_TOPIC_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_topic
    ON processed_events (topic)
";

pub(crate) const SELECT_EXISTS: &str =
    "SELECT 1 FROM processed_events WHERE topic = ? AND event_id = ?";

/// First writer wins; a conflicting insert affects zero rows.
pub(crate) const INSERT_PROCESSED: &str = r"
INSERT INTO processed_events (topic, event_id, timestamp, processed_at)
VALUES (?, ?, ?, ?)
ON CONFLICT (topic, event_id) DO NOTHING
";

pub(crate) const SELECT_ALL: &str = r"
SELECT topic, event_id, timestamp, processed_at
FROM processed_events
ORDER BY processed_at DESC, rowid DESC
";

pub(crate) const SELECT_BY_TOPIC: &str = r"
SELECT topic, event_id, timestamp, processed_at
FROM processed_events
WHERE topic = ?
ORDER BY processed_at DESC, rowid DESC
";

pub(crate) const COUNT_ALL: &str = "SELECT COUNT(*) FROM processed_events";

pub(crate) const COUNT_BY_TOPIC: &str =
    "SELECT topic, COUNT(*) FROM processed_events GROUP BY topic";

pub(crate) const DELETE_ALL: &str = "DELETE FROM processed_events";
