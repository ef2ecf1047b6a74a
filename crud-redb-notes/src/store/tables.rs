//! Bucket layout of the notes file.
//!
//! redb tables are flat, so the `DB → NOTES` hierarchy is kept as a root table
//! that registers its child buckets by name, plus one table per child named
//! `{parent}/{child}`.

use redb::TableDefinition;

/// Root bucket. Keys are child bucket names, values the backing table name.
pub const ROOT: TableDefinition<&str, &str> = TableDefinition::new("DB");

pub const NOTES_BUCKET: &str = "NOTES";
pub const NOTES_TABLE: &str = "DB/NOTES";

/// Notes keyed by id, values are JSON-encoded notes.
pub const NOTES: TableDefinition<&str, &[u8]> = TableDefinition::new(NOTES_TABLE);
