use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::store;

/// Wall-clock layout of note ids, one-second resolution.
pub const ID_FORMAT: &str = "%Y%m%d%H%M%S";

// Older files were written with capitalised field names, hence the aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default, alias = "Id")]
    pub id: String,
    #[serde(default, alias = "Title")]
    pub title: String,
    #[serde(default, alias = "Body")]
    pub body: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewNote {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl Note {
    pub fn new(id: impl Into<String>, NewNote { title, body }: NewNote) -> Self {
        Self {
            id: id.into(),
            title,
            body,
        }
    }

    pub fn encode(&self) -> store::Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| store::Error::Encode(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> store::Result<Self> {
        serde_json::from_slice(bytes).map_err(|_| store::Error::Decode("can't unmarshall note".into()))
    }
}

/// Id for a note created at `now`.
///
/// Two notes created within the same second get the same id, and the later
/// one replaces the earlier in the store.
pub fn note_id<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    now.format(ID_FORMAT).to_string()
}
