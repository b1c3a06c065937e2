//! Giveaway snapshot files.
//!
//! ```json
//! {
//!   "name": "Summer Drop",
//!   "participants": {
//!     "81234": { "entries": 12, "displayName": "Ann", "spend": 24.5 }
//!   }
//! }
//! ```
//!
//! Participant order on the wheel is the order of keys in the file.

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use wheelspin_video::Participant;

#[derive(Debug, Deserialize)]
struct RawParticipant {
    #[serde(default)]
    entries: u64,
    #[serde(default, rename = "displayName")]
    display_name: Option<String>,
    #[serde(default)]
    spend: f64,
}

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    name: String,
    #[serde(default)]
    participants: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub name: String,
    pub participants: Vec<Participant>,
}

pub fn parse_snapshot(text: &str) -> Result<Snapshot> {
    let raw: RawSnapshot = serde_json::from_str(text).context("snapshot is not valid JSON")?;
    let mut participants = Vec::with_capacity(raw.participants.len());
    for (id, value) in raw.participants {
        let entry: RawParticipant = serde_json::from_value(value)
            .with_context(|| format!("participant {} is malformed", id))?;
        if !(entry.spend.is_finite() && entry.spend >= 0.0) {
            bail!("participant {} has invalid spend {}", id, entry.spend);
        }
        participants.push(Participant {
            display_name: entry.display_name.unwrap_or_else(|| id.clone()),
            id,
            entries: entry.entries,
            spend: entry.spend,
        });
    }
    Ok(Snapshot {
        name: raw.name,
        participants,
    })
}

pub fn load_snapshot(path: &std::path::Path) -> Result<Snapshot> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    parse_snapshot(&text).with_context(|| format!("parsing snapshot {}", path.display()))
}
