//! Party participation changes during a dialog

use serde::{Deserialize, Serialize};

/// One party joining, leaving or changing state within a dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyHistory {
    /// Index into the envelope's party list
    pub party: u32,

    /// Event name, e.g. "join", "drop", "hold", "unhold", "mute", "unmute"
    pub event: String,

    /// When the event happened (RFC 3339)
    pub time: String,
}

impl PartyHistory {
    pub fn new(party: u32, event: impl Into<String>, time: impl Into<String>) -> Self {
        PartyHistory {
            party,
            event: event.into(),
            time: time.into(),
        }
    }

    /// Dictionary form embedded in the dialog's `party_history` list
    pub fn to_dict(&self) -> serde_json::Value {
        serde_json::json!({
            "party": self.party,
            "event": self.event,
            "time": self.time,
        })
    }
}
