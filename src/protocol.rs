//! Popup <-> content-script message protocol. Two request kinds, one reply
//! shape, JSON-object spelling fixed by the extension's wire history:
//! `{"action": "toggle"}` / `{"action": "getState"}` -> `{"enabled": bool}`.

use serde::{Deserialize, Serialize};

/// A request from the popup to the content script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Flip hidden/visible and report the state after the flip.
    Toggle,
    /// Report the current state without changing it.
    GetState,
}

/// Reply to either request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateReply {
    pub enabled: bool,
}
