//! The one persisted preference: whether difficulty labels are hidden.

/// `chrome.storage.sync` key holding the preference.
pub const PREF_KEY: &str = "difficultyHiderEnabled";

/// Hidden is the default: only a stored explicit `false` disables it.
/// Absent keys, unreadable storage and non-boolean junk all map to `true`.
pub fn enabled_from_stored(raw: Option<bool>) -> bool {
    raw != Some(false)
}
