//! Hides difficulty labels on leetcode.com. The engine (classification,
//! detection, suppression, scheduling, popup flow) is platform-independent
//! and tested against an in-memory document; `web/` binds it to the live
//! page and the `chrome.*` APIs when built for wasm.

pub mod classify;
pub mod controller;
pub mod detect;
pub mod dom;
pub mod popup;
pub mod prefs;
pub mod protocol;
pub mod watcher;

#[cfg(test)]
mod testdom;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Build version, stamped by build.rs.
pub const VERSION: &str = env!("DIFFICULTY_HIDER_VERSION");
/// Build commit, stamped by build.rs.
pub const COMMIT: &str = env!("DIFFICULTY_HIDER_COMMIT");

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Content-script entry point: runs the visibility controller for this tab.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn run_content() {
    web::content::run().await;
}

/// Popup entry point: wires the toggle UI to storage and the content script.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn run_popup() {
    web::popup_ui::run();
}
