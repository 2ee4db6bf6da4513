//! Browser glue: `web_sys` document backend, `chrome.*` bindings and the
//! runtimes for the two extension surfaces. Everything here is wasm-only;
//! the engine it drives lives in the platform-independent modules.

pub mod chrome;
pub mod content;
pub mod page;
pub mod popup_ui;
