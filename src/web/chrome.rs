//! Bindings to the `chrome.*` extension APIs. Every extern is declared with
//! `catch` so a missing or restricted API surfaces as an `Err` instead of a
//! trap; callers degrade per the extension's error model (defaults for
//! storage, offline fallback for messaging).

use std::time::Duration;

use futures::future::{select, Either};
use gloo_timers::future::sleep;
use js_sys::Promise;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::prefs;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = get)]
    fn storage_sync_get(keys: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = set)]
    fn storage_sync_set(items: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    fn runtime_on_message(listener: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = query)]
    fn tabs_query(query_info: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = sendMessage)]
    fn tabs_send_message(tab_id: i32, message: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = reload)]
    fn tabs_reload(tab_id: i32) -> Result<Promise, JsValue>;
}

/// The slice of a `chrome.tabs.Tab` the popup cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct TabInfo {
    pub id: Option<i32>,
    pub url: Option<String>,
}

/// Read the hidden-labels preference; unavailable storage reads as the
/// default (hidden).
pub async fn load_pref() -> bool {
    prefs::enabled_from_stored(read_pref_raw().await)
}

async fn read_pref_raw() -> Option<bool> {
    let keys = js_sys::Array::of1(&JsValue::from_str(prefs::PREF_KEY));
    let promise = match storage_sync_get(&keys.into()) {
        Ok(promise) => promise,
        Err(_) => {
            log::warn!("preference store unavailable, assuming default");
            return None;
        }
    };
    let result = JsFuture::from(promise).await.ok()?;
    js_sys::Reflect::get(&result, &JsValue::from_str(prefs::PREF_KEY))
        .ok()?
        .as_bool()
}

/// Persist the preference. Fire-and-forget: failures are logged, never
/// surfaced.
pub async fn store_pref(enabled: bool) {
    let items = js_sys::Object::new();
    let key = JsValue::from_str(prefs::PREF_KEY);
    if js_sys::Reflect::set(&items, &key, &JsValue::from_bool(enabled)).is_err() {
        return;
    }
    match storage_sync_set(&items) {
        Ok(promise) => {
            if JsFuture::from(promise).await.is_err() {
                log::warn!("failed to persist preference");
            }
        }
        Err(_) => log::warn!("preference store unavailable, not persisting"),
    }
}

/// The active tab of the current window, if the tabs API will say.
pub async fn active_tab() -> Option<TabInfo> {
    let info = js_sys::Object::new();
    js_sys::Reflect::set(&info, &JsValue::from_str("active"), &JsValue::TRUE).ok()?;
    js_sys::Reflect::set(&info, &JsValue::from_str("currentWindow"), &JsValue::TRUE).ok()?;
    let tabs = JsFuture::from(tabs_query(&info).ok()?).await.ok()?;
    let first = js_sys::Array::from(&tabs).get(0);
    if first.is_undefined() || first.is_null() {
        return None;
    }
    serde_wasm_bindgen::from_value(first).ok()
}

/// Send `request` to the content script in `tab_id` and wait at most
/// `timeout_ms` for a reply. `None` covers timeout, channel errors and
/// malformed replies alike; the caller cannot tell them apart and does not
/// need to.
pub async fn round_trip<Q, R>(tab_id: i32, request: &Q, timeout_ms: u32) -> Option<R>
where
    Q: Serialize,
    R: DeserializeOwned,
{
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    let message = request.serialize(&serializer).ok()?;
    let promise = tabs_send_message(tab_id, &message).ok()?;
    let send = Box::pin(JsFuture::from(promise));
    let deadline = Box::pin(sleep(Duration::from_millis(u64::from(timeout_ms))));
    match select(send, deadline).await {
        Either::Left((Ok(reply), _)) => serde_wasm_bindgen::from_value(reply).ok(),
        Either::Left((Err(_), _)) => None,
        Either::Right(_) => {
            log::debug!("round trip to tab {tab_id} timed out after {timeout_ms}ms");
            None
        }
    }
}

/// Reload a tab; the returned promise is intentionally not awaited.
pub fn reload_tab(tab_id: i32) {
    if tabs_reload(tab_id).is_err() {
        log::warn!("failed to reload tab {tab_id}");
    }
}

/// Register a `chrome.runtime.onMessage` listener.
pub fn on_message(listener: &js_sys::Function) -> Result<(), JsValue> {
    runtime_on_message(listener)
}
