//! Content-script runtime: owns the controller for the lifetime of one page
//! view and wires it to the mutation observer, the fallback interval and
//! the popup's message channel. State lives in a `thread_local` because
//! every callback crossing the JS boundary needs access and wasm in a tab
//! is single-threaded anyway.

use std::cell::RefCell;
use std::time::Duration;

use gloo_timers::callback::{Interval, Timeout};
use gloo_timers::future::sleep;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{MutationObserver, MutationObserverInit, MutationRecord, Node};

use crate::controller::HiderController;
use crate::dom::DomDocument;
use crate::protocol::{Request, StateReply};
use crate::watcher::{self, RescanDebounce};
use crate::web::chrome;
use crate::web::page::WebPage;

struct ContentState {
    controller: HiderController<WebPage>,
    debounce: RescanDebounce,
    pending: Option<Timeout>,
    _observer: Option<MutationObserver>,
}

thread_local! {
    static STATE: RefCell<Option<ContentState>> = const { RefCell::new(None) };
}

fn with_state<R>(f: impl FnOnce(&mut ContentState) -> R) -> Option<R> {
    STATE.with(|state| state.borrow_mut().as_mut().map(f))
}

/// Entry point, called once per page view.
pub async fn run() {
    let Some(page) = WebPage::current() else {
        log::warn!("no document in this context");
        return;
    };
    let enabled = chrome::load_pref().await;
    wait_for_ready(&page).await;
    log::info!("starting, labels {}", if enabled { "hidden" } else { "visible" });

    let controller = HiderController::new(page, enabled);
    controller.apply();
    STATE.with(|state| {
        *state.borrow_mut() = Some(ContentState {
            controller,
            debounce: RescanDebounce::new(),
            pending: None,
            _observer: None,
        });
    });

    // Second pass for content that renders just after load.
    spawn_local(async {
        sleep(Duration::from_millis(u64::from(watcher::SECOND_PASS_DELAY_MS))).await;
        with_state(|state| state.controller.apply());
    });

    install_observer();
    install_interval();
    install_message_listener();
}

/// Resolve once the DOM is ready. Content scripts normally start at
/// `document_idle`, but nothing guarantees it.
async fn wait_for_ready(page: &WebPage) {
    if page.document().ready_state() != "loading" {
        return;
    }
    let (tx, rx) = futures::channel::oneshot::channel::<()>();
    let listener = Closure::once(move || {
        let _ = tx.send(());
    });
    let result = page.document().add_event_listener_with_callback(
        "DOMContentLoaded",
        listener.as_ref().unchecked_ref(),
    );
    listener.forget();
    if result.is_ok() {
        let _ = rx.await;
    }
}

fn install_observer() {
    let Some(body) = with_state(|state| state.controller.doc().body()).flatten() else {
        log::warn!("no body to observe");
        return;
    };
    let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
        move |records: js_sys::Array, _observer: MutationObserver| {
            on_mutations(&records);
        },
    );
    let observer = match MutationObserver::new(callback.as_ref().unchecked_ref()) {
        Ok(observer) => observer,
        Err(_) => {
            log::warn!("mutation observer unavailable");
            return;
        }
    };
    callback.forget();

    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    if observer.observe_with_options(&body, &init).is_err() {
        log::warn!("failed to observe document mutations");
        return;
    }
    with_state(|state| state._observer = Some(observer));
}

fn on_mutations(records: &js_sys::Array) {
    let relevant = with_state(|state| {
        if !state.controller.enabled() {
            return false;
        }
        let mut added: Vec<Node> = Vec::new();
        for record in records.iter() {
            let Ok(record) = record.dyn_into::<MutationRecord>() else {
                continue;
            };
            let nodes = record.added_nodes();
            for i in 0..nodes.length() {
                if let Some(node) = nodes.get(i) {
                    added.push(node);
                }
            }
        }
        !added.is_empty() && watcher::batch_is_relevant(state.controller.doc(), &added)
    })
    .unwrap_or(false);

    if relevant {
        schedule_rescan(watcher::DEBOUNCE_MS);
    }
}

/// (Re)arm the debounced rescan. An earlier pending timer is cancelled, so
/// a burst of mutations collapses into one rescan after quiescence.
fn schedule_rescan(delay_ms: u32) {
    with_state(|state| {
        let generation = state.debounce.arm();
        if let Some(pending) = state.pending.take() {
            pending.cancel();
        }
        state.pending = Some(Timeout::new(delay_ms, move || {
            with_state(|state| {
                if state.debounce.fire(generation) {
                    state.controller.rescan();
                }
            });
        }));
    });
}

fn install_interval() {
    // Fallback for mutations the relevance filter misses; rescan is a
    // no-op while labels are visible.
    Interval::new(watcher::RESCAN_INTERVAL_MS, || {
        with_state(|state| state.controller.rescan());
    })
    .forget();
}

fn install_message_listener() {
    let listener = Closure::<dyn FnMut(JsValue, JsValue, js_sys::Function) -> JsValue>::new(
        move |message: JsValue, _sender: JsValue, send_response: js_sys::Function| {
            let Ok(request) = serde_wasm_bindgen::from_value::<Request>(message) else {
                return JsValue::FALSE;
            };
            let enabled = match request {
                Request::Toggle => handle_toggle(),
                Request::GetState => with_state(|state| state.controller.enabled()),
            };
            let Some(enabled) = enabled else {
                return JsValue::FALSE;
            };
            let serializer = serde_wasm_bindgen::Serializer::json_compatible();
            if let Ok(reply) = StateReply { enabled }.serialize(&serializer) {
                let _ = send_response.call1(&JsValue::NULL, &reply);
            }
            JsValue::FALSE
        },
    );
    if chrome::on_message(listener.as_ref().unchecked_ref()).is_err() {
        log::warn!("message channel unavailable");
    }
    listener.forget();
}

fn handle_toggle() -> Option<bool> {
    let enabled = with_state(|state| state.controller.toggle())?;
    spawn_local(chrome::store_pref(enabled));
    // The flip itself can make the page framework re-render; catch that.
    if enabled {
        schedule_rescan(watcher::POST_TOGGLE_RESCAN_MS);
    }
    Some(enabled)
}
