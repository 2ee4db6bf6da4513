//! Popup shell: wires the DOM of `extension/popup.html` to the pure
//! [`PopupApp`] state machine. Commands that need the platform run through
//! `spawn_local` and feed their results back in as events.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element};

use crate::popup::{
    PopupApp, PopupCommand, PopupEvent, Status, STATE_TIMEOUT_MS, TOGGLE_TIMEOUT_MS,
};
use crate::protocol::{Request, StateReply};
use crate::web::chrome;

type App = Rc<RefCell<PopupApp>>;

/// Entry point, called when the popup page loads.
pub fn run() {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let app: App = Rc::new(RefCell::new(PopupApp::new()));
    render_version(&document);
    wire_toggle(&document, app.clone());
    spawn_local(async move {
        let (tab_id, url) = match chrome::active_tab().await {
            Some(tab) => (tab.id, tab.url),
            None => (None, None),
        };
        dispatch(&app, PopupEvent::Opened { tab_id, url });
    });
}

fn dispatch(app: &App, event: PopupEvent) {
    let commands = app.borrow_mut().handle(event);
    for command in commands {
        execute(app, command);
    }
}

fn execute(app: &App, command: PopupCommand) {
    match command {
        PopupCommand::LoadPref => {
            let app = app.clone();
            spawn_local(async move {
                let enabled = chrome::load_pref().await;
                dispatch(&app, PopupEvent::PrefLoaded(enabled));
            });
        }
        PopupCommand::QueryState { tab_id } => {
            let app = app.clone();
            spawn_local(async move {
                let reply: Option<StateReply> =
                    chrome::round_trip(tab_id, &Request::GetState, STATE_TIMEOUT_MS).await;
                dispatch(&app, PopupEvent::LiveState(reply.map(|r| r.enabled)));
            });
        }
        PopupCommand::SendToggle { tab_id } => {
            let app = app.clone();
            spawn_local(async move {
                let reply: Option<StateReply> =
                    chrome::round_trip(tab_id, &Request::Toggle, TOGGLE_TIMEOUT_MS).await;
                dispatch(&app, PopupEvent::ToggleResult(reply.map(|r| r.enabled)));
            });
        }
        PopupCommand::SavePref(enabled) => spawn_local(chrome::store_pref(enabled)),
        PopupCommand::Render(status) => render_status(status),
        PopupCommand::ReloadTab { tab_id } => chrome::reload_tab(tab_id),
        PopupCommand::Close => {
            if let Some(window) = web_sys::window() {
                let _ = window.close();
            }
        }
    }
}

fn wire_toggle(document: &Document, app: App) {
    let Some(toggle) = document.get_element_by_id("toggle") else {
        log::warn!("popup markup is missing #toggle");
        return;
    };
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
        dispatch(&app, PopupEvent::ToggleClicked);
    });
    let _ = toggle.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn render_status(status: Status) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let status_el = document.get_element_by_id("status");
    let toggle = document.get_element_by_id("toggle");

    match status {
        Status::OffSite => {
            set_text(
                status_el.as_ref(),
                "Not on LeetCode. Open leetcode.com to use the toggle.",
            );
            set_class(toggle.as_ref(), "disabled", true);
        }
        Status::Working => {
            set_text(status_el.as_ref(), "Toggling...");
        }
        Status::Ready(enabled) => {
            set_class(toggle.as_ref(), "active", enabled);
            set_text(
                status_el.as_ref(),
                if enabled {
                    "Difficulties hidden"
                } else {
                    "Difficulties visible"
                },
            );
        }
    }
}

fn render_version(document: &Document) {
    if let Some(footer) = document.get_element_by_id("version") {
        footer.set_text_content(Some(&format!(
            "v{} ({})",
            crate::VERSION,
            crate::COMMIT
        )));
    }
}

fn set_text(el: Option<&Element>, text: &str) {
    if let Some(el) = el {
        el.set_text_content(Some(text));
    }
}

fn set_class(el: Option<&Element>, class: &str, on: bool) {
    if let Some(el) = el {
        let list = el.class_list();
        let _ = if on {
            list.add_1(class)
        } else {
            list.remove_1(class)
        };
    }
}
