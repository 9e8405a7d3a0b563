/// One-way command bridge to the embedding application
use std::cell::RefCell;

use js_sys::{Function, Promise, Reflect};
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Element;
use yew::Callback;

use crate::export::Command;

/// Name of the command hook the host installs on the window object.
const BRIDGE_NAME: &str = "pycmd";

/// Sampling interval while waiting for the hook to appear.
const PROBE_INTERVAL_MS: i32 = 5;

/// A structured entry pushed by the host for direct display.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HostEntry {
    pub word: String,
    #[serde(default)]
    pub definitions: Vec<String>,
}

/// Everything the host can ask the mounted panel to do. The exported global
/// entry points translate their arguments into one of these and dispatch.
pub enum HostEvent {
    OpenResult {
        html: String,
        term: String,
        single_tab: bool,
        has_audio: bool,
    },
    DisplayEntry(HostEntry),
    LoadImages {
        html: String,
        trigger: Option<Element>,
    },
    AppendImages {
        html: String,
    },
    LoadPronunciations {
        data: Option<String>,
        container: Option<String>,
    },
    NightMode(bool),
    CloseAllTabs,
}

thread_local! {
    static INBOUND: RefCell<Option<Callback<HostEvent>>> = RefCell::new(None);
}

/// Install the mounted panel's event handler. Interop glue only — session
/// state itself lives inside the panel.
pub fn register_inbound(callback: Callback<HostEvent>) {
    INBOUND.with(|slot| *slot.borrow_mut() = Some(callback));
}

/// Forward a host call to the panel. Events arriving before the panel mounts
/// are dropped; the host is told to start talking via `Command::Ready` only
/// after registration.
pub fn dispatch(event: HostEvent) {
    let callback = INBOUND.with(|slot| slot.borrow().clone());
    match callback {
        Some(callback) => callback.emit(event),
        None => log::warn!("panel not mounted yet; host event dropped"),
    }
}

/// Fire-and-forget hand-off of one encoded command. Loss is silent and
/// permanent; there is no retry.
pub fn send(command: &Command) {
    let encoded = command.encode();
    match bridge_function() {
        Some(bridge) => {
            if let Err(err) = bridge.call1(&JsValue::NULL, &JsValue::from_str(&encoded)) {
                log::debug!("host bridge rejected command: {:?}", err);
            }
        }
        None => log::debug!("host bridge unavailable, dropped: {}", encoded),
    }
}

/// Resolves once the host has installed its command hook. The hook's
/// availability is not observable as an event, so the binding layer samples
/// for it on a short timer; callers only ever await the future.
pub async fn ready() {
    while bridge_function().is_none() {
        sleep(PROBE_INTERVAL_MS).await;
    }
}

/// Announce readiness as soon as the bridge is callable.
pub fn announce_when_ready() {
    wasm_bindgen_futures::spawn_local(async {
        ready().await;
        send(&Command::Ready);
    });
}

fn bridge_function() -> Option<Function> {
    let window = web_sys::window()?;
    let value = Reflect::get(window.as_ref(), &JsValue::from_str(BRIDGE_NAME)).ok()?;
    value.dyn_into::<Function>().ok()
}

async fn sleep(ms: i32) {
    let promise = Promise::new(&mut |resolve, _| {
        let scheduled = web_sys::window().and_then(|w| {
            w.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
                .ok()
        });
        if scheduled.is_none() {
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    let _ = JsFuture::from(promise).await;
}
