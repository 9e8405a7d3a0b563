/// Dictionary lookup panel embedded in a host application's webview
/// Built with Rust + WASM + Yew

pub mod export;
pub mod extract;
pub mod host;
pub mod media;
pub mod session;
pub mod ui;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use host::{HostEntry, HostEvent};

// Set up panic hook for better error messages in the webview console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Mount the panel, into `#dictRoot` when the host page provides one.
#[wasm_bindgen(js_name = startDictionaryPanel)]
pub fn start_dictionary_panel() {
    match ui::dom::find_by_id("dictRoot") {
        Some(root) => {
            yew::Renderer::<ui::panel::DictionaryPanel>::with_root(root).render();
        }
        None => {
            yew::Renderer::<ui::panel::DictionaryPanel>::new().render();
        }
    }
}

/// Deliver a lookup result fragment. `single_tab` arrives as a bool or the
/// string "true"/"false" depending on how the host formats the call.
#[wasm_bindgen(js_name = addNewTab)]
pub fn add_new_tab(
    html: Option<String>,
    term: Option<String>,
    single_tab: JsValue,
    has_audio_block: Option<bool>,
) {
    let Some(html) = html else {
        log::warn!("addNewTab called without content; skipped");
        return;
    };
    let single_tab = single_tab
        .as_bool()
        .or_else(|| single_tab.as_string().map(|s| s == "true"))
        .unwrap_or(true);
    host::dispatch(HostEvent::OpenResult {
        html,
        term: term.unwrap_or_default(),
        single_tab,
        has_audio: has_audio_block.unwrap_or(false),
    });
}

/// Display a structured entry in the active pane.
#[wasm_bindgen(js_name = displayEntry)]
pub fn display_entry(entry: JsValue) {
    match serde_wasm_bindgen::from_value::<HostEntry>(entry) {
        Ok(entry) => host::dispatch(HostEvent::DisplayEntry(entry)),
        Err(err) => log::warn!("malformed entry payload: {}", err),
    }
}

/// Deliver image results for a specific "load more" control.
#[wasm_bindgen(js_name = loadNewImages)]
pub fn load_new_images(html: Option<String>, button: JsValue) {
    let trigger = button.dyn_into::<web_sys::Element>().ok();
    host::dispatch(HostEvent::LoadImages {
        html: html.unwrap_or_default(),
        trigger,
    });
}

/// Deliver a host-paged batch into the shared image container.
#[wasm_bindgen(js_name = appendNewImages)]
pub fn append_new_images(html: Option<String>) {
    host::dispatch(HostEvent::AppendImages {
        html: html.unwrap_or_default(),
    });
}

/// Replace a named container's markup.
#[wasm_bindgen(js_name = loadImageHtml)]
pub fn load_image_html(html: String, id: String) {
    ui::dom::set_container_html(&id, &html);
}

/// Hydrate pronunciation results. `content` is either the JSON row data or
/// false, in which case the data is read off the container's markup.
#[wasm_bindgen(js_name = loadForvoDict)]
pub fn load_forvo_dict(content: JsValue, id: Option<String>) {
    host::dispatch(HostEvent::LoadPronunciations {
        data: content.as_string(),
        container: id,
    });
}

#[wasm_bindgen(js_name = nightModeToggle)]
pub fn night_mode_toggle(on: bool) {
    host::dispatch(HostEvent::NightMode(on));
}

#[wasm_bindgen(js_name = addCustomFont)]
pub fn add_custom_font(font_file: String, font_name: String) {
    ui::dom::add_custom_font(&font_file, &font_name);
}

#[wasm_bindgen(js_name = closeAllTabs)]
pub fn close_all_tabs() {
    host::dispatch(HostEvent::CloseAllTabs);
}
