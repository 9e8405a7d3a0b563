/// The tabbed lookup panel
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::Element;
use yew::prelude::*;

use crate::export::{sanitize_urls, Command, ExportKind};
use crate::extract::{self, DictionaryKind};
use crate::host::{self, HostEntry, HostEvent};
use crate::media::{parse_pronunciations, LoadStep, MediaItem, MediaLoader, MediaSource};
use crate::session::{TabSession, PLACEHOLDER_LABEL};
use crate::ui::components::{ControlBar, PronunciationList, PronunciationListProps};
use crate::ui::dom::{self, IndexedEntry};

const WELCOME_HTML: &str = "<div class=\"welcomeBlock\"><h3>Welcome</h3>\
<p>Look a term up to open your first result tab.</p></div>";

const MIN_FONT_PX: u32 = 8;
const DEFAULT_FONT_PX: u32 = 14;

/// Everything the delegated handlers and host-event dispatch need. All
/// session state hangs off the mounted component; nothing module-level.
#[derive(Clone)]
struct PanelHandles {
    session: UseStateHandle<TabSession>,
    night_mode: UseStateHandle<bool>,
    defbox_ref: NodeRef,
    entries: Rc<RefCell<Vec<IndexedEntry>>>,
    loaders: Rc<RefCell<HashMap<String, MediaLoader>>>,
    pending_term: Rc<RefCell<Option<String>>>,
    open_dropdown: Rc<RefCell<Option<Element>>>,
}

#[function_component(DictionaryPanel)]
pub fn dictionary_panel() -> Html {
    let session = use_state(TabSession::new);
    let night_mode = use_state(|| false);
    let sidebar_open = use_state(|| false);
    let font_size = use_state(|| DEFAULT_FONT_PX);

    let defbox_ref = use_node_ref();
    let tab_bar_ref = use_node_ref();

    let entries = use_mut_ref(Vec::<IndexedEntry>::new);
    let loaders = use_mut_ref(HashMap::<String, MediaLoader>::new);
    let pending_term = use_mut_ref(|| None::<String>);
    let open_dropdown = use_mut_ref(|| None::<Element>);
    // (active, revision) the view last applied, so scroll only restores on
    // real tab switches and fragment replacements
    let view_marker = use_mut_ref(|| (None::<usize>, 0u64));

    let handles = PanelHandles {
        session: session.clone(),
        night_mode: night_mode.clone(),
        defbox_ref: defbox_ref.clone(),
        entries: entries.clone(),
        loaders: loaders.clone(),
        pending_term: pending_term.clone(),
        open_dropdown: open_dropdown.clone(),
    };

    // Mount: wire the host entry points up, seed the placeholder tab and
    // announce readiness once the bridge is callable.
    {
        let handles = handles.clone();
        use_effect_with((), move |_| {
            {
                let handles = handles.clone();
                host::register_inbound(Callback::from(move |event| {
                    handle_host_event(&handles, event);
                }));
            }
            if handles.session.is_empty() {
                let mut first = (*handles.session).clone();
                first.open_result(WELCOME_HTML, PLACEHOLDER_LABEL, true, false);
                handles.session.set(first);
            }
            host::announce_when_ready();
            || ()
        });
    }

    // After every session change: re-index the inserted fragments (the
    // back-references click handling resolves), fix the layout, and restore
    // the active pane's scroll offset when the tab or fragment changed.
    {
        let entries = entries.clone();
        let defbox_ref = defbox_ref.clone();
        let tab_bar_ref = tab_bar_ref.clone();
        let view_marker = view_marker.clone();
        use_effect_with(session.clone(), move |session| {
            if let Some(defbox) = defbox_ref.cast::<Element>() {
                *entries.borrow_mut() = dom::index_entries(&defbox);
                if let Some(bar) = tab_bar_ref.cast::<Element>() {
                    dom::resize_layout(&bar, &defbox);
                }
                // a pane that expects an audio block gets its container up
                // front, so a later delivery without an id has a home
                if let Some(index) = session.active() {
                    if session.get(index).is_some_and(|tab| tab.has_audio) {
                        if let Some(pane) = dom::pane_for_index(&defbox, index) {
                            let _ = dom::ensure_audio_container(&pane);
                        }
                    }
                }
                let marker = (session.active(), session.revision());
                if *view_marker.borrow() != marker {
                    *view_marker.borrow_mut() = marker;
                    if let Some(tab) = session.active().and_then(|i| session.get(i)) {
                        dom::set_scroll_offset(&defbox, tab.scroll);
                    }
                }
            }
            || ()
        });
    }

    {
        use_effect_with(night_mode.clone(), move |mode| {
            dom::set_night_mode(**mode);
            || ()
        });
    }

    // Sidebar visibility lives inside the injected fragments, so it has to be
    // reapplied after each insertion as well as on each toggle.
    {
        let defbox_ref = defbox_ref.clone();
        use_effect_with((sidebar_open.clone(), session.clone()), move |(open, _)| {
            if let Some(defbox) = defbox_ref.cast::<Element>() {
                dom::set_sidebar(&defbox, **open);
            }
            || ()
        });
    }

    let on_pane_click = {
        let handles = handles.clone();
        Callback::from(move |ev: MouseEvent| {
            if let Some(target) = ev.target().and_then(|t| t.dyn_into::<Element>().ok()) {
                route_pane_click(&handles, &target);
            }
        })
    };

    let on_pane_contextmenu = {
        Callback::from(move |ev: MouseEvent| {
            let Some(target) = ev.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            if let Some(title) = closest(&target, ".listTitle") {
                ev.prevent_default();
                dom::toggle_hidden_list(&title);
            }
        })
    };

    let on_font_step = {
        let font_size = font_size.clone();
        Callback::from(move |grow: bool| {
            let next = if grow {
                *font_size + 1
            } else {
                (*font_size - 1).max(MIN_FONT_PX)
            };
            font_size.set(next);
            host::send(&Command::SaveFontSizes { field: next, body: next });
        })
    };

    let on_night_toggle = {
        let night_mode = night_mode.clone();
        Callback::from(move |_| night_mode.set(!*night_mode))
    };

    let on_sidebar_toggle = {
        let sidebar_open = sidebar_open.clone();
        Callback::from(move |_| sidebar_open.set(!*sidebar_open))
    };

    let on_close_all = {
        let session = session.clone();
        Callback::from(move |_| {
            let mut next = (*session).clone();
            next.close_all();
            session.set(next);
        })
    };

    let tab_buttons: Html = session
        .iter()
        .map(|(index, tab)| {
            let is_active = session.active() == Some(index);
            let onclick = {
                let session = session.clone();
                let defbox_ref = defbox_ref.clone();
                let label = tab.label.clone();
                Callback::from(move |_: MouseEvent| {
                    let mut next = (*session).clone();
                    if let (Some(prev), Some(defbox)) = (next.active(), defbox_ref.cast::<Element>()) {
                        next.save_scroll(prev, dom::scroll_offset(&defbox));
                    }
                    if next.focus(index) {
                        host::send(&Command::UpdateTerm { term: label.clone() });
                        session.set(next);
                    }
                })
            };
            let oncontextmenu = {
                let session = session.clone();
                Callback::from(move |ev: MouseEvent| {
                    ev.prevent_default();
                    let mut next = (*session).clone();
                    next.close(index);
                    session.set(next);
                })
            };
            html! {
                <button
                    key={index}
                    class={classes!("tablinks", is_active.then_some("active"))}
                    data-index={index.to_string()}
                    {onclick}
                    {oncontextmenu}
                >
                    { tab.label.clone() }
                </button>
            }
        })
        .collect();

    let panes: Html = session
        .iter()
        .map(|(index, tab)| {
            let display = if session.active() == Some(index) {
                "display:block"
            } else {
                "display:none"
            };
            let content = Html::from_html_unchecked(AttrValue::from(tab.content.clone()));
            html! {
                <div
                    key={index}
                    class="tabContent"
                    data-index={index.to_string()}
                    style={display}
                >
                    { content }
                </div>
            }
        })
        .collect();

    html! {
        <div
            class={classes!("dictPanel", night_mode.then_some("nightMode"))}
            style={format!("font-size:{}px", *font_size)}
        >
            <ControlBar
                night_mode={*night_mode}
                sidebar_open={*sidebar_open}
                on_font_step={on_font_step}
                on_night_toggle={on_night_toggle}
                on_sidebar_toggle={on_sidebar_toggle}
                on_close_all={on_close_all}
            />
            <div id="tabs" class="tabBar" ref={tab_bar_ref}>
                { tab_buttons }
            </div>
            <div
                id="defBox"
                class="defBox"
                ref={defbox_ref}
                onclick={on_pane_click}
                oncontextmenu={on_pane_contextmenu}
            >
                { panes }
            </div>
        </div>
    }
}

/// React to one host call. Fragments are inserted through session state, so
/// by the time the post-render effect runs (indexing, sidebar restore,
/// resize) the content is fully in the document.
fn handle_host_event(handles: &PanelHandles, event: HostEvent) {
    match event {
        HostEvent::OpenResult {
            html,
            term,
            single_tab,
            has_audio,
        } => {
            let mut next = (*handles.session).clone();
            if let (Some(prev), Some(defbox)) =
                (next.active(), handles.defbox_ref.cast::<Element>())
            {
                next.save_scroll(prev, dom::scroll_offset(&defbox));
            }
            next.open_result(&html, &term, single_tab, has_audio);
            handles.session.set(next);
        }
        HostEvent::DisplayEntry(entry) => {
            let mut next = (*handles.session).clone();
            let Some(active) = next.active() else {
                log::warn!("no open tab to display an entry in");
                return;
            };
            next.append_content(active, &render_entry_block(&entry));
            handles.session.set(next);
        }
        HostEvent::LoadImages { html, trigger } => {
            let Some(button) = trigger.or_else(dom::document_loader) else {
                log::warn!("no loader control for an image delivery");
                return;
            };
            let appended = dom::append_image_boxes(&button, &html);
            let term = loader_term(handles, &button);
            let mut loaders = handles.loaders.borrow_mut();
            let loader = loaders
                .entry(term.clone())
                .or_insert_with(|| MediaLoader::new(MediaSource::Host { term }));
            loader.absorb_host_delivery(appended);
            if loader.is_exhausted() {
                dom::mark_loader_exhausted(&button);
            } else {
                dom::reset_loader(&button);
            }
        }
        HostEvent::AppendImages { html } => {
            let appended = dom::append_to_shared_container(&html);
            if let Some(term) = handles.pending_term.borrow_mut().take() {
                if let Some(loader) = handles.loaders.borrow_mut().get_mut(&term) {
                    loader.absorb_host_delivery(appended);
                }
            }
            if let Some(button) = dom::document_loader() {
                if appended == 0 {
                    dom::mark_loader_exhausted(&button);
                } else {
                    dom::reset_loader(&button);
                }
            }
        }
        HostEvent::LoadPronunciations { data, container } => {
            let target = container
                .as_deref()
                .and_then(dom::find_by_id)
                .or_else(|| {
                    let defbox = handles.defbox_ref.cast::<Element>()?;
                    let active = handles.session.active()?;
                    let pane = dom::pane_for_index(&defbox, active)?;
                    dom::ensure_audio_container(&pane)
                });
            let Some(target) = target else {
                log::warn!("no audio container available; pronunciations dropped");
                return;
            };
            let rows = match data {
                Some(json) => parse_pronunciations(&json),
                None => target
                    .query_selector(".forvo")
                    .ok()
                    .flatten()
                    .and_then(|el| el.get_attribute("data-urls"))
                    .map(|json| parse_pronunciations(&json))
                    .unwrap_or_default(),
            };
            target.set_inner_html("");
            yew::Renderer::<PronunciationList>::with_root_and_props(
                target,
                PronunciationListProps { rows },
            )
            .render();
        }
        HostEvent::NightMode(on) => handles.night_mode.set(on),
        HostEvent::CloseAllTabs => {
            let mut next = (*handles.session).clone();
            next.close_all();
            handles.session.set(next);
        }
    }
}

/// Delegated click routing over the host-injected markup. Controls are
/// recognized by their marker classes; entry context comes from the index
/// built at insertion time.
fn route_pane_click(handles: &PanelHandles, target: &Element) {
    if let Some(opener) = closest(target, ".fieldSelect, .overwriteSelect") {
        toggle_settings_dropdown(handles, &opener);
        return;
    }
    // a click anywhere else closes an expanded dropdown, except inside it
    if closest(target, ".inCheckBox").is_none() {
        if let Some(previous) = handles.open_dropdown.borrow_mut().take() {
            dom::close_dropdown(&previous);
        }
    }

    if let Ok(input) = target.clone().dyn_into::<web_sys::HtmlInputElement>() {
        if handle_settings_input(handles, target, &input) {
            return;
        }
    }

    if closest(target, ".clipper").is_some() {
        // build the payload before handing off, so the entry index is not
        // borrowed if the host calls straight back in
        let command = entry_index_of(target).and_then(|entry_idx| {
            let entries = handles.entries.borrow();
            entries
                .get(entry_idx)
                .map(|entry| Command::Clipped { text: clip_text(entry) })
        });
        if let Some(command) = command {
            host::send(&command);
        }
        return;
    }

    if closest(target, ".ankiExportButton").is_some() {
        if let Some(command) = entry_command(handles, target, ExportKind::into_export_command) {
            host::send(&command);
        }
        return;
    }

    if closest(target, ".sendToField").is_some() {
        if let Some(command) = entry_command(handles, target, ExportKind::into_field_command) {
            host::send(&command);
        }
        return;
    }

    if let Some(button) = closest(target, dom::LOADER_SELECTOR) {
        handle_load_more(handles, &button);
        return;
    }

    if let Some(control) = closest(target, ".prevDict, .nextDict, .prevDef, .nextDef") {
        handle_navigation(handles, &control);
        return;
    }

    if let Some(item) = closest(target, ".listTitle, .definitionSideBar li") {
        handle_sidebar_jump(handles, &item);
        return;
    }

    if closest(target, ".imgBox").is_some() {
        dom::toggle_image_selection(target);
    }
}

fn toggle_settings_dropdown(handles: &PanelHandles, opener: &Element) {
    let container = dom::dropdown_container(opener);
    if let Some(previous) = handles.open_dropdown.borrow_mut().take() {
        let same = container
            .as_ref()
            .map(|c| previous.is_same_node(Some(c.as_ref())))
            .unwrap_or(false);
        if !same {
            dom::close_dropdown(&previous);
        }
    }
    if let Some(container) = container {
        *handles.open_dropdown.borrow_mut() = dom::toggle_display(&container);
    }
}

/// Settings inputs inside a dictionary title block. Returns true when the
/// click was one of them.
fn handle_settings_input(
    handles: &PanelHandles,
    target: &Element,
    input: &web_sys::HtmlInputElement,
) -> bool {
    if let Some(container) = closest(target, ".dupHeadCB") {
        host::send(&Command::SetDuplicateHeader {
            enabled: input.checked(),
            dictionary: container.get_attribute("data-dictname").unwrap_or_default(),
        });
        // refresh the back-references so the next export sees the new flag
        if let Some(defbox) = handles.defbox_ref.cast::<Element>() {
            *handles.entries.borrow_mut() = dom::index_entries(&defbox);
        }
        return true;
    }
    if let Some(container) = closest(target, ".fieldCheckboxes") {
        host::send(&Command::FieldsSetting {
            dictionary: container.get_attribute("data-dictname").unwrap_or_default(),
            fields: dom::checked_values(&container),
        });
        return true;
    }
    if let Some(container) = closest(target, ".overwriteCheckboxes") {
        host::send(&Command::OverwriteSetting {
            dictionary: container.get_attribute("data-dictname").unwrap_or_default(),
            mode: input.value(),
        });
        return true;
    }
    false
}

fn handle_load_more(handles: &PanelHandles, button: &Element) {
    let term = loader_term(handles, button);
    let step = {
        let mut loaders = handles.loaders.borrow_mut();
        let loader = loaders.entry(term.clone()).or_insert_with(|| {
            match button.get_attribute("data-urls") {
                // the control carries its remaining results: page locally
                Some(json) => {
                    let items: Vec<MediaItem> = serde_json::from_str(&json).unwrap_or_default();
                    MediaLoader::new(MediaSource::Cached(items))
                }
                None => MediaLoader::new(MediaSource::Host { term: term.clone() }),
            }
        });
        loader.next_page()
    };
    match step {
        LoadStep::Page { items, exhausted } => {
            dom::append_media_items(button, &items);
            if exhausted {
                dom::mark_loader_exhausted(button);
            } else {
                dom::reset_loader(button);
            }
        }
        LoadStep::Requested { term } => {
            dom::set_loader_loading(button);
            *handles.pending_term.borrow_mut() = Some(term.clone());
            host::send(&Command::MoreImages { term });
        }
        LoadStep::Exhausted => dom::mark_loader_exhausted(button),
    }
}

fn handle_navigation(handles: &PanelHandles, control: &Element) {
    let Some(defbox) = handles.defbox_ref.cast::<Element>() else { return };
    let classes = control.class_list();
    let forward = classes.contains("nextDict") || classes.contains("nextDef");
    let wanted = if classes.contains("prevDef") || classes.contains("nextDef") {
        "termPronunciation"
    } else {
        "dictionaryTitleBlock"
    };
    if let Some(origin) = closest(control, ".dictionaryTitleBlock, .termPronunciation") {
        dom::scroll_to_adjacent(&defbox, &origin, wanted, forward);
    }
}

fn handle_sidebar_jump(handles: &PanelHandles, item: &Element) {
    let Some(defbox) = handles.defbox_ref.cast::<Element>() else { return };
    let Some(pane) = closest(item, ".tabContent") else { return };
    let Some(index) = item.get_attribute("data-index") else { return };
    let selector = if item.tag_name() == "LI" {
        format!(".termPronunciation[data-index='{}']", index)
    } else {
        format!(".dictionaryTitleBlock[data-index='{}']", index)
    };
    dom::scroll_to_selector(&defbox, &pane, &selector);
}

/// Build the export payload for the entry enclosing `target`, routed through
/// `route` (card export vs. send-to-field).
fn entry_command(
    handles: &PanelHandles,
    target: &Element,
    route: fn(ExportKind) -> Option<Command>,
) -> Option<Command> {
    let entry_idx = entry_index_of(target)?;
    let entries = handles.entries.borrow();
    let entry = entries.get(entry_idx)?;
    route(export_kind(entry))
}

/// The payload of one entry, tagged by what its dictionary exports.
fn export_kind(entry: &IndexedEntry) -> ExportKind {
    let title = dom::scrape_title(&entry.title);
    let word = extract::headword(&title);
    match entry.ctx.kind {
        DictionaryKind::Image => ExportKind::Image {
            word,
            urls: sanitize_urls(
                entry
                    .body
                    .as_ref()
                    .map(dom::selected_image_urls)
                    .unwrap_or_default(),
            ),
        },
        DictionaryKind::Audio => ExportKind::Audio {
            word,
            urls: sanitize_urls(
                entry
                    .body
                    .as_ref()
                    .map(dom::selected_audio_urls)
                    .unwrap_or_default(),
            ),
        },
        DictionaryKind::Text => {
            // an active selection wins over the auto-extracted body
            let definition = match dom::selection_text() {
                Some(selection) => extract::selection_payload(
                    &entry.title.text_content().unwrap_or_default(),
                    &selection,
                ),
                None => {
                    let body = entry
                        .body
                        .as_ref()
                        .map(|el| el.inner_html())
                        .unwrap_or_default();
                    extract::extract_word_and_definition(&entry.ctx, &title, &body).1
                }
            };
            ExportKind::Definition {
                dictionary: entry.ctx.dictionary.clone(),
                word,
                definition,
            }
        }
    }
}

/// Clipboard flavor: newline separators, entities decoded.
fn clip_text(entry: &IndexedEntry) -> String {
    let title = dom::scrape_title(&entry.title);
    let text = match dom::selection_text() {
        Some(selection) => format!("{}\n{}", title.pronunciation, selection),
        None => {
            let body = entry
                .body
                .as_ref()
                .map(|el| el.inner_html())
                .unwrap_or_default();
            let (_, definition) = extract::extract_word_and_definition(&entry.ctx, &title, &body);
            definition.replace("<br>", "\n")
        }
    };
    extract::decode_basic_entities(&text)
}

fn loader_term(handles: &PanelHandles, button: &Element) -> String {
    button
        .get_attribute("data-term")
        .or_else(|| {
            let session = &handles.session;
            session
                .active()
                .and_then(|i| session.get(i))
                .map(|tab| tab.label.clone())
        })
        .unwrap_or_default()
}

fn entry_index_of(target: &Element) -> Option<usize> {
    closest(target, "[data-entry]")?
        .get_attribute(dom::ENTRY_ATTR)?
        .parse()
        .ok()
}

fn closest(target: &Element, selector: &str) -> Option<Element> {
    target.closest(selector).ok().flatten()
}

fn render_entry_block(entry: &HostEntry) -> String {
    format!(
        "<div class=\"definitionBlock\"><b>{}</b><br>{}</div>",
        entry.word,
        entry.definitions.join("<br>")
    )
}
