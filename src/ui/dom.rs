/// web-sys helpers for the host-injected result markup
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlAudioElement, HtmlCollection, HtmlElement, HtmlInputElement};

use crate::extract::{strip_selection_artifacts, DictionaryKind, EntryContext, EntryTitle};
use crate::media::MediaItem;

/// Attribute stamped on every indexed entry title.
pub const ENTRY_ATTR: &str = "data-entry";

pub const IMAGE_CONTAINER_SELECTOR: &str = ".imageCont.horizontal-layout";
pub const LOADER_SELECTOR: &str = ".imageLoader";

pub fn document() -> Option<Document> {
    web_sys::window().and_then(|w| w.document())
}

pub fn find_by_id(id: &str) -> Option<Element> {
    document()?.get_element_by_id(id)
}

/// The current user text selection, stripped of tool-strip artifacts.
/// `None` when nothing (or only artifacts) is selected.
pub fn selection_text() -> Option<String> {
    let selection = web_sys::window()?.get_selection().ok().flatten()?;
    let raw: String = js_sys::Object::to_string(selection.as_ref()).into();
    let text = strip_selection_artifacts(&raw);
    if text.is_empty() { None } else { Some(text) }
}

/// One entry discovered while indexing a freshly inserted fragment: its
/// owning-dictionary back-reference plus the title and body elements.
pub struct IndexedEntry {
    pub ctx: EntryContext,
    pub title: Element,
    pub body: Option<Element>,
}

/// Walk an inserted fragment once, in document order, recording for every
/// entry title its owning dictionary block and stamping it with its entry id.
/// Click handling later resolves the stamp instead of climbing the tree.
pub fn index_entries(container: &Element) -> Vec<IndexedEntry> {
    let mut entries = Vec::new();
    let Ok(nodes) = container.query_selector_all(".dictionaryTitleBlock, .termPronunciation")
    else {
        return entries;
    };
    let mut current: Option<EntryContext> = None;
    for i in 0..nodes.length() {
        let Some(element) = nodes.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        if element.class_list().contains("dictionaryTitleBlock") {
            current = Some(dictionary_context(&element));
        } else if let Some(ctx) = current.clone() {
            let body = element
                .next_element_sibling()
                .filter(|el| el.class_list().contains("definitionBlock"));
            let _ = element.set_attribute(ENTRY_ATTR, &entries.len().to_string());
            entries.push(IndexedEntry { ctx, title: element, body });
        } else {
            log::warn!("entry title outside any dictionary block; skipped");
        }
    }
    entries
}

pub fn dictionary_context(block: &Element) -> EntryContext {
    let dictionary = first_text(block, ".dictionaryTitle");
    let duplicate_header = block
        .query_selector(".dupHeadCB input")
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        .map(|input| input.checked())
        .unwrap_or(false);
    EntryContext {
        kind: DictionaryKind::from_name(&dictionary),
        dictionary,
        duplicate_header,
    }
}

/// Scrape the structured title fields out of one entry title block.
pub fn scrape_title(title: &Element) -> EntryTitle {
    let words = title.get_elements_by_class_name("mainword");
    EntryTitle {
        word: collection_text(&words, 0),
        reading: collection_text(&words, 1),
        pronunciation: first_text(title, ".tpCont"),
        star_count: first_text(title, ".starcount"),
    }
}

pub fn selected_image_urls(scope: &Element) -> Vec<String> {
    let mut urls = Vec::new();
    if let Ok(nodes) = scope.query_selector_all(".selectedImage") {
        for i in 0..nodes.length() {
            if let Some(el) = nodes.get(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                if let Some(url) = el.get_attribute("data-url") {
                    urls.push(url);
                }
            }
        }
    }
    urls
}

pub fn selected_audio_urls(scope: &Element) -> Vec<String> {
    let mut urls = Vec::new();
    if let Ok(rows) = scope.query_selector_all(".audioRow") {
        for i in 0..rows.length() {
            let Some(row) = rows.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let checked = row
                .query_selector("input")
                .ok()
                .flatten()
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                .map(|input| input.checked())
                .unwrap_or(false);
            if checked {
                if let Some(url) = row.get_attribute("data-url") {
                    urls.push(url);
                }
            }
        }
    }
    urls
}

pub fn toggle_image_selection(target: &Element) {
    if let Some(media_box) = target.closest(".imgBox").ok().flatten() {
        let _ = media_box.class_list().toggle("selectedImage");
    }
}

/// Parse a host-delivered fragment and append its image boxes next to the
/// trigger control, creating the results container on first delivery.
/// Returns how many boxes were appended.
pub fn append_image_boxes(trigger: &Element, html: &str) -> usize {
    let Some(document) = document() else { return 0 };
    let Ok(staging) = document.create_element("div") else { return 0 };
    staging.set_inner_html(html);
    let Ok(boxes) = staging.query_selector_all(".imgBox") else { return 0 };
    if boxes.length() == 0 {
        return 0;
    }
    let Some(parent) = trigger.parent_element() else { return 0 };
    let container = match parent.query_selector(IMAGE_CONTAINER_SELECTOR).ok().flatten() {
        Some(existing) => existing,
        None => {
            let Ok(fresh) = document.create_element("div") else { return 0 };
            fresh.set_class_name("imageCont horizontal-layout");
            if parent.insert_before(fresh.as_ref(), Some(trigger.as_ref())).is_err() {
                return 0;
            }
            fresh
        }
    };
    drain_boxes(&staging, &container)
}

/// Append a delivery into the document-wide results container (the host-paged
/// strategy does not know which trigger asked).
pub fn append_to_shared_container(html: &str) -> usize {
    let Some(document) = document() else { return 0 };
    let Some(container) = document.query_selector(IMAGE_CONTAINER_SELECTOR).ok().flatten() else {
        log::warn!("image container missing; delivery ignored");
        return 0;
    };
    let Ok(staging) = document.create_element("div") else { return 0 };
    staging.set_inner_html(html);
    drain_boxes(&staging, &container)
}

/// Render a locally cached page into markup and append it.
pub fn append_media_items(trigger: &Element, items: &[MediaItem]) -> usize {
    let mut html = String::new();
    for item in items {
        html.push_str(&format!(
            "<div class=\"imgBox\" data-url=\"{}\"><img src=\"{}\"></div>",
            item.url, item.thumb
        ));
    }
    append_image_boxes(trigger, &html)
}

pub fn set_loader_loading(button: &Element) {
    let _ = button.set_attribute("disabled", "");
    button.set_text_content(Some("Loading..."));
}

pub fn reset_loader(button: &Element) {
    let _ = button.remove_attribute("disabled");
    button.set_text_content(Some("Load More"));
}

pub fn mark_loader_exhausted(button: &Element) {
    let _ = button.set_attribute("disabled", "");
    button.set_text_content(Some("No more images"));
}

pub fn document_loader() -> Option<Element> {
    document()?.query_selector(LOADER_SELECTOR).ok().flatten()
}

pub fn scroll_offset(container: &Element) -> f64 {
    container.scroll_top() as f64
}

pub fn set_scroll_offset(container: &Element, offset: f64) {
    container.set_scroll_top(offset as i32);
}

/// Walk siblings from `origin` to the adjacent block carrying `class` and
/// bring it into view inside `container`.
pub fn scroll_to_adjacent(container: &Element, origin: &Element, class: &str, forward: bool) {
    let mut cursor = origin.clone();
    loop {
        let next = if forward {
            cursor.next_element_sibling()
        } else {
            cursor.previous_element_sibling()
        };
        match next {
            Some(sibling) => {
                if sibling.class_list().contains(class) {
                    scroll_to(container, &sibling);
                    return;
                }
                cursor = sibling;
            }
            None => return,
        }
    }
}

pub fn scroll_to_selector(container: &Element, pane: &Element, selector: &str) {
    if let Some(target) = pane.query_selector(selector).ok().flatten() {
        scroll_to(container, &target);
    } else {
        log::warn!("navigation target {} not found", selector);
    }
}

pub fn play_audio(url: &str) {
    match HtmlAudioElement::new_with_src(url) {
        Ok(player) => {
            if let Err(err) = player.play() {
                log::warn!("audio playback refused: {:?}", err);
            }
        }
        Err(err) => log::warn!("audio element creation failed: {:?}", err),
    }
}

/// The audio results container inside a pane, if the fragment carries one.
pub fn discover_audio_container(pane: &Element) -> Option<Element> {
    pane.query_selector("[id^='fcon']").ok().flatten()
}

/// Find or create the audio results container for a pane.
pub fn ensure_audio_container(pane: &Element) -> Option<Element> {
    if let Some(existing) = discover_audio_container(pane) {
        return Some(existing);
    }
    let document = document()?;
    let container = document.create_element("div").ok()?;
    let id = format!("fcon-{}", uuid::Uuid::new_v4());
    let _ = container.set_attribute("id", &id);
    pane.append_child(container.as_ref()).ok()?;
    Some(container)
}

pub fn set_container_html(id: &str, html: &str) {
    match find_by_id(id) {
        Some(el) => el.set_inner_html(html),
        None => log::warn!("target container not found: {}", id),
    }
}

pub fn set_night_mode(on: bool) {
    let Some(body) = document().and_then(|d| d.body()) else { return };
    let classes = body.class_list();
    let result = if on {
        classes.add_1("nightMode")
    } else {
        classes.remove_1("nightMode")
    };
    if result.is_err() {
        log::warn!("could not update night mode class");
    }
}

pub fn add_custom_font(file: &str, name: &str) {
    let Some(document) = document() else { return };
    let Some(head) = document.head() else {
        log::warn!("document has no head; font not installed");
        return;
    };
    let Ok(style) = document.create_element("style") else { return };
    style.set_text_content(Some(&format!(
        "@font-face {{ font-family: '{}'; src: url('{}'); }}",
        name, file
    )));
    if head.append_child(style.as_ref()).is_err() {
        log::warn!("could not install custom font {}", name);
    }
}

/// Pin the scroll container under the tab bar and fill the window height.
pub fn resize_layout(tab_bar: &Element, container: &Element) {
    let Some(window) = web_sys::window() else { return };
    let bar_height = tab_bar
        .clone()
        .dyn_into::<HtmlElement>()
        .map(|el| el.offset_height())
        .unwrap_or(0);
    let window_height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(600.0) as i32;
    if let Ok(pane) = container.clone().dyn_into::<HtmlElement>() {
        let style = pane.style();
        let _ = style.set_property("top", &format!("{}px", bar_height));
        let _ = style.set_property("height", &format!("{}px", (window_height - bar_height).max(100)));
    }
}

pub fn set_sidebar(container: &Element, open: bool) {
    let display = if open { "block" } else { "none" };
    if let Ok(sidebars) = container.query_selector_all(".definitionSideBar") {
        for i in 0..sidebars.length() {
            let Some(el) = sidebars.get(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
                continue;
            };
            let _ = el.style().set_property("display", display);
            let classes = el.class_list();
            let _ = if open {
                classes.add_1("sidebarOpenedSideBar")
            } else {
                classes.remove_1("sidebarOpenedSideBar")
            };
        }
    }
    if let Ok(displays) = container.query_selector_all(".mainDictDisplay") {
        for i in 0..displays.length() {
            let Some(el) = displays.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let classes = el.class_list();
            let _ = if open {
                classes.add_1("sidebarOpenedDisplay")
            } else {
                classes.remove_1("sidebarOpenedDisplay")
            };
        }
    }
}

/// The checkbox container a field/overwrite opener controls.
pub fn dropdown_container(opener: &Element) -> Option<Element> {
    let parent = opener.parent_element()?;
    parent
        .query_selector(".fieldCheckboxes, .overwriteCheckboxes")
        .ok()
        .flatten()
}

/// Toggle a dropdown open or closed. Returns the element when it ends up
/// open, so the panel can close it on the next outside click.
pub fn toggle_display(container: &Element) -> Option<Element> {
    let el = container.clone().dyn_into::<HtmlElement>().ok()?;
    let style = el.style();
    let current = style.get_property_value("display").unwrap_or_default();
    if current == "block" {
        let _ = style.set_property("display", "none");
        None
    } else {
        let _ = style.set_property("display", "block");
        Some(Element::from(el))
    }
}

pub fn close_dropdown(el: &Element) {
    if let Ok(html_el) = el.clone().dyn_into::<HtmlElement>() {
        let _ = html_el.style().set_property("display", "none");
    }
}

/// All checked input values inside a checkbox container.
pub fn checked_values(container: &Element) -> Vec<String> {
    let mut values = Vec::new();
    if let Ok(inputs) = container.query_selector_all("input") {
        for i in 0..inputs.length() {
            let Some(input) = inputs.get(i).and_then(|n| n.dyn_into::<HtmlInputElement>().ok())
            else {
                continue;
            };
            if input.checked() {
                values.push(input.value());
            }
        }
    }
    values
}

pub fn toggle_hidden_list(title: &Element) {
    if let Some(list) = title.next_element_sibling() {
        let _ = list.class_list().toggle("hiddenOl");
    }
}

pub fn pane_for_index(container: &Element, index: usize) -> Option<Element> {
    container
        .query_selector(&format!(".tabContent[data-index='{}']", index))
        .ok()
        .flatten()
}

fn drain_boxes(staging: &Element, container: &Element) -> usize {
    let mut appended = 0;
    while let Some(node) = staging.query_selector(".imgBox").ok().flatten() {
        if container.append_child(node.as_ref()).is_ok() {
            appended += 1;
        } else {
            break;
        }
    }
    appended
}

fn scroll_to(container: &Element, target: &Element) {
    if let Ok(el) = target.clone().dyn_into::<HtmlElement>() {
        container.set_scroll_top(el.offset_top());
    }
}

fn collection_text(collection: &HtmlCollection, index: u32) -> String {
    collection
        .item(index)
        .and_then(|el| el.text_content())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn first_text(scope: &Element, selector: &str) -> String {
    scope
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.text_content())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}
