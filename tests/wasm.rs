#![cfg(target_arch = "wasm32")]

//! Browser-side checks for fragment indexing and media insertion.

use wasm_bindgen_test::*;
use web_sys::Element;

use dict_panel::extract::DictionaryKind;
use dict_panel::ui::dom;

wasm_bindgen_test_configure!(run_in_browser);

fn fragment(html: &str) -> Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let root = document.create_element("div").unwrap();
    root.set_inner_html(html);
    document.body().unwrap().append_child(&root).unwrap();
    root
}

const RESULT_FRAGMENT: &str = r#"
<div class="dictionaryTitleBlock" data-index="0">
  <div class="dictionaryTitle">大辞林</div>
  <div class="dictionarySettings">
    <div class="dupHeadCB" data-dictname="大辞林">Duplicate Header:<input type="checkbox" checked /></div>
  </div>
</div>
<div class="termPronunciation" data-index="0">
  <span class="tpCont"><span class="term mainword">犬</span><span class="altterm mainword">いぬ</span>
    <span class="starcount">★★</span></span>
</div>
<div class="definitionBlock">first<br>second</div>
<div class="dictionaryTitleBlock" data-index="1">
  <div class="dictionaryTitle">Google Images</div>
</div>
<div class="termPronunciation" data-index="1">
  <span class="tpCont"><span class="term mainword">犬</span></span>
</div>
<div class="definitionBlock">
  <div class="imgBox selectedImage" data-url="https://img.example/1.jpg"><img src="t1.jpg"></div>
  <div class="imgBox" data-url="https://img.example/2.jpg"><img src="t2.jpg"></div>
</div>
"#;

#[wasm_bindgen_test]
fn indexes_entries_with_back_references() {
    let root = fragment(RESULT_FRAGMENT);
    let entries = dom::index_entries(&root);
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].ctx.dictionary, "大辞林");
    assert!(entries[0].ctx.duplicate_header);
    assert_eq!(entries[0].ctx.kind, DictionaryKind::Text);
    assert_eq!(entries[1].ctx.kind, DictionaryKind::Image);
    assert_eq!(
        entries[0].title.get_attribute("data-entry").as_deref(),
        Some("0")
    );

    let title = dom::scrape_title(&entries[0].title);
    assert_eq!(title.word, "犬");
    assert_eq!(title.reading, "いぬ");
    assert_eq!(title.star_count, "★★");
}

#[wasm_bindgen_test]
fn collects_only_selected_image_urls() {
    let root = fragment(RESULT_FRAGMENT);
    let entries = dom::index_entries(&root);
    let body = entries[1].body.as_ref().unwrap();
    assert_eq!(
        dom::selected_image_urls(body),
        vec!["https://img.example/1.jpg".to_string()]
    );
}

#[wasm_bindgen_test]
fn appends_image_boxes_and_creates_container() {
    let root = fragment(r#"<button class="imageLoader">Load More</button>"#);
    let button = root.query_selector(".imageLoader").unwrap().unwrap();

    let appended = dom::append_image_boxes(
        &button,
        r#"<div class="imgBox" data-url="https://a/1.jpg"></div>"#,
    );
    assert_eq!(appended, 1);
    assert!(root
        .query_selector(".imageCont.horizontal-layout .imgBox")
        .unwrap()
        .is_some());

    // an empty delivery appends nothing
    assert_eq!(dom::append_image_boxes(&button, ""), 0);
}

#[wasm_bindgen_test]
fn exhausted_loader_control_is_disabled() {
    let root = fragment(r#"<button class="imageLoader">Load More</button>"#);
    let button = root.query_selector(".imageLoader").unwrap().unwrap();
    dom::mark_loader_exhausted(&button);
    assert_eq!(button.text_content().as_deref(), Some("No more images"));
    assert!(button.has_attribute("disabled"));
}
