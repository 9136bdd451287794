#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

use nc_core::{Document, Signature};
use nc_wasm::{compile_keywords_js, ContentFilter, WebDocument};

wasm_bindgen_test_configure!(run_in_browser);

fn get(value: &JsValue, key: &str) -> JsValue {
    js_sys::Reflect::get(value, &key.into()).unwrap()
}

#[wasm_bindgen_test]
fn test_compile_keywords_reports_strategies() {
    let keywords = js_sys::Array::new();
    keywords.push(&"путин".into());
    keywords.push(&"  ".into());
    keywords.push(&"donald trump".into());

    let result = js_sys::Array::from(&compile_keywords_js(keywords.into()));
    assert_eq!(result.length(), 2);
    assert_eq!(get(&result.get(0), "strategy").as_string().unwrap(), "cyrillic-noun");
    assert_eq!(get(&result.get(1), "strategy").as_string().unwrap(), "literal-phrase");
}

#[wasm_bindgen_test]
fn test_content_filter_marks_and_reveals() {
    let document = web_sys::window().unwrap().document().unwrap();
    let body = document.body().unwrap();
    let article = document.create_element("article").unwrap();
    article.set_inner_html("<h2>Путин посетил завод</h2><p>Подробности позже.</p>");
    body.append_child(&article).unwrap();

    let mut filter = ContentFilter::new("{}").unwrap();
    let report = filter.scan_now();
    assert!(get(&report, "hits").as_f64().unwrap() >= 1.0);
    assert!(article.class_list().contains("nc-hidden"));

    let placeholder = article.previous_element_sibling().unwrap();
    assert!(placeholder.class_list().contains("nc-reveal"));

    // A second pass must not add another placeholder.
    filter.scan_now();
    let before = placeholder.previous_element_sibling();
    assert!(before.map_or(true, |el| !el.class_list().contains("nc-reveal")));

    let id: u32 = article.get_attribute("data-nc-id").unwrap().parse().unwrap();
    assert!(filter.reveal(id));
    assert!(!article.class_list().contains("nc-hidden"));
    assert!(article
        .previous_element_sibling()
        .map_or(true, |el| !el.class_list().contains("nc-reveal")));

    let status = filter.status();
    assert_eq!(get(&status, "enabled").as_bool(), Some(true));
}

#[wasm_bindgen_test]
fn test_removed_elements_leave_the_registry() {
    let document = web_sys::window().unwrap().document().unwrap();
    let body = document.body().unwrap();
    let section = document.create_element("section").unwrap();
    body.append_child(&section).unwrap();

    let mut doc = WebDocument::from_window().unwrap();
    let root = doc.root();
    let found = doc.select(root, &[Signature::Tag("section")]);
    let id = doc.id_of(&section).unwrap();
    assert!(found.contains(&id));
    let before = doc.registered();

    section.remove();
    let released = doc.release_detached();
    assert_eq!(released, vec![id]);
    assert_eq!(doc.registered(), before - 1);
    assert!(doc.element(id).is_none());
    assert!(doc.release_detached().is_empty());

    // The freed id is handed to the next new element.
    let replacement = document.create_element("section").unwrap();
    body.append_child(&replacement).unwrap();
    assert_eq!(doc.id_of(&replacement).unwrap(), id);
}
