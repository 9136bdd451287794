//! `Document` implementation over the browser DOM.
//!
//! Elements are identified by a numeric id stored in `data-nc-id` and kept in
//! a registry, which gives the coordinator a `Copy + Hash` node handle.

use std::cell::RefCell;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement};

use nc_core::dom::signature::selector_list;
use nc_core::dom::{Document, DomError, Signature};
use nc_core::host::{normalize_host, HostProvider};
use nc_core::types::Mode;

const ID_ATTR: &str = "data-nc-id";
const HIT_ATTR: &str = "data-nc-hit";
const REVEAL_CLASS: &str = "nc-reveal";
const REVEAL_TARGET_ATTR: &str = "data-nc-target";
const REVEAL_LABEL: &str = "Hidden by News Cleaner. Show";

fn js_error(value: JsValue) -> DomError {
    DomError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

/// Element slots indexed by node id. Freed slots are reused.
#[derive(Default)]
struct Registry {
    slots: Vec<Option<Element>>,
    free: Vec<u32>,
}

impl Registry {
    fn get(&self, id: u32) -> Option<&Element> {
        self.slots.get(id as usize).and_then(Option::as_ref)
    }

    fn next_id(&self) -> u32 {
        self.free
            .last()
            .copied()
            .unwrap_or(self.slots.len() as u32)
    }

    fn insert(&mut self, id: u32, element: Element) {
        if self.free.last() == Some(&id) {
            self.free.pop();
            self.slots[id as usize] = Some(element);
        } else {
            self.slots.push(Some(element));
        }
    }
}

/// The page document seen through `web-sys`.
pub struct WebDocument {
    document: web_sys::Document,
    root: u32,
    registry: RefCell<Registry>,
}

impl WebDocument {
    pub fn from_window() -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("No document available"))?;
        let root_element = document
            .document_element()
            .ok_or_else(|| JsValue::from_str("Document has no root element"))?;

        let doc = Self {
            document,
            root: 0,
            registry: RefCell::new(Registry::default()),
        };
        let root = doc.id_of(&root_element)?;
        Ok(Self { root, ..doc })
    }

    /// Id for `element`, registering it on first sight. Fails when the id
    /// attribute cannot be written; the element is not registered then.
    pub fn id_of(&self, element: &Element) -> Result<u32, JsValue> {
        if let Some(id) = element
            .get_attribute(ID_ATTR)
            .and_then(|raw| raw.parse::<u32>().ok())
        {
            // Cloned nodes carry the attribute of their original.
            if self
                .registry
                .borrow()
                .get(id)
                .is_some_and(|known| js_sys::Object::is(known, element))
            {
                return Ok(id);
            }
        }

        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id();
        element.set_attribute(ID_ATTR, &id.to_string())?;
        registry.insert(id, element.clone());
        Ok(id)
    }

    pub fn element(&self, id: u32) -> Option<Element> {
        self.registry.borrow().get(id).cloned()
    }

    /// Number of elements currently registered.
    pub fn registered(&self) -> usize {
        let registry = self.registry.borrow();
        registry.slots.len() - registry.free.len()
    }

    fn require(&self, id: u32) -> Result<Element, DomError> {
        self.element(id)
            .ok_or_else(|| DomError::Unsupported(format!("unknown node {}", id)))
    }

    fn reveal_control(&self, id: u32, mode: Mode) -> Result<Element, DomError> {
        let control = self.document.create_element("div").map_err(js_error)?;
        control.set_class_name(&format!("{} {}-{}", REVEAL_CLASS, REVEAL_CLASS, mode.as_str()));
        control
            .set_attribute(REVEAL_TARGET_ATTR, &id.to_string())
            .map_err(js_error)?;

        let button = self.document.create_element("button").map_err(js_error)?;
        button.set_text_content(Some(REVEAL_LABEL));
        control.append_child(&button).map_err(js_error)?;
        Ok(control)
    }

    fn find_control(&self, element: &Element, id: u32) -> Option<Element> {
        element.previous_element_sibling().filter(|sibling| {
            sibling.class_list().contains(REVEAL_CLASS)
                && sibling.get_attribute(REVEAL_TARGET_ATTR).as_deref() == Some(id.to_string().as_str())
        })
    }
}

impl Document for WebDocument {
    type Node = u32;

    fn root(&self) -> u32 {
        self.root
    }

    fn parent(&self, node: u32) -> Option<u32> {
        let parent = self.element(node)?.parent_element()?;
        self.id_of(&parent).ok()
    }

    fn matches(&self, node: u32, signature: &Signature) -> bool {
        self.element(node)
            .map(|el| el.matches(&signature.to_css()).unwrap_or(false))
            .unwrap_or(false)
    }

    fn select(&self, root: u32, signatures: &[Signature]) -> Vec<u32> {
        let Some(root_el) = self.element(root) else {
            return Vec::new();
        };
        let selector = selector_list(signatures);
        let mut out = Vec::new();

        if root_el.matches(&selector).unwrap_or(false) {
            out.push(root);
        }
        let list = match root_el.query_selector_all(&selector) {
            Ok(list) => list,
            Err(e) => {
                log::warn!("selector '{}' failed: {:?}", selector, e);
                return out;
            }
        };
        for i in 0..list.length() {
            let Some(element) = list.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            match self.id_of(&element) {
                Ok(id) => out.push(id),
                Err(e) => log::warn!("cannot tag element for scanning: {:?}", e),
            }
        }
        out
    }

    fn attribute(&self, node: u32, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn text(&self, node: u32) -> Result<String, DomError> {
        let element = self.require(node)?;
        if !element.is_connected() {
            return Err(DomError::Detached);
        }
        match element.dyn_ref::<HtmlElement>() {
            Some(html) => Ok(html.inner_text()),
            None => Ok(element.text_content().unwrap_or_default()),
        }
    }

    fn mark(&mut self, node: u32, mode: Mode) -> Result<(), DomError> {
        let element = self.require(node)?;
        if !element.is_connected() {
            return Err(DomError::Detached);
        }
        let classes = element.class_list();
        classes
            .remove_2(Mode::Hide.class_name(), Mode::Blur.class_name())
            .map_err(js_error)?;
        classes.add_1(mode.class_name()).map_err(js_error)?;
        element.set_attribute(HIT_ATTR, "1").map_err(js_error)?;

        if self.find_control(&element, node).is_none() {
            let control = self.reveal_control(node, mode)?;
            element.before_with_node_1(&control).map_err(js_error)?;
        }
        Ok(())
    }

    fn release_detached(&mut self) -> Vec<u32> {
        let mut registry = self.registry.borrow_mut();
        let mut released = Vec::new();
        for (index, slot) in registry.slots.iter_mut().enumerate() {
            if slot.as_ref().is_some_and(|el| !el.is_connected()) {
                *slot = None;
                released.push(index as u32);
            }
        }
        registry.free.extend(released.iter().rev().copied());
        released
    }

    fn unmark(&mut self, node: u32) -> Result<(), DomError> {
        let element = self.require(node)?;
        element
            .class_list()
            .remove_2(Mode::Hide.class_name(), Mode::Blur.class_name())
            .map_err(js_error)?;
        element.remove_attribute(HIT_ATTR).map_err(js_error)?;
        if let Some(control) = self.find_control(&element, node) {
            control.remove();
        }
        Ok(())
    }
}

/// Hostname of the current page, read on every call.
pub struct LocationHost;

impl HostProvider for LocationHost {
    fn hostname(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().hostname().ok())
            .map(|h| normalize_host(&h))
            .unwrap_or_default()
    }
}
