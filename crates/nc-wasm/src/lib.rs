//! WebAssembly bindings for News Cleaner

mod dom;

use std::sync::OnceLock;

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::prelude::*;

use nc_compiler::{compile_keywords, InflectionCompiler};
use nc_core::{
    config::parse_lines,
    gate::is_disabled,
    host::normalize_host,
    matcher::text_matches,
    scan::ScanReport,
    Config, ConfigChange, ScanCoordinator,
};

pub use crate::dom::{LocationHost, WebDocument};

// =============================================================================
// Console logging
// =============================================================================

struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[news-cleaner] {}", record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            _ => web_sys::console::log_1(&line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;
static LOGGER_INSTALLED: OnceLock<()> = OnceLock::new();

/// Route `log` records to the page console. `verbose` enables debug output.
#[wasm_bindgen]
pub fn init_logging(verbose: bool) {
    LOGGER_INSTALLED.get_or_init(|| {
        let _ = log::set_logger(&LOGGER);
    });
    log::set_max_level(if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });
}

// =============================================================================
// Content filter
// =============================================================================

fn report_to_js(report: &ScanReport) -> JsValue {
    let result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&result, &"version".into(), &JsValue::from(report.version as f64));
    let _ = js_sys::Reflect::set(&result, &"gated".into(), &JsValue::from(report.gated));
    let _ = js_sys::Reflect::set(&result, &"cleared".into(), &JsValue::from(report.cleared as u32));
    let _ = js_sys::Reflect::set(&result, &"released".into(), &JsValue::from(report.released as u32));
    let _ = js_sys::Reflect::set(&result, &"candidates".into(), &JsValue::from(report.candidates as u32));
    let _ = js_sys::Reflect::set(&result, &"tested".into(), &JsValue::from(report.tested as u32));
    let _ = js_sys::Reflect::set(&result, &"hits".into(), &JsValue::from(report.hits as u32));
    let _ = js_sys::Reflect::set(&result, &"errors".into(), &JsValue::from(report.errors as u32));
    result.into()
}

/// Page-side filter: one per document.
///
/// The content script owns the event wiring. It calls `notify_added` from a
/// `MutationObserver`, requests an animation frame whenever a call returns
/// true, and runs `run_pending` from that frame.
#[wasm_bindgen]
pub struct ContentFilter {
    coordinator: ScanCoordinator<WebDocument>,
    document: WebDocument,
}

#[wasm_bindgen]
impl ContentFilter {
    /// Create a filter from the stored configuration JSON. Malformed fields
    /// fall back to their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<ContentFilter, JsValue> {
        let document = WebDocument::from_window()?;
        let config = Config::from_json(config_json);
        let coordinator = ScanCoordinator::new(
            config,
            Box::new(InflectionCompiler::default()),
            Box::new(LocationHost),
        );
        Ok(Self {
            coordinator,
            document,
        })
    }

    /// Full pass over the document right now.
    pub fn scan_now(&mut self) -> JsValue {
        let root = nc_core::Document::root(&self.document);
        let report = self.coordinator.scan(&mut self.document, root);
        report_to_js(&report)
    }

    /// `added` elements were inserted. Returns true when a frame callback
    /// should be requested.
    pub fn notify_added(&mut self, added: u32) -> bool {
        if added == 0 {
            return false;
        }
        let root = nc_core::Document::root(&self.document);
        self.coordinator.notify_added(&[root])
    }

    /// Run the pending pass. Returns null when nothing was pending.
    pub fn run_pending(&mut self) -> JsValue {
        match self.coordinator.run_pending(&mut self.document) {
            Some(report) => report_to_js(&report),
            None => JsValue::NULL,
        }
    }

    /// Apply one storage delta. Returns true when a frame callback should be
    /// requested.
    pub fn apply_change(&mut self, field: &str, value_json: &str) -> Result<bool, JsValue> {
        let value: serde_json::Value = serde_json::from_str(value_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid value for '{}': {}", field, e)))?;
        let change = ConfigChange::from_key(field, value)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let was_scheduled = self.coordinator.is_scheduled();
        self.coordinator.apply_changes([change]);
        Ok(!was_scheduled && self.coordinator.is_scheduled())
    }

    /// Reader clicked "show" on the region with this `data-nc-id`.
    pub fn reveal(&mut self, id: u32) -> bool {
        self.coordinator.reveal(&mut self.document, id)
    }

    /// `{ host, enabled, siteDisabled, hiddenCount }`
    pub fn status(&self) -> JsValue {
        let status = self.coordinator.status();
        let result = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&result, &"host".into(), &JsValue::from_str(&status.host));
        let _ = js_sys::Reflect::set(&result, &"enabled".into(), &JsValue::from(status.enabled));
        let _ = js_sys::Reflect::set(&result, &"siteDisabled".into(), &JsValue::from(status.site_disabled));
        let _ = js_sys::Reflect::set(&result, &"hiddenCount".into(), &JsValue::from(status.hidden_count as u32));
        let _ = js_sys::Reflect::set(&result, &"label".into(), &JsValue::from_str(status.label()));
        result.into()
    }
}

// =============================================================================
// Stateless helpers for the popup, options page and background worker
// =============================================================================

fn string_array(value: &JsValue) -> Vec<String> {
    js_sys::Array::from(value)
        .iter()
        .filter_map(|v| v.as_string())
        .collect()
}

/// Compile keywords and describe the result: `[{ keyword, strategy, source }]`.
#[wasm_bindgen]
pub fn compile_keywords_js(keywords: JsValue) -> JsValue {
    let keywords = string_array(&keywords);
    let patterns = compile_keywords(&keywords);

    let result = js_sys::Array::new();
    for pattern in &patterns {
        let entry = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&entry, &"keyword".into(), &JsValue::from_str(pattern.keyword()));
        let _ = js_sys::Reflect::set(&entry, &"strategy".into(), &JsValue::from_str(pattern.strategy().as_str()));
        let _ = js_sys::Reflect::set(&entry, &"source".into(), &JsValue::from_str(pattern.source()));
        result.push(&entry);
    }
    result.into()
}

#[wasm_bindgen]
pub fn text_matches_js(keywords: JsValue, text: &str) -> bool {
    let patterns = compile_keywords(&string_array(&keywords));
    text_matches(&text.to_lowercase(), &patterns)
}

/// Textarea contents to a keyword array.
#[wasm_bindgen]
pub fn parse_keyword_lines(text: &str) -> JsValue {
    let result = js_sys::Array::new();
    for line in parse_lines(text) {
        result.push(&JsValue::from_str(&line));
    }
    result.into()
}

#[wasm_bindgen]
pub fn normalize_host_js(url: &str) -> String {
    normalize_host(url)
}

#[wasm_bindgen]
pub fn is_site_disabled(config_json: &str, url: &str) -> bool {
    let config = Config::from_json(config_json);
    is_disabled(&normalize_host(url), &config.domain_lists(), config.enabled)
}

/// Badge text for a tab showing `url`.
#[wasm_bindgen]
pub fn badge_text(config_json: &str, url: &str) -> String {
    if is_site_disabled(config_json, url) {
        "OFF".to_string()
    } else {
        String::new()
    }
}

fn change_to_js(change: &ConfigChange) -> JsValue {
    let result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&result, &"field".into(), &JsValue::from_str(change.field.key()));
    let _ = js_sys::Reflect::set(
        &result,
        &"value".into(),
        &JsValue::from_str(&change.new_value.to_string()),
    );
    result.into()
}

/// Toggle the current site in whichever list governs it. Returns
/// `{ field, value }` with `value` as JSON, ready to persist.
#[wasm_bindgen]
pub fn toggle_site(config_json: &str, url: &str) -> JsValue {
    let config = Config::from_json(config_json);
    let change = config.domain_lists().toggle_host(&normalize_host(url));
    change_to_js(&change)
}

/// Flip the global switch. Same return shape as `toggle_site`.
#[wasm_bindgen]
pub fn toggle_enabled(config_json: &str) -> JsValue {
    let mut config = Config::from_json(config_json);
    let change = config.toggle_enabled();
    change_to_js(&change)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_gate_helpers() {
        let config = r#"{"enabled":true,"allowlist":[],"blocklist":["example.com"]}"#;
        assert!(is_site_disabled(config, "https://www.example.com/news"));
        assert!(!is_site_disabled(config, "https://other.org/"));
        assert_eq!(badge_text(config, "http://example.com/"), "OFF");
        assert_eq!(badge_text(config, "https://other.org/"), "");
    }

    #[test]
    fn test_global_switch_gates_everything() {
        let config = r#"{"enabled":false}"#;
        assert!(is_site_disabled(config, "https://other.org/"));
    }

    #[test]
    fn test_normalize_host_js() {
        assert_eq!(normalize_host_js("HTTPS://WWW.Example.COM:8080/a"), "example.com");
    }
}
