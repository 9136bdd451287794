//! News Cleaner CLI library
//!
//! Shared plumbing for the `nc-cli` binary: HTML loading, configuration
//! files, offline scans and logging setup.

pub mod html;
pub mod logging;

use std::fs;
use std::path::Path;

use serde::Serialize;

use nc_compiler::InflectionCompiler;
use nc_core::config::MemoryConfigSource;
use nc_core::dom::memory::{MemoryDocument, NodeId};
use nc_core::{text_matches, Config, Document, PatternSet, ScanCoordinator, ScanReport, SiteStatus};

const SNIPPET_CHARS: usize = 80;

/// Parse configuration JSON.
///
/// Strict parsing rejects unknown fields and mistyped values; otherwise
/// such fields fall back to their defaults.
pub fn parse_config(text: &str, strict: bool) -> Result<Config, String> {
    if strict {
        Config::try_from_json(text).map_err(|e| format!("Invalid configuration: {}", e))
    } else {
        Ok(Config::from_json(text))
    }
}

/// Read a configuration file, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>, strict: bool) -> Result<Config, String> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    parse_config(&text, strict)
}

/// `match` if any pattern matches the lower-cased text, else `no match`.
pub fn match_verdict(text: &str, patterns: &PatternSet) -> &'static str {
    if text_matches(&text.to_lowercase(), patterns) {
        "match"
    } else {
        "no match"
    }
}

/// One region the scan marked.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkedRegion {
    pub node: usize,
    pub tag: String,
    pub classes: String,
    pub treatment: String,
    pub snippet: String,
}

/// Result of scanning one HTML page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub status: SiteStatus,
    pub gated: bool,
    pub candidates: usize,
    pub tested: usize,
    pub hits: usize,
    pub errors: usize,
    pub regions: Vec<MarkedRegion>,
}

impl ScanSummary {
    fn new(status: SiteStatus, report: &ScanReport, regions: Vec<MarkedRegion>) -> Self {
        Self {
            status,
            gated: report.gated,
            candidates: report.candidates,
            tested: report.tested,
            hits: report.hits,
            errors: report.errors,
            regions,
        }
    }
}

/// A parsed page plus the coordinator that scanned it.
pub struct PageScan {
    pub document: MemoryDocument,
    pub coordinator: ScanCoordinator<MemoryDocument>,
}

impl PageScan {
    /// Load `source` for `host` under `config`. Nothing is scanned yet.
    pub fn new(source: &str, host: &str, config: Config) -> Self {
        let store = MemoryConfigSource::new(config);
        let coordinator = ScanCoordinator::from_source(
            &store,
            Box::new(InflectionCompiler::default()),
            Box::new(host.to_string()),
        );
        Self {
            document: html::parse_document(source),
            coordinator,
        }
    }

    /// Full pass over the page.
    pub fn scan(&mut self) -> ScanReport {
        let root = self.document.root();
        self.coordinator.scan(&mut self.document, root)
    }

    pub fn marked_regions(&self) -> Vec<MarkedRegion> {
        self.document
            .marked_nodes()
            .into_iter()
            .map(|node| self.describe(node))
            .collect()
    }

    fn describe(&self, node: NodeId) -> MarkedRegion {
        let text = self.document.text(node).unwrap_or_default();
        let mut snippet: String = text.chars().take(SNIPPET_CHARS).collect();
        if text.chars().count() > SNIPPET_CHARS {
            snippet.push('…');
        }
        MarkedRegion {
            node: node.index(),
            tag: self.document.tag(node).unwrap_or_default().to_string(),
            classes: self.document.attribute(node, "class").unwrap_or_default(),
            treatment: self
                .document
                .treatment(node)
                .map(|mode| mode.as_str().to_string())
                .unwrap_or_default(),
            snippet,
        }
    }
}

/// Parse and scan `source` in one go.
pub fn scan_html(source: &str, host: &str, config: Config) -> ScanSummary {
    let mut page = PageScan::new(source, host, config);
    let report = page.scan();
    ScanSummary::new(page.coordinator.status(), &report, page.marked_regions())
}
