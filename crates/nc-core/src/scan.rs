//! Scan Coordinator
//!
//! Drives the scan loop: an initial full pass, debounced passes when nodes
//! are added, idempotent marking through a visited set, and a full
//! re-evaluation after configuration changes that affect matching.
//!
//! State machine: `Idle -> ScanScheduled -> Scanning -> Idle`. At most one
//! pass is pending at any time and every pending pass is a full-document
//! pass. Configuration deltas are applied between passes only; a pass runs
//! against one [`ScanState`] snapshot from start to finish.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::{ChangeSet, Config, ConfigChange, ConfigSource, ConfigSubscription};
use crate::dom::Document;
use crate::gate::{is_disabled, DomainLists, SiteStatus};
use crate::host::HostProvider;
use crate::matcher::Matcher;
use crate::region::{relevant_text, RegionSelector};
use crate::types::{Mode, PatternCompiler, PatternSet};

// =============================================================================
// Scan State
// =============================================================================

/// Immutable, versioned snapshot of everything a pass depends on.
#[derive(Debug, Clone)]
pub struct ScanState {
    pub version: u64,
    pub enabled: bool,
    pub mode: Mode,
    pub aggressive: bool,
    pub keywords: Vec<String>,
    pub patterns: Arc<PatternSet>,
    pub domains: DomainLists,
}

impl ScanState {
    fn from_config(version: u64, config: &Config, patterns: Arc<PatternSet>) -> Self {
        Self {
            version,
            enabled: config.enabled,
            mode: config.mode,
            aggressive: config.aggressive,
            keywords: config.keywords.clone(),
            patterns,
            domains: config.domain_lists(),
        }
    }
}

/// Scheduler phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ScanScheduled,
    Scanning,
}

/// Outcome of one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// State version the pass ran against
    pub version: u64,
    /// Domain gate closed; nothing was tested
    pub gated: bool,
    /// Marks removed by an invalidation before the pass
    pub cleared: usize,
    /// Regions forgotten because they left the document
    pub released: usize,
    /// Regions produced by the selector
    pub candidates: usize,
    /// Regions skipped because already visited
    pub skipped: usize,
    /// Regions tested against the matcher
    pub tested: usize,
    /// Regions newly marked
    pub hits: usize,
    /// Regions whose text could not be read or that could not be marked
    pub errors: usize,
}

// =============================================================================
// Coordinator
// =============================================================================

/// Owns [`ScanState`], the visited set and the pending-scan slot.
pub struct ScanCoordinator<D: Document> {
    compiler: Box<dyn PatternCompiler>,
    host: Box<dyn HostProvider>,
    config: Config,
    state: Arc<ScanState>,
    phase: Phase,
    invalidated: bool,
    visited: HashSet<D::Node>,
    marked: HashSet<D::Node>,
}

impl<D: Document> ScanCoordinator<D> {
    pub fn new(config: Config, compiler: Box<dyn PatternCompiler>, host: Box<dyn HostProvider>) -> Self {
        let patterns = Arc::new(compiler.compile_all(&config.keywords));
        log::debug!(
            "compiled {} pattern(s) from {} keyword(s)",
            patterns.len(),
            config.keywords.len()
        );
        let state = Arc::new(ScanState::from_config(1, &config, patterns));
        Self {
            compiler,
            host,
            config,
            state,
            phase: Phase::Idle,
            invalidated: false,
            visited: HashSet::new(),
            marked: HashSet::new(),
        }
    }

    /// Build from a configuration store, falling back to defaults.
    pub fn from_source(
        source: &dyn ConfigSource,
        compiler: Box<dyn PatternCompiler>,
        host: Box<dyn HostProvider>,
    ) -> Self {
        Self::new(source.load_or_default(), compiler, host)
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_scheduled(&self) -> bool {
        self.phase == Phase::ScanScheduled
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn is_marked(&self, node: D::Node) -> bool {
        self.marked.contains(&node)
    }

    pub fn marked_count(&self) -> usize {
        self.marked.len()
    }

    // -------------------------------------------------------------------------
    // Scheduling
    // -------------------------------------------------------------------------

    /// Request a full pass. Returns true only when this call filled the
    /// pending slot, i.e. the host should request a paint callback.
    pub fn schedule(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.phase = Phase::ScanScheduled;
        true
    }

    /// Nodes were added somewhere under the document.
    pub fn notify_added(&mut self, added: &[D::Node]) -> bool {
        if !self.state.enabled || added.is_empty() {
            return false;
        }
        self.schedule()
    }

    /// Run the pending pass, if any. Called from the paint/idle callback.
    pub fn run_pending(&mut self, doc: &mut D) -> Option<ScanReport> {
        if self.phase != Phase::ScanScheduled {
            return None;
        }
        self.phase = Phase::Idle;
        if !self.state.enabled {
            return None;
        }
        let root = doc.root();
        Some(self.scan(doc, root))
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    /// Apply a batch of deltas and publish a new state snapshot.
    ///
    /// Changes that affect matching invalidate all earlier results; the
    /// marks and visited set are cleared at the start of the next pass.
    pub fn apply_changes<I>(&mut self, changes: I) -> ChangeSet
    where
        I: IntoIterator<Item = ConfigChange>,
    {
        let mut changed = ChangeSet::empty();
        for change in changes {
            changed |= self.config.apply(&change);
        }
        if changed.is_empty() {
            return changed;
        }

        let patterns = if changed.contains(ChangeSet::KEYWORDS) {
            Arc::new(self.compiler.compile_all(&self.config.keywords))
        } else {
            Arc::clone(&self.state.patterns)
        };
        let version = self.state.version + 1;
        self.state = Arc::new(ScanState::from_config(version, &self.config, patterns));
        log::debug!("configuration v{} applied: {:?}", version, changed);

        if changed.affects_matching() {
            self.invalidated = true;
        }
        if self.state.enabled && (changed.affects_matching() || changed.contains(ChangeSet::ENABLED)) {
            self.schedule();
        }
        changed
    }

    /// Drain a subscription and apply whatever it delivered.
    pub fn sync(&mut self, subscription: &mut dyn ConfigSubscription) -> ChangeSet {
        self.apply_changes(subscription.drain())
    }

    // -------------------------------------------------------------------------
    // Scanning
    // -------------------------------------------------------------------------

    /// Scan `root` now, bypassing the scheduler.
    pub fn scan(&mut self, doc: &mut D, root: D::Node) -> ScanReport {
        let state = Arc::clone(&self.state);
        let previous = self.phase;
        self.phase = Phase::Scanning;

        let mut report = ScanReport {
            version: state.version,
            ..ScanReport::default()
        };

        report.released = self.forget_detached(doc);
        if self.invalidated {
            report.cleared = self.clear_marks(doc);
            self.invalidated = false;
        }

        let host = self.host.hostname();
        if is_disabled(&host, &state.domains, state.enabled) {
            log::debug!("filtering disabled on '{}'", host);
            report.gated = true;
            self.phase = previous;
            return report;
        }

        let matcher = Matcher::new(&state.patterns);
        let selector = RegionSelector::new(matcher, &host, state.aggressive);
        let regions = selector.select(&*doc, root);
        report.candidates = regions.len();

        for region in regions {
            if !self.visited.insert(region) {
                report.skipped += 1;
                continue;
            }
            report.tested += 1;

            let text = match relevant_text(&*doc, region) {
                Ok(text) => text,
                Err(e) => {
                    log::debug!("skipping region {:?}: {}", region, e);
                    report.errors += 1;
                    continue;
                }
            };
            if !matcher.matches(&text) {
                continue;
            }

            match doc.mark(region, state.mode) {
                Ok(()) => {
                    self.marked.insert(region);
                    report.hits += 1;
                }
                Err(e) => {
                    log::warn!("failed to mark region {:?}: {}", region, e);
                    report.errors += 1;
                }
            }
        }

        log::debug!(
            "scan v{}: {} candidate(s), {} tested, {} hit(s), {} skipped",
            report.version,
            report.candidates,
            report.tested,
            report.hits,
            report.skipped
        );
        // A pass requested while this one ran stays pending.
        self.phase = if previous == Phase::ScanScheduled {
            Phase::ScanScheduled
        } else {
            Phase::Idle
        };
        report
    }

    /// Drop visited and marked entries for nodes that left the document.
    fn forget_detached(&mut self, doc: &mut D) -> usize {
        let released = doc.release_detached();
        for node in &released {
            self.visited.remove(node);
            self.marked.remove(node);
        }
        released.len()
    }

    fn clear_marks(&mut self, doc: &mut D) -> usize {
        let cleared = self.marked.len();
        for node in self.marked.drain() {
            if let Err(e) = doc.unmark(node) {
                log::debug!("failed to unmark {:?}: {}", node, e);
            }
        }
        self.visited.clear();
        cleared
    }

    /// Undo the treatment on one region at the reader's request.
    ///
    /// The region stays visited so later passes leave it alone.
    pub fn reveal(&mut self, doc: &mut D, node: D::Node) -> bool {
        if !self.marked.remove(&node) {
            return false;
        }
        if let Err(e) = doc.unmark(node) {
            log::warn!("failed to reveal {:?}: {}", node, e);
        }
        true
    }

    /// Badge / popup status for the current host.
    pub fn status(&self) -> SiteStatus {
        let host = self.host.hostname();
        SiteStatus {
            site_disabled: self.state.domains.is_site_disabled(&host),
            host,
            enabled: self.state.enabled,
            hidden_count: self.marked.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigField;
    use crate::dom::memory::{MemoryDocument, NodeId};
    use crate::testing::LiteralCompiler;
    use serde_json::json;

    fn config(keywords: &[&str]) -> Config {
        Config {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            ..Config::default()
        }
    }

    fn coordinator(config: Config, host: &str) -> ScanCoordinator<MemoryDocument> {
        ScanCoordinator::new(config, Box::new(LiteralCompiler), Box::new(host.to_string()))
    }

    fn scan_all(coord: &mut ScanCoordinator<MemoryDocument>, doc: &mut MemoryDocument) -> ScanReport {
        let root = doc.root();
        coord.scan(doc, root)
    }

    fn news_page() -> (MemoryDocument, NodeId, NodeId) {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let body = doc.append_element(root, "body", &[]);
        let first = doc.append_element(body, "article", &[]);
        let h2 = doc.append_element(first, "h2", &[]);
        doc.append_text(h2, "Putin visits factory");
        let second = doc.append_element(body, "article", &[]);
        let h2 = doc.append_element(second, "h2", &[]);
        doc.append_text(h2, "Trump holds rally");
        (doc, first, second)
    }

    #[test]
    fn test_scan_marks_hits_once() {
        let (mut doc, first, second) = news_page();
        let mut coord = coordinator(config(&["putin"]), "news.com");

        let report = scan_all(&mut coord, &mut doc);
        assert_eq!(report.hits, 1);
        assert_eq!(report.tested, 2);
        assert_eq!(doc.treatment(first), Some(Mode::Hide));
        assert_eq!(doc.treatment(second), None);
        assert_eq!(doc.reveal_controls(first), 1);

        let again = scan_all(&mut coord, &mut doc);
        assert_eq!(again.hits, 0);
        assert_eq!(again.tested, 0);
        assert_eq!(again.skipped, 2);
        assert_eq!(doc.reveal_controls(first), 1);
    }

    #[test]
    fn test_keyword_change_reevaluates() {
        let (mut doc, first, second) = news_page();
        let mut coord = coordinator(config(&["putin"]), "news.com");
        scan_all(&mut coord, &mut doc);

        let changed = coord.apply_changes([ConfigChange::new(ConfigField::Keywords, json!(["trump"]))]);
        assert!(changed.affects_matching());
        assert!(coord.is_scheduled());
        assert_eq!(coord.state().version, 2);

        let report = coord.run_pending(&mut doc).unwrap();
        assert_eq!(report.cleared, 1);
        assert_eq!(report.hits, 1);
        assert_eq!(doc.marked_nodes(), vec![second]);
        assert_eq!(doc.treatment(first), None);
        assert_eq!(coord.phase(), Phase::Idle);
    }

    #[test]
    fn test_enable_toggle_keeps_visited() {
        let (mut doc, _, _) = news_page();
        let mut coord = coordinator(config(&["putin"]), "news.com");
        scan_all(&mut coord, &mut doc);

        coord.apply_changes([ConfigChange::new(ConfigField::Enabled, json!(false))]);
        assert!(!coord.is_scheduled());
        assert!(!coord.notify_added(&[doc.root()]));

        coord.apply_changes([ConfigChange::new(ConfigField::Enabled, json!(true))]);
        assert!(coord.is_scheduled());
        let report = coord.run_pending(&mut doc).unwrap();
        assert_eq!(report.cleared, 0);
        assert_eq!(report.skipped, 2);
        assert_eq!(coord.visited_count(), 2);
    }

    #[test]
    fn test_notify_added_debounces() {
        let (mut doc, _, _) = news_page();
        let mut coord = coordinator(config(&["putin"]), "news.com");
        let root = doc.root();

        assert!(coord.notify_added(&[root]));
        assert!(!coord.notify_added(&[root]));
        assert!(!coord.notify_added(&[]));
        assert!(coord.run_pending(&mut doc).is_some());
        assert!(coord.run_pending(&mut doc).is_none());
    }

    #[test]
    fn test_incremental_content_is_scanned() {
        let (mut doc, _, _) = news_page();
        let mut coord = coordinator(config(&["putin"]), "news.com");
        scan_all(&mut coord, &mut doc);

        let body = doc.children(doc.root())[0];
        let late = doc.append_element(body, "div", &[("class", "news-item")]);
        let p = doc.append_element(late, "p", &[]);
        doc.append_text(p, "More on Putin");

        assert!(coord.notify_added(&[late]));
        let report = coord.run_pending(&mut doc).unwrap();
        assert_eq!(report.tested, 1);
        assert_eq!(report.hits, 1);
        assert!(coord.is_marked(late));
        assert_eq!(coord.status().hidden_count, 2);
    }

    #[test]
    fn test_domain_gate_blocks_scan() {
        let (mut doc, first, _) = news_page();
        let mut cfg = config(&["putin"]);
        cfg.allowlist = vec!["a.com".into()];
        cfg.blocklist = vec!["b.com".into()];
        let mut coord = coordinator(cfg, "https://www.b.com/");

        let report = scan_all(&mut coord, &mut doc);
        assert!(report.gated);
        assert_eq!(doc.treatment(first), None);
        let status = coord.status();
        assert!(status.site_disabled);
        assert_eq!(status.badge_text(), "OFF");
    }

    #[test]
    fn test_blocklisting_site_clears_marks() {
        let (mut doc, first, _) = news_page();
        let mut coord = coordinator(config(&["putin"]), "b.com");
        scan_all(&mut coord, &mut doc);
        assert!(coord.is_marked(first));

        let change = coord.state().domains.clone().toggle_host("b.com");
        coord.apply_changes([change]);
        let report = coord.run_pending(&mut doc).unwrap();
        assert!(report.gated);
        assert_eq!(report.cleared, 1);
        assert!(doc.marked_nodes().is_empty());
    }

    #[test]
    fn test_removed_regions_are_forgotten() {
        let (mut doc, first, second) = news_page();
        let mut coord = coordinator(config(&["putin"]), "news.com");
        scan_all(&mut coord, &mut doc);
        assert!(coord.is_marked(first));
        assert_eq!(coord.visited_count(), 2);

        doc.detach(first);
        let report = scan_all(&mut coord, &mut doc);
        assert!(report.released >= 1);
        assert!(!coord.is_marked(first));
        assert_eq!(coord.marked_count(), 0);
        assert_eq!(coord.visited_count(), 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(doc.treatment(second), None);

        let report = scan_all(&mut coord, &mut doc);
        assert_eq!(report.released, 0);
    }

    #[test]
    fn test_extraction_errors_skip_region() {
        let mut doc = MemoryDocument::new();
        let body = doc.append_element(doc.root(), "body", &[]);
        let broken = doc.append_element(body, "article", &[]);
        let inner = doc.append_element(broken, "section", &[]);
        doc.append_text(inner, "putin");
        let ok = doc.append_element(body, "article", &[]);
        doc.append_text(ok, "putin again");

        let mut coord = coordinator(config(&["putin"]), "news.com");
        doc.detach(inner);

        let report = scan_all(&mut coord, &mut doc);
        assert_eq!(report.errors, 0);
        assert!(coord.is_marked(ok));

        // Region handed over by a stale mutation record: text read fails.
        let report = coord.scan(&mut doc, inner);
        assert_eq!(report.errors, 1);
        assert!(!coord.is_marked(inner));
    }

    #[test]
    fn test_blur_mode_and_reveal() {
        let (mut doc, first, _) = news_page();
        let mut cfg = config(&["putin"]);
        cfg.mode = Mode::Blur;
        let mut coord = coordinator(cfg, "news.com");
        scan_all(&mut coord, &mut doc);
        assert_eq!(doc.treatment(first), Some(Mode::Blur));

        assert!(coord.reveal(&mut doc, first));
        assert!(!coord.reveal(&mut doc, first));
        assert_eq!(doc.treatment(first), None);

        let report = scan_all(&mut coord, &mut doc);
        assert_eq!(report.hits, 0);
        assert_eq!(doc.treatment(first), None);
    }

    #[test]
    fn test_from_source_and_sync() {
        use crate::config::MemoryConfigSource;

        let (mut doc, first, _) = news_page();
        let mut source = MemoryConfigSource::new(config(&["putin"]));
        let mut coord: ScanCoordinator<MemoryDocument> =
            ScanCoordinator::from_source(&source, Box::new(LiteralCompiler), Box::new("news.com"));
        scan_all(&mut coord, &mut doc);
        assert!(coord.is_marked(first));

        source.set(ConfigChange::new(ConfigField::Mode, json!("blur")));
        let changed = coord.sync(&mut source);
        assert_eq!(changed, ChangeSet::MODE);
        coord.run_pending(&mut doc);
        assert_eq!(doc.treatment(first), Some(Mode::Blur));
    }
}
