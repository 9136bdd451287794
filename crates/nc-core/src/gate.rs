//! Domain Gate
//!
//! Decides whether filtering runs on the current host. A non-empty
//! allowlist is authoritative; otherwise the blocklist is.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::config::{ConfigChange, ConfigField};
use crate::host::normalize_host;

/// Normalized allow/block host sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainLists {
    allowlist: BTreeSet<String>,
    blocklist: BTreeSet<String>,
}

impl DomainLists {
    pub fn new<S: AsRef<str>>(allowlist: &[S], blocklist: &[S]) -> Self {
        Self {
            allowlist: normalized_set(allowlist),
            blocklist: normalized_set(blocklist),
        }
    }

    pub fn allowlist(&self) -> impl Iterator<Item = &str> {
        self.allowlist.iter().map(String::as_str)
    }

    pub fn blocklist(&self) -> impl Iterator<Item = &str> {
        self.blocklist.iter().map(String::as_str)
    }

    /// Site-level decision, ignoring global enablement.
    pub fn is_site_disabled(&self, host: &str) -> bool {
        let host = normalize_host(host);
        if !self.allowlist.is_empty() {
            return !self.allowlist.contains(&host);
        }
        self.blocklist.contains(&host)
    }

    /// Flip filtering for `host`.
    ///
    /// Toggles membership in the allowlist when it is in use, otherwise in
    /// the blocklist. Returns the delta for the list that changed.
    pub fn toggle_host(&mut self, host: &str) -> ConfigChange {
        let host = normalize_host(host);
        let (field, list) = if self.allowlist.is_empty() {
            (ConfigField::Blocklist, &mut self.blocklist)
        } else {
            (ConfigField::Allowlist, &mut self.allowlist)
        };

        if !list.remove(&host) {
            list.insert(host);
        }

        let values = list.iter().cloned().map(Value::String).collect();
        ConfigChange::new(field, Value::Array(values))
    }
}

fn normalized_set<S: AsRef<str>>(hosts: &[S]) -> BTreeSet<String> {
    hosts
        .iter()
        .map(|h| normalize_host(h.as_ref()))
        .filter(|h| !h.is_empty())
        .collect()
}

/// Full gate decision: disabled globally or on this site.
pub fn is_disabled(host: &str, lists: &DomainLists, enabled: bool) -> bool {
    !enabled || lists.is_site_disabled(host)
}

// =============================================================================
// Site Status
// =============================================================================

/// Status fed to the toolbar badge and popup.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStatus {
    pub host: String,
    pub enabled: bool,
    pub site_disabled: bool,
    pub hidden_count: usize,
}

impl SiteStatus {
    /// Badge label: "OFF" when filtering does not run here.
    pub fn badge_text(&self) -> &'static str {
        if !self.enabled || self.site_disabled {
            "OFF"
        } else {
            ""
        }
    }

    /// Popup status line.
    pub fn label(&self) -> &'static str {
        if !self.enabled {
            "Disabled globally"
        } else if self.site_disabled {
            "Paused on this site"
        } else {
            "Enabled"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_allowlist_is_authoritative() {
        let lists = DomainLists::new(&["a.com"], &["b.com"]);
        assert!(is_disabled("b.com", &lists, true));
        assert!(!is_disabled("a.com", &lists, true));
        assert!(is_disabled("c.com", &lists, true));
    }

    #[test]
    fn test_blocklist_when_allowlist_empty() {
        let lists = DomainLists::new(&[] as &[&str], &["b.com"]);
        assert!(is_disabled("b.com", &lists, true));
        assert!(is_disabled("www.b.com", &lists, true));
        assert!(!is_disabled("c.com", &lists, true));
    }

    #[test]
    fn test_global_disable_wins() {
        let lists = DomainLists::default();
        assert!(is_disabled("a.com", &lists, false));
        assert!(!is_disabled("a.com", &lists, true));
    }

    #[test]
    fn test_toggle_host_uses_blocklist_by_default() {
        let mut lists = DomainLists::default();
        let change = lists.toggle_host("https://www.b.com/news");
        assert_eq!(change.field, ConfigField::Blocklist);
        assert_eq!(change.new_value, json!(["b.com"]));
        assert!(lists.is_site_disabled("b.com"));

        let change = lists.toggle_host("b.com");
        assert_eq!(change.new_value, json!([]));
        assert!(!lists.is_site_disabled("b.com"));
    }

    #[test]
    fn test_toggle_host_uses_allowlist_when_present() {
        let mut lists = DomainLists::new(&["a.com"], &[]);
        let change = lists.toggle_host("c.com");
        assert_eq!(change.field, ConfigField::Allowlist);
        assert_eq!(change.new_value, json!(["a.com", "c.com"]));
        assert!(!lists.is_site_disabled("c.com"));
    }

    #[test]
    fn test_badge_text() {
        let mut status = SiteStatus {
            host: "a.com".into(),
            enabled: true,
            site_disabled: false,
            hidden_count: 3,
        };
        assert_eq!(status.badge_text(), "");
        assert_eq!(status.label(), "Enabled");
        status.site_disabled = true;
        assert_eq!(status.badge_text(), "OFF");
        assert_eq!(status.label(), "Paused on this site");
        status.enabled = false;
        assert_eq!(status.label(), "Disabled globally");
    }
}
