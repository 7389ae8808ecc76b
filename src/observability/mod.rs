//! API contract advisories.
//!
//! The client watches every decoded response for two upstream signals: a
//! change in the reported API version, and links the server has flagged as
//! deprecated. Both are advisory: they emit `tracing` warnings and never
//! fail the call.

use std::sync::Mutex;

use crate::envelope::Collection;

/// A server-side deprecation notice attached to a link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeprecatedLink {
    /// Link relation name.
    pub rel: String,
    /// Target URI.
    pub href: String,
    /// Server-provided description, if any.
    pub prompt: Option<String>,
}

/// Collects deprecation notices from a collection's links.
pub fn deprecated_links(collection: &Collection) -> Vec<DeprecatedLink> {
    collection
        .links
        .iter()
        .filter(|link| link.deprecated)
        .map(|link| DeprecatedLink {
            rel: link.rel.clone(),
            href: link.href.clone(),
            prompt: link.prompt.clone(),
        })
        .collect()
}

/// Tracks the last-seen API version and emits advisories on change.
pub struct ApiVersionMonitor {
    enabled: bool,
    last_version: Mutex<Option<String>>,
}

impl ApiVersionMonitor {
    /// Creates a monitor.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            last_version: Mutex::new(None),
        }
    }

    /// The most recently observed API version.
    pub fn last_version(&self) -> Option<String> {
        self.last_version.lock().unwrap().clone()
    }

    /// Inspects a decoded collection for version changes and deprecated
    /// links. Advisory only.
    pub fn observe(&self, collection: &Collection) {
        if !self.enabled {
            return;
        }

        if let Some(version) = &collection.version {
            let mut last = self.last_version.lock().unwrap();
            match last.as_deref() {
                Some(previous) if previous != version => {
                    tracing::warn!(previous, current = %version, "API version changed");
                }
                None => {
                    tracing::info!(version = %version, "API version observed");
                }
                _ => {}
            }
            *last = Some(version.clone());
        }

        for link in deprecated_links(collection) {
            tracing::warn!(
                rel = %link.rel,
                href = %link.href,
                prompt = link.prompt.as_deref().unwrap_or("no description provided"),
                "deprecated endpoint"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Link;

    fn collection_with_version(version: &str) -> Collection {
        Collection {
            version: Some(version.to_string()),
            ..Collection::default()
        }
    }

    #[test]
    fn monitor_tracks_version_changes() {
        let monitor = ApiVersionMonitor::new(true);
        assert_eq!(monitor.last_version(), None);

        monitor.observe(&collection_with_version("3.867.0"));
        assert_eq!(monitor.last_version().as_deref(), Some("3.867.0"));

        monitor.observe(&collection_with_version("3.868.0"));
        assert_eq!(monitor.last_version().as_deref(), Some("3.868.0"));
    }

    #[test]
    fn disabled_monitor_records_nothing() {
        let monitor = ApiVersionMonitor::new(false);
        monitor.observe(&collection_with_version("3.867.0"));
        assert_eq!(monitor.last_version(), None);
    }

    #[test]
    fn deprecated_links_are_collected() {
        let collection = Collection {
            links: vec![
                Link {
                    rel: "teams".into(),
                    href: "https://api.teamsnap.com/v3/teams".into(),
                    prompt: None,
                    deprecated: false,
                },
                Link {
                    rel: "old_rosters".into(),
                    href: "https://api.teamsnap.com/v3/old_rosters".into(),
                    prompt: Some("Use members instead".into()),
                    deprecated: true,
                },
            ],
            ..Collection::default()
        };

        let deprecated = deprecated_links(&collection);
        assert_eq!(deprecated.len(), 1);
        assert_eq!(deprecated[0].rel, "old_rosters");
        assert_eq!(deprecated[0].prompt.as_deref(), Some("Use members instead"));
    }
}
