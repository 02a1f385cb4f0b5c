use crate::registry::Registry;
use crate::Issue;
use std::fmt;

/// Where a selection request came from; used for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    MapPin,
    ListRow,
    Back,
}

impl fmt::Display for SelectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SelectionSource::MapPin => "map-pin",
            SelectionSource::ListRow => "list-row",
            SelectionSource::Back => "back",
        })
    }
}

/// The single focused issue shared by the map and the list/detail panel.
/// Holds an id only; never the issue itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<String>,
}

impl Selection {
    /// Returns true when the selection changed.
    pub fn select(&mut self, id: Option<&str>) -> bool {
        let next = id.map(str::to_string);
        if self.current == next {
            return false;
        }
        self.current = next;
        true
    }

    pub fn clear(&mut self) -> bool {
        self.select(None)
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.current.as_deref() == Some(id)
    }

    /// Looks the selected id up; a stale id resolves to `None`.
    pub fn resolve<'a>(&self, registry: &'a Registry) -> Option<&'a Issue> {
        self.current.as_deref().and_then(|id| registry.issue(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn select_reports_changes_only() {
        let mut selection = Selection::default();
        assert!(selection.select(Some("ISS-2023-004")));
        assert!(!selection.select(Some("ISS-2023-004")));
        assert!(selection.is_selected("ISS-2023-004"));
        assert!(selection.clear());
        assert!(!selection.clear());
        assert_eq!(selection.current(), None);
    }

    #[test]
    fn stale_id_resolves_to_nothing() {
        let registry = seed::builtin().expect("seed");
        let mut selection = Selection::default();
        selection.select(Some("ISS-1999-999"));
        assert!(selection.resolve(&registry).is_none());
        selection.select(Some("ISS-2023-004"));
        assert_eq!(
            selection.resolve(&registry).map(|issue| issue.id.as_str()),
            Some("ISS-2023-004")
        );
    }
}
