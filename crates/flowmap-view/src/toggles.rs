//! Per-bucket collapse state.

use std::collections::BTreeMap;

use flowmap_core::model::Group;
use serde::Serialize;

/// Expanded/collapsed flag per [`Group`].
///
/// Every bucket starts collapsed. The map always holds an entry for every
/// bucket, so lookups never miss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ToggleMap {
    expanded: BTreeMap<Group, bool>,
}

impl Default for ToggleMap {
    fn default() -> Self {
        Self::collapsed()
    }
}

impl ToggleMap {
    /// All buckets collapsed.
    #[must_use]
    pub fn collapsed() -> Self {
        Self {
            expanded: Group::ALL.iter().map(|&g| (g, false)).collect(),
        }
    }

    /// All buckets expanded.
    #[must_use]
    pub fn expanded() -> Self {
        Self {
            expanded: Group::ALL.iter().map(|&g| (g, true)).collect(),
        }
    }

    #[must_use]
    pub fn is_expanded(&self, group: Group) -> bool {
        self.expanded.get(&group).copied().unwrap_or(false)
    }

    /// Set one bucket. Returns `true` if the state changed.
    pub fn set(&mut self, group: Group, expanded: bool) -> bool {
        self.expanded.insert(group, expanded) != Some(expanded)
    }

    /// Flip one bucket and return its new state.
    pub fn toggle(&mut self, group: Group) -> bool {
        let next = !self.is_expanded(group);
        self.expanded.insert(group, next);
        next
    }

    pub fn expand_all(&mut self) {
        self.expanded.values_mut().for_each(|v| *v = true);
    }

    pub fn collapse_all(&mut self) {
        self.expanded.values_mut().for_each(|v| *v = false);
    }

    /// Buckets currently expanded, in [`Group`] order.
    pub fn expanded_groups(&self) -> impl Iterator<Item = Group> + '_ {
        self.expanded
            .iter()
            .filter_map(|(&g, &expanded)| expanded.then_some(g))
    }
}

/// Build a map where exactly the given buckets are expanded.
impl FromIterator<Group> for ToggleMap {
    fn from_iter<I: IntoIterator<Item = Group>>(iter: I) -> Self {
        let mut map = Self::collapsed();
        for group in iter {
            map.set(group, true);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_all_collapsed() {
        let map = ToggleMap::default();
        assert!(Group::ALL.iter().all(|&g| !map.is_expanded(g)));
        assert_eq!(map.expanded_groups().count(), 0);
    }

    #[test]
    fn toggle_flips_and_reports_state() {
        let mut map = ToggleMap::default();
        assert!(map.toggle(Group::Supabase));
        assert!(map.is_expanded(Group::Supabase));
        assert!(!map.toggle(Group::Supabase));
        assert_eq!(map, ToggleMap::default());
    }

    #[test]
    fn set_reports_change() {
        let mut map = ToggleMap::default();
        assert!(map.set(Group::Rpc, true));
        assert!(!map.set(Group::Rpc, true));
        assert!(map.set(Group::Rpc, false));
    }

    #[test]
    fn from_iter_expands_listed_groups() {
        let map: ToggleMap = [Group::Workflow, Group::Notion].into_iter().collect();
        assert_eq!(
            map.expanded_groups().collect::<Vec<_>>(),
            [Group::Workflow, Group::Notion]
        );
    }

    #[test]
    fn expand_all_then_collapse_all() {
        let mut map = ToggleMap::default();
        map.expand_all();
        assert_eq!(map, ToggleMap::expanded());
        map.collapse_all();
        assert_eq!(map, ToggleMap::collapsed());
    }
}
