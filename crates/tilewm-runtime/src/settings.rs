#![forbid(unsafe_code)]

//! Per-region settings panels.
//!
//! Regions that expose a settings UI are listed by display name; each can be
//! opened independently and stays open until closed or its region leaves
//! the tree.

use rustc_hash::FxHashSet;
use tilewm_core::draw::DrawList;
use tilewm_layout::{LayoutTree, RegionId};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsEntry {
    pub region: RegionId,
    pub name: String,
    pub open: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SettingsPanel {
    open: FxHashSet<RegionId>,
}

impl SettingsPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Regions with a settings UI, sorted by name (ties by id).
    #[must_use]
    pub fn entries(&self, tree: &LayoutTree) -> Vec<SettingsEntry> {
        let mut entries: Vec<SettingsEntry> = tree
            .regions()
            .into_iter()
            .filter_map(|id| {
                let region = tree.region(id)?;
                region.has_settings_ui().then(|| SettingsEntry {
                    region: id,
                    name: region.display_name(),
                    open: self.open.contains(&id),
                })
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name).then(a.region.cmp(&b.region)));
        entries
    }

    #[must_use]
    pub fn is_open(&self, region: RegionId) -> bool {
        self.open.contains(&region)
    }

    /// Open or close `region`'s panel. Regions without a settings UI are
    /// never opened.
    pub fn toggle(&mut self, tree: &LayoutTree, region: RegionId) -> bool {
        if !self.open.remove(&region) {
            if !tree.region(region).is_some_and(|r| r.has_settings_ui()) {
                return false;
            }
            self.open.insert(region);
        }
        let open = self.open.contains(&region);
        debug!(target: "tilewm.wm", region = %region, open, "settings panel toggled");
        open
    }

    pub fn close(&mut self, region: RegionId) {
        self.open.remove(&region);
    }

    /// Forget panels whose region left the tree.
    pub fn prune(&mut self, tree: &LayoutTree) {
        self.open.retain(|r| tree.contains_region(*r));
    }

    /// Draw every open panel in listing order.
    pub fn draw(&self, tree: &mut LayoutTree, out: &mut DrawList) {
        for entry in self.entries(tree).into_iter().filter(|e| e.open) {
            if let Some(region) = tree.region_mut(entry.region) {
                region.draw_settings(out);
            }
        }
    }

    pub fn reset(&mut self) {
        self.open.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilewm_core::geometry::Axis;
    use tilewm_layout::testing::LabelRegion;

    fn tree() -> (LayoutTree, RegionId, RegionId, RegionId) {
        let mut tree = LayoutTree::new(LabelRegion::new("Zulu").focusable().boxed());
        let z = tree.regions()[0];
        let a = tree
            .split_region(z, Axis::Horizontal, LabelRegion::new("Alpha").focusable().boxed())
            .expect("split");
        let plain = tree
            .split_region(a, Axis::Vertical, LabelRegion::new("Plain").boxed())
            .expect("split");
        (tree, z, a, plain)
    }

    #[test]
    fn entries_are_sorted_and_filtered() {
        let (tree, z, a, _) = tree();
        let panel = SettingsPanel::new();
        let names: Vec<_> = panel.entries(&tree).into_iter().map(|e| (e.region, e.name)).collect();
        assert_eq!(names, vec![(a, "Alpha".into()), (z, "Zulu".into())]);
    }

    #[test]
    fn toggle_opens_only_regions_with_settings() {
        let (tree, z, _, plain) = tree();
        let mut panel = SettingsPanel::new();
        assert!(!panel.toggle(&tree, plain));
        assert!(panel.toggle(&tree, z));
        assert!(panel.is_open(z));
        assert!(!panel.toggle(&tree, z));
        assert!(!panel.is_open(z));
    }

    #[test]
    fn prune_drops_removed_regions() {
        let (mut tree, z, a, _) = tree();
        let mut panel = SettingsPanel::new();
        panel.toggle(&tree, a);
        panel.toggle(&tree, z);
        tree.delete(a).expect("delete");
        panel.prune(&tree);
        assert!(!panel.is_open(a));
        assert!(panel.is_open(z));
    }
}
