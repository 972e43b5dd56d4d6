//! Reconciles a layout result's outputs against live mounted content.
//!
//! The mount index maps output ids to [`MountItem`]s. A mount call either
//! walks the whole output list (new result, or a visible rect that moved
//! sideways) or, when only the visible rect slid vertically over the same
//! result, walks the top/bottom orderings from where the last call stopped.

use std::sync::Arc;

use mosaic_core::{Map, MountError, Rect};
use mosaic_layout::{LayoutOutput, LayoutResult, OutputId, UpdateState};

use crate::mount_item::MountItem;
use crate::provider::{MountBinding, MountContentProvider};
use crate::visibility::{VisibilityStats, VisibilityTracker};

/// What one mount call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MountStats {
    pub mounted: usize,
    pub unmounted: usize,
    /// Mounted content rebound to a new output.
    pub updated: usize,
    /// Mounted content left alone because nothing about it changed.
    pub no_op_updates: usize,
    pub moved: usize,
    pub bounds_changed: usize,
    /// Outputs skipped because their content could not be mounted.
    pub failed: usize,
    /// Visibility handlers fired by this call.
    pub visibility: VisibilityStats,
}

impl MountStats {
    /// True when the call touched no mounted content at all.
    pub fn is_quiet(&self) -> bool {
        self.mounted == 0
            && self.unmounted == 0
            && self.updated == 0
            && self.moved == 0
            && self.bounds_changed == 0
            && self.failed == 0
    }
}

pub struct MountState<P: MountContentProvider> {
    provider: P,
    items: Map<OutputId, MountItem<P::Content>>,
    /// Number of mounted items per mounted host.
    host_children: Map<OutputId, usize>,
    last: Option<Arc<LayoutResult>>,
    previous_visible: Option<Rect>,
    /// Position in `tops` of the first output starting below the window.
    tops_index: usize,
    /// Position in `bottoms` of the first output ending below the window top.
    bottoms_index: usize,
    visibility: VisibilityTracker,
    incremental_mount: bool,
    errors: Vec<MountError>,
}

impl<P: MountContentProvider> MountState<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            items: Map::default(),
            host_children: Map::default(),
            last: None,
            previous_visible: None,
            tops_index: 0,
            bottoms_index: 0,
            visibility: VisibilityTracker::new(),
            incremental_mount: true,
            errors: Vec::new(),
        }
    }

    /// With incremental mount off, every output is mounted regardless of
    /// the visible rect. Visibility events still use the rect.
    pub fn with_incremental_mount(mut self, enabled: bool) -> Self {
        self.incremental_mount = enabled;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn is_mounted(&self, id: OutputId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn item(&self, id: OutputId) -> Option<&MountItem<P::Content>> {
        self.items.get(&id)
    }

    pub fn mounted_count(&self) -> usize {
        self.items.len()
    }

    pub fn mounted_ids(&self) -> Vec<OutputId> {
        let mut ids: Vec<OutputId> = self.items.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Mounted children of `host`.
    pub fn child_count(&self, host: OutputId) -> usize {
        self.host_children.get(&host).copied().unwrap_or(0)
    }

    /// Tolerated failures from the last mount call.
    pub fn errors(&self) -> &[MountError] {
        &self.errors
    }

    pub fn visibility(&self) -> &VisibilityTracker {
        &self.visibility
    }

    pub fn last_mounted_result_id(&self) -> Option<u64> {
        self.last.as_ref().map(|result| result.id())
    }

    pub fn mount(&mut self, result: &Arc<LayoutResult>, visible: Option<Rect>) -> MountStats {
        let dirty = self
            .last
            .as_ref()
            .map_or(true, |last| last.id() != result.id());
        let window = if self.incremental_mount { visible } else { None };
        let mut stats = MountStats::default();
        self.errors.clear();

        let windowed = match (self.previous_visible, window) {
            (Some(previous), Some(current))
                if !dirty
                    && previous.left() == current.left()
                    && previous.right() == current.right() =>
            {
                Some(current)
            }
            _ => None,
        };

        match windowed {
            Some(current) => {
                log::trace!("windowed mount of result {} over {current:?}", result.id());
                self.mount_windowed(result, current, &mut stats);
            }
            None => {
                log::trace!("full mount of result {} (dirty: {dirty})", result.id());
                self.mount_full(result, window, dirty, &mut stats);
            }
        }

        self.previous_visible = window;
        self.update_window_indices(result, window);
        self.last = Some(Arc::clone(result));
        stats.visibility = self.visibility.process(result.visibility_outputs(), visible);
        stats
    }

    /// Unmounts everything, children before their hosts.
    pub fn unmount_all(&mut self) -> MountStats {
        let mut stats = MountStats::default();
        if let Some(last) = self.last.take() {
            for output in last.outputs().iter().rev() {
                self.unmount(output.id, &mut stats);
            }
        }
        let leftover: Vec<OutputId> = self.items.keys().copied().collect();
        for id in leftover {
            self.unmount(id, &mut stats);
        }
        self.host_children.clear();
        self.previous_visible = None;
        self.tops_index = 0;
        self.bottoms_index = 0;
        stats.visibility = self.visibility.clear();
        stats
    }

    fn mount_full(
        &mut self,
        result: &LayoutResult,
        visible: Option<Rect>,
        dirty: bool,
        stats: &mut MountStats,
    ) {
        if dirty {
            self.unmount_orphans(result, stats);
        }

        for (index, output) in result.outputs().iter().enumerate() {
            let mounted = self.items.contains_key(&output.id);
            let mountable = output.host.is_none()
                || visible.map_or(true, |visible| visible.intersects(&output.bounds))
                || (mounted && output.is_host() && self.child_count(output.id) > 0);

            match (mountable, mounted) {
                (false, true) => self.unmount(output.id, stats),
                (true, false) => {
                    self.mount_output(result, index, visible, stats);
                }
                (true, true) => self.update_output(result, index, visible, dirty, stats),
                (false, false) => {}
            }
        }
    }

    /// Removes mounted ids that the new result no longer has, walking the
    /// previous result backwards so content goes before its host.
    fn unmount_orphans(&mut self, result: &LayoutResult, stats: &mut MountStats) {
        if let Some(last) = self.last.clone() {
            for output in last.outputs().iter().rev() {
                if result.index_of(output.id).is_none() {
                    self.unmount(output.id, stats);
                }
            }
        }
        let stray: Vec<OutputId> = self
            .items
            .keys()
            .filter(|id| result.index_of(**id).is_none())
            .copied()
            .collect();
        for id in stray {
            self.unmount(id, stats);
        }
    }

    fn mount_windowed(&mut self, result: &LayoutResult, visible: Rect, stats: &mut MountStats) {
        let outputs = result.outputs();
        let tops = result.tops();
        let bottoms = result.bottoms();
        let count = outputs.len();

        // Outputs leaving over the top edge, then outputs coming back in.
        while self.bottoms_index < count
            && visible.top() >= outputs[bottoms[self.bottoms_index]].bounds.bottom()
        {
            let output = &outputs[bottoms[self.bottoms_index]];
            if output.host.is_some() {
                self.unmount(output.id, stats);
            }
            self.bottoms_index += 1;
        }
        while self.bottoms_index > 0
            && visible.top() < outputs[bottoms[self.bottoms_index - 1]].bounds.bottom()
        {
            self.bottoms_index -= 1;
            self.mount_if_visible(result, bottoms[self.bottoms_index], visible, stats);
        }

        // Outputs entering over the bottom edge, then outputs leaving it.
        while self.tops_index < count
            && visible.bottom() > outputs[tops[self.tops_index]].bounds.top()
        {
            self.mount_if_visible(result, tops[self.tops_index], visible, stats);
            self.tops_index += 1;
        }
        while self.tops_index > 0
            && visible.bottom() <= outputs[tops[self.tops_index - 1]].bounds.top()
        {
            self.tops_index -= 1;
            let output = &outputs[tops[self.tops_index]];
            if output.host.is_some() {
                self.unmount(output.id, stats);
            }
        }

        self.forward_visible_rect(result, visible);
    }

    fn mount_if_visible(
        &mut self,
        result: &LayoutResult,
        index: usize,
        visible: Rect,
        stats: &mut MountStats,
    ) {
        let Some(output) = result.output(index) else {
            return;
        };
        if self.items.contains_key(&output.id) || !visible.intersects(&output.bounds) {
            return;
        }
        self.mount_output(result, index, Some(visible), stats);
    }

    fn update_window_indices(&mut self, result: &LayoutResult, visible: Option<Rect>) {
        let Some(visible) = visible else {
            self.tops_index = 0;
            self.bottoms_index = 0;
            return;
        };
        let outputs = result.outputs();
        self.tops_index = result
            .tops()
            .partition_point(|&index| outputs[index].bounds.top() < visible.bottom());
        self.bottoms_index = result
            .bottoms()
            .partition_point(|&index| outputs[index].bounds.bottom() <= visible.top());
    }

    /// Mounts the output at `index`, mounting its host first when needed.
    fn mount_output(
        &mut self,
        result: &LayoutResult,
        index: usize,
        visible: Option<Rect>,
        stats: &mut MountStats,
    ) -> bool {
        let Some(output) = result.output(index) else {
            return false;
        };
        if let Some(host) = output.host {
            if !self.items.contains_key(&host) {
                let host_mounted = match result.index_of(host) {
                    Some(host_index) if host_index < index => {
                        self.mount_output(result, host_index, visible, stats)
                    }
                    _ => false,
                };
                if !host_mounted {
                    log::error!("output {} cannot mount without host {}", output.id, host);
                    self.errors.push(MountError::MissingHost {
                        id: output.id.raw(),
                        host: host.raw(),
                    });
                    stats.failed += 1;
                    return false;
                }
            }
        }

        let Some(mut content) = self.provider.acquire(output.content_type) else {
            log::error!(
                "failed to acquire {:?} content for output {}, skipping it",
                output.content_type,
                output.id
            );
            self.errors.push(MountError::AcquireFailed {
                id: output.id.raw(),
                content_type: output.content_type,
            });
            stats.failed += 1;
            return false;
        };

        let binding = MountBinding {
            output,
            host: output.host,
            index,
            bounds: relative_bounds(result, output),
        };
        self.provider.bind(&mut content, &binding);
        if let Some(host) = output.host {
            *self.host_children.entry(host).or_insert(0) += 1;
        }
        log::trace!("mounted {} at {index}", output.id);
        self.items.insert(
            output.id,
            MountItem {
                content,
                output: output.clone(),
                index,
            },
        );
        stats.mounted += 1;
        if let Some(visible) = visible {
            self.forward_to(output.id, visible);
        }
        true
    }

    fn update_output(
        &mut self,
        result: &LayoutResult,
        index: usize,
        visible: Option<Rect>,
        dirty: bool,
        stats: &mut MountStats,
    ) {
        let Some(output) = result.output(index) else {
            return;
        };
        let Some(item) = self.items.get(&output.id) else {
            return;
        };
        if item.output.host != output.host || item.output.content_type != output.content_type {
            log::trace!("remounting {}: host or content type changed", output.id);
            self.unmount(output.id, stats);
            self.mount_output(result, index, visible, stats);
            return;
        }

        let bounds = relative_bounds(result, output);

        let Self {
            provider, items, ..
        } = self;
        let Some(item) = items.get_mut(&output.id) else {
            return;
        };

        if item.index != index {
            log::trace!("moving {} from {} to {index}", output.id, item.index);
            provider.move_content(&mut item.content, item.index, index);
            item.index = index;
            stats.moved += 1;
        }

        if dirty {
            if output.update_state != UpdateState::Updated && output.should_update {
                log::trace!("rebinding {}", output.id);
                provider.unbind(&mut item.content);
                let binding = MountBinding {
                    output,
                    host: output.host,
                    index,
                    bounds,
                };
                provider.bind(&mut item.content, &binding);
                stats.updated += 1;
            } else {
                stats.no_op_updates += 1;
            }
            if item.output.bounds != output.bounds {
                provider.set_bounds(&mut item.content, bounds);
                stats.bounds_changed += 1;
            }
            item.output = output.clone();
        }

        if let Some(visible) = visible {
            self.forward_to(output.id, visible);
        }
    }

    /// Unmounts `id` and everything mounted inside it.
    fn unmount(&mut self, id: OutputId, stats: &mut MountStats) {
        if !self.items.contains_key(&id) {
            return;
        }
        if self.child_count(id) > 0 {
            let mut children: Vec<(usize, OutputId)> = self
                .items
                .values()
                .filter(|item| item.output.host == Some(id))
                .map(|item| (item.index, item.output.id))
                .collect();
            children.sort_unstable_by(|a, b| b.0.cmp(&a.0));
            for (_, child) in children {
                self.unmount(child, stats);
            }
        }

        let Some(mut item) = self.items.remove(&id) else {
            return;
        };
        self.provider.unbind(&mut item.content);
        self.provider.release(item.output.content_type, item.content);
        if let Some(host) = item.output.host {
            if let Some(count) = self.host_children.get_mut(&host) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.host_children.remove(&host);
                }
            }
        }
        self.host_children.remove(&id);
        log::trace!("unmounted {id}");
        stats.unmounted += 1;
    }

    fn forward_visible_rect(&mut self, result: &LayoutResult, visible: Rect) {
        let incremental: Vec<OutputId> = result
            .outputs()
            .iter()
            .filter(|output| output.supports_incremental_mount())
            .map(|output| output.id)
            .collect();
        for id in incremental {
            self.forward_to(id, visible);
        }
    }

    /// Hands the visible part of an incrementally mounting output to its
    /// content, in the content's own coordinates.
    fn forward_to(&mut self, id: OutputId, visible: Rect) {
        if !self.incremental_mount {
            return;
        }
        let Self {
            provider, items, ..
        } = self;
        let Some(item) = items.get_mut(&id) else {
            return;
        };
        if !item.output.supports_incremental_mount() {
            return;
        }
        let bounds = item.output.bounds;
        if let Some(shown) = visible.intersection(&bounds) {
            provider.set_visible_rect(&mut item.content, shown.relative_to(&bounds));
        }
    }
}

/// Bounds of `output` relative to its host's bounds.
fn relative_bounds(result: &LayoutResult, output: &LayoutOutput) -> Rect {
    output
        .host
        .and_then(|host| result.output_by_id(host))
        .map_or(output.bounds, |host| output.bounds.relative_to(&host.bounds))
}
