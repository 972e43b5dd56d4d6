//! A mount-content provider that records every call made to it.

use mosaic_core::{ContentType, Rect, Set};
use mosaic_layout::OutputId;
use mosaic_mount::{ContentPool, MountBinding, MountContentProvider, PoolConfig};

/// Stand-in for a live widget.
#[derive(Clone, Debug, PartialEq)]
pub struct FakeContent {
    /// Unique per created instance, kept across pooling.
    pub serial: u64,
    pub content_type: ContentType,
    pub bound_to: Option<OutputId>,
    pub host: Option<OutputId>,
    pub index: usize,
    pub bounds: Rect,
    pub visible: Option<Rect>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProviderCalls {
    pub acquired: usize,
    /// Acquisitions that had to build new content.
    pub created: usize,
    pub released: usize,
    pub bound: usize,
    pub unbound: usize,
    pub moved: usize,
    pub bounds_set: usize,
    pub visible_rects: usize,
}

impl ProviderCalls {
    pub fn acquire_release(&self) -> usize {
        self.acquired + self.released
    }
}

#[derive(Debug)]
pub struct RecordingProvider {
    pool: ContentPool<FakeContent>,
    next_serial: u64,
    failing: Set<ContentType>,
    calls: ProviderCalls,
}

impl Default for RecordingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self::with_pool(PoolConfig::default())
    }

    pub fn with_pool(config: PoolConfig) -> Self {
        Self {
            pool: ContentPool::new(config),
            next_serial: 1,
            failing: Set::default(),
            calls: ProviderCalls::default(),
        }
    }

    /// Makes every acquisition of `content_type` fail.
    pub fn fail_acquire(&mut self, content_type: ContentType) {
        self.failing.insert(content_type);
    }

    pub fn heal(&mut self) {
        self.failing.clear();
    }

    pub fn calls(&self) -> ProviderCalls {
        self.calls
    }

    /// Returns the calls recorded so far and starts counting from zero.
    pub fn take_calls(&mut self) -> ProviderCalls {
        std::mem::take(&mut self.calls)
    }

    pub fn pooled(&self, content_type: ContentType) -> usize {
        self.pool.pooled(content_type)
    }
}

impl MountContentProvider for RecordingProvider {
    type Content = FakeContent;

    fn acquire(&mut self, content_type: ContentType) -> Option<FakeContent> {
        if self.failing.contains(&content_type) {
            return None;
        }
        self.calls.acquired += 1;
        if let Some(content) = self.pool.acquire(content_type) {
            return Some(content);
        }
        self.calls.created += 1;
        let serial = self.next_serial;
        self.next_serial += 1;
        Some(FakeContent {
            serial,
            content_type,
            bound_to: None,
            host: None,
            index: 0,
            bounds: Rect::default(),
            visible: None,
        })
    }

    fn release(&mut self, content_type: ContentType, content: FakeContent) {
        self.calls.released += 1;
        // Overflow is simply dropped.
        let _ = self.pool.release(content_type, content);
    }

    fn bind(&mut self, content: &mut FakeContent, binding: &MountBinding<'_>) {
        self.calls.bound += 1;
        content.bound_to = Some(binding.output.id);
        content.host = binding.host;
        content.index = binding.index;
        content.bounds = binding.bounds;
    }

    fn unbind(&mut self, content: &mut FakeContent) {
        self.calls.unbound += 1;
        content.bound_to = None;
        content.host = None;
        content.visible = None;
    }

    fn set_bounds(&mut self, content: &mut FakeContent, bounds: Rect) {
        self.calls.bounds_set += 1;
        content.bounds = bounds;
    }

    fn move_content(&mut self, content: &mut FakeContent, _from: usize, to: usize) {
        self.calls.moved += 1;
        content.index = to;
    }

    fn set_visible_rect(&mut self, content: &mut FakeContent, visible: Rect) {
        self.calls.visible_rects += 1;
        content.visible = Some(visible);
    }
}
