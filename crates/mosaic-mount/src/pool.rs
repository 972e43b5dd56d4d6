//! Type-keyed recycling of mount content.

use mosaic_core::{ContentType, Map};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Released content beyond this many per type is dropped.
    pub max_per_type: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { max_per_type: 8 }
    }
}

#[derive(Debug)]
pub struct ContentPool<C> {
    config: PoolConfig,
    pools: Map<ContentType, Vec<C>>,
}

impl<C> ContentPool<C> {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            pools: Map::default(),
        }
    }

    pub fn acquire(&mut self, content_type: ContentType) -> Option<C> {
        self.pools.get_mut(&content_type)?.pop()
    }

    /// Keeps `content` for reuse. Returns it back when the pool for its type
    /// is full.
    pub fn release(&mut self, content_type: ContentType, content: C) -> Option<C> {
        let pool = self.pools.entry(content_type).or_default();
        if pool.len() >= self.config.max_per_type {
            return Some(content);
        }
        pool.push(content);
        None
    }

    pub fn pooled(&self, content_type: ContentType) -> usize {
        self.pools.get(&content_type).map_or(0, Vec::len)
    }

    pub fn clear(&mut self) {
        self.pools.clear();
    }
}

impl<C> Default for ContentPool<C> {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}
