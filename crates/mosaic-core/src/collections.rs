//! Map and set aliases shared across the workspace.

pub type Map<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;
pub type Set<K> = hashbrown::HashSet<K, ahash::RandomState>;

pub fn map_with_capacity<K, V>(capacity: usize) -> Map<K, V> {
    Map::with_capacity_and_hasher(capacity, ahash::RandomState::new())
}
