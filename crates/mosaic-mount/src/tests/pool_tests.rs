use crate::pool::{ContentPool, PoolConfig};
use mosaic_core::ContentType;

#[test]
fn acquire_returns_released_content_of_the_same_type() {
    let mut pool = ContentPool::default();
    assert_eq!(pool.release(ContentType::Host, 1u32), None);
    assert_eq!(pool.release(ContentType::Border, 2u32), None);

    assert_eq!(pool.acquire(ContentType::Host), Some(1));
    assert_eq!(pool.acquire(ContentType::Host), None);
    assert_eq!(pool.pooled(ContentType::Border), 1);
}

#[test]
fn full_pool_hands_content_back() {
    let mut pool = ContentPool::new(PoolConfig { max_per_type: 1 });
    assert_eq!(pool.release(ContentType::Host, "a"), None);
    assert_eq!(pool.release(ContentType::Host, "b"), Some("b"));
    assert_eq!(pool.pooled(ContentType::Host), 1);

    pool.clear();
    assert_eq!(pool.pooled(ContentType::Host), 0);
}
