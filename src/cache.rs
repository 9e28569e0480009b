use moka::future::Cache;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::config;
use crate::types::{PostId, PostWithVotes, PostsQuery, User, UserId};

/// Result of looking something up in the cache.
#[derive(Debug)]
pub enum Lookup<T> {
    Fresh(Arc<T>),
    /// Old or invalidated. Good enough to show while refetching.
    Stale(Arc<T>),
    Missing,
}

#[derive(Debug)]
struct Entry<T> {
    value: Arc<T>,
    fetched_at: Instant,
    invalidated: bool,
}

impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            fetched_at: self.fetched_at,
            invalidated: self.invalidated,
        }
    }
}

/// One kind of cached read. Entries are evicted after being left
/// unused for the garbage collection time.
#[derive(Debug, Clone)]
pub struct Slot<K, T>
where
    K: Hash + Eq + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    entries: Cache<K, Entry<T>>,
    stale_time: Duration,
}

impl<K, T> Slot<K, T>
where
    K: Hash + Eq + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    fn new(stale_time: Duration, gc_time: Duration) -> Self {
        Self {
            entries: Cache::builder().time_to_idle(gc_time).build(),
            stale_time,
        }
    }

    pub async fn get(&self, key: &K) -> Lookup<T> {
        match self.entries.get(key).await {
            Some(entry) if !entry.invalidated && entry.fetched_at.elapsed() < self.stale_time => {
                Lookup::Fresh(entry.value)
            }
            Some(entry) => Lookup::Stale(entry.value),
            None => Lookup::Missing,
        }
    }

    pub async fn insert(&self, key: K, value: Arc<T>) {
        let entry = Entry {
            value,
            fetched_at: Instant::now(),
            invalidated: false,
        };
        self.entries.insert(key, entry).await;
    }

    /// Marks an entry stale so that the next read refetches it.
    pub async fn invalidate(&self, key: &K)
    where
        K: Clone,
    {
        if let Some(mut entry) = self.entries.get(key).await {
            entry.invalidated = true;
            self.entries.insert(key.clone(), entry).await;
        }
    }

    pub async fn invalidate_all(&self)
    where
        K: Clone,
    {
        let keys = self
            .entries
            .iter()
            .map(|(key, _)| K::clone(&key))
            .collect::<Vec<_>>();

        for key in keys {
            self.invalidate(&key).await;
        }
    }

    pub async fn remove(&self, key: &K) {
        self.entries.invalidate(key).await;
    }
}

/// Client side cache of server reads, keyed the way they were fetched.
#[derive(Debug, Clone)]
pub struct QueryCache {
    pub posts: Slot<PostsQuery, Vec<PostWithVotes>>,
    pub post: Slot<PostId, PostWithVotes>,
    pub users: Slot<UserId, User>,
}

impl QueryCache {
    #[must_use]
    pub fn new(config: &config::Cache) -> Self {
        let gc_time = config.gc_time();
        Self {
            posts: Slot::new(config.posts_stale_time(), gc_time),
            post: Slot::new(config.stale_time(), gc_time),
            users: Slot::new(config.stale_time(), gc_time),
        }
    }

    /// Every list of posts, after anything that changes posts or votes.
    pub async fn invalidate_posts(&self) {
        self.posts.invalidate_all().await;
    }

    pub async fn invalidate_post(&self, id: PostId) {
        self.post.invalidate(&id).await;
    }

    pub async fn remove_post(&self, id: PostId) {
        self.post.remove(&id).await;
    }
}
