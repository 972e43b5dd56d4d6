//! Where background layout passes run.

use std::thread;

pub type LayoutJob = Box<dyn FnOnce() + Send + 'static>;

/// Runs layout jobs off the caller's stack.
///
/// Jobs only touch the tree through its lock, so an implementation may run
/// them on any thread and in any order.
pub trait LayoutExecutor: Send + Sync {
    fn execute(&self, job: LayoutJob);
}

/// Runs every job on a fresh OS thread.
#[derive(Clone, Debug)]
pub struct ThreadExecutor {
    name: String,
}

impl ThreadExecutor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for ThreadExecutor {
    fn default() -> Self {
        Self::new("mosaic-layout")
    }
}

impl LayoutExecutor for ThreadExecutor {
    fn execute(&self, job: LayoutJob) {
        if let Err(err) = thread::Builder::new().name(self.name.clone()).spawn(job) {
            log::error!("failed to spawn layout thread {}: {err}", self.name);
        }
    }
}

/// Runs jobs immediately on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineExecutor;

impl LayoutExecutor for InlineExecutor {
    fn execute(&self, job: LayoutJob) {
        job();
    }
}
