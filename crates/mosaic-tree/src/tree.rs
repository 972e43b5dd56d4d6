//! The coordinator owning one tree's root, size specs and layout results.
//!
//! A pass snapshots what it needs under the lock, computes without it and
//! publishes back under the lock. Publishing lands the result as the
//! background layout and immediately selects between it and the main one.
//! Results that lose are released only after the lock is dropped, since
//! tearing one down can take a while.

use std::fmt;
use std::sync::Arc;

use mosaic_core::{Component, LayoutError, SizeSpec, StateHandle, StateScope, StateUpdate, StateValue};
use mosaic_layout::{calculate_layout, LayoutRequest, LayoutResult, LayoutSolver};
use parking_lot::Mutex;

use crate::config::TreeConfig;
use crate::executor::{InlineExecutor, LayoutExecutor};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreePhase {
    Idle,
    LayingOut,
    HasMain,
    HasBackground,
}

struct TreeState {
    root: Option<Component>,
    specs: Option<(SizeSpec, SizeSpec)>,
    main: Option<Arc<LayoutResult>>,
    background: Option<Arc<LayoutResult>>,
    state: StateHandle,
    in_flight: usize,
}

impl TreeState {
    fn phase(&self) -> TreePhase {
        if self.in_flight > 0 {
            TreePhase::LayingOut
        } else if self.background.is_some() {
            TreePhase::HasBackground
        } else if self.main.is_some() {
            TreePhase::HasMain
        } else {
            TreePhase::Idle
        }
    }

    /// Keeps the main layout if it still fits the current root and specs,
    /// otherwise promotes a fitting background layout. Returns the results
    /// that lost so the caller can drop them outside the lock.
    fn select_best_layout(&mut self) -> Vec<Arc<LayoutResult>> {
        let mut released = Vec::new();
        let (Some(root), Some((width, height))) = (self.root.as_ref(), self.specs) else {
            released.extend(self.background.take());
            return released;
        };
        let fits = |result: &Option<Arc<LayoutResult>>| {
            result
                .as_ref()
                .is_some_and(|result| result.is_compatible(root.id(), width, height))
        };
        let main_fits = fits(&self.main);
        let background_fits = fits(&self.background);

        if main_fits {
            if let Some(background) = self.background.take() {
                log::debug!("keeping main layout, discarding background {}", background.id());
                released.push(background);
            }
        } else if background_fits {
            if let Some(promoted) = self.background.take() {
                log::debug!("promoting background layout {} to main", promoted.id());
                self.state.commit(promoted.state());
                released.extend(self.main.replace(promoted));
            }
        } else if let Some(stale) = self.background.take() {
            log::debug!("discarding incompatible background layout {}", stale.id());
            released.push(stale);
        }
        released
    }
}

/// Everything one pass needs, taken under the lock.
struct PassSnapshot {
    root: Component,
    width: SizeSpec,
    height: SizeSpec,
    previous: Option<Arc<LayoutResult>>,
    state: StateScope,
}

struct Shared {
    state: Mutex<TreeState>,
    solver: Arc<dyn LayoutSolver>,
    executor: Arc<dyn LayoutExecutor>,
    config: TreeConfig,
}

/// Handle to a tree coordinator. Clones share the same tree.
#[derive(Clone)]
pub struct ComponentTree {
    shared: Arc<Shared>,
}

impl ComponentTree {
    pub fn new(solver: Arc<dyn LayoutSolver>) -> Self {
        Self::with_config(solver, TreeConfig::default(), Arc::new(InlineExecutor))
    }

    pub fn with_config(
        solver: Arc<dyn LayoutSolver>,
        config: TreeConfig,
        executor: Arc<dyn LayoutExecutor>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(TreeState {
                    root: None,
                    specs: None,
                    main: None,
                    background: None,
                    state: StateHandle::new(),
                    in_flight: 0,
                }),
                solver,
                executor,
                config,
            }),
        }
    }

    pub fn config(&self) -> TreeConfig {
        self.shared.config
    }

    pub fn root(&self) -> Option<Component> {
        self.shared.state.lock().root.clone()
    }

    pub fn size_specs(&self) -> Option<(SizeSpec, SizeSpec)> {
        self.shared.state.lock().specs
    }

    pub fn phase(&self) -> TreePhase {
        self.shared.state.lock().phase()
    }

    pub fn main_layout(&self) -> Option<Arc<LayoutResult>> {
        self.shared.state.lock().main.clone()
    }

    pub fn has_pending_updates(&self) -> bool {
        self.shared.state.lock().state.has_pending()
    }

    /// Committed state of the component at `global_key`.
    pub fn state_value(&self, global_key: &str) -> Option<StateValue> {
        self.shared.state.lock().state.committed(global_key).cloned()
    }

    /// Replaces the root and lays it out if size specs are known.
    pub fn set_root(&self, root: Component) -> Result<(), LayoutError> {
        self.shared.state.lock().root = Some(root);
        self.calculate_layout()
    }

    /// Same as [`ComponentTree::set_root`] with the pass run on the executor.
    pub fn set_root_async(&self, root: Component) {
        self.shared.state.lock().root = Some(root);
        self.calculate_layout_async();
    }

    pub fn set_size_spec(&self, width: SizeSpec, height: SizeSpec) -> Result<(), LayoutError> {
        self.shared.state.lock().specs = Some((width, height));
        self.calculate_layout()
    }

    pub fn set_size_spec_async(&self, width: SizeSpec, height: SizeSpec) {
        self.shared.state.lock().specs = Some((width, height));
        self.calculate_layout_async();
    }

    /// Queues `update` for the component at `global_key` and lays out.
    pub fn update_state(&self, global_key: &str, update: StateUpdate) -> Result<(), LayoutError> {
        self.shared.state.lock().state.enqueue(global_key, update);
        self.calculate_layout()
    }

    pub fn update_state_async(&self, global_key: &str, update: StateUpdate) {
        self.shared.state.lock().state.enqueue(global_key, update);
        self.calculate_layout_async();
    }

    /// Runs a pass on the calling thread. Without a root this fails with
    /// [`LayoutError::MissingRoot`]; without size specs it does nothing.
    pub fn calculate_layout(&self) -> Result<(), LayoutError> {
        match self.snapshot()? {
            Some(snapshot) => self.run_pass(snapshot),
            None => Ok(()),
        }
    }

    /// Snapshots the tree now and runs the pass on the executor.
    pub fn calculate_layout_async(&self) {
        let snapshot = match self.snapshot() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return,
            Err(err) => {
                log::error!("cannot start layout: {err}");
                return;
            }
        };
        let guard = InFlightGuard {
            tree: Some(self.clone()),
        };
        self.shared.executor.execute(Box::new(move || {
            let tree = guard.disarm();
            // Failures are logged by the pass.
            let _ = tree.run_pass(snapshot);
        }));
    }

    /// Drops both layouts.
    pub fn release(&self) {
        let released = {
            let mut state = self.shared.state.lock();
            [state.main.take(), state.background.take()]
        };
        drop(released);
    }

    fn snapshot(&self) -> Result<Option<PassSnapshot>, LayoutError> {
        let mut state = self.shared.state.lock();
        let root = state.root.clone().ok_or(LayoutError::MissingRoot)?;
        let Some((width, height)) = state.specs else {
            log::debug!("skipping layout of {}: no size specs yet", root.name());
            return Ok(None);
        };
        // A new id makes any pass started against the old root unpublishable.
        let root = if state.state.has_pending() {
            let copy = root.shallow_copy_with_new_id();
            state.root = Some(copy.clone());
            copy
        } else {
            root
        };
        state.in_flight += 1;
        Ok(Some(PassSnapshot {
            root,
            width,
            height,
            previous: state.main.clone(),
            state: state.state.snapshot(),
        }))
    }

    fn run_pass(&self, snapshot: PassSnapshot) -> Result<(), LayoutError> {
        let PassSnapshot {
            root,
            width,
            height,
            previous,
            state,
        } = snapshot;
        let request = LayoutRequest::new(&root, width, height)
            .with_previous_diff(previous.as_deref().and_then(LayoutResult::diff_tree))
            .with_state(state)
            .with_config(self.shared.config.layout_config());
        let computed = calculate_layout(Arc::clone(&self.shared.solver), request);
        drop(previous);

        match computed {
            Ok(result) => {
                self.publish(Arc::new(result));
                Ok(())
            }
            Err(err) => {
                log::error!("layout pass for {} failed: {err}", root.name());
                self.shared.state.lock().in_flight -= 1;
                Err(err)
            }
        }
    }

    fn publish(&self, result: Arc<LayoutResult>) {
        let released = {
            let mut state = self.shared.state.lock();
            state.in_flight -= 1;
            let current_root = state.root.as_ref().map(Component::id);
            if current_root != Some(result.root_id()) {
                log::debug!("discarding layout {} computed for a replaced root", result.id());
                vec![result]
            } else {
                let mut released: Vec<Arc<LayoutResult>> =
                    state.background.replace(result).into_iter().collect();
                released.extend(state.select_best_layout());
                released
            }
        };
        drop(released);
    }
}

/// Gives back the in-flight slot of a job the executor dropped unrun.
struct InFlightGuard {
    tree: Option<ComponentTree>,
}

impl InFlightGuard {
    fn disarm(mut self) -> ComponentTree {
        match self.tree.take() {
            Some(tree) => tree,
            None => unreachable!("guard disarmed twice"),
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Some(tree) = self.tree.take() {
            log::debug!("layout job dropped before it ran");
            tree.shared.state.lock().in_flight -= 1;
        }
    }
}

impl fmt::Debug for ComponentTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("ComponentTree")
            .field("root", &state.root)
            .field("phase", &state.phase())
            .field("main", &state.main.as_ref().map(|result| result.id()))
            .finish()
    }
}
