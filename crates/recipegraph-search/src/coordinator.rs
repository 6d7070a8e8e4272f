//! Worker pool driving [`VariationExplorer`] over a shared work queue.
//!
//! Workers pull batches of tasks, expand them with a thread-local visited
//! accumulator and publish admitted recipes once per batch. The run stops
//! when the recipe limit is reached or when the queue is idle (nothing
//! queued, nothing in flight), whichever a worker or the idle monitor
//! observes first.

use crate::variation::{recipe_limit, MultiRecipeResult, VariationExplorer, VariationTask};
use crossbeam_utils::{Backoff, CachePadded};
use dashmap::DashSet;
use parking_lot::Mutex;
use recipegraph_concurrent::{CancellationSignal, WorkQueue};
use recipegraph_core::{resolve_worker_count, Element, Recipe, RecipeSet, Signature};
use rustc_hash::FxHashSet;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_IDLE_CHECK_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum RunState {
    Running = 0,
    Draining = 1,
    Stopped = 2,
}

impl RunState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => RunState::Running,
            1 => RunState::Draining,
            _ => RunState::Stopped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    LimitReached,
    Exhausted,
}

/// State shared by every worker of one run.
struct Shared {
    queue: WorkQueue<VariationTask>,
    signatures: DashSet<Signature>,
    admitted: CachePadded<AtomicUsize>,
    limit: Option<usize>,
    recipes: Mutex<RecipeSet>,
    visited: Mutex<FxHashSet<Element>>,
    signal: CancellationSignal,
    state: AtomicU8,
}

impl Shared {
    /// Claim a result slot. Never lets the admitted count pass the limit.
    fn reserve_slot(&self) -> bool {
        match self.limit {
            None => {
                self.admitted.fetch_add(1, Ordering::AcqRel);
                true
            }
            Some(limit) => self
                .admitted
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                    (n < limit).then_some(n + 1)
                })
                .is_ok(),
        }
    }

    fn limit_reached(&self) -> bool {
        self.limit
            .is_some_and(|limit| self.admitted.load(Ordering::Acquire) >= limit)
    }

    fn stop(&self, reason: StopReason) {
        if self.signal.fire() {
            self.state
                .store(RunState::Draining as u8, Ordering::Release);
            debug!(?reason, admitted = self.admitted.load(Ordering::Acquire), "coordinator draining");
        }
    }

    fn run_state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::Acquire))
    }
}

/// Bounded pool of workers exploring recipe variations concurrently.
#[derive(Debug, Clone)]
pub struct ParallelCoordinator<'a> {
    explorer: VariationExplorer<'a>,
    workers: usize,
    batch_size: usize,
    idle_check_interval: Duration,
}

impl<'a> ParallelCoordinator<'a> {
    /// `workers == 0` uses the available hardware parallelism.
    pub fn new(explorer: VariationExplorer<'a>, workers: usize) -> Self {
        Self {
            explorer,
            workers: resolve_worker_count(workers),
            batch_size: DEFAULT_BATCH_SIZE,
            idle_check_interval: DEFAULT_IDLE_CHECK_INTERVAL,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_idle_check_interval(mut self, interval: Duration) -> Self {
        self.idle_check_interval = interval;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Explore variations of `first` until `max_recipes` recipes are known
    /// (`max_recipes <= 0`: until the frontier is exhausted).
    pub fn run(&self, first: Recipe, max_recipes: i64) -> MultiRecipeResult {
        let index = self.explorer.index();
        let target = self.explorer.target();
        let limit = recipe_limit(max_recipes);

        let first_signature = first.signature(target, index);
        let mut recipes = RecipeSet::new();
        recipes.insert(first.clone(), first_signature.clone());

        let shared = Shared {
            queue: WorkQueue::new(self.explorer.discipline()),
            signatures: DashSet::new(),
            admitted: CachePadded::new(AtomicUsize::new(1)),
            limit,
            recipes: Mutex::new(recipes),
            visited: Mutex::new(self.explorer.initial_visited(&first)),
            signal: CancellationSignal::new(),
            state: AtomicU8::new(RunState::Running as u8),
        };
        shared.signatures.insert(first_signature);

        if shared.limit_reached() {
            return Self::finish(shared);
        }
        shared.queue.push_all(self.explorer.tasks_for(Arc::new(first)));
        if shared.queue.is_idle() {
            return Self::finish(shared);
        }

        debug!(
            target = %target,
            workers = self.workers,
            batch_size = self.batch_size,
            seeds = shared.queue.len(),
            "coordinator running"
        );

        thread::scope(|scope| {
            let shared = &shared;
            scope.spawn(move || self.monitor_idle(shared));
            for worker_id in 0..self.workers {
                scope.spawn(move || self.work(worker_id, shared));
            }
        });

        Self::finish(shared)
    }

    fn finish(shared: Shared) -> MultiRecipeResult {
        shared
            .state
            .store(RunState::Stopped as u8, Ordering::Release);
        debug!(state = ?shared.run_state(), "coordinator stopped");

        let mut recipes = shared.recipes.into_inner();
        if let Some(limit) = shared.limit {
            recipes.truncate(limit);
        }
        MultiRecipeResult {
            recipes,
            nodes_visited: shared.visited.into_inner().len(),
        }
    }

    fn monitor_idle(&self, shared: &Shared) {
        while !shared.signal.is_fired() {
            if shared.queue.is_idle() {
                shared.stop(StopReason::Exhausted);
                break;
            }
            thread::sleep(self.idle_check_interval);
        }
    }

    fn work(&self, worker_id: usize, shared: &Shared) {
        let mut visited: FxHashSet<Element> = FxHashSet::default();
        let backoff = Backoff::new();
        let mut processed = 0usize;

        while !shared.signal.is_fired() {
            let Some(batch) = shared.queue.pop_batch(self.batch_size) else {
                backoff.snooze();
                continue;
            };
            backoff.reset();

            let mut admitted = Vec::new();
            let mut follow_up = Vec::new();
            'batch: for task in batch {
                if shared.signal.is_fired() {
                    break;
                }
                processed += 1;
                for variation in self.explorer.expand(&task, &mut visited) {
                    if !shared.signatures.insert(variation.signature.clone()) {
                        continue;
                    }
                    if !shared.reserve_slot() {
                        shared.stop(StopReason::LimitReached);
                        break 'batch;
                    }
                    let recipe = Arc::new(variation.recipe);
                    follow_up.extend(self.explorer.tasks_for(recipe.clone()));
                    admitted.push((recipe, variation.signature));
                }
            }

            if !admitted.is_empty() {
                let mut recipes = shared.recipes.lock();
                for (recipe, signature) in admitted {
                    recipes.insert(Arc::unwrap_or_clone(recipe), signature);
                }
            }
            shared.queue.complete(follow_up);

            if shared.limit_reached() {
                shared.stop(StopReason::LimitReached);
            }
        }

        trace!(worker_id, processed, visited = visited.len(), "worker exiting");
        shared.visited.lock().extend(visited);
    }
}
