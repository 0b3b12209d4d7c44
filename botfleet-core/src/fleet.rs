//! `FleetService`: owner of fleet state and the two trigger entry points.
//!
//! Registry, nickname pool and draw RNG sit behind a single `RwLock`.
//! `request_reconcile` is the only writer and is single-flight: a trigger
//! that arrives while one is running is rejected with [`FleetError::Busy`],
//! never queued. `request_dispatch` takes the read side, so it waits for a
//! running reconciliation to finish before it sees the registry.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::bot::{Bot, BotFactory};
use crate::error::FleetError;
use crate::nickname::NicknamePool;
use crate::reconcile::{self, ReconcileReport};
use crate::registry::Registry;
use crate::router::{self, CommandRequest, DispatchReport, Selector};

struct FleetState<B> {
    registry: Registry<B>,
    pool: NicknamePool,
    rng: StdRng,
}

pub struct FleetService<F: BotFactory> {
    state: RwLock<FleetState<F::Bot>>,
    factory: F,
    reconciling: AtomicBool,
}

/// Clears the single-flight flag when the reconciliation ends, even on panic.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<F: BotFactory> FleetService<F> {
    pub fn new(factory: F, pool: NicknamePool) -> Self {
        Self::with_rng(factory, pool, StdRng::from_entropy())
    }

    /// Use a fixed RNG so nickname draws are reproducible.
    pub fn with_rng(factory: F, pool: NicknamePool, rng: StdRng) -> Self {
        Self {
            state: RwLock::new(FleetState {
                registry: Registry::new(),
                pool,
                rng,
            }),
            factory,
            reconciling: AtomicBool::new(false),
        }
    }

    /// Bring the fleet to `target` bots and connect any that are offline.
    ///
    /// Returns [`FleetError::Busy`] without touching anything if another
    /// reconciliation is in progress.
    pub fn request_reconcile(
        &self,
        target: usize,
        host: &str,
        port: u16,
    ) -> Result<ReconcileReport, FleetError> {
        if self
            .reconciling
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(requested = target, "Reconcile already running, trigger dropped");
            return Err(FleetError::Busy);
        }
        let _in_flight = InFlight(&self.reconciling);

        let mut guard = self.state.write();
        let state = &mut *guard;
        let report = reconcile::reconcile(
            &mut state.registry,
            &mut state.pool,
            &self.factory,
            &mut state.rng,
            target,
            host,
            port,
        );

        tracing::info!(
            host,
            port,
            requested = target,
            size = state.registry.len(),
            created = report.created,
            removed = report.removed,
            connecting = report.connect_attempts,
            "Fleet reconciled"
        );
        Ok(report)
    }

    /// Send `text` to the bots picked by `selector`.
    pub fn request_dispatch(&self, selector: Selector, text: impl Into<String>) -> DispatchReport {
        let request = CommandRequest::new(selector, text);
        let state = self.state.read();
        router::dispatch(&request, &state.registry)
    }

    /// Replace the nickname pool. Names held by live bots are dropped from
    /// the new pool so a reload can't hand out a nickname twice.
    pub fn replace_pool(&self, mut pool: NicknamePool) {
        let mut state = self.state.write();
        pool.retain(|n| !state.registry.contains(n));
        state.pool = pool;
    }

    /// Disconnect every bot, newest first.
    pub fn disconnect_all(&self) -> usize {
        let mut state = self.state.write();
        let mut removed = 0;
        while let Some(mut bot) = state.registry.pop() {
            bot.disconnect();
            removed += 1;
        }
        removed
    }

    pub fn is_reconciling(&self) -> bool {
        self.reconciling.load(Ordering::Acquire)
    }

    /// Bot nicknames in creation order.
    pub fn names(&self) -> Vec<String> {
        self.state.read().registry.names()
    }

    pub fn len(&self) -> usize {
        self.state.read().registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn online_count(&self) -> usize {
        self.state.read().registry.online_count()
    }

    pub fn pool_remaining(&self) -> usize {
        self.state.read().pool.len()
    }
}
