//! Reconciliation: bring the registry to a target size, then connect
//! whatever is offline.
//!
//! Three phases, in order:
//!
//! 1. **Grow**: draw nicknames and append new bots until the target is met
//!    or the pool runs dry. Running dry is a partial success, not an error.
//! 2. **Shrink**: pop bots off the tail (newest first) and disconnect each
//!    one exactly once.
//! 3. **Connect**: call `connect` on every surviving bot that is offline,
//!    including older bots whose previous attempt failed. Online bots are
//!    left alone.

use rand::Rng;

use crate::bot::{Bot, BotFactory};
use crate::nickname::NicknamePool;
use crate::registry::Registry;

/// What a single reconciliation did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub removed: usize,
    pub connect_attempts: usize,
    /// Growth stopped short of the target because the pool ran out.
    pub pool_exhausted: bool,
}

pub fn reconcile<F, R>(
    registry: &mut Registry<F::Bot>,
    pool: &mut NicknamePool,
    factory: &F,
    rng: &mut R,
    target: usize,
    host: &str,
    port: u16,
) -> ReconcileReport
where
    F: BotFactory + ?Sized,
    R: Rng + ?Sized,
{
    let mut report = ReconcileReport::default();

    while registry.len() < target {
        let Ok(name) = pool.draw(rng) else {
            tracing::warn!(
                have = registry.len(),
                requested = target,
                "Not enough nicknames, skipping remaining bot creation"
            );
            report.pool_exhausted = true;
            break;
        };
        tracing::debug!(nick = %name, "Creating bot");
        registry.push(factory.create(name));
        report.created += 1;
    }

    while registry.len() > target {
        let Some(mut bot) = registry.pop() else { break };
        tracing::debug!(nick = %bot.name(), "Removing bot");
        bot.disconnect();
        report.removed += 1;
    }

    for bot in registry.iter_mut() {
        if !bot.is_online() {
            bot.connect(host, port);
            report.connect_attempts += 1;
        }
    }

    report
}
