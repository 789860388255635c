//! Fixed-cadence tick loop.

use crate::config::Config;
use crate::scenario::{self, Scenario};
use crate::world::TickStats;
use futures_util::FutureExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Build the configured scenario and run it until `max_ticks` or Ctrl-C.
///
/// Returns the statistics of the last tick that ran.
pub async fn run(config: Config) -> anyhow::Result<TickStats> {
    let mut rng = match config.simulation.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut scenario = scenario::get_scenario(&config, &mut rng)?;
    info!(
        "Scenario '{}' initialized: {} entities in a {}x{} border",
        scenario.name(),
        scenario.entity_count(),
        config.border.width,
        config.border.height
    );

    let stats = run_loop(scenario.as_mut(), &config).await;
    info!("Stopped after {} ticks", stats.tick);
    Ok(stats)
}

/// Tick `scenario` at the configured interval.
pub async fn run_loop(scenario: &mut dyn Scenario, config: &Config) -> TickStats {
    let tick_interval_ms = config.simulation.tick_interval_ms.max(1);
    let max_ticks = config.simulation.max_ticks;
    let stats_interval = config.simulation.stats_interval.max(1);

    let period = Duration::from_millis(tick_interval_ms);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut last = TickStats::default();
    loop {
        let scheduled = tokio::select! {
            scheduled = ticker.tick() => scheduled,
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
        };

        // Drain any backlog so a slow tick does not cause a burst of catch-up ticks.
        let mut skipped = 0u32;
        while ticker.tick().now_or_never().is_some() {
            skipped += 1;
        }
        if skipped > 0 {
            debug!(
                "Skipped {} ticks to stay current (lag: {:?})",
                skipped,
                Instant::now().saturating_duration_since(scheduled)
            );
        }

        last = scenario.tick();
        let tick_ms = last.elapsed.as_secs_f64() * 1000.0;

        let tick_budget = tick_interval_ms as f64 * 0.9;
        if tick_ms > tick_budget {
            warn!(
                "Slow tick #{}: {:.3}ms (budget: {:.1}ms) - {} entities",
                last.tick, tick_ms, tick_budget, last.entities
            );
        }

        if last.tick % stats_interval == 0 {
            debug!(
                "Tick #{}: {:.2}ms | {} entities, {} indexed | {} leaves, depth {} | {:.2} neighbors avg",
                last.tick, tick_ms, last.entities, last.indexed, last.leaves, last.depth, last.mean_neighbors
            );
        }

        if max_ticks > 0 && last.tick >= max_ticks {
            break;
        }
    }
    last
}
