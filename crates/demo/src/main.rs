//! Simulated edit/reload loop.
//!
//! Registers one module with a [`HotRuntime`] and runs it through a number of
//! "edit" cycles. Each cycle evaluates the module body, which persists a
//! connection pool (no dependencies) and a configuration snapshot that depends
//! on the current revision, then reloads the module.
//!
//! # Usage
//!
//! ```bash
//! reload-loop --cycles 5
//! reload-loop --production --format compact
//! HOT_PERSIST_LOG=hot_persist_core=trace reload-loop
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use clap::{Parser, ValueEnum};
use hot_persist_core::prelude::*;
use hot_persist_runtime::{HotRuntime, TracingConfig, TracingFormat};
use tracing::info;

const MODULE_ID: &str = "app";

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "reload-loop")]
#[command(about = "Run a module through simulated hot reloads")]
struct Args {
    /// Number of edit cycles to simulate
    #[arg(short, long, default_value_t = 3)]
    cycles: u32,

    /// Pin production mode, which disables persistence
    #[arg(long)]
    production: bool,

    /// Log output format, overriding `HOT_PERSIST_LOG_FORMAT`
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<FormatArg> for TracingFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Pretty => Self::Pretty,
            FormatArg::Compact => Self::Compact,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Stand-in for an expensive resource that should survive reloads.
#[derive(Debug)]
struct ConnectionPool {
    id: u64,
}

/// Configuration derived from the module revision.
#[derive(Debug)]
struct ConfigSnapshot {
    revision: u32,
}

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Handles produced by one evaluation of the module body.
struct Evaluation {
    pool: Arc<ConnectionPool>,
    config: Arc<ConfigSnapshot>,
}

/// The module body: what a hot-reloaded source file would run at load time.
fn evaluate(persistor: &Persistor, revision: u32) -> Evaluation {
    let pool = persistor.call(
        || {
            let id = NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed);
            info!(pool = id, "opening connection pool");
            Arc::new(ConnectionPool { id })
        },
        None,
        "pool",
    );

    let config = persistor.call(
        || Arc::new(ConfigSnapshot { revision }),
        Some(deps![revision]),
        PersistOptions::<Arc<ConfigSnapshot>>::cleanup(|old| {
            info!(revision = old.revision, "dropping stale config snapshot");
        }),
    );

    Evaluation { pool, config }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let mut tracing_config = TracingConfig::from_env();
    if let Some(format) = args.format {
        tracing_config = tracing_config.with_format(format.into());
    }
    tracing_config.init()?;

    let config = if args.production {
        PersistConfig::fixed(BuildMode::Production)
    } else {
        PersistConfig::default()
    };
    info!(mode = ?config.mode(), cycles = args.cycles, "starting reload loop");

    let runtime = HotRuntime::new();
    runtime.register(MODULE_ID)?;
    let persistor = persist(runtime.provider(MODULE_ID)).with_config(config);

    let mut previous: Option<Evaluation> = None;
    for cycle in 0..args.cycles {
        // Every other edit touches the config; the rest leave it alone.
        let revision = cycle / 2;
        let current = evaluate(&persistor, revision);

        let (pool_reused, config_reused) = previous.as_ref().map_or((false, false), |prev| {
            (
                Arc::ptr_eq(&prev.pool, &current.pool),
                Arc::ptr_eq(&prev.config, &current.config),
            )
        });
        info!(
            cycle,
            revision,
            pool = current.pool.id,
            pool_reused,
            config_revision = current.config.revision,
            config_reused,
            "module evaluated"
        );

        let carried = runtime.reload(MODULE_ID)?;
        info!(cycle, carried, "edit applied");
        previous = Some(current);
    }

    info!(
        pools_opened = NEXT_POOL_ID.load(Ordering::Relaxed) - 1,
        "reload loop finished"
    );
    Ok(())
}
