use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use std::path::PathBuf;

/// Runtime configuration for the `keyforge` binary.
///
/// These settings control worker concurrency, the load set point the pool is
/// steered toward, and how generated keypairs are buffered and batched into
/// the store. All values are parsed from CLI arguments or environment
/// variables.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "keyforge",
    version,
    about = "Generate TRON keypairs with a load-adaptive worker pool and persist them to SQLite"
)]
pub struct CliArgs {
    /// Path to the SQLite database file. Created if missing.
    ///
    /// Environment variable: `DB_PATH`
    #[arg(long, env = "DB_PATH", default_value = "./tron_wallets.db")]
    pub db_path: PathBuf,

    /// Number of generation workers started before the first load sample.
    ///
    /// Environment variable: `INITIAL_WORKERS`
    #[arg(long, env = "INITIAL_WORKERS", default_value_t = 5)]
    pub initial_workers: usize,

    /// Upper bound on concurrently running generation workers.
    ///
    /// Environment variable: `MAX_WORKERS`
    #[arg(long, env = "MAX_WORKERS", default_value_t = 100)]
    pub max_workers: usize,

    /// CPU utilization set point, in percent.
    ///
    /// Environment variable: `TARGET_LOAD`
    #[arg(long, env = "TARGET_LOAD", default_value_t = 70.0)]
    pub target_load: f64,

    /// Half-width of the hysteresis band around the set point, in percentage
    /// points. No scaling happens while utilization is inside the band.
    ///
    /// Environment variable: `LOAD_BAND`
    #[arg(long, env = "LOAD_BAND", default_value_t = 10.0)]
    pub load_band: f64,

    /// Number of keypairs committed per store transaction.
    ///
    /// Environment variable: `BATCH_SIZE`
    #[arg(long, env = "BATCH_SIZE", default_value_t = 100)]
    pub batch_size: usize,

    /// Capacity of the queue between workers and the aggregator. Workers block
    /// when it is full.
    ///
    /// Environment variable: `QUEUE_CAPACITY`
    #[arg(long, env = "QUEUE_CAPACITY", default_value_t = 100)]
    pub queue_capacity: usize,

    /// Seconds between control ticks.
    ///
    /// Environment variable: `CONTROL_INTERVAL_SECS`
    #[arg(long, env = "CONTROL_INTERVAL_SECS", default_value_t = 5)]
    pub control_interval_secs: u64,

    /// Window over which each CPU utilization sample is measured, in
    /// milliseconds.
    ///
    /// Environment variable: `SAMPLE_WINDOW_MS`
    #[arg(long, env = "SAMPLE_WINDOW_MS", default_value_t = 1000)]
    pub sample_window_ms: u64,
}

/// Set point and hysteresis used by the rate controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSettings {
    pub target_load: f64,
    pub load_band: f64,
    pub interval: Duration,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            target_load: 70.0,
            load_band: 10.0,
            interval: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub db_path: PathBuf,
    pub initial_workers: usize,
    pub max_workers: usize,
    pub batch_size: usize,
    pub queue_capacity: usize,
    pub sample_window: Duration,
    pub control: ControlSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./tron_wallets.db"),
            initial_workers: 5,
            max_workers: 100,
            batch_size: 100,
            queue_capacity: 100,
            sample_window: Duration::from_secs(1),
            control: ControlSettings::default(),
        }
    }
}

impl TryFrom<CliArgs> for PipelineConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.max_workers == 0 {
            bail!("MAX_WORKERS must be greater than 0");
        }

        if args.initial_workers == 0 {
            bail!("INITIAL_WORKERS must be greater than 0");
        }

        if args.initial_workers > args.max_workers {
            bail!(
                "INITIAL_WORKERS ({}) exceeds MAX_WORKERS ({})",
                args.initial_workers,
                args.max_workers
            );
        }

        if !(args.target_load > 0.0 && args.target_load <= 100.0) {
            bail!(
                "TARGET_LOAD must be within (0, 100], got {}",
                args.target_load
            );
        }

        if !(args.load_band >= 0.0) {
            bail!("LOAD_BAND must be non-negative, got {}", args.load_band);
        }

        if args.batch_size == 0 {
            bail!("BATCH_SIZE must be greater than 0");
        }

        if args.queue_capacity == 0 {
            bail!("QUEUE_CAPACITY must be greater than 0");
        }

        if args.control_interval_secs == 0 {
            bail!("CONTROL_INTERVAL_SECS must be greater than 0");
        }

        if args.sample_window_ms == 0 {
            bail!("SAMPLE_WINDOW_MS must be greater than 0");
        }

        Ok(Self {
            db_path: args.db_path,
            initial_workers: args.initial_workers,
            max_workers: args.max_workers,
            batch_size: args.batch_size,
            queue_capacity: args.queue_capacity,
            sample_window: Duration::from_millis(args.sample_window_ms),
            control: ControlSettings {
                target_load: args.target_load,
                load_band: args.load_band,
                interval: Duration::from_secs(args.control_interval_secs),
            },
        })
    }
}
