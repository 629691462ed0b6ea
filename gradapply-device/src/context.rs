use crate::error::DeviceError;
use crate::stream::Stream;
use log::{debug, info, warn};
use once_cell::sync::OnceCell;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

/// Environment variable overriding [`DeviceConfig::num_threads`].
pub const ENV_NUM_THREADS: &str = "GRADAPPLY_NUM_THREADS";
/// Environment variable overriding [`DeviceConfig::max_threads_per_block`].
pub const ENV_MAX_THREADS_PER_BLOCK: &str = "GRADAPPLY_MAX_THREADS_PER_BLOCK";
/// Environment variable overriding [`DeviceConfig::max_threads_per_multiprocessor`].
pub const ENV_MAX_THREADS_PER_SM: &str = "GRADAPPLY_MAX_THREADS_PER_SM";

static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();
static DEFAULT_DEVICE: OnceCell<Device> = OnceCell::new();

/// Initializes the logging system and the process-wide default device.
/// This function is idempotent and thread-safe.
///
/// The logging level can be controlled by the `RUST_LOG` environment variable
/// (e.g., `RUST_LOG=gradapply_optim=debug`). The default device is configured
/// from the environment, see [`DeviceConfig::from_env`].
pub fn initialize_device_with_logging() -> Result<&'static Device, DeviceError> {
    // Errors during logger init (another logger already installed) are reported
    // but don't stop device init.
    LOGGER_INITIALIZED.get_or_init(|| {
        match env_logger::builder().is_test(false).try_init() {
            Ok(_) => info!("gradapply device logger initialized."),
            Err(e) => eprintln!("Failed to initialize logger: {}. Logging might not work as expected.", e),
        };
    });
    Device::default_device()
}

/// Knobs of a [`Device`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Used for worker thread names and in logs.
    pub name: String,
    /// Number of workers ("multiprocessors"). `None` lets the pool pick one per CPU.
    pub num_threads: Option<usize>,
    /// Upper bound on the number of threads of one launch group.
    pub max_threads_per_block: usize,
    /// Threads one worker is assumed to keep resident; bounds the physical thread count.
    pub max_threads_per_multiprocessor: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            name: "gradapply".to_string(),
            num_threads: None,
            max_threads_per_block: 1024,
            max_threads_per_multiprocessor: 2048,
        }
    }
}

impl DeviceConfig {
    /// Default configuration overridden by `GRADAPPLY_*` environment variables.
    ///
    /// Unset variables keep their default, malformed ones are an error.
    pub fn from_env() -> Result<Self, DeviceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DeviceError> {
        let mut config = DeviceConfig::default();
        if let Some(raw) = lookup(ENV_NUM_THREADS) {
            config.num_threads = Some(parse_count(ENV_NUM_THREADS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_MAX_THREADS_PER_BLOCK) {
            config.max_threads_per_block = parse_count(ENV_MAX_THREADS_PER_BLOCK, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_THREADS_PER_SM) {
            config.max_threads_per_multiprocessor = parse_count(ENV_MAX_THREADS_PER_SM, &raw)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.num_threads == Some(0) {
            return Err(DeviceError::invalid_config("num_threads", 0, "must be at least 1"));
        }
        if self.max_threads_per_block == 0 {
            return Err(DeviceError::invalid_config("max_threads_per_block", 0, "must be at least 1"));
        }
        if self.max_threads_per_multiprocessor < self.max_threads_per_block {
            return Err(DeviceError::invalid_config(
                "max_threads_per_multiprocessor",
                self.max_threads_per_multiprocessor,
                "must not be smaller than max_threads_per_block",
            ));
        }
        // A pool built without an explicit count sizes itself like rayon's global pool.
        let workers = self.num_threads.unwrap_or_else(rayon::current_num_threads);
        if workers.checked_mul(self.max_threads_per_multiprocessor).is_none() {
            return Err(DeviceError::invalid_config(
                "max_threads_per_multiprocessor",
                self.max_threads_per_multiprocessor,
                &format!("total thread count overflows with {} workers", workers),
            ));
        }
        Ok(())
    }
}

fn parse_count(key: &str, raw: &str) -> Result<usize, DeviceError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| DeviceError::invalid_config(key, raw, &e.to_string()))
}

/// Properties of a device, as used by the launch-shape computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProperties {
    pub id: u32,
    pub name: String,
    /// Number of workers executing groups concurrently.
    pub multiprocessor_count: usize,
    pub max_threads_per_block: usize,
    pub max_threads_per_multiprocessor: usize,
}

/// An execution device: a dedicated pool of worker threads.
///
/// Cloning is cheap and yields a handle to the same pool.
#[derive(Debug, Clone)]
pub struct Device {
    pool: Arc<ThreadPool>,
    properties: DeviceProperties,
}

impl Device {
    /// Creates a device with its own worker pool.
    pub fn new(id: u32, config: &DeviceConfig) -> Result<Self, DeviceError> {
        config.validate()?;
        debug!("Creating device {} ({:?})", id, config);

        let thread_prefix = config.name.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.num_threads.unwrap_or(0))
            .thread_name(move |i| format!("{}-{}-worker-{}", thread_prefix, id, i))
            .build()
            .map_err(|source| DeviceError::PoolBuild { id, source })?;

        let properties = DeviceProperties {
            id,
            name: config.name.clone(),
            multiprocessor_count: pool.current_num_threads(),
            max_threads_per_block: config.max_threads_per_block,
            max_threads_per_multiprocessor: config.max_threads_per_multiprocessor,
        };
        info!(
            "Created device {}: {} with {} workers, {} threads/block",
            id, properties.name, properties.multiprocessor_count, properties.max_threads_per_block
        );
        Ok(Device {
            pool: Arc::new(pool),
            properties,
        })
    }

    /// Process-wide device 0, configured from the environment on first use.
    pub fn default_device() -> Result<&'static Device, DeviceError> {
        DEFAULT_DEVICE.get_or_try_init(|| {
            let config = DeviceConfig::from_env().or_else(|e| {
                warn!("Ignoring device environment overrides: {}", e);
                Ok::<_, DeviceError>(DeviceConfig::default())
            })?;
            Device::new(0, &config)
        })
    }

    pub fn properties(&self) -> &DeviceProperties {
        &self.properties
    }

    pub fn id(&self) -> u32 {
        self.properties.id
    }

    /// Opens a synchronization scope on this device.
    ///
    /// Work launched on the [`Stream`] runs asynchronously on the device
    /// workers; every launch has completed when `scope` returns. Buffers handed
    /// to a launch stay borrowed until then, so results cannot be observed early.
    pub fn scope<'scope, F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Stream<'_, 'scope>) -> R + Send,
        R: Send,
    {
        let pending = Arc::new(AtomicUsize::new(0));
        self.pool.scope(|scope| {
            let stream = Stream::new(scope, self, pending);
            f(&stream)
        })
    }

    /// Runs `op` on a device worker and waits for it.
    pub fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        self.pool.install(op)
    }
}
