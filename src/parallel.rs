//! Parallel processing configuration and management
//!
//! Batch conversions run one input file per Rayon task. This module
//! configures Rayon's global thread pool for that.

use crate::errors::{Nc2NaError, Result};
use rayon::ThreadPoolBuilder;
use tracing::{debug, info};

/// Configuration for parallel processing
#[derive(Debug, Clone, Default)]
pub struct ParallelConfig {
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    /// Create a new parallel configuration
    pub fn new(num_threads: Option<usize>) -> Self {
        Self { num_threads }
    }

    /// Set up the global Rayon thread pool with the specified configuration
    pub fn setup_global_pool(&self) -> Result<()> {
        if let Some(num_threads) = self.num_threads {
            ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .map_err(|e| {
                    Nc2NaError::ThreadPoolError(format!(
                        "Failed to initialize thread pool with {} threads: {}",
                        num_threads, e
                    ))
                })?;

            info!("configured parallel processing with {} threads", num_threads);
        } else {
            debug!("using default thread pool configuration");
        }

        Ok(())
    }
}

/// Get information about the current parallel configuration
pub fn get_parallel_info() -> ParallelInfo {
    ParallelInfo {
        current_threads: rayon::current_num_threads(),
        available_cores: num_cpus::get(),
        available_parallelism: std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1),
    }
}

/// Information about the parallel processing environment
#[derive(Debug, Clone)]
pub struct ParallelInfo {
    pub current_threads: usize,
    pub available_cores: usize,
    pub available_parallelism: usize,
}

impl ParallelInfo {
    /// Log parallel processing information
    pub fn log(&self) {
        debug!(
            "threads: {}, CPU cores: {}, available parallelism: {}",
            self.current_threads, self.available_cores, self.available_parallelism
        );
    }
}
