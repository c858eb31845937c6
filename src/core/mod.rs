pub mod detector;
pub mod error;
pub mod graph;
pub mod locks;
pub mod logger;
pub mod registry;
pub mod thread;
pub mod types;

#[cfg(feature = "stress-test")]
pub mod stress;

use std::sync::Arc;

use crate::core::error::{CoreError, CoreResult};
use crate::core::types::DeadlockInfo;

#[cfg(feature = "stress-test")]
use crate::core::stress::{StressConfig, StressMode};

const BANNER: &str = r#"
   ______           __                      __       __
  / ____/_  __ _____/ /__ _      ______ _/ /______/ /_
 / /   / / / / ___/ / _ \ | /| / / __ `/ __/ ___/ __ \
/ /___/ /_/ / /__/ /  __/ |/ |/ / /_/ / /_/ /__/ / / /
\____/\__, /\___/_/\___/|__/|__/\__,_/\__/\___/_/ /_/
     /____/
"#;

/// Builder and one-time entry point for the detector. Mirrors the host
/// crate's historical builder shape: configure, then `start()` once.
pub struct Cyclewatch {
    log_path: Option<String>,
    callback: Box<dyn Fn(DeadlockInfo) + Send + Sync + 'static>,
    #[cfg(feature = "stress-test")]
    stress_mode: StressMode,
    #[cfg(feature = "stress-test")]
    stress_config: Option<StressConfig>,
}

impl Default for Cyclewatch {
    fn default() -> Self {
        Cyclewatch {
            log_path: None,
            callback: Box::new(|_| {}),
            #[cfg(feature = "stress-test")]
            stress_mode: StressMode::None,
            #[cfg(feature = "stress-test")]
            stress_config: None,
        }
    }
}

impl Cyclewatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables the event log, written to `path`. `{timestamp}` in `path` is
    /// replaced with the detector's start time in RFC3339-ish form.
    pub fn with_log(mut self, path: impl Into<String>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    pub fn callback<F>(mut self, f: F) -> Self
    where
        F: Fn(DeadlockInfo) + Send + Sync + 'static,
    {
        self.callback = Box::new(f);
        self
    }

    #[cfg(feature = "stress-test")]
    pub fn with_stress(mut self, mode: StressMode, config: StressConfig) -> Self {
        self.stress_mode = mode;
        self.stress_config = Some(config);
        self
    }

    /// One-time initialization. Returns `CoreError::AlreadyInitialized` on
    /// a second call within the same process.
    pub fn start(self) -> CoreResult<()> {
        if let Some(path) = &self.log_path {
            if path.trim().is_empty() {
                return Err(CoreError::InvalidConfig("log path is empty".into()));
            }
        }

        let callback: Arc<dyn Fn(DeadlockInfo) + Send + Sync> = Arc::from(self.callback);
        detector::init_detector(self.log_path, callback)?;

        #[cfg(feature = "stress-test")]
        detector::configure_stress(self.stress_mode, self.stress_config);

        eprintln!("{BANNER}");
        Ok(())
    }
}
