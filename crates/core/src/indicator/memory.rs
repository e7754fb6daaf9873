use std::sync::{Arc, Mutex, MutexGuard};

use super::{IndicatorConfig, IndicatorStore, LedMode, LedState};
use crate::error::IndicatorError;

#[derive(Debug)]
struct Inner {
    config: IndicatorConfig,
    writes: u64,
    reject: bool,
}

/// In-process indicator. Clones share one device, so a test or the binary can
/// keep a handle while the scheduler owns another.
#[derive(Debug, Clone)]
pub struct MemoryIndicator {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryIndicator {
    pub fn new() -> Self {
        Self::with_mode(LedMode::Switch)
    }

    pub fn with_mode(mode: LedMode) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                config: IndicatorConfig {
                    mode,
                    on: LedState::default(),
                    off: LedState::default(),
                },
                writes: 0,
                reject: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current device state.
    pub fn snapshot(&self) -> IndicatorConfig {
        self.lock().config
    }

    /// Number of accepted writes.
    pub fn writes(&self) -> u64 {
        self.lock().writes
    }

    /// Make subsequent writes fail, as a device would when busy.
    pub fn reject_writes(&self, reject: bool) {
        self.lock().reject = reject;
    }
}

impl Default for MemoryIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorStore for MemoryIndicator {
    fn get_config(&self) -> Result<IndicatorConfig, IndicatorError> {
        Ok(self.lock().config)
    }

    fn set_config(&mut self, config: IndicatorConfig) -> Result<(), IndicatorError> {
        let mut inner = self.lock();
        if inner.reject {
            return Err(IndicatorError::Rejected("device busy".into()));
        }
        inner.config = config;
        inner.writes += 1;
        tracing::info!(
            mode = ?config.mode,
            rgb = ?config.on.rgb.0,
            on_brightness = config.on.brightness,
            off_brightness = config.off.brightness,
            "indicator"
        );
        Ok(())
    }
}
