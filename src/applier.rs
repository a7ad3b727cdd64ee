//! Drives a preset selection through the compute, validity-gate, apply and
//! confirm/revert steps while keeping the last known-good configuration
//! around as a rollback snapshot.

use tracing::{debug, info, instrument, warn};

use crate::model::{DisplayConfig, Preset};
use crate::sys::backend::{Backend, BackendError};
use crate::sys::confirm::{Confirm, Decision};

/// Which edge of the selection flow was taken.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The preset left the configuration untouched; nothing was applied.
    Unchanged,
    /// The backend refused the computed layout; nothing was applied.
    Invalid,
    /// Applied and confirmed; the snapshot now tracks the new layout.
    Accepted,
    /// Applied, then rejected or timed out; the previous layout was restored.
    Reverted,
}

pub struct LayoutPresetApplier<B, C> {
    backend: B,
    confirm: C,
    config: DisplayConfig,
    previous: DisplayConfig,
}

impl<B: Backend, C: Confirm> LayoutPresetApplier<B, C> {
    pub fn new(backend: B, confirm: C, config: DisplayConfig) -> Self {
        let previous = config.clone();
        Self { backend, confirm, config, previous }
    }

    /// Seeds the applier from the backend's view of the live configuration.
    pub fn from_backend(mut backend: B, confirm: C) -> Result<Self, BackendError> {
        let config = backend.snapshot()?;
        Ok(Self::new(backend, confirm, config))
    }

    pub fn config(&self) -> &DisplayConfig { &self.config }

    /// Entry point for selection controls that report a raw index.
    pub fn on_selection_changed(&mut self, index: u8) -> Result<SelectOutcome, BackendError> {
        match Preset::try_from(index) {
            Ok(preset) => self.select(preset),
            Err(_) => {
                warn!(index, "ignoring out-of-range preset selection");
                Ok(SelectOutcome::Unchanged)
            }
        }
    }

    #[instrument(name = "applier::select", skip(self))]
    pub fn select(&mut self, preset: Preset) -> Result<SelectOutcome, BackendError> {
        if !preset.apply_to(&mut self.config) {
            debug!("preset left the configuration untouched");
            return Ok(SelectOutcome::Unchanged);
        }
        if !self.backend.can_apply(&self.config) {
            debug!("computed layout cannot be applied");
            return Ok(SelectOutcome::Invalid);
        }
        self.backend.apply(&self.config)?;

        match self.confirm.confirm() {
            Decision::Accepted => {
                self.previous = self.config.clone();
                info!(%preset, "layout confirmed");
                Ok(SelectOutcome::Accepted)
            }
            Decision::Rejected => {
                self.backend.apply(&self.previous)?;
                self.config = self.previous.clone();
                info!(%preset, "layout rejected, previous configuration restored");
                Ok(SelectOutcome::Reverted)
            }
        }
    }
}
