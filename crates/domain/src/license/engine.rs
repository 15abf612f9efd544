use std::sync::Arc;

use common::{Clock, EpochMillis};
use storage::{KeyValueStore, PersistenceStore};

use super::{LicensePlan, LicenseStatus, LicenseSummary, LicenseWindow};
use crate::error::Result;

/// Reads and extends the persisted license window.
///
/// The expiry is re-read from storage on every query, so several engines
/// over the same backend always agree.
#[derive(Clone)]
pub struct LicenseEngine<S: KeyValueStore> {
    persistence: PersistenceStore<S>,
    clock: Arc<dyn Clock>,
}

impl<S: KeyValueStore> LicenseEngine<S> {
    /// Creates an engine over the given persistence and clock.
    pub fn new(persistence: PersistenceStore<S>, clock: Arc<dyn Clock>) -> Self {
        Self { persistence, clock }
    }

    /// Returns the current time according to the injected clock.
    pub fn now(&self) -> EpochMillis {
        self.clock.now()
    }

    /// Loads the stored window.
    pub async fn window(&self) -> LicenseWindow {
        LicenseWindow::new(self.persistence.load_license_end().await)
    }

    /// Returns the status at the current time.
    pub async fn status(&self) -> LicenseStatus {
        self.window().await.status_at(self.now())
    }

    /// Returns true if mutating operations are currently permitted.
    pub async fn can_write(&self) -> bool {
        self.status().await.can_write()
    }

    /// Returns a display summary at the current time.
    pub async fn summary(&self) -> LicenseSummary {
        self.window().await.summary_at(self.now())
    }

    /// Activates `days` more days and persists the new expiry.
    #[tracing::instrument(skip(self))]
    pub async fn activate(&self, days: u32) -> Result<EpochMillis> {
        let now = self.now();
        let next = self.window().await.activated(now, days)?;
        self.persistence.save_license_end(next.expires_at()).await?;

        metrics::counter!("license_activations_total").increment(1);
        tracing::info!(expires_at = %next.expires_at(), "license activated");
        Ok(next.expires_at())
    }

    /// Activates a preset plan.
    pub async fn activate_plan(&self, plan: LicensePlan) -> Result<EpochMillis> {
        self.activate(plan.days()).await
    }
}
