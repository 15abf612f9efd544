//! Commercial license window.

mod engine;

pub use engine::LicenseEngine;

use common::EpochMillis;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Days after expiry during which the app stays readable.
pub const GRACE_DAYS: i64 = 3;

/// Errors from license activation requests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LicenseError {
    /// Activation needs at least one day.
    #[error("License duration must be at least one day")]
    InvalidDuration,
}

/// Where the current time falls relative to the license window.
///
/// ```text
///        expires_at          expires_at + GRACE_DAYS
/// ─ Active ─┤├──── Grace ────────┤├──── Expired ────
/// ```
/// A never-activated license (expiry zero) is always `Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    /// Writes allowed.
    Active,
    /// Read-only, shortly after expiry.
    Grace,
    /// Read-only.
    Expired,
}

impl LicenseStatus {
    /// Returns true if mutating operations are permitted.
    pub fn can_write(&self) -> bool {
        matches!(self, LicenseStatus::Active)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseStatus::Active => "active",
            LicenseStatus::Grace => "grace",
            LicenseStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Preset activation lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicensePlan {
    Monthly,
    Yearly,
}

impl LicensePlan {
    /// Number of days the plan adds.
    pub fn days(&self) -> u32 {
        match self {
            LicensePlan::Monthly => 30,
            LicensePlan::Yearly => 365,
        }
    }
}

/// The stored license expiry and the pure rules around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LicenseWindow {
    expires_at: EpochMillis,
}

impl LicenseWindow {
    /// A license that was never activated.
    pub const NEVER_ACTIVATED: LicenseWindow = LicenseWindow {
        expires_at: EpochMillis::ZERO,
    };

    /// Creates a window ending at `expires_at`.
    pub fn new(expires_at: EpochMillis) -> Self {
        Self { expires_at }
    }

    /// Returns the expiry instant (zero if never activated).
    pub fn expires_at(&self) -> EpochMillis {
        self.expires_at
    }

    /// Returns the last instant of the grace period.
    pub fn grace_ends_at(&self) -> EpochMillis {
        self.expires_at.plus_days(GRACE_DAYS)
    }

    /// Computes the status at `now`.
    pub fn status_at(&self, now: EpochMillis) -> LicenseStatus {
        if now <= self.expires_at {
            LicenseStatus::Active
        } else if !self.expires_at.is_zero() && now <= self.grace_ends_at() {
            LicenseStatus::Grace
        } else {
            LicenseStatus::Expired
        }
    }

    /// Returns true if writes are allowed at `now`.
    pub fn can_write_at(&self, now: EpochMillis) -> bool {
        self.status_at(now).can_write()
    }

    /// Returns the window after activating `days` more days at `now`.
    ///
    /// Activation while still active extends from the current expiry;
    /// otherwise it starts from `now`.
    pub fn activated(&self, now: EpochMillis, days: u32) -> Result<Self, LicenseError> {
        if days == 0 {
            return Err(LicenseError::InvalidDuration);
        }
        let start = now.max(self.expires_at);
        Ok(Self {
            expires_at: start.plus_days(i64::from(days)),
        })
    }

    /// Builds a display summary at `now`.
    pub fn summary_at(&self, now: EpochMillis) -> LicenseSummary {
        let status = self.status_at(now);
        LicenseSummary {
            status,
            can_write: status.can_write(),
            expires_at: (!self.expires_at.is_zero()).then_some(self.expires_at),
            grace_ends_at: (!self.expires_at.is_zero()).then(|| self.grace_ends_at()),
        }
    }
}

/// License state for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseSummary {
    pub status: LicenseStatus,
    pub can_write: bool,
    pub expires_at: Option<EpochMillis>,
    pub grace_ends_at: Option<EpochMillis>,
}
