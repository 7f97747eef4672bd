//! The free usage window: one zero-cost update per rolling three months.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PricingError;

/// Length of the cooldown after a free update.
pub const COOLDOWN: Months = Months::new(3);

/// Whether a free update can be used right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeUsageState {
    Available,
    CoolingDown { until: DateTime<Utc> },
}

/// Eligibility for the free update, keyed off the last time it was used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeUsageWindow {
    pub last_used: Option<DateTime<Utc>>,
}

impl FreeUsageWindow {
    pub fn new(last_used: Option<DateTime<Utc>>) -> Self {
        Self { last_used }
    }

    /// When the window becomes available again, if it is cooling down at all.
    pub fn available_from(&self) -> Option<DateTime<Utc>> {
        self.last_used.map(|last| {
            last.checked_add_months(COOLDOWN)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        })
    }

    pub fn state(&self, now: DateTime<Utc>) -> FreeUsageState {
        match self.available_from() {
            Some(until) if now < until => FreeUsageState::CoolingDown { until },
            _ => FreeUsageState::Available,
        }
    }

    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == FreeUsageState::Available
    }

    /// Use the free update, starting a new cooldown at `now`.
    pub fn consume(&mut self, now: DateTime<Utc>) -> Result<(), PricingError> {
        if let FreeUsageState::CoolingDown { until } = self.state(now) {
            return Err(PricingError::FreeUsageUnavailable { until });
        }
        self.last_used = Some(now);
        Ok(())
    }
}
