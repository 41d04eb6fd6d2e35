//! Wall-clock sources.
//!
//! Everything that depends on "now" or on the local calendar takes a
//! [`Clock`], so tests can pin time and zone.

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use std::cell::Cell;

/// Map a wall-clock time in `zone` to an instant.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times inside a
/// DST gap are pushed forward by an hour, the way browsers resolve them.
pub fn resolve_local<Z: TimeZone>(zone: &Z, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    zone.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            zone.from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
}

/// Source of the current instant and of the zone used for calendar math.
pub trait Clock {
    /// Zone in which due dates are interpreted (09:00, "tomorrow", months).
    type Zone: TimeZone;

    fn now(&self) -> DateTime<Utc>;

    fn zone(&self) -> Self::Zone;
}

/// The host clock in the host's local zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Zone = Local;

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn zone(&self) -> Local {
        Local
    }
}

/// Manually advanced clock for tests and simulations.
///
/// Uses UTC as its calendar zone so results don't depend on the host.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Move time forward (or backward for negative durations).
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    type Zone = Utc;

    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn zone(&self) -> Utc {
        Utc
    }
}

impl<C: Clock> Clock for &C {
    type Zone = C::Zone;

    fn now(&self) -> DateTime<Utc> {
        (*self).now()
    }

    fn zone(&self) -> Self::Zone {
        (*self).zone()
    }
}

/// US Eastern time for 2024 only: EST, EDT from Mar 10 02:00 local, EST again
/// from Nov 3 02:00 local.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct DstZone;
