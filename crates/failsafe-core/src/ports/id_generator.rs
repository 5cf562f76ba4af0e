//! IdGenerator port - dead-letter id の発行
//!
//! Ids sort by failure time because the ULID timestamp comes from the
//! injected [`Clock`], not from the wall clock directly.

use ulid::Ulid;

use super::Clock;
use crate::domain::ids::DeadLetterId;

pub trait IdGenerator: Send + Sync {
    fn generate_dead_letter_id(&self) -> DeadLetterId;
}

/// Mints ULIDs whose timestamp part is `clock.now()`.
#[derive(Debug, Clone, Default)]
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_dead_letter_id(&self) -> DeadLetterId {
        // pre-epoch clocks saturate to 0
        let millis = u64::try_from(self.clock.now().timestamp_millis()).unwrap_or(0);
        DeadLetterId::from_ulid(Ulid::from_parts(millis, rand::random()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedClock, SystemClock};
    use chrono::{DateTime, TimeZone, Utc};

    #[test]
    fn ids_are_unique_per_call() {
        let ids = UlidGenerator::new(SystemClock);
        let a = ids.generate_dead_letter_id();
        let b = ids.generate_dead_letter_id();
        assert_ne!(a, b);
    }

    #[test]
    fn timestamp_part_comes_from_clock() {
        let failed_at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        let ids = UlidGenerator::new(FixedClock::new(failed_at));

        let id = ids.generate_dead_letter_id();
        assert_eq!(id.as_ulid().timestamp_ms(), failed_at.timestamp_millis() as u64);
    }

    #[test]
    fn later_failures_sort_after_earlier_ones() {
        let early = UlidGenerator::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()))
            .generate_dead_letter_id();
        let late = UlidGenerator::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()))
            .generate_dead_letter_id();
        assert!(early < late);
    }

    #[test]
    fn pre_epoch_clock_saturates() {
        let before_epoch = DateTime::from_timestamp_millis(-5_000).unwrap();
        let id = UlidGenerator::new(FixedClock::new(before_epoch)).generate_dead_letter_id();
        assert_eq!(id.as_ulid().timestamp_ms(), 0);
    }
}
