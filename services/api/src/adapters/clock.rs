//! services/api/src/adapters/clock.rs
//!
//! Wall-clock implementation of the `Clock` port.

use chrono::{DateTime, Utc};
use lending_ledger_core::ports::Clock;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
