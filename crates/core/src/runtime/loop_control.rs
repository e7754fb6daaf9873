use chrono::Timelike;

use crate::connectivity::Link;

/// Minutes between scheduled price refreshes while online.
pub const REFRESH_EVERY_MINUTES: u32 = 15;

/// Whether a tick should poll the price source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    /// Offline: poll on every tick until something succeeds.
    Recover,
    /// Online and on a quarter-hour boundary.
    Refresh,
    Idle,
}

impl TickDecision {
    pub fn should_fetch(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

pub fn is_quarter_hour<T: Timelike>(now: &T) -> bool {
    now.minute() % REFRESH_EVERY_MINUTES == 0
}

/// Decide what this tick does.
pub fn decide<T: Timelike>(link: Link, now: &T) -> TickDecision {
    match link {
        Link::Offline => TickDecision::Recover,
        Link::Online if is_quarter_hour(now) => TickDecision::Refresh,
        Link::Online => TickDecision::Idle,
    }
}
