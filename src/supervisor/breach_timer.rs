use std::time::Duration;
use tokio::time::Instant;

/// Remembers when a condition was first observed in an unbroken streak.
#[derive(Debug, Default, Clone, Copy)]
pub struct BreachTimer {
    since: Option<Instant>,
}

impl BreachTimer {
    /// Records that the condition holds and returns for how long it has held.
    pub fn breached(&mut self) -> Duration { self.since.get_or_insert_with(Instant::now).elapsed() }

    pub fn reset(&mut self) { self.since = None }

    pub fn is_running(&self) -> bool { self.since.is_some() }
}
