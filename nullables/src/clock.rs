//! Nullable clock: validation time under test control.

use std::cell::Cell;

use tessera_types::Timestamp;

/// Time only moves when the test moves it.
#[derive(Default)]
pub struct NullClock {
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Cell::new(initial_secs),
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }

    pub fn advance(&self, secs: u64) {
        self.current.set(self.current.get().saturating_add(secs));
    }

    pub fn set(&self, secs: u64) {
        self.current.set(secs);
    }

    /// Jump to `deadline`, the first instant at which it counts as reached.
    pub fn reach(&self, deadline: Timestamp) {
        self.current.set(deadline.as_secs());
    }
}
