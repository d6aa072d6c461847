/// T-state accounting for one processor.
///
/// The run loop executes while `tstates < next_event`. Both values are
/// signed so a host can carry a small overshoot across frames by
/// subtracting the frame length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Clock {
    /// Elapsed T-states.
    pub tstates: i32,
    /// Scheduling boundary at which the run loop pauses.
    pub next_event: i32,
}

impl Clock {
    /// Adds `count` T-states.
    pub const fn advance(&mut self, count: i32) {
        self.tstates = self.tstates.wrapping_add(count);
    }

    /// Returns `true` while the run loop may start another instruction.
    #[must_use]
    pub const fn before_event(&self) -> bool {
        self.tstates < self.next_event
    }
}

#[cfg(test)]
mod tests {
    use super::Clock;

    #[test]
    fn advance_accumulates_until_boundary() {
        let mut clock = Clock {
            tstates: 0,
            next_event: 8,
        };
        clock.advance(4);
        assert!(clock.before_event());
        clock.advance(4);
        assert!(!clock.before_event());
        assert_eq!(clock.tstates, 8);
    }
}
