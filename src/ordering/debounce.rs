/// Quiet period before a reordered list is sent to the backend.
pub(crate) const SORT_DEBOUNCE_MS: i32 = 800;

/// Trailing-edge debounce over the latest value.
///
/// Time is passed in by the caller so the same state drives both the browser
/// timer and host-side tests.
#[derive(Clone, Debug)]
pub(crate) struct TrailingDebounce<T> {
    quiet_ms: i64,
    pending: Option<T>,
    deadline_ms: Option<i64>,
}

impl<T> TrailingDebounce<T> {
    pub fn new(quiet_ms: i64) -> Self {
        Self {
            quiet_ms,
            pending: None,
            deadline_ms: None,
        }
    }

    /// Replace the pending value and restart the quiet period. Returns the new deadline.
    pub fn push(&mut self, now_ms: i64, value: T) -> i64 {
        let deadline = now_ms + self.quiet_ms;
        self.pending = Some(value);
        self.deadline_ms = Some(deadline);
        deadline
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Milliseconds left before the pending value is due, if any.
    pub fn remaining_ms(&self, now_ms: i64) -> Option<i64> {
        self.deadline_ms.map(|d| (d - now_ms).max(0))
    }

    /// Take the pending value once its quiet period has elapsed.
    pub fn take_due(&mut self, now_ms: i64) -> Option<T> {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => self.flush(),
            _ => None,
        }
    }

    /// Take the pending value regardless of the deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.deadline_ms = None;
        self.pending.take()
    }

    /// Drop the pending value. Returns what was discarded.
    pub fn cancel(&mut self) -> Option<T> {
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: i64 = SORT_DEBOUNCE_MS as i64;

    /// Drive the state the way the browser timer does: poll every millisecond.
    fn fired_between<T: Clone>(
        d: &mut TrailingDebounce<T>,
        from_ms: i64,
        to_ms: i64,
    ) -> Vec<(i64, T)> {
        let mut out = vec![];
        for t in from_ms..=to_ms {
            if let Some(v) = d.take_due(t) {
                out.push((t, v));
            }
        }
        out
    }

    #[test]
    fn test_burst_coalesces_into_latest_value() {
        let mut d = TrailingDebounce::new(QUIET);
        d.push(0, "L1");
        assert!(fired_between(&mut d, 0, 199).is_empty());
        d.push(200, "L2");
        assert!(fired_between(&mut d, 200, 399).is_empty());
        d.push(400, "L3");

        let fired = fired_between(&mut d, 400, 5_000);
        assert_eq!(fired, vec![(1200, "L3")]);
        assert!(!d.is_pending());
    }

    #[test]
    fn test_steady_stream_never_fires_until_it_stops() {
        let mut d = TrailingDebounce::new(QUIET);
        let mut fired = vec![];
        let mut t = 0;
        for n in 0..20 {
            d.push(t, n);
            fired.extend(fired_between(&mut d, t, t + 599));
            t += 600;
        }
        assert!(fired.is_empty());

        // Last push was at 11_400.
        assert_eq!(d.remaining_ms(t), Some(11_400 + QUIET - t));
        assert_eq!(fired_between(&mut d, t, 20_000), vec![(12_200, 19)]);
    }

    #[test]
    fn test_take_due_before_deadline_keeps_value() {
        let mut d = TrailingDebounce::new(QUIET);
        assert_eq!(d.push(100, vec![1, 2]), 900);
        assert_eq!(d.remaining_ms(500), Some(400));
        assert_eq!(d.take_due(899), None);
        assert!(d.is_pending());
        assert_eq!(d.take_due(900), Some(vec![1, 2]));
        assert_eq!(d.take_due(901), None);
        assert_eq!(d.remaining_ms(901), None);
    }

    #[test]
    fn test_flush_and_cancel() {
        let mut d = TrailingDebounce::new(QUIET);
        d.push(0, 'a');
        assert_eq!(d.flush(), Some('a'));
        assert_eq!(d.remaining_ms(0), None);

        d.push(10, 'b');
        assert_eq!(d.cancel(), Some('b'));
        assert_eq!(d.take_due(10_000), None);
        assert_eq!(d.cancel(), None);
    }

    #[test]
    fn test_drag_scenario_persists_final_array_once() {
        let mut list = vec![1, 2, 3, 4, 5];
        list = crate::ordering::reorder(&list, 2, 0).expect("in range");
        // Local render uses `list` right away.
        assert_eq!(list, vec![3, 1, 2, 4, 5]);

        let mut d = TrailingDebounce::new(QUIET);
        d.push(0, list.clone());
        let fired = fired_between(&mut d, 0, 3_000);
        assert_eq!(fired, vec![(800, vec![3, 1, 2, 4, 5])]);
    }
}
