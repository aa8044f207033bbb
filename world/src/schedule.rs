//! One-shot deferred actions ordered on the world's simulated clock.

use std::time::Duration;

/// Time-ordered collection of one-shot deferred actions.
///
/// A schedule is constructed with `(deadline, action)` pairs whose deadlines
/// are relative to the provided start instant. [`Schedule::check`] fires every
/// not-yet-done entry whose deadline has elapsed, in ascending deadline order
/// (insertion order for ties), consuming each exactly once. Instances are
/// disposable: recurring behaviour is modelled by replacing a spent schedule
/// with a fresh one rather than re-enabling fired entries.
#[derive(Clone, Debug)]
pub struct Schedule<T> {
    start: Duration,
    entries: Vec<Entry<T>>,
}

#[derive(Clone, Debug)]
struct Entry<T> {
    deadline: Duration,
    action: Option<T>,
}

impl<T> Schedule<T> {
    /// Creates a schedule anchored at `start` holding the provided actions.
    #[must_use]
    pub fn new(start: Duration, actions: Vec<(Duration, T)>) -> Self {
        let mut entries: Vec<Entry<T>> = actions
            .into_iter()
            .map(|(deadline, action)| Entry {
                deadline,
                action: Some(action),
            })
            .collect();
        entries.sort_by_key(|entry| entry.deadline);
        Self { start, entries }
    }

    /// Fires every pending entry whose deadline has elapsed by `now`.
    ///
    /// Safe to call arbitrarily often; a fired entry never refires.
    pub fn check(&mut self, now: Duration, out: &mut Vec<T>) {
        let elapsed = now.saturating_sub(self.start);
        for entry in &mut self.entries {
            if entry.action.is_none() {
                continue;
            }
            if elapsed < entry.deadline {
                break;
            }
            if let Some(action) = entry.action.take() {
                tracing::debug!(deadline = ?entry.deadline, "schedule entry fired");
                out.push(action);
            }
        }
    }

    /// Reports whether every held entry has fired.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|entry| entry.action.is_none())
    }
}
