//! The aggregate "select all" control: a tri-state checkbox with separate
//! user-intent and programmatic-sync channels.

use tokio::sync::mpsc;

use crate::core::AggregateState;

/// Tri-state toggle bound to the item list's aggregate selection state.
///
/// The underlying value is binary; indeterminate is a presentation state
/// layered on top. User changes are emitted on the value-changes channel,
/// while programmatic pushes mutate the value silently. Keeping the two
/// paths structurally separate is what prevents the control and the item
/// list from re-triggering each other in a cycle.
pub struct AllSelectControl {
    checked: bool,
    indeterminate: bool,
    enabled: bool,
    subscribers: Vec<mpsc::UnboundedSender<bool>>,
}

impl AllSelectControl {
    pub fn new() -> Self {
        Self {
            checked: false,
            indeterminate: false,
            enabled: true,
            subscribers: Vec::new(),
        }
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn is_indeterminate(&self) -> bool {
        self.indeterminate
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Subscribes to user-driven value changes. Programmatic pushes never
    /// appear on this channel.
    pub fn value_changes(&mut self) -> mpsc::UnboundedReceiver<bool> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// A user toggled the control. Ignored while disabled.
    pub fn set_checked(&mut self, checked: bool) {
        if !self.enabled {
            tracing::debug!("All-select toggle while disabled; ignoring");
            return;
        }
        self.checked = checked;
        self.indeterminate = false;
        self.emit(checked);
    }

    /// Programmatic value push; does not emit on the value-changes channel.
    pub fn set_checked_silent(&mut self, checked: bool) {
        self.checked = checked;
    }

    pub fn set_indeterminate(&mut self, indeterminate: bool) {
        self.indeterminate = indeterminate;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Mirrors an aggregate selection state into the control, silently.
    ///
    /// FULL shows checked; EMPTY unchecked; PARTIAL unchecked with the
    /// indeterminate mark.
    pub fn apply_aggregate(&mut self, state: AggregateState) {
        match state {
            AggregateState::Full => {
                self.set_checked_silent(true);
                self.set_indeterminate(false);
            }
            AggregateState::Empty => {
                self.set_checked_silent(false);
                self.set_indeterminate(false);
            }
            AggregateState::Partial => {
                self.set_checked_silent(false);
                self.set_indeterminate(true);
            }
        }
    }

    fn emit(&mut self, checked: bool) {
        self.subscribers
            .retain(|subscriber| subscriber.send(checked).is_ok());
    }
}

impl Default for AllSelectControl {
    fn default() -> Self {
        Self::new()
    }
}
