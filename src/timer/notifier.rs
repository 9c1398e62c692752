/// A finished countdown, as announced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// Whether the countdown that finished was a focus session.
    pub focus_finished: bool,
    /// Focus sessions completed today.
    pub count: usize,
}

impl Completion {
    pub fn title(&self) -> &'static str {
        if self.focus_finished {
            "Focusing finished. Start resting."
        } else {
            "Resting finished. Start focusing."
        }
    }

    pub fn body(&self) -> String {
        format!("Completed {} sessions today.", self.count)
    }
}

/// Sink for the tray indicator and desktop notifications. Calls are fire-and-forget.
pub trait Notifier: Send + Sync {
    /// Minutes left on the clock changed. `None` resets the indicator.
    fn minute_changed(&self, minutes: Option<i64>);

    fn session_completed(&self, completion: &Completion);
}
