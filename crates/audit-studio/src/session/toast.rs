use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub seq: u64,
    pub message: String,
}

/// Single visible toast. Each show gets a fresh sequence number and a hide
/// only clears the toast it was scheduled for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastSlot {
    current: Option<Toast>,
    last_seq: u64,
}

impl ToastSlot {
    pub fn show(&mut self, message: impl Into<String>) -> u64 {
        self.last_seq += 1;
        self.current = Some(Toast {
            seq: self.last_seq,
            message: message.into(),
        });
        self.last_seq
    }

    /// Returns whether the visible toast was cleared.
    pub fn hide(&mut self, seq: u64) -> bool {
        match &self.current {
            Some(toast) if toast.seq == seq => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_hide_keeps_newer_toast() {
        let mut slot = ToastSlot::default();
        let first = slot.show("audit completed successfully");
        let second = slot.show("Milestone unlocked: Bronze Ready");

        assert!(!slot.hide(first));
        assert_eq!(
            slot.current().map(|toast| toast.message.as_str()),
            Some("Milestone unlocked: Bronze Ready")
        );
        assert!(slot.hide(second));
        assert!(slot.current().is_none());
    }
}
