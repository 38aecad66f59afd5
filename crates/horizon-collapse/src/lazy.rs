//! Lazy render gate.

use std::sync::atomic::{AtomicBool, Ordering};

/// A one-way latch that defers mounting content until it is first shown.
///
/// Before the first visible sample the gate reports `false`. From the first
/// call with `currently_visible == true` onward it reports `true` forever, so
/// content that was built once is never torn down again.
#[derive(Debug, Default)]
pub struct LazyRender {
    armed: AtomicBool,
}

impl LazyRender {
    /// Create an unarmed gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether content should be mounted, given the current visibility.
    pub fn should_render(&self, currently_visible: bool) -> bool {
        if currently_visible {
            self.armed.store(true, Ordering::Release);
            return true;
        }
        self.armed.load(Ordering::Acquire)
    }

    /// Whether the gate has latched.
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_starts_closed() {
        let gate = LazyRender::new();
        assert!(!gate.should_render(false));
        assert!(!gate.should_render(false));
        assert!(!gate.is_armed());
    }

    #[test]
    fn test_gate_latches_on_first_visible() {
        let gate = LazyRender::new();
        assert!(gate.should_render(true));
        assert!(gate.is_armed());

        for visible in [false, true, false, false] {
            assert!(gate.should_render(visible));
        }
    }
}
