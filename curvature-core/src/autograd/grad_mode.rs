use std::cell::Cell;

thread_local! {
    static GRAD_ENABLED: Cell<bool> = Cell::new(true);
}

/// Whether operations on the current thread record autograd nodes.
pub fn is_grad_enabled() -> bool {
    GRAD_ENABLED.with(|flag| flag.get())
}

fn set_grad_enabled(enabled: bool) -> bool {
    GRAD_ENABLED.with(|flag| flag.replace(enabled))
}

/// Sets the grad mode for the current thread until dropped.
#[derive(Debug)]
pub struct GradModeGuard {
    previous: bool,
}

impl GradModeGuard {
    pub fn new(enabled: bool) -> Self {
        GradModeGuard {
            previous: set_grad_enabled(enabled),
        }
    }
}

impl Drop for GradModeGuard {
    fn drop(&mut self) {
        set_grad_enabled(self.previous);
    }
}

/// Disables graph recording until dropped.
#[derive(Debug)]
pub struct NoGradGuard {
    _inner: GradModeGuard,
}

impl NoGradGuard {
    pub fn new() -> Self {
        NoGradGuard {
            _inner: GradModeGuard::new(false),
        }
    }
}

impl Default for NoGradGuard {
    fn default() -> Self {
        Self::new()
    }
}
