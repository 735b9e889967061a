//! Memoized lookups that may legitimately resolve to nothing

/// A value computed on first access and remembered, including a miss
///
/// Unlike `Option<T>`, a memo records that resolution already happened, so a
/// lookup that found nothing is not retried on every access.
#[derive(Debug, Clone)]
pub struct Memo<T> {
    value: Option<T>,
    resolved: bool,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self {
            value: None,
            resolved: false,
        }
    }
}

impl<T: Clone> Memo<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A memo already resolved to `value`
    pub fn resolved(value: T) -> Self {
        Self {
            value: Some(value),
            resolved: true,
        }
    }

    /// Return the remembered value, running `resolve` the first time
    pub fn get_or_resolve(&mut self, resolve: impl FnOnce() -> Option<T>) -> Option<T> {
        if !self.resolved {
            self.value = resolve();
            self.resolved = true;
        }
        self.value.clone()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }
}
