//! Scoped release of host resources.
//!
//! A component acquires its listeners, observers and timers at mount and
//! pushes one release action per resource into a [`Disposer`]. Unmount runs
//! every action exactly once; dropping the bag does the same, so early
//! returns and panics unwinding through the owner still release everything.

/// A bag of release actions run once, in reverse acquisition order.
#[derive(Default)]
pub struct Disposer {
    actions: Vec<Box<dyn FnOnce()>>,
    disposed: bool,
}

impl Disposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a release action. If the bag was already disposed the action
    /// runs immediately, so late acquisitions cannot leak.
    pub fn defer(&mut self, action: impl FnOnce() + 'static) {
        if self.disposed {
            action();
        } else {
            self.actions.push(Box::new(action));
        }
    }

    /// Run every pending action. Idempotent: returns false on repeat calls.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.disposed = true;
        while let Some(action) = self.actions.pop() {
            action();
        }
        true
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Number of actions still waiting to run.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Drop for Disposer {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Disposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposer")
            .field("pending", &self.actions.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn runs_in_reverse_order_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bag = Disposer::new();
        for name in ["pointer", "scroll", "timer"] {
            let log = log.clone();
            bag.defer(move || log.borrow_mut().push(name));
        }
        assert_eq!(bag.len(), 3);

        assert!(bag.dispose());
        assert!(!bag.dispose());
        assert_eq!(*log.borrow(), vec!["timer", "scroll", "pointer"]);
    }

    #[test]
    fn drop_releases_everything() {
        let count = Rc::new(RefCell::new(0));
        {
            let mut bag = Disposer::new();
            let c = count.clone();
            bag.defer(move || *c.borrow_mut() += 1);
        }
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn late_defer_runs_immediately() {
        let count = Rc::new(RefCell::new(0));
        let mut bag = Disposer::new();
        bag.dispose();

        let c = count.clone();
        bag.defer(move || *c.borrow_mut() += 1);
        assert_eq!(*count.borrow(), 1);
        assert!(bag.is_empty());
    }
}
