use std::sync::Arc;
use parking_lot::RwLock;
use chrono::{DateTime, Utc};

///
/// An overridable clock - used for tests.
///
#[derive(Debug)]
pub struct TimeProvider {
    fixed: Option<DateTime<Utc>>
}

impl TimeProvider {
    pub fn default() -> Self {
        TimeProvider { fixed: None }
    }

    pub fn now(&self) -> DateTime<Utc> {
        match self.fixed {
            Some(fixed) => fixed,
            None => Utc::now()
        }
    }

    pub fn fix(&mut self, fixed: Option<DateTime<Utc>>) {
        self.fixed = fixed;
    }
}

///
/// A cloneable handle to a shared TimeProvider.
///
/// Every component that needs the time holds one of these, so a test can fix the
/// clock in one place and have the whole core time-travel together.
///
#[derive(Clone)]
pub struct Clock {
    inner: Arc<RwLock<TimeProvider>>
}

impl Clock {
    pub fn new() -> Self {
        Clock { inner: Arc::new(RwLock::new(TimeProvider::default())) }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.inner.read().now()
    }

    ///
    /// Set or clear the fixed time.
    ///
    pub fn fix(&self, fixed: Option<DateTime<Utc>>) {
        self.inner.write().fix(fixed);
    }
}
