use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle of a single data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    /// Never run (disabled or not yet triggered).
    Idle,
    /// First fetch in flight, no data yet.
    Loading,
    Success,
    Error,
}

/// Result holder for one asynchronous source.
///
/// A failed refetch keeps the last good data; the error is exposed next to it.
#[derive(Debug, Clone)]
pub struct Query<T> {
    status: QueryStatus,
    data: Option<T>,
    error: Option<String>,
    fetching: bool,
    updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Query {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            fetching: false,
            updated_at: None,
        }
    }
}

impl<T> Query<T> {
    pub fn status(&self) -> QueryStatus {
        self.status
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn is_idle(&self) -> bool {
        self.status == QueryStatus::Idle
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    /// A fetch is in flight while earlier data is still shown.
    pub fn is_refetching(&self) -> bool {
        self.fetching && self.data.is_some()
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    /// Mark a fetch as started.
    pub fn begin(&mut self) {
        self.fetching = true;
        if self.data.is_none() {
            self.status = QueryStatus::Loading;
        }
    }

    /// Record the outcome of the fetch started by [`Query::begin`].
    pub fn settle(&mut self, result: anyhow::Result<T>) {
        self.fetching = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                self.status = QueryStatus::Success;
                self.updated_at = Some(Utc::now());
            }
            Err(e) => {
                self.error = Some(format!("{e:#}"));
                self.status = QueryStatus::Error;
            }
        }
    }

    /// Drop data and errors, as if the query had never run.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut q: Query<u32> = Query::default();
        assert!(q.is_idle());
        assert!(q.data().is_none());

        q.begin();
        assert!(q.is_loading());
        assert!(!q.is_refetching());

        q.settle(Ok(7));
        assert_eq!(q.status(), QueryStatus::Success);
        assert_eq!(q.data(), Some(&7));
        assert!(q.updated_at().is_some());

        q.begin();
        assert!(q.is_refetching());
        assert_eq!(q.status(), QueryStatus::Success);
    }

    #[test]
    fn test_failure_keeps_last_data() {
        let mut q: Query<u32> = Query::default();
        q.begin();
        q.settle(Ok(1));
        q.begin();
        q.settle(Err(anyhow!("rpc down").context("reading gauge")));

        assert!(q.is_error());
        assert_eq!(q.data(), Some(&1));
        assert_eq!(q.error(), Some("reading gauge: rpc down"));
        assert!(!q.is_fetching());
    }

    #[test]
    fn test_reset() {
        let mut q: Query<u32> = Query::default();
        q.begin();
        q.settle(Err(anyhow!("boom")));
        q.reset();
        assert!(q.is_idle());
        assert!(q.error().is_none());
    }
}
