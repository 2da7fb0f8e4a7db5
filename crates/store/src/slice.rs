// In crates/store/src/slice.rs

use chrono::{DateTime, Utc};

/// Lifecycle of one piece of fetched state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// A status-tracked state slice.
///
/// Only the owning [`crate::Store`] mutates slices; everyone else reads.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice<T> {
    status: Status,
    data: Option<T>,
    error: Option<String>,
    last_updated: Option<DateTime<Utc>>,
}

impl<T> Default for Slice<T> {
    fn default() -> Self {
        Self {
            status: Status::Idle,
            data: None,
            error: None,
            last_updated: None,
        }
    }
}

impl<T> Slice<T> {
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// When data last arrived successfully.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }

    pub(crate) fn set_loading(&mut self) {
        self.status = Status::Loading;
        self.error = None;
    }

    /// Replaces the data wholesale.
    pub(crate) fn set_success(&mut self, data: T) {
        self.status = Status::Succeeded;
        self.data = Some(data);
        self.error = None;
        self.last_updated = Some(Utc::now());
    }

    /// Previously loaded data, if any, stays readable.
    pub(crate) fn set_error(&mut self, error: String) {
        self.status = Status::Failed;
        self.error = Some(error);
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
