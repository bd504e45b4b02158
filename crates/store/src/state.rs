use time::OffsetDateTime;

use qala_source::SourceError;

/// The tri-state snapshot a view observes for one collection query.
///
/// Exactly one variant holds at any time. `Ready` carries the rows in the
/// order the backend returned them plus the time the fetch committed;
/// `Failed` carries the load error (mutation errors never land here — they
/// go back to the caller).
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceState<T> {
    /// No load has been issued yet.
    Idle,
    /// A load is in flight and no newer result has committed.
    Loading,
    /// The most recently issued load succeeded.
    Ready {
        items: Vec<T>,
        fetched_at: OffsetDateTime,
    },
    /// The most recently issued load failed.
    Failed(SourceError),
}

impl<T> ResourceState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, ResourceState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ResourceState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ResourceState::Ready { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ResourceState::Failed(_))
    }

    /// The Ready rows, if any.
    pub fn items(&self) -> Option<&[T]> {
        match self {
            ResourceState::Ready { items, .. } => Some(items),
            _ => None,
        }
    }

    /// The load error, if the state is Failed.
    pub fn error(&self) -> Option<&SourceError> {
        match self {
            ResourceState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn fetched_at(&self) -> Option<OffsetDateTime> {
        match self {
            ResourceState::Ready { fetched_at, .. } => Some(*fetched_at),
            _ => None,
        }
    }
}
