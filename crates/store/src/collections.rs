//! Typed stores and write-side helpers for the portal's collections.
//!
//! One constructor per screen-facing collection replaces the five
//! near-identical data hooks the portal used to carry. The canonical
//! query builders capture what each screen actually asks for: a
//! resident's own appeals newest-first, FAQ in display position order,
//! a resident's notification inbox newest-first.

use std::sync::Arc;

use qala_model::{
    names, ActivityEntry, Appeal, FaqItem, FilterOp, QuerySpec, RecordId, ResidentNotification,
    Resource, SortDirection,
};
use qala_source::{CollectionSource, SourceError};

use crate::store::ResourceStore;

pub fn appeals(source: Arc<dyn CollectionSource>) -> ResourceStore<Appeal> {
    ResourceStore::new(source, names::APPEALS.into())
}

pub fn resources(source: Arc<dyn CollectionSource>) -> ResourceStore<Resource> {
    ResourceStore::new(source, names::RESOURCES.into())
}

pub fn faq(source: Arc<dyn CollectionSource>) -> ResourceStore<FaqItem> {
    ResourceStore::new(source, names::FAQ_ITEMS.into())
}

pub fn notifications(source: Arc<dyn CollectionSource>) -> ResourceStore<ResidentNotification> {
    ResourceStore::new(source, names::NOTIFICATIONS.into())
}

/// A resident's own appeals, newest first.
pub fn resident_appeals_query(resident_id: &str) -> QuerySpec {
    QuerySpec::all()
        .filter("resident_id", FilterOp::Eq, resident_id)
        .order_by("created_at", SortDirection::Descending)
}

/// FAQ entries in display order.
pub fn faq_query() -> QuerySpec {
    QuerySpec::all().order_by("position", SortDirection::Ascending)
}

/// A resident's notification inbox, newest first.
pub fn resident_notifications_query(resident_id: &str) -> QuerySpec {
    QuerySpec::all()
        .filter("resident_id", FilterOp::Eq, resident_id)
        .order_by("created_at", SortDirection::Descending)
}

/// Write-side helper for the audit trail.
///
/// Entries are fire-and-report: the outcome is logged and returned, and
/// no read snapshot is touched — activity lists refresh on their next
/// `load` like everything else.
pub struct ActivityLog {
    store: ResourceStore<ActivityEntry>,
}

impl ActivityLog {
    pub fn new(source: Arc<dyn CollectionSource>) -> Self {
        Self {
            store: ResourceStore::new(source, names::ACTIVITIES.into()),
        }
    }

    pub async fn record(
        &self,
        resident_id: &str,
        action: &str,
        detail: Option<String>,
    ) -> Result<ActivityEntry, SourceError> {
        let entry = ActivityEntry {
            id: String::new(),
            resident_id: resident_id.to_string(),
            action: action.to_string(),
            detail,
            created_at: String::new(),
        };
        match self.store.insert(&entry).await {
            Ok(created) => {
                tracing::info!(resident_id, action, id = %created.id, "activity recorded");
                Ok(created)
            }
            Err(err) => {
                tracing::warn!(resident_id, action, error = %err, "activity record failed");
                Err(err)
            }
        }
    }
}

/// Write-side helper for resident notifications.
pub struct Notifier {
    store: ResourceStore<ResidentNotification>,
}

impl Notifier {
    pub fn new(source: Arc<dyn CollectionSource>) -> Self {
        Self {
            store: ResourceStore::new(source, names::NOTIFICATIONS.into()),
        }
    }

    pub async fn send(
        &self,
        resident_id: &str,
        title: &str,
        body: &str,
    ) -> Result<ResidentNotification, SourceError> {
        let notification = ResidentNotification {
            id: String::new(),
            resident_id: resident_id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            read: false,
            created_at: String::new(),
        };
        match self.store.insert(&notification).await {
            Ok(created) => {
                tracing::info!(resident_id, id = %created.id, "notification sent");
                Ok(created)
            }
            Err(err) => {
                tracing::warn!(resident_id, error = %err, "notification send failed");
                Err(err)
            }
        }
    }

    pub async fn mark_read(&self, id: &RecordId) -> Result<(), SourceError> {
        let result = self
            .store
            .update(id, serde_json::json!({"read": true}))
            .await;
        if let Err(err) = &result {
            tracing::warn!(id = %id, error = %err, "mark-read failed");
        }
        result
    }
}
