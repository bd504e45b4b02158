//! Typed rows for the portal's hosted collections.
//!
//! These mirror the backend schema as stored. Timestamps are RFC 3339
//! strings exactly as the backend returns them; `id` and `created_at` are
//! server-assigned, so rows built client-side leave them empty, the wire
//! payload omits them, and the created row returned by an insert carries
//! the final values.

use serde::{Deserialize, Serialize};

use crate::context::Locale;

/// A citizen appeal (request, complaint, or suggestion) filed through the
/// portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appeal {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub resident_id: String,
    pub category: String,
    pub subject: String,
    pub body: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A city resource entry (service points, utilities, public facilities).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub category: String,
    pub title_kk: String,
    pub title_ru: String,
    pub title_en: String,
    pub description_kk: String,
    pub description_ru: String,
    pub description_en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created_at: String,
}

impl Resource {
    pub fn title(&self, locale: Locale) -> &str {
        match locale {
            Locale::Kk => &self.title_kk,
            Locale::Ru => &self.title_ru,
            Locale::En => &self.title_en,
        }
    }

    pub fn description(&self, locale: Locale) -> &str {
        match locale {
            Locale::Kk => &self.description_kk,
            Locale::Ru => &self.description_ru,
            Locale::En => &self.description_en,
        }
    }
}

/// A frequently-asked question with localized question/answer columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqItem {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub question_kk: String,
    pub question_ru: String,
    pub question_en: String,
    pub answer_kk: String,
    pub answer_ru: String,
    pub answer_en: String,
    /// Display position within the FAQ page, ascending.
    pub position: i64,
}

impl FaqItem {
    pub fn question(&self, locale: Locale) -> &str {
        match locale {
            Locale::Kk => &self.question_kk,
            Locale::Ru => &self.question_ru,
            Locale::En => &self.question_en,
        }
    }

    pub fn answer(&self, locale: Locale) -> &str {
        match locale {
            Locale::Kk => &self.answer_kk,
            Locale::Ru => &self.answer_ru,
            Locale::En => &self.answer_en,
        }
    }
}

/// A notification delivered to one resident's inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidentNotification {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub resident_id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created_at: String,
}

/// An audit-trail entry recording a resident action (login, appeal filed,
/// payment initiated). Written by the portal, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub resident_id: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_resource() -> Resource {
        Resource {
            id: "res-1".to_string(),
            category: "utilities".to_string(),
            title_kk: "Сумен жабдықтау".to_string(),
            title_ru: "Водоснабжение".to_string(),
            title_en: "Water supply".to_string(),
            description_kk: "Қала сумен жабдықтау қызметі".to_string(),
            description_ru: "Городская служба водоснабжения".to_string(),
            description_en: "City water supply service".to_string(),
            url: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn resource_projects_localized_columns() {
        let r = sample_resource();
        assert_eq!(r.title(Locale::Kk), "Сумен жабдықтау");
        assert_eq!(r.title(Locale::Ru), "Водоснабжение");
        assert_eq!(r.description(Locale::En), "City water supply service");
    }

    #[test]
    fn appeal_deserializes_without_server_fields() {
        let row = serde_json::json!({
            "resident_id": "res-7",
            "category": "roads",
            "subject": "Pothole on Abay street",
            "body": "Large pothole near house 12",
            "status": "open"
        });
        let appeal: Appeal = serde_json::from_value(row).unwrap();
        assert_eq!(appeal.id, "");
        assert_eq!(appeal.created_at, "");
        assert_eq!(appeal.status, "open");
        assert_eq!(appeal.updated_at, None);
    }

    #[test]
    fn client_built_row_omits_server_assigned_fields_on_the_wire() {
        let entry = ActivityEntry {
            id: String::new(),
            resident_id: "res-7".to_string(),
            action: "appeal_filed".to_string(),
            detail: None,
            created_at: String::new(),
        };
        let row = serde_json::to_value(&entry).unwrap();
        let keys = row.as_object().unwrap();
        assert!(!keys.contains_key("id"));
        assert!(!keys.contains_key("created_at"));
        assert!(!keys.contains_key("detail"));

        // Server-returned rows keep their values.
        let stored = ActivityEntry {
            id: "act-1".to_string(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
            ..entry
        };
        let row = serde_json::to_value(&stored).unwrap();
        assert_eq!(row["id"], "act-1");
        assert_eq!(row["created_at"], "2025-01-01T00:00:00Z");
    }

    #[test]
    fn notification_read_defaults_to_false() {
        let row = serde_json::json!({
            "resident_id": "res-7",
            "title": "Appeal accepted",
            "body": "Your appeal #14 was accepted"
        });
        let n: ResidentNotification = serde_json::from_value(row).unwrap();
        assert!(!n.read);
    }
}
