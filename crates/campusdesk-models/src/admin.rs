//! Admin-only reporting and bulk import shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// One data row of a student import sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportRow {
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportError {
    pub email: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BulkImportResult {
    pub created_count: usize,
    pub errors: Vec<ImportError>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RecentClass {
    pub id: Uuid,
    pub name: String,
    pub teacher_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema)]
pub struct WorkReportCounts {
    pub total_classes: i64,
    pub total_students: i64,
    pub total_faculty: i64,
    pub total_authorities: i64,
    pub classes_without_teacher: i64,
    pub classes_without_students: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkReport {
    #[serde(flatten)]
    pub counts: WorkReportCounts,
    pub recent_classes: Vec<RecentClass>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct SendWorkReportDto {
    #[validate(email(message = "A valid email is required"))]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WorkReportSent {
    pub sent_to: String,
    pub report: WorkReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_report_flattens_counts() {
        let report = WorkReport {
            counts: WorkReportCounts {
                total_classes: 3,
                ..Default::default()
            },
            recent_classes: vec![],
            generated_at: Utc::now(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_classes"], 3);
        assert_eq!(json["classes_without_teacher"], 0);
    }

    #[test]
    fn test_send_work_report_email_is_optional() {
        assert!(SendWorkReportDto::default().validate().is_ok());
        let bad = SendWorkReportDto {
            email: Some("nope".to_string()),
        };
        assert!(bad.validate().is_err());
    }
}
