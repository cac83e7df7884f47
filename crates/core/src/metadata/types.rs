use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

pub const DOCUMENT_TYPE_FIELD: &str = "dms:document-type";
pub const CLIENT_NAME_FIELD: &str = "dms:client-name";
pub const CLIENT_TAX_ID_FIELD: &str = "dms:client-tax-id";
pub const APPROVAL_STATE_FIELD: &str = "dms:approval-state";
pub const VALIDITY_STATE_FIELD: &str = "dms:validity-state";
pub const UPLOAD_DATE_FIELD: &str = "dms:upload-date";
pub const DOCUMENT_NAME_FIELD: &str = "dms:document-name";
pub const CATEGORY_FIELD: &str = "dms:category";
pub const SUB_CATEGORY_FIELD: &str = "dms:sub-category";
pub const ORIGIN_FIELD: &str = "dms:origin";
pub const RELATION_FIELD: &str = "dms:relation";
pub const EXPIRY_DATE_FIELD: &str = "dms:expiry-date";
pub const OBSERVATIONS_FIELD: &str = "dms:observations";
pub const TITLE_FIELD: &str = "cm:title";
pub const VERSION_TYPE_FIELD: &str = "cm:versionType";
pub const VERSION_LABEL_FIELD: &str = "cm:versionLabel";
pub const DESCRIPTION_FIELD: &str = "cm:description";
pub const FILE_TYPE_FIELD: &str = "file_type";

/// Closed set of sub-categories accepted by the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubCategory {
    #[serde(rename = "Riesgo")]
    Risk,
    #[serde(rename = "Comercial")]
    Commercial,
    #[serde(rename = "Operaciones")]
    Operations,
    #[serde(rename = "Legal")]
    Legal,
    #[serde(rename = "Documentos de Cliente")]
    ClientDocuments,
}

impl SubCategory {
    pub const ALL: [SubCategory; 5] = [
        SubCategory::Risk,
        SubCategory::Commercial,
        SubCategory::Operations,
        SubCategory::Legal,
        SubCategory::ClientDocuments,
    ];

    /// Label stored in the repository.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubCategory::Risk => "Riesgo",
            SubCategory::Commercial => "Comercial",
            SubCategory::Operations => "Operaciones",
            SubCategory::Legal => "Legal",
            SubCategory::ClientDocuments => "Documentos de Cliente",
        }
    }

    pub(crate) fn expected() -> String {
        Self::ALL
            .iter()
            .map(|c| format!("'{}'", c.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for SubCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubCategory {
    type Err = ValidationError;

    /// Exact, case-sensitive match on the repository label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidSubCategory {
                value: s.to_string(),
            })
    }
}

/// Properties attached to a document in the repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(rename = "dms:document-type", default)]
    pub document_type: String,
    #[serde(rename = "dms:client-name", default, skip_serializing_if = "String::is_empty")]
    pub client_name: String,
    #[serde(rename = "dms:client-tax-id", default)]
    pub client_tax_id: String,
    #[serde(rename = "dms:approval-state", default, skip_serializing_if = "String::is_empty")]
    pub approval_state: String,
    #[serde(rename = "dms:validity-state", default, skip_serializing_if = "String::is_empty")]
    pub validity_state: String,
    #[serde(rename = "dms:upload-date", default, skip_serializing_if = "String::is_empty")]
    pub upload_date: String,
    #[serde(rename = "dms:document-name", default)]
    pub document_name: String,
    #[serde(rename = "dms:category", default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(rename = "dms:sub-category", default)]
    pub sub_category: String,
    #[serde(rename = "dms:origin", default, skip_serializing_if = "String::is_empty")]
    pub origin: String,
    #[serde(rename = "dms:relation", default, skip_serializing_if = "String::is_empty")]
    pub relation: String,
    #[serde(rename = "dms:expiry-date", default, skip_serializing_if = "String::is_empty")]
    pub expiry_date: String,
    #[serde(rename = "dms:observations", default, skip_serializing_if = "String::is_empty")]
    pub observations: String,
    #[serde(rename = "cm:title", default)]
    pub title: String,
    #[serde(rename = "cm:versionType", default)]
    pub version_type: String,
    #[serde(rename = "cm:versionLabel", default)]
    pub version_label: String,
    #[serde(rename = "cm:description", default)]
    pub description: String,
    #[serde(rename = "file_type", default, skip_serializing_if = "String::is_empty")]
    pub file_type: String,
    /// Provider-specific properties that are passed through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl DocumentMetadata {
    /// Required fields that are blank, named by their wire names in declaration order.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        [
            (DOCUMENT_TYPE_FIELD, &self.document_type),
            (CLIENT_TAX_ID_FIELD, &self.client_tax_id),
            (DOCUMENT_NAME_FIELD, &self.document_name),
            (TITLE_FIELD, &self.title),
            (VERSION_TYPE_FIELD, &self.version_type),
            (VERSION_LABEL_FIELD, &self.version_label),
            (DESCRIPTION_FIELD, &self.description),
            (SUB_CATEGORY_FIELD, &self.sub_category),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Check the record is complete and the sub-category is allowed.
    pub fn validate(&self) -> Result<SubCategory, ValidationError> {
        let missing = self.missing_required_fields();
        if !missing.is_empty() {
            return Err(ValidationError::missing(missing));
        }
        self.sub_category.trim().parse()
    }

    /// Trim every known field and default the upload date to `now`.
    pub fn normalize(&mut self, now: DateTime<Utc>) {
        for field in self.fields_mut() {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }
        if self.upload_date.is_empty() {
            self.upload_date = now.to_rfc3339_opts(SecondsFormat::Secs, true);
        }
    }

    /// Fill blank fields from `defaults`. Values already present win.
    pub fn fill_from(&mut self, defaults: &DocumentMetadata) {
        for (field, default) in self.fields_mut().into_iter().zip(defaults.fields()) {
            if field.trim().is_empty() && !default.trim().is_empty() {
                field.clone_from(default);
            }
        }
        for (key, value) in &defaults.extra {
            self.extra
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    /// Serialize to the JSON object sent as the repository `properties` part.
    pub fn to_properties_json(&self) -> Result<String, ValidationError> {
        serde_json::to_string(self).map_err(|e| ValidationError::invalid_payload(e.to_string()))
    }

    fn fields(&self) -> [&String; 18] {
        [
            &self.document_type,
            &self.client_name,
            &self.client_tax_id,
            &self.approval_state,
            &self.validity_state,
            &self.upload_date,
            &self.document_name,
            &self.category,
            &self.sub_category,
            &self.origin,
            &self.relation,
            &self.expiry_date,
            &self.observations,
            &self.title,
            &self.version_type,
            &self.version_label,
            &self.description,
            &self.file_type,
        ]
    }

    fn fields_mut(&mut self) -> [&mut String; 18] {
        [
            &mut self.document_type,
            &mut self.client_name,
            &mut self.client_tax_id,
            &mut self.approval_state,
            &mut self.validity_state,
            &mut self.upload_date,
            &mut self.document_name,
            &mut self.category,
            &mut self.sub_category,
            &mut self.origin,
            &mut self.relation,
            &mut self.expiry_date,
            &mut self.observations,
            &mut self.title,
            &mut self.version_type,
            &mut self.version_label,
            &mut self.description,
            &mut self.file_type,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use chrono::TimeZone;

    #[test]
    fn test_sub_category_exact_match() {
        assert_eq!("Riesgo".parse::<SubCategory>().unwrap(), SubCategory::Risk);
        assert_eq!(
            "Documentos de Cliente".parse::<SubCategory>().unwrap(),
            SubCategory::ClientDocuments
        );
        assert!("riesgo".parse::<SubCategory>().is_err());
        assert!("Marketing".parse::<SubCategory>().is_err());
    }

    #[test]
    fn test_sub_category_serde_uses_labels() {
        let json = serde_json::to_string(&SubCategory::Operations).unwrap();
        assert_eq!(json, "\"Operaciones\"");
    }

    #[test]
    fn test_validate_complete_metadata() {
        let metadata = fixtures::valid_metadata();
        assert_eq!(metadata.validate().unwrap(), SubCategory::Risk);
    }

    #[test]
    fn test_validate_reports_all_missing_fields_in_order() {
        let mut metadata = fixtures::valid_metadata();
        metadata.title = String::new();
        metadata.client_tax_id = "   ".to_string();
        metadata.sub_category = String::new();

        let err = metadata.validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::missing(["dms:client-tax-id", "cm:title", "dms:sub-category"])
        );
    }

    #[test]
    fn test_validate_rejects_unknown_sub_category() {
        let mut metadata = fixtures::valid_metadata();
        metadata.sub_category = "Marketing".to_string();

        let err = metadata.validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidSubCategory { ref value } if value == "Marketing"));
    }

    #[test]
    fn test_optional_fields_not_required() {
        let mut metadata = fixtures::valid_metadata();
        metadata.client_name.clear();
        metadata.observations.clear();
        metadata.expiry_date.clear();
        assert!(metadata.validate().is_ok());
    }

    #[test]
    fn test_normalize_trims_and_defaults_upload_date() {
        let mut metadata = fixtures::valid_metadata();
        metadata.client_tax_id = "  20218874-5 ".to_string();
        metadata.upload_date.clear();

        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        metadata.normalize(now);

        assert_eq!(metadata.client_tax_id, "20218874-5");
        assert_eq!(metadata.upload_date, "2024-03-01T12:00:00Z");
    }

    #[test]
    fn test_normalize_keeps_given_upload_date() {
        let mut metadata = fixtures::valid_metadata();
        metadata.upload_date = "2023-12-31".to_string();
        metadata.normalize(Utc::now());
        assert_eq!(metadata.upload_date, "2023-12-31");
    }

    #[test]
    fn test_fill_from_only_fills_blanks() {
        let mut item = DocumentMetadata {
            document_name: "contract.pdf".to_string(),
            client_tax_id: "1-9".to_string(),
            ..Default::default()
        };
        let mut common = fixtures::valid_metadata();
        common.extra.insert("dms:branch".to_string(), "north".into());

        item.fill_from(&common);

        assert_eq!(item.document_name, "contract.pdf");
        assert_eq!(item.client_tax_id, "1-9");
        assert_eq!(item.title, common.title);
        assert_eq!(item.sub_category, "Riesgo");
        assert_eq!(item.extra.get("dms:branch"), Some(&Value::from("north")));
    }

    #[test]
    fn test_wire_names_and_extra_passthrough() {
        let json = serde_json::json!({
            "dms:document-type": "Contrato",
            "dms:client-tax-id": "20218874-5",
            "cm:title": "Contrato marco",
            "dms:sub-category": "Legal",
            "dms:branch": "north"
        });
        let metadata: DocumentMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(metadata.document_type, "Contrato");
        assert_eq!(metadata.title, "Contrato marco");
        assert_eq!(metadata.extra.get("dms:branch"), Some(&Value::from("north")));

        let out: serde_json::Value =
            serde_json::from_str(&metadata.to_properties_json().unwrap()).unwrap();
        assert_eq!(out["dms:branch"], "north");
        assert_eq!(out["dms:sub-category"], "Legal");
        assert!(out.get("dms:observations").is_none());
    }
}
