//! Workbook data model
//!
//! [`DesiredState`] is what a manifest declares, [`RemoteState`] is what a
//! read observes, and [`Workbook`] / [`WorkbookProperties`] are the ARM wire
//! shapes exchanged with the remote API.

use super::error::{WorkbookError, WorkbookResult};
use super::identity::ResourceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Sharing mode of a workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkbookKind {
    User,
    Shared,
}

impl WorkbookKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkbookKind::User => "user",
            WorkbookKind::Shared => "shared",
        }
    }
}

impl fmt::Display for WorkbookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkbookKind {
    type Err = WorkbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("user") {
            Ok(WorkbookKind::User)
        } else if s.eq_ignore_ascii_case("shared") {
            Ok(WorkbookKind::Shared)
        } else {
            Err(WorkbookError::invalid(
                "kind",
                format!("expected one of [user, shared], got {s:?}"),
            ))
        }
    }
}

/// Declared configuration of one workbook
///
/// Field names on the serde side are the manifest keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredState {
    pub name: String,
    #[serde(rename = "resource_group_name")]
    pub resource_group: String,
    #[serde(rename = "application_insights_id")]
    pub parent_resource_id: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<WorkbookKind>,
    pub serialized_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub workbook_id: Uuid,
    pub category: String,
    #[serde(default, rename = "workbook_tags", skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl DesiredState {
    /// Check the field constraints a manifest must satisfy
    pub fn validate(&self) -> WorkbookResult<()> {
        not_blank("name", &self.name)?;
        validate_resource_group_name(&self.resource_group)?;
        ResourceId::parse(&self.parent_resource_id).map_err(|e| {
            WorkbookError::invalid("application_insights_id", e.to_string())
        })?;
        not_blank("location", &self.location)?;

        if let Err(e) = serde_json::from_str::<serde_json::Value>(&self.serialized_data) {
            return Err(WorkbookError::invalid(
                "serialized_data",
                format!("must be valid JSON: {e}"),
            ));
        }

        not_blank("category", &self.category)?;
        for label in &self.labels {
            not_blank("workbook_tags", label)?;
        }

        Ok(())
    }
}

fn not_blank(field: &'static str, value: &str) -> WorkbookResult<()> {
    if value.trim().is_empty() {
        return Err(WorkbookError::invalid(field, "must not be blank"));
    }
    Ok(())
}

/// Resource group names: 1-90 chars of letters, digits, `_-.()`, not ending in `.`
pub fn validate_resource_group_name(value: &str) -> WorkbookResult<()> {
    const FIELD: &str = "resource_group_name";

    if value.is_empty() || value.chars().count() > 90 {
        return Err(WorkbookError::invalid(FIELD, "must be 1-90 characters long"));
    }
    if value.ends_with('.') {
        return Err(WorkbookError::invalid(FIELD, "cannot end with a period"));
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '(' | ')');
    if !value.chars().all(allowed) {
        return Err(WorkbookError::invalid(
            FIELD,
            "may only contain alphanumeric characters, periods, underscores, hyphens and parentheses",
        ));
    }
    Ok(())
}

/// Normalize a location the way ARM compares them: lowercase, no spaces
pub fn normalize_location(location: &str) -> String {
    location.replace(' ', "").to_lowercase()
}

/// ARM representation of a workbook
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workbook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// May come back empty; see [`WorkbookProperties::kind`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<WorkbookProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbookProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialized_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workbook_id: Option<String>,
    /// Shared type kind as reported inside the properties block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_resource_id: Option<String>,
}

/// Normalized view of a workbook as observed remotely
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteState {
    pub identity: String,
    pub name: String,
    pub resource_group: String,
    pub location: Option<String>,
    pub kind: Option<WorkbookKind>,
    /// Decoded hidden link, if the workbook carries one
    pub parent_resource_id: Option<String>,
    /// User tags, hidden link entries removed
    pub tags: BTreeMap<String, String>,
    pub serialized_data: Option<String>,
    pub version: Option<String>,
    pub workbook_id: Option<String>,
    pub category: Option<String>,
    pub labels: Vec<String>,
    pub user_id: Option<String>,
    pub source_resource_id: Option<String>,
    pub time_modified: Option<String>,
}

impl RemoteState {
    /// Project the observed state back into a manifest
    ///
    /// Used by import; fails when a required field is missing or malformed
    /// remotely.
    pub fn to_desired(&self) -> WorkbookResult<DesiredState> {
        let parent_resource_id = self.parent_resource_id.clone().ok_or_else(|| {
            WorkbookError::invalid(
                "application_insights_id",
                "workbook carries no hidden-link tag",
            )
        })?;
        let location = self
            .location
            .clone()
            .ok_or_else(|| WorkbookError::invalid("location", "missing in remote state"))?;

        Ok(DesiredState {
            name: self.name.clone(),
            resource_group: self.resource_group.clone(),
            parent_resource_id,
            location,
            kind: self.kind,
            serialized_data: self.serialized_data.clone().unwrap_or_default(),
            version: self.version.clone().filter(|v| !v.is_empty()),
            workbook_id: parse_uuid("workbook_id", self.workbook_id.as_deref())?,
            category: self.category.clone().unwrap_or_default(),
            labels: self.labels.clone(),
            user_id: parse_uuid("user_id", self.user_id.as_deref())?,
            source_resource_id: self.source_resource_id.clone().filter(|s| !s.is_empty()),
            tags: self.tags.clone(),
        })
    }
}

fn parse_uuid(field: &'static str, value: Option<&str>) -> WorkbookResult<Uuid> {
    let value = value.ok_or_else(|| WorkbookError::invalid(field, "missing in remote state"))?;
    Uuid::parse_str(value).map_err(|e| WorkbookError::invalid(field, e.to_string()))
}
