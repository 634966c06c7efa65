//! Workbook manifests
//!
//! A manifest is one [`DesiredState`] written as YAML (or JSON when the file
//! ends in `.json`).

use crate::workbook::{DesiredState, WorkbookKind};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

/// Load and validate a manifest file
pub fn load(path: &Path) -> Result<DesiredState> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;

    let desired = parse(&content, is_json(path))
        .with_context(|| format!("Failed to parse manifest {}", path.display()))?;
    desired
        .validate()
        .with_context(|| format!("Invalid manifest {}", path.display()))?;

    Ok(desired)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

pub fn parse(content: &str, json: bool) -> Result<DesiredState> {
    if json {
        Ok(serde_json::from_str(content)?)
    } else {
        Ok(serde_yaml::from_str(content)?)
    }
}

pub fn to_yaml(desired: &DesiredState) -> Result<String> {
    Ok(serde_yaml::to_string(desired)?)
}

/// Starter manifest with a fresh workbook id
pub fn scaffold(
    name: &str,
    resource_group: &str,
    application_insights_id: &str,
    location: &str,
    user_id: Uuid,
) -> DesiredState {
    DesiredState {
        name: name.to_string(),
        resource_group: resource_group.to_string(),
        parent_resource_id: application_insights_id.to_string(),
        location: location.to_string(),
        kind: Some(WorkbookKind::Shared),
        serialized_data: r#"{"version":"Notebook/1.0","items":[]}"#.to_string(),
        version: Some("1.0".to_string()),
        workbook_id: Uuid::new_v4(),
        category: "workbook".to_string(),
        labels: vec![],
        user_id,
        source_resource_id: None,
        tags: BTreeMap::new(),
    }
}
