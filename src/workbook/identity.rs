//! Resource identity parsing
//!
//! Azure identities look like
//! `/subscriptions/{sub}/resourceGroups/{group}/providers/{namespace}/{type}/{name}`,
//! optionally followed by further `{childType}/{childName}` pairs. They are
//! always issued by the remote side, so only parsing is needed here.

use super::error::{WorkbookError, WorkbookResult};

/// Structured view of a resource identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    pub subscription_id: String,
    pub resource_group: String,
    pub provider: String,
    /// `(type, name)` pairs after the provider namespace, outermost first
    pub segments: Vec<(String, String)>,
}

impl ResourceId {
    /// Parse an identity string
    pub fn parse(identity: &str) -> WorkbookResult<Self> {
        let trimmed = identity.trim();
        let Some(path) = trimmed.strip_prefix('/') else {
            return Err(WorkbookError::malformed(identity, "must start with '/'"));
        };
        let path = path.trim_end_matches('/');

        let components: Vec<&str> = path.split('/').collect();
        if components.iter().any(|c| c.is_empty()) {
            return Err(WorkbookError::malformed(identity, "contains an empty segment"));
        }
        if components.len() % 2 != 0 {
            return Err(WorkbookError::malformed(
                identity,
                "expected an even number of key/value segments",
            ));
        }

        let mut pairs = components.chunks_exact(2).map(|c| (c[0], c[1]));

        let subscription_id = match pairs.next() {
            Some((key, value)) if key.eq_ignore_ascii_case("subscriptions") => value.to_string(),
            _ => {
                return Err(WorkbookError::malformed(
                    identity,
                    "missing 'subscriptions' segment",
                ))
            }
        };

        let resource_group = match pairs.next() {
            Some((key, value)) if key.eq_ignore_ascii_case("resourceGroups") => value.to_string(),
            _ => {
                return Err(WorkbookError::malformed(
                    identity,
                    "missing 'resourceGroups' segment",
                ))
            }
        };

        let provider = match pairs.next() {
            Some((key, value)) if key.eq_ignore_ascii_case("providers") => value.to_string(),
            _ => {
                return Err(WorkbookError::malformed(
                    identity,
                    "missing 'providers' segment",
                ))
            }
        };

        let segments: Vec<(String, String)> = pairs
            .map(|(t, n)| (t.to_string(), n.to_string()))
            .collect();
        if segments.is_empty() {
            return Err(WorkbookError::malformed(
                identity,
                "missing resource type and name after provider",
            ));
        }

        Ok(Self {
            subscription_id,
            resource_group,
            provider,
            segments,
        })
    }

    /// The final `(type, name)` pair
    pub fn type_and_name(&self) -> (&str, &str) {
        // parse guarantees at least one segment
        let (t, n) = &self.segments[self.segments.len() - 1];
        (t, n)
    }

    /// Name of the resource the identity points at
    pub fn name(&self) -> &str {
        self.type_and_name().1
    }

    /// Look up the name stored under a type segment, e.g. `workbooks`
    pub fn path_value(&self, resource_type: &str) -> Option<&str> {
        self.segments
            .iter()
            .find(|(t, _)| t.eq_ignore_ascii_case(resource_type))
            .map(|(_, n)| n.as_str())
    }
}
