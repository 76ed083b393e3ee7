//! Change proposals (MCPs) as they appear in staged batch files.

use serde::{Deserialize, Serialize};

use crate::taxonomy::EntityCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Upsert,
    Delete,
}

/// A logical entity as the admin layer knows it, before mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReference {
    pub category: EntityCategory,
    pub original_urn: String,
}

impl EntityReference {
    pub fn new(category: EntityCategory, original_urn: impl Into<String>) -> Self {
        Self {
            category,
            original_urn: original_urn.into(),
        }
    }
}

/// One metadata write intent.
///
/// Field order is the on-disk order: `entityType, entityUrn, changeType,
/// aspectName, aspect`. `DELETE` proposals carry no aspect body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeProposal {
    pub entity_type: String,
    pub entity_urn: String,
    pub change_type: ChangeType,
    pub aspect_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect: Option<serde_json::Value>,
}

impl ChangeProposal {
    pub fn upsert(
        category: EntityCategory,
        entity_urn: impl Into<String>,
        aspect_name: impl Into<String>,
        aspect: serde_json::Value,
    ) -> Self {
        Self {
            entity_type: category.urn_token().to_string(),
            entity_urn: entity_urn.into(),
            change_type: ChangeType::Upsert,
            aspect_name: aspect_name.into(),
            aspect: Some(aspect),
        }
    }

    pub fn delete(
        category: EntityCategory,
        entity_urn: impl Into<String>,
        aspect_name: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: category.urn_token().to_string(),
            entity_urn: entity_urn.into(),
            change_type: ChangeType::Delete,
            aspect_name: aspect_name.into(),
            aspect: None,
        }
    }

    /// Category of this proposal, if its `entityType` is one we stage.
    pub fn category(&self) -> Option<EntityCategory> {
        self.entity_type.parse().ok()
    }
}
