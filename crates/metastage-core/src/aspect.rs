//! Aspect payloads.
//!
//! The aspects the admin layer builds for tags, glossary entries, structured
//! properties, domains and data products have typed shapes here. Anything
//! else rides along as raw JSON in [`AspectPayload::Other`].
//!
//! Aspects deserialised from a submission keep their body verbatim; the typed
//! shape is only a view ([`Aspect::view`]) and is never what gets staged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const TAG_PROPERTIES: &str = "tagProperties";
pub const GLOSSARY_TERM_INFO: &str = "glossaryTermInfo";
pub const GLOSSARY_NODE_INFO: &str = "glossaryNodeInfo";
pub const DOMAIN_PROPERTIES: &str = "domainProperties";
pub const DATA_PRODUCT_PROPERTIES: &str = "dataProductProperties";
pub const STRUCTURED_PROPERTY_DEFINITION: &str = "propertyDefinition";
pub const OWNERSHIP: &str = "ownership";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagProperties {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_hex: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryTermInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub definition: String,
    /// `INTERNAL` or `EXTERNAL`.
    #[serde(default = "internal_term_source")]
    pub term_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_properties: BTreeMap<String, String>,
}

fn internal_term_source() -> String {
    "INTERNAL".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryNodeInfo {
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_node: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainProperties {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_domain: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataProductAsset {
    pub destination_urn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_urn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataProductProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<DataProductAsset>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedValue {
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredPropertyDefinition {
    pub qualified_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// e.g. `urn:li:dataType:datahub.string`
    pub value_type: String,
    /// e.g. `urn:li:entityType:datahub.dataset`
    #[serde(default)]
    pub entity_types: Vec<String>,
    /// `SINGLE` or `MULTIPLE`.
    #[serde(default = "single_cardinality")]
    pub cardinality: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<AllowedValue>,
    #[serde(default)]
    pub immutable: bool,
}

fn single_cardinality() -> String {
    "SINGLE".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    /// `urn:li:corpuser:...` or `urn:li:corpGroup:...`
    pub owner: String,
    #[serde(rename = "type", default = "technical_owner")]
    pub ownership_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_urn: Option<String>,
}

fn technical_owner() -> String {
    "TECHNICAL_OWNER".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ownership {
    pub owners: Vec<Owner>,
    /// Owning entity, when the admin layer records it inside the aspect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_entity: Option<String>,
}

/// One aspect body. Serialises as the bare body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AspectPayload {
    TagProperties(TagProperties),
    GlossaryTermInfo(GlossaryTermInfo),
    GlossaryNodeInfo(GlossaryNodeInfo),
    DomainProperties(DomainProperties),
    DataProductProperties(DataProductProperties),
    StructuredPropertyDefinition(StructuredPropertyDefinition),
    Ownership(Ownership),
    Other(serde_json::Value),
}

impl AspectPayload {
    /// Canonical aspect name for typed payloads.
    pub fn canonical_name(&self) -> Option<&'static str> {
        match self {
            AspectPayload::TagProperties(_) => Some(TAG_PROPERTIES),
            AspectPayload::GlossaryTermInfo(_) => Some(GLOSSARY_TERM_INFO),
            AspectPayload::GlossaryNodeInfo(_) => Some(GLOSSARY_NODE_INFO),
            AspectPayload::DomainProperties(_) => Some(DOMAIN_PROPERTIES),
            AspectPayload::DataProductProperties(_) => Some(DATA_PRODUCT_PROPERTIES),
            AspectPayload::StructuredPropertyDefinition(_) => Some(STRUCTURED_PROPERTY_DEFINITION),
            AspectPayload::Ownership(_) => Some(OWNERSHIP),
            AspectPayload::Other(_) => None,
        }
    }

    /// Interpret a raw body by its aspect name. Unknown names, and bodies
    /// that do not fit the typed shape, are kept verbatim.
    pub fn from_json(aspect_name: &str, value: serde_json::Value) -> Self {
        fn typed<T: serde::de::DeserializeOwned>(
            aspect_name: &str,
            value: serde_json::Value,
            wrap: fn(T) -> AspectPayload,
        ) -> AspectPayload {
            match serde_json::from_value::<T>(value.clone()) {
                Ok(v) => wrap(v),
                Err(err) => {
                    tracing::debug!(
                        aspect = aspect_name,
                        error = %err,
                        "aspect body does not match typed shape; keeping raw JSON"
                    );
                    AspectPayload::Other(value)
                }
            }
        }

        match aspect_name {
            TAG_PROPERTIES => typed(aspect_name, value, AspectPayload::TagProperties),
            GLOSSARY_TERM_INFO => typed(aspect_name, value, AspectPayload::GlossaryTermInfo),
            GLOSSARY_NODE_INFO => typed(aspect_name, value, AspectPayload::GlossaryNodeInfo),
            DOMAIN_PROPERTIES => typed(aspect_name, value, AspectPayload::DomainProperties),
            DATA_PRODUCT_PROPERTIES => {
                typed(aspect_name, value, AspectPayload::DataProductProperties)
            }
            STRUCTURED_PROPERTY_DEFINITION => {
                typed(aspect_name, value, AspectPayload::StructuredPropertyDefinition)
            }
            OWNERSHIP => typed(aspect_name, value, AspectPayload::Ownership),
            _ => AspectPayload::Other(value),
        }
    }
}

/// A named aspect as submitted for staging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawAspect")]
pub struct Aspect {
    pub aspect_name: String,
    #[serde(rename = "aspect")]
    pub payload: AspectPayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAspect {
    aspect_name: String,
    aspect: serde_json::Value,
}

impl From<RawAspect> for Aspect {
    fn from(raw: RawAspect) -> Self {
        Self {
            aspect_name: raw.aspect_name,
            payload: AspectPayload::Other(raw.aspect),
        }
    }
}

impl Aspect {
    pub fn new(aspect_name: impl Into<String>, payload: AspectPayload) -> Self {
        Self {
            aspect_name: aspect_name.into(),
            payload,
        }
    }

    /// Typed payloads under their canonical name; raw JSON needs [`Aspect::new`].
    pub fn typed(payload: AspectPayload) -> Option<Self> {
        let name = payload.canonical_name()?;
        Some(Self::new(name, payload))
    }

    /// Typed view of the body, interpreted by aspect name. Raw bodies that
    /// do not fit their typed shape come back as [`AspectPayload::Other`].
    pub fn view(&self) -> AspectPayload {
        match &self.payload {
            AspectPayload::Other(value) => {
                AspectPayload::from_json(&self.aspect_name, value.clone())
            }
            typed => typed.clone(),
        }
    }
}

impl From<TagProperties> for AspectPayload {
    fn from(v: TagProperties) -> Self {
        AspectPayload::TagProperties(v)
    }
}

impl From<GlossaryTermInfo> for AspectPayload {
    fn from(v: GlossaryTermInfo) -> Self {
        AspectPayload::GlossaryTermInfo(v)
    }
}

impl From<GlossaryNodeInfo> for AspectPayload {
    fn from(v: GlossaryNodeInfo) -> Self {
        AspectPayload::GlossaryNodeInfo(v)
    }
}

impl From<DomainProperties> for AspectPayload {
    fn from(v: DomainProperties) -> Self {
        AspectPayload::DomainProperties(v)
    }
}

impl From<DataProductProperties> for AspectPayload {
    fn from(v: DataProductProperties) -> Self {
        AspectPayload::DataProductProperties(v)
    }
}

impl From<StructuredPropertyDefinition> for AspectPayload {
    fn from(v: StructuredPropertyDefinition) -> Self {
        AspectPayload::StructuredPropertyDefinition(v)
    }
}

impl From<Ownership> for AspectPayload {
    fn from(v: Ownership) -> Self {
        AspectPayload::Ownership(v)
    }
}

impl From<serde_json::Value> for AspectPayload {
    fn from(v: serde_json::Value) -> Self {
        AspectPayload::Other(v)
    }
}
