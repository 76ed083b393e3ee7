//! Entity taxonomy: the closed set of metadata categories the stager handles.
//!
//! Every place that needs the URN type token, the staging directory, or the
//! admin-side mutation flag of a category goes through [`EntityCategory`]
//! instead of carrying its own string table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StagingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityCategory {
    #[serde(rename = "tag")]
    Tag,
    #[serde(rename = "glossaryTerm")]
    GlossaryTerm,
    #[serde(rename = "glossaryNode")]
    GlossaryNode,
    #[serde(rename = "structuredProperty")]
    StructuredProperty,
    #[serde(rename = "domain")]
    Domain,
    #[serde(rename = "dataProduct")]
    DataProduct,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 6] = [
        EntityCategory::Tag,
        EntityCategory::GlossaryTerm,
        EntityCategory::GlossaryNode,
        EntityCategory::StructuredProperty,
        EntityCategory::Domain,
        EntityCategory::DataProduct,
    ];

    /// The `<type>` segment of `urn:li:<type>:<key>`.
    pub fn urn_token(self) -> &'static str {
        match self {
            EntityCategory::Tag => "tag",
            EntityCategory::GlossaryTerm => "glossaryTerm",
            EntityCategory::GlossaryNode => "glossaryNode",
            EntityCategory::StructuredProperty => "structuredProperty",
            EntityCategory::Domain => "domain",
            EntityCategory::DataProduct => "dataProduct",
        }
    }

    /// Directory under `<root>/<environment>/` holding this category's batch.
    ///
    /// Glossary terms and nodes share `glossary`.
    pub fn staging_dir(self) -> &'static str {
        match self {
            EntityCategory::Tag => "tags",
            EntityCategory::GlossaryTerm | EntityCategory::GlossaryNode => "glossary",
            EntityCategory::StructuredProperty => "structured_properties",
            EntityCategory::Domain => "domains",
            EntityCategory::DataProduct => "data_products",
        }
    }

    /// Name of the boolean flag the admin UI stores for this category.
    pub fn mutation_flag(self) -> &'static str {
        match self {
            EntityCategory::Tag => "mutate_tags",
            EntityCategory::GlossaryTerm => "mutate_glossary_terms",
            EntityCategory::GlossaryNode => "mutate_glossary_nodes",
            EntityCategory::StructuredProperty => "mutate_structured_properties",
            EntityCategory::Domain => "mutate_domains",
            EntityCategory::DataProduct => "mutate_data_products",
        }
    }

    /// Position inside a shared batch: parents are staged before children
    /// (glossary nodes before the terms that reference them).
    pub fn staging_rank(self) -> u8 {
        match self {
            EntityCategory::GlossaryNode => 0,
            EntityCategory::GlossaryTerm => 1,
            EntityCategory::Tag => 2,
            EntityCategory::StructuredProperty => 3,
            EntityCategory::Domain => 4,
            EntityCategory::DataProduct => 5,
        }
    }

    pub fn from_mutation_flag(flag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.mutation_flag() == flag)
    }

    /// Every category whose batch lives in `dir`, in staging order.
    pub fn for_staging_dir(dir: &str) -> Vec<Self> {
        let mut out: Vec<Self> = Self::ALL
            .into_iter()
            .filter(|c| c.staging_dir() == dir)
            .collect();
        out.sort_by_key(|c| c.staging_rank());
        out
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.urn_token())
    }
}

impl FromStr for EntityCategory {
    type Err = StagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.urn_token() == s)
            .ok_or_else(|| StagingError::UnknownCategory(s.to_string()))
    }
}
