//! Change-proposal assembly for one entity.
//!
//! The entity URN is resolved once and stamped onto every proposal, and
//! aspect bodies that mention the entity's original URN are rewritten to the
//! resolved one. All aspects are serialised before anything is returned, so
//! a failing aspect never yields a partial entity.
//!
//! Only the entity's own URN is rewritten. References to other mutated
//! entities (a term's `parentNode`, a node's parent) keep their original
//! URNs; callers that mutate both sides must rewrite those themselves.
//! Platform-instance remapping is the one cross-entity rewrite applied.

use serde::Serialize;
use serde_json::Value;

use crate::config::MutationConfig;
use crate::error::{StagingError, StagingResult};
use crate::instance::{carries_instance, remap_instance};
use crate::mutation::{resolve_urn, MutationOutcome};
use crate::proposal::{ChangeProposal, EntityReference};

/// Final URN for `entity` in `environment_name`: hash mutation first, then
/// platform-instance remapping.
pub fn resolve_entity_urn(
    entity: &EntityReference,
    environment_name: &str,
    config: Option<&MutationConfig>,
) -> String {
    let (urn, outcome) =
        resolve_urn(&entity.original_urn, environment_name, entity.category, config);
    if outcome != MutationOutcome::Mutated {
        tracing::debug!(
            environment = environment_name,
            category = %entity.category,
            entity_urn = %entity.original_urn,
            reason = ?outcome,
            "urn passes through unmutated"
        );
    }
    match config {
        Some(config) => remap_instance(&urn, &config.platform_instance_map),
        None => urn,
    }
}

/// Build one `UPSERT` proposal per aspect, in input order, all sharing the
/// entity's resolved URN. No aspects means no proposals.
pub fn assemble<I, N, P>(
    entity: &EntityReference,
    aspects: I,
    environment_name: &str,
    config: Option<&MutationConfig>,
) -> StagingResult<Vec<ChangeProposal>>
where
    I: IntoIterator<Item = (N, P)>,
    N: AsRef<str>,
    P: Serialize,
{
    let entity_urn = resolve_entity_urn(entity, environment_name, config);
    let rewriter = EmbeddedUrnRewriter {
        original_urn: &entity.original_urn,
        entity_urn: &entity_urn,
        config,
    };

    let mut proposals = Vec::new();
    for (aspect_name, payload) in aspects {
        let aspect_name = aspect_name.as_ref();
        let mut body =
            serde_json::to_value(&payload).map_err(|source| StagingError::Serialization {
                entity_urn: entity.original_urn.clone(),
                aspect_name: aspect_name.to_string(),
                source,
            })?;
        rewriter.rewrite(&mut body);
        proposals.push(ChangeProposal::upsert(
            entity.category,
            entity_urn.clone(),
            aspect_name,
            body,
        ));
    }

    tracing::debug!(
        environment = environment_name,
        category = %entity.category,
        entity_urn = %entity_urn,
        proposals = proposals.len(),
        "assembled entity"
    );
    Ok(proposals)
}

/// `DELETE` proposals for the named aspects, under the same resolved URN
/// [`assemble`] would use.
pub fn assemble_removal<I, N>(
    entity: &EntityReference,
    aspect_names: I,
    environment_name: &str,
    config: Option<&MutationConfig>,
) -> Vec<ChangeProposal>
where
    I: IntoIterator<Item = N>,
    N: AsRef<str>,
{
    let entity_urn = resolve_entity_urn(entity, environment_name, config);
    aspect_names
        .into_iter()
        .map(|name| ChangeProposal::delete(entity.category, entity_urn.clone(), name.as_ref()))
        .collect()
}

struct EmbeddedUrnRewriter<'a> {
    original_urn: &'a str,
    entity_urn: &'a str,
    config: Option<&'a MutationConfig>,
}

impl EmbeddedUrnRewriter<'_> {
    fn rewrite(&self, value: &mut Value) {
        match value {
            Value::String(s) => {
                if let Some(replacement) = self.replacement_for(s) {
                    *s = replacement;
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|v| self.rewrite(v)),
            Value::Object(map) => map.values_mut().for_each(|v| self.rewrite(v)),
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    fn replacement_for(&self, s: &str) -> Option<String> {
        if !self.original_urn.is_empty() && s == self.original_urn && s != self.entity_urn {
            return Some(self.entity_urn.to_string());
        }
        let config = self.config?;
        if config.platform_instance_map.is_empty() || !carries_instance(s) {
            return None;
        }
        let remapped = remap_instance(s, &config.platform_instance_map);
        (remapped != s).then_some(remapped)
    }
}
