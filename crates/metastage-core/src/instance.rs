//! Platform-instance remapping for URNs that carry an instance segment.
//!
//! Recognised shapes:
//!
//! ```text
//! urn:li:dataPlatformInstance:(urn:li:dataPlatform:<platform>,<instance>)
//! urn:li:dataset:(urn:li:dataPlatform:<platform>,<instance>.<name>,<ENV>)
//! ```
//!
//! None of the staged categories (tags, glossary, structured properties,
//! domains, data products) carry an instance, so for their own URNs this is a
//! no-op. It matters for dataset references embedded in aspect payloads.

use std::collections::BTreeMap;

use crate::urn::{make_tuple_urn, Urn};

pub const DATA_PLATFORM_INSTANCE: &str = "dataPlatformInstance";
pub const DATASET: &str = "dataset";

/// Replace the instance segment of `urn` when it exactly matches a key of
/// `platform_instance_map`; anything else is returned unchanged.
pub fn remap_instance(urn: &str, platform_instance_map: &BTreeMap<String, String>) -> String {
    if platform_instance_map.is_empty() {
        return urn.to_string();
    }
    match try_remap(urn, platform_instance_map) {
        Some(remapped) => {
            tracing::trace!(from = %urn, to = %remapped, "remapped platform instance");
            remapped
        }
        None => urn.to_string(),
    }
}

/// True when `urn` is of a shape that can embed a platform instance.
pub fn carries_instance(urn: &str) -> bool {
    Urn::parse(urn)
        .map(|u| {
            matches!(u.entity_type, DATA_PLATFORM_INSTANCE | DATASET) && u.tuple_parts().is_some()
        })
        .unwrap_or(false)
}

fn try_remap(urn: &str, map: &BTreeMap<String, String>) -> Option<String> {
    let parsed = Urn::parse(urn)?;
    let parts = parsed.tuple_parts()?;
    match (parsed.entity_type, parts.as_slice()) {
        (DATA_PLATFORM_INSTANCE, [platform, instance]) => {
            let target = map.get(*instance)?;
            Some(make_tuple_urn(DATA_PLATFORM_INSTANCE, &[*platform, target.as_str()]))
        }
        (DATASET, [platform, name, env]) => {
            let (instance, rest) = name.split_once('.')?;
            let target = map.get(instance)?;
            let renamed = format!("{target}.{rest}");
            Some(make_tuple_urn(DATASET, &[*platform, renamed.as_str(), *env]))
        }
        _ => None,
    }
}
