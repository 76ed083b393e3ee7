//! Property tests for URN mutation and assembly.

use metastage_core::{assemble, mutate, EntityCategory, EntityReference, MutationConfig};
use proptest::prelude::*;

fn category_strategy() -> impl Strategy<Value = EntityCategory> {
    prop::sample::select(EntityCategory::ALL.to_vec())
}

fn env_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,12}"
}

fn urn_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z0-9_.]{1,24}".prop_map(|k| format!("urn:li:tag:{k}")),
        "[A-Za-z0-9_.]{1,24}".prop_map(|k| format!("urn:li:glossaryTerm:{k}")),
        ".{0,40}",
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn mutation_is_deterministic(
        urn in urn_strategy(),
        env in env_strategy(),
        category in category_strategy(),
    ) {
        let config = MutationConfig::with_categories(env.clone(), [category]);
        let a = mutate(&urn, &env, category, Some(&config));
        let b = mutate(&urn, &env, category, Some(&config));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn mutated_urns_have_fixed_shape(
        urn in urn_strategy(),
        env in env_strategy(),
        category in category_strategy(),
    ) {
        let config = MutationConfig::with_categories(env.clone(), [category]);
        let out = mutate(&urn, &env, category, Some(&config));
        let prefix = format!("urn:li:{}:", category.urn_token());
        prop_assert!(out.starts_with(&prefix));
        let suffix = &out[prefix.len()..];
        prop_assert_eq!(suffix.len(), 16);
        prop_assert!(suffix.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn disabled_categories_pass_through(
        urn in urn_strategy(),
        env in env_strategy(),
        category in category_strategy(),
    ) {
        let others = EntityCategory::ALL.into_iter().filter(|c| *c != category);
        let config = MutationConfig::with_categories(env.clone(), others);
        prop_assert_eq!(mutate(&urn, &env, category, Some(&config)), urn.clone());
        prop_assert_eq!(mutate(&urn, &env, category, None), urn);
    }

    #[test]
    fn aspects_share_one_urn(
        urn in urn_strategy(),
        env in env_strategy(),
        category in category_strategy(),
        enabled in any::<bool>(),
        names in prop::collection::vec("[a-z][A-Za-z]{2,12}", 2..6),
    ) {
        let config = if enabled {
            MutationConfig::with_categories(env.clone(), [category])
        } else {
            MutationConfig::disabled(env.clone())
        };
        let entity = EntityReference::new(category, urn);
        let aspects: Vec<(String, serde_json::Value)> = names
            .iter()
            .map(|n| (n.clone(), serde_json::json!({"name": n})))
            .collect();
        let proposals = assemble(&entity, aspects, &env, Some(&config)).unwrap();
        prop_assert_eq!(proposals.len(), names.len());
        let first = proposals[0].entity_urn.clone();
        prop_assert!(proposals.iter().all(|p| p.entity_urn == first));
        let order: Vec<&str> = proposals.iter().map(|p| p.aspect_name.as_str()).collect();
        let expected: Vec<&str> = names.iter().map(String::as_str).collect();
        prop_assert_eq!(order, expected);
    }
}
