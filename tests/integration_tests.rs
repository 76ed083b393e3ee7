//! End-to-end staging runs across environments.
//!
//! These tests drive the full path the admin layer uses:
//! - mutation config file → config snapshot
//! - entity submissions (as JSON) → assembled proposals
//! - staged batch files → read back
//!
//! Run with: cargo test --test integration_tests

use metastage_core::{
    EntityCategory, EntitySubmission, JsonFileConfigSource, StagingArea, StagingRun,
};
use tempfile::tempdir;

const MUTATIONS: &str = r#"{
  "environments": [
    {
      "environment_name": "dev",
      "mutate_tags": true,
      "mutate_glossary_terms": true,
      "mutate_glossary_nodes": true,
      "platform_instance_map": {"prod_snowflake": "dev_snowflake"}
    },
    {
      "environment_name": "staging",
      "enabled_categories": ["tag"]
    },
    {
      "environment_name": "prod",
      "enabled_categories": []
    }
  ]
}"#;

const SUBMISSIONS: &str = r#"[
  {
    "entity": {"category": "tag", "originalUrn": "urn:li:tag:PII"},
    "aspects": [
      {"aspectName": "tagProperties", "aspect": {"name": "PII", "description": "Personal data"}},
      {"aspectName": "ownership", "aspect": {
        "owners": [{"owner": "urn:li:corpuser:datahub", "type": "DATAOWNER"}],
        "ownedEntity": "urn:li:tag:PII"
      }}
    ]
  },
  {
    "entity": {"category": "glossaryNode", "originalUrn": "urn:li:glossaryNode:Finance"},
    "aspects": [
      {"aspectName": "glossaryNodeInfo", "aspect": {"name": "Finance", "definition": "Finance terms"}}
    ]
  },
  {
    "entity": {"category": "glossaryTerm", "originalUrn": "urn:li:glossaryTerm:Revenue"},
    "aspects": [
      {"aspectName": "glossaryTermInfo", "aspect": {
        "name": "Revenue",
        "definition": "Recognised revenue",
        "parentNode": "urn:li:glossaryNode:Finance"
      }}
    ]
  },
  {
    "entity": {"category": "dataProduct", "originalUrn": "urn:li:dataProduct:orders"},
    "aspects": [
      {"aspectName": "dataProductProperties", "aspect": {
        "name": "Orders",
        "assets": [{"destinationUrn": "urn:li:dataset:(urn:li:dataPlatform:snowflake,prod_snowflake.sales.orders,PROD)"}]
      }}
    ],
    "removedAspects": ["domains"]
  }
]"#;

fn setup() -> (tempfile::TempDir, JsonFileConfigSource, Vec<EntitySubmission>) {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("mutations.json");
    std::fs::write(&config_path, MUTATIONS).unwrap();
    let submissions: Vec<EntitySubmission> = serde_json::from_str(SUBMISSIONS).unwrap();
    (dir, JsonFileConfigSource::new(config_path), submissions)
}

#[test]
fn test_each_environment_gets_its_own_tag_urn() {
    let (dir, source, submissions) = setup();
    let area = StagingArea::at(dir.path().join("metadata-manager"));

    for env in ["dev", "staging", "prod"] {
        StagingRun::begin(&source, env, area.clone())
            .unwrap()
            .stage(&submissions)
            .unwrap();
    }

    let urn_in = |env: &str| {
        area.read_batch(env, EntityCategory::Tag).unwrap().unwrap()[0]
            .entity_urn
            .clone()
    };
    assert_eq!(urn_in("dev"), "urn:li:tag:4b7df797f1e116cd");
    assert_eq!(urn_in("staging"), "urn:li:tag:17444c13a108cc40");
    // prod has a config but no enabled categories.
    assert_eq!(urn_in("prod"), "urn:li:tag:PII");
}

#[test]
fn test_tag_aspects_and_self_reference_share_one_urn() {
    let (dir, source, submissions) = setup();
    let area = StagingArea::at(dir.path());
    StagingRun::begin(&source, "dev", area.clone())
        .unwrap()
        .stage(&submissions)
        .unwrap();

    let tags = area.read_batch("dev", EntityCategory::Tag).unwrap().unwrap();
    assert_eq!(tags.len(), 2);
    assert!(tags.iter().all(|p| p.entity_urn == "urn:li:tag:4b7df797f1e116cd"));
    let ownership = tags.iter().find(|p| p.aspect_name == "ownership").unwrap();
    assert_eq!(
        ownership.aspect.as_ref().unwrap()["ownedEntity"],
        "urn:li:tag:4b7df797f1e116cd"
    );
}

#[test]
fn test_glossary_batch_holds_nodes_then_terms() {
    let (dir, source, submissions) = setup();
    let area = StagingArea::at(dir.path());
    let report = StagingRun::begin(&source, "dev", area.clone())
        .unwrap()
        .stage(&submissions)
        .unwrap();

    let glossary_files: Vec<_> = report
        .batches
        .iter()
        .filter(|b| b.staging_dir == "glossary")
        .collect();
    assert_eq!(glossary_files.len(), 1);

    let glossary = area
        .read_batch("dev", EntityCategory::GlossaryNode)
        .unwrap()
        .unwrap();
    let types: Vec<&str> = glossary.iter().map(|p| p.entity_type.as_str()).collect();
    assert_eq!(types, vec!["glossaryNode", "glossaryTerm"]);
    assert!(glossary[0].entity_urn.starts_with("urn:li:glossaryNode:"));
    assert_ne!(glossary[0].entity_urn, "urn:li:glossaryNode:Finance");
    // Cross-entity references are not rewritten, only self-references.
    assert_eq!(
        glossary[1].aspect.as_ref().unwrap()["parentNode"],
        "urn:li:glossaryNode:Finance"
    );
}

#[test]
fn test_data_products_pass_through_but_remap_instances() {
    let (dir, source, submissions) = setup();
    let area = StagingArea::at(dir.path());
    StagingRun::begin(&source, "dev", area.clone())
        .unwrap()
        .stage(&submissions)
        .unwrap();

    let products = area
        .read_batch("dev", EntityCategory::DataProduct)
        .unwrap()
        .unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].entity_urn, "urn:li:dataProduct:orders");
    assert_eq!(
        products[0].aspect.as_ref().unwrap()["assets"][0]["destinationUrn"],
        "urn:li:dataset:(urn:li:dataPlatform:snowflake,dev_snowflake.sales.orders,PROD)"
    );
    assert_eq!(products[1].aspect_name, "domains");
    assert!(products[1].aspect.is_none());
}

#[test]
fn test_restaging_is_idempotent_on_disk() {
    let (dir, source, submissions) = setup();
    let area = StagingArea::at(dir.path());

    let first = StagingRun::begin(&source, "staging", area.clone())
        .unwrap()
        .stage(&submissions)
        .unwrap();
    let snapshot: Vec<Vec<u8>> = first.paths().map(|p| std::fs::read(p).unwrap()).collect();

    let second = StagingRun::begin(&source, "staging", area.clone())
        .unwrap()
        .stage(&submissions)
        .unwrap();
    let again: Vec<Vec<u8>> = second.paths().map(|p| std::fs::read(p).unwrap()).collect();

    assert_eq!(snapshot, again);
}
