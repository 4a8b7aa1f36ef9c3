//! Serialized Analysis Tests

use std::collections::BTreeMap;
use std::sync::Arc;

use css_blocks::{
    Block, BlockFactory, BlockObject, ErrorKind, MemoryImporter, ParserOptions, Position,
    SerializedTemplateAnalysis, Template, TemplateAnalysis, ValidatorOptions,
};
use serde_json::json;

const CSS: &str = r#"
    .root { color: blue; }
    [state|foo] { color: red; }
    [state|size=large] { width: 10px; }
    [state|size=small] { width: 5px; }
    .asdf { font-size: 20px; }
    .asdf[state|larger] { font-size: 26px; }
"#;

async fn analyzed() -> (Arc<Block>, TemplateAnalysis) {
    let factory = BlockFactory::new(ParserOptions::default(), MemoryImporter::new());
    let block = factory
        .parse_source(CSS, "blocks/foo.block.css", "foo")
        .await
        .unwrap();

    let mut analysis = TemplateAnalysis::new(
        Template::new("templates/my-template.hbs"),
        &ValidatorOptions::new(),
    );
    analysis.add_block("", Arc::clone(&block));

    let asdf = block.get_class("asdf").unwrap();
    let mut element = analysis.start_element(Position::new(1, 2)).unwrap();
    element.add_dynamic_class(asdf.get_state("larger").unwrap(), Some("isLarge"));
    element.add_static_class(asdf);
    analysis.end_element(element).unwrap();

    let mut element = analysis.start_element(Position::UNKNOWN).unwrap();
    element.add_static_class(block.root());
    element.add_dynamic_class(block.get_state("foo").unwrap(), None);
    element.add_exclusive_class("size", block.get_group_state("size", "small").unwrap());
    element.add_exclusive_class("size", block.get_group_state("size", "large").unwrap());
    analysis.end_element(element).unwrap();

    analysis.end_analysis().unwrap();
    (block, analysis)
}

#[tokio::test]
async fn test_serialized_shape() {
    let (_, analysis) = analyzed().await;
    let value = serde_json::to_value(analysis.serialize()).unwrap();
    assert_eq!(
        value,
        json!({
            "template": "templates/my-template.hbs",
            "blocks": { "": "blocks/foo.block.css" },
            "elements": [
                {
                    "position": { "line": 1, "column": 2 },
                    "static": ["blocks/foo.block.css:.asdf"],
                    "dynamic": [
                        { "id": "blocks/foo.block.css:.asdf[state|larger]", "condition": "isLarge" }
                    ],
                    "exclusive": []
                },
                {
                    "position": null,
                    "static": ["blocks/foo.block.css:.root"],
                    "dynamic": [
                        { "id": "blocks/foo.block.css:[state|foo]", "condition": null }
                    ],
                    "exclusive": [
                        { "group": "size", "id": "blocks/foo.block.css:[state|size=large]" },
                        { "group": "size", "id": "blocks/foo.block.css:[state|size=small]" }
                    ]
                }
            ]
        })
    );
}

#[tokio::test]
async fn test_round_trip() {
    let (block, analysis) = analyzed().await;
    let json = analysis.serialize().to_json().unwrap();

    let serialized = SerializedTemplateAnalysis::from_json(&json).unwrap();
    let restored = TemplateAnalysis::deserialize(&serialized, analysis.blocks()).unwrap();

    assert_eq!(restored.serialize(), analysis.serialize());
    assert_eq!(restored.element_count(), 2);
    assert_eq!(restored.template().identifier(), "templates/my-template.hbs");

    let first = &restored.elements()[0];
    assert_eq!(first.position(), Position::new(1, 2));
    let asdf = block.get_class("asdf").unwrap();
    let asdf_object: BlockObject = asdf.clone().into();
    assert_eq!(first.static_objects().next().unwrap(), &asdf_object);
    let (larger, condition) = first.dynamic_objects().next().unwrap();
    assert_eq!(larger.id(), asdf.get_state("larger").unwrap().id());
    assert_eq!(condition, Some("isLarge"));

    let second = &restored.elements()[1];
    assert_eq!(second.position(), Position::UNKNOWN);
    assert_eq!(second.exclusive_groups()["size"].len(), 2);
}

#[tokio::test]
async fn test_deserialize_requires_matching_blocks() {
    let (_, analysis) = analyzed().await;
    let serialized = analysis.serialize();

    let err = TemplateAnalysis::deserialize(&serialized, &BTreeMap::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert_eq!(
        err.message(),
        "No block \"blocks/foo.block.css\" is provided for alias \"\""
    );

    let mut tampered = serialized.clone();
    tampered.elements[0].static_ids[0] = "blocks/foo.block.css:.missing".to_string();
    let err = TemplateAnalysis::deserialize(&tampered, analysis.blocks()).unwrap_err();
    assert_eq!(
        err.message(),
        "Unknown block object \"blocks/foo.block.css:.missing\""
    );
}

#[test]
fn test_malformed_json() {
    let err = SerializedTemplateAnalysis::from_json("{\"template\": 3}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(err.message().starts_with("Malformed serialized analysis"));
}
