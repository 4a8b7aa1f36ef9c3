//! The JSON form of a finished analysis.
//!
//! ```json
//! {
//!   "template": "templates/my-template.hbs",
//!   "blocks": { "": "blocks/foo.block.css" },
//!   "elements": [
//!     {
//!       "position": { "line": 1, "column": 2 },
//!       "static": ["blocks/foo.block.css:.asdf"],
//!       "dynamic": [{ "id": "blocks/foo.block.css:.asdf[state|larger]", "condition": "isBig" }],
//!       "exclusive": []
//!     }
//!   ]
//! }
//! ```
//!
//! Object ids are the block identifier and the object's selector joined by
//! `:`. Selectors never contain `:`, so ids split on the last one.

use std::collections::BTreeMap;
use std::sync::Arc;

use block_syntax::Position;
use serde::{Deserialize, Serialize};

use super::{ElementAnalysis, Template, TemplateAnalysis};
use crate::block::{Block, BlockObject};
use crate::error::{BlockError, Result};
use crate::validators::ValidatorOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedTemplateAnalysis {
    pub template: String,
    /// Block identifier by alias.
    pub blocks: BTreeMap<String, String>,
    pub elements: Vec<SerializedElement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedPosition {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedElement {
    pub position: Option<SerializedPosition>,
    #[serde(rename = "static")]
    pub static_ids: Vec<String>,
    pub dynamic: Vec<SerializedDynamic>,
    pub exclusive: Vec<SerializedExclusive>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedDynamic {
    pub id: String,
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedExclusive {
    pub group: String,
    pub id: String,
}

impl SerializedTemplateAnalysis {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| BlockError::usage(format!("Cannot serialize analysis: {err}")))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| BlockError::usage(format!("Malformed serialized analysis: {err}")))
    }
}

fn object_id(object: &BlockObject) -> String {
    format!("{}:{}", object.block().identifier(), object.as_source())
}

impl SerializedPosition {
    /// `None` for [`Position::UNKNOWN`].
    fn from_position(position: Position) -> Option<Self> {
        position.is_known().then_some(Self {
            line: position.line,
            column: position.column,
        })
    }
}

impl SerializedElement {
    fn from_element(element: &ElementAnalysis) -> Self {
        Self {
            position: SerializedPosition::from_position(element.position()),
            static_ids: element.static_objects().map(object_id).collect(),
            dynamic: element
                .dynamic_objects()
                .map(|(object, condition)| SerializedDynamic {
                    id: object_id(object),
                    condition: condition.map(String::from),
                })
                .collect(),
            exclusive: element
                .exclusive_groups()
                .iter()
                .flat_map(|(group, objects)| {
                    objects.iter().map(move |object| SerializedExclusive {
                        group: group.clone(),
                        id: object_id(object),
                    })
                })
                .collect(),
        }
    }
}

impl TemplateAnalysis {
    pub fn serialize(&self) -> SerializedTemplateAnalysis {
        SerializedTemplateAnalysis {
            template: self.template.identifier().to_string(),
            blocks: self
                .blocks
                .iter()
                .map(|(alias, block)| (alias.clone(), block.identifier().to_string()))
                .collect(),
            elements: self
                .elements
                .iter()
                .map(SerializedElement::from_element)
                .collect(),
        }
    }

    /// Rebuilds a closed analysis from its serialized form. `blocks` must
    /// bind every alias of `serialized` to the block it was analyzed with.
    ///
    /// Validators are not run again.
    pub fn deserialize(
        serialized: &SerializedTemplateAnalysis,
        blocks: &BTreeMap<String, Arc<Block>>,
    ) -> Result<Self> {
        let mut analysis = Self::new(
            Template::new(serialized.template.clone()),
            &ValidatorOptions::new(),
        );
        for (alias, identifier) in &serialized.blocks {
            let block = blocks
                .get(alias)
                .filter(|block| block.identifier() == identifier.as_str())
                .ok_or_else(|| {
                    BlockError::usage(format!(
                        "No block \"{identifier}\" is provided for alias \"{alias}\""
                    ))
                })?;
            analysis.blocks.insert(alias.clone(), Arc::clone(block));
        }

        for serialized_element in &serialized.elements {
            let position = serialized_element
                .position
                .map(|p| Position::new(p.line, p.column))
                .unwrap_or(Position::UNKNOWN);
            let mut element = ElementAnalysis::new(position);
            for id in &serialized_element.static_ids {
                element.add_static_class(analysis.find_object(id)?);
            }
            for dynamic in &serialized_element.dynamic {
                element.add_dynamic_class(
                    analysis.find_object(&dynamic.id)?,
                    dynamic.condition.as_deref(),
                );
            }
            for exclusive in &serialized_element.exclusive {
                element.add_exclusive_class(&exclusive.group, analysis.find_object(&exclusive.id)?);
            }
            analysis.elements.push(element);
        }
        analysis.state = super::AnalysisState::Closed;
        Ok(analysis)
    }

    /// Resolves a serialized object id against the blocks of this analysis
    /// and their bases.
    fn find_object(&self, id: &str) -> Result<BlockObject> {
        let unknown = || BlockError::usage(format!("Unknown block object \"{id}\""));
        let (identifier, selector) = id.rsplit_once(':').ok_or_else(unknown)?;
        self.blocks
            .values()
            .flat_map(|block| block.lineage())
            .find(|block| block.identifier() == identifier)
            .and_then(|block| block.find_object(selector))
            .ok_or_else(unknown)
    }
}
