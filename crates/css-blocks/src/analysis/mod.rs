//! Per-template analysis.
//!
//! A template adapter drives a [`TemplateAnalysis`] while it walks a
//! template:
//!
//! ```text
//! start_element(position)            Idle -> ElementOpen
//!   add_static_class / add_dynamic_class / add_exclusive_class
//! end_element(element)               ElementOpen -> Idle  (validators run)
//! ...
//! end_analysis()                     Idle -> Closed
//! ```
//!
//! Any other order is a usage error. An element rejected by a validator is
//! dropped and the analysis stays usable.

mod element;
mod serialize;

pub use element::ElementAnalysis;
pub use serialize::{
    SerializedDynamic, SerializedElement, SerializedExclusive, SerializedPosition,
    SerializedTemplateAnalysis,
};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use block_syntax::Position;

use crate::block::{Block, BlockId};
use crate::error::{BlockError, Result, SourceLocation};
use crate::validators::{self, AnalysisContext, Validator, ValidatorOptions};

/// The template being analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    identifier: String,
}

impl Template {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }

    /// Usually the template's path; used as the file in error locations.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Idle,
    ElementOpen,
    Closed,
}

pub struct TemplateAnalysis {
    template: Template,
    blocks: BTreeMap<String, Arc<Block>>,
    elements: Vec<ElementAnalysis>,
    validators: Vec<Validator>,
    state: AnalysisState,
    open_element: Option<(usize, Position)>,
}

impl TemplateAnalysis {
    pub fn new(template: Template, options: &ValidatorOptions) -> Self {
        Self {
            template,
            blocks: BTreeMap::new(),
            elements: Vec::new(),
            validators: options.validators(),
            state: AnalysisState::Idle,
            open_element: None,
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn state(&self) -> AnalysisState {
        self.state
    }

    /// Makes `block` available to the template under `alias`. The empty
    /// alias is the template's default block.
    pub fn add_block(&mut self, alias: impl Into<String>, block: Arc<Block>) {
        let alias = alias.into();
        log::debug!(
            "{}: block {} registered as {alias:?}",
            self.template.identifier,
            block.name()
        );
        self.blocks.insert(alias, block);
    }

    pub fn blocks(&self) -> &BTreeMap<String, Arc<Block>> {
        &self.blocks
    }

    /// Completed elements, in the order they ended.
    pub fn elements(&self) -> &[ElementAnalysis] {
        &self.elements
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Every block an element of this template has an object from, ordered
    /// by id.
    pub fn referenced_blocks(&self) -> Vec<Arc<Block>> {
        let mut blocks: BTreeMap<BlockId, Arc<Block>> = BTreeMap::new();
        for element in &self.elements {
            for object in element.all_objects() {
                blocks
                    .entry(object.block().id())
                    .or_insert_with(|| Arc::clone(object.block()));
            }
        }
        blocks.into_values().collect()
    }

    fn location(&self, position: Position) -> SourceLocation {
        SourceLocation::new(self.template.identifier.clone(), position)
    }

    /// Opens a new element at `position` (or [`Position::UNKNOWN`]).
    pub fn start_element(&mut self, position: Position) -> Result<ElementAnalysis> {
        match self.state {
            AnalysisState::Idle => {}
            AnalysisState::ElementOpen => {
                let open = self.open_element.map(|(_, p)| p).unwrap_or(Position::UNKNOWN);
                return Err(BlockError::usage_at(
                    "Cannot start an element while another element is open",
                    self.location(open),
                ));
            }
            AnalysisState::Closed => {
                return Err(BlockError::usage_at(
                    "Cannot start an element after the analysis has ended",
                    self.location(position),
                ));
            }
        }
        let element = ElementAnalysis::new(position);
        log::trace!("{}: element started at {position}", self.template.identifier);
        self.open_element = Some((element.id(), position));
        self.state = AnalysisState::ElementOpen;
        Ok(element)
    }

    /// Validates the open element and records it.
    ///
    /// Every attached object must come from a block registered with
    /// [`TemplateAnalysis::add_block`] (or a block it inherits from). On
    /// error the element is discarded.
    pub fn end_element(&mut self, element: ElementAnalysis) -> Result<()> {
        let location = self.location(element.position());
        match (self.state, self.open_element) {
            (AnalysisState::ElementOpen, Some((id, _))) if id == element.id() => {}
            (AnalysisState::ElementOpen, _) => {
                return Err(BlockError::usage_at(
                    "Cannot end an element that is not the open element",
                    location,
                ));
            }
            _ => {
                return Err(BlockError::usage_at(
                    "Cannot end an element that was never started",
                    location,
                ));
            }
        }
        self.state = AnalysisState::Idle;
        self.open_element = None;

        let context = AnalysisContext::new(&self.template, &self.blocks);
        for object in element.all_objects() {
            if context.alias_for(object.block()).is_none() {
                return Err(BlockError::usage_at(
                    format!(
                        "Cannot attach \"{object}\": block \"{}\" is not registered with this analysis",
                        object.block().name()
                    ),
                    location,
                ));
            }
        }
        validators::run_validators(&self.validators, &element, &context)?;

        log::debug!("{}: element at {} ended", self.template.identifier, element.position());
        self.elements.push(element);
        Ok(())
    }

    /// Finishes the analysis; no more elements may be started.
    pub fn end_analysis(&mut self) -> Result<()> {
        match self.state {
            AnalysisState::ElementOpen => Err(BlockError::usage_at(
                "Cannot end the analysis while an element is open",
                self.location(self.open_element.map(|(_, p)| p).unwrap_or(Position::UNKNOWN)),
            )),
            AnalysisState::Idle | AnalysisState::Closed => {
                self.state = AnalysisState::Closed;
                log::debug!(
                    "{}: analysis ended with {} elements",
                    self.template.identifier,
                    self.elements.len()
                );
                Ok(())
            }
        }
    }
}

impl fmt::Debug for TemplateAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateAnalysis")
            .field("template", &self.template.identifier)
            .field("blocks", &self.blocks.keys().collect::<Vec<_>>())
            .field("elements", &self.elements.len())
            .field("validators", &self.validators)
            .field("state", &self.state)
            .finish()
    }
}
