//! Per-element validation rules.
//!
//! When an element ends, the analysis runs each enabled [`Validator`] over
//! it, in order, and stops at the first one that reports a problem. The
//! built-in rules run first, in the order of [`BuiltInValidator::ALL`];
//! custom rules follow in the order they were added.
//!
//! ```rust
//! use css_blocks::validators::ValidatorOptions;
//!
//! let options = ValidatorOptions::new()
//!     .with("no-class-pairs", false)
//!     .unwrap()
//!     .custom("no-empty-elements", |element, _context, reporter| {
//!         if element.is_empty() {
//!             reporter.report("Element has no block styles");
//!         }
//!     });
//! assert!(!options.is_enabled("no-class-pairs"));
//! assert_eq!(options.validators().len(), 4);
//! ```

mod class_pairs;
mod property_conflicts;
mod root_classes;
mod state_parents;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::{ElementAnalysis, Template};
use crate::block::{Block, BlockObject, ClassRef, StateRef};
use crate::error::{BlockError, Result, SourceLocation};

/// Signature shared by built-in and custom validators.
pub type ValidatorFn = Arc<dyn Fn(&ElementAnalysis, &AnalysisContext<'_>, &mut ErrorReporter) + Send + Sync>;

/// What a validator can see besides the element itself.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    template: &'a Template,
    blocks: &'a BTreeMap<String, Arc<Block>>,
}

impl<'a> AnalysisContext<'a> {
    pub(crate) fn new(template: &'a Template, blocks: &'a BTreeMap<String, Arc<Block>>) -> Self {
        Self { template, blocks }
    }

    pub fn template(&self) -> &Template {
        self.template
    }

    /// The analysis' blocks by alias.
    pub fn blocks(&self) -> &BTreeMap<String, Arc<Block>> {
        self.blocks
    }

    /// The alias `block`, or a block inheriting from it, is registered under.
    pub fn alias_for(&self, block: &Block) -> Option<&str> {
        self.blocks
            .iter()
            .find(|(_, aliased)| aliased.is_or_inherits_from(block))
            .map(|(alias, _)| alias.as_str())
    }
}

/// Collects the problems a validator finds.
#[derive(Debug, Default)]
pub struct ErrorReporter {
    errors: Vec<String>,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The first reported problem, located at the element.
    fn into_error(self, location: SourceLocation) -> BlockError {
        let message = self.errors.into_iter().next().unwrap_or_default();
        BlockError::template_analysis(message, location)
    }
}

/// The rules that ship with the analyzer, each toggled by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuiltInValidator {
    /// The root and another class of the same block on one element.
    NoRootClasses,
    /// Two classes of the same block applied statically to one element.
    NoClassPairs,
    /// A state applied without its class.
    NoStateOrphans,
    /// Unrelated blocks setting the same property without a `resolve()`.
    NoRequiredResolution,
}

impl BuiltInValidator {
    pub const ALL: [BuiltInValidator; 4] = [
        Self::NoRootClasses,
        Self::NoClassPairs,
        Self::NoStateOrphans,
        Self::NoRequiredResolution,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::NoRootClasses => "no-root-classes",
            Self::NoClassPairs => "no-class-pairs",
            Self::NoStateOrphans => "no-state-orphans",
            Self::NoRequiredResolution => "no-required-resolution",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.name() == name)
    }

    fn run(self, element: &ElementAnalysis, context: &AnalysisContext<'_>, reporter: &mut ErrorReporter) {
        match self {
            Self::NoRootClasses => root_classes::validate(element, context, reporter),
            Self::NoClassPairs => class_pairs::validate(element, context, reporter),
            Self::NoStateOrphans => state_parents::validate(element, context, reporter),
            Self::NoRequiredResolution => property_conflicts::validate(element, context, reporter),
        }
    }
}

impl fmt::Display for BuiltInValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone)]
pub enum Validator {
    BuiltIn(BuiltInValidator),
    Custom { name: String, func: ValidatorFn },
}

impl Validator {
    pub fn name(&self) -> &str {
        match self {
            Self::BuiltIn(builtin) => builtin.name(),
            Self::Custom { name, .. } => name,
        }
    }

    pub fn run(&self, element: &ElementAnalysis, context: &AnalysisContext<'_>, reporter: &mut ErrorReporter) {
        match self {
            Self::BuiltIn(builtin) => builtin.run(element, context, reporter),
            Self::Custom { func, .. } => func(element, context, reporter),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuiltIn(builtin) => write!(f, "BuiltIn({builtin})"),
            Self::Custom { name, .. } => write!(f, "Custom({name})"),
        }
    }
}

/// Which validators an analysis runs.
///
/// Every built-in is enabled by default. The boolean toggles can be loaded
/// from JSON such as `{"no-class-pairs": false}`; unknown names are
/// rejected.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, bool>", into = "BTreeMap<String, bool>")]
pub struct ValidatorOptions {
    disabled: Vec<BuiltInValidator>,
    custom: Vec<(String, ValidatorFn)>,
}

impl ValidatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads boolean toggles from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| BlockError::usage(format!("Invalid validator options: {err}")))
    }

    /// Enables or disables the built-in validator `name`.
    pub fn set(&mut self, name: &str, enabled: bool) -> Result<&mut Self> {
        let builtin = BuiltInValidator::from_name(name)
            .ok_or_else(|| BlockError::usage(format!("Unknown validator \"{name}\"")))?;
        self.disabled.retain(|v| *v != builtin);
        if !enabled {
            self.disabled.push(builtin);
        }
        Ok(self)
    }

    pub fn with(mut self, name: &str, enabled: bool) -> Result<Self> {
        self.set(name, enabled)?;
        Ok(self)
    }

    /// Adds a custom validator, run after the built-ins.
    pub fn custom<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(&ElementAnalysis, &AnalysisContext<'_>, &mut ErrorReporter) + Send + Sync + 'static,
    {
        self.custom.push((name.to_string(), Arc::new(func)));
        self
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        match BuiltInValidator::from_name(name) {
            Some(builtin) => !self.disabled.contains(&builtin),
            None => self.custom.iter().any(|(custom, _)| custom == name),
        }
    }

    /// The validators to run, in order.
    pub fn validators(&self) -> Vec<Validator> {
        BuiltInValidator::ALL
            .into_iter()
            .filter(|v| !self.disabled.contains(v))
            .map(Validator::BuiltIn)
            .chain(self.custom.iter().map(|(name, func)| Validator::Custom {
                name: name.clone(),
                func: Arc::clone(func),
            }))
            .collect()
    }
}

impl TryFrom<BTreeMap<String, bool>> for ValidatorOptions {
    type Error = BlockError;

    fn try_from(toggles: BTreeMap<String, bool>) -> Result<Self> {
        let mut options = Self::new();
        for (name, enabled) in toggles {
            options.set(&name, enabled)?;
        }
        Ok(options)
    }
}

impl From<ValidatorOptions> for BTreeMap<String, bool> {
    fn from(options: ValidatorOptions) -> Self {
        BuiltInValidator::ALL
            .into_iter()
            .map(|v| (v.name().to_string(), !options.disabled.contains(&v)))
            .collect()
    }
}

impl fmt::Debug for ValidatorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.validators()).finish()
    }
}

/// At most one state of a group may be applied statically per class.
///
/// A class and its same-named class in a base block are one scope, since
/// lookups through the derived class reach the states of both.
///
/// Not a toggle: an element violating it cannot be rendered.
pub(crate) fn check_state_groups(element: &ElementAnalysis, reporter: &mut ErrorReporter) {
    let grouped: Vec<(&BlockObject, &StateRef, &str)> = element
        .static_objects()
        .filter_map(|object| {
            let state = object.as_state()?;
            Some((object, state, state.group()?))
        })
        .collect();

    for (idx, &(previous, earlier, group)) in grouped.iter().enumerate() {
        for &(object, later, other_group) in &grouped[idx + 1..] {
            if other_group == group && same_scope(earlier.class(), later.class()) {
                reporter.report(format!(
                    "Cannot statically apply more than one state of group \"{group}\": \"{}\" and \"{}\"",
                    previous.qualified_name(),
                    object.qualified_name()
                ));
                return;
            }
        }
    }
}

fn same_scope(a: &ClassRef, b: &ClassRef) -> bool {
    a.name() == b.name() && a.block().is_related_to(b.block())
}

/// Runs `validators` over `element`, returning the first problem reported.
pub(crate) fn run_validators(
    validators: &[Validator],
    element: &ElementAnalysis,
    context: &AnalysisContext<'_>,
) -> Result<()> {
    let location = SourceLocation::new(context.template().identifier(), element.position());

    let mut reporter = ErrorReporter::new();
    check_state_groups(element, &mut reporter);
    if reporter.has_errors() {
        return Err(reporter.into_error(location));
    }

    for validator in validators {
        log::trace!("running validator {} at {}", validator.name(), location);
        validator.run(element, context, &mut reporter);
        if reporter.has_errors() {
            log::debug!("validator {} failed: {:?}", validator.name(), reporter.errors());
            return Err(reporter.into_error(location));
        }
    }
    Ok(())
}
