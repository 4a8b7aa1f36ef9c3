use std::fmt;

/// A 1-based line/column location in a source file.
///
/// Line `0` never occurs in parsed input, so [`Position::UNKNOWN`] uses it as
/// the marker for "no location available".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const UNKNOWN: Position = Position { line: 0, column: 0 };

    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An attribute selector such as `[state|size=large]` or `[disabled]`.
///
/// Namespace, name and value are kept exactly as written (quotes around the
/// value are stripped) so consumers can validate them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeSelector {
    pub namespace: Option<String>,
    pub name: String,
    pub value: Option<String>,
}

impl AttributeSelector {
    pub fn new(namespace: Option<&str>, name: &str, value: Option<&str>) -> Self {
        Self {
            namespace: namespace.map(String::from),
            name: name.to_string(),
            value: value.map(String::from),
        }
    }

    pub fn in_namespace(&self, namespace: &str) -> bool {
        self.namespace.as_deref() == Some(namespace)
    }
}

impl fmt::Display for AttributeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        if let Some(ns) = &self.namespace {
            write!(f, "{ns}|")?;
        }
        f.write_str(&self.name)?;
        if let Some(value) = &self.value {
            write!(f, "={value}")?;
        }
        f.write_str("]")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    Type(String),
    Class(String),
    Id(String),
    Universal,
    PseudoClass(String),
    PseudoElement(String),
    Parent,
    Attribute(AttributeSelector),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Type(name) => f.write_str(name),
            Selector::Class(name) => write!(f, ".{name}"),
            Selector::Id(name) => write!(f, "#{name}"),
            Selector::Universal => f.write_str("*"),
            Selector::PseudoClass(name) => write!(f, ":{name}"),
            Selector::PseudoElement(name) => write!(f, "::{name}"),
            Selector::Parent => f.write_str("&"),
            Selector::Attribute(attr) => attr.fmt(f),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompoundSelector {
    pub selectors: Vec<Selector>,
}

impl CompoundSelector {
    pub fn new(selectors: Vec<Selector>) -> Self {
        Self { selectors }
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for selector in &self.selectors {
            selector.fmt(f)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    None,
    Descendant,
    Child,
    AdjacentSibling, // +
    GeneralSibling,  // ~
}

impl Combinator {
    fn as_str(self) -> &'static str {
        match self {
            Combinator::None => "",
            Combinator::Descendant => " ",
            Combinator::Child => " > ",
            Combinator::AdjacentSibling => " + ",
            Combinator::GeneralSibling => " ~ ",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorPart {
    pub compound: CompoundSelector,
    pub combinator: Combinator,
}

impl SelectorPart {
    pub fn new(compound: CompoundSelector, combinator: Combinator) -> Self {
        Self {
            compound,
            combinator,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexSelector {
    pub parts: Vec<SelectorPart>,
}

impl ComplexSelector {
    pub fn new(parts: Vec<SelectorPart>) -> Self {
        Self { parts }
    }

    /// The rightmost compound selector, i.e. the one the rule styles.
    pub fn key(&self) -> Option<&CompoundSelector> {
        self.parts.last().map(|p| &p.compound)
    }
}

impl fmt::Display for ComplexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            part.compound.fmt(f)?;
            f.write_str(part.combinator.as_str())?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    pub fn new(selectors: Vec<ComplexSelector>) -> Self {
        Self { selectors }
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            selector.fmt(f)?;
        }
        Ok(())
    }
}

/// A `property: value` pair. The value is kept as raw text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
    pub position: Position,
}

impl Declaration {
    pub fn new(property: &str, value: &str, position: Position) -> Self {
        Self {
            property: property.to_string(),
            value: value.to_string(),
            important: false,
            position,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleItem {
    Declaration(Declaration),
    NestedRule(Rule),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub selectors: SelectorList,
    pub items: Vec<RuleItem>,
    pub position: Position,
}

impl Rule {
    pub fn new(selectors: SelectorList, items: Vec<RuleItem>, position: Position) -> Self {
        Self {
            selectors,
            items,
            position,
        }
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.items.iter().filter_map(|item| match item {
            RuleItem::Declaration(decl) => Some(decl),
            RuleItem::NestedRule(_) => None,
        })
    }
}

/// A statement at-rule such as `@block-reference foo from "./foo.css";`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtRule {
    pub name: String,
    pub prelude: String,
    pub position: Position,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleSheet {
    pub at_rules: Vec<AtRule>,
    pub rules: Vec<Rule>,
}
