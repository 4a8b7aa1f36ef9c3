//! Block stylesheet parsing and syntax tree types.
//!
//! - [`parse_stylesheet`]: main entry point, returns a [`StyleSheet`]
//! - [`Rule`]: a selector list with declarations (and, before flattening, nested rules)
//! - [`AtRule`]: a statement at-rule such as `@block-reference`
//! - [`Declaration`]: a `property: value` pair kept as raw text
//! - Selector types: [`Selector`], [`CompoundSelector`], [`ComplexSelector`]
//!
//! ## Submodules
//!
//! - [`selectors`]: selector parsing (class, attribute, pseudo, combinators)
//! - [`stylesheet`]: syntax tree data structures
//! - [`values`]: identifier, value and comment helpers
//! - [`flatten`]: nested rule flattening (for `&` parent selector support)
//!
//! ## Example
//!
//! ```rust
//! use block_syntax::parser::{parse_stylesheet, Selector};
//!
//! let stylesheet = parse_stylesheet("[state|active] { color: red; }").unwrap();
//! let rule = &stylesheet.rules[0];
//!
//! match &rule.selectors.selectors[0].parts[0].compound.selectors[0] {
//!     Selector::Attribute(attr) => {
//!         assert!(attr.in_namespace("state"));
//!         assert_eq!(attr.name, "active");
//!     }
//!     other => panic!("unexpected selector {other:?}"),
//! }
//! ```

pub mod flatten;
pub mod selectors;
pub mod stylesheet;
pub mod values;

pub use crate::parser::flatten::flatten_stylesheet;
pub use crate::parser::selectors::{parse_complex_selector, parse_compound_selector};
pub use crate::parser::stylesheet::{
    AtRule, AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Declaration,
    Position, Rule, RuleItem, Selector, SelectorList, SelectorPart, StyleSheet,
};

use crate::SyntaxTreeError;
use crate::parser::values::{blank_comments, parse_ident, take_value};

use nom::{
    IResult,
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, multispace0},
    combinator::{map, opt},
    multi::many0,
    sequence::{delimited, preceded, tuple},
};

/// Parses a full block stylesheet, flattening nested rules.
pub fn parse_stylesheet(source: &str) -> Result<StyleSheet, SyntaxTreeError> {
    let clean = blank_comments(source);
    let parser = StylesheetParser::new(&clean);
    let (at_rules, raw_rules) = parser.parse()?;
    log::trace!(
        "parsed {} rules and {} at-rules",
        raw_rules.len(),
        at_rules.len()
    );
    Ok(flatten_stylesheet(at_rules, raw_rules))
}

/// Top-level parser for a single rule (e.g., ".root { color: red; }").
///
/// Positions are relative to `input`.
pub fn parse_rule(input: &str) -> IResult<&str, Rule> {
    StylesheetParser::new(input).rule(input)
}

/// Parses a comma-separated list of selectors (e.g., ".a, .b[state|c]").
pub fn parse_selector_list(input: &str) -> IResult<&str, SelectorList> {
    let (input, _) = multispace0(input)?;
    let (input, first) = parse_complex_selector(input)?;
    let (input, rest) = many0(preceded(
        tuple((multispace0, char(','), multispace0)),
        parse_complex_selector,
    ))(input)?;

    let mut selectors = vec![first];
    selectors.extend(rest);
    Ok((input, SelectorList::new(selectors)))
}

/// Holds the full source so every sub-parser can turn the slice it is
/// looking at back into a line/column position.
struct StylesheetParser<'s> {
    source: &'s str,
    line_starts: Vec<usize>,
}

impl<'s> StylesheetParser<'s> {
    fn new(source: &'s str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self {
            source,
            line_starts,
        }
    }

    /// Position of the first character of `rest`, which must be a suffix of
    /// the source.
    fn position(&self, rest: &str) -> Position {
        let offset = self.source.len().saturating_sub(rest.len());
        let line_idx = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line_idx];
        let column = self.source[line_start..offset].chars().count() + 1;
        Position::new(line_idx as u32 + 1, column as u32)
    }

    fn error(&self, rest: &str, message: impl Into<String>) -> SyntaxTreeError {
        SyntaxTreeError::InvalidSyntax {
            message: message.into(),
            position: self.position(rest),
        }
    }

    fn parse(&self) -> Result<(Vec<AtRule>, Vec<Rule>), SyntaxTreeError> {
        let mut at_rules = Vec::new();
        let mut rules = Vec::new();
        let mut input = self.source.trim_start();

        while !input.is_empty() {
            if input.starts_with('@') {
                let (rest, at_rule) = self
                    .at_rule(input)
                    .map_err(|e| self.nom_error(input, e, "Malformed at-rule"))?;
                at_rules.push(at_rule);
                input = rest;
            } else {
                let (rest, rule) = self
                    .rule(input)
                    .map_err(|e| self.nom_error(input, e, "Invalid rule"))?;
                rules.push(rule);
                input = rest;
            }
            input = input.trim_start();
        }

        Ok((at_rules, rules))
    }

    fn nom_error(
        &self,
        start: &str,
        err: nom::Err<nom::error::Error<&str>>,
        message: &str,
    ) -> SyntaxTreeError {
        match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                let snippet: String = e.input.chars().take(20).collect();
                if snippet.trim().is_empty() {
                    self.error(e.input, format!("{message}: unexpected end of input"))
                } else {
                    self.error(e.input, format!("{message}: unexpected `{}`", snippet.trim()))
                }
            }
            nom::Err::Incomplete(_) => self.error(start, format!("{message}: incomplete input")),
        }
    }

    fn at_rule<'a>(&self, input: &'a str) -> IResult<&'a str, AtRule> {
        let position = self.position(input);
        let (input, name) = preceded(char('@'), parse_ident)(input)?;
        let (input, _) = multispace0(input)?;
        let (input, prelude) = take_value(input)?;
        let (input, _) = char(';')(input)?;
        Ok((
            input,
            AtRule {
                name: name.to_string(),
                prelude: prelude.trim().to_string(),
                position,
            },
        ))
    }

    fn rule<'a>(&self, input: &'a str) -> IResult<&'a str, Rule> {
        let (input, _) = multispace0(input)?;
        let position = self.position(input);
        let (input, selectors) = parse_selector_list(input)?;
        let (input, _) = multispace0(input)?;

        let (input, items) = delimited(
            char('{'),
            |i: &'a str| self.rule_items(i),
            preceded(multispace0, char('}')),
        )(input)?;

        Ok((input, Rule::new(selectors, items, position)))
    }

    /// Parses either a declaration (color: red) or a nested rule (&:hover { ... })
    fn rule_items<'a>(&self, input: &'a str) -> IResult<&'a str, Vec<RuleItem>> {
        many0(alt((
            map(|i: &'a str| self.rule(i), RuleItem::NestedRule),
            map(|i: &'a str| self.declaration(i), RuleItem::Declaration),
        )))(input)
    }

    fn declaration<'a>(&self, input: &'a str) -> IResult<&'a str, Declaration> {
        let (input, _) = multispace0(input)?;
        let position = self.position(input);
        let (input, property) = parse_ident(input)?;
        let (input, _) = tuple((multispace0, char(':'), multispace0))(input)?;
        let (input, raw) = take_value(input)?;

        let mut declaration = Declaration::new(property, raw.trim(), position);
        if let Some(value) = declaration.value.strip_suffix("!important") {
            declaration.value = value.trim_end().to_string();
            declaration.important = true;
        }
        if declaration.value.is_empty() {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Verify,
            )));
        }

        let (input, _) = multispace0(input)?;
        let (input, _) = opt(char(';'))(input)?;
        Ok((input, declaration))
    }
}

/// Parses a `from "<path>"` style trailer, returning the unquoted path.
pub fn parse_from_clause(input: &str) -> IResult<&str, &str> {
    let (input, _) = tuple((multispace0, tag("from"), multispace0))(input)?;
    let trimmed = input.trim();
    let unquoted = values::unquote(trimmed);
    if unquoted.len() == trimmed.len() || unquoted.is_empty() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }
    Ok(("", unquoted))
}
