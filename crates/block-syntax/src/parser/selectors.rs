use crate::parser::{
    AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Selector, SelectorPart,
    values::{parse_ident, unquote},
};
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_until},
    character::complete::{char, multispace0, multispace1, one_of},
    combinator::{map, value},
    multi::many1,
    sequence::{delimited, preceded},
};

/// One selector that carries an identifier after a fixed prefix.
fn prefixed<'a>(
    prefix: &'static str,
    build: fn(String) -> Selector,
) -> impl FnMut(&'a str) -> IResult<&'a str, Selector> {
    map(preceded(tag(prefix), parse_ident), move |name| {
        build(name.to_string())
    })
}

/// Parses a simple selector: `div`, `.class`, `#id`, `[attr]`, `:pseudo`,
/// `::pseudo`, `&` or `*`.
pub fn parse_simple_selector(input: &str) -> IResult<&str, Selector> {
    alt((
        prefixed(".", Selector::Class),
        prefixed("#", Selector::Id),
        // `::` before `:`
        prefixed("::", Selector::PseudoElement),
        prefixed(":", Selector::PseudoClass),
        parse_attribute_selector,
        value(Selector::Parent, char('&')),
        value(Selector::Universal, char('*')),
        map(parse_ident, |name| Selector::Type(name.to_string())),
    ))(input)
}

/// Parses a compound selector (e.g., ".button[state|active]").
///
/// Whitespace ends the compound: `.a .b` is two compounds.
pub fn parse_compound_selector(input: &str) -> IResult<&str, CompoundSelector> {
    map(many1(parse_simple_selector), CompoundSelector::new)(input)
}

/// The combinator between two compounds, including surrounding whitespace.
fn parse_combinator(input: &str) -> IResult<&str, Combinator> {
    let explicit = map(
        delimited(multispace0, one_of(">+~"), multispace0),
        |symbol| match symbol {
            '>' => Combinator::Child,
            '+' => Combinator::AdjacentSibling,
            _ => Combinator::GeneralSibling,
        },
    );
    alt((explicit, value(Combinator::Descendant, multispace1)))(input)
}

/// Parses a complex selector with combinators (e.g., ".root > .item").
///
/// Stops before any trailing whitespace or combinator that is not followed
/// by another compound.
pub fn parse_complex_selector(input: &str) -> IResult<&str, ComplexSelector> {
    let (mut rest, mut compound) = parse_compound_selector(input)?;
    let mut parts = Vec::new();

    while let Ok((after, combinator)) = parse_combinator(rest) {
        let Ok((after, next)) = parse_compound_selector(after) else {
            break;
        };
        parts.push(SelectorPart::new(compound, combinator));
        compound = next;
        rest = after;
    }

    parts.push(SelectorPart::new(compound, Combinator::None));
    Ok((rest, ComplexSelector::new(parts)))
}

/// Parses `[name]`, `[name=value]`, `[ns|name]` and `[ns|name=value]`.
fn parse_attribute_selector(input: &str) -> IResult<&str, Selector> {
    let (rest, content) = delimited(char('['), take_until("]"), char(']'))(input)?;

    let (qualified, value) = match content.split_once('=') {
        Some((qualified, value)) => (qualified.trim(), Some(unquote(value.trim()))),
        None => (content.trim(), None),
    };
    let (namespace, name) = match qualified.split_once('|') {
        Some((namespace, name)) => (Some(namespace.trim()), name.trim()),
        None => (None, qualified),
    };

    Ok((
        rest,
        Selector::Attribute(AttributeSelector::new(namespace, name, value)),
    ))
}
