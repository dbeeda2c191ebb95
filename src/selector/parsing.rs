use nom::branch::alt;
use nom::bytes::complete::{is_not, tag};
use nom::character::complete::{alphanumeric1, char};
use nom::combinator::{map, opt, value};
use nom::error::{Error, ErrorKind};
use nom::multi::{many0, many1};
use nom::sequence::{delimited, pair, preceded, tuple};
use nom::IResult;

use super::{AttributeSelector, Selector, SimpleSelector};

/// Parse a selector, e.g. `h1`, `#banner`, `a[href]`, `div.wide`
pub fn selector(input: &str) -> IResult<&str, Selector> {
    let (input, mut parts) = simple_selectors(input)?;
    let selector = if parts.len() == 1 {
        Selector::Simple(parts.remove(0))
    } else {
        Selector::Compound(parts)
    };
    Ok((input, selector))
}

/// Parse an optional type (or universal) selector followed by any number of
/// id/class/attribute qualifiers. At least one part must be present.
fn simple_selectors(input: &str) -> IResult<&str, Vec<SimpleSelector>> {
    let element_or_universal = alt((
        value(SimpleSelector::Universal, tag("*")),
        map(ident, SimpleSelector::Type),
    ));
    let (remaining, (first, rest)) = pair(opt(element_or_universal), many0(qualifier))(input)?;
    let parts: Vec<SimpleSelector> = first.into_iter().chain(rest).collect();
    if parts.is_empty() {
        Err(nom::Err::Error(Error::new(input, ErrorKind::Many1)))
    } else {
        Ok((remaining, parts))
    }
}

fn qualifier(input: &str) -> IResult<&str, SimpleSelector> {
    alt((
        map(preceded(char('#'), name), SimpleSelector::ID),
        map(preceded(char('.'), ident), SimpleSelector::Class),
        attribute,
    ))(input)
}

/// Parse an attribute selector, `[att]` or `[att=val]`
fn attribute(input: &str) -> IResult<&str, SimpleSelector> {
    let (input, (attr, value)) = delimited(
        char('['),
        pair(name, opt(preceded(char('='), attr_value))),
        char(']'),
    )(input)?;
    let selector = match value {
        Some(value) => AttributeSelector::Equals(attr, value),
        None => AttributeSelector::Has(attr),
    };
    Ok((input, SimpleSelector::Attribute(selector)))
}

fn attr_value(input: &str) -> IResult<&str, String> {
    alt((string, name))(input)
}

/// Parse quoted string
fn string(input: &str) -> IResult<&str, String> {
    let double = delimited(char('"'), alt((is_not("\""), tag(""))), char('"'));
    let single = delimited(char('\''), alt((is_not("'"), tag(""))), char('\''));
    map(alt((double, single)), str::to_string)(input)
}

/// Parse name
fn name(input: &str) -> IResult<&str, String> {
    let nmchar = alt((alphanumeric1, alt((tag("_"), tag("-")))));
    let (input, vals) = many1(nmchar)(input)?;
    Ok((input, vals.join("")))
}

/// Parse ident
fn ident(input: &str) -> IResult<&str, String> {
    let nmstart = alt((alphanumeric1, tag("_")));
    let nmchar = alt((alphanumeric1, alt((tag("_"), tag("-")))));
    let (input, (pref, start, rest)) = tuple((opt(char('-')), nmstart, many0(nmchar)))(input)?;
    let pref = match pref {
        Some(c) => c.to_string(),
        None => "".to_string(),
    };
    let identifier = format!("{}{}{}", pref, start, rest.concat());
    Ok((input, identifier))
}

#[cfg(test)]
#[test]
fn test_selector_parse() {
    assert_eq!(
        selector("h1"),
        Ok(("", Selector::Simple(SimpleSelector::Type("h1".into()))))
    );
    assert_eq!(
        selector("#banner"),
        Ok(("", Selector::Simple(SimpleSelector::ID("banner".into()))))
    );
    assert_eq!(
        selector(".nav-bar"),
        Ok(("", Selector::Simple(SimpleSelector::Class("nav-bar".into()))))
    );
    assert_eq!(
        selector("*"),
        Ok(("", Selector::Simple(SimpleSelector::Universal)))
    );
    assert_eq!(
        selector("a[href]"),
        Ok((
            "",
            Selector::Compound(vec![
                SimpleSelector::Type("a".into()),
                SimpleSelector::Attribute(AttributeSelector::Has("href".into())),
            ])
        ))
    );
    assert_eq!(
        selector("div.wide#main"),
        Ok((
            "",
            Selector::Compound(vec![
                SimpleSelector::Type("div".into()),
                SimpleSelector::Class("wide".into()),
                SimpleSelector::ID("main".into()),
            ])
        ))
    );
    assert_eq!(
        selector(r#"[data-state="open"]"#),
        Ok((
            "",
            Selector::Simple(SimpleSelector::Attribute(AttributeSelector::Equals(
                "data-state".into(),
                "open".into()
            )))
        ))
    );
}

#[cfg(test)]
#[test]
fn test_selector_parse_malformed() {
    use super::parse;
    assert!(parse("").is_err());
    assert!(parse("#").is_err());
    assert!(parse("[href").is_err());
    // Combinators are not supported
    assert!(parse("div p").is_err());
    assert!(parse("div > p").is_err());
}
