use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, tag_no_case, take_until},
    character::complete::{alphanumeric1, char, multispace0, multispace1, space0},
    combinator::{map, opt, verify},
    error::{Error, ErrorKind},
    multi::{many0, separated_list0},
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};

use super::dom::*;

/// Elements which never have contents or a closing tag
static VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| name.eq_ignore_ascii_case(v))
}

/// Parse a complete HTML document, returning the root [`DOMElement`].
/// An optional doctype and any leading comments are consumed and dropped;
/// input remaining after the root element is ignored.
pub fn document(input: &str) -> IResult<&str, DOMElement> {
    let (input, _) = multispace0(input)?;
    let (input, _) = opt(terminated(doctype, multispace0))(input)?;
    let (input, _) = many0(terminated(comment, multispace0))(input)?;
    element(input)
}

/// Parse one element together with its contents and closing tag
pub fn element(input: &str) -> IResult<&str, DOMElement> {
    let (rest, (mut element, self_closed)) = open_tag(input)?;
    if self_closed || is_void(&element.tag_name) {
        return Ok((rest, element));
    }
    let (rest, contents) = node_contents(rest)?;
    let (rest, close) = close_tag(rest)?;
    if !element.tag_name.eq_ignore_ascii_case(close) {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)));
    }
    element.contents = contents;
    Ok((rest, element))
}

/// Attempt to parse a string as a valid tag name
fn tag_name(input: &str) -> IResult<&str, &str> {
    alphanumeric1(input)
}

/// Parse a tag in the form `<name attr=value ...>`, returning the [`DOMElement`]
/// and whether the tag was self-closing (`<name ... />`)
fn open_tag(input: &str) -> IResult<&str, (DOMElement, bool)> {
    let (input, (_, name, attrs, _, slash, _)) = tuple((
        char('<'),
        tag_name,
        opt(preceded(multispace1, attribute_list)),
        multispace0,
        opt(char('/')),
        char('>'),
    ))(input)?;
    let attrs = attrs.map(|attrs| {
        DOMAttributes(
            attrs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    });
    Ok((input, (DOMElement::new(name, attrs, vec![]), slash.is_some())))
}

/// Parse a tag in the form `</name>`, returning `name`
fn close_tag(input: &str) -> IResult<&str, &str> {
    let (remaining, (_, name, _, _)) = tuple((tag("</"), tag_name, space0, char('>')))(input)?;
    Ok((remaining, name))
}

/// Parse the contents between an opening and closing tag. Comments are
/// dropped, text nodes are trimmed and whitespace-only runs discarded.
fn node_contents(input: &str) -> IResult<&str, Vec<DOMContent>> {
    let (input, items) = many0(alt((
        map(comment, |_| None),
        map(element, |e| Some(DOMContent::Element(e))),
        text,
    )))(input)?;
    Ok((input, items.into_iter().flatten().collect()))
}

fn text(input: &str) -> IResult<&str, Option<DOMContent>> {
    let (remaining, raw) = verify(take_until("<"), |s: &str| !s.is_empty())(input)?;
    let trimmed = raw.trim();
    let content = (!trimmed.is_empty()).then(|| DOMContent::Text(trimmed.to_string()));
    Ok((remaining, content))
}

fn comment(input: &str) -> IResult<&str, &str> {
    delimited(tag("<!--"), take_until("-->"), tag("-->"))(input)
}

fn doctype(input: &str) -> IResult<&str, &str> {
    delimited(tag_no_case("<!doctype"), take_until(">"), char('>'))(input)
}

// Attribute parsing below

fn single_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('\''), alt((is_not("'"), tag(""))), char('\''))(input)
}

fn double_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), alt((is_not("\""), tag(""))), char('"'))(input)
}

fn unquoted(input: &str) -> IResult<&str, &str> {
    let (rest, value) = is_not(" \t\r\n\"'=<>`")(input)?;
    // A trailing `/` before `>` closes the tag rather than ending the value
    match value.strip_suffix('/') {
        Some(stripped) if rest.starts_with('>') && !stripped.is_empty() => {
            Ok((&input[stripped.len()..], stripped))
        }
        _ => Ok((rest, value)),
    }
}

fn attr_value(input: &str) -> IResult<&str, &str> {
    alt((single_quoted, double_quoted, unquoted))(input)
}

fn attr_name(input: &str) -> IResult<&str, &str> {
    is_not(" \t\r\n\"'>/=")(input)
}

/// Parse one attribute, either `name=value` or a bare `name`
fn attribute(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, name) = attr_name(input)?;
    let (input, value) = opt(preceded(char('='), attr_value))(input)?;
    Ok((input, (name, value.unwrap_or(""))))
}

fn attribute_list(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    separated_list0(multispace1, attribute)(input)
}

#[cfg(test)]
#[test]
fn test_tag_parse() {
    use crate::attributes;
    let data = r#"<div>"#;
    let target = DOMElement::new("div", None, vec![]);
    assert_eq!(open_tag(data).unwrap(), ("", (target, false)));

    let data = r#"<div class=nothing>"#;
    let target = DOMElement::new("div", Some(attributes!("class" => "nothing")), vec![]);
    assert_eq!(open_tag(data).unwrap(), ("", (target, false)));

    let data = r#"<div attr1 attr2=two attr3='three' attr4="number four">"#;
    let target = DOMElement::new(
        "div",
        Some(attributes!(
            "attr1" => "",
            "attr2" => "two",
            "attr3" => "three",
            "attr4" => "number four"
        )),
        vec![],
    );
    assert_eq!(open_tag(data).unwrap(), ("", (target, false)));

    let data = r#"<meta charset="utf-8"/>"#;
    let target = DOMElement::new("meta", Some(attributes!("charset" => "utf-8")), vec![]);
    assert_eq!(open_tag(data).unwrap(), ("", (target, true)));
}

#[cfg(test)]
#[test]
fn test_element_parse() {
    use crate::attributes;
    let data = r#"<html><div class=nothing><h1></h1></div></html>"#;
    let target = DOMElement::new(
        "html",
        None,
        vec![DOMElement::new(
            "div",
            Some(attributes!("class" => "nothing")),
            vec![DOMElement::new("h1", None, vec![]).into()],
        )
        .into()],
    );
    assert_eq!(element(data).unwrap(), ("", target));

    let data = r#"<html><h1>Hello, world</h1></html>"#;
    let target = DOMElement::new(
        "html",
        None,
        vec![DOMElement::new("h1", None, vec!["Hello, world".into()]).into()],
    );
    assert_eq!(element(data).unwrap(), ("", target));
}

#[cfg(test)]
#[test]
fn test_parse_malformed() {
    let data = r#"<html></closing><opening></html>"#;
    assert!(element(data).is_err());
    let data = r#"<---></--->"#;
    assert!(element(data).is_err());
}

#[cfg(test)]
#[test]
fn test_document() {
    use crate::attributes;
    let i = r#"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8"/>
        <title>The minimal, valid HTML5 document</title>
    </head>
    <body>
        <!-- User-visible content goes in the body -->
        <p>Some paragraph</p>
        Some untagged text
    </body>
</html>"#;
    let target = DOMElement::new(
        "html",
        Some(attributes!("lang" => "en")),
        vec![
            DOMElement::new(
                "head",
                None,
                vec![
                    DOMElement::new("meta", Some(attributes!("charset" => "utf-8")), vec![]).into(),
                    DOMElement::new(
                        "title",
                        None,
                        vec!["The minimal, valid HTML5 document".into()],
                    )
                    .into(),
                ],
            )
            .into(),
            DOMElement::new(
                "body",
                None,
                vec![
                    DOMElement::new("p", None, vec!["Some paragraph".into()]).into(),
                    "Some untagged text".into(),
                ],
            )
            .into(),
        ],
    );
    assert_eq!(document(i), Ok(("", target)));
}

#[cfg(test)]
#[test]
fn test_attributes_split_across_lines() {
    use crate::attributes;
    let data = "<html><div\n  class=\"x\"\n  id=\"y\"></div></html>";
    let target = DOMElement::new(
        "html",
        None,
        vec![DOMElement::new("div", Some(attributes!("class" => "x", "id" => "y")), vec![]).into()],
    );
    assert_eq!(document(data), Ok(("", target)));
}

#[cfg(test)]
#[test]
fn test_unquoted_values_with_slashes() {
    use crate::attributes;
    let data = r#"<a href=/about>"#;
    let target = DOMElement::new("a", Some(attributes!("href" => "/about")), vec![]);
    assert_eq!(open_tag(data).unwrap(), ("", (target, false)));

    let data = r#"<img src=foo.png/>"#;
    let target = DOMElement::new("img", Some(attributes!("src" => "foo.png")), vec![]);
    assert_eq!(open_tag(data).unwrap(), ("", (target, true)));
}

#[cfg(test)]
#[test]
fn test_void_elements() {
    let data = r#"<p>one<br>two</p>"#;
    let target = DOMElement::new(
        "p",
        None,
        vec![
            "one".into(),
            DOMElement::new("br", None, vec![]).into(),
            "two".into(),
        ],
    );
    assert_eq!(element(data).unwrap(), ("", target));
}
