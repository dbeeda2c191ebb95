use crate::html::DOMElement;

mod parsing;

/// A parsed DOM query expression
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Selector {
    Simple(SimpleSelector),
    Compound(Vec<SimpleSelector>),
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum SimpleSelector {
    Type(String),
    Universal,
    ID(String),
    Class(String),
    Attribute(AttributeSelector),
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum AttributeSelector {
    // [att]
    Has(String),
    // [att=val]
    Equals(String, String),
}

/// Parse a selector string, requiring the whole input to be consumed.
/// Surrounding whitespace is ignored.
pub fn parse(input: &str) -> Result<Selector, String> {
    let input = input.trim();
    match nom::combinator::all_consuming(parsing::selector)(input) {
        Ok((_, selector)) => Ok(selector),
        Err(e) => Err(e.to_string()),
    }
}

impl Selector {
    /// Check if this selector selects the given element
    pub fn matches(&self, element: &DOMElement) -> bool {
        match self {
            Selector::Simple(s) => s.matches(element),
            // Every part of a compound selector must select the same element
            Selector::Compound(parts) => parts.iter().all(|s| s.matches(element)),
        }
    }

    /// Check if any element in the tree rooted at `root` is selected
    pub fn matches_in(&self, root: &DOMElement) -> bool {
        self.matches(root) || root.child_elements().any(|c| self.matches_in(c))
    }
}

impl SimpleSelector {
    fn matches(&self, element: &DOMElement) -> bool {
        match self {
            // Tag names compare case-insensitively, as in HTML
            SimpleSelector::Type(name) => element.tag_name.eq_ignore_ascii_case(name),
            SimpleSelector::Universal => true,
            SimpleSelector::ID(id) => element.id_is(id),
            SimpleSelector::Class(class) => element.has_class(class),
            SimpleSelector::Attribute(attr) => attr.matches(element),
        }
    }
}

impl AttributeSelector {
    fn matches(&self, element: &DOMElement) -> bool {
        match self {
            AttributeSelector::Has(name) => element.get_attribute(name).is_some(),
            AttributeSelector::Equals(name, value) => {
                element.get_attribute(name).map(|v| v == value).unwrap_or(false)
            }
        }
    }
}

#[cfg(test)]
#[test]
fn test_simple_matching() {
    use crate::attributes;
    let div = DOMElement::new("div", None, vec![]);
    assert!(parse("div").unwrap().matches(&div));
    assert!(!parse("p").unwrap().matches(&div));
    assert!(parse("*").unwrap().matches(&div));

    let link = DOMElement::new(
        "a",
        Some(attributes!("href" => "/about", "class" => "nav external")),
        vec![],
    );
    assert!(parse("a[href]").unwrap().matches(&link));
    assert!(!parse("a[rel]").unwrap().matches(&link));
    assert!(parse(r#"a[href="/about"]"#).unwrap().matches(&link));
    assert!(!parse(r#"a[href="/contact"]"#).unwrap().matches(&link));
    assert!(parse(".nav").unwrap().matches(&link));
    assert!(parse(".external").unwrap().matches(&link));
    assert!(!parse(".navx").unwrap().matches(&link));
}

#[cfg(test)]
#[test]
fn test_type_matching_ignores_case() {
    let upper = DOMElement::new("H1", None, vec![]);
    assert!(parse("h1").unwrap().matches(&upper));
    let lower = DOMElement::new("h1", None, vec![]);
    assert!(parse("H1").unwrap().matches(&lower));
}

#[cfg(test)]
#[test]
fn test_compound_needs_every_part() {
    use crate::attributes;
    let plain = DOMElement::new("a", None, vec![]);
    assert!(!parse("a[href]").unwrap().matches(&plain));

    let wide = DOMElement::new("div", Some(attributes!("class" => "wide")), vec![]);
    assert!(parse("div.wide").unwrap().matches(&wide));
    assert!(!parse("p.wide").unwrap().matches(&wide));
}

#[cfg(test)]
#[test]
fn test_matches_in_descends() {
    let doc = crate::html::document(
        r#"<html><body><div id=banner><a href="/about">About</a></div></body></html>"#,
    )
    .unwrap()
    .1;
    assert!(parse("#banner").unwrap().matches_in(&doc));
    assert!(parse("a[href]").unwrap().matches_in(&doc));
    assert!(parse("body").unwrap().matches_in(&doc));
    assert!(!parse("h2").unwrap().matches_in(&doc));
    assert!(!parse("#footer").unwrap().matches_in(&doc));
}
