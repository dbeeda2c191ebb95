use std::collections::HashMap;
use std::fmt::Display;

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct DOMElement {
    pub tag_name: String,
    pub attributes: DOMAttributes,
    pub contents: Vec<DOMContent>,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum DOMContent {
    Element(DOMElement),
    Text(String),
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct DOMAttributes(pub HashMap<String, String>);

impl DOMAttributes {
    pub fn empty() -> Self {
        Self(HashMap::new())
    }
}

/// Build a [`DOMAttributes`] from `name => value` pairs
#[macro_export]
macro_rules! attributes {
    ($($name:expr => $value:expr),* $(,)?) => {
        $crate::html::DOMAttributes(::std::collections::HashMap::from([
            $(($name.to_string(), $value.to_string())),*
        ]))
    };
}

impl DOMElement {
    pub fn new(
        name: impl Display,
        attributes: Option<DOMAttributes>,
        contents: Vec<DOMContent>,
    ) -> Self {
        Self {
            tag_name: name.to_string(),
            attributes: attributes.unwrap_or_else(DOMAttributes::empty),
            contents,
        }
    }

    pub fn get_attribute(&self, name: &str) -> Option<&String> {
        self.attributes.0.get(name)
    }

    /// Check if the `class` attribute is present and contains the specified class
    pub fn has_class(&self, class: &str) -> bool {
        self.get_attribute("class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Check if the `id` attribute exists and is an exact match for the provided ID
    pub fn id_is(&self, id: &str) -> bool {
        self.get_attribute("id").map(|c| c == id).unwrap_or(false)
    }

    /// Iterate over the direct element children, skipping text nodes
    pub fn child_elements(&self) -> impl Iterator<Item = &DOMElement> {
        self.contents.iter().filter_map(|c| match c {
            DOMContent::Element(e) => Some(e),
            DOMContent::Text(_) => None,
        })
    }
}

impl From<DOMElement> for DOMContent {
    fn from(e: DOMElement) -> Self {
        DOMContent::Element(e)
    }
}

impl From<&str> for DOMContent {
    fn from(s: &str) -> Self {
        DOMContent::Text(s.to_string())
    }
}

impl From<String> for DOMContent {
    fn from(s: String) -> Self {
        DOMContent::Text(s)
    }
}
