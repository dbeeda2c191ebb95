mod dom;
mod parsing;

pub use dom::{DOMAttributes, DOMContent, DOMElement};
pub use parsing::document;
