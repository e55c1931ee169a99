// src/progress/tag.rs

/// Component tag parsed from a vertex name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentTag {
    /// Text between the two `@` marks, or empty when the name is untagged.
    pub component: String,
    pub message: String,
}

/// Parse `@component@ message` out of a vertex name.
///
/// The closing `@` is searched from the second character on, and exactly one
/// separator character after it is dropped. Names that do not match keep
/// an empty component and the full name as message.
pub fn parse_component_tag(name: &str) -> ComponentTag {
    let untagged = || ComponentTag {
        component: String::new(),
        message: name.to_string(),
    };

    if name.len() < 2 || !name.starts_with('@') {
        return untagged();
    }

    let Some(end) = name[1..].find('@') else {
        return untagged();
    };

    let component = &name[1..end + 1];
    let rest = &name[end + 2..];
    let mut chars = rest.chars();
    chars.next();

    ComponentTag {
        component: component.to_string(),
        message: chars.as_str().to_string(),
    }
}
