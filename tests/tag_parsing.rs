// tests/tag_parsing.rs

use proptest::prelude::*;
use plansolve::progress::{ComponentTag, parse_component_tag};

fn tag(component: &str, message: &str) -> ComponentTag {
    ComponentTag {
        component: component.to_string(),
        message: message.to_string(),
    }
}

#[test]
fn tagged_name_splits_component_and_message() {
    assert_eq!(parse_component_tag("@app@ building image"), tag("app", "building image"));
}

#[test]
fn untagged_name_is_left_alone() {
    assert_eq!(parse_component_tag("[internal] load metadata"), tag("", "[internal] load metadata"));
}

#[test]
fn single_at_sign_is_not_a_tag() {
    assert_eq!(parse_component_tag("@"), tag("", "@"));
    assert_eq!(parse_component_tag("@no closing mark"), tag("", "@no closing mark"));
}

#[test]
fn at_sign_not_in_first_position_is_not_a_tag() {
    assert_eq!(parse_component_tag("x@a@ b"), tag("", "x@a@ b"));
}

#[test]
fn closing_mark_at_end_gives_empty_message() {
    assert_eq!(parse_component_tag("@db@"), tag("db", ""));
}

#[test]
fn empty_component_is_allowed() {
    assert_eq!(parse_component_tag("@@ hello"), tag("", "hello"));
}

#[test]
fn only_one_separator_character_is_dropped() {
    assert_eq!(parse_component_tag("@web@  two spaces"), tag("web", " two spaces"));
}

#[test]
fn multibyte_separator_is_dropped_whole() {
    assert_eq!(parse_component_tag("@web@\u{00e9}tape"), tag("web", "tape"));
}

proptest! {
    #[test]
    fn tagged_names_round_trip(component in "[a-z0-9_.-]{0,12}", rest in "[ -~]{0,40}") {
        let name = format!("@{component}@ {rest}");
        let parsed = parse_component_tag(&name);
        prop_assert_eq!(parsed.component, component);
        prop_assert_eq!(parsed.message, rest);
    }

    #[test]
    fn names_without_leading_at_are_untouched(name in "[^@][ -~]{0,40}") {
        let parsed = parse_component_tag(&name);
        prop_assert_eq!(parsed.component, "");
        prop_assert_eq!(parsed.message, name);
    }

    #[test]
    fn names_without_closing_at_are_untouched(rest in "[^@]{0,40}") {
        let name = format!("@{rest}");
        let parsed = parse_component_tag(&name);
        prop_assert_eq!(parsed.component, "");
        prop_assert_eq!(parsed.message, name);
    }
}
