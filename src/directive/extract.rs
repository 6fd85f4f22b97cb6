//! Directive extraction from raw template text.
//!
//! Matches attribute-like occurrences of `v-<name>[:<arg>]="<value>"`
//! anywhere in the string. This is a text scan, not an HTML parse: anything
//! that does not fit the shape is simply not matched. Names are ASCII word
//! characters only.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

static DIRECTIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"v-([A-Za-z0-9_]+):?([a-zA-Z]*)="(.*?)""#).expect("directive pattern is valid")
});

/// Raw argument and expression of one directive occurrence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectiveBinding {
    pub arg: String,
    pub value: String,
}

/// Map each directive name in `template` to its binding.
///
/// When a name occurs more than once, the last occurrence wins.
pub fn extract_directives(template: &str) -> BTreeMap<String, DirectiveBinding> {
    DIRECTIVE_PATTERN
        .captures_iter(template)
        .map(|caps| {
            (
                caps[1].to_string(),
                DirectiveBinding {
                    arg: caps[2].to_string(),
                    value: caps[3].to_string(),
                },
            )
        })
        .collect()
}
