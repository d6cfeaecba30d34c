//! Path-parameter rewrites.
//!
//! Every transform recognizes the same template tokens:
//!
//! ```text
//! {param}  {param*}  {.param}  {.param*}  {;param}  {;param*}  {?param}  {?param*}
//! ```

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::case::to_camel_case;

fn path_param_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[.;?]?([^{}*]+)\*?\}").expect("static path param regex"))
}

/// `/users/{userId}` -> `/users/:userId`
pub fn uri_path_param_to_colon_param(uri: &str) -> String {
    path_param_re().replace_all(uri, ":$1").into_owned()
}

/// `/users/{.userId*}` -> `/users/{userId}`
pub fn uri_path_param_to_braces_param(uri: &str) -> String {
    path_param_re().replace_all(uri, "{$1}").into_owned()
}

/// `/users/{user-id}` -> `/users/<user_id>`
///
/// The whole matched token is rewritten: braces become angle brackets and
/// hyphens become underscores. Prefix and explode markers are kept.
pub fn uri_path_param_to_angle_brackets_param(uri: &str) -> String {
    path_param_re()
        .replace_all(uri, |caps: &Captures<'_>| {
            caps[0].replace('-', "_").replace('{', "<").replace('}', ">")
        })
        .into_owned()
}

/// `/users/{user-id}/house/{houseId}` -> `/users/:userId/house/:houseId`
pub fn uri_path_param_to_lower_camel_param(uri: &str) -> String {
    path_param_re()
        .replace_all(uri, |caps: &Captures<'_>| {
            let inner = caps[0].replace(['{', '}'], "");
            format!(":{}", to_camel_case(&inner, false))
        })
        .into_owned()
}
