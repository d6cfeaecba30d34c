//! String helpers shared by loaders and generators.
//!
//! Pure in-memory transforms. Path-parameter rewrites are bit-exact with the
//! layouts downstream tooling expects.

pub mod case;
pub mod path_params;

pub use case::{eq_fold, remove_whitespace_and_caps, to_camel_case, to_lower_camel};
pub use path_params::{
    uri_path_param_to_angle_brackets_param, uri_path_param_to_braces_param,
    uri_path_param_to_colon_param, uri_path_param_to_lower_camel_param,
};
