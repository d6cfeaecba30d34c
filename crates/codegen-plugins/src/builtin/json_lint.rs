//! JSON syntax linter.

#![cfg(feature = "builtin")]

use anyhow::Result;
use serde::de::IgnoredAny;

use crate::plugin::Linter;
use crate::registry::PluginRegistry;
use crate::spec::PluginSpec;

pub const ID: &str = "builtin.json-syntax";

pub fn register(registry: &mut PluginRegistry) -> Result<()> {
    let spec = PluginSpec::new(ID, "JSON syntax linter", "0.1.0")
        .support("json")
        .meta("category", "linter");
    registry.register_linter(spec, Box::new(JsonSyntaxLinter))
}

pub struct JsonSyntaxLinter;

impl Linter for JsonSyntaxLinter {
    fn lint(&self, source_type: &str, contents: &[u8]) -> Result<()> {
        if contents.iter().all(u8::is_ascii_whitespace) {
            anyhow::bail!("{source_type} source is empty");
        }
        if let Err(e) = serde_json::from_slice::<IgnoredAny>(contents) {
            anyhow::bail!(
                "invalid {source_type} at line {} column {}: {e}",
                e.line(),
                e.column()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_json() {
        JsonSyntaxLinter.lint("json", br#"{"a": [1, 2]}"#).unwrap();
    }

    #[test]
    fn reports_position_of_error() {
        let err = JsonSyntaxLinter.lint("json", b"{\n  \"a\": }").unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn empty_input_rejected() {
        assert!(JsonSyntaxLinter.lint("json", b"  \n").is_err());
    }
}
