use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;

#[derive(Parser, Debug, Clone)]
#[command(name = "codegen", version, about = "Unify API descriptions and generate from them")]
pub struct Cli {
    /// Emit JSON output on stdout and JSON logs on stderr.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Load sources into one unified model and run generators over it.
    Generate(GenerateArgs),

    /// List available plugins and versions.
    Plugins,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Source paths or URLs.
    #[arg(required = true)]
    pub sources: Vec<String>,

    /// Source format, used to pick linters.
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Generator as name[-variant]. Repeatable.
    #[arg(long = "target", short = 't', default_value = "model-json")]
    pub targets: Vec<String>,

    /// Output root. Each target writes under out/name[/type][/variant].
    #[arg(long, default_value = "./out")]
    pub out: PathBuf,

    /// JSON configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Keep only what workflow steps use.
    #[arg(long)]
    pub bespoke: bool,

    /// Run linters before loading.
    #[arg(long)]
    pub lint: bool,

    /// With --lint, skip sources that fail linting.
    #[arg(long)]
    pub validate: bool,

    /// Type generator plugin id, run before each target.
    #[arg(long)]
    pub types: Option<String>,

    /// Generator variable as key=value. Values that parse as JSON are
    /// passed as JSON, anything else as a string.
    #[arg(long = "var", value_parser = parse_var)]
    pub vars: Vec<(String, Value)>,
}

fn parse_var(s: &str) -> Result<(String, Value), String> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {s:?}"))?;
    if k.is_empty() {
        return Err("variable name must not be empty".to_string());
    }
    let value = serde_json::from_str(v).unwrap_or_else(|_| Value::String(v.to_string()));
    Ok((k.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_defaults() {
        let cli = Cli::try_parse_from(["codegen", "generate", "a.json"]).unwrap();
        let Command::Generate(g) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(g.sources, vec!["a.json"]);
        assert_eq!(g.targets, vec!["model-json"]);
        assert_eq!(g.format, "json");
        assert!(!g.bespoke);
    }

    #[test]
    fn vars_parse_json_or_string() {
        assert_eq!(parse_var("pretty=false").unwrap().1, Value::Bool(false));
        assert_eq!(
            parse_var("package=pets").unwrap().1,
            Value::String("pets".into())
        );
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=x").is_err());
    }
}
