use anyhow::{anyhow, Result};
use tracing::{debug, info, warn};

use codegen_core::config::{validate_config, CodegenConfig};
use codegen_core::diagnostics::DiagnosticsExt;
use codegen_plugins::builtin;
use codegen_plugins::{Engine, PluginRegistry, Target, TypeGenerator};

use crate::args::GenerateArgs;
use crate::io::input;
use crate::output;

pub async fn run(args: GenerateArgs) -> Result<()> {
    let pb = output::spinner();

    pb.set_message("reading configuration");
    let config = build_config(&args)?;
    debug!(
        bespoke = config.bespoke_workflow,
        lint = config.lint,
        validate = config.validate,
        policy = ?config.merge_policy,
        "configuration"
    );

    pb.set_message("resolving sources");
    let mut sources = Vec::with_capacity(args.sources.len());
    for location in &args.sources {
        sources.push(input::resolve_source(location, &args.format).await?);
    }
    debug!(count = sources.len(), "sources resolved");

    pb.set_message("loading plugins");
    let engine = Engine::new(builtin::registry()?);
    let mut targets = args
        .targets
        .iter()
        .map(|t| resolve_target(engine.plugins(), t))
        .collect::<Result<Vec<_>>>()?;
    let type_generator: Option<&dyn TypeGenerator> = match &args.types {
        Some(id) => Some(
            engine
                .plugins()
                .type_generator(id)
                .ok_or_else(|| anyhow!("type generator not found: {id}"))?,
        ),
        None => None,
    };

    pb.set_message("generating");
    let report = engine.generate(&mut sources, &mut targets, &args.out, type_generator, &config);
    pb.finish_and_clear();

    let loaded = sources.iter().filter(|s| s.loaded).count();
    info!(
        loaded,
        sources = sources.len(),
        targets = report.targets.len(),
        diagnostics = report.diagnostics.len(),
        "generation finished"
    );
    if output::is_json() {
        output::print(&report)?;
    } else {
        output::print_diagnostics(report.diagnostics())?;
        output::status(loaded > 0, &format!("{loaded}/{} sources loaded", sources.len()))?;
        for t in &report.targets {
            output::status(t.generated, &format!("{} -> {}", t.target, t.output.display()))?;
        }
    }

    let failed = report.targets.iter().filter(|t| !t.generated).count();
    if failed > 0 {
        warn!(failed, "targets failed");
        return Err(anyhow!("{failed} target(s) failed to generate"));
    }
    Ok(())
}

fn build_config(args: &GenerateArgs) -> Result<CodegenConfig> {
    let mut config = match &args.config {
        Some(path) => input::read_config(path)?,
        None => CodegenConfig::default(),
    };
    config.bespoke_workflow |= args.bespoke;
    config.lint |= args.lint;
    config.validate |= args.validate;
    for (k, v) in &args.vars {
        config.variables.insert(k.clone(), v.clone());
    }
    validate_config(&config)?;
    Ok(config)
}

/// `name-variant` matches a catalog key exactly; a bare `name` matches a
/// generator registered without a variant.
fn resolve_target(plugins: &PluginRegistry, spec: &str) -> Result<Target> {
    if let Some(entry) = plugins.generators().find(|g| g.key() == spec) {
        return Ok(Target::from_catalog(plugins, &entry.name, &entry.variant)?);
    }
    if plugins.find_generator_by_name(spec, "").is_some() {
        return Ok(Target::from_catalog(plugins, spec, "")?);
    }

    let known: Vec<String> = plugins.generators().map(|g| g.key()).collect();
    Err(anyhow!(
        "unknown target {spec:?} (available: {})",
        known.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    use clap::Parser;

    use crate::args::{Cli, Command};

    fn generate_args(argv: &[&str]) -> GenerateArgs {
        let mut full = vec!["codegen", "generate"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Generate(g) => g,
            _ => unreachable!(),
        }
    }

    #[test]
    fn resolves_catalog_targets() {
        let plugins = builtin::registry().unwrap();
        let t = resolve_target(&plugins, "model-json").unwrap();
        assert_eq!((t.name.as_str(), t.variant.as_str()), ("model", "json"));

        let err = resolve_target(&plugins, "java-spring").err().unwrap();
        assert!(err.to_string().contains("model-json"));
    }

    #[test]
    fn flags_and_vars_layer_over_config() {
        let args = generate_args(&["a.json", "--bespoke", "--var", "pretty=false"]);
        let cfg = build_config(&args).unwrap();
        assert!(cfg.bespoke_workflow);
        assert_eq!(cfg.variables["pretty"], false);
    }

    #[test]
    fn validate_flag_is_carried_without_lint() {
        let args = generate_args(&["a.json", "--validate"]);
        let cfg = build_config(&args).unwrap();
        assert!(cfg.validate);
        assert!(!cfg.lint);
    }

    #[tokio::test]
    async fn generates_model_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("pets.json");
        std::fs::write(
            &src,
            r#"{"resources": [{"id": 1, "path": "/pets", "method": "get"}]}"#,
        )
        .unwrap();
        let out = dir.path().join("out");

        let args = generate_args(&[
            src.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
        ]);
        run(args).await.unwrap();
        assert!(out.join("model").join("json").join("model.json").is_file());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn run_logs_summary() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("pets.json");
        std::fs::write(&src, r#"{"resources": [{"id": 1, "path": "/pets", "method": "get"}]}"#)
            .unwrap();
        let out = dir.path().join("out");
        run(generate_args(&[src.to_str().unwrap(), "--out", out.to_str().unwrap()]))
            .await
            .unwrap();

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("sources resolved"), "{logs}");
        assert!(logs.contains("generation finished"), "{logs}");
        assert!(logs.contains("loaded=1"), "{logs}");
    }
}
