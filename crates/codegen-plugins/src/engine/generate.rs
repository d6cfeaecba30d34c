use std::path::{Path, PathBuf};

use tracing::{info, warn};

use codegen_core::config::CodegenConfig;
use codegen_core::diagnostics::Diagnostic;
use codegen_core::registry::UnifiedModel;
use codegen_core::targets;
use codegen_core::CodegenError;

use super::bespoke::reduce_to_workflows;
use super::load::load_source;
use super::{GenerateReport, Target, TargetReport};
use crate::plugin::{GeneratorContext, Shared, TypeGenerator};
use crate::registry::PluginRegistry;
use crate::source::{Source, SourceFetcher};

pub(super) struct Run<'a> {
    pub sources: &'a mut [Source],
    pub targets: &'a mut [Target],
    pub output_path: &'a Path,
    pub type_generator: Option<&'a dyn TypeGenerator>,
    pub shared: &'a Shared,
    pub config: &'a CodegenConfig,
}

/// Output directory for a target: `base/name[/type][/variant]`, every
/// appended segment lower-cased.
pub fn output_dir(base: &Path, name: &str, r#type: &str, variant: &str) -> PathBuf {
    let mut p = base.join(name.to_lowercase());
    if !r#type.is_empty() {
        p.push(r#type.to_lowercase());
    }
    if !variant.is_empty() {
        p.push(variant.to_lowercase());
    }
    p
}

pub(super) fn run(
    model: &mut UnifiedModel,
    plugins: &PluginRegistry,
    fetcher: &dyn SourceFetcher,
    run: Run<'_>,
) -> GenerateReport {
    let Run {
        sources,
        targets: to_generate,
        output_path,
        type_generator,
        shared,
        config,
    } = run;
    let mut report = GenerateReport::default();

    if !plugins.loaders().is_empty() {
        for source in sources.iter_mut() {
            let r = load_source(model, plugins, fetcher, source, shared, config);
            report.diagnostics.extend(r.diagnostics.iter().cloned());
            report.sources.push(r);
        }
    }

    if config.resolve_latest {
        model.resolve_latest();
    }

    if config.bespoke_workflow && !model.workflows.is_empty() {
        report.bespoke = Some(reduce_to_workflows(model));
    }

    if model.resources.is_empty() || to_generate.is_empty() {
        info!(
            target: targets::GENERATORS,
            resources = model.resources.len(),
            targets = to_generate.len(),
            "nothing to generate"
        );
        report
            .diagnostics
            .push(Diagnostic::info("generate.skipped", "no resources or no targets"));
        return report;
    }

    for target in to_generate.iter_mut() {
        let tr = generate_target(
            model,
            target,
            output_path,
            type_generator,
            config,
            &mut report.diagnostics,
        );
        report.targets.push(tr);
    }
    report
}

fn generate_target(
    model: &UnifiedModel,
    target: &mut Target,
    output_path: &Path,
    type_generator: Option<&dyn TypeGenerator>,
    config: &CodegenConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> TargetReport {
    let id = target.id();
    let out = output_dir(output_path, &target.name, &target.r#type, &target.variant);
    let mut report = TargetReport {
        target: id.clone(),
        output: out.clone(),
        generated: false,
    };

    let variables = target.variables(&config.variables).clone();
    if !variables.is_empty() {
        if let Err(e) = target.generator.configure(&variables) {
            warn!(target: targets::GENERATORS, target_id = %id, "unable to apply variables: {e:#}");
            diagnostics.push(
                Diagnostic::warning("generate.configure", format!("{e:#}")).with("target", &id),
            );
        }
    }

    if let Err(e) = std::fs::create_dir_all(&out) {
        warn!(target: targets::GENERATORS, target_id = %id, "unable to create {}: {e}", out.display());
        diagnostics.push(
            Diagnostic::from(&CodegenError::generate(
                &id,
                format!("create {}: {e}", out.display()),
            ))
            .with("target", &id),
        );
        return report;
    }

    if let Some(tg) = type_generator {
        if let Err(e) = tg.generate(model.components.all(), &id, &out) {
            warn!(target: targets::GENERATORS, target_id = %id, "type generation failed: {e:#}");
            diagnostics.push(
                Diagnostic::error("generate.types_failed", format!("{e:#}")).with("target", &id),
            );
        }
    }

    let ctx = GeneratorContext::snapshot(model, variables);
    match target.generator.generate(&out, &ctx) {
        Ok(()) => {
            info!(target: targets::GENERATORS, target_id = %id, output = %out.display(), "generated");
            report.generated = true;
        }
        Err(e) => {
            warn!(target: targets::GENERATORS, target_id = %id, "generation failed: {e:#}");
            diagnostics.push(
                Diagnostic::from(&CodegenError::generate(&id, format!("{e:#}"))).with("target", &id),
            );
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_dir_layout() {
        let base = Path::new("/out");
        assert_eq!(output_dir(base, "Go", "", ""), PathBuf::from("/out/go"));
        assert_eq!(
            output_dir(base, "Go", "SDK", "Client"),
            PathBuf::from("/out/go/sdk/client")
        );
        assert_eq!(output_dir(base, "ts", "", "node"), PathBuf::from("/out/ts/node"));
    }
}
