use tracing::{debug, info, warn};

use codegen_core::config::{CodegenConfig, LoaderPolicy};
use codegen_core::diagnostics::Diagnostic;
use codegen_core::registry::UnifiedModel;
use codegen_core::targets;
use codegen_core::CodegenError;

use super::merge::merge_into;
use super::LoadReport;
use crate::plugin::Shared;
use crate::registry::PluginRegistry;
use crate::source::{Source, SourceFetcher};

/// Fetch, lint and load one source. The caller holds the model lock.
pub(super) fn load_source(
    model: &mut UnifiedModel,
    plugins: &PluginRegistry,
    fetcher: &dyn SourceFetcher,
    source: &mut Source,
    shared: &Shared,
    config: &CodegenConfig,
) -> LoadReport {
    let mut report = LoadReport {
        location: source.location.clone(),
        ..LoadReport::default()
    };

    let contents = match source.read(fetcher) {
        Ok(c) => c,
        Err(e) => {
            warn!(target: targets::LOADERS, source = %source.location, "unable to read source: {e:#}");
            report.diagnostics.push(
                Diagnostic::from(&CodegenError::load(
                    &source.location,
                    format!("unable to read source: {e:#}"),
                ))
                .with("source", &source.location),
            );
            return report;
        }
    };

    if config.lint && !lint(plugins, source, &contents, config, &mut report) {
        report.excluded = true;
        return report;
    }

    for registered in plugins.loaders() {
        let id = registered.spec.id.as_str();
        let resources = match registered.loader.load(&source.location, &contents, shared) {
            Ok(r) => r,
            Err(e) => {
                warn!(
                    target: targets::LOADERS,
                    loader = id,
                    source = %source.location,
                    "unable to load source: {e:#}"
                );
                report.diagnostics.push(
                    Diagnostic::from(&CodegenError::load(&source.location, format!("{e:#}")))
                        .with("loader", id)
                        .with("source", &source.location),
                );
                continue;
            }
        };

        debug!(
            target: targets::LOADERS,
            loader = id,
            resources = resources.resources.len(),
            components = resources.components.len(),
            workflows = resources.workflows.len(),
            "loaded"
        );

        let (summary, diagnostics) = merge_into(model, resources, config.merge_policy);
        report.merged.add(&summary);
        report.diagnostics.extend(
            diagnostics
                .into_iter()
                .map(|d| d.with("loader", id).with("source", &source.location)),
        );
        report.loaders.push(id.to_string());
        source.loaded = true;

        if config.loader_policy == LoaderPolicy::FirstSuccess {
            break;
        }
    }

    report.loaded = source.loaded;
    if report.loaded {
        info!(
            target: targets::LOADERS,
            source = %source.location,
            loaders = report.loaders.len(),
            "source loaded"
        );
    }
    report
}

/// Run every linter for the source's format. Returns false when the source
/// must be excluded (a linter failed and `validate` is set).
fn lint(
    plugins: &PluginRegistry,
    source: &Source,
    contents: &[u8],
    config: &CodegenConfig,
    report: &mut LoadReport,
) -> bool {
    let mut failed = false;
    for l in plugins.linters_for_type(&source.format) {
        if let Err(e) = l.linter.lint(&source.format, contents) {
            failed = true;
            warn!(
                target: targets::LINTERS,
                linter = l.spec.id.as_str(),
                source = %source.location,
                "lint failed: {e:#}"
            );
            report.diagnostics.push(
                Diagnostic::warning("lint.failed", format!("{e:#}"))
                    .with("linter", l.spec.id.as_str())
                    .with("source", &source.location),
            );
        }
    }

    if failed && config.validate {
        report.diagnostics.push(
            Diagnostic::error("source.excluded", "source failed linting and was not loaded")
                .with("source", &source.location),
        );
        return false;
    }
    true
}
