//! End-to-end engine tests: sources on disk -> loaders -> merge -> targets.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use serde_json::{json, Value};

use codegen_core::config::{CodegenConfig, LoaderPolicy};
use codegen_core::diagnostics::DiagnosticsExt;
use codegen_plugins::builtin;
use codegen_plugins::builtin::json_types::JsonTypesGenerator;
use codegen_plugins::{
    Engine, Generator, GeneratorContext, Loader, LoaderResources, PluginRegistry, PluginSpec,
    Shared, Source, Target,
};

fn resource_doc(description: &str, owner: &str) -> Value {
    json!({
        "components": [
            {"id": 1, "name": "Pet", "type": "object", "source": "defined", "source_doc": "petstore"}
        ],
        "resources": [
            {"id": 10, "path": "/pets/{petId}", "method": "get", "owner": owner,
             "description": description, "components": [1]}
        ]
    })
}

fn write_source(dir: &Path, name: &str, doc: &Value) -> Source {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_vec(doc).unwrap()).unwrap();
    Source::file(path.to_string_lossy()).with_format("json")
}

fn model_target() -> Target {
    Target::from_catalog(&builtin::registry().unwrap(), "model", "json").unwrap()
}

fn engine() -> Engine {
    Engine::new(builtin::registry().unwrap())
}

#[test]
fn same_identity_from_two_sources_is_one_resource() {
    let dir = tempfile::tempdir().unwrap();
    let mut sources = vec![
        write_source(dir.path(), "a.json", &resource_doc("from a", "acme")),
        write_source(dir.path(), "b.json", &resource_doc("from b", "acme")),
    ];
    let out = dir.path().join("out");

    let e = engine();
    let report = e.generate(
        &mut sources,
        &mut [model_target()],
        &out,
        None,
        &CodegenConfig::default(),
    );

    assert!(!report.has_errors(), "{:?}", report.diagnostics);
    assert!(sources.iter().all(|s| s.loaded));
    e.with_model(|m| {
        assert_eq!(m.resources.len(), 1);
        // field_union keeps the first description
        assert_eq!(m.resources.all()[0].description, "from a");
        assert_eq!(m.components.len(), 1);
        assert_eq!(m.resources.all()[0].components, vec![m.components.all()[0].id]);
    });
}

#[test]
fn supplied_resource_id_does_not_split_identity() {
    let dir = tempfile::tempdir().unwrap();
    let plain = json!({"resources": [{"id": 1, "path": "/pets", "method": "get"}]});
    let stale = json!({
        "resources": [{"id": 1, "path": "/pets", "method": "get", "resource_id": "whatever"}]
    });
    let mut sources = vec![
        write_source(dir.path(), "a.json", &plain),
        write_source(dir.path(), "b.json", &stale),
    ];

    let e = engine();
    let report = e.generate(
        &mut sources,
        &mut [],
        &dir.path().join("out"),
        None,
        &CodegenConfig::default(),
    );
    assert!(!report.has_errors(), "{:?}", report.diagnostics);
    e.with_model(|m| {
        assert_eq!(m.resources.len(), 1);
        assert_eq!(m.resources.all()[0].resource_id, "get:pets");
    });
}

#[test]
fn repeated_ids_in_one_source_stay_distinct() {
    let dir = tempfile::tempdir().unwrap();
    let doc = json!({
        "components": [
            {"id": 1, "name": "Pet", "source": "defined", "source_doc": "petstore"},
            {"id": 1, "name": "Tag", "source": "defined", "source_doc": "petstore"}
        ],
        "resources": [
            {"id": 7, "path": "/pets", "method": "get", "components": [1]},
            {"id": 7, "path": "/tags", "method": "get"}
        ]
    });
    let mut sources = vec![write_source(dir.path(), "dup.json", &doc)];

    let e = engine();
    let report = e.generate(
        &mut sources,
        &mut [],
        &dir.path().join("out"),
        None,
        &CodegenConfig::default(),
    );
    assert_eq!(report.with_code("merge.duplicate_id").count(), 2);
    e.with_model(|m| {
        assert_eq!(m.components.len(), 2);
        assert_ne!(m.components.all()[0].id, m.components.all()[1].id);
        assert_eq!(m.resources.len(), 2);
        assert_ne!(m.resources.all()[0].id, m.resources.all()[1].id);
        let pet = m.components.find_by_name("Pet").unwrap().id;
        assert_eq!(m.resources.all()[0].components, vec![pet]);
    });
}

#[test]
fn different_owner_keeps_both_resources() {
    let dir = tempfile::tempdir().unwrap();
    let mut sources = vec![
        write_source(dir.path(), "a.json", &resource_doc("from a", "acme")),
        write_source(dir.path(), "b.json", &resource_doc("from b", "globex")),
    ];

    let e = engine();
    e.generate(
        &mut sources,
        &mut [],
        &dir.path().join("out"),
        None,
        &CodegenConfig::default(),
    );
    e.with_model(|m| assert_eq!(m.resources.len(), 2));
}

#[test]
fn output_written_under_target_layout() {
    let dir = tempfile::tempdir().unwrap();
    let mut sources = vec![write_source(dir.path(), "a.json", &resource_doc("x", ""))];
    let out = dir.path().join("out");

    let mut cfg = CodegenConfig::default();
    cfg.variables.insert("file_name".into(), json!("unified.json"));

    let report = engine().generate(
        &mut sources,
        &mut [model_target()],
        &out,
        Some(&JsonTypesGenerator),
        &cfg,
    );

    let target_dir: PathBuf = out.join("model").join("json");
    assert_eq!(report.targets[0].output, target_dir);
    assert!(report.targets[0].generated);
    assert!(target_dir.join("unified.json").is_file());

    let types: Value =
        serde_json::from_slice(&fs::read(target_dir.join("types.json")).unwrap()).unwrap();
    assert_eq!(types["target"], "model-json");
}

struct FailingLoader;

impl Loader for FailingLoader {
    fn load(&self, _: &str, _: &[u8], _: &Shared) -> Result<LoaderResources> {
        anyhow::bail!("unsupported document")
    }
}

#[test]
fn failing_loader_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let mut plugins = PluginRegistry::new();
    plugins
        .register_loader(PluginSpec::new("test.failing", "Failing", "0.1.0"), Box::new(FailingLoader))
        .unwrap();
    builtin::unified_json::register(&mut plugins).unwrap();

    let e = Engine::new(plugins);
    let cfg = CodegenConfig::default();
    let shared = e.shared(&cfg);
    let mut src = write_source(dir.path(), "a.json", &resource_doc("x", ""));

    let report = e.load(&mut src, &shared, &cfg);
    assert!(report.loaded);
    assert_eq!(report.loaders, vec![builtin::unified_json::ID.to_string()]);
    let failed = report.with_code("load.failed").next().unwrap();
    assert!(failed.is_error());
    assert!(failed.message.starts_with("load error:"), "{}", failed.message);
    assert!(failed.message.contains("unsupported document"));
    assert_eq!(failed.data["loader"], "test.failing");
    e.with_model(|m| assert_eq!(m.resources.len(), 1));
}

#[test]
fn first_success_policy_stops_after_one_loader() {
    let dir = tempfile::tempdir().unwrap();
    let mut plugins = PluginRegistry::new();
    builtin::unified_json::register(&mut plugins).unwrap();
    plugins
        .register_loader(PluginSpec::new("test.failing", "Failing", "0.1.0"), Box::new(FailingLoader))
        .unwrap();

    let e = Engine::new(plugins);
    let cfg = CodegenConfig {
        loader_policy: LoaderPolicy::FirstSuccess,
        ..CodegenConfig::default()
    };
    let mut src = write_source(dir.path(), "a.json", &resource_doc("x", ""));
    let report = e.load(&mut src, &e.shared(&cfg), &cfg);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn lint_with_validate_excludes_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, b"{\"resources\": [").unwrap();
    let mut src = Source::file(path.to_string_lossy()).with_format("json");

    let e = engine();
    let lint_only = CodegenConfig {
        lint: true,
        ..CodegenConfig::default()
    };
    let report = e.load(&mut src, &e.shared(&lint_only), &lint_only);
    assert!(!report.excluded);
    assert_eq!(report.with_code("lint.failed").count(), 1);

    let validate = CodegenConfig {
        lint: true,
        validate: true,
        ..CodegenConfig::default()
    };
    let report = e.load(&mut src, &e.shared(&validate), &validate);
    assert!(report.excluded);
    assert!(!src.loaded);
    assert_eq!(report.with_code("source.excluded").count(), 1);
}

#[test]
fn missing_source_is_a_diagnostic() {
    let e = engine();
    let cfg = CodegenConfig::default();
    let mut src = Source::file("/definitely/not/here.json");
    let report = e.load(&mut src, &e.shared(&cfg), &cfg);
    assert!(!report.loaded);
    assert!(report.has_errors());
}

struct BrokenGenerator;

impl Generator for BrokenGenerator {
    fn generate(&self, _: &Path, _: &GeneratorContext) -> Result<()> {
        anyhow::bail!("template error")
    }
}

#[test]
fn failing_target_does_not_block_others() {
    let dir = tempfile::tempdir().unwrap();
    let mut sources = vec![write_source(dir.path(), "a.json", &resource_doc("x", ""))];
    let mut targets = vec![
        Target::new("broken", Box::new(BrokenGenerator)),
        model_target(),
    ];

    let report = engine().generate(
        &mut sources,
        &mut targets,
        &dir.path().join("out"),
        None,
        &CodegenConfig::default(),
    );

    assert!(!report.targets[0].generated);
    assert!(report.targets[1].generated);
    let failed: Vec<_> = report.with_code("generate.failed").collect();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].message.starts_with("generate error: broken"), "{}", failed[0].message);
}

#[test]
fn bespoke_reduces_to_workflow_resources() {
    let dir = tempfile::tempdir().unwrap();
    let doc = json!({
        "components": [
            {"id": 1, "name": "Pet", "source": "defined", "source_doc": "petstore"},
            {"id": 2, "name": "Tag", "source": "defined", "source_doc": "petstore"}
        ],
        "resources": [
            {"id": 10, "path": "/pets", "method": "get", "components": [1]},
            {"id": 11, "path": "/tags", "method": "get", "components": [2]}
        ],
        "workflows": [
            {"id": "list-pets", "steps": [
                {"id": "list", "target": {"resource": {"id": 10, "resource_id": "get:pets"}}}
            ]}
        ]
    });
    let mut sources = vec![write_source(dir.path(), "wf.json", &doc)];
    let cfg = CodegenConfig {
        bespoke_workflow: true,
        ..CodegenConfig::default()
    };

    let e = engine();
    let report = e.generate(&mut sources, &mut [], &dir.path().join("out"), None, &cfg);

    let summary = report.bespoke.unwrap();
    assert_eq!((summary.resources_before, summary.resources_after), (2, 1));
    e.with_model(|m| {
        assert_eq!(m.resources.all()[0].path, "/pets");
        assert_eq!(m.components.len(), 1);
        assert_eq!(m.components.all()[0].name, "Pet");
    });
}

#[test]
fn concurrent_loads_serialize() {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<_> = (0..8)
        .map(|i| {
            let doc = json!({
                "resources": [{"id": 1, "path": format!("/r{i}"), "method": "get"}]
            });
            write_source(dir.path(), &format!("{i}.json"), &doc)
        })
        .collect();

    let e = Arc::new(engine());
    let handles: Vec<_> = paths
        .into_iter()
        .map(|mut src| {
            let e = Arc::clone(&e);
            thread::spawn(move || {
                let cfg = CodegenConfig::default();
                let shared = e.shared(&cfg);
                e.load(&mut src, &shared, &cfg).loaded
            })
        })
        .collect();

    for h in handles {
        assert!(h.join().unwrap());
    }
    e.with_model(|m| {
        assert_eq!(m.resources.len(), 8);
        let mut ids: Vec<_> = m.resources.iter().map(|r| r.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    });
}
