use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use codegen_plugins::builtin;
use codegen_plugins::registry::PluginSummary;

use crate::output;

#[derive(Debug, Serialize)]
pub struct PluginsOut {
    pub plugins: Vec<PluginSummary>,
}

pub async fn run() -> Result<()> {
    let reg = builtin::registry()?;
    let plugins = reg.list();

    if output::is_json() {
        return output::print(&PluginsOut { plugins });
    }

    let mut out = output::stdout();
    for p in &plugins {
        writeln!(
            out,
            "{:<15} {:<24} {:<8} {}",
            p.kind.as_str(),
            p.spec.id.as_str(),
            p.spec.version,
            p.spec.supports.join(",")
        )?;
    }
    Ok(())
}
