use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use codegen_core::diagnostics::{Diagnostic, DiagnosticLevel};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing_subscriber::EnvFilter;

static JSON_MODE: AtomicBool = AtomicBool::new(false);

/// Set the output mode and install the log subscriber. Logs go to stderr;
/// `RUST_LOG` overrides the default `info` filter.
pub fn init(json: bool) {
    JSON_MODE.store(json, Ordering::Relaxed);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

pub fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    println!("{s}");
    Ok(())
}

/// Spinner on stderr. Hidden in JSON mode so stdout stays parseable.
pub fn spinner() -> ProgressBar {
    if is_json() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn stdout() -> StandardStream {
    StandardStream::stdout(ColorChoice::Auto)
}

/// One colored line per diagnostic.
pub fn print_diagnostics(diagnostics: &[Diagnostic]) -> io::Result<()> {
    let mut out = stdout();
    for d in diagnostics {
        let (label, color) = match d.level {
            DiagnosticLevel::Info => ("info", Color::Cyan),
            DiagnosticLevel::Warning => ("warning", Color::Yellow),
            DiagnosticLevel::Error => ("error", Color::Red),
        };
        out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(out, "{label}")?;
        out.reset()?;
        write!(out, " [{}] {}", d.code, d.message)?;
        for (k, v) in &d.data {
            write!(out, " {k}={v}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn status(ok: bool, msg: &str) -> io::Result<()> {
    let mut out = stdout();
    let color = if ok { Color::Green } else { Color::Red };
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{}", if ok { "ok" } else { "failed" })?;
    out.reset()?;
    writeln!(out, " {msg}")
}
