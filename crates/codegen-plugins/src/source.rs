//! Sources and how their bytes are obtained.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    File,
    Url,
    /// Contents supplied inline by an API caller.
    Api,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Url => "url",
            Self::Api => "api",
        }
    }

    /// `http://` and `https://` locations are URLs, anything else a file.
    pub fn detect(location: &str) -> Self {
        if is_url(location) {
            Self::Url
        } else {
            Self::File
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Source {
    pub kind: SourceKind,
    /// Path or URL. For API sources, a label used in logs.
    pub location: String,
    /// Document format ("json", "openapi", ...) used to pick linters.
    #[serde(default)]
    pub format: String,
    /// Pre-fetched contents. Required for API sources.
    #[serde(default, skip_serializing)]
    pub contents: Option<Vec<u8>>,
    /// Set once at least one loader succeeded.
    #[serde(default)]
    pub loaded: bool,
}

impl Source {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::File,
            location: path.into(),
            ..Self::default()
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Url,
            location: url.into(),
            ..Self::default()
        }
    }

    pub fn api(label: impl Into<String>, contents: Vec<u8>) -> Self {
        Self {
            kind: SourceKind::Api,
            location: label.into(),
            contents: Some(contents),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_contents(mut self, contents: Vec<u8>) -> Self {
        self.contents = Some(contents);
        self
    }

    /// Contents, fetching them through `fetcher` unless already present.
    pub fn read(&self, fetcher: &dyn SourceFetcher) -> Result<Vec<u8>> {
        if let Some(c) = &self.contents {
            return Ok(c.clone());
        }
        match self.kind {
            SourceKind::Api => anyhow::bail!("api source {} has no contents", self.location),
            SourceKind::File | SourceKind::Url => fetcher.fetch(&self.location),
        }
    }
}

/// Fetches raw bytes for a location.
pub trait SourceFetcher: Send + Sync {
    fn fetch(&self, location: &str) -> Result<Vec<u8>>;
}

/// File-system fetcher. URLs are rejected; hosts that need them pre-fetch
/// contents or install their own fetcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFetcher;

impl SourceFetcher for FsFetcher {
    fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        if is_url(location) {
            anyhow::bail!("no network fetcher configured for {location}");
        }
        std::fs::read(Path::new(location)).with_context(|| format!("read source {location}"))
    }
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}
