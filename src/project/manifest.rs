use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compiler::semantics::{Module, SymbolTable};

/// Errors raised while reading or writing a manifest.
#[derive(Debug)]
pub enum ManifestError {
    Yaml(serde_yaml::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestError::Yaml(e) => f.write_fmt(format_args!("{}", e)),
            ManifestError::Json(e) => f.write_fmt(format_args!("{}", e)),
        }
    }
}

impl std::error::Error for ManifestError {}

impl From<serde_yaml::Error> for ManifestError {
    fn from(e: serde_yaml::Error) -> Self {
        ManifestError::Yaml(e)
    }
}

impl From<serde_json::Error> for ManifestError {
    fn from(e: serde_json::Error) -> Self {
        ManifestError::Json(e)
    }
}

/// The format a manifest file is written in, chosen by its extension.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Format {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// A snapshot of every constant and module known at the end of a compilation.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Manifest {
    constants: BTreeMap<String, String>,
    modules: Vec<Module>,
}

impl Manifest {
    pub fn extract(symbols: &SymbolTable) -> Manifest {
        let constants = symbols
            .constants()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        Manifest {
            constants,
            modules: symbols.modules().into(),
        }
    }

    pub fn constants(&self) -> &BTreeMap<String, String> {
        &self.constants
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Loads a manifest from the given YAML reader.
    pub fn read<R: std::io::Read>(reader: R) -> Result<Manifest, ManifestError> {
        let manifest: Manifest = serde_yaml::from_reader(reader)?;
        Ok(manifest)
    }

    /// Writes the manifest in the given format
    pub fn write<W: std::io::Write>(&self, writer: W, format: Format) -> Result<(), ManifestError> {
        match format {
            Format::Yaml => serde_yaml::to_writer(writer, self)?,
            Format::Json => serde_json::to_writer_pretty(writer, self)?,
        }
        Ok(())
    }
}
