use constants::assets::{FBX_SUFFIX, OBJ_SUFFIX};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Model file formats the viewer can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    Obj,
    Fbx,
}

impl ModelFormat {
    /// Pick a format by case-insensitive file-name suffix.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower.ends_with(OBJ_SUFFIX) {
            Some(Self::Obj)
        } else if lower.ends_with(FBX_SUFFIX) {
            Some(Self::Fbx)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Obj => "obj",
            Self::Fbx => "fbx",
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("unsupported model file '{0}': expected a .obj or .fbx file")]
    UnsupportedFormat(String),
    #[error("failed to parse OBJ data: {0}")]
    Obj(String),
    #[error("failed to parse FBX data: {0}")]
    Fbx(String),
    #[error("model contains no triangle geometry")]
    EmptyGeometry,
}

/// A selected model file whose format is already known to be supported.
#[derive(Debug, Clone)]
pub struct ModelFile {
    name: String,
    format: ModelFormat,
    bytes: Arc<[u8]>,
}

impl ModelFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ModelLoadError> {
        let name = name.into();
        let format = ModelFormat::from_file_name(&name)
            .ok_or_else(|| ModelLoadError::UnsupportedFormat(name.clone()))?;
        Ok(Self {
            name,
            format,
            bytes: bytes.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> ModelFormat {
        self.format
    }

    pub fn bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }
}
