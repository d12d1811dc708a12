//! Codec configuration
//!
//! Settings are read from an optional TOML file and then from `IAM_*`
//! environment variables (`IAM_BYTE_ORDER=big`, `IAM_MAPPING_MODE=sorted`,
//! `IAM_COMPRESSION=zstd`, ...). Anything not set keeps its default.

use crate::error::{Error, Result};
use crate::io::CompressionAlgorithm;
use crate::model::MappingMode;
use crate::sequence::ByteOrder;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Byte order setting; `native` follows the running platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrderSetting {
    Big,
    Little,
    #[default]
    Native,
}

impl ByteOrderSetting {
    pub fn resolve(self) -> ByteOrder {
        match self {
            ByteOrderSetting::Big => ByteOrder::Big,
            ByteOrderSetting::Little => ByteOrder::Little,
            ByteOrderSetting::Native => ByteOrder::native(),
        }
    }
}

/// Settings used when building and writing indexes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Byte order of encoded output
    pub byte_order: ByteOrderSetting,
    /// Lookup strategy of mappings built from documents
    pub mapping_mode: MappingMode,
    /// Compression of written files
    pub compression: CompressionAlgorithm,
    /// zstd level used when `compression = "zstd"`
    pub compression_level: i32,
    /// Fragment count above which an index encodes fragments in parallel
    pub parallel_threshold: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            byte_order: ByteOrderSetting::Native,
            mapping_mode: MappingMode::Hashed,
            compression: CompressionAlgorithm::None,
            compression_level: 3,
            parallel_threshold: crate::encode::index::DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl CodecConfig {
    /// Load from an optional TOML file, then `IAM_*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        builder
            .add_source(config::Environment::with_prefix("IAM").try_parsing(true))
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| Error::Config(format!("Failed to load configuration: {}", e)))
    }

    /// Parse a TOML document
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Invalid configuration: {}", e)))
    }

    /// Render as a TOML document
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to render configuration: {}", e)))
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_toml() -> Result<()> {
        let config = CodecConfig::default();
        let text = config.to_toml()?;
        assert!(text.contains("byte_order = \"native\""));
        assert!(text.contains("mapping_mode = \"hashed\""));
        assert_eq!(CodecConfig::from_toml(&text)?, config);
        Ok(())
    }

    #[test]
    fn test_partial_toml_keeps_defaults() -> Result<()> {
        let config = CodecConfig::from_toml("byte_order = \"big\"\ncompression = \"zstd\"\n")?;
        assert_eq!(config.byte_order(), ByteOrder::Big);
        assert_eq!(config.compression, CompressionAlgorithm::Zstd);
        assert_eq!(config.compression_level, 3);
        assert_eq!(config.mapping_mode, MappingMode::Hashed);
        Ok(())
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("iam_config_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("iam.toml");
        std::fs::write(&path, "mapping_mode = \"sorted\"\nparallel_threshold = 2\n")?;

        let config = CodecConfig::load(Some(&path))?;
        assert_eq!(config.mapping_mode, MappingMode::Sorted);
        assert_eq!(config.parallel_threshold, 2);

        let missing = CodecConfig::load(Some(&dir.join("missing.toml")))?;
        assert_eq!(missing.parallel_threshold, CodecConfig::default().parallel_threshold);

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_invalid_toml() {
        let err = CodecConfig::from_toml("byte_order = \"middle\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
