//! Patcher configuration.
//!
//! Every value has a default matching the Stellaris checksum patch, so an
//! empty or missing config file is valid. Example:
//!
//! ```toml
//! [game]
//! title = "Stellaris"
//! executable = "stellaris.exe"
//! output_name = "stellaris-patched"
//!
//! [signature]
//! prefix = "48 8B 12"
//! wildcards = 14
//! suffix = "85 C0"
//! replacement = "33 C0"
//!
//! [export]
//! chunk_size = 16
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec::DEFAULT_CHUNK_SIZE;
use crate::error::{Error, Result};
use crate::signature::{HexBytes, ReplacementSuffix, Signature};

/// Which game and files to work on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Title used to look up the install directory
    pub title: String,
    /// Executable file name inside the install directory
    pub executable: String,
    /// File stem of the patched executable
    pub output_name: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "Stellaris".to_string(),
            executable: "stellaris.exe".to_string(),
            output_name: "stellaris-patched".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureConfig {
    pub prefix: HexBytes,
    pub wildcards: usize,
    pub suffix: HexBytes,
    pub replacement: HexBytes,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            prefix: HexBytes(vec![0x48, 0x8B, 0x12]),
            wildcards: 14,
            suffix: HexBytes(vec![0x85, 0xC0]),
            replacement: HexBytes(vec![0x33, 0xC0]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Bytes per line in hex dumps
    pub chunk_size: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatcherConfig {
    pub game: GameConfig,
    pub signature: SignatureConfig,
    pub export: ExportConfig,
}

impl PatcherConfig {
    /// Create a new configuration builder
    pub fn builder() -> PatcherConfigBuilder {
        PatcherConfigBuilder::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the signature and replacement fit together.
    pub fn validate(&self) -> Result<()> {
        let signature = self.signature()?;
        self.replacement().validate_for(&signature)?;
        if self.export.chunk_size == 0 {
            return Err(Error::Config("export.chunk_size must be at least 1".to_string()));
        }
        if self.game.executable.is_empty() {
            return Err(Error::Config("game.executable must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn signature(&self) -> Result<Signature> {
        Signature::new(
            self.signature.prefix.0.clone(),
            self.signature.wildcards,
            self.signature.suffix.0.clone(),
        )
    }

    pub fn replacement(&self) -> ReplacementSuffix {
        ReplacementSuffix::from(self.signature.replacement.clone())
    }

    /// File name of the patched executable, keeping the source extension.
    pub fn output_file_name(&self) -> String {
        match Path::new(&self.game.executable).extension() {
            Some(ext) => format!("{}.{}", self.game.output_name, ext.to_string_lossy()),
            None => self.game.output_name.clone(),
        }
    }
}

/// Builder for PatcherConfig
#[derive(Debug, Clone, Default)]
pub struct PatcherConfigBuilder {
    title: Option<String>,
    executable: Option<String>,
    output_name: Option<String>,
    signature: Option<Signature>,
    replacement: Option<Vec<u8>>,
    chunk_size: Option<usize>,
}

impl PatcherConfigBuilder {
    pub fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn executable<S: Into<String>>(mut self, executable: S) -> Self {
        self.executable = Some(executable.into());
        self
    }

    /// Set the file stem of the patched executable
    pub fn output_name<S: Into<String>>(mut self, output_name: S) -> Self {
        self.output_name = Some(output_name.into());
        self
    }

    pub fn signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn replacement(mut self, replacement: Vec<u8>) -> Self {
        self.replacement = Some(replacement);
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<PatcherConfig> {
        let default = PatcherConfig::default();

        let signature = match self.signature {
            Some(sig) => SignatureConfig {
                prefix: HexBytes(sig.prefix().to_vec()),
                wildcards: sig.wildcard_count(),
                suffix: HexBytes(sig.suffix().to_vec()),
                replacement: default.signature.replacement.clone(),
            },
            None => default.signature,
        };

        let replacement = self
            .replacement
            .map(HexBytes)
            .unwrap_or_else(|| signature.replacement.clone());

        let config = PatcherConfig {
            game: GameConfig {
                title: self.title.unwrap_or(default.game.title),
                executable: self.executable.unwrap_or(default.game.executable),
                output_name: self.output_name.unwrap_or(default.game.output_name),
            },
            signature: SignatureConfig {
                replacement,
                ..signature
            },
            export: ExportConfig {
                chunk_size: self.chunk_size.unwrap_or(default.export.chunk_size),
            },
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_is_valid() {
        let config = PatcherConfig::default();
        config.validate().unwrap();
        let sig = config.signature().unwrap();
        assert_eq!(sig.prefix(), &[0x48, 0x8B, 0x12]);
        assert_eq!(sig.wildcard_count(), 14);
        assert_eq!(sig.suffix(), &[0x85, 0xC0]);
        assert_eq!(config.replacement().as_slice(), &[0x33, 0xC0]);
        assert_eq!(config.output_file_name(), "stellaris-patched.exe");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = PatcherConfig::from_toml_str("").unwrap();
        assert_eq!(config, PatcherConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = PatcherConfig::from_toml_str(
            r#"
            [game]
            executable = "game.bin"

            [signature]
            prefix = "0F 1F"
            wildcards = 2
            suffix = "74 05"
            replacement = "EB 05"
            "#,
        )
        .unwrap();

        assert_eq!(config.game.title, "Stellaris");
        assert_eq!(config.game.executable, "game.bin");
        assert_eq!(config.output_file_name(), "stellaris-patched.bin");
        assert_eq!(config.signature.prefix.0, vec![0x0F, 0x1F]);
        assert_eq!(config.replacement().as_slice(), &[0xEB, 0x05]);
        assert_eq!(config.export.chunk_size, 16);
    }

    #[test]
    fn test_mismatched_replacement_rejected() {
        let err = PatcherConfig::from_toml_str(
            r#"
            [signature]
            replacement = "33"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::ReplacementLength { .. }));
    }

    #[test]
    fn test_bad_hex_rejected() {
        let err = PatcherConfig::from_toml_str(
            r#"
            [signature]
            prefix = "48 ZZ"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let err = PatcherConfig::from_toml_str("[export]\nchunk_size = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "[game]\noutput_name = \"patched\"\n").unwrap();
        let config = PatcherConfig::load(file.path()).unwrap();
        assert_eq!(config.output_file_name(), "patched.exe");
    }

    #[test]
    fn test_toml_roundtrip_keeps_hex_strings() {
        let text = toml::to_string(&PatcherConfig::default()).unwrap();
        assert!(text.contains("prefix = \"48 8B 12\""));
        assert_eq!(
            PatcherConfig::from_toml_str(&text).unwrap(),
            PatcherConfig::default()
        );
    }

    #[test]
    fn test_builder() {
        let sig = Signature::from_pattern("90 ?? ?? C3").unwrap();
        let config = PatcherConfig::builder()
            .title("Other Game")
            .executable("other.exe")
            .output_name("other-patched")
            .signature(sig)
            .replacement(vec![0xCC])
            .chunk_size(32)
            .build()
            .unwrap();

        assert_eq!(config.game.title, "Other Game");
        assert_eq!(config.signature.wildcards, 2);
        assert_eq!(config.replacement().as_slice(), &[0xCC]);
        assert_eq!(config.export.chunk_size, 32);
        assert_eq!(config.output_file_name(), "other-patched.exe");
    }

    #[test]
    fn test_builder_rejects_mismatched_replacement() {
        let sig = Signature::from_pattern("90 ?? ?? C3").unwrap();
        let result = PatcherConfig::builder().signature(sig).build();
        assert!(matches!(result, Err(Error::ReplacementLength { .. })));
    }
}
