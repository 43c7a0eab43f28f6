use anyhow::{bail, Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::cli::{Args, ExportFormat, ProviderKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema_version: String,
    pub root: String,
    pub provider: ProviderKind,
    pub model: String,
    /// Overrides the provider's default endpoint.
    pub api_base: Option<String>,
    pub ollama_url: String,
    /// Upper bound for every text-service call.
    pub timeout_secs: u64,
    pub temperature: f32,
    pub language: String,
    pub save_transcripts: bool,
    pub export_format: ExportFormat,
    pub page_lines: usize,
    pub page_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: "2026-10-01".into(),
            root: ".".into(),
            provider: ProviderKind::Gemini,
            model: "gemini-2.5-flash".into(),
            api_base: None,
            ollama_url: "http://localhost:11434".into(),
            timeout_secs: 120,
            temperature: 0.7,
            language: "English".into(),
            save_transcripts: false,
            export_format: ExportFormat::Pdf,
            page_lines: 48,
            page_width: 90,
        }
    }
}

impl Config {
    /// Explicit path, else `./travelbuddy.toml`, else `./travelbuddy.yaml`, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(p) = path {
            return Self::load_from_file(p).with_context(|| format!("loading config from {}", p.display()));
        }

        for candidate in ["travelbuddy.toml", "travelbuddy.yaml", "travelbuddy.yml"] {
            let p = PathBuf::from(candidate);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(cfg) => return Ok(cfg),
                    Err(e) => warn!("failed to load config from {}: {:#}", p.display(), e),
                }
            }
        }

        info!("no config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let cfg = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content).context("parsing TOML config")?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content).context("parsing YAML config")?,
            other => bail!("unsupported config format {:?} (use .toml or .yaml)", other),
        };
        info!("loaded config from {}", path.display());
        Ok(cfg)
    }

    /// Command-line flags win over file values.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(root) = &args.root {
            self.root = root.clone();
        }
        if let Some(provider) = args.provider {
            self.provider = provider;
        }
        if let Some(model) = &args.model {
            self.model = model.clone();
        }
        if let Some(language) = &args.language {
            self.language = language.clone();
        }
        if let Some(t) = args.timeout_secs {
            self.timeout_secs = t;
        }
        if let Some(format) = args.format {
            self.export_format = format;
        }
        if args.save_transcripts {
            self.save_transcripts = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    #[test]
    fn toml_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("travelbuddy.toml");
        fs::write(&p, "provider = \"openai\"\nmodel = \"gpt-4.1-mini\"\ntimeout_secs = 30\n").unwrap();
        let cfg = Config::load(Some(&p)).unwrap();
        assert_eq!(cfg.provider, ProviderKind::OpenAI);
        assert_eq!(cfg.model, "gpt-4.1-mini");
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.language, "English");
        assert_eq!(cfg.page_lines, 48);
        assert_eq!(cfg.export_format, ExportFormat::Pdf);
    }

    #[test]
    fn yaml_file() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("cfg.yaml");
        fs::write(&p, "provider: ollama\nmodel: llama3\nlanguage: Hindi\n").unwrap();
        let cfg = Config::load(Some(&p)).unwrap();
        assert_eq!(cfg.provider, ProviderKind::Ollama);
        assert_eq!(cfg.language, "Hindi");
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("cfg.ini");
        fs::write(&p, "provider=gemini").unwrap();
        assert!(Config::load(Some(&p)).is_err());
    }

    #[test]
    fn args_override_file_values() {
        let mut cfg = Config::default();
        let args = Args::try_parse_from([
            "travelbuddy", "--provider", "anthropic", "--model", "claude", "--language", "Bengali", "--timeout-secs", "5",
        ])
        .unwrap();
        cfg.apply_args(&args);
        assert_eq!(cfg.provider, ProviderKind::Anthropic);
        assert_eq!(cfg.model, "claude");
        assert_eq!(cfg.language, "Bengali");
        assert_eq!(cfg.timeout_secs, 5);
        assert!(!cfg.save_transcripts);
        assert_eq!(cfg.export_format, ExportFormat::Pdf);
    }

    #[test]
    fn export_format_from_file_and_flag() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("travelbuddy.toml");
        fs::write(&p, "export_format = \"text\"\n").unwrap();
        let mut cfg = Config::load(Some(&p)).unwrap();
        assert_eq!(cfg.export_format, ExportFormat::Text);
        cfg.apply_args(&Args::try_parse_from(["travelbuddy", "--format", "pdf"]).unwrap());
        assert_eq!(cfg.export_format, ExportFormat::Pdf);
    }
}
