use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use fs_err as fs;
use serde_json::{json, to_string_pretty};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::provider::{DynProvider, Provider};

/// Stderr subscriber; `RUST_LOG` wins over the verbosity flag.
pub fn init_tracing(verbose: bool) {
    let level = if verbose { "travelbuddy=debug" } else { "travelbuddy=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_env_filter(filter)
        .try_init();
}

pub fn session_dir(root: &Path, session: Uuid) -> PathBuf {
    root.join(".travelbuddy").join("sessions").join(session.to_string())
}

/// Provider wrapper that saves every exchange as `<seq>.json` in `dir`.
pub struct RecordingProvider {
    inner: DynProvider,
    dir: PathBuf,
    seq: AtomicU64,
}

impl RecordingProvider {
    pub fn new(inner: DynProvider, dir: PathBuf) -> Self {
        Self { inner, dir, seq: AtomicU64::new(1) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn save(&self, seq: u64, prompt: &str, outcome: &Result<String>) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let mut record = json!({
            "seq": seq,
            "timestamp": Utc::now().to_rfc3339(),
            "prompt": prompt,
        });
        match outcome {
            Ok(text) => record["response"] = json!(text),
            Err(e) => record["error"] = json!(format!("{e:#}")),
        }
        let path = self.dir.join(format!("{seq:04}.json"));
        fs::write(&path, to_string_pretty(&record)?)?;
        Ok(path)
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        let outcome = self.inner.generate(prompt).await;
        match self.save(seq, prompt, &outcome) {
            Ok(p) => debug!(path = %p.display(), "transcript saved"),
            Err(e) => warn!(error = %e, "could not save transcript"),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ScriptedProvider;
    use std::sync::Arc;

    #[tokio::test]
    async fn records_answers_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        let session = Uuid::new_v4();
        let inner = Arc::new(ScriptedProvider::new(vec![Ok("sunny".to_string()), Err("quota".to_string())]));
        let rec = RecordingProvider::new(inner, session_dir(dir.path(), session));

        assert_eq!(rec.generate("weather?").await.unwrap(), "sunny");
        assert!(rec.generate("again?").await.is_err());

        let first: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(rec.dir().join("0001.json")).unwrap()).unwrap();
        assert_eq!(first["prompt"], "weather?");
        assert_eq!(first["response"], "sunny");
        let second: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(rec.dir().join("0002.json")).unwrap()).unwrap();
        assert!(second["error"].as_str().unwrap().contains("quota"));
        assert!(rec.dir().ends_with(Path::new(".travelbuddy/sessions").join(session.to_string())));
    }

    #[tokio::test]
    async fn unwritable_dir_does_not_fail_the_call() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let rec = RecordingProvider::new(Arc::new(ScriptedProvider::answering(["ok"])), blocker.join("sub"));
        assert_eq!(rec.generate("hi").await.unwrap(), "ok");
    }
}
