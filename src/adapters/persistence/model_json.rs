//! Implements ModelStorePort using a JSON file.
//!
//! The artifact (fitted scaler + model bundle) is written atomically and
//! cached for the process lifetime: load hits disk once, inference reuses
//! the cached bundle without refitting.

use crate::domain::classifier::HitPredictor;
use crate::domain::DomainError;
use crate::ports::ModelStorePort;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// JSON file-based model artifact storage.
pub struct ModelJson {
    path: std::path::PathBuf,
    cache: tokio::sync::RwLock<Option<HitPredictor>>,
}

impl ModelJson {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: tokio::sync::RwLock::new(None),
        }
    }

    /// Atomic save using the write-replace pattern:
    /// 1. Write to temp file
    /// 2. sync_all() to ensure flush to disk
    /// 3. Atomic rename to target path
    async fn write_atomic(&self, json: &str) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::ModelStore(format!("create model dir: {}", e)))?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::ModelStore(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::ModelStore(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::ModelStore(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| DomainError::ModelStore(format!("atomic rename failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ModelStorePort for ModelJson {
    async fn save(&self, predictor: &HitPredictor) -> Result<(), DomainError> {
        let json = serde_json::to_string_pretty(predictor)
            .map_err(|e| DomainError::ModelStore(e.to_string()))?;
        self.write_atomic(&json).await?;
        *self.cache.write().await = Some(predictor.clone());
        info!(path = %self.path.display(), "model artifact saved");
        Ok(())
    }

    async fn load(&self) -> Result<Option<HitPredictor>, DomainError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            return Ok(Some(cached.clone()));
        }
        let json = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DomainError::ModelStore(format!("read artifact: {}", e))),
        };
        let predictor: HitPredictor = serde_json::from_str(&json)
            .map_err(|e| DomainError::ModelStore(format!("corrupt artifact: {}", e)))?;
        *self.cache.write().await = Some(predictor.clone());
        Ok(Some(predictor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::classifier::TrainingRow;

    fn trained_predictor() -> HitPredictor {
        let rows: Vec<TrainingRow> = (0..10u32)
            .map(|i| TrainingRow {
                budget: if i % 2 == 0 { 100_000_000.0 } else { 1_000_000.0 },
                release_month: (i % 12) + 1,
                revenue: if i % 2 == 0 { 300_000_000.0 } else { 500_000.0 },
            })
            .collect();
        let labels: Vec<bool> = rows.iter().map(|r| r.ratio() > 2.0).collect();
        HitPredictor::fit(&rows, &labels, 2.0, 1_700_000_000)
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelJson::new(dir.path().join("hit_predictor.json"));

        assert!(store.load().await.unwrap().is_none());

        let predictor = trained_predictor();
        store.save(&predictor).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.scaler, predictor.scaler);
        assert_eq!(loaded.model, predictor.model);
        assert_eq!(loaded.feature_names, predictor.feature_names);
    }

    #[tokio::test]
    async fn test_load_from_disk_without_prior_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hit_predictor.json");

        let writer = ModelJson::new(&path);
        writer.save(&trained_predictor()).await.unwrap();

        // A fresh instance (empty cache) reads the artifact from disk.
        let reader = ModelJson::new(&path);
        assert!(reader.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_corrupt_artifact_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hit_predictor.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let store = ModelJson::new(&path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, DomainError::ModelStore(_)));
    }
}
