use crate::types::ProcessedBill;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Bump whenever segmentation output changes for the same input and config
pub const PROCESSING_VERSION: &str = "1.0.0";

/// Identifies one processed bill: which file, which bytes, which config
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SectionsCacheKey {
    /// Slug of the input file stem, carried into `metadata.bill_id`
    pub bill_id: String,
    pub input_hash: String,
    pub config_hash: String,
    pub billparse_version: String,
    pub processing_version: String,
}

impl SectionsCacheKey {
    pub fn new(bill_id: &str, input_bytes: &[u8], config_hash: &str) -> Self {
        Self {
            bill_id: bill_id.to_string(),
            input_hash: calculate_input_hash(input_bytes),
            config_hash: config_hash.to_string(),
            billparse_version: env!("CARGO_PKG_VERSION").to_string(),
            processing_version: PROCESSING_VERSION.to_string(),
        }
    }

    /// `<bill_id>-<sha256 of the whole key>.json`
    pub fn file_name(&self) -> String {
        let mut hasher = Sha256::new();
        for part in [
            &self.bill_id,
            &self.input_hash,
            &self.config_hash,
            &self.billparse_version,
            &self.processing_version,
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        format!("{}-{:x}.json", self.bill_id, hasher.finalize())
    }
}

/// A stored bill and when it was computed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionsCacheValue {
    pub bill: ProcessedBill,
    pub created_at: DateTime<Utc>,
    pub processing_time_ms: u64,
}

impl SectionsCacheValue {
    pub fn new(bill: ProcessedBill, processing_time_ms: u64) -> Self {
        Self {
            bill,
            created_at: Utc::now(),
            processing_time_ms,
        }
    }
}

/// Storage abstraction for caching processing results
pub trait DocumentStorage {
    fn get_sections_output(&self, cache_key: &SectionsCacheKey) -> Result<Option<SectionsCacheValue>>;
    fn store_sections_output(&self, cache_key: &SectionsCacheKey, cache_value: &SectionsCacheValue) -> Result<()>;
}

/// File-based storage implementation using local cache directory
pub struct FileStorage {
    cache_dir: PathBuf,
}

impl FileStorage {
    pub fn new(cache_dir: impl AsRef<Path>) -> Result<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();
        fs::create_dir_all(cache_dir.join("sections"))
            .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;

        Ok(Self { cache_dir })
    }

    fn sections_path(&self, cache_key: &SectionsCacheKey) -> PathBuf {
        self.cache_dir
            .join("sections")
            .join(cache_key.file_name())
    }
}

impl DocumentStorage for FileStorage {
    fn get_sections_output(&self, cache_key: &SectionsCacheKey) -> Result<Option<SectionsCacheValue>> {
        let path = self.sections_path(cache_key);
        if path.exists() {
            let json_str = fs::read_to_string(&path)?;
            let cache_value: SectionsCacheValue = serde_json::from_str(&json_str)
                .map_err(|e| anyhow!("Failed to deserialize cached sections: {}", e))?;
            Ok(Some(cache_value))
        } else {
            Ok(None)
        }
    }

    fn store_sections_output(&self, cache_key: &SectionsCacheKey, cache_value: &SectionsCacheValue) -> Result<()> {
        let path = self.sections_path(cache_key);
        let json_str = serde_json::to_string_pretty(cache_value)
            .map_err(|e| anyhow!("Failed to serialize sections cache entry: {}", e))?;
        fs::write(&path, json_str)
            .with_context(|| format!("Failed to write cache entry {}", path.display()))?;
        Ok(())
    }
}

/// Hash of the complete input file
pub fn calculate_input_hash(input_bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input_bytes);
    format!("{:x}", hasher.finalize())
}

/// Calculate hash for configuration data (for the cache key)
pub fn calculate_config_hash<T: serde::Serialize>(config: &T) -> Result<String> {
    let config_json = serde_json::to_string(config)
        .map_err(|e| anyhow!("Failed to serialize config for hashing: {}", e))?;

    let mut hasher = Sha256::new();
    hasher.update(config_json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// No-op storage implementation that disables all caching
pub struct NoOpStorage;

impl Default for NoOpStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl NoOpStorage {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentStorage for NoOpStorage {
    fn get_sections_output(&self, _cache_key: &SectionsCacheKey) -> Result<Option<SectionsCacheValue>> {
        Ok(None) // Always cache miss
    }

    fn store_sections_output(&self, _cache_key: &SectionsCacheKey, _cache_value: &SectionsCacheValue) -> Result<()> {
        Ok(()) // No-op
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParsingConfig;
    use crate::types::*;

    fn key(bill_id: &str, config_hash: &str) -> SectionsCacheKey {
        SectionsCacheKey::new(bill_id, b"{\"texts\": []}", config_hash)
    }

    fn bill() -> ProcessedBill {
        ProcessedBill {
            metadata: DocumentMetadata {
                bill_id: Some("sample".to_string()),
                ..DocumentMetadata::default()
            },
            profile: StructureProfile {
                indentation_levels: vec![72.0, 90.0],
                base_margin: 72.0,
                header_y_threshold: 800.0,
                centered_threshold: 81.0,
            },
            document: BillDocument {
                sections: vec![Section {
                    id: "1-short-title".to_string(),
                    index: 1,
                    title: "Short title".to_string(),
                    raw_text: "This Act may be cited as...".to_string(),
                }],
            },
        }
    }

    #[test]
    fn test_input_hash_consistency() {
        let data = b"{\"texts\": []}";
        assert_eq!(calculate_input_hash(data), calculate_input_hash(data));
        assert_ne!(calculate_input_hash(b"{\"texts\": [1]}"), calculate_input_hash(data));
    }

    #[test]
    fn test_input_hash_covers_the_middle() {
        // Same size, same first and last KB, different middle byte
        let mut a = vec![b'x'; 4096];
        let b = a.clone();
        a[2048] = b'y';
        assert_ne!(calculate_input_hash(&a), calculate_input_hash(&b));
    }

    #[test]
    fn test_config_hash_tracks_config_changes() {
        let default_hash = calculate_config_hash(&ParsingConfig::default()).unwrap();
        let mut changed = ParsingConfig::default();
        changed.boundary.candidate_levels = 2;
        assert_ne!(default_hash, calculate_config_hash(&changed).unwrap());
        assert_eq!(default_hash, calculate_config_hash(&ParsingConfig::default()).unwrap());
    }

    #[test]
    fn test_cache_file_name_tracks_every_component() {
        let base = key("bill-a", "config");
        assert_eq!(base.file_name(), key("bill-a", "config").file_name());
        assert!(base.file_name().starts_with("bill-a-"));
        assert!(base.file_name().ends_with(".json"));

        assert_ne!(base.file_name(), key("bill-b", "config").file_name());
        assert_ne!(base.file_name(), key("bill-a", "config2").file_name());
        assert_ne!(
            base.file_name(),
            SectionsCacheKey::new("bill-a", b"{}", "config").file_name()
        );

        let mut bumped = base.clone();
        bumped.processing_version = "2.0.0".to_string();
        assert_ne!(base.file_name(), bumped.file_name());
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let temp_dir = std::env::temp_dir().join("billparse_test_cache");
        let storage = FileStorage::new(&temp_dir).unwrap();
        let key = key("sample", "config");

        assert!(storage.get_sections_output(&key).unwrap().is_none());
        storage
            .store_sections_output(&key, &SectionsCacheValue::new(bill(), 12))
            .unwrap();
        let cached = storage.get_sections_output(&key).unwrap().unwrap();
        assert_eq!(cached.bill, bill());
        assert_eq!(cached.processing_time_ms, 12);

        // Clean up
        std::fs::remove_dir_all(temp_dir).ok();
    }

    #[test]
    fn test_noop_storage_never_hits() {
        let storage = NoOpStorage::new();
        let key = key("sample", "config");
        storage
            .store_sections_output(&key, &SectionsCacheValue::new(bill(), 1))
            .unwrap();
        assert!(storage.get_sections_output(&key).unwrap().is_none());
    }
}
