use crate::audit::{default_clusters, ClusterSpec};
use crate::error::{CapnormError, Result};
use crate::paths;
use crate::seed::Vocabulary;
use crate::store::DEFAULT_TABLE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(paths::DEFAULT_STORE_PATH)
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            table: default_table(),
        }
    }
}

// ---------------------------------------------------------------------------
// SeedConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default = "default_seed_path")]
    pub path: PathBuf,
    /// Overrides the built-in label list when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<Vec<String>>,
}

fn default_seed_path() -> PathBuf {
    PathBuf::from(paths::DEFAULT_SEED_PATH)
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            path: default_seed_path(),
            vocabulary: None,
        }
    }
}

impl SeedConfig {
    pub fn vocabulary(&self) -> Result<Vocabulary> {
        match &self.vocabulary {
            Some(labels) => Vocabulary::new(labels.iter().cloned()),
            None => Vocabulary::builtin(),
        }
    }
}

// ---------------------------------------------------------------------------
// AuditConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_audit_base")]
    pub base_path: PathBuf,
    #[serde(default = "default_clusters")]
    pub clusters: Vec<ClusterSpec>,
}

fn default_audit_base() -> PathBuf {
    PathBuf::from(paths::DEFAULT_AUDIT_BASE)
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            base_path: default_audit_base(),
            clusters: default_clusters(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            store: StoreConfig::default(),
            seed: SeedConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(CapnormError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Like [`Config::load`], but an uninitialized project gets defaults.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(CapnormError::NotInitialized) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn store_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.store.path)
    }

    pub fn seed_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.seed.path)
    }

    pub fn audit_base(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.audit.base_path)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.store.path.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "store.path is empty".to_string(),
            });
        }
        if let Err(e) = paths::validate_table_name(&self.store.table) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: e.to_string(),
            });
        }

        if self.seed.path.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "seed.path is empty".to_string(),
            });
        }
        match self.seed.vocabulary() {
            Ok(vocab) => {
                for (inner, outer) in vocab.overlaps() {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: format!(
                            "label '{inner}' is a substring of '{outer}' (safe for quoted literals only)"
                        ),
                    });
                }
            }
            Err(e) => warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("seed.vocabulary: {e}"),
            }),
        }

        if self.audit.clusters.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "audit.clusters is empty; the audit will pass trivially".to_string(),
            });
        }
        for cluster in &self.audit.clusters {
            if !cluster.perms_are_octal() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "cluster '{}' has perms={} which is not an octal mode",
                        cluster.name, cluster.perms
                    ),
                });
            }
            if cluster.path.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("cluster '{}' has an empty path", cluster.name),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
