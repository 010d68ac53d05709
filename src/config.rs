//! Runtime configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub filenames: FilenameConfig,
    #[serde(default)]
    pub work_split: WorkSplitConfig,
    #[serde(default)]
    pub evidence: EvidenceConfig,
}

/// Where the status documents and input artifacts live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root directory holding the JSON status documents and generated pages
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// Directory of working draft files (filename/page checks)
    #[serde(default = "default_drafts_dir")]
    pub drafts_dir: PathBuf,

    /// Pricing spreadsheet (work-split calculation)
    #[serde(default = "default_pricing_sheet")]
    pub pricing_sheet: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Dispatcher HTTP port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Filename convention rules for the drafts directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilenameConfig {
    /// A file is allowed if its name matches at least one pattern
    /// (case-insensitive regular expressions)
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,
}

/// Work-split contractor grouping and compliance threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkSplitConfig {
    /// Substrings identifying the prime contractor
    #[serde(default = "default_primary_tokens")]
    pub primary_tokens: Vec<String>,

    /// Substrings identifying the subcontractor group
    #[serde(default = "default_secondary_tokens")]
    pub secondary_tokens: Vec<String>,

    /// Minimum prime-contractor percentage for a passing split
    #[serde(default = "default_threshold_pct")]
    pub threshold_pct: f64,
}

/// Evidence proof-chain check settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceConfig {
    /// Identifier of the dependency record carrying the evidence items
    #[serde(default = "default_dependency_id")]
    pub dependency_id: String,
}

// Defaults
fn default_root_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_drafts_dir() -> PathBuf {
    PathBuf::from("working_drafts")
}
fn default_pricing_sheet() -> PathBuf {
    PathBuf::from("RPRTech_Schedule B.xlsx")
}
fn default_port() -> u16 {
    8765
}
fn default_patterns() -> Vec<String> {
    vec![
        r"^vol1_technical_.*\.(md|docx|pdf)$".to_string(),
        r"^vol2_pastperf_.*\.(md|docx|pdf)$".to_string(),
        r"^RPRTech_Phase I-.*\.(pdf|xlsx)$".to_string(),
    ]
}
fn default_primary_tokens() -> Vec<String> {
    vec!["rpr".to_string()]
}
fn default_secondary_tokens() -> Vec<String> {
    vec!["movius".to_string(), "sub".to_string()]
}
fn default_threshold_pct() -> f64 {
    50.01
}
fn default_dependency_id() -> String {
    "movius_003".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            drafts_dir: default_drafts_dir(),
            pricing_sheet: default_pricing_sheet(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for FilenameConfig {
    fn default() -> Self {
        Self {
            patterns: default_patterns(),
        }
    }
}

impl Default for WorkSplitConfig {
    fn default() -> Self {
        Self {
            primary_tokens: default_primary_tokens(),
            secondary_tokens: default_secondary_tokens(),
            threshold_pct: default_threshold_pct(),
        }
    }
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            dependency_id: default_dependency_id(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            server: ServerConfig::default(),
            filenames: FilenameConfig::default(),
            work_split: WorkSplitConfig::default(),
            evidence: EvidenceConfig::default(),
        }
    }
}

impl Config {
    /// Root directory holding status documents and generated pages.
    pub fn root_dir(&self) -> &Path {
        &self.paths.root_dir
    }

    /// Drafts directory, resolved against the root when relative.
    pub fn drafts_dir(&self) -> PathBuf {
        resolve(&self.paths.root_dir, &self.paths.drafts_dir)
    }

    /// Pricing spreadsheet path, resolved against the root when relative.
    pub fn pricing_sheet(&self) -> PathBuf {
        resolve(&self.paths.root_dir, &self.paths.pricing_sheet)
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").expect("valid TOML");
        assert_eq!(config.server.port, 8765);
        assert_eq!(config.work_split.threshold_pct, 50.01);
        assert_eq!(config.evidence.dependency_id, "movius_003");
        assert_eq!(config.filenames.patterns.len(), 3);
    }

    #[test]
    fn test_partial_config_overrides() {
        let config: Config = toml::from_str(
            r#"
[paths]
root_dir = "/srv/proposal"

[server]
port = 9000
"#,
        )
        .expect("valid TOML");
        assert_eq!(config.paths.root_dir, PathBuf::from("/srv/proposal"));
        assert_eq!(config.server.port, 9000);
        // Untouched sections keep their defaults
        assert_eq!(config.paths.drafts_dir, PathBuf::from("working_drafts"));
        assert_eq!(config.work_split.primary_tokens, vec!["rpr".to_string()]);
    }

    #[test]
    fn test_relative_paths_resolve_against_root() {
        let mut config = Config::default();
        config.paths.root_dir = PathBuf::from("/srv/proposal");
        assert_eq!(
            config.drafts_dir(),
            PathBuf::from("/srv/proposal/working_drafts")
        );

        config.paths.drafts_dir = PathBuf::from("/elsewhere/drafts");
        assert_eq!(config.drafts_dir(), PathBuf::from("/elsewhere/drafts"));
    }
}
