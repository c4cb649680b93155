//! # Configuration Utilities
//!
//! TOML configuration loading and the batch job file format.
//!
//! ```toml
//! [batch]
//! name = "nightly"
//! workers = 4
//! bit_width = 1
//! metrics_output = "metrics/nightly.json"
//!
//! [[jobs]]
//! kind = "encode"
//! input = "cover.png"
//! output = "stego.png"
//! message = "hello"
//! bit_width = 2
//!
//! [[jobs]]
//! kind = "decode"
//! input = "stego.png"
//! bit_width = 2
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::processing::grid::BitWidth;

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Example
/// ```ignore
/// let config: BatchConfig = load_config("batches/nightly.toml")?;
/// ```
pub fn load_config<T>(path: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read config file {}", path))?;
    let config: T =
        toml::from_str(&content).with_context(|| format!("failed to parse config file {}", path))?;
    Ok(config)
}

/// A whole batch file: settings plus the list of jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub batch: BatchSettings,
    #[serde(default)]
    pub jobs: Vec<JobSpec>,
}

impl BatchConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let config: BatchConfig = load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch.workers == 0 {
            anyhow::bail!("batch.workers must be at least 1");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Label used in logs and the metrics file
    #[serde(default = "default_batch_name")]
    pub name: String,
    /// Maximum number of jobs processed concurrently
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Bit width for jobs that don't set their own
    #[serde(default)]
    pub bit_width: BitWidth,
    /// Where to write the metrics JSON, if anywhere
    #[serde(default)]
    pub metrics_output: Option<String>,
}

fn default_batch_name() -> String {
    "batch".to_string()
}

fn default_workers() -> usize {
    4
}

/// One unit of batch work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum JobSpec {
    Encode {
        input: String,
        output: String,
        message: String,
        #[serde(default)]
        bit_width: Option<BitWidth>,
    },
    Decode {
        input: String,
        #[serde(default)]
        bit_width: Option<BitWidth>,
    },
    Info {
        input: String,
        #[serde(default)]
        bit_width: Option<BitWidth>,
    },
}

impl JobSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            JobSpec::Encode { .. } => "encode",
            JobSpec::Decode { .. } => "decode",
            JobSpec::Info { .. } => "info",
        }
    }

    pub fn input(&self) -> &str {
        match self {
            JobSpec::Encode { input, .. }
            | JobSpec::Decode { input, .. }
            | JobSpec::Info { input, .. } => input,
        }
    }

    /// The job's own bit width, or `default` when it has none.
    pub fn bit_width_or(&self, default: BitWidth) -> BitWidth {
        let own = match self {
            JobSpec::Encode { bit_width, .. }
            | JobSpec::Decode { bit_width, .. }
            | JobSpec::Info { bit_width, .. } => *bit_width,
        };
        own.unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [batch]
        name = "test"
        workers = 2
        bit_width = 3

        [[jobs]]
        kind = "encode"
        input = "a.png"
        output = "b.png"
        message = "hi"

        [[jobs]]
        kind = "decode"
        input = "b.png"
        bit_width = 1

        [[jobs]]
        kind = "info"
        input = "a.png"
    "#;

    #[test]
    fn test_parse_batch_file() {
        let config: BatchConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.batch.name, "test");
        assert_eq!(config.batch.workers, 2);
        assert_eq!(config.jobs.len(), 3);
        assert_eq!(config.jobs[0].kind(), "encode");
        assert_eq!(config.jobs[1].input(), "b.png");

        let default = config.batch.bit_width;
        assert_eq!(default.get(), 3);
        assert_eq!(config.jobs[0].bit_width_or(default).get(), 3);
        assert_eq!(config.jobs[1].bit_width_or(default).get(), 1);
        assert!(config.batch.metrics_output.is_none());
    }

    #[test]
    fn test_defaults() {
        let config: BatchConfig = toml::from_str("[batch]\n").unwrap();
        assert_eq!(config.batch.workers, 4);
        assert_eq!(config.batch.bit_width.get(), 1);
        assert!(config.jobs.is_empty());
    }

    #[test]
    fn test_rejects_bad_bit_width() {
        let bad = "[batch]\nbit_width = 6\n";
        assert!(toml::from_str::<BatchConfig>(bad).is_err());
    }

    #[test]
    fn test_rejects_zero_workers() {
        let config: BatchConfig = toml::from_str("[batch]\nworkers = 0\n").unwrap();
        assert!(config.validate().is_err());
    }
}
