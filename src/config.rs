//! Configuration for the schema gate, publisher and receiver
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (ctc.toml, .ctc.toml, config/ctc.toml)
//! - XDG config directory
//! - An explicit `--config` file
//! - Environment variables (CTC__SECTION__KEY)
//!
//! ## Example config file (ctc.toml):
//! ```toml
//! [schema]
//! source = "schema/config_snapshot.fbs"
//! baseline = "schema/config_snapshot.abi.json"
//!
//! [codegen]
//! compiler = "flatc"
//!
//! [[codegen.targets]]
//! language = "ts"
//! out_dir = "packages/sdk-ts/src/gen"
//!
//! [publisher]
//! bind = "0.0.0.0:7071"
//! engine_url = "http://127.0.0.1:7070/config"
//! database = "ctc.db"
//!
//! [receiver]
//! bind = "0.0.0.0:7070"
//!
//! [logging]
//! json = false
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::codegen::{CodegenTarget, TargetLanguage};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtocolConfig {
    #[serde(default)]
    pub schema: SchemaSection,

    #[serde(default)]
    pub codegen: CodegenSection,

    #[serde(default)]
    pub publisher: PublisherSection,

    #[serde(default)]
    pub receiver: ReceiverSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// Schema source and its accepted baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSection {
    #[serde(default = "default_schema_source")]
    pub source: PathBuf,

    #[serde(default = "default_baseline")]
    pub baseline: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenSection {
    /// Schema compiler binary, looked up on PATH unless absolute
    #[serde(default = "default_compiler")]
    pub compiler: PathBuf,

    #[serde(default = "default_targets")]
    pub targets: Vec<CodegenTarget>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherSection {
    #[serde(default = "default_publisher_bind")]
    pub bind: String,

    /// Receiver endpoint payloads are POSTed to
    #[serde(default = "default_engine_url")]
    pub engine_url: String,

    /// SQLite database holding reference rows and the version counter
    #[serde(default = "default_database")]
    pub database: PathBuf,

    #[serde(default = "default_transmit_timeout_ms")]
    pub transmit_timeout_ms: u64,

    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverSection {
    #[serde(default = "default_receiver_bind")]
    pub bind: String,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

// Default value functions
fn default_schema_source() -> PathBuf {
    PathBuf::from("schema/config_snapshot.fbs")
}

fn default_baseline() -> PathBuf {
    PathBuf::from("schema/config_snapshot.abi.json")
}

fn default_compiler() -> PathBuf {
    PathBuf::from("flatc")
}

fn default_targets() -> Vec<CodegenTarget> {
    vec![
        CodegenTarget::new(TargetLanguage::Ts, "packages/sdk-ts/src/gen"),
        CodegenTarget::new(TargetLanguage::Python, "packages/sdk-py/ctc_protocol/gen"),
        CodegenTarget::new(TargetLanguage::Java, "packages/sdk-java/src/main/java"),
        CodegenTarget::new(TargetLanguage::Cpp, "packages/sdk-cpp/include"),
    ]
}

fn default_publisher_bind() -> String {
    "0.0.0.0:7071".to_string()
}

fn default_engine_url() -> String {
    "http://127.0.0.1:7070/config".to_string()
}

fn default_database() -> PathBuf {
    PathBuf::from("ctc.db")
}

fn default_transmit_timeout_ms() -> u64 {
    5_000
}

fn default_store_timeout_ms() -> u64 {
    10_000
}

fn default_receiver_bind() -> String {
    "0.0.0.0:7070".to_string()
}

fn default_max_body_bytes() -> usize {
    crate::receiver::DEFAULT_MAX_BODY_BYTES
}

impl Default for SchemaSection {
    fn default() -> Self {
        Self {
            source: default_schema_source(),
            baseline: default_baseline(),
        }
    }
}

impl Default for CodegenSection {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
            targets: default_targets(),
        }
    }
}

impl Default for PublisherSection {
    fn default() -> Self {
        Self {
            bind: default_publisher_bind(),
            engine_url: default_engine_url(),
            database: default_database(),
            transmit_timeout_ms: default_transmit_timeout_ms(),
            store_timeout_ms: default_store_timeout_ms(),
        }
    }
}

impl Default for ReceiverSection {
    fn default() -> Self {
        Self {
            bind: default_receiver_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl PublisherSection {
    pub fn transmit_timeout(&self) -> Duration {
        Duration::from_millis(self.transmit_timeout_ms)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl ProtocolConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["ctc.toml", ".ctc.toml", "config/ctc.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("dev", "ctc", "ctc") {
            let xdg_config = dirs.config_dir().join("ctc.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // CTC__PUBLISHER__ENGINE_URL=... overrides publisher.engine_url
        builder = builder.add_source(
            Environment::with_prefix("CTC")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
