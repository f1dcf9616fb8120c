//! 模拟器配置
//!
//! 优先级（从高到低）：
//! 1. 命令行参数（由调用方通过 `with_*` 覆盖）
//! 2. 环境变量 `SIM_ENTRY_POINT`、`SIM_TIMEOUT_MS`
//! 3. TOML 配置文件
//! 4. 内置默认值
//!
//! # 配置文件格式
//!
//! ```toml
//! entry_point = 0x1000
//! timeout_ms = 5000
//! shared_id = "shared"
//! source_name = "prog.s"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asm::DEFAULT_ENTRY_POINT;
use crate::isa::parse_unsigned;

/// 入口地址环境变量
pub const ENV_ENTRY_POINT: &str = "SIM_ENTRY_POINT";

/// RUN 时限环境变量（毫秒）
pub const ENV_TIMEOUT_MS: &str = "SIM_TIMEOUT_MS";

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid {name}({value})")]
    InvalidEnv { name: &'static str, value: String },
}

/// 模拟器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// 程序入口地址（装载时按 4 字节规整）
    pub entry_point: u32,
    /// RUN 时限（毫秒）
    pub timeout_ms: u64,
    /// 共享实例的标识
    pub shared_id: String,
    /// 诊断中使用的源名称，缺省为文件路径
    pub source_name: Option<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            entry_point: DEFAULT_ENTRY_POINT,
            timeout_ms: 5000,
            shared_id: "shared".to_string(),
            source_name: None,
        }
    }
}

impl SimConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry_point(mut self, entry: u32) -> Self {
        self.entry_point = entry;
        self
    }

    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    pub fn with_shared_id(mut self, id: impl Into<String>) -> Self {
        self.shared_id = id.into();
        self
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// 读取 TOML 配置文件
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// 默认值 + 可选配置文件 + 环境变量
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// 应用进程环境变量
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// 按给定的查找函数应用覆盖
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_ENTRY_POINT) {
            self.entry_point = parse_env_u32(ENV_ENTRY_POINT, &value)?;
            log::info!("using {ENV_ENTRY_POINT} from environment: {value}");
        }
        if let Some(value) = lookup(ENV_TIMEOUT_MS) {
            self.timeout_ms = parse_unsigned(value.trim()).ok_or_else(|| ConfigError::InvalidEnv {
                name: ENV_TIMEOUT_MS,
                value: value.clone(),
            })?;
            log::info!("using {ENV_TIMEOUT_MS} from environment: {value}");
        }
        Ok(())
    }
}

fn parse_env_u32(name: &'static str, value: &str) -> Result<u32, ConfigError> {
    parse_unsigned(value.trim())
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| ConfigError::InvalidEnv {
            name,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.entry_point, 0x1000);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.shared_id, "shared");
        assert_eq!(config.source_name, None);
    }

    #[test]
    fn test_builder_overrides() {
        let config = SimConfig::new()
            .with_entry_point(0x2000)
            .with_timeout_ms(10)
            .with_shared_id("s")
            .with_source_name("p.s");
        assert_eq!(config.entry_point, 0x2000);
        assert_eq!(config.timeout_ms, 10);
        assert_eq!(config.shared_id, "s");
        assert_eq!(config.source_name.as_deref(), Some("p.s"));
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().expect("临时文件");
        writeln!(file, "entry_point = 0x4000\ntimeout_ms = 250").expect("写入");

        let config = SimConfig::load_from_file(file.path()).expect("可解析");
        assert_eq!(config.entry_point, 0x4000);
        assert_eq!(config.timeout_ms, 250);
        // 未给出的字段取默认值
        assert_eq!(config.shared_id, "shared");
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().expect("临时目录");
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            SimConfig::load_from_file(&missing),
            Err(ConfigError::Io { .. })
        ));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "entry_point = \"x\"").expect("写入");
        assert!(matches!(
            SimConfig::load_from_file(&bad),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SimConfig::default();
        config
            .apply_overrides(|name| match name {
                ENV_ENTRY_POINT => Some("0x8000".into()),
                ENV_TIMEOUT_MS => Some("100".into()),
                _ => None,
            })
            .expect("合法");
        assert_eq!(config.entry_point, 0x8000);
        assert_eq!(config.timeout_ms, 100);

        let err = config
            .apply_overrides(|name| (name == ENV_ENTRY_POINT).then(|| "0x1_0000_0000".into()))
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid SIM_ENTRY_POINT(0x1_0000_0000)");
        assert_eq!(config.entry_point, 0x8000);
    }

    #[test]
    fn test_round_trip_toml() {
        let config = SimConfig::new().with_source_name("a.s");
        let text = toml::to_string(&config).expect("序列化");
        let back: SimConfig = toml::from_str(&text).expect("反序列化");
        assert_eq!(back, config);
    }
}
