//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::env::EnvResult;
use crate::word_break::error::{WordBreakError, WordBreakResult};

/// 分词换行配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WordBreakConfig {
    // 处理范围
    pub target_selectors: String,
    pub excluded_tags: Vec<String>,
    pub tooling_id_markers: Vec<String>,
    pub tooling_class_markers: Vec<String>,

    // 分词
    pub particle_categories: Vec<String>,
    pub min_segment_chars: usize,
    pub max_text_length: usize,

    // 批次配置
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub timeout_ms: u64,

    // 变更监听
    pub debounce_ms: u64,
}

impl Default for WordBreakConfig {
    fn default() -> Self {
        Self {
            target_selectors: constants::DEFAULT_TARGET_SELECTORS.to_string(),
            excluded_tags: to_strings(constants::EXCLUDED_TAGS),
            tooling_id_markers: to_strings(constants::TOOLING_ID_MARKERS),
            tooling_class_markers: to_strings(constants::TOOLING_CLASS_MARKERS),

            particle_categories: to_strings(constants::PARTICLE_CATEGORIES),
            min_segment_chars: 0,
            max_text_length: constants::DEFAULT_MAX_TEXT_LENGTH,

            batch_size: constants::DEFAULT_BATCH_SIZE,
            batch_delay_ms: constants::DEFAULT_BATCH_DELAY.as_millis() as u64,
            timeout_ms: constants::DEFAULT_TIMEOUT.as_millis() as u64,

            debounce_ms: constants::DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl WordBreakConfig {
    /// 验证配置
    pub fn validate(&self) -> WordBreakResult<()> {
        if self.batch_size == 0 {
            return Err(WordBreakError::ConfigError("批次大小不能为0".to_string()));
        }

        if self.timeout_ms == 0 {
            return Err(WordBreakError::ConfigError("超时时间不能为0".to_string()));
        }

        if self.max_text_length == 0 {
            return Err(WordBreakError::ConfigError("最大文本长度不能为0".to_string()));
        }

        if self.target_selectors.trim().is_empty() {
            return Err(WordBreakError::ConfigError("目标选择器不能为空".to_string()));
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    ///
    /// 无法解析的值记录警告后忽略，保留原配置。
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{word_break, EnvVar};

        if let Some(batch_size) = env_override(word_break::BatchSize::get_set()) {
            self.batch_size = batch_size;
        }

        if let Some(delay) = env_override(word_break::BatchDelay::get_set()) {
            self.batch_delay_ms = delay.as_millis() as u64;
        }

        if let Some(max_len) = env_override(word_break::MaxTextLength::get_set()) {
            self.max_text_length = max_len;
        }

        if let Some(timeout) = env_override(word_break::Timeout::get_set()) {
            self.timeout_ms = timeout.as_millis() as u64;
        }

        if let Some(debounce) = env_override(word_break::Debounce::get_set()) {
            self.debounce_ms = debounce.as_millis() as u64;
        }

        if let Some(selectors) = env_override(word_break::TargetSelectors::get_set()) {
            tracing::info!("环境变量覆盖目标选择器: {}", selectors);
            self.target_selectors = selectors;
        }
    }

    /// 转换为Duration类型
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

// 解析失败的环境变量只记录警告
fn env_override<T>(value: Option<EnvResult<T>>) -> Option<T> {
    match value? {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("忽略无效环境变量: {}", e);
            None
        }
    }
}

/// 简化的配置管理器
pub struct ConfigManager {
    config: WordBreakConfig,
}

impl ConfigManager {
    /// 创建新的配置管理器
    pub fn new() -> WordBreakResult<Self> {
        let mut config = Self::load_config()?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 从指定文件创建，同样应用环境变量覆盖
    pub fn from_file(path: &str) -> WordBreakResult<Self> {
        let expanded_path = shellexpand::tilde(path);
        let mut config = Self::load_from_file(&expanded_path)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 获取配置
    pub fn get_config(&self) -> &WordBreakConfig {
        &self.config
    }

    /// 取出配置
    pub fn into_config(self) -> WordBreakConfig {
        self.config
    }

    /// 按顺序查找配置文件
    fn load_config() -> WordBreakResult<WordBreakConfig> {
        Self::load_dotenv();

        if let Some(result) = {
            use crate::env::{word_break, EnvVar};
            word_break::ConfigPath::get_set()
        } {
            let path = result.map_err(|e| WordBreakError::ConfigError(e.to_string()))?;
            let expanded_path = shellexpand::tilde(&path);
            tracing::info!("加载配置文件: {}", expanded_path);
            return Self::load_from_file(&expanded_path);
        }

        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::load_from_file(&expanded_path);
            }
        }

        tracing::info!("未找到配置文件，使用默认配置");
        Ok(WordBreakConfig::default())
    }

    /// 从指定文件加载配置
    fn load_from_file(path: &str) -> WordBreakResult<WordBreakConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| WordBreakError::ConfigError(format!("读取配置文件失败: {}", e)))?;

        if path.ends_with(".json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &str) -> WordBreakResult<()> {
        let config = WordBreakConfig::default();
        let content = toml::to_string_pretty(&config)?;

        std::fs::write(path, content)
            .map_err(|e| WordBreakError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = WordBreakConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.batch_delay(), constants::DEFAULT_BATCH_DELAY);
        assert_eq!(config.debounce(), Duration::from_millis(100));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: WordBreakConfig =
            toml::from_str("batch_size = 5\ntarget_selectors = \".entry-content, article\"")
                .unwrap();

        assert_eq!(config.batch_size, 5);
        assert_eq!(config.target_selectors, ".entry-content, article");
        assert_eq!(config.max_text_length, constants::DEFAULT_MAX_TEXT_LENGTH);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let config = WordBreakConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(WordBreakError::ConfigError(_))
        ));
    }

    #[test]
    fn example_config_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rwb.toml");
        let path = path.to_str().unwrap();

        ConfigManager::generate_example_config(path).unwrap();
        let loaded = ConfigManager::load_from_file(path).unwrap();

        assert_eq!(loaded, WordBreakConfig::default());
    }

    #[test]
    fn json_config_is_supported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rwb.json");
        std::fs::write(&path, r#"{"batch_size": 3, "debounce_ms": 250}"#).unwrap();

        let loaded = ConfigManager::load_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.batch_size, 3);
        assert_eq!(loaded.debounce(), Duration::from_millis(250));
    }

    #[test]
    fn invalid_env_override_is_skipped() {
        let error = crate::env::EnvError {
            variable: "RWB_BATCH_SIZE".to_string(),
            message: "not a number".to_string(),
        };

        assert_eq!(env_override::<usize>(Some(Err(error))), None);
        assert_eq!(env_override(Some(Ok(7usize))), Some(7));
        assert_eq!(env_override::<usize>(None), None);
    }

    #[test]
    fn unparsable_env_values_keep_config() {
        std::env::set_var("RWB_DEBOUNCE_MS", "soon");
        std::env::set_var("RWB_MAX_TEXT_LENGTH", "long");

        let mut config = WordBreakConfig::default();
        config.apply_env_overrides();

        std::env::remove_var("RWB_DEBOUNCE_MS");
        std::env::remove_var("RWB_MAX_TEXT_LENGTH");

        assert_eq!(config, WordBreakConfig::default());
    }
}
