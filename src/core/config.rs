//! 配置管理模块
//!
//! 提供探针配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，文件缺失时使用默认配置。
//!
//! # 配置文件格式 (sceneperf.toml)
//!
//! ```toml
//! [sampling]
//! chart_len = 120     # 图表环形缓冲长度
//! chart_hz = 60       # 图表采样频率
//! track_gpu = true
//! track_cpu = false
//!
//! [analysis]
//! deep_analyze = false
//! multi_material_policy = "second_slot"  # 或 "first_slot"
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, Result};

/// 探针配置
///
/// 包含了探针运行所需的所有配置项。
/// 可以从配置文件加载，也可以通过代码构建。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerfConfig {
    /// 采样配置
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// 深度分析配置
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 采样配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// 图表环形缓冲长度（每个指标的采样点数）
    #[serde(default = "default_chart_len")]
    pub chart_len: usize,

    /// 图表采样频率（Hz）
    #[serde(default = "default_chart_hz")]
    pub chart_hz: u32,

    /// 是否跟踪 GPU 耗时
    #[serde(default = "default_track_gpu")]
    pub track_gpu: bool,

    /// 是否跟踪 CPU 耗时
    #[serde(default = "default_track_cpu")]
    pub track_cpu: bool,
}

/// 深度分析配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// 是否启用深度分析（场景扫描 + 程序关联）
    ///
    /// 深度分析比逐帧计数采样昂贵，默认关闭。
    #[serde(default = "default_deep_analyze")]
    pub deep_analyze: bool,

    /// 多材质节点的关联策略
    #[serde(default = "default_multi_material_policy")]
    pub multi_material_policy: MultiMaterialPolicy,
}

/// 多材质节点的关联策略
///
/// 某些外部文本渲染技术为一个节点挂载两个材质，其中索引 0 是
/// 装饰/覆盖通道，索引 1 才是语义上的主材质。该约定并不普适，
/// 因此策略可配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiMaterialPolicy {
    /// 使用材质数组的第二个元素（索引 1）
    SecondSlot,
    /// 使用材质数组的第一个元素（索引 0）
    FirstSlot,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_chart_len() -> usize { 120 }
fn default_chart_hz() -> u32 { 60 }
fn default_track_gpu() -> bool { true }
fn default_track_cpu() -> bool { false }
fn default_deep_analyze() -> bool { false }
fn default_multi_material_policy() -> MultiMaterialPolicy { MultiMaterialPolicy::SecondSlot }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "sceneperf.log".to_string() }

impl Default for PerfConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            analysis: AnalysisConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            chart_len: default_chart_len(),
            chart_hz: default_chart_hz(),
            track_gpu: default_track_gpu(),
            track_cpu: default_track_cpu(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            deep_analyze: default_deep_analyze(),
            multi_material_policy: default_multi_material_policy(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl PerfConfig {
    /// 从配置文件加载
    ///
    /// # 参数
    ///
    /// * `path` - 配置文件路径
    ///
    /// # 返回值
    ///
    /// 成功返回 `PerfConfig` 实例，失败返回错误
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在则使用默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// 保存配置到文件
    ///
    /// # 返回值
    ///
    /// 成功返回 `Ok(())`，失败返回错误
    #[allow(dead_code)]
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 验证配置的有效性
    ///
    /// # 返回值
    ///
    /// 配置有效返回 `Ok(())`，否则返回错误
    pub fn validate(&self) -> Result<()> {
        // 验证图表缓冲长度
        if self.sampling.chart_len == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sampling.chart_len".to_string(),
                reason: "Chart buffer length must be greater than 0".to_string(),
            }.into());
        }

        // 验证采样频率
        if self.sampling.chart_hz == 0 || self.sampling.chart_hz > 240 {
            return Err(ConfigError::InvalidValue {
                field: "sampling.chart_hz".to_string(),
                reason: "Chart frequency must be between 1 and 240 Hz".to_string(),
            }.into());
        }

        Ok(())
    }
}

impl MultiMaterialPolicy {
    /// 按策略从材质数组长度解析出应当关联的槽位索引
    ///
    /// 单材质数组总是使用索引 0；多材质数组按策略选择。
    pub fn slot_index(&self, material_count: usize) -> usize {
        if material_count > 1 {
            match self {
                MultiMaterialPolicy::SecondSlot => 1,
                MultiMaterialPolicy::FirstSlot => 0,
            }
        } else {
            0
        }
    }
}
