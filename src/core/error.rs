//! 错误处理模块
//!
//! 定义了探针中使用的统一错误类型，提供友好的错误消息。
//!
//! # 设计原则
//!
//! - 为每种错误类型提供清晰的上下文信息
//! - 支持错误链（error source）
//! - 易于模式匹配和错误处理
//! - 启动期错误（attach/配置）为致命错误，稳态关联缺失不走错误通道

use std::fmt;

/// 探针统一的 Result 类型
///
/// 所有可能返回错误的函数都应该使用这个类型。
pub type Result<T> = std::result::Result<T, ScenePerfError>;

/// ScenePerf 探针的错误类型
///
/// 包含了探针运行过程中可能遇到的各种错误情况。
#[derive(Debug)]
pub enum ScenePerfError {
    /// 配置错误
    Config(ConfigError),

    /// 挂载错误（渲染器计数器不可用等）
    Attach(String),

    /// 材质标记错误
    Tagging(TagError),

    /// 程序关联错误
    Correlation(CorrelationError),

    /// IO 错误
    Io(std::io::Error),
}

/// 配置相关的错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),

    /// 配置文件解析失败
    ParseError(String),

    /// 配置值无效
    InvalidValue { field: String, reason: String },
}

/// 材质标记相关的错误
#[derive(Debug)]
pub enum TagError {
    /// 保留的定义槽位已被外部数据占用
    ///
    /// 材质的预处理定义中已存在同名字段，但其值不是身份令牌。
    /// 覆盖外部数据是不可接受的，必须快速失败。
    ReservedSlotOccupied { material: String, found: String },
}

/// 程序关联相关的错误
#[derive(Debug)]
pub enum CorrelationError {
    /// 同一令牌被多个编译程序匹配
    ///
    /// 同一材质不应产生多个编译程序；出现即视为匹配器错误而非合并。
    DuplicateToken(String),
}

impl fmt::Display for ScenePerfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenePerfError::Config(e) => write!(f, "Configuration error: {}", e),
            ScenePerfError::Attach(msg) => write!(f, "Attach error: {}", msg),
            ScenePerfError::Tagging(e) => write!(f, "Tagging error: {}", e),
            ScenePerfError::Correlation(e) => write!(f, "Correlation error: {}", e),
            ScenePerfError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagError::ReservedSlotOccupied { material, found } => write!(
                f,
                "Reserved define slot on material '{}' holds foreign data: '{}'",
                material, found
            ),
        }
    }
}

impl fmt::Display for CorrelationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationError::DuplicateToken(token) => {
                write!(f, "Multiple compiled programs matched token '{}'", token)
            }
        }
    }
}

impl std::error::Error for ScenePerfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScenePerfError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for TagError {}
impl std::error::Error for CorrelationError {}

// 实现 From trait 以便于错误转换
impl From<std::io::Error> for ScenePerfError {
    fn from(err: std::io::Error) -> Self {
        ScenePerfError::Io(err)
    }
}

impl From<ConfigError> for ScenePerfError {
    fn from(err: ConfigError) -> Self {
        ScenePerfError::Config(err)
    }
}

impl From<TagError> for ScenePerfError {
    fn from(err: TagError) -> Self {
        ScenePerfError::Tagging(err)
    }
}

impl From<CorrelationError> for ScenePerfError {
    fn from(err: CorrelationError) -> Self {
        ScenePerfError::Correlation(err)
    }
}
