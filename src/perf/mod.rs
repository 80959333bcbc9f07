//! 性能探针核心模块
//!
//! 程序-场景关联引擎与帧生命周期编排。
//!
//! # 模块组织
//!
//! - `tagger`：身份标记器，把材质身份令牌写入预处理定义
//! - `scanner`：场景扫描器，遍历场景图建立令牌到材质/网格的工作映射
//! - `matcher`：程序匹配器，从编译缓存键中恢复材质身份
//! - `correlation`：关联存储的数据结构
//! - `metrics`：指标引擎接口与帧指标快照
//! - `geometry`：几何分析器接口
//! - `state`：会话共享状态（发布的只读快照）
//! - `orchestrator`：帧编排器状态机
//!
//! # 数据流
//!
//! 每帧：帧编排器复位逐帧计数器 → 委托指标引擎计时 →（启用深度
//! 分析时）扫描器 + 匹配器运行 → 关联存储更新 → 几何分析器填充
//! 绘制计数 → 发布到会话共享状态。

pub mod tagger;
pub mod scanner;
pub mod matcher;
pub mod correlation;
pub mod metrics;
pub mod geometry;
pub mod state;
pub mod orchestrator;

pub use correlation::{CorrelationMap, DrawCounts, PrimitiveType, ProgramCorrelation};
pub use geometry::GeometryAnalyzer;
pub use metrics::{ChartUpdate, FrameMetrics, MetricsEngine};
pub use orchestrator::{FrameHooks, FrameOrchestrator, ProbeState};
pub use scanner::MaterialEntry;
pub use state::{PerfSession, SessionHandle};

use std::fmt;

use uuid::Uuid;

/// 预处理定义中的保留键
///
/// 身份令牌写入该键后随定义表进入编译缓存键。保持与上游渲染器
/// 编译缓存的既有约定兼容，不可随意更名。
pub const PERF_DEFINE_KEY: &str = "muiPerf";

/// 缓存键的分段分隔符
pub const CACHE_KEY_DELIMITER: char = ',';

/// 材质身份令牌
///
/// UUID v4 形状的字符串，对每个材质铸造一次，同时存在于材质自身
/// 的身份字段与其预处理定义的保留键中。材质实例存活期间令牌不会
/// 重新生成。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityToken(String);

impl IdentityToken {
    /// 从材质 UUID 铸造令牌
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }

    /// 解析并校验一个候选令牌
    ///
    /// 缓存键是自由格式字符串，误匹配的子串是预期中的非致命情况；
    /// 形状不合法的候选返回 `None`，由调用方静默跳过。
    ///
    /// 只接受连字符 8-4-4-4-12 规范形式（大小写不敏感）。
    /// `Uuid::parse_str` 还能识别 32 位简写、花括号与 URN 写法，
    /// 这些在缓存键里一律视为误匹配丢弃。
    pub fn parse(candidate: &str) -> Option<Self> {
        let uuid = Uuid::parse_str(candidate).ok()?;
        if !candidate.eq_ignore_ascii_case(&uuid.to_string()) {
            return None;
        }
        // 规范化回小写形式，保证令牌间可按字符串比较
        Some(Self(uuid.to_string()))
    }

    /// 令牌的字符串形式
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
