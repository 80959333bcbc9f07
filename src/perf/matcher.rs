//! 程序匹配器模块
//!
//! 检查渲染器当前的已编译程序集合，从每个程序的缓存键中定位
//! 保留标记段并取出其后的候选令牌，校验通过且存在于扫描结果中
//! 时产出关联记录。
//!
//! # 字符串契约
//!
//! 身份借由不透明的编译器工件（缓存键）跨层传递，本质上是脆弱
//! 的协议。为了与上游渲染器的编译缓存保持兼容，机制照原样保留，
//! 但所有键解析逻辑只允许出现在本模块。
//!
//! # 失败语义
//!
//! - 缓存键无标记段：程序与探针无关，跳过（非错误）
//! - 令牌形状不合法：误匹配的子串，静默丢弃（稳态预期行为）
//! - 令牌不在扫描结果中：材质尚未产出编译程序的对偶情况，跳过
//! - 同一令牌被多个程序匹配：匹配器错误，快速失败

use crate::core::error::{CorrelationError, Result};
use crate::renderer::{ProgramHandle, ProgramTable};
use crate::scene::MaterialHandle;

use super::correlation::{CorrelationMap, DrawCounts, ProgramCorrelation};
use super::scanner::ScanResult;
use super::{IdentityToken, CACHE_KEY_DELIMITER, PERF_DEFINE_KEY};

/// 匹配编译程序与扫描结果
///
/// # 参数
/// - `programs`: 渲染器的活动程序表
/// - `scan_result`: 本趟扫描产出的令牌映射
///
/// # 返回
/// 令牌到关联记录的映射；同一令牌出现在多个程序中时返回
/// `CorrelationError::DuplicateToken`
///
/// # 幂等性
///
/// 对不变的程序表与扫描结果连续运行两次，输出结构一致（相同的
/// 键集、相同的材质/网格引用）；只有绘制计数会在几何分析器
/// 填充后发生合法变化。
pub fn match_programs(programs: &ProgramTable, scan_result: &ScanResult) -> Result<CorrelationMap> {
    let mut correlations = CorrelationMap::new();

    for program in programs.iter() {
        let Some(token) = extract_token(program.cache_key()) else {
            continue;
        };
        let Some(entry) = scan_result.get(&token) else {
            continue;
        };

        if correlations.contains_key(&token) {
            return Err(CorrelationError::DuplicateToken(token.to_string()).into());
        }

        correlations.insert(
            token,
            ProgramCorrelation {
                program: ProgramHandle::clone(program),
                material: MaterialHandle::clone(&entry.material),
                meshes: entry.meshes.clone(),
                draw_counts: DrawCounts::default(),
                visible: true,
                expanded: false,
            },
        );
    }

    Ok(correlations)
}

/// 从缓存键中提取身份令牌
///
/// 按分隔符切分，定位保留标记段，令牌是紧随其后的一段。
fn extract_token(cache_key: &str) -> Option<IdentityToken> {
    let mut segments = cache_key.split(CACHE_KEY_DELIMITER);
    while let Some(segment) = segments.next() {
        if segment == PERF_DEFINE_KEY {
            return segments.next().and_then(IdentityToken::parse);
        }
    }
    None
}
