//! 几何分析器接口模块
//!
//! 几何/索引缓冲检查器是外部协作者：给定当前的关联映射，就地
//! 填充每条记录的绘制调用分解，除此之外无副作用。探针在关联
//! 键集大小变化时调用它，然后才发布映射。

use super::correlation::CorrelationMap;

/// 几何分析器接口
pub trait GeometryAnalyzer {
    /// 重新计算关联映射中每条记录的绘制调用分解
    fn recompute(&self, correlations: &mut CorrelationMap);
}

/// 空分析器
///
/// 宿主没有几何分析器时使用；绘制计数保持初始的零值。
pub struct NullGeometryAnalyzer;

impl GeometryAnalyzer for NullGeometryAnalyzer {
    fn recompute(&self, _correlations: &mut CorrelationMap) {}
}
