//! 关联存储模块
//!
//! 对外可见的关联单元：编译程序 ↔ 材质 ↔ 网格，以及由几何分析器
//! 填充的绘制调用分解。整张映射在每趟分析末尾被整体替换，跨趟
//! 从不就地修改——并发读者（如另一个调度滴答上的 UI）永远不会
//! 观察到半更新的结构。

use std::collections::BTreeMap;

use crate::renderer::ProgramHandle;
use crate::scene::{MaterialHandle, NodeHandle};

use super::IdentityToken;

/// 图元类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    /// 三角形
    Triangles,
    /// 点
    Points,
    /// 线段
    Lines,
}

/// 单个网格的绘制计数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshDrawCount {
    /// 网格节点标识
    pub node_id: u64,

    /// 图元类型
    pub primitive: PrimitiveType,

    /// 图元数量
    pub count: u32,
}

/// 绘制调用分解
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCounts {
    /// 总图元数
    pub total: u32,

    /// 主图元类型
    pub primitive: PrimitiveType,

    /// 逐网格分解
    pub per_mesh: Vec<MeshDrawCount>,
}

impl Default for DrawCounts {
    fn default() -> Self {
        Self {
            total: 0,
            primitive: PrimitiveType::Triangles,
            per_mesh: Vec::new(),
        }
    }
}

/// 程序关联记录
///
/// 恰好一个材质、零或多个网格。仅由帧编排器在分析趟末尾整体
/// 替换映射时写入；对所有其他消费者只读。
pub struct ProgramCorrelation {
    /// 渲染器活动程序表中的程序引用
    pub program: ProgramHandle,

    /// 材质共享引用
    pub material: MaterialHandle,

    /// 贡献网格，按扫描遍历顺序
    pub meshes: Vec<NodeHandle>,

    /// 绘制调用分解（由外部几何分析器填充）
    pub draw_counts: DrawCounts,

    /// 可见性标志
    pub visible: bool,

    /// 展开标志（供下游 UI 使用）
    pub expanded: bool,
}

/// 关联存储：令牌到关联记录的映射
pub type CorrelationMap = BTreeMap<IdentityToken, ProgramCorrelation>;
