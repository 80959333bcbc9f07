//! 场景节点模块
//!
//! 定义场景图节点：封闭的可绘制种类集合（网格、点云）与分组节点。
//! 场景是图而非树——同一节点可被多个父节点引用，遍历方依赖节点
//! 标识去重。
//!
//! # 设计说明
//!
//! 可绘制能力通过封闭的 `NodeKind` 枚举判定一次，而不是对节点做
//! 结构化探测；新增可绘制种类时在枚举中扩展。

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::material::MaterialHandle;

/// 场景节点共享句柄
pub type NodeHandle = Rc<RefCell<SceneNode>>;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// 节点几何摘要
///
/// 探针只关心绘制成本归因所需的计数，不持有顶点数据本身。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// 顶点数量
    pub vertex_count: u32,

    /// 索引数量
    pub index_count: u32,
}

impl Geometry {
    /// 创建几何摘要
    #[inline]
    pub fn new(vertex_count: u32, index_count: u32) -> Self {
        Self { vertex_count, index_count }
    }

    /// 三角形数量（索引数 / 3）
    #[inline]
    pub fn triangle_count(&self) -> u32 {
        self.index_count / 3
    }
}

/// 节点种类
///
/// 封闭集合：只有 `Mesh` 和 `Points` 是可绘制的。
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// 分组节点，不直接绘制
    Group,

    /// 网格（三角形图元）
    Mesh(Geometry),

    /// 点云（点图元）
    Points(Geometry),
}

/// 场景节点
pub struct SceneNode {
    /// 节点标识（进程内唯一，用于遍历去重与逐网格归因）
    id: u64,

    /// 节点名称
    name: String,

    /// 节点种类
    pub kind: NodeKind,

    /// 材质数组
    ///
    /// 可绘制节点至少有一个材质；多材质数组的语义主材质
    /// 由关联策略决定（见 `core::config::MultiMaterialPolicy`）。
    pub materials: Vec<MaterialHandle>,

    /// 子节点（按插入顺序存储，遍历顺序以此为准）
    pub children: Vec<NodeHandle>,
}

impl SceneNode {
    fn new(name: impl Into<String>, kind: NodeKind, materials: Vec<MaterialHandle>) -> Self {
        Self {
            id: NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            kind,
            materials,
            children: Vec::new(),
        }
    }

    /// 创建分组节点
    pub fn group(name: impl Into<String>) -> NodeHandle {
        Rc::new(RefCell::new(Self::new(name, NodeKind::Group, Vec::new())))
    }

    /// 创建网格节点
    ///
    /// # 参数
    /// - `name`: 节点名称
    /// - `geometry`: 几何摘要
    /// - `materials`: 材质数组（至少一个）
    pub fn mesh(
        name: impl Into<String>,
        geometry: Geometry,
        materials: Vec<MaterialHandle>,
    ) -> NodeHandle {
        Rc::new(RefCell::new(Self::new(name, NodeKind::Mesh(geometry), materials)))
    }

    /// 创建点云节点
    pub fn points(
        name: impl Into<String>,
        geometry: Geometry,
        materials: Vec<MaterialHandle>,
    ) -> NodeHandle {
        Rc::new(RefCell::new(Self::new(name, NodeKind::Points(geometry), materials)))
    }

    /// 获取节点标识
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 获取节点名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 是否为可绘制节点
    ///
    /// 可绘制 = 种类为网格/点云，且至少有一个材质。
    pub fn is_drawable(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh(_) | NodeKind::Points(_)) && !self.materials.is_empty()
    }

    /// 添加子节点
    pub fn add_child(parent: &NodeHandle, child: NodeHandle) {
        parent.borrow_mut().children.push(child);
    }
}
