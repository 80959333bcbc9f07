//! 场景扫描器模块
//!
//! 每次分析趟对场景图做一次遍历：发现可绘制节点，解析其有效
//! 材质（处理多材质节点），经标记器取得令牌，建立令牌到
//! {材质, 贡献网格} 的工作映射。
//!
//! # 遍历语义
//!
//! - 深度优先，子节点按存储顺序访问——同一不变场景的两次扫描
//!   产出相同的网格顺序
//! - 场景是图而非树，以节点标识做访问集去重，循环安全
//! - 非可绘制节点与无材质节点跳过

use std::collections::{BTreeMap, HashSet};

use crate::core::config::MultiMaterialPolicy;
use crate::core::error::Result;
use crate::scene::{MaterialHandle, NodeHandle};

use super::{tagger, IdentityToken};

/// 扫描趟内的工作记录
///
/// 每趟扫描开始时新建，趟结束即丢弃；跨趟持久的只有派生出的
/// 关联存储。
pub struct MaterialEntry {
    /// 材质共享引用（不拥有）
    pub material: MaterialHandle,

    /// 贡献到该材质的网格节点，按遍历顺序
    pub meshes: Vec<NodeHandle>,
}

/// 扫描结果：令牌到工作记录的映射
pub type ScanResult = BTreeMap<IdentityToken, MaterialEntry>;

/// 扫描场景图
///
/// # 参数
/// - `root`: 场景根节点
/// - `policy`: 多材质节点的关联策略
///
/// # 返回
/// 令牌到 `MaterialEntry` 的映射；标记失败（保留槽被占用）时
/// 返回错误
pub fn scan(root: &NodeHandle, policy: MultiMaterialPolicy) -> Result<ScanResult> {
    let mut result = ScanResult::new();
    let mut visited = HashSet::new();
    visit(root, policy, &mut visited, &mut result)?;
    Ok(result)
}

fn visit(
    node: &NodeHandle,
    policy: MultiMaterialPolicy,
    visited: &mut HashSet<u64>,
    result: &mut ScanResult,
) -> Result<()> {
    let node_ref = node.borrow();

    // 访问集去重，循环安全
    if !visited.insert(node_ref.id()) {
        return Ok(());
    }

    if node_ref.is_drawable() {
        if let Some(material) = effective_material(&node_ref.materials, policy) {
            let token = tagger::tag(&material)?;
            let entry = result.entry(token).or_insert_with(|| MaterialEntry {
                material,
                meshes: Vec::new(),
            });
            entry.meshes.push(NodeHandle::clone(node));
        }
    }

    for child in &node_ref.children {
        visit(child, policy, visited, result)?;
    }
    Ok(())
}

/// 解析节点的有效材质
///
/// 单材质节点使用唯一材质；多材质节点按策略选槽。
fn effective_material(
    materials: &[MaterialHandle],
    policy: MultiMaterialPolicy,
) -> Option<MaterialHandle> {
    if materials.is_empty() {
        return None;
    }
    materials
        .get(policy.slot_index(materials.len()))
        .map(MaterialHandle::clone)
}
