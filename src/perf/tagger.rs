//! 身份标记器模块
//!
//! 把材质的身份令牌写入其着色器预处理定义的保留键，使令牌随
//! 定义表流入下一次编译产物的缓存键。这是探针中唯一允许改写
//! 材质编译状态的组件。
//!
//! # 契约
//!
//! - 保留键为空：写入材质自身的 UUID，置位一次性重编译标志，
//!   保证令牌出现在下一个编译程序的缓存键中
//! - 保留键已持有令牌：原样返回并清除重编译标志（幂等重标记）
//! - 保留键持有外部数据：配置错误，快速失败而非静默覆盖

use crate::core::error::{Result, TagError};
use crate::scene::MaterialHandle;

use super::{IdentityToken, PERF_DEFINE_KEY};

/// 标记材质
///
/// # 参数
/// - `material`: 待标记的材质句柄
///
/// # 返回
/// 材质的身份令牌；保留键被外部数据占用时返回
/// `TagError::ReservedSlotOccupied`
pub fn tag(material: &MaterialHandle) -> Result<IdentityToken> {
    let mut mat = material.borrow_mut();

    if let Some(existing) = mat.defines.get(PERF_DEFINE_KEY) {
        return match IdentityToken::parse(existing) {
            Some(token) => {
                // 幂等重标记：令牌未变，不再触发重编译
                mat.clear_needs_recompile();
                Ok(token)
            }
            None => Err(TagError::ReservedSlotOccupied {
                material: mat.name().to_string(),
                found: existing.clone(),
            }
            .into()),
        };
    }

    let token = IdentityToken::from_uuid(mat.uuid());
    mat.defines
        .insert(PERF_DEFINE_KEY.to_string(), token.as_str().to_string());
    mat.mark_needs_recompile();
    Ok(token)
}
