//! 材质模块
//!
//! 定义宿主场景中的材质模型：身份标识、着色器预处理定义表，
//! 以及一次性的"需要重编译"标志。
//!
//! # 架构说明
//!
//! 材质的预处理定义（defines）会参与 GPU 程序编译缓存键的生成，
//! 探针正是借助这一点把身份令牌带入缓存键。`needs_recompile` 是
//! 一次性标志：由标记器置位，由渲染器的编译步骤消费，消费后在
//! 令牌不变的情况下不会再次置位。

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use uuid::Uuid;

/// 材质共享句柄
///
/// 场景节点与关联记录均持有共享引用，不拥有材质本身。
pub type MaterialHandle = Rc<RefCell<Material>>;

/// 材质
///
/// 只建模探针关心的部分：唯一标识、预处理定义表和重编译标志。
#[derive(Debug)]
pub struct Material {
    /// 材质唯一标识
    ///
    /// 创建时生成一次，材质实例存活期间不变。
    uuid: Uuid,

    /// 材质名称
    name: String,

    /// 着色器预处理定义
    ///
    /// 键值对全部进入编译缓存键。使用 BTreeMap 保证键序稳定。
    pub defines: BTreeMap<String, String>,

    /// 一次性重编译标志
    needs_recompile: bool,
}

impl Material {
    /// 创建新材质
    ///
    /// # 参数
    /// - `name`: 材质名称
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            defines: BTreeMap::new(),
            needs_recompile: false,
        }
    }

    /// 创建新材质并包装为共享句柄
    pub fn new_handle(name: impl Into<String>) -> MaterialHandle {
        Rc::new(RefCell::new(Self::new(name)))
    }

    /// 获取材质唯一标识
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// 获取材质名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 置位一次性重编译标志
    pub(crate) fn mark_needs_recompile(&mut self) {
        self.needs_recompile = true;
    }

    /// 清除重编译标志
    pub(crate) fn clear_needs_recompile(&mut self) {
        self.needs_recompile = false;
    }

    /// 查询重编译标志
    pub fn needs_recompile(&self) -> bool {
        self.needs_recompile
    }

    /// 消费重编译标志（渲染器编译步骤调用）
    ///
    /// # 返回
    /// 返回消费前的标志值；调用后标志被清除。
    pub fn consume_recompile(&mut self) -> bool {
        let was_set = self.needs_recompile;
        self.needs_recompile = false;
        was_set
    }
}
