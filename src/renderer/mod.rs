//! 渲染器接口模块
//!
//! 建模探针消费的渲染器侧表面：逐帧计数器与活动程序表。
//! 两者由宿主渲染器拥有并在渲染过程中实时更新，探针通过共享
//! 句柄访问。挂载时计数器对象不可用是致命错误——探针拒绝启动，
//! 而不是挂载一个半残的采样循环。

pub mod counters;
pub mod program;

pub use counters::RenderCounters;
pub use program::{GpuProgram, ProgramHandle, ProgramTable};

use std::cell::RefCell;
use std::rc::Rc;

/// 渲染器信息共享句柄
pub type RenderInfoHandle = Rc<RefCell<RenderInfo>>;

/// 渲染器信息对象
///
/// 对应渲染器内部的统计结构：可复位的逐帧计数器 + 当前已编译
/// 程序的可枚举集合。
#[derive(Debug, Default)]
pub struct RenderInfo {
    /// 逐帧计数器
    pub counters: RenderCounters,

    /// 活动程序表
    pub programs: ProgramTable,
}

impl RenderInfo {
    /// 创建空的信息对象
    pub fn new() -> Self {
        Self {
            counters: RenderCounters::new(),
            programs: ProgramTable::new(),
        }
    }

    /// 包装为共享句柄
    pub fn into_handle(self) -> RenderInfoHandle {
        Rc::new(RefCell::new(self))
    }
}

/// 宿主渲染器句柄
///
/// 探针挂载时从这里取得信息对象。某些渲染器配置下统计结构
/// 不存在（`info` 为 `None`），此时挂载必须快速失败。
pub struct RendererHandle {
    info: Option<RenderInfoHandle>,
}

impl RendererHandle {
    /// 创建暴露信息对象的渲染器句柄
    pub fn with_info(info: RenderInfoHandle) -> Self {
        Self { info: Some(info) }
    }

    /// 创建不暴露信息对象的渲染器句柄
    pub fn without_info() -> Self {
        Self { info: None }
    }

    /// 获取信息对象句柄
    pub fn info(&self) -> Option<RenderInfoHandle> {
        self.info.as_ref().map(Rc::clone)
    }
}
