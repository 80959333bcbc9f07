//! 逐帧渲染计数器模块
//!
//! 建模渲染器持有的可复位逐帧计数器（绘制调用、三角形、点、线）。
//! 挂载后由帧编排器在每帧开始时复位；`auto_reset` 关闭表示复位
//! 所有权已移交探针。

/// 逐帧渲染计数器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderCounters {
    /// 绘制调用次数
    pub calls: u32,

    /// 三角形数量
    pub triangles: u32,

    /// 点数量
    pub points: u32,

    /// 线段数量
    pub lines: u32,

    /// 渲染器是否在帧末自动复位计数器
    pub auto_reset: bool,
}

impl RenderCounters {
    /// 创建新的计数器（自动复位开启，与渲染器默认行为一致）
    pub fn new() -> Self {
        Self {
            calls: 0,
            triangles: 0,
            points: 0,
            lines: 0,
            auto_reset: true,
        }
    }

    /// 复位所有逐帧计数
    pub fn reset(&mut self) {
        self.calls = 0;
        self.triangles = 0;
        self.points = 0;
        self.lines = 0;
    }
}

impl Default for RenderCounters {
    fn default() -> Self {
        Self::new()
    }
}
