//! 指标引擎接口模块
//!
//! 低层指标引擎（滚动 FPS/GPU/内存/CPU 时间、固定长度环形历史
//! 缓冲）是外部协作者，这里只定义探针消费的接口契约与数据形状。
//!
//! # 回调槽
//!
//! 引擎按自身节奏回调两个槽位：图表更新槽收到各指标的采样序列
//! 与环形游标，参数日志槽收到一份 `FrameMetrics` 快照。挂载时
//! 帧编排器把两个槽位接到会话共享状态上。

use std::collections::BTreeMap;

/// 帧指标快照
///
/// 每个采样间隔由指标引擎整体替换一次，探针原样转发。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameMetrics {
    /// 观测到的内存峰值（MB）
    pub max_memory: f64,

    /// GPU 耗时（毫秒）
    pub gpu_time_ms: f64,

    /// 内存占用（MB）
    pub memory_mb: f64,

    /// 帧率
    pub fps: f64,

    /// 帧耗时（毫秒）
    pub frame_duration_ms: f64,

    /// 帧计数
    pub frame_count: u64,
}

impl FrameMetrics {
    /// 全零快照（暂停时发布）
    pub fn zeroed() -> Self {
        Self::default()
    }
}

/// 图表更新
///
/// 指标名到采样序列的映射加上环形缓冲游标。缓冲由指标引擎拥有，
/// 探针只转发引用到共享状态。
#[derive(Debug, Clone, Default)]
pub struct ChartUpdate {
    /// 指标名 → 有序采样序列
    pub data: BTreeMap<String, Vec<f32>>,

    /// 环形缓冲当前游标
    pub circular_id: usize,
}

/// 图表更新回调
pub type ChartSink = Box<dyn FnMut(ChartUpdate)>;

/// 参数日志回调
pub type ParamSink = Box<dyn FnMut(FrameMetrics)>;

/// 指标引擎接口
///
/// `begin`/`end` 包围一帧的计时区间，`next_frame` 推进采样索引。
/// 实现方拥有采样调度（如基于动画帧的轮询）；`cancel_scheduled`
/// 在探针卸载时取消未决的调度句柄，必须幂等。
pub trait MetricsEngine {
    /// 开始一段计时区间
    fn begin(&mut self, label: &str);

    /// 结束一段计时区间
    fn end(&mut self, label: &str);

    /// 推进到下一帧
    fn next_frame(&mut self, timestamp_ms: f64);

    /// 设置暂停状态
    ///
    /// 暂停期间引擎停止消费计时采样。
    fn set_paused(&mut self, paused: bool);

    /// 取消引擎拥有的未决调度句柄（卸载时调用，幂等）
    fn cancel_scheduled(&mut self);

    /// 安装图表更新回调
    fn set_chart_sink(&mut self, sink: ChartSink);

    /// 安装参数日志回调
    fn set_param_sink(&mut self, sink: ParamSink);
}
