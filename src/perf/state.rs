//! 会话共享状态模块
//!
//! 单个 渲染器/场景 对的插桩会话状态：最新指标快照、暂停标志、
//! 图表历史、当前关联存储与单调递增的更新计数。会话对象在挂载
//! 时构造、卸载时销毁，以句柄显式传递给各组件——没有进程级
//! 环境单例。
//!
//! # 一致性保证
//!
//! 所有对外可见的字段按值替换（新映射/新记录），从不逐字段
//! 修改，保证任何消费者读到的都是一致的快照。写者只有帧编排器
//! 一个；模型是严格的单写者/多读者。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::correlation::CorrelationMap;
use super::metrics::{ChartUpdate, FrameMetrics};

/// 会话共享句柄
pub type SessionHandle = Rc<PerfSession>;

/// 插桩会话
pub struct PerfSession {
    /// 最新帧指标快照
    metrics: Cell<FrameMetrics>,

    /// 暂停标志
    paused: Cell<bool>,

    /// 最新图表历史（整体替换）
    chart: RefCell<Option<Rc<ChartUpdate>>>,

    /// 当前关联存储（整体替换）
    correlations: RefCell<Rc<CorrelationMap>>,

    /// 单调递增的更新计数
    ///
    /// 消费者用它而非深比较来检测关联存储变化。
    update_counter: Cell<u64>,

    /// 调用方自定义的辅助跟踪值
    custom_data: Cell<i64>,
}

impl PerfSession {
    /// 创建新会话
    pub fn new() -> SessionHandle {
        Rc::new(Self {
            metrics: Cell::new(FrameMetrics::zeroed()),
            paused: Cell::new(false),
            chart: RefCell::new(None),
            correlations: RefCell::new(Rc::new(CorrelationMap::new())),
            update_counter: Cell::new(0),
            custom_data: Cell::new(0),
        })
    }

    /// 获取最新帧指标
    pub fn latest_metrics(&self) -> FrameMetrics {
        self.metrics.get()
    }

    /// 发布一份帧指标快照（整体替换）
    pub(crate) fn publish_metrics(&self, metrics: FrameMetrics) {
        self.metrics.set(metrics);
    }

    /// 查询暂停标志
    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    pub(crate) fn set_paused(&self, paused: bool) {
        self.paused.set(paused);
    }

    /// 获取当前关联存储快照
    ///
    /// 返回的映射对调用方只读；后续发布不影响已取得的快照。
    pub fn correlation_store(&self) -> Rc<CorrelationMap> {
        Rc::clone(&self.correlations.borrow())
    }

    /// 发布新的关联存储（整体替换）并递增更新计数
    pub(crate) fn publish_correlations(&self, correlations: CorrelationMap) {
        *self.correlations.borrow_mut() = Rc::new(correlations);
        self.update_counter.set(self.update_counter.get() + 1);
    }

    /// 获取更新计数
    pub fn update_counter(&self) -> u64 {
        self.update_counter.get()
    }

    /// 获取最新图表历史
    pub fn chart(&self) -> Option<Rc<ChartUpdate>> {
        self.chart.borrow().as_ref().map(Rc::clone)
    }

    /// 发布新的图表历史（整体替换）
    pub(crate) fn publish_chart(&self, chart: ChartUpdate) {
        *self.chart.borrow_mut() = Some(Rc::new(chart));
    }

    /// 获取自定义跟踪值
    pub fn custom_data(&self) -> i64 {
        self.custom_data.get()
    }

    /// 设置自定义跟踪值
    pub fn set_custom_data(&self, value: i64) {
        self.custom_data.set(value);
    }
}
