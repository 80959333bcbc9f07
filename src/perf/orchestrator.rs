//! 帧编排器模块
//!
//! 拥有围绕每一渲染帧的 begin/end/pause/resume 协议：驱动指标
//! 引擎、按配置节奏触发场景扫描与程序匹配、把结果发布到会话
//! 共享状态。
//!
//! # 状态机
//!
//! `Idle → Active ⇄ Paused → Detached`
//!
//! - `Idle`：已构造但尚未收到首个帧回调
//! - `Active`：帧前复位计数器并开始计时，帧后结束计时、推进
//!   采样索引并（启用深度分析时）运行分析趟
//! - `Paused`：宿主循环的尾钩子在本轮未渲染帧时触发，指标清零
//! - `Detached`：卸载后的终态，幂等
//!
//! # 并发模型
//!
//! 单线程协作式调度，全部工作在宿主循环的回调内同步完成；
//! 本组件不派生任何线程或任务。

use std::rc::Rc;

use crate::core::config::{MultiMaterialPolicy, PerfConfig};
use crate::core::error::{Result, ScenePerfError};
use crate::renderer::{RenderInfoHandle, RendererHandle};
use crate::scene::NodeHandle;

use super::geometry::GeometryAnalyzer;
use super::metrics::{FrameMetrics, MetricsEngine};
use super::state::SessionHandle;
use super::{matcher, scanner};

/// 计时区间标签
const PROFILER_LABEL: &str = "profiler";

/// 编排器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    /// 已构造，尚未进入渲染循环
    Idle,
    /// 正常采样中
    Active,
    /// 渲染循环空闲，采样暂停
    Paused,
    /// 已卸载（终态）
    Detached,
}

/// 宿主渲染循环的钩子契约
///
/// 宿主在挂载时注册一次、卸载时注销，每轮循环按固定顺序调用：
/// 帧前 → [帧渲染，在本系统控制之外] → 帧后；本轮未渲染帧时
/// 改为调用空闲钩子。
pub trait FrameHooks {
    /// 帧前钩子
    fn before_frame(&mut self);

    /// 帧后钩子
    ///
    /// # 参数
    /// - `timestamp_ms`: 宿主时钟的当前时间戳（毫秒）
    fn after_frame(&mut self, timestamp_ms: f64);

    /// 空闲/尾钩子
    fn idle(&mut self);
}

/// 帧编排器
pub struct FrameOrchestrator {
    state: ProbeState,
    info: RenderInfoHandle,
    scene_root: NodeHandle,
    engine: Box<dyn MetricsEngine>,
    analyzer: Box<dyn GeometryAnalyzer>,
    deep_analyze: bool,
    policy: MultiMaterialPolicy,
    session: SessionHandle,
}

impl FrameOrchestrator {
    /// 挂载到一个 渲染器/场景 对
    ///
    /// 接管计数器复位所有权（关闭渲染器的自动复位），把指标引擎
    /// 的两个回调槽接到会话上。
    ///
    /// # 参数
    /// - `renderer`: 宿主渲染器句柄
    /// - `scene_root`: 场景根节点
    /// - `engine`: 指标引擎
    /// - `analyzer`: 几何分析器
    /// - `config`: 探针配置
    /// - `session`: 会话共享状态
    ///
    /// # 返回
    /// 渲染器不暴露计数器对象时返回 `ScenePerfError::Attach`——
    /// 启动失败，不发布任何指标。
    pub fn attach(
        renderer: &RendererHandle,
        scene_root: NodeHandle,
        mut engine: Box<dyn MetricsEngine>,
        analyzer: Box<dyn GeometryAnalyzer>,
        config: &PerfConfig,
        session: SessionHandle,
    ) -> Result<Self> {
        let info = renderer.info().ok_or_else(|| {
            ScenePerfError::Attach("renderer exposes no counter object".to_string())
        })?;

        // 复位所有权移交探针
        info.borrow_mut().counters.auto_reset = false;

        // 指标引擎回调槽接到会话：图表历史与帧指标都整体替换发布
        let chart_session = Rc::clone(&session);
        engine.set_chart_sink(Box::new(move |chart| {
            chart_session.publish_chart(chart);
        }));
        let param_session = Rc::clone(&session);
        engine.set_param_sink(Box::new(move |metrics| {
            param_session.publish_metrics(metrics);
        }));

        tracing::info!(
            target: "sceneperf::probe",
            deep_analyze = config.analysis.deep_analyze,
            "Instrumentation attached"
        );

        Ok(Self {
            state: ProbeState::Idle,
            info,
            scene_root,
            engine,
            analyzer,
            deep_analyze: config.analysis.deep_analyze,
            policy: config.analysis.multi_material_policy,
            session,
        })
    }

    /// 当前状态
    pub fn state(&self) -> ProbeState {
        self.state
    }

    /// 会话句柄
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// 卸载
    ///
    /// 取消指标引擎拥有的未决调度句柄。幂等，可安全多次调用；
    /// 钩子的注销由宿主完成。
    pub fn detach(&mut self) {
        if self.state == ProbeState::Detached {
            return;
        }
        self.engine.cancel_scheduled();
        self.state = ProbeState::Detached;
        tracing::info!(target: "sceneperf::probe", "Instrumentation detached");
    }

    /// 运行一趟深度分析：扫描 → 匹配 → 按需重算绘制计数并发布
    ///
    /// 关联键集大小与上一趟不同才发布新存储并递增更新计数；
    /// 消费者用计数而非深比较检测变化。
    fn run_deep_analysis(&mut self) -> Result<()> {
        let scan_result = scanner::scan(&self.scene_root, self.policy)?;
        let mut correlations = {
            let info = self.info.borrow();
            matcher::match_programs(&info.programs, &scan_result)?
        };

        if correlations.len() != self.session.correlation_store().len() {
            self.analyzer.recompute(&mut correlations);
            self.session.publish_correlations(correlations);
        }
        Ok(())
    }
}

impl FrameHooks for FrameOrchestrator {
    fn before_frame(&mut self) {
        if self.state == ProbeState::Detached {
            return;
        }
        // 上一轮空闲置位的暂停标志在此自动清除
        if self.session.is_paused() {
            self.session.set_paused(false);
        }
        self.engine.set_paused(false);
        self.state = ProbeState::Active;

        self.info.borrow_mut().counters.reset();
        self.engine.begin(PROFILER_LABEL);
    }

    fn after_frame(&mut self, timestamp_ms: f64) {
        if self.state != ProbeState::Active {
            return;
        }
        self.engine.end(PROFILER_LABEL);
        self.engine.next_frame(timestamp_ms);

        if self.deep_analyze {
            match self.run_deep_analysis() {
                Ok(()) => {}
                // 配置类错误（保留槽被外部数据占用）每趟必然复现，
                // 报告一次后关闭深度分析，避免逐帧刷屏
                Err(e @ ScenePerfError::Tagging(_)) => {
                    self.deep_analyze = false;
                    tracing::error!(
                        target: "sceneperf::probe",
                        error = %e,
                        "Configuration error, deep analysis disabled"
                    );
                }
                // 稳态关联失败只降低本趟归因的完整性，
                // 不中断优先级更高的指标流
                Err(e) => {
                    tracing::warn!(
                        target: "sceneperf::probe",
                        error = %e,
                        "Deep analysis pass skipped"
                    );
                }
            }
        }
    }

    fn idle(&mut self) {
        if self.state == ProbeState::Detached {
            return;
        }
        self.state = ProbeState::Paused;
        self.engine.set_paused(true);
        self.session.set_paused(true);
        self.session.publish_metrics(FrameMetrics::zeroed());
    }
}

impl Drop for FrameOrchestrator {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::perf::correlation::{CorrelationMap, MeshDrawCount, PrimitiveType};
    use crate::perf::geometry::NullGeometryAnalyzer;
    use crate::perf::metrics::{ChartSink, ChartUpdate, ParamSink};
    use crate::perf::state::PerfSession;
    use crate::perf::{IdentityToken, PERF_DEFINE_KEY};
    use crate::renderer::{GpuProgram, RenderInfo};
    use crate::scene::{Geometry, Material, MaterialHandle, NodeKind, SceneNode};

    /// 记录调用序列的指标引擎替身
    ///
    /// 每次 `next_frame` 按自身节奏回调两个槽位，模拟真实引擎。
    struct StubEngine {
        calls: Rc<RefCell<Vec<String>>>,
        param_sink: Option<ParamSink>,
        chart_sink: Option<ChartSink>,
        chart_ticks: usize,
    }

    impl StubEngine {
        fn new(calls: Rc<RefCell<Vec<String>>>) -> Self {
            Self {
                calls,
                param_sink: None,
                chart_sink: None,
                chart_ticks: 0,
            }
        }
    }

    impl MetricsEngine for StubEngine {
        fn begin(&mut self, label: &str) {
            self.calls.borrow_mut().push(format!("begin:{}", label));
        }

        fn end(&mut self, label: &str) {
            self.calls.borrow_mut().push(format!("end:{}", label));
        }

        fn next_frame(&mut self, _timestamp_ms: f64) {
            self.calls.borrow_mut().push("next_frame".to_string());
            if let Some(sink) = self.param_sink.as_mut() {
                sink(FrameMetrics {
                    fps: 60.0,
                    frame_count: 1,
                    ..FrameMetrics::zeroed()
                });
            }
            if let Some(sink) = self.chart_sink.as_mut() {
                self.chart_ticks += 1;
                let mut data = std::collections::BTreeMap::new();
                data.insert("fps".to_string(), vec![60.0_f32; self.chart_ticks]);
                sink(ChartUpdate {
                    data,
                    circular_id: self.chart_ticks,
                });
            }
        }

        fn set_paused(&mut self, paused: bool) {
            self.calls.borrow_mut().push(format!("paused:{}", paused));
        }

        fn cancel_scheduled(&mut self) {
            self.calls.borrow_mut().push("cancel".to_string());
        }

        fn set_chart_sink(&mut self, sink: ChartSink) {
            self.chart_sink = Some(sink);
        }

        fn set_param_sink(&mut self, sink: ParamSink) {
            self.param_sink = Some(sink);
        }
    }

    /// 按网格几何填充三角形计数的分析器替身
    struct TriangleAnalyzer;

    impl GeometryAnalyzer for TriangleAnalyzer {
        fn recompute(&self, correlations: &mut CorrelationMap) {
            for record in correlations.values_mut() {
                record.draw_counts.per_mesh.clear();
                record.draw_counts.total = 0;
                for mesh in &record.meshes {
                    let mesh_ref = mesh.borrow();
                    if let NodeKind::Mesh(geometry) = mesh_ref.kind {
                        let count = geometry.triangle_count();
                        record.draw_counts.per_mesh.push(MeshDrawCount {
                            node_id: mesh_ref.id(),
                            primitive: PrimitiveType::Triangles,
                            count,
                        });
                        record.draw_counts.total += count;
                    }
                }
            }
        }
    }

    struct Fixture {
        orchestrator: FrameOrchestrator,
        info: RenderInfoHandle,
        calls: Rc<RefCell<Vec<String>>>,
        material: MaterialHandle,
    }

    fn fixture(deep_analyze: bool) -> Fixture {
        let material = Material::new_handle("Standard");
        let mesh = SceneNode::mesh(
            "Cube",
            Geometry::new(24, 36),
            vec![MaterialHandle::clone(&material)],
        );
        let root = SceneNode::group("Root");
        SceneNode::add_child(&root, mesh);

        let info = RenderInfo::new().into_handle();
        let renderer = RendererHandle::with_info(Rc::clone(&info));

        let calls = Rc::new(RefCell::new(Vec::new()));
        let engine = Box::new(StubEngine::new(Rc::clone(&calls)));

        let mut config = PerfConfig::default();
        config.analysis.deep_analyze = deep_analyze;

        let orchestrator = FrameOrchestrator::attach(
            &renderer,
            root,
            engine,
            Box::new(TriangleAnalyzer),
            &config,
            PerfSession::new(),
        )
        .unwrap();

        Fixture {
            orchestrator,
            info,
            calls,
            material,
        }
    }

    fn tagged_cache_key(material: &MaterialHandle) -> String {
        let token = IdentityToken::from_uuid(material.borrow().uuid());
        format!("precision,{},{},highp", PERF_DEFINE_KEY, token)
    }

    #[test]
    fn test_attach_fails_without_counters() {
        let renderer = RendererHandle::without_info();
        let result = FrameOrchestrator::attach(
            &renderer,
            SceneNode::group("Root"),
            Box::new(StubEngine::new(Rc::new(RefCell::new(Vec::new())))),
            Box::new(NullGeometryAnalyzer),
            &PerfConfig::default(),
            PerfSession::new(),
        );
        assert!(matches!(result, Err(ScenePerfError::Attach(_))));
    }

    #[test]
    fn test_attach_takes_reset_ownership() {
        let f = fixture(false);
        assert!(!f.info.borrow().counters.auto_reset);
        assert_eq!(f.orchestrator.state(), ProbeState::Idle);
    }

    #[test]
    fn test_before_frame_resets_counters_and_begins_timing() {
        let mut f = fixture(false);
        f.info.borrow_mut().counters.calls = 9;

        f.orchestrator.before_frame();
        assert_eq!(f.info.borrow().counters.calls, 0);
        assert_eq!(f.orchestrator.state(), ProbeState::Active);
        assert!(f.calls.borrow().contains(&"begin:profiler".to_string()));
    }

    #[test]
    fn test_after_frame_ends_timing_and_advances() {
        let mut f = fixture(false);
        f.orchestrator.before_frame();
        f.orchestrator.after_frame(16.6);

        let calls = f.calls.borrow();
        let begin = calls.iter().position(|c| c == "begin:profiler").unwrap();
        let end = calls.iter().position(|c| c == "end:profiler").unwrap();
        let next = calls.iter().position(|c| c == "next_frame").unwrap();
        assert!(begin < end && end < next);
    }

    #[test]
    fn test_pause_zeroing_and_resume() {
        let mut f = fixture(false);
        f.orchestrator.before_frame();
        f.orchestrator.after_frame(16.6);

        let session = Rc::clone(f.orchestrator.session());
        assert_eq!(session.latest_metrics().fps, 60.0);

        f.orchestrator.idle();
        assert!(session.is_paused());
        assert_eq!(session.latest_metrics(), FrameMetrics::zeroed());
        assert_eq!(f.orchestrator.state(), ProbeState::Paused);

        // 下一个帧前事件自动清除暂停标志
        f.orchestrator.before_frame();
        assert!(!session.is_paused());
        assert_eq!(f.orchestrator.state(), ProbeState::Active);
    }

    #[test]
    fn test_deep_analysis_publishes_correlations() {
        let mut f = fixture(true);
        f.info
            .borrow_mut()
            .programs
            .add(GpuProgram::new(1, tagged_cache_key(&f.material)));

        f.orchestrator.before_frame();
        f.orchestrator.after_frame(16.6);

        let session = Rc::clone(f.orchestrator.session());
        let store = session.correlation_store();
        assert_eq!(store.len(), 1);
        assert_eq!(session.update_counter(), 1);

        // 几何分析器已填充绘制分解
        let record = store.values().next().unwrap();
        assert_eq!(record.draw_counts.total, 12);
        assert_eq!(record.draw_counts.per_mesh.len(), 1);
    }

    #[test]
    fn test_update_counter_only_moves_on_size_change() {
        let mut f = fixture(true);
        f.info
            .borrow_mut()
            .programs
            .add(GpuProgram::new(1, tagged_cache_key(&f.material)));

        f.orchestrator.before_frame();
        f.orchestrator.after_frame(16.6);
        let session = Rc::clone(f.orchestrator.session());
        assert_eq!(session.update_counter(), 1);

        // 场景与程序集未变：第二趟不发布、计数不动
        f.orchestrator.before_frame();
        f.orchestrator.after_frame(33.2);
        assert_eq!(session.update_counter(), 1);

        // 新材质与新程序进入：键集大小变化，计数递增
        let extra = Material::new_handle("Extra");
        let mesh = SceneNode::mesh(
            "Sphere",
            Geometry::new(8, 12),
            vec![MaterialHandle::clone(&extra)],
        );
        SceneNode::add_child(&f.orchestrator.scene_root, mesh);
        f.info
            .borrow_mut()
            .programs
            .add(GpuProgram::new(2, tagged_cache_key(&extra)));

        f.orchestrator.before_frame();
        f.orchestrator.after_frame(49.8);
        assert_eq!(session.update_counter(), 2);
        assert_eq!(session.correlation_store().len(), 2);
    }

    #[test]
    fn test_correlation_stability_across_passes() {
        let mut f = fixture(true);
        f.info
            .borrow_mut()
            .programs
            .add(GpuProgram::new(1, tagged_cache_key(&f.material)));

        f.orchestrator.before_frame();
        f.orchestrator.after_frame(16.6);
        let session = Rc::clone(f.orchestrator.session());
        let first = session.correlation_store();

        f.orchestrator.before_frame();
        f.orchestrator.after_frame(33.2);
        let second = session.correlation_store();

        let first_keys: Vec<&IdentityToken> = first.keys().collect();
        let second_keys: Vec<&IdentityToken> = second.keys().collect();
        assert_eq!(first_keys, second_keys);
        for (token, record) in first.iter() {
            let other = &second[token];
            assert!(MaterialHandle::ptr_eq(&record.material, &other.material));
        }
    }

    #[test]
    fn test_chart_updates_republished_to_session() {
        let mut f = fixture(false);
        let session = Rc::clone(f.orchestrator.session());
        assert!(session.chart().is_none());

        f.orchestrator.before_frame();
        f.orchestrator.after_frame(16.6);

        let first = session.chart().unwrap();
        assert_eq!(first.circular_id, 1);
        assert_eq!(first.data["fps"], vec![60.0_f32]);

        // 下一次更新整体替换；已取得的快照不受影响
        f.orchestrator.before_frame();
        f.orchestrator.after_frame(33.2);

        let second = session.chart().unwrap();
        assert_eq!(second.circular_id, 2);
        assert_eq!(second.data["fps"].len(), 2);
        assert_eq!(first.circular_id, 1);
    }

    #[test]
    fn test_reserved_slot_error_latches_deep_analysis_off() {
        let mut f = fixture(true);
        // 保留槽被外部数据占用：扫描趟的标记会失败
        f.material
            .borrow_mut()
            .defines
            .insert(PERF_DEFINE_KEY.to_string(), "1".to_string());

        f.orchestrator.before_frame();
        f.orchestrator.after_frame(16.6);
        assert!(!f.orchestrator.deep_analyze);

        // 后续帧不再重试深度分析，指标流不受影响
        f.orchestrator.before_frame();
        f.orchestrator.after_frame(33.2);
        let session = Rc::clone(f.orchestrator.session());
        assert_eq!(session.latest_metrics().fps, 60.0);
        assert!(session.correlation_store().is_empty());
    }

    #[test]
    fn test_duplicate_token_does_not_latch_deep_analysis() {
        let mut f = fixture(true);
        let key = tagged_cache_key(&f.material);
        f.info.borrow_mut().programs.add(GpuProgram::new(1, key.clone()));
        f.info.borrow_mut().programs.add(GpuProgram::new(2, key));

        f.orchestrator.before_frame();
        f.orchestrator.after_frame(16.6);

        // 匹配器错误只跳过本趟，深度分析保持开启
        assert!(f.orchestrator.deep_analyze);
        let session = Rc::clone(f.orchestrator.session());
        assert!(session.correlation_store().is_empty());

        // 重复程序消失后恢复正常关联
        f.info.borrow_mut().programs.remove(2);
        f.orchestrator.before_frame();
        f.orchestrator.after_frame(33.2);
        assert_eq!(session.correlation_store().len(), 1);
    }

    #[test]
    fn test_detach_is_idempotent() {
        let mut f = fixture(false);
        f.orchestrator.detach();
        f.orchestrator.detach();
        assert_eq!(f.orchestrator.state(), ProbeState::Detached);
        assert_eq!(
            f.calls.borrow().iter().filter(|c| *c == "cancel").count(),
            1
        );

        // 卸载后帧钩子不再起作用
        f.orchestrator.before_frame();
        assert_eq!(f.orchestrator.state(), ProbeState::Detached);
    }
}
