//! ScenePerf - 渲染管线实时性能探针
//!
//! ScenePerf 对 3D 渲染管线做逐帧的耗时/内存/GPU 计数采样，并可
//! 按需把已编译的 GPU 着色器程序反向关联到产生它们的场景材质与
//! 网格，使绘制调用成本能归因到具体对象，而不是一个不透明的总量。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（日志、配置、错误处理）
//! - `scene`: 场景模型（节点、材质）
//! - `renderer`: 渲染器接口（逐帧计数器、活动程序表）
//! - `perf`: 关联引擎与帧编排（标记器、扫描器、匹配器、编排器）
//!
//! # 使用示例
//!
//! ```no_run
//! use std::rc::Rc;
//! use scene_perf::core::config::PerfConfig;
//! use scene_perf::perf::geometry::NullGeometryAnalyzer;
//! use scene_perf::perf::state::PerfSession;
//! use scene_perf::perf::{FrameHooks, FrameOrchestrator};
//! use scene_perf::renderer::{RenderInfo, RendererHandle};
//! use scene_perf::scene::SceneNode;
//!
//! # fn engine() -> Box<dyn scene_perf::perf::MetricsEngine> { unimplemented!() }
//! let info = RenderInfo::new().into_handle();
//! let renderer = RendererHandle::with_info(Rc::clone(&info));
//! let scene = SceneNode::group("Root");
//! let session = PerfSession::new();
//!
//! let mut probe = FrameOrchestrator::attach(
//!     &renderer,
//!     scene,
//!     engine(),
//!     Box::new(NullGeometryAnalyzer),
//!     &PerfConfig::default(),
//!     Rc::clone(&session),
//! ).expect("renderer must expose counters");
//!
//! // 宿主渲染循环的每轮迭代：
//! probe.before_frame();
//! // ... 帧渲染在探针控制之外 ...
//! probe.after_frame(16.6);
//!
//! let metrics = session.latest_metrics();
//! println!("fps: {}", metrics.fps);
//! ```

pub mod core;
pub mod scene;
pub mod renderer;
pub mod perf;

pub use crate::core::{PerfConfig, Result, ScenePerfError};
pub use perf::{FrameHooks, FrameOrchestrator, PerfSession, SessionHandle};
