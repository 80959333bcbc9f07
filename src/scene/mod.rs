//! 场景模型模块
//!
//! 定义探针消费的宿主场景图模型：节点、材质。
//! 探针不拥有场景，只持有共享引用做只读遍历；唯一的例外是
//! 标记器对材质编译状态的写入（见 `perf::tagger`）。

pub mod material;
pub mod node;

pub use material::{Material, MaterialHandle};
pub use node::{Geometry, NodeHandle, NodeKind, SceneNode};
