//! 编译程序表模块
//!
//! 建模渲染器持有的当前已编译 GPU 程序集合。每个程序暴露一个
//! 不透明的缓存键字符串——渲染器用它按编译期配置去重程序变体。
//! 探针只读取缓存键，所有解析逻辑集中在 `perf::matcher`。

use std::rc::Rc;

/// 编译程序共享句柄
pub type ProgramHandle = Rc<GpuProgram>;

/// 已编译的 GPU 程序
#[derive(Debug, PartialEq, Eq)]
pub struct GpuProgram {
    /// 程序标识（渲染器程序表内唯一）
    id: u32,

    /// 编译缓存键
    ///
    /// 逗号分隔的自由格式字符串，编码所有区分编译变体的预处理定义。
    cache_key: String,
}

impl GpuProgram {
    /// 创建程序记录
    pub fn new(id: u32, cache_key: impl Into<String>) -> Self {
        Self {
            id,
            cache_key: cache_key.into(),
        }
    }

    /// 获取程序标识
    pub fn id(&self) -> u32 {
        self.id
    }

    /// 获取编译缓存键
    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }
}

/// 渲染器的活动程序表
#[derive(Debug, Default)]
pub struct ProgramTable {
    programs: Vec<ProgramHandle>,
}

impl ProgramTable {
    /// 创建空程序表
    pub fn new() -> Self {
        Self { programs: Vec::new() }
    }

    /// 登记一个已编译程序
    pub fn add(&mut self, program: GpuProgram) -> ProgramHandle {
        let handle = Rc::new(program);
        self.programs.push(Rc::clone(&handle));
        handle
    }

    /// 移除指定标识的程序
    ///
    /// # 返回
    /// 找到并移除返回 `true`，否则返回 `false`
    pub fn remove(&mut self, id: u32) -> bool {
        let original_len = self.programs.len();
        self.programs.retain(|p| p.id() != id);
        original_len != self.programs.len()
    }

    /// 遍历当前所有程序
    pub fn iter(&self) -> impl Iterator<Item = &ProgramHandle> {
        self.programs.iter()
    }

    /// 程序数量
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove() {
        let mut table = ProgramTable::new();
        table.add(GpuProgram::new(1, "foo,bar"));
        table.add(GpuProgram::new(2, "baz"));
        assert_eq!(table.len(), 2);

        assert!(table.remove(1));
        assert!(!table.remove(1));
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().next().unwrap().id(), 2);
    }
}
