/// 流水线执行配置，随每条流水线显式传递，不存在全局状态。
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Config {
    /// 阶段间通道容量，`0`表示同步交接（生产者至多领先消费者一个元素）。
    pub capacity: usize,
    /// 工作线程名前缀，完整线程名为`<prefix>-<depth>-<stage>`。
    pub thread_name: String,
    /// 工作线程栈大小，未指定时使用标准库默认值。
    pub stack_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config { capacity: 0, thread_name: "rstream".to_owned(), stack_size: None }
    }
}

impl Config {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }

    #[inline]
    pub(crate) fn is_rendezvous(&self) -> bool {
        self.capacity == 0
    }
}
