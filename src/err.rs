use crate::Integer;
use thiserror::Error;

#[derive(Error, Debug, Eq, PartialEq)]
pub enum StreamErr {
    #[error("[Bad Arg] Argument `{arg}` of op `{op}` must be non-negative, got `{count}`")]
    NegativeCount { op: &'static str, arg: &'static str, count: Integer },

    #[error("[Compare] Can not compare `{left}` with `{right}` by natural order")]
    Incomparable { left: String, right: String },

    #[error("[Worker] Spawn worker of stage `{stage}` at depth `{depth}` error: {err}")]
    SpawnWorker { stage: &'static str, depth: usize, err: String },
}

impl StreamErr {
    /// 用法错误属于编程错误，直接以错误信息终止当前调用。
    pub fn termination(self) -> ! {
        panic!("{}", self)
    }
}
