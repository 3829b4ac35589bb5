//! 基于通道的惰性流式处理。
//!
//! 中间操作只登记处理逻辑，终止操作才启动执行：源阶段和每个中间阶段各占一个工作线程，
//! 阶段之间默认同步交接（生产者至多领先消费者一个元素）。终止操作返回前会停止并回收全部工作线程。
//!
//! ```
//! use rstream::stream_of;
//!
//! let res = stream_of!["1", "2", "3", "8", "5", "4", "7", "10", "2", "10", "1"]
//!     .distinct()
//!     .map(|s| s.parse::<i64>().unwrap_or_default())
//!     .filter(|n| n % 2 == 0)
//!     .sorted_by(|l, r| l > r)
//!     .to_array();
//! assert_eq!(res, vec![10, 8, 4, 2]);
//! ```

mod config;
mod err;
mod input;
mod op;
mod output;
mod pipe;
mod value;

pub use config::Config;
pub use err::StreamErr;
pub use op::sort::NaturalOrder;
pub use output::JoinInfo;
pub use pipe::Stream;
pub use value::Value;

/// 整数类型
pub type Integer = i64;

/// 浮点数类型
pub type Float = f64;
