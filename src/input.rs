use crate::Integer;
use crate::pipe::{Inlet, Stream};
use crossbeam_channel::Receiver;
use std::iter::successors;

impl<T: Send + 'static> Stream<T> {
    /// 使用给定的有限序列作为源，按原始顺序输出。
    pub fn from_values(values: Vec<T>) -> Stream<T> {
        Stream::source("values", move |_| values.into_iter())
    }

    /// 复制切片中的元素作为源。
    pub fn from_slice(slice: &[T]) -> Stream<T>
    where
        T: Clone,
    {
        Stream::from_values(slice.to_vec())
    }

    /// 使用任意迭代器作为源，可以是无限的，由源工作线程按需拉取。
    pub fn from_iterator<I>(iter: I) -> Stream<T>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        let iter = iter.into_iter();
        Stream::source("iter", move |_| iter)
    }

    /// 使用外部生产者填充的通道作为源，直到通道断开或执行被停止。
    pub fn from_channel(feed: Receiver<T>) -> Stream<T> {
        Stream::source("channel", move |shutdown| Inlet::new(feed, shutdown.clone()))
    }

    /// 重复字面值作为源，`count`未指定时无限重复。
    pub fn repeat(value: T, count: Option<usize>) -> Stream<T>
    where
        T: Clone,
    {
        match count {
            Some(count) => Stream::source("repeat", move |_| std::iter::repeat_n(value, count)),
            None => Stream::source("repeat", move |_| std::iter::repeat(value)),
        }
    }
}

impl Stream<Integer> {
    /// 生成指定范围内的整数作为源。
    ///
    /// * `start` - 起始值，包含。
    /// * `end` - 结束值，包含；起始值大于结束值时无数据生成。
    /// * `step` - 步长，正值正序生成，负值逆序生成，为0时无限重复起始值。
    ///
    /// 例如：`range(0, 10, 2)`生成`0 2 4 6 8 10`，`range(0, 10, -1)`生成`10 9 8 ... 0`。
    pub fn range(start: Integer, end: Integer, step: Integer) -> Stream<Integer> {
        Stream::source("range", move |_| range_to_iter(start, end, step))
    }
}

impl<T: Send + 'static> From<Vec<T>> for Stream<T> {
    fn from(values: Vec<T>) -> Self {
        Stream::from_values(values)
    }
}

/// 以字面值列表创建流水线：`stream_of![1, 2, 3]`。
#[macro_export]
macro_rules! stream_of {
    () => {
        $crate::Stream::from_values(::std::vec::Vec::new())
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Stream::from_values(::std::vec![$($value),+])
    };
}

/// 起始值大于结束值时为空；步长为0时无限重复起始值；越过整数边界时结束。
fn range_to_iter(start: Integer, end: Integer, step: Integer) -> Box<dyn Iterator<Item = Integer>> {
    if start > end {
        return Box::new(std::iter::empty());
    }
    let stride = step.unsigned_abs();
    match step.signum() {
        0 => Box::new(std::iter::repeat(start)),
        1 => {
            let forward = successors(Some(start), move |x| x.checked_add_unsigned(stride));
            Box::new(forward.take_while(move |x| *x <= end))
        }
        _ => {
            let backward = successors(Some(end), move |x| x.checked_sub_unsigned(stride));
            Box::new(backward.take_while(move |x| *x >= start))
        }
    }
}
