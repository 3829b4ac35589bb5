use crate::op::sort::NaturalOrder;
use crate::pipe::Stream;
use itertools::Itertools;
use std::fmt::Display;
use std::iter::Sum;

/// `joining`的拼接信息。
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct JoinInfo {
    pub delimiter: String,
    pub prefix: String,
    pub postfix: String,
}

impl JoinInfo {
    pub fn new(delimiter: impl Into<String>, prefix: impl Into<String>, postfix: impl Into<String>) -> Self {
        JoinInfo { delimiter: delimiter.into(), prefix: prefix.into(), postfix: postfix.into() }
    }
}

impl<T: Send + 'static> Stream<T> {
    /// 统计到达终止阶段的元素数量。
    pub fn count(self) -> usize {
        let mut run = self.execute();
        let count = run.by_ref().count();
        run.finish(false);
        count
    }

    /// 按自然顺序的最小元素，多个相等时取最先到达的，空流水线返回默认值。
    pub fn min(self) -> T
    where
        T: NaturalOrder + Default,
    {
        self.min_by(T::natural_lt)
    }

    /// 按小于比较函数的最小元素，多个相等时取最先到达的，空流水线返回默认值。
    pub fn min_by<F>(self, mut less: F) -> T
    where
        T: Default,
        F: FnMut(&T, &T) -> bool,
    {
        self.extreme_by(move |current, item| less(item, current)).unwrap_or_default()
    }

    /// 按自然顺序的最大元素，多个相等时取最先到达的，空流水线返回默认值。
    pub fn max(self) -> T
    where
        T: NaturalOrder + Default,
    {
        self.max_by(T::natural_lt)
    }

    /// 按小于比较函数的最大元素，多个相等时取最先到达的，空流水线返回默认值。
    pub fn max_by<F>(self, mut less: F) -> T
    where
        T: Default,
        F: FnMut(&T, &T) -> bool,
    {
        self.extreme_by(move |current, item| less(current, item)).unwrap_or_default()
    }

    fn extreme_by(self, mut replace: impl FnMut(&T, &T) -> bool) -> Option<T> {
        let mut run = self.execute();
        let mut extreme = run.next();
        if let Some(current) = extreme.as_mut() {
            for item in run.by_ref() {
                if replace(current, &item) {
                    *current = item;
                }
            }
        }
        run.finish(false);
        extreme
    }

    /// 第一个到达的元素，取得后立即停止整条流水线。
    pub fn first(self) -> Option<T> {
        let mut run = self.execute();
        let first = run.next();
        run.finish(first.is_some());
        first
    }

    /// 最后一个到达的元素，需要耗尽整条流水线。
    pub fn last(self) -> Option<T> {
        let mut run = self.execute();
        let last = run.by_ref().last();
        run.finish(false);
        last
    }

    /// 第一个到达的元素，空流水线返回默认值。
    pub fn find_first(self) -> T
    where
        T: Default,
    {
        self.first().unwrap_or_default()
    }

    /// 最后一个到达的元素，空流水线返回默认值。
    pub fn find_last(self) -> T
    where
        T: Default,
    {
        self.last().unwrap_or_default()
    }

    /// 是否存在满足`test`的元素，首次满足时停止。
    pub fn any_match<F>(self, mut test: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        let mut run = self.execute();
        let matched = run.any(|item| test(&item));
        run.finish(matched);
        matched
    }

    /// 是否全部元素都满足`test`，首次不满足时停止，空流水线返回`true`。
    pub fn all_match<F>(self, mut test: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        let mut run = self.execute();
        let matched = run.all(|item| test(&item));
        run.finish(!matched);
        matched
    }

    /// 是否没有元素满足`test`，首次满足时停止，空流水线返回`true`。
    pub fn none_match<F>(self, test: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        !self.any_match(test)
    }

    /// 对每个元素调用`consumer`。
    pub fn for_each<F>(self, consumer: F)
    where
        F: FnMut(T),
    {
        let mut run = self.execute();
        run.by_ref().for_each(consumer);
        run.finish(false);
    }

    /// 按到达顺序收集到任意容器。
    pub fn to_list<C>(self) -> C
    where
        C: FromIterator<T>,
    {
        let mut run = self.execute();
        let list = run.by_ref().collect::<C>();
        run.finish(false);
        list
    }

    /// 按到达顺序收集到`Vec`。
    pub fn to_array(self) -> Vec<T> {
        self.to_list()
    }

    /// 先重置`target`，再按到达顺序写入全部元素。
    pub fn unmarshal<C>(self, target: &mut C)
    where
        C: Default + Extend<T>,
    {
        *target = C::default();
        let mut run = self.execute();
        target.extend(run.by_ref());
        run.finish(false);
    }

    /// 累加全部元素。
    pub fn sum<S>(self) -> S
    where
        S: Sum<T>,
    {
        let mut run = self.execute();
        let sum = run.by_ref().sum::<S>();
        run.finish(false);
        sum
    }

    /// 以分隔符拼接全部元素，并加上前缀和后缀。
    pub fn joining(self, join_info: &JoinInfo) -> String
    where
        T: Display,
    {
        let mut run = self.execute();
        let joined = format!("{}{}{}", join_info.prefix, run.by_ref().join(&join_info.delimiter), join_info.postfix);
        run.finish(false);
        joined
    }
}
