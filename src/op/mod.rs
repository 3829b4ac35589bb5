pub(crate) mod sort;

use crate::Integer;
use crate::err::StreamErr;
use crate::op::sort::{NaturalOrder, ordering_by_less};
use crate::pipe::Stream;
use itertools::Itertools;
use rand::seq::SliceRandom;
use rustc_hash::FxHashSet;
use std::hash::Hash;

impl<T: Send + 'static> Stream<T> {
    /* **************************************** 访问 **************************************** */
    /// 对每个元素调用`observer`，然后原样输出。
    pub fn peek<F>(self, observer: F) -> Stream<T>
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.stage("peek", move |inlet| inlet.inspect(observer))
    }

    /* **************************************** 转换 **************************************** */
    /// 输出`transform(element)`，元素类型可以改变。
    pub fn map<U, F>(self, transform: F) -> Stream<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> U + Send + 'static,
    {
        self.stage("map", move |inlet| inlet.map(transform))
    }

    /* **************************************** 减少 **************************************** */
    /// 去重，按完整相等判断，保留首次出现的元素及其顺序。
    pub fn distinct(self) -> Stream<T>
    where
        T: Eq + Hash + Clone,
    {
        self.stage("distinct", |inlet| {
            let mut seen = FxHashSet::default();
            inlet.filter(move |item| seen.insert(item.clone())) // 返回 true 表示保留（首次出现）
        })
    }

    /// 按自定义相等去重，保留首次出现的元素及其顺序。
    ///
    /// 相等函数无法哈希，每个元素都要与已保留的全部元素比较。
    pub fn distinct_by<F>(self, mut equals: F) -> Stream<T>
    where
        T: Clone,
        F: FnMut(&T, &T) -> bool + Send + 'static,
    {
        self.stage("distinct_by", move |inlet| {
            let mut seen: Vec<T> = Vec::new();
            inlet.filter(move |item| {
                if seen.iter().any(|kept| equals(kept, item)) {
                    false
                } else {
                    seen.push(item.clone());
                    true
                }
            })
        })
    }

    /// 保留满足`test`的元素。
    pub fn filter<F>(self, test: F) -> Stream<T>
    where
        F: FnMut(&T) -> bool + Send + 'static,
    {
        self.stage("filter", move |inlet| inlet.filter(test))
    }

    /// 丢弃前`n`个元素，`n`为负数时直接panic。
    pub fn skip(self, n: Integer) -> Stream<T> {
        self.try_skip(n).unwrap_or_else(|err| err.termination())
    }

    /// 丢弃前`n`个元素，`n`为0时不增加阶段。
    pub fn try_skip(self, n: Integer) -> Result<Stream<T>, StreamErr> {
        let n = non_negative("skip", "n", n)?;
        if n == 0 {
            return Ok(self);
        }
        Ok(self.stage("skip", move |inlet| inlet.skip(n)))
    }

    /// 保留前`max`个元素，`max`为负数时直接panic。
    pub fn limit(self, max: Integer) -> Stream<T> {
        self.try_limit(max).unwrap_or_else(|err| err.termination())
    }

    /// 保留前`max`个元素。达到数量后立即关闭上游，不再拉取后续数据。
    ///
    /// 达到数量即视为结果已确定，上游此后发生的panic只记录不传播。
    pub fn try_limit(self, max: Integer) -> Result<Stream<T>, StreamErr> {
        let max = non_negative("limit", "max", max)?;
        Ok(self.stage_with_cutoff("limit", move |inlet, cutoff| {
            if max == 0 {
                cutoff.reach();
            }
            inlet.take(max).enumerate().map(move |(idx, item)| {
                if idx + 1 == max {
                    cutoff.reach();
                }
                item
            })
        }))
    }

    /// 持续保留满足`test`的元素，直到首次不满足。
    pub fn take_while<F>(self, test: F) -> Stream<T>
    where
        F: FnMut(&T) -> bool + Send + 'static,
    {
        self.stage("take_while", move |inlet| inlet.take_while(test))
    }

    /// 持续丢弃满足`test`的元素，直到首次不满足。
    pub fn skip_while<F>(self, test: F) -> Stream<T>
    where
        F: FnMut(&T) -> bool + Send + 'static,
    {
        self.stage("skip_while", move |inlet| inlet.skip_while(test))
    }

    /* **************************************** 调整位置 **************************************** */
    /// 按自然顺序稳定排序，读完全部输入后才开始输出。
    pub fn sorted(self) -> Stream<T>
    where
        T: NaturalOrder,
    {
        self.stage("sorted", |inlet| inlet.sorted_by(T::natural_cmp))
    }

    /// 按小于比较函数稳定排序，互不小于的元素保持输入顺序。
    pub fn sorted_by<F>(self, mut less: F) -> Stream<T>
    where
        F: FnMut(&T, &T) -> bool + Send + 'static,
    {
        self.stage("sorted", move |inlet| inlet.sorted_by(move |left, right| ordering_by_less(&mut less, left, right)))
    }

    /// 按键稳定排序。
    pub fn sorted_by_key<K, F>(self, key: F) -> Stream<T>
    where
        K: Ord,
        F: FnMut(&T) -> K + Send + 'static,
    {
        self.stage("sorted", move |inlet| inlet.sorted_by_key(key))
    }

    /// 随机排序，读完全部输入后才开始输出。
    pub fn shuffled(self) -> Stream<T> {
        self.stage("shuffled", |inlet| {
            let mut items = inlet.collect::<Vec<_>>();
            items.shuffle(&mut rand::rng());
            items.into_iter()
        })
    }
}

fn non_negative(op: &'static str, arg: &'static str, count: Integer) -> Result<usize, StreamErr> {
    usize::try_from(count).map_err(|_| StreamErr::NegativeCount { op, arg, count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    struct Student {
        name: &'static str,
        score: i32,
    }

    #[test]
    fn test_distinct_keeps_first_occurrence() {
        let res = Stream::from_values(vec![3, 1, 3, 2, 1, 4]).distinct().to_array();
        assert_eq!(res, vec![3, 1, 2, 4]);
    }

    #[test]
    fn test_distinct_is_idempotent() {
        let input = vec!["a", "b", "a", "c", "b", "a"];
        let once = Stream::from_slice(&input).distinct().to_array();
        let twice = Stream::from_slice(&input).distinct().distinct().to_array();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_distinct_by_honors_custom_equality() {
        let res = Stream::from_values(vec!["Apple", "apple", "Banana", "APPLE", "banana", "cherry"])
            .distinct_by(|l, r| l.eq_ignore_ascii_case(r))
            .to_array();
        assert_eq!(res, vec!["Apple", "Banana", "cherry"]);
    }

    #[test]
    fn test_filter_keeps_order() {
        let res = Stream::range(1, 10, 1).filter(|x| x % 3 != 0).to_array();
        assert_eq!(res, vec![1, 2, 4, 5, 7, 8, 10]);
    }

    #[test]
    fn test_skip() {
        assert_eq!(Stream::range(1, 5, 1).skip(2).to_array(), vec![3, 4, 5]);
        assert_eq!(Stream::range(1, 5, 1).skip(5).to_array(), Vec::<Integer>::new());
        assert_eq!(Stream::range(1, 5, 1).skip(10).to_array(), Vec::<Integer>::new());
    }

    #[test]
    fn test_skip_zero_adds_no_stage() {
        let stream = Stream::range(1, 5, 1).skip(0);
        assert_eq!(stream.depth(), 0);
        assert_eq!(stream.count(), 5);
    }

    #[test]
    fn test_try_skip_negative() {
        let err = Stream::range(1, 5, 1).try_skip(-1).unwrap_err();
        assert_eq!(err, StreamErr::NegativeCount { op: "skip", arg: "n", count: -1 });
    }

    #[test]
    #[should_panic(expected = "Argument `n` of op `skip` must be non-negative")]
    fn test_skip_negative_panics_at_call() {
        let _ = Stream::range(1, 5, 1).skip(-3);
    }

    #[test]
    fn test_limit() {
        assert_eq!(Stream::range(1, 5, 1).limit(2).to_array(), vec![1, 2]);
        assert_eq!(Stream::range(1, 5, 1).limit(0).to_array(), Vec::<Integer>::new());
        assert_eq!(Stream::range(1, 5, 1).limit(9).to_array(), vec![1, 2, 3, 4, 5]);
        assert!(Stream::range(1, 5, 1).try_limit(-1).is_err());
    }

    #[test]
    fn test_limit_stops_upstream() {
        let pulled = Arc::new(Mutex::new(Vec::new()));
        let record = pulled.clone();
        let res = Stream::from_iterator(0..)
            .peek(move |x| record.lock().unwrap().push(*x))
            .limit(3)
            .to_array();
        assert_eq!(res, vec![0, 1, 2]);
        // 上游至多比limit阶段多拉取一个元素
        assert!(pulled.lock().unwrap().len() <= 4);
    }

    #[test]
    fn test_limit_ignores_upstream_panic_after_satisfied() {
        for _ in 0..200 {
            let res = Stream::from_values(vec![1, 2, 3, 4])
                .filter(|x| if *x == 4 { panic!("element after limit") } else { true })
                .limit(3)
                .to_array();
            assert_eq!(res, vec![1, 2, 3]);
        }
        let res = Stream::from_values(vec![1, 2, 3, 4])
            .map(|x| if x == 4 { panic!("element after limit") } else { x * 2 })
            .limit(3)
            .map(|x| x + 1)
            .limit(5)
            .to_array();
        assert_eq!(res, vec![3, 5, 7]);
        assert_eq!(Stream::from_values(vec![1]).peek(|_| panic!("never needed")).limit(0).count(), 0);
    }

    #[test]
    fn test_limit_propagates_panic_before_satisfied() {
        for _ in 0..50 {
            let res = std::panic::catch_unwind(|| {
                Stream::from_values(vec![1, 2, 3, 4])
                    .filter(|x| if *x == 3 { panic!("element within limit") } else { true })
                    .limit(3)
                    .to_array()
            });
            assert!(res.is_err());
        }
    }

    #[test]
    fn test_skip_then_limit_is_slice() {
        let source = vec![5, 8, 1, 9, 2, 7, 3];
        assert_eq!(Stream::from_slice(&source).skip(2).limit(3).to_array(), source[2..5].to_vec());
        assert_eq!(Stream::from_slice(&source).skip(5).to_array(), source[5..].to_vec());
    }

    #[test]
    fn test_take_while_and_skip_while() {
        assert_eq!(Stream::from_values(vec![1, 2, 5, 1, 2]).take_while(|x| *x < 3).to_array(), vec![1, 2]);
        assert_eq!(Stream::from_values(vec![1, 2, 5, 1, 2]).skip_while(|x| *x < 3).to_array(), vec![5, 1, 2]);
    }

    #[test]
    fn test_sorted_natural_order() {
        let res = Stream::from_values(vec![1, 2, 3, 4, 4, 5, 3, 4, 6, 0, 8, 6, 7, 8]).distinct().sorted().to_array();
        assert_eq!(res, vec![0, 1, 2, 3, 4, 5, 6, 7, 8]);
        let res = Stream::from_values(vec![2.5, -1.0, 0.0]).sorted().to_array();
        assert_eq!(res, vec![-1.0, 0.0, 2.5]);
    }

    #[test]
    fn test_sorted_by_is_stable() {
        let students = vec![
            Student { name: "a", score: 60 },
            Student { name: "b", score: 90 },
            Student { name: "c", score: 60 },
            Student { name: "d", score: 75 },
            Student { name: "e", score: 90 },
        ];
        let names = Stream::from_slice(&students)
            .sorted_by(|l, r| l.score > r.score)
            .map(|s| s.name)
            .to_array();
        assert_eq!(names, vec!["b", "e", "d", "a", "c"]);
        let names = Stream::from_slice(&students).sorted_by_key(|s| s.score).map(|s| s.name).to_array();
        assert_eq!(names, vec!["a", "c", "d", "b", "e"]);
    }

    #[test]
    fn test_map_changes_type() {
        let res = Stream::from_values(vec!["1", "22", "333"]).map(|s| s.len()).to_array();
        assert_eq!(res, vec![1, 2, 3]);
    }

    #[test]
    fn test_peek_sees_every_element_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = seen.clone();
        let res = Stream::from_values(vec![4, 2, 7]).peek(move |x| record.lock().unwrap().push(*x)).to_array();
        assert_eq!(res, vec![4, 2, 7]);
        assert_eq!(*seen.lock().unwrap(), vec![4, 2, 7]);
    }

    #[test]
    fn test_shuffled_keeps_elements() {
        let mut res = Stream::range(1, 50, 1).shuffled().to_array();
        res.sort();
        assert_eq!(res, (1..=50).collect::<Vec<_>>());
    }
}
