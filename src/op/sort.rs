use ordered_float::OrderedFloat;
use std::cmp::Ordering;

/// 自然顺序，`sorted`、`min`、`max`在未指定比较函数时使用。
///
/// 整数、字符、布尔、字符串按其`Ord`排序，浮点数按全序排序（`NaN`大于所有数值）。
/// 未实现此特征的类型在编译期即被拒绝；动态类型[`Value`](crate::Value)在运行期遇到无法比较的组合时直接panic。
pub trait NaturalOrder {
    fn natural_cmp(&self, other: &Self) -> Ordering;

    fn natural_lt(&self, other: &Self) -> bool {
        self.natural_cmp(other) == Ordering::Less
    }
}

macro_rules! natural_order_by_ord {
    ($($t:ty),* $(,)?) => {
        $(
            impl NaturalOrder for $t {
                #[inline]
                fn natural_cmp(&self, other: &Self) -> Ordering {
                    Ord::cmp(self, other)
                }
            }
        )*
    };
}

natural_order_by_ord!(
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    char,
    bool,
    String,
    &'static str,
);

macro_rules! natural_order_by_ordered_float {
    ($($t:ty),*) => {
        $(
            impl NaturalOrder for $t {
                #[inline]
                fn natural_cmp(&self, other: &Self) -> Ordering {
                    OrderedFloat(*self).cmp(&OrderedFloat(*other))
                }
            }
        )*
    };
}

natural_order_by_ordered_float!(f32, f64);

/// 将小于比较函数转换为全序比较，两者互不小于时视为相等。
pub(crate) fn ordering_by_less<T>(less: &mut impl FnMut(&T, &T) -> bool, left: &T, right: &T) -> Ordering {
    if less(left, right) {
        Ordering::Less
    } else if less(right, left) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}
