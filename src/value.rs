use crate::err::StreamErr;
use crate::op::sort::NaturalOrder;
use crate::{Float, Integer};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// 动态类型元素，用于元素类型在运行期才确定的流水线，例如逐行读取的文本。
#[derive(Debug, Clone)]
pub enum Value {
    Integer(Integer),
    Float(Float),
    Text(String),
}

impl Value {
    /// 按自然顺序比较：整数与浮点数之间按数值比较，文本之间按字典序比较，文本与数值之间无法比较。
    pub fn try_cmp(&self, other: &Value) -> Result<Ordering, StreamErr> {
        match (self, other) {
            (Value::Integer(l), Value::Integer(r)) => Ok(l.cmp(r)),
            (Value::Float(l), Value::Float(r)) => Ok(OrderedFloat(*l).cmp(&OrderedFloat(*r))),
            (Value::Integer(l), Value::Float(r)) => Ok(OrderedFloat(*l as Float).cmp(&OrderedFloat(*r))),
            (Value::Float(l), Value::Integer(r)) => Ok(OrderedFloat(*l).cmp(&OrderedFloat(*r as Float))),
            (Value::Text(l), Value::Text(r)) => Ok(l.cmp(r)),
            _ => Err(StreamErr::Incomparable { left: self.to_string(), right: other.to_string() }),
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }
}

impl NaturalOrder for Value {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        self.try_cmp(other).unwrap_or_else(|err| err.termination())
    }
}

/// 默认值为整数`0`，即空流水线上`min`、`max`等操作的返回值。
impl Default for Value {
    fn default() -> Self {
        Value::Integer(0)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(l), Value::Integer(r)) => l == r,
            (Value::Float(l), Value::Float(r)) => OrderedFloat(*l) == OrderedFloat(*r),
            (Value::Text(l), Value::Text(r)) => l == r,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => OrderedFloat(*f).hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl FromStr for Value {
    type Err = Infallible;

    /// 优先解析为整数，其次为浮点数，都失败时作为文本。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(integer) = s.parse::<Integer>() {
            Ok(Value::Integer(integer))
        } else if let Ok(float) = s.parse::<Float>() {
            Ok(Value::Float(float))
        } else {
            Ok(Value::Text(s.to_owned()))
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<Integer> for Value {
    fn from(value: Integer) -> Self {
        Value::Integer(value)
    }
}

impl From<Float> for Value {
    fn from(value: Float) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}
