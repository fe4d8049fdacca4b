use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Structured metadata attached to a log event or a handler.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A single metadata value. Values nest to arbitrary depth through
/// [`MetadataValue::List`] and [`MetadataValue::Map`].
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Text(String),
    Described(Described),
    List(Vec<MetadataValue>),
    Map(Metadata),
}

/// A leaf value that carries its own canonical string description.
///
/// Numbers, booleans, timestamps and binary data keep their native form
/// until normalization decides how they are rendered on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Described {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Bytes(Vec<u8>),
    /// Anything else, kept as its rendered description.
    Other(String),
}

impl Described {
    /// Wrap any displayable value that has no structural JSON form.
    pub fn display(value: impl fmt::Display) -> Self {
        Described::Other(value.to_string())
    }
}

impl fmt::Display for Described {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Described::Int(v) => write!(f, "{v}"),
            Described::UInt(v) => write!(f, "{v}"),
            Described::Float(v) => write!(f, "{v}"),
            Described::Bool(v) => write!(f, "{v}"),
            Described::Timestamp(v) => write!(f, "{v}"),
            Described::Bytes(v) => write!(f, "{} bytes", v.len()),
            Described::Other(v) => f.write_str(v),
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text(s) => f.write_str(s),
            MetadataValue::Described(d) => d.fmt(f),
            MetadataValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt(f)?;
                }
                f.write_str("]")
            }
            MetadataValue::Map(entries) => {
                f.write_str("[")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<Described> for MetadataValue {
    fn from(value: Described) -> Self {
        MetadataValue::Described(value)
    }
}

impl From<Vec<MetadataValue>> for MetadataValue {
    fn from(value: Vec<MetadataValue>) -> Self {
        MetadataValue::List(value)
    }
}

impl From<Metadata> for MetadataValue {
    fn from(value: Metadata) -> Self {
        MetadataValue::Map(value)
    }
}

macro_rules! described_from {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$ty> for MetadataValue {
                fn from(value: $ty) -> Self {
                    MetadataValue::Described(Described::$variant(<$target>::from(value)))
                }
            }
        )*
    };
}

described_from! {
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => UInt as u64,
    u16 => UInt as u64,
    u32 => UInt as u64,
    u64 => UInt as u64,
    f64 => Float as f64,
    bool => Bool as bool,
    DateTime<Utc> => Timestamp as DateTime<Utc>,
    Vec<u8> => Bytes as Vec<u8>,
}

impl From<f32> for MetadataValue {
    /// Goes through the shortest decimal form, so `0.1_f32` stays `0.1`
    /// instead of widening to `0.10000000149011612`.
    fn from(value: f32) -> Self {
        let widened = f64::from_str(&value.to_string()).unwrap_or_else(|_| f64::from(value));
        MetadataValue::Described(Described::Float(widened))
    }
}

/// Build a [`Metadata`] map from `key => value` pairs.
///
/// ```
/// use http_log_sink::metadata;
///
/// let meta = metadata! { "user" => "alice", "retries" => 3 };
/// assert_eq!(meta.len(), 2);
/// ```
#[macro_export]
macro_rules! metadata {
    () => { $crate::metadata::Metadata::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::metadata::Metadata::new();
        $( map.insert(::std::string::String::from($key), $crate::metadata::MetadataValue::from($value)); )+
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_pick_expected_variants() {
        assert_eq!(MetadataValue::from("a"), MetadataValue::Text("a".into()));
        assert_eq!(MetadataValue::from(3_i32), MetadataValue::Described(Described::Int(3)));
        assert_eq!(MetadataValue::from(3_u16), MetadataValue::Described(Described::UInt(3)));
        assert_eq!(MetadataValue::from(true), MetadataValue::Described(Described::Bool(true)));
        assert_eq!(
            MetadataValue::from(vec![1_u8, 2]),
            MetadataValue::Described(Described::Bytes(vec![1, 2]))
        );
    }

    #[test]
    fn f32_keeps_its_shortest_decimal_form() {
        assert_eq!(MetadataValue::from(0.1_f32), MetadataValue::Described(Described::Float(0.1)));
        assert_eq!(MetadataValue::from(-2.5_f32), MetadataValue::Described(Described::Float(-2.5)));
        match MetadataValue::from(f32::NAN) {
            MetadataValue::Described(Described::Float(f)) => assert!(f.is_nan()),
            other => panic!("unexpected value: {other:?}"),
        }
        assert_eq!(
            MetadataValue::from(f32::INFINITY),
            MetadataValue::Described(Described::Float(f64::INFINITY))
        );
    }

    #[test]
    fn macro_builds_nested_maps() {
        let meta = crate::metadata! {
            "name" => "bob",
            "embedded" => crate::metadata! { "inner" => 1 },
        };
        match meta.get("embedded") {
            Some(MetadataValue::Map(inner)) => assert!(inner.contains_key("inner")),
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn display_renders_nested_values() {
        let value = MetadataValue::List(vec!["a".into(), 2.into()]);
        assert_eq!(value.to_string(), "[a, 2]");
        assert_eq!(Described::display("req-42").to_string(), "req-42");
    }
}
