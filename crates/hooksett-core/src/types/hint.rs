//! Type hints attached to every tracked declaration.
//!
//! A hint pairs the tag kind a declaration was annotated with (for example
//! `Parameter` or `Metric`) with the payload type it wraps. Hooks receive
//! the hint alongside each value so they can branch on the kind or check
//! the value's shape without knowing the Rust type.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// The dynamically typed value hooks read and write.
pub type TrackedValue = serde_json::Value;

/// JSON shape a payload type serializes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadShape {
    /// `true` / `false`.
    Bool,
    /// Whole numbers.
    Integer,
    /// Any number; integers are accepted.
    Float,
    /// Strings.
    String,
    /// Sequences.
    Array,
    /// String-keyed maps and structs.
    Object,
    /// No shape constraint.
    Any,
}

impl PayloadShape {
    /// Returns `true` if the value has this shape.
    pub fn matches(&self, value: &TrackedValue) -> bool {
        match self {
            Self::Bool => value.is_boolean(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::String => value.is_string(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::Any => true,
        }
    }

    /// Returns the shape of a concrete value.
    pub fn of_value(value: &TrackedValue) -> Self {
        match value {
            TrackedValue::Bool(_) => Self::Bool,
            TrackedValue::Number(n) if n.is_f64() => Self::Float,
            TrackedValue::Number(_) => Self::Integer,
            TrackedValue::String(_) => Self::String,
            TrackedValue::Array(_) => Self::Array,
            TrackedValue::Object(_) => Self::Object,
            TrackedValue::Null => Self::Any,
        }
    }

    /// Returns the lowercase name of this shape.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for PayloadShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A Rust type that can be carried by a tracked declaration.
pub trait Payload: Serialize + DeserializeOwned + 'static {
    /// JSON shape of serialized values.
    const SHAPE: PayloadShape;

    /// Whether `null` is a legal value.
    const NULLABLE: bool = false;
}

macro_rules! impl_payload {
    ($shape:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Payload for $ty {
                const SHAPE: PayloadShape = $shape;
            }
        )+
    };
}

impl_payload!(PayloadShape::Bool => bool);
impl_payload!(PayloadShape::Integer => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_payload!(PayloadShape::Float => f32, f64);
impl_payload!(PayloadShape::String => String);

impl<T: Payload> Payload for Vec<T> {
    const SHAPE: PayloadShape = PayloadShape::Array;
}

impl<T: Payload> Payload for HashMap<String, T> {
    const SHAPE: PayloadShape = PayloadShape::Object;
}

impl<T: Payload> Payload for BTreeMap<String, T> {
    const SHAPE: PayloadShape = PayloadShape::Object;
}

impl<T: Payload> Payload for Option<T> {
    const SHAPE: PayloadShape = T::SHAPE;
    const NULLABLE: bool = true;
}

impl Payload for TrackedValue {
    const SHAPE: PayloadShape = PayloadShape::Any;
    const NULLABLE: bool = true;
}

/// The declared type of a tracked value: tag kind plus wrapped payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeHint {
    /// Tag kind name, e.g. `Traced` or `Metric`.
    kind: String,
    /// Rust type name of the payload.
    type_name: &'static str,
    /// Expected JSON shape.
    shape: PayloadShape,
    /// Whether `null` is accepted.
    nullable: bool,
}

impl TypeHint {
    /// Creates a hint from its parts.
    pub fn new(kind: impl Into<String>, type_name: &'static str, shape: PayloadShape) -> Self {
        Self {
            kind: kind.into(),
            type_name,
            shape,
            nullable: false,
        }
    }

    /// Creates the hint for a payload type under the given kind.
    pub fn of<T: Payload>(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            type_name: short_type_name(std::any::type_name::<T>()),
            shape: T::SHAPE,
            nullable: T::NULLABLE,
        }
    }

    /// Creates a hint with no payload constraint.
    pub fn untyped(kind: impl Into<String>) -> Self {
        Self::new(kind, "any", PayloadShape::Any).nullable()
    }

    /// Marks `null` as acceptable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Returns the tag kind name.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the payload type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the expected JSON shape.
    pub fn shape(&self) -> PayloadShape {
        self.shape
    }

    /// Returns whether `null` is accepted.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns `true` if a handle of payload type `T` may read and write a
    /// slot declared with this hint.
    ///
    /// Shapes and nullability must agree. `Any` on either side fits everything.
    pub fn admits<T: Payload>(&self) -> bool {
        if self.shape == PayloadShape::Any || T::SHAPE == PayloadShape::Any {
            return true;
        }
        self.shape == T::SHAPE && self.nullable == T::NULLABLE
    }

    /// Returns `true` if the value fits the declared payload.
    pub fn accepts(&self, value: &TrackedValue) -> bool {
        if value.is_null() {
            return self.nullable;
        }
        self.shape.matches(value)
    }
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.kind, self.type_name)
    }
}

/// Strips module paths from a full type name, keeping generic arguments.
fn short_type_name(full: &'static str) -> &'static str {
    if full.contains('<') {
        return full;
    }
    full.rsplit("::").next().unwrap_or(full)
}
