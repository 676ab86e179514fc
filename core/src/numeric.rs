//! Numeric domain for bound constraints.
//!
//! Numbers in records come in several primitive kinds. A bound written as text
//! is parsed against the kind of the field it constrains, and values of
//! different kinds are only compared after a lossless widening:
//!
//! - `int8 ⊂ int16 ⊂ int32 ⊂ int64`
//! - `uint32 ⊂ uint64`
//! - `float ⊂ double`
//!
//! There is no conversion between families. Comparing two values of different
//! kinds without widening first is a programming error and is reported as
//! [`NumericError::KindMismatch`].

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

static INTEGER_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?\d+$").expect("integer literal grammar compiles"));

static FLOAT_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?\d+\.\d+([eE][-+]?\d+)?$").expect("float literal grammar compiles")
});

/// Errors produced by the numeric domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumericError {
    #[error("Malformed {kind} literal: `{text}`")]
    Malformed { text: String, kind: NumericKind },

    #[error("Value `{text}` is out of range for {kind}")]
    OutOfRange { text: String, kind: NumericKind },

    #[error("Cannot compare {left} with {right}")]
    KindMismatch { left: NumericKind, right: NumericKind },

    #[error("Values {left} and {right} are unordered")]
    Unordered { left: String, right: String },
}

impl NumericError {
    fn malformed(text: &str, kind: NumericKind) -> Self {
        Self::Malformed {
            text: text.to_string(),
            kind,
        }
    }

    fn out_of_range(text: &str, kind: NumericKind) -> Self {
        Self::OutOfRange {
            text: text.to_string(),
            kind,
        }
    }
}

/// Result type for numeric operations.
pub type NumericResult<T> = Result<T, NumericError>;

/// Primitive numeric kind of a field or a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    /// 8-bit signed integer. Only takes part in widening.
    I8,
    /// 16-bit signed integer. Only takes part in widening.
    I16,
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Signed,
    Unsigned,
    Floating,
}

impl NumericKind {
    /// Every supported kind, narrowest first within each family.
    pub const ALL: [NumericKind; 8] = [
        NumericKind::I8,
        NumericKind::I16,
        NumericKind::I32,
        NumericKind::I64,
        NumericKind::U32,
        NumericKind::U64,
        NumericKind::F32,
        NumericKind::F64,
    ];

    /// Returns the schema-level name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            NumericKind::I8 => "int8",
            NumericKind::I16 => "int16",
            NumericKind::I32 => "int32",
            NumericKind::I64 => "int64",
            NumericKind::U32 => "uint32",
            NumericKind::U64 => "uint64",
            NumericKind::F32 => "float",
            NumericKind::F64 => "double",
        }
    }

    pub fn is_floating(&self) -> bool {
        self.family() == Family::Floating
    }

    pub fn is_unsigned(&self) -> bool {
        self.family() == Family::Unsigned
    }

    fn family(&self) -> Family {
        match self {
            NumericKind::I8 | NumericKind::I16 | NumericKind::I32 | NumericKind::I64 => {
                Family::Signed
            }
            NumericKind::U32 | NumericKind::U64 => Family::Unsigned,
            NumericKind::F32 | NumericKind::F64 => Family::Floating,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            NumericKind::I8 | NumericKind::U32 | NumericKind::F32 => 0,
            NumericKind::I16 | NumericKind::U64 | NumericKind::F64 => 1,
            NumericKind::I32 => 2,
            NumericKind::I64 => 3,
        }
    }

    /// Check whether every value of `self` is exactly representable as `to`.
    pub fn widens(self, to: NumericKind) -> bool {
        self.family() == to.family() && self.rank() <= to.rank()
    }

    /// The zero value of this kind. Narrow signed kinds are carried as `I32`.
    pub fn zero(self) -> NumericValue {
        match self {
            NumericKind::I8 | NumericKind::I16 | NumericKind::I32 => NumericValue::I32(0),
            NumericKind::I64 => NumericValue::I64(0),
            NumericKind::U32 => NumericValue::U32(0),
            NumericKind::U64 => NumericValue::U64(0),
            NumericKind::F32 => NumericValue::F32(0.0),
            NumericKind::F64 => NumericValue::F64(0.0),
        }
    }

    /// Parse a literal for this kind.
    ///
    /// Integer kinds reject a decimal point, floating kinds require one.
    pub fn parse(self, text: &str) -> NumericResult<NumericValue> {
        let grammar = if self.is_floating() {
            &*FLOAT_LITERAL
        } else {
            &*INTEGER_LITERAL
        };
        if !grammar.is_match(text) {
            return Err(NumericError::malformed(text, self));
        }

        let out_of_range = |_| NumericError::out_of_range(text, self);
        let value = match self {
            NumericKind::I8 => NumericValue::I32(text.parse::<i8>().map_err(out_of_range)?.into()),
            NumericKind::I16 => {
                NumericValue::I32(text.parse::<i16>().map_err(out_of_range)?.into())
            }
            NumericKind::I32 => NumericValue::I32(text.parse().map_err(out_of_range)?),
            NumericKind::I64 => NumericValue::I64(text.parse().map_err(out_of_range)?),
            NumericKind::U32 => NumericValue::U32(text.parse().map_err(out_of_range)?),
            NumericKind::U64 => NumericValue::U64(text.parse().map_err(out_of_range)?),
            NumericKind::F32 => {
                let v: f32 = text.parse().map_err(|_| NumericError::malformed(text, self))?;
                if !v.is_finite() {
                    return Err(NumericError::out_of_range(text, self));
                }
                NumericValue::F32(v)
            }
            NumericKind::F64 => {
                let v: f64 = text.parse().map_err(|_| NumericError::malformed(text, self))?;
                if !v.is_finite() {
                    return Err(NumericError::out_of_range(text, self));
                }
                NumericValue::F64(v)
            }
        };
        Ok(value)
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed number.
#[derive(Debug, Clone, Copy)]
pub enum NumericValue {
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl NumericValue {
    /// The kind carried by this value's tag.
    pub fn kind(&self) -> NumericKind {
        match self {
            NumericValue::I32(_) => NumericKind::I32,
            NumericValue::I64(_) => NumericKind::I64,
            NumericValue::U32(_) => NumericKind::U32,
            NumericValue::U64(_) => NumericKind::U64,
            NumericValue::F32(_) => NumericKind::F32,
            NumericValue::F64(_) => NumericKind::F64,
        }
    }

    /// Losslessly convert to `kind`, or `None` if `kind` does not widen this value.
    pub fn widen_to(self, kind: NumericKind) -> Option<NumericValue> {
        if !self.kind().widens(kind) {
            return None;
        }
        let widened = match (self, kind) {
            (NumericValue::I32(v), NumericKind::I64) => NumericValue::I64(v.into()),
            (NumericValue::U32(v), NumericKind::U64) => NumericValue::U64(v.into()),
            (NumericValue::F32(v), NumericKind::F64) => NumericValue::F64(v.into()),
            (same, _) => same,
        };
        Some(widened)
    }

    /// Compare with a value of the same kind.
    pub fn try_cmp(&self, other: &NumericValue) -> NumericResult<Ordering> {
        let ordering = match (self, other) {
            (NumericValue::I32(a), NumericValue::I32(b)) => Some(a.cmp(b)),
            (NumericValue::I64(a), NumericValue::I64(b)) => Some(a.cmp(b)),
            (NumericValue::U32(a), NumericValue::U32(b)) => Some(a.cmp(b)),
            (NumericValue::U64(a), NumericValue::U64(b)) => Some(a.cmp(b)),
            (NumericValue::F32(a), NumericValue::F32(b)) => a.partial_cmp(b),
            (NumericValue::F64(a), NumericValue::F64(b)) => a.partial_cmp(b),
            _ => {
                return Err(NumericError::KindMismatch {
                    left: self.kind(),
                    right: other.kind(),
                })
            }
        };
        ordering.ok_or_else(|| NumericError::Unordered {
            left: self.to_string(),
            right: other.to_string(),
        })
    }
}

/// Numeric equality after widening. Ordering is `try_cmp` only.
impl PartialEq for NumericValue {
    fn eq(&self, other: &Self) -> bool {
        let (left, right) = if self.kind().widens(other.kind()) {
            (self.widen_to(other.kind()), Some(*other))
        } else {
            (Some(*self), other.widen_to(self.kind()))
        };
        match (left, right) {
            (Some(l), Some(r)) => matches!(l.try_cmp(&r), Ok(Ordering::Equal)),
            _ => false,
        }
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericValue::I32(v) => write!(f, "{}", v),
            NumericValue::I64(v) => write!(f, "{}", v),
            NumericValue::U32(v) => write!(f, "{}", v),
            NumericValue::U64(v) => write!(f, "{}", v),
            NumericValue::F32(v) => write!(f, "{}", v),
            NumericValue::F64(v) => write!(f, "{}", v),
        }
    }
}
