//! Typed scalar and array values with conversion and comparison rules.
//!
//! A [`Variant`] is the only value shape an object attribute can hold.
//! Conversions between variants follow a documented table: numeric widening
//! (`int` to `double`), string rendering and parsing, and the special
//! two-element numeric array to point relationship. Everything else fails
//! with [`ValueError::NotConvertible`].

use std::cmp::Ordering;
use std::fmt;

use atelier_error::impl_error_conversion_with_kind;
use thiserror::Error;

/// Scalar type of an atom value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AtomType {
    Bool,
    Int,
    Double,
    String,
    Point,
}

/// Type of a variant: a scalar atom or a homogeneous array of atoms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    Atom(AtomType),
    Array(AtomType),
}

/// A scalar value.
#[derive(Clone, Debug, PartialEq)]
pub enum AtomValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Point(f64, f64),
}

/// A homogeneous array of scalar values.
#[derive(Clone, Debug, PartialEq)]
pub enum AtomArray {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    Double(Vec<f64>),
    String(Vec<String>),
    Point(Vec<(f64, f64)>),
}

/// A tagged attribute value.
#[derive(Clone, Debug)]
pub enum Variant {
    Atom(AtomValue),
    Array(AtomArray),
}

/// Failures of variant conversion and comparison.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueError {
    /// The conversion between the two types is not defined.
    #[error("value of type {from} is not convertible to {to}")]
    NotConvertible { from: ValueType, to: ValueType },

    /// The conversion is defined but failed for this particular value,
    /// for example parsing `"abc"` as an int.
    #[error("value of type {from} failed to convert to {to}")]
    ConversionFailed { from: ValueType, to: ValueType },

    /// The two variant shapes have no defined ordering.
    #[error("values are not comparable")]
    NotComparable,
}

impl_error_conversion_with_kind!(ValueError, atelier_error::ErrorKind::Value, atelier_error::Error);

impl fmt::Display for AtomType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            AtomType::Bool => "bool",
            AtomType::Int => "int",
            AtomType::Double => "double",
            AtomType::String => "string",
            AtomType::Point => "point",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValueType::Atom(atom) => write!(f, "{atom}"),
            ValueType::Array(atom) => write!(f, "{atom}_array"),
        }
    }
}

impl AtomValue {
    /// Scalar type of this value.
    pub fn atom_type(&self) -> AtomType {
        match self {
            AtomValue::Bool(_) => AtomType::Bool,
            AtomValue::Int(_) => AtomType::Int,
            AtomValue::Double(_) => AtomType::Double,
            AtomValue::String(_) => AtomType::String,
            AtomValue::Point(..) => AtomType::Point,
        }
    }

    fn convert(&self, to: AtomType) -> Result<AtomValue, ValueError> {
        let failed = || ValueError::ConversionFailed {
            from: ValueType::Atom(self.atom_type()),
            to: ValueType::Atom(to),
        };
        match (self, to) {
            (value, to) if value.atom_type() == to => Ok(value.clone()),
            (AtomValue::Bool(flag), AtomType::String) => Ok(AtomValue::String(flag.to_string())),
            (AtomValue::Int(value), AtomType::Double) => Ok(AtomValue::Double(*value as f64)),
            (AtomValue::Int(value), AtomType::String) => Ok(AtomValue::String(value.to_string())),
            (AtomValue::Double(value), AtomType::String) => {
                Ok(AtomValue::String(value.to_string()))
            }
            (AtomValue::String(text), AtomType::Bool) => match text.as_str() {
                "true" => Ok(AtomValue::Bool(true)),
                "false" => Ok(AtomValue::Bool(false)),
                _ => Err(failed()),
            },
            (AtomValue::String(text), AtomType::Int) => text
                .parse::<i64>()
                .map(AtomValue::Int)
                .map_err(|_| failed()),
            (AtomValue::String(text), AtomType::Double) => text
                .parse::<f64>()
                .map(AtomValue::Double)
                .map_err(|_| failed()),
            _ => Err(ValueError::NotConvertible {
                from: ValueType::Atom(self.atom_type()),
                to: ValueType::Atom(to),
            }),
        }
    }
}

impl AtomArray {
    /// Element type of this array.
    pub fn atom_type(&self) -> AtomType {
        match self {
            AtomArray::Bool(_) => AtomType::Bool,
            AtomArray::Int(_) => AtomType::Int,
            AtomArray::Double(_) => AtomType::Double,
            AtomArray::String(_) => AtomType::String,
            AtomArray::Point(_) => AtomType::Point,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            AtomArray::Bool(items) => items.len(),
            AtomArray::Int(items) => items.len(),
            AtomArray::Double(items) => items.len(),
            AtomArray::String(items) => items.len(),
            AtomArray::Point(items) => items.len(),
        }
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Variant {
    /// Type of this variant.
    pub fn value_type(&self) -> ValueType {
        match self {
            Variant::Atom(atom) => ValueType::Atom(atom.atom_type()),
            Variant::Array(array) => ValueType::Array(array.atom_type()),
        }
    }

    /// Whether this variant is an array.
    pub fn is_array(&self) -> bool {
        matches!(self, Variant::Array(_))
    }

    /// Converts the variant to the requested type according to the
    /// conversion table.
    pub fn convert(&self, to: ValueType) -> Result<Variant, ValueError> {
        let not_convertible = || ValueError::NotConvertible {
            from: self.value_type(),
            to,
        };
        match (self, to) {
            (Variant::Atom(atom), ValueType::Atom(atom_type)) => {
                atom.convert(atom_type).map(Variant::Atom)
            }
            (Variant::Atom(AtomValue::Point(x, y)), ValueType::Array(AtomType::Double)) => {
                Ok(Variant::Array(AtomArray::Double(vec![*x, *y])))
            }
            (Variant::Array(array), ValueType::Atom(AtomType::Point)) => {
                let components: Vec<f64> = match array {
                    AtomArray::Int(items) => items.iter().map(|value| *value as f64).collect(),
                    AtomArray::Double(items) => items.clone(),
                    _ => return Err(not_convertible()),
                };
                match components.as_slice() {
                    [x, y] => Ok(Variant::Atom(AtomValue::Point(*x, *y))),
                    _ => Err(ValueError::ConversionFailed {
                        from: self.value_type(),
                        to,
                    }),
                }
            }
            (Variant::Array(array), ValueType::Array(atom_type))
                if array.atom_type() == atom_type =>
            {
                Ok(self.clone())
            }
            (Variant::Array(AtomArray::Int(items)), ValueType::Array(AtomType::Double)) => Ok(
                Variant::Array(AtomArray::Double(
                    items.iter().map(|value| *value as f64).collect(),
                )),
            ),
            _ => Err(not_convertible()),
        }
    }

    /// Compares two variants.
    ///
    /// Ordering is defined for mixed int/double atoms (numeric promotion)
    /// and for strings (lexicographic). Every other pairing, arrays
    /// included, answers [`ValueError::NotComparable`].
    pub fn try_compare(&self, other: &Variant) -> Result<Ordering, ValueError> {
        use AtomValue::{Double, Int, String as Str};
        match (self, other) {
            (Variant::Atom(lhs), Variant::Atom(rhs)) => match (lhs, rhs) {
                (Int(lhs), Int(rhs)) => Ok(lhs.cmp(rhs)),
                (Int(lhs), Double(rhs)) => {
                    (*lhs as f64).partial_cmp(rhs).ok_or(ValueError::NotComparable)
                }
                (Double(lhs), Int(rhs)) => {
                    lhs.partial_cmp(&(*rhs as f64)).ok_or(ValueError::NotComparable)
                }
                (Double(lhs), Double(rhs)) => {
                    lhs.partial_cmp(rhs).ok_or(ValueError::NotComparable)
                }
                (Str(lhs), Str(rhs)) => Ok(lhs.cmp(rhs)),
                _ => Err(ValueError::NotComparable),
            },
            _ => Err(ValueError::NotComparable),
        }
    }

    /// The boolean payload, if this is a bool atom.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Variant::Atom(AtomValue::Bool(flag)) => Some(*flag),
            _ => None,
        }
    }

    /// The integer payload, if this is an int atom.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Variant::Atom(AtomValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    /// The floating-point payload of an int or double atom.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Variant::Atom(AtomValue::Int(value)) => Some(*value as f64),
            Variant::Atom(AtomValue::Double(value)) => Some(*value),
            _ => None,
        }
    }

    /// The string payload, if this is a string atom.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Variant::Atom(AtomValue::String(text)) => Some(text),
            _ => None,
        }
    }

    /// The point payload, if this is a point atom.
    pub fn as_point(&self) -> Option<(f64, f64)> {
        match self {
            Variant::Atom(AtomValue::Point(x, y)) => Some((*x, *y)),
            _ => None,
        }
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Variant) -> bool {
        match (self, other) {
            (Variant::Atom(lhs), Variant::Atom(rhs)) => match (lhs, rhs) {
                (AtomValue::Int(lhs), AtomValue::Double(rhs)) => (*lhs as f64) == *rhs,
                (AtomValue::Double(lhs), AtomValue::Int(rhs)) => *lhs == (*rhs as f64),
                (lhs, rhs) => lhs == rhs,
            },
            (Variant::Array(lhs), Variant::Array(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Variant::Atom(AtomValue::Bool(flag)) => write!(f, "{flag}"),
            Variant::Atom(AtomValue::Int(value)) => write!(f, "{value}"),
            Variant::Atom(AtomValue::Double(value)) => write!(f, "{value}"),
            Variant::Atom(AtomValue::String(text)) => write!(f, "{text}"),
            Variant::Atom(AtomValue::Point(x, y)) => write!(f, "({x}, {y})"),
            Variant::Array(array) => write!(f, "[{} items of {}]", array.len(), array.atom_type()),
        }
    }
}

impl From<bool> for Variant {
    fn from(flag: bool) -> Self {
        Variant::Atom(AtomValue::Bool(flag))
    }
}

impl From<i64> for Variant {
    fn from(value: i64) -> Self {
        Variant::Atom(AtomValue::Int(value))
    }
}

impl From<f64> for Variant {
    fn from(value: f64) -> Self {
        Variant::Atom(AtomValue::Double(value))
    }
}

impl From<&str> for Variant {
    fn from(text: &str) -> Self {
        Variant::Atom(AtomValue::String(text.to_string()))
    }
}

impl From<String> for Variant {
    fn from(text: String) -> Self {
        Variant::Atom(AtomValue::String(text))
    }
}

impl From<(f64, f64)> for Variant {
    fn from((x, y): (f64, f64)) -> Self {
        Variant::Atom(AtomValue::Point(x, y))
    }
}
