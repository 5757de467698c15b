use crate::core::{Result, SpanError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Dynamically typed payload of a Run/SubRun/Event product held in a
/// working record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum ProductValue {
    #[default]
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    List(Vec<ProductValue>),
    Map(BTreeMap<String, ProductValue>),
}

impl ProductValue {
    /// Folds `other` into `self`.
    ///
    /// Numbers add (integer + float promotes to float), text and lists
    /// append, maps keep existing keys and insert missing ones. `Null` is
    /// the identity on both sides. Booleans and mismatched kinds cannot be
    /// combined.
    pub fn try_aggregate(&mut self, other: &ProductValue) -> Result<()> {
        if other.is_null() {
            return Ok(());
        }
        if self.is_null() {
            *self = other.clone();
            return Ok(());
        }
        let promoted = match (&*self, other) {
            (Self::Integer(a), Self::Float(b)) => Some(*a as f64 + *b),
            _ => None,
        };
        if let Some(sum) = promoted {
            *self = Self::Float(sum);
            return Ok(());
        }

        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => {
                let sum = a.checked_add(*b).ok_or_else(|| {
                    SpanError::ProductCannotBeAggregated(format!(
                        "integer overflow combining {} and {}",
                        a, b
                    ))
                })?;
                *a = sum;
                Ok(())
            }
            (Self::Float(a), Self::Float(b)) => {
                *a += *b;
                Ok(())
            }
            (Self::Float(a), Self::Integer(b)) => {
                *a += *b as f64;
                Ok(())
            }
            (Self::Text(a), Self::Text(b)) => {
                a.push_str(b);
                Ok(())
            }
            (Self::List(a), Self::List(b)) => {
                a.extend(b.iter().cloned());
                Ok(())
            }
            (Self::Map(a), Self::Map(b)) => {
                for (key, value) in b {
                    a.entry(key.clone()).or_insert_with(|| value.clone());
                }
                Ok(())
            }
            (lhs, rhs) => Err(SpanError::ProductCannotBeAggregated(format!(
                "cannot combine {} with {}",
                lhs.type_name(),
                rhs.type_name()
            ))),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Integer(_) => "INTEGER",
            Self::Float(_) => "FLOAT",
            Self::Text(_) => "TEXT",
            Self::Boolean(_) => "BOOLEAN",
            Self::List(_) => "LIST",
            Self::Map(_) => "MAP",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for ProductValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(fl) => {
                if fl.is_nan() {
                    write!(f, "NaN")
                } else if fl.is_infinite() {
                    if *fl > 0.0 {
                        write!(f, "Infinity")
                    } else {
                        write!(f, "-Infinity")
                    }
                } else {
                    write!(f, "{}", fl)
                }
            }
            Self::Text(s) => write!(f, "{}", s),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Self::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<i64> for ProductValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for ProductValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for ProductValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for ProductValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for ProductValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Vec<ProductValue>> for ProductValue {
    fn from(items: Vec<ProductValue>) -> Self {
        Self::List(items)
    }
}
