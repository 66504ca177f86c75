//! Error types for material descriptions.

use std::error::Error;
use std::fmt;

/// Errors detected while assembling [`MaterialProperties`](crate::MaterialProperties).
#[derive(Clone, Debug, PartialEq)]
pub enum MaterialError {
    /// The grid edge size is zero.
    EmptyGrid,
    /// One of the per-cell arrays has the wrong number of elements.
    ShapeMismatch {
        /// Which array was malformed.
        array: &'static str,
        /// Required length (`edge_size * edge_size`).
        expected: usize,
        /// Length actually supplied.
        got: usize,
    },
    /// A conductance weight is not finite and strictly positive.
    InvalidConductance {
        /// Flat index of the offending cell.
        cell: usize,
        /// The invalid value.
        value: f32,
    },
    /// A material map entry is neither 0 (air) nor 1 (conductor).
    InvalidMapValue {
        /// Flat index of the offending cell.
        cell: usize,
        /// The invalid value.
        value: u8,
    },
    /// An initial temperature or the cooler temperature is not finite.
    NonFiniteTemperature {
        /// Flat index of the offending cell, `None` for the cooler temperature.
        cell: Option<usize>,
    },
}

impl fmt::Display for MaterialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "material grid has zero edge size"),
            Self::ShapeMismatch {
                array,
                expected,
                got,
            } => write!(f, "{array} has {got} cells, expected {expected}"),
            Self::InvalidConductance { cell, value } => {
                write!(f, "conductance at cell {cell} must be finite and positive, got {value}")
            }
            Self::InvalidMapValue { cell, value } => {
                write!(f, "material map at cell {cell} must be 0 or 1, got {value}")
            }
            Self::NonFiniteTemperature { cell: Some(cell) } => {
                write!(f, "initial temperature at cell {cell} is not finite")
            }
            Self::NonFiniteTemperature { cell: None } => {
                write!(f, "cooler temperature is not finite")
            }
        }
    }
}

impl Error for MaterialError {}
