//! Observation and action spaces.
use crate::EnvError;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A box in `R^n`, bounded by `low` and `high` in each dimension.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxSpace {
    /// Lower bounds.
    pub low: Vec<f32>,

    /// Upper bounds.
    pub high: Vec<f32>,
}

impl BoxSpace {
    /// Creates a box.
    ///
    /// Fails if the lengths of the bounds differ or if `low[i] > high[i]`.
    pub fn new(low: Vec<f32>, high: Vec<f32>) -> Result<Self, EnvError> {
        if low.len() != high.len() {
            return Err(EnvError::InvalidConfig(format!(
                "bounds of different lengths, {} and {}",
                low.len(),
                high.len()
            )));
        }
        if low.iter().zip(high.iter()).any(|(l, h)| !(l <= h)) {
            return Err(EnvError::InvalidConfig(format!(
                "low {:?} exceeds high {:?}",
                low, high
            )));
        }
        Ok(Self { low, high })
    }

    /// Creates `[-1, 1]^dims`.
    pub fn symmetric(dims: usize) -> Self {
        Self {
            low: vec![-1.0; dims],
            high: vec![1.0; dims],
        }
    }

    /// Number of dimensions.
    pub fn dims(&self) -> usize {
        self.low.len()
    }

    /// Returns `true` if `x` has the dimension of the box and lies in it.
    ///
    /// `NaN` is never contained.
    pub fn contains<'a>(&self, x: impl IntoIterator<Item = &'a f32>) -> bool {
        let mut n = 0;
        for (i, v) in x.into_iter().enumerate() {
            if i >= self.dims() || !(self.low[i] <= *v && *v <= self.high[i]) {
                return false;
            }
            n += 1;
        }
        n == self.dims()
    }

    /// Lower bounds as an array.
    pub fn low_array(&self) -> Array1<f32> {
        Array1::from(self.low.clone())
    }

    /// `high - low` as an array.
    pub fn span_array(&self) -> Array1<f32> {
        self.high
            .iter()
            .zip(self.low.iter())
            .map(|(h, l)| h - l)
            .collect()
    }
}

impl fmt::Display for BoxSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Box(low={:?}, high={:?})", self.low, self.high)
    }
}

/// The set `{0, 1, ..., n - 1}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscreteSpace {
    /// Number of elements.
    pub n: i64,
}

impl DiscreteSpace {
    /// Returns `true` if `0 <= x < n`.
    pub fn contains(&self, x: i64) -> bool {
        0 <= x && x < self.n
    }
}

impl fmt::Display for DiscreteSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Discrete({})", self.n)
    }
}

/// Space of observations or actions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Space {
    /// Continuous space.
    Box(BoxSpace),

    /// Discrete space.
    Discrete(DiscreteSpace),
}

impl Space {
    /// Returns the box, or an error naming the kind of this space.
    pub fn into_box(self) -> Result<BoxSpace, EnvError> {
        match self {
            Space::Box(b) => Ok(b),
            Space::Discrete(_) => Err(EnvError::SpaceMismatch {
                expected: "Box",
                found: "Discrete",
            }),
        }
    }
}
