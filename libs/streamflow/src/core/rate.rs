// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Rate declarations: how many elements a channel endpoint peeks, pops or
//! pushes per firing.
//!
//! Rates can be "partially dynamic", where the maximum is known but the
//! minimum is dynamic or lower than the maximum, or "fully dynamic", where the
//! maximum is dynamic. A partially dynamic rate still has a buffer size at
//! which the worker can definitely fire; a fully dynamic one does not.
//!
//! Zero rates are legal and describe sources or sinks whose processing is
//! completed by side effects. Constructors take plain counts, with [`DYNAMIC`]
//! standing for an unknown bound.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, StreamError};

/// One bound of a [`Rate`]: a known element count or dynamic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateBound {
    Known(usize),
    Dynamic,
}

/// Sentinel count for a dynamic (unknown or unbounded) rate bound.
pub const DYNAMIC: usize = usize::MAX;

impl RateBound {
    pub fn known(self) -> Option<usize> {
        match self {
            RateBound::Known(n) => Some(n),
            RateBound::Dynamic => None,
        }
    }

    pub fn is_dynamic(self) -> bool {
        matches!(self, RateBound::Dynamic)
    }
}

impl From<usize> for RateBound {
    fn from(value: usize) -> Self {
        if value == DYNAMIC {
            RateBound::Dynamic
        } else {
            RateBound::Known(value)
        }
    }
}

impl fmt::Display for RateBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateBound::Known(n) => write!(f, "{}", n),
            RateBound::Dynamic => write!(f, "*"),
        }
    }
}

/// An immutable `(min, max, avg)` rate declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rate {
    min: RateBound,
    max: RateBound,
    avg: RateBound,
}

impl Rate {
    /// Rate with min, max and average all equal to `value` (possibly dynamic).
    pub fn create(value: usize) -> Result<Self> {
        let value = RateBound::from(value);
        Self::validated(value, value, value)
    }

    /// Rate with the given bounds. The average is `min` when the bounds are
    /// equal and dynamic otherwise.
    pub fn create_range(min: usize, max: usize) -> Result<Self> {
        let (min, max) = (RateBound::from(min), RateBound::from(max));
        let avg = if min == max { min } else { RateBound::Dynamic };
        Self::validated(min, max, avg)
    }

    /// Rate with explicit min, max and average.
    pub fn create_full(min: usize, max: usize, avg: usize) -> Result<Self> {
        Self::validated(min.into(), max.into(), avg.into())
    }

    /// Shorthand for `Rate::create(n)`, which cannot fail. [`DYNAMIC`] gives a
    /// fully dynamic rate.
    pub const fn exact(n: usize) -> Self {
        let bound = if n == DYNAMIC {
            RateBound::Dynamic
        } else {
            RateBound::Known(n)
        };
        Self {
            min: bound,
            max: bound,
            avg: bound,
        }
    }

    fn validated(min: RateBound, max: RateBound, avg: RateBound) -> Result<Self> {
        let rate = Self { min, max, avg };
        if let (Some(lo), Some(hi)) = (min.known(), max.known()) {
            if lo > hi {
                return Err(StreamError::InvalidRate(rate.to_string()));
            }
            if lo == hi && avg != min {
                return Err(StreamError::InvalidRate(rate.to_string()));
            }
            if let Some(mid) = avg.known() {
                if mid < lo || mid > hi {
                    return Err(StreamError::InvalidRate(rate.to_string()));
                }
            }
        }
        Ok(rate)
    }

    pub fn min(&self) -> RateBound {
        self.min
    }

    pub fn max(&self) -> RateBound {
        self.max
    }

    /// Average rate. May be dynamic even when min and max are both known.
    pub fn avg(&self) -> RateBound {
        self.avg
    }

    /// Known maximum and a dynamic or strictly lower minimum.
    pub fn is_partially_dynamic(&self) -> bool {
        match (self.min, self.max) {
            (_, RateBound::Dynamic) => false,
            (RateBound::Dynamic, RateBound::Known(_)) => true,
            (RateBound::Known(lo), RateBound::Known(hi)) => lo < hi,
        }
    }

    /// Dynamic maximum: no buffer size guarantees the worker can fire.
    pub fn is_fully_dynamic(&self) -> bool {
        self.max.is_dynamic()
    }

    pub fn is_dynamic(&self) -> bool {
        self.is_partially_dynamic() || self.is_fully_dynamic()
    }

    /// Whether `observed` lies inside the known bounds. Dynamic bounds are
    /// not checked.
    pub fn admits(&self, observed: usize) -> bool {
        let above_min = self.min.known().is_none_or(|lo| observed >= lo);
        let below_max = self.max.known().is_none_or(|hi| observed <= hi);
        above_min && below_max
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.min, self.max, self.avg)
    }
}
