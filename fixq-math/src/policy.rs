//! Caller-selected overflow behaviour.
//!
//! Embedding code picks one policy up front (a scheduler may prefer to clamp
//! a runaway load average rather than fail) and routes every operation
//! through it. Division by zero is an error under every policy.

use crate::error::Result;
use crate::fixed_point::{Fixed, Narrow};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum OverflowPolicy {
    /// Report overflow as [`crate::FixedPointError::Overflow`] or
    /// [`crate::FixedPointError::OutOfRange`].
    #[default]
    Checked,
    /// Clamp to [`Fixed::MIN`] / [`Fixed::MAX`].
    Saturating,
    /// Keep the low 32 bits, as plain `i32` arithmetic does.
    Wrapping,
}

impl OverflowPolicy {
    pub fn from_int<const Q: u32>(self, n: Narrow) -> Result<Fixed<Q>> {
        match self {
            OverflowPolicy::Checked => Fixed::from_int(n),
            OverflowPolicy::Saturating => Ok(Fixed::saturating_from_int(n)),
            OverflowPolicy::Wrapping => Ok(Fixed::wrapping_from_int(n)),
        }
    }

    pub fn add<const Q: u32>(self, x: Fixed<Q>, y: Fixed<Q>) -> Result<Fixed<Q>> {
        match self {
            OverflowPolicy::Checked => x.checked_add(y),
            OverflowPolicy::Saturating => Ok(x.saturating_add(y)),
            OverflowPolicy::Wrapping => Ok(x.wrapping_add(y)),
        }
    }

    pub fn sub<const Q: u32>(self, x: Fixed<Q>, y: Fixed<Q>) -> Result<Fixed<Q>> {
        match self {
            OverflowPolicy::Checked => x.checked_sub(y),
            OverflowPolicy::Saturating => Ok(x.saturating_sub(y)),
            OverflowPolicy::Wrapping => Ok(x.wrapping_sub(y)),
        }
    }

    pub fn mul<const Q: u32>(self, x: Fixed<Q>, y: Fixed<Q>) -> Result<Fixed<Q>> {
        match self {
            OverflowPolicy::Checked => x.checked_mul(y),
            OverflowPolicy::Saturating => Ok(x.saturating_mul(y)),
            OverflowPolicy::Wrapping => Ok(x.wrapping_mul(y)),
        }
    }

    pub fn div<const Q: u32>(self, x: Fixed<Q>, y: Fixed<Q>) -> Result<Fixed<Q>> {
        match self {
            OverflowPolicy::Checked => x.checked_div(y),
            OverflowPolicy::Saturating => x.saturating_div(y),
            OverflowPolicy::Wrapping => x.wrapping_div(y),
        }
    }

    pub fn add_int<const Q: u32>(self, x: Fixed<Q>, n: Narrow) -> Result<Fixed<Q>> {
        match self {
            OverflowPolicy::Checked => x.checked_add_int(n),
            OverflowPolicy::Saturating => Ok(x.saturating_add_int(n)),
            OverflowPolicy::Wrapping => Ok(x.wrapping_add_int(n)),
        }
    }

    pub fn sub_int<const Q: u32>(self, x: Fixed<Q>, n: Narrow) -> Result<Fixed<Q>> {
        match self {
            OverflowPolicy::Checked => x.checked_sub_int(n),
            OverflowPolicy::Saturating => Ok(x.saturating_sub_int(n)),
            OverflowPolicy::Wrapping => Ok(x.wrapping_sub_int(n)),
        }
    }

    pub fn mul_int<const Q: u32>(self, x: Fixed<Q>, n: Narrow) -> Result<Fixed<Q>> {
        match self {
            OverflowPolicy::Checked => x.checked_mul_int(n),
            OverflowPolicy::Saturating => Ok(x.saturating_mul_int(n)),
            OverflowPolicy::Wrapping => Ok(x.wrapping_mul_int(n)),
        }
    }

    pub fn div_int<const Q: u32>(self, x: Fixed<Q>, n: Narrow) -> Result<Fixed<Q>> {
        match self {
            OverflowPolicy::Checked => x.checked_div_int(n),
            OverflowPolicy::Saturating => x.saturating_div_int(n),
            OverflowPolicy::Wrapping => x.wrapping_div_int(n),
        }
    }
}
