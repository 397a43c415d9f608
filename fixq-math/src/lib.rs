//! # fixq-math
//!
//! Signed fixed-point arithmetic for code that cannot or must not use floats,
//! such as scheduler bookkeeping inside a kernel or lockstep simulations.
//!
//! A [`Fixed<Q>`] wraps an `i32` whose low `Q` bits are the fraction. The
//! reference configuration is [`Fp`] = `Fixed<14>` (17.14 layout). Products
//! and quotients are computed in `i64` and narrowed back with an explicit
//! range check, so overflow is reported instead of silently wrapping.
//!
//! | Operation          | Method                   | Free function    |
//! |--------------------|--------------------------|------------------|
//! | to-fixed           | [`Fixed::from_int`]      | [`to_fixed`]     |
//! | to-int, truncating | [`Fixed::to_int`]        | [`to_int_trunc`] |
//! | to-int, rounding   | [`Fixed::to_int_round`]  | [`to_int_round`] |
//! | multiply           | [`Fixed::checked_mul`]   | [`multiply`]     |
//! | divide             | [`Fixed::checked_div`]   | [`divide`]       |
//!
//! Truncation is an arithmetic shift (floor), not truncation toward zero:
//! `to_int_trunc(Fp::from_raw(-1)) == -1`.
//!
//! Overflow handling beyond the checked family is chosen by the caller through
//! [`OverflowPolicy`].
//!
//! `no_std` unless the default `std` feature is enabled.

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub mod error;
pub mod fixed_point;
pub mod ops;
pub mod policy;

pub use error::{FixedPointError, Operation, Result};
pub use fixed_point::{Fixed, Narrow, Wide};
pub use policy::OverflowPolicy;

/// Fractional bits of the reference configuration.
pub const Q: u32 = 14;
/// Scale factor of the reference configuration, `2^Q`.
pub const F: Narrow = 1 << Q;

/// The reference 17.14 fixed-point type.
pub type Fp = Fixed<Q>;

/// `n << Q`. Valid for `n` in `[-131072, 131071]`.
#[inline]
pub fn to_fixed(n: Narrow) -> Result<Fp> {
    Fp::from_int(n)
}

/// `x >> Q`, rounding toward negative infinity.
#[inline]
pub fn to_int_trunc(x: Fp) -> Narrow {
    x.to_int()
}

/// Nearest integer, halves away from zero.
#[inline]
pub fn to_int_round(x: Fp) -> Narrow {
    x.to_int_round()
}

/// `(x * y) >> Q` with a 64-bit intermediate.
#[inline]
pub fn multiply(x: Fp, y: Fp) -> Result<Fp> {
    x.checked_mul(y)
}

/// `(x << Q) / y` with a 64-bit intermediate. Zero `y` is an error.
#[inline]
pub fn divide(x: Fp, y: Fp) -> Result<Fp> {
    x.checked_div(y)
}
