use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::error::{fault, FixedPointError, Operation, Result};
use crate::fixed_point::{
    checked_narrow, saturating_narrow, wrapping_narrow, Fixed, Narrow, Wide,
};

impl<const Q: u32> Fixed<Q> {
    /// `(x * y) >> Q` computed at 64 bits. The shift is arithmetic, so
    /// negative products floor like [`Fixed::to_int`].
    #[inline]
    fn mul_wide(self, rhs: Self) -> Wide {
        (self.raw() as Wide * rhs.raw() as Wide) >> Self::FRAC_BITS
    }

    /// `(x << Q) / y` computed at 64 bits. `|x << Q| <= 2^61`, so neither the
    /// shift nor the quotient can overflow the wide word.
    #[inline]
    fn div_wide(self, rhs: Self) -> Result<Wide> {
        if rhs.raw() == 0 {
            return Err(fault(FixedPointError::DivisionByZero));
        }
        Ok(((self.raw() as Wide) << Self::FRAC_BITS) / rhs.raw() as Wide)
    }

    #[inline]
    fn add_int_wide(self, n: Narrow) -> Wide {
        self.raw() as Wide + ((n as Wide) << Self::FRAC_BITS)
    }

    #[inline]
    fn sub_int_wide(self, n: Narrow) -> Wide {
        self.raw() as Wide - ((n as Wide) << Self::FRAC_BITS)
    }

    #[inline]
    fn div_int_wide(self, n: Narrow) -> Result<Wide> {
        if n == 0 {
            return Err(fault(FixedPointError::DivisionByZero));
        }
        Ok(self.raw() as Wide / n as Wide)
    }

    /// Fixed-point product. Fails if the result does not fit in 32 bits.
    pub fn checked_mul(self, rhs: Self) -> Result<Self> {
        checked_narrow(self.mul_wide(rhs), Operation::Mul).map(Self::from_raw)
    }

    pub fn saturating_mul(self, rhs: Self) -> Self {
        Self::from_raw(saturating_narrow(self.mul_wide(rhs)))
    }

    /// Keeps the low 32 bits of the rescaled product.
    pub fn wrapping_mul(self, rhs: Self) -> Self {
        Self::from_raw(wrapping_narrow(self.mul_wide(rhs)))
    }

    /// Fixed-point quotient, truncated toward zero.
    ///
    /// Fails with [`FixedPointError::DivisionByZero`] when `rhs` is zero and
    /// with [`FixedPointError::Overflow`] when the quotient does not fit.
    pub fn checked_div(self, rhs: Self) -> Result<Self> {
        checked_narrow(self.div_wide(rhs)?, Operation::Div).map(Self::from_raw)
    }

    /// Clamps the quotient. Division by zero is still an error.
    pub fn saturating_div(self, rhs: Self) -> Result<Self> {
        self.div_wide(rhs)
            .map(|wide| Self::from_raw(saturating_narrow(wide)))
    }

    /// Keeps the low 32 bits of the quotient. Division by zero is still an
    /// error.
    pub fn wrapping_div(self, rhs: Self) -> Result<Self> {
        self.div_wide(rhs)
            .map(|wide| Self::from_raw(wrapping_narrow(wide)))
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        self.raw()
            .checked_add(rhs.raw())
            .map(Self::from_raw)
            .ok_or_else(|| fault(FixedPointError::Overflow { op: Operation::Add }))
    }

    pub fn saturating_add(self, rhs: Self) -> Self {
        Self::from_raw(self.raw().saturating_add(rhs.raw()))
    }

    pub fn wrapping_add(self, rhs: Self) -> Self {
        Self::from_raw(self.raw().wrapping_add(rhs.raw()))
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self> {
        self.raw()
            .checked_sub(rhs.raw())
            .map(Self::from_raw)
            .ok_or_else(|| fault(FixedPointError::Overflow { op: Operation::Sub }))
    }

    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self::from_raw(self.raw().saturating_sub(rhs.raw()))
    }

    pub fn wrapping_sub(self, rhs: Self) -> Self {
        Self::from_raw(self.raw().wrapping_sub(rhs.raw()))
    }

    /// Fails only for [`Fixed::MIN`].
    pub fn checked_neg(self) -> Result<Self> {
        self.raw()
            .checked_neg()
            .map(Self::from_raw)
            .ok_or_else(|| fault(FixedPointError::Overflow { op: Operation::Neg }))
    }

    pub fn checked_abs(self) -> Result<Self> {
        self.raw()
            .checked_abs()
            .map(Self::from_raw)
            .ok_or_else(|| fault(FixedPointError::Overflow { op: Operation::Neg }))
    }

    /// Absolute value, saturating `MIN` to `MAX`.
    pub fn abs(self) -> Self {
        Self::from_raw(self.raw().saturating_abs())
    }

    /// `x + n` for an integer `n`, without converting `n` first, so `n` may
    /// lie outside `[INT_MIN, INT_MAX]` as long as the sum fits.
    pub fn checked_add_int(self, n: Narrow) -> Result<Self> {
        checked_narrow(self.add_int_wide(n), Operation::Add).map(Self::from_raw)
    }

    pub fn saturating_add_int(self, n: Narrow) -> Self {
        Self::from_raw(saturating_narrow(self.add_int_wide(n)))
    }

    pub fn wrapping_add_int(self, n: Narrow) -> Self {
        Self::from_raw(wrapping_narrow(self.add_int_wide(n)))
    }

    pub fn checked_sub_int(self, n: Narrow) -> Result<Self> {
        checked_narrow(self.sub_int_wide(n), Operation::Sub).map(Self::from_raw)
    }

    pub fn saturating_sub_int(self, n: Narrow) -> Self {
        Self::from_raw(saturating_narrow(self.sub_int_wide(n)))
    }

    pub fn wrapping_sub_int(self, n: Narrow) -> Self {
        Self::from_raw(wrapping_narrow(self.sub_int_wide(n)))
    }

    /// `x * n` for an integer `n`. No rescaling is needed.
    pub fn checked_mul_int(self, n: Narrow) -> Result<Self> {
        checked_narrow(self.raw() as Wide * n as Wide, Operation::MulInt).map(Self::from_raw)
    }

    pub fn saturating_mul_int(self, n: Narrow) -> Self {
        Self::from_raw(saturating_narrow(self.raw() as Wide * n as Wide))
    }

    pub fn wrapping_mul_int(self, n: Narrow) -> Self {
        Self::from_raw(self.raw().wrapping_mul(n))
    }

    /// `x / n` for an integer `n`, truncated toward zero. The only overflow is
    /// `MIN / -1`.
    pub fn checked_div_int(self, n: Narrow) -> Result<Self> {
        checked_narrow(self.div_int_wide(n)?, Operation::DivInt).map(Self::from_raw)
    }

    pub fn saturating_div_int(self, n: Narrow) -> Result<Self> {
        self.div_int_wide(n)
            .map(|wide| Self::from_raw(saturating_narrow(wide)))
    }

    pub fn wrapping_div_int(self, n: Narrow) -> Result<Self> {
        self.div_int_wide(n)
            .map(|wide| Self::from_raw(wrapping_narrow(wide)))
    }
}

/// Turns an arithmetic fault into a panic, as the integer operators do.
#[track_caller]
#[inline]
fn or_panic<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("fixed-point arithmetic fault: {err}"),
    }
}

// Operators panic on overflow and on division by zero in every build
// profile. Use the checked_* family to handle faults without panicking.

impl<const Q: u32> Add for Fixed<Q> {
    type Output = Self;

    #[track_caller]
    fn add(self, rhs: Self) -> Self {
        or_panic(self.checked_add(rhs))
    }
}

impl<const Q: u32> Sub for Fixed<Q> {
    type Output = Self;

    #[track_caller]
    fn sub(self, rhs: Self) -> Self {
        or_panic(self.checked_sub(rhs))
    }
}

impl<const Q: u32> Mul for Fixed<Q> {
    type Output = Self;

    #[track_caller]
    fn mul(self, rhs: Self) -> Self {
        or_panic(self.checked_mul(rhs))
    }
}

impl<const Q: u32> Div for Fixed<Q> {
    type Output = Self;

    #[track_caller]
    fn div(self, rhs: Self) -> Self {
        or_panic(self.checked_div(rhs))
    }
}

impl<const Q: u32> Mul<Narrow> for Fixed<Q> {
    type Output = Self;

    #[track_caller]
    fn mul(self, rhs: Narrow) -> Self {
        or_panic(self.checked_mul_int(rhs))
    }
}

impl<const Q: u32> Div<Narrow> for Fixed<Q> {
    type Output = Self;

    #[track_caller]
    fn div(self, rhs: Narrow) -> Self {
        or_panic(self.checked_div_int(rhs))
    }
}

impl<const Q: u32> Neg for Fixed<Q> {
    type Output = Self;

    #[track_caller]
    fn neg(self) -> Self {
        or_panic(self.checked_neg())
    }
}

impl<const Q: u32> AddAssign for Fixed<Q> {
    #[track_caller]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<const Q: u32> SubAssign for Fixed<Q> {
    #[track_caller]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<const Q: u32> MulAssign for Fixed<Q> {
    #[track_caller]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<const Q: u32> DivAssign for Fixed<Q> {
    #[track_caller]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}
