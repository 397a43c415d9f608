use core::fmt::{self, Write as _};
use core::str::FromStr;

use crate::error::{fault, FixedPointError, Operation, Result};

/// Storage word of a fixed-point value.
pub type Narrow = i32;
/// Intermediate word used while multiplying, dividing and rounding.
pub type Wide = i64;

/// A signed fixed-point number with `Q` fractional bits stored in an `i32`.
///
/// The raw word `r` stands for the real number `r / 2^Q`. With the default
/// `Q = 14` this is a 17.14 layout: one sign bit, 17 integer bits and 14
/// fractional bits.
///
/// Raw integers and fixed-point values never mix implicitly. Use
/// [`Fixed::from_int`] / [`Fixed::to_int`] to cross between integer units and
/// fixed-point units, and [`Fixed::from_raw`] / [`Fixed::raw`] to get at the
/// underlying word.
///
/// `Q` must lie in `1..=30`; any other value fails to compile as soon as the
/// type is used.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
#[repr(transparent)]
pub struct Fixed<const Q: u32 = 14>(Narrow);

impl<const Q: u32> Fixed<Q> {
    /// Number of fractional bits.
    pub const FRAC_BITS: u32 = {
        assert!(Q >= 1 && Q <= 30, "fractional bits must be in 1..=30");
        Q
    };
    /// Raw value of `1.0` (`F = 2^Q`).
    pub const SCALE: Narrow = 1 << Self::FRAC_BITS;
    /// Raw value of `0.5` (`F / 2`).
    pub const HALF: Narrow = Self::SCALE >> 1;
    /// Smallest integer accepted by [`Fixed::from_int`]: `-2^(31-Q)`.
    pub const INT_MIN: Narrow = Narrow::MIN >> Self::FRAC_BITS;
    /// Largest integer accepted by [`Fixed::from_int`]: `2^(31-Q) - 1`.
    pub const INT_MAX: Narrow = Narrow::MAX >> Self::FRAC_BITS;

    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(Self::SCALE);
    /// The smallest positive value, one unit in the last place.
    pub const EPSILON: Self = Self(1);
    pub const MIN: Self = Self(Narrow::MIN);
    pub const MAX: Self = Self(Narrow::MAX);

    /// Wraps a raw word without rescaling.
    #[inline]
    pub const fn from_raw(raw: Narrow) -> Self {
        Self(raw)
    }

    /// The raw word.
    #[inline]
    pub const fn raw(self) -> Narrow {
        self.0
    }

    /// Converts an integer to fixed point (`n << Q`).
    ///
    /// `n` must lie in `[INT_MIN, INT_MAX]`, which is `[-131072, 131071]` for
    /// `Q = 14`. Anything outside is reported as
    /// [`FixedPointError::OutOfRange`].
    #[inline]
    pub fn from_int(n: Narrow) -> Result<Self> {
        if n < Self::INT_MIN || n > Self::INT_MAX {
            return Err(fault(FixedPointError::OutOfRange {
                value: n as Wide,
                min: Self::INT_MIN,
                max: Self::INT_MAX,
            }));
        }
        Ok(Self(n << Self::FRAC_BITS))
    }

    /// Like [`Fixed::from_int`] but clamps to [`Fixed::MIN`] / [`Fixed::MAX`].
    #[inline]
    pub fn saturating_from_int(n: Narrow) -> Self {
        if n > Self::INT_MAX {
            Self::MAX
        } else if n < Self::INT_MIN {
            Self::MIN
        } else {
            Self(n << Self::FRAC_BITS)
        }
    }

    /// Like [`Fixed::from_int`] but drops the bits shifted out of the word.
    #[inline]
    pub fn wrapping_from_int(n: Narrow) -> Self {
        Self(n.wrapping_shl(Self::FRAC_BITS))
    }

    /// `num / den` as a fixed-point value, truncated toward zero.
    ///
    /// This is how constants such as `59/60` are built without floats.
    pub fn from_ratio(num: Narrow, den: Narrow) -> Result<Self> {
        Self::from_int(num)?.checked_div_int(den)
    }

    /// Truncates to an integer with an arithmetic right shift.
    ///
    /// Negative values go toward negative infinity, not toward zero:
    /// `Fixed::from_raw(-1).to_int() == -1`.
    #[inline]
    pub const fn to_int(self) -> Narrow {
        self.0 >> Self::FRAC_BITS
    }

    /// Rounds to the nearest integer, halves away from zero.
    ///
    /// `F / 2` is added (or subtracted for negative values) in the wide type,
    /// so the boundary values round without overflow. The biased value is
    /// then truncated toward zero: flooring it would send `-2.0` to `-3`.
    #[inline]
    pub const fn to_int_round(self) -> Narrow {
        let wide = self.0 as Wide;
        let biased = if wide >= 0 {
            wide + Self::HALF as Wide
        } else {
            wide - Self::HALF as Wide
        };
        // |result| <= 2^(31-Q), always fits the narrow word.
        (biased / Self::SCALE as Wide) as Narrow
    }

    /// Largest integral value not above `self`.
    #[inline]
    pub const fn floor(self) -> Self {
        Self(self.0 & !(Self::SCALE - 1))
    }

    /// Fractional part, always in `[0, 1)`: `self - self.floor()`.
    #[inline]
    pub const fn frac(self) -> Self {
        Self(self.0 & (Self::SCALE - 1))
    }

    /// `-1`, `0` or `1` as an integer.
    #[inline]
    pub const fn signum(self) -> Narrow {
        self.0.signum()
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

/// Narrows a wide intermediate, reporting values that do not fit.
#[inline]
pub(crate) fn checked_narrow(wide: Wide, op: Operation) -> Result<Narrow> {
    Narrow::try_from(wide).map_err(|_| fault(FixedPointError::Overflow { op }))
}

#[inline]
pub(crate) fn saturating_narrow(wide: Wide) -> Narrow {
    wide.clamp(Narrow::MIN as Wide, Narrow::MAX as Wide) as Narrow
}

#[inline]
pub(crate) fn wrapping_narrow(wide: Wide) -> Narrow {
    wide as Narrow
}

impl<const Q: u32> TryFrom<Narrow> for Fixed<Q> {
    type Error = FixedPointError;

    fn try_from(n: Narrow) -> Result<Self> {
        Self::from_int(n)
    }
}

/// Room for a sign-less integer part plus every fractional digit a 30-bit
/// fraction can produce.
const DIGIT_BUF: usize = 48;

struct DigitBuf {
    bytes: [u8; DIGIT_BUF],
    len: usize,
}

impl DigitBuf {
    fn as_str(&self) -> &str {
        // Only ASCII digits and '.' are ever pushed.
        core::str::from_utf8(&self.bytes[..self.len]).unwrap_or_default()
    }

    fn push(&mut self, byte: u8) -> fmt::Result {
        let slot = self.bytes.get_mut(self.len).ok_or(fmt::Error)?;
        *slot = byte;
        self.len += 1;
        Ok(())
    }
}

impl fmt::Write for DigitBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        s.bytes().try_for_each(|b| self.push(b))
    }
}

fn write_repeated(f: &mut fmt::Formatter<'_>, c: char, count: usize) -> fmt::Result {
    (0..count).try_for_each(|_| f.write_char(c))
}

/// Writes `sign`, `digits` and `trailing_zeros` zeros as one number,
/// honouring width, fill, alignment and `0` padding like the integer types.
fn pad_number(
    f: &mut fmt::Formatter<'_>,
    negative: bool,
    digits: &str,
    trailing_zeros: usize,
) -> fmt::Result {
    let sign = if negative {
        "-"
    } else if f.sign_plus() {
        "+"
    } else {
        ""
    };
    let len = sign.len() + digits.len() + trailing_zeros;
    let padding = f.width().unwrap_or(0).saturating_sub(len);

    if f.sign_aware_zero_pad() {
        f.write_str(sign)?;
        write_repeated(f, '0', padding)?;
        f.write_str(digits)?;
        return write_repeated(f, '0', trailing_zeros);
    }

    let (before, after) = match f.align() {
        Some(fmt::Alignment::Left) => (0, padding),
        Some(fmt::Alignment::Center) => (padding / 2, padding - padding / 2),
        _ => (padding, 0),
    };
    let fill = f.fill();
    write_repeated(f, fill, before)?;
    f.write_str(sign)?;
    f.write_str(digits)?;
    write_repeated(f, '0', trailing_zeros)?;
    write_repeated(f, fill, after)
}

/// Exact decimal expansion of `raw / 2^Q`.
///
/// Without a precision every significant fractional digit is printed. With
/// one (`{:.2}`) exactly that many digits are printed, truncated toward zero.
/// Width, fill and alignment are honoured.
impl<const Q: u32> fmt::Display for Fixed<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = (self.0 as Wide).unsigned_abs();
        let mask = (Self::SCALE as u64) - 1;
        let mut rest = magnitude & mask;

        let mut buf = DigitBuf {
            bytes: [0; DIGIT_BUF],
            len: 0,
        };
        write!(buf, "{}", magnitude >> Self::FRAC_BITS)?;

        // A Q-bit fraction has exactly Q decimal digits; any further requested
        // digits are zeros.
        let exact = Self::FRAC_BITS as usize;
        let (digits, trailing_zeros) = match f.precision() {
            Some(precision) => (precision.min(exact), precision.saturating_sub(exact)),
            None => (exact, 0),
        };
        if f.precision().map_or(rest != 0, |precision| precision > 0) {
            buf.push(b'.')?;
            for _ in 0..digits {
                if rest == 0 && f.precision().is_none() {
                    break;
                }
                rest *= 10;
                buf.push(b'0' + (rest >> Self::FRAC_BITS) as u8)?;
                rest &= mask;
            }
        }

        pad_number(f, self.0 < 0, buf.as_str(), trailing_zeros)
    }
}

impl<const Q: u32> fmt::Debug for Fixed<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed<{}>({} raw={})", Q, self, self.0)
    }
}

/// Parses `[+-]digits[.digits]`.
///
/// Fractional digits are rounded to the nearest representable value, halves
/// away from zero. Only the first 18 fractional digits are significant.
impl<const Q: u32> FromStr for Fixed<Q> {
    type Err = FixedPointError;

    fn from_str(s: &str) -> Result<Self> {
        const MAX_FRAC_DIGITS: usize = 18;

        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (int_str, frac_str) = body.split_once('.').unwrap_or((body, ""));

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (int_str.is_empty() && frac_str.is_empty())
            || !all_digits(int_str)
            || !all_digits(frac_str)
        {
            return Err(fault(FixedPointError::InvalidLiteral));
        }

        let int_part = int_str.bytes().fold(0i64, |acc, b| {
            acc.saturating_mul(10).saturating_add((b - b'0') as i64)
        });
        let out_of_range = |integer: i64| {
            fault(FixedPointError::OutOfRange {
                value: if negative { -integer } else { integer },
                min: Self::INT_MIN,
                max: Self::INT_MAX,
            })
        };
        if int_part > 1i64 << (31 - Self::FRAC_BITS) {
            return Err(out_of_range(int_part));
        }

        let (numer, denom) = frac_str
            .bytes()
            .take(MAX_FRAC_DIGITS)
            .fold((0u128, 1u128), |(n, d), b| (n * 10 + (b - b'0') as u128, d * 10));
        let frac_raw = ((numer << Self::FRAC_BITS) + denom / 2) / denom;

        let magnitude = (int_part << Self::FRAC_BITS) + frac_raw as Wide;
        let signed = if negative { -magnitude } else { magnitude };
        // A fraction that rounds up can carry the integer part out of range;
        // report the integer the literal rounded away to, not the one written.
        Narrow::try_from(signed)
            .map(Self)
            .map_err(|_| out_of_range((magnitude + Self::SCALE as Wide - 1) >> Self::FRAC_BITS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Fp = Fixed<14>;

    #[test]
    fn test_constants() {
        assert_eq!(Fp::SCALE, 16384);
        assert_eq!(Fp::HALF, 8192);
        assert_eq!(Fp::INT_MIN, -131072);
        assert_eq!(Fp::INT_MAX, 131071);
        assert_eq!(Fp::ONE.raw(), 16384);
        assert_eq!(Fixed::<30>::INT_MAX, 1);
        assert_eq!(Fixed::<30>::INT_MIN, -2);
    }

    #[test]
    fn test_from_int_boundaries() {
        assert_eq!(Fp::from_int(3).unwrap().raw(), 3 << 14);
        assert_eq!(Fp::from_int(-3).unwrap().raw(), -3 << 14);
        assert_eq!(Fp::from_int(Fp::INT_MAX).unwrap().to_int(), Fp::INT_MAX);
        assert_eq!(Fp::from_int(Fp::INT_MIN).unwrap(), Fp::MIN);
        assert_eq!(
            Fp::from_int(Fp::INT_MAX + 1),
            Err(FixedPointError::OutOfRange {
                value: 131072,
                min: -131072,
                max: 131071,
            })
        );
        assert!(Fp::from_int(Fp::INT_MIN - 1).is_err());
        assert_eq!(Fp::try_from(5).unwrap(), Fp::from_int(5).unwrap());
    }

    #[test]
    fn test_from_int_policies() {
        assert_eq!(Fp::saturating_from_int(i32::MAX), Fp::MAX);
        assert_eq!(Fp::saturating_from_int(i32::MIN), Fp::MIN);
        assert_eq!(Fp::saturating_from_int(7), Fp::from_int(7).unwrap());
        // 131072 << 14 == 2^31, which wraps to i32::MIN
        assert_eq!(Fp::wrapping_from_int(131072), Fp::MIN);
    }

    #[test]
    fn test_to_int_floors() {
        assert_eq!(Fp::from_raw(-1).to_int(), -1);
        assert_eq!(Fp::from_raw(Fp::SCALE - 1).to_int(), 0);
        let just_below_minus_one = Fp::from_raw(Fp::from_int(-1).unwrap().raw() - 1);
        assert_eq!(just_below_minus_one.to_int(), -2);
        // -2.5 floors to -3, where truncation toward zero would give -2
        assert_eq!(Fp::from_raw(-5 * Fp::HALF).to_int(), -3);
    }

    #[test]
    fn test_to_int_round_half_away_from_zero() {
        let two = Fp::from_int(2).unwrap().raw();
        assert_eq!(Fp::from_raw(two + Fp::HALF).to_int_round(), 3);
        assert_eq!(Fp::from_raw(two + Fp::HALF - 1).to_int_round(), 2);
        assert_eq!(Fp::from_raw(-two - Fp::HALF).to_int_round(), -3);
        assert_eq!(Fp::from_raw(-two - Fp::HALF + 1).to_int_round(), -2);
        assert_eq!(Fp::from_raw(-1).to_int_round(), 0);
    }

    #[test]
    fn test_to_int_round_exact_negatives() {
        for n in [-1, -2, -3, -100, Fp::INT_MIN] {
            assert_eq!(Fp::from_int(n).unwrap().to_int_round(), n);
        }
    }

    #[test]
    fn test_to_int_round_at_word_limits() {
        assert_eq!(Fp::MAX.to_int_round(), 131072);
        assert_eq!(Fp::MIN.to_int_round(), -131072);
    }

    #[test]
    fn test_floor_and_frac() {
        let x = Fp::from_raw(-5 * Fp::HALF); // -2.5
        assert_eq!(x.floor(), Fp::from_int(-3).unwrap());
        assert_eq!(x.frac(), Fp::from_raw(Fp::HALF));
        assert_eq!(Fp::from_raw(3 * Fp::HALF).frac().raw(), Fp::HALF);
        assert_eq!(x.signum(), -1);
        assert!(x.is_negative());
    }

    #[test]
    fn test_display_exact() {
        assert_eq!(Fp::from_raw(3 * Fp::HALF).to_string(), "1.5");
        assert_eq!(Fp::from_int(-3).unwrap().to_string(), "-3");
        assert_eq!(Fp::from_raw(-Fp::HALF).to_string(), "-0.5");
        assert_eq!(Fp::EPSILON.to_string(), "0.00006103515625");
        assert_eq!(Fp::ZERO.to_string(), "0");
        assert_eq!(Fp::MIN.to_string(), "-131072");
    }

    #[test]
    fn test_display_precision_and_width() {
        assert_eq!(format!("{:.2}", Fp::from_raw(273)), "0.01");
        assert_eq!(format!("{:.3}", Fp::from_raw(3 * Fp::HALF)), "1.500");
        assert_eq!(format!("{:.0}", Fp::from_raw(3 * Fp::HALF)), "1");
        assert_eq!(format!("{:>6.1}", Fp::from_raw(3 * Fp::HALF)), "   1.5");
        assert_eq!(format!("{:<6}|", Fp::from_int(-2).unwrap()), "-2    |");
        assert_eq!(format!("{:^7.1}|", Fp::from_raw(-3 * Fp::HALF)), " -1.5  |");
        assert_eq!(format!("{:06.2}", Fp::from_raw(-3 * Fp::HALF)), "-01.50");
        assert_eq!(format!("{:+}", Fp::ONE), "+1");
    }

    #[test]
    fn test_display_large_precision_pads_zeros() {
        let text = format!("{:.100}", Fp::MIN);
        let (int_part, frac_part) = text.split_once('.').unwrap();
        assert_eq!(int_part, "-131072");
        assert_eq!(frac_part.len(), 100);
        assert!(frac_part.bytes().all(|b| b == b'0'));

        let text = format!("{:.20}", Fp::EPSILON);
        assert_eq!(text, "0.00006103515625000000");
        assert_eq!(format!("{:>24.20}", Fp::EPSILON), "  0.00006103515625000000");
    }

    #[test]
    fn test_debug_shows_raw() {
        assert_eq!(format!("{:?}", Fp::ONE), "Fixed<14>(1 raw=16384)");
    }

    #[test]
    fn test_parse() {
        assert_eq!("1.5".parse::<Fp>().unwrap().raw(), 3 * Fp::HALF);
        assert_eq!("-0.5".parse::<Fp>().unwrap().raw(), -Fp::HALF);
        assert_eq!("+7".parse::<Fp>().unwrap(), Fp::from_int(7).unwrap());
        assert_eq!(".25".parse::<Fp>().unwrap().raw(), Fp::SCALE / 4);
        assert_eq!("3.".parse::<Fp>().unwrap(), Fp::from_int(3).unwrap());
        assert_eq!("0.99999".parse::<Fp>().unwrap(), Fp::ONE);
    }

    #[test]
    fn test_parse_rounds_half_away_from_zero() {
        // 2^-15 is exactly half an ulp
        assert_eq!("0.000030517578125".parse::<Fp>().unwrap().raw(), 1);
        assert_eq!("0.000030517578124".parse::<Fp>().unwrap().raw(), 0);
        assert_eq!("-0.000030517578125".parse::<Fp>().unwrap().raw(), -1);
    }

    #[test]
    fn test_parse_range() {
        assert_eq!("131071".parse::<Fp>().unwrap().to_int(), 131071);
        assert_eq!("-131072".parse::<Fp>().unwrap(), Fp::MIN);
        assert!(matches!(
            "131072".parse::<Fp>(),
            Err(FixedPointError::OutOfRange { value: 131072, .. })
        ));
        assert!(matches!(
            "99999999999999999999999".parse::<Fp>(),
            Err(FixedPointError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_parse_fraction_carry_out_of_range() {
        assert_eq!(
            "131071.99999".parse::<Fp>(),
            Err(FixedPointError::OutOfRange {
                value: 131072,
                min: -131072,
                max: 131071,
            })
        );
        assert_eq!(
            "-131072.5".parse::<Fp>(),
            Err(FixedPointError::OutOfRange {
                value: -131073,
                min: -131072,
                max: 131071,
            })
        );
        assert_eq!("131071.9999".parse::<Fp>().unwrap().to_int(), 131071);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for literal in ["", "-", ".", "abc", "1.2.3", "1e5", " 1", "--1"] {
            assert_eq!(
                literal.parse::<Fp>(),
                Err(FixedPointError::InvalidLiteral),
                "accepted {literal:?}"
            );
        }
    }

    #[test]
    fn test_display_parse_agree() {
        let x = Fp::from_raw(-123_457);
        assert_eq!(x.to_string().parse::<Fp>().unwrap(), x);
    }
}
