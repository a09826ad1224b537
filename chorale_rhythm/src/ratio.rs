// Signed rational durations.
//
// Durations are measured in quarter notes. A negative value is a rest of the
// same absolute length, which is how the decoders mark silence without a
// separate event type. Triplets and quintuplets (1/3, 1/5) make floating
// point a poor fit: repeated "extend by half" and "halve" modifiers would
// drift, and merged durations would stop comparing equal.
//
// Values are always kept reduced with a positive denominator, so derived
// equality and hashing are structural.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg};

/// A reduced fraction `num / den` with `den > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ratio {
    num: i64,
    den: i64,
}

impl Ratio {
    pub const ZERO: Ratio = Ratio { num: 0, den: 1 };
    pub const ONE: Ratio = Ratio { num: 1, den: 1 };

    /// Build and reduce `num / den`. Panics on a zero denominator.
    pub fn new(num: i64, den: i64) -> Self {
        assert!(den != 0, "Ratio::new: zero denominator");
        let g = gcd(num.abs(), den.abs()).max(1);
        let sign = if den < 0 { -1 } else { 1 };
        Ratio {
            num: sign * num / g,
            den: sign * den / g,
        }
    }

    pub fn from_int(n: i64) -> Self {
        Ratio { num: n, den: 1 }
    }

    pub fn numer(self) -> i64 {
        self.num
    }

    pub fn denom(self) -> i64 {
        self.den
    }

    pub fn is_negative(self) -> bool {
        self.num < 0
    }

    pub fn abs(self) -> Self {
        Ratio {
            num: self.num.abs(),
            den: self.den,
        }
    }

    /// Sum, or `None` when the reduced result does not fit in `i64`.
    pub fn checked_add(self, other: Ratio) -> Option<Ratio> {
        let (a, b, c, d) = self.wide(other);
        let num = a.checked_mul(d)?.checked_add(c.checked_mul(b)?)?;
        Ratio::narrow(num, b * d)
    }

    /// Product, or `None` when the reduced result does not fit in `i64`.
    pub fn checked_mul(self, other: Ratio) -> Option<Ratio> {
        let (a, b, c, d) = self.wide(other);
        Ratio::narrow(a * c, b * d)
    }

    fn wide(self, other: Ratio) -> (i128, i128, i128, i128) {
        (
            self.num as i128,
            self.den as i128,
            other.num as i128,
            other.den as i128,
        )
    }

    /// Reduce an `i128` fraction with a positive denominator back to `i64`.
    fn narrow(num: i128, den: i128) -> Option<Ratio> {
        let g = gcd_wide(num.abs(), den).max(1);
        Some(Ratio {
            num: i64::try_from(num / g).ok()?,
            den: i64::try_from(den / g).ok()?,
        })
    }

    /// Lossy conversion for display and for callers that want seconds.
    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

fn gcd_wide(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

impl Default for Ratio {
    fn default() -> Self {
        Ratio::ZERO
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl From<i64> for Ratio {
    fn from(n: i64) -> Self {
        Ratio::from_int(n)
    }
}

impl Add for Ratio {
    type Output = Ratio;

    /// Panics if the reduced sum does not fit; see `checked_add`.
    fn add(self, other: Ratio) -> Ratio {
        match self.checked_add(other) {
            Some(sum) => sum,
            None => panic!("Ratio overflow: {self} + {other}"),
        }
    }
}

impl Mul for Ratio {
    type Output = Ratio;

    /// Panics if the reduced product does not fit; see `checked_mul`.
    fn mul(self, other: Ratio) -> Ratio {
        match self.checked_mul(other) {
            Some(product) => product,
            None => panic!("Ratio overflow: {self} * {other}"),
        }
    }
}

impl Neg for Ratio {
    type Output = Ratio;

    fn neg(self) -> Ratio {
        Ratio {
            num: -self.num,
            den: self.den,
        }
    }
}

impl PartialOrd for Ratio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ratio {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are positive, so cross-multiplying preserves order.
        (self.num as i128 * other.den as i128).cmp(&(other.num as i128 * self.den as i128))
    }
}
