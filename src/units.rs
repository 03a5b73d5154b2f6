//! Dimension units used by the layout, along with conversion rules to go from one to another.
//!
//! The line grid is expressed in CSS pixels. Page geometry is configured in millimetres and the
//! pdf output works in points, so the conversion rules used are 1 mm = 3.7795 px and
//! 1 px = 0.75 pt.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

use printpdf::{Mm, Pt};
use serde::{Deserialize, Serialize};

/// How many pixels fit in a millimetre.
pub const PX_PER_MM: f64 = 3.7795;

/// How many points fit in a pixel.
pub const PT_PER_PX: f64 = 0.75;

/// Pixels, the unit of the line grid.
#[derive(Copy, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Px(pub f64);

impl Px {
    /// Converts millimetres into whole pixels, rounding down.
    ///
    /// ```
    /// # use printpdf::Mm;
    /// # use mathpro::units::Px;
    /// assert_eq!(Px::floor_from(Mm(297.0)), Px(1122.0));
    /// assert_eq!(Px::floor_from(Mm(25.4)), Px(95.0));
    /// ```
    pub fn floor_from(mm: Mm) -> Px {
        Px((mm.0 * PX_PER_MM).floor())
    }

    /// Rounds up to the next whole pixel.
    pub fn ceil(self) -> Px {
        Px(self.0.ceil())
    }

    /// Returns the largest of two lengths.
    pub fn max(self, other: Px) -> Px {
        Px(self.0.max(other.0))
    }

    /// Rounds up to a whole multiple of `step`.
    ///
    /// ```
    /// # use mathpro::units::Px;
    /// assert_eq!(Px(29.0).snap_up(Px(34.0)), Px(34.0));
    /// assert_eq!(Px(34.0).snap_up(Px(34.0)), Px(34.0));
    /// assert_eq!(Px(47.0).snap_up(Px(34.0)), Px(68.0));
    /// ```
    pub fn snap_up(self, step: Px) -> Px {
        Px((self.0 / step.0).ceil() * step.0)
    }
}

impl fmt::Debug for Px {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} px", self.0)
    }
}

macro_rules! impl_operators {
    ($the_type: ty, $constructor: expr) => {
        impl Add for $the_type {
            type Output = $the_type;

            fn add(self, other: $the_type) -> $the_type {
                $constructor(self.0 + other.0)
            }
        }

        impl AddAssign for $the_type {
            fn add_assign(&mut self, other: $the_type) {
                self.0 += other.0;
            }
        }

        impl Sub for $the_type {
            type Output = $the_type;

            fn sub(self, other: $the_type) -> $the_type {
                $constructor(self.0 - other.0)
            }
        }

        impl SubAssign for $the_type {
            fn sub_assign(&mut self, other: $the_type) {
                self.0 -= other.0;
            }
        }

        impl Mul<f64> for $the_type {
            type Output = $the_type;

            fn mul(self, rhs: f64) -> $the_type {
                $constructor(self.0 * rhs)
            }
        }

        impl Div<f64> for $the_type {
            type Output = $the_type;

            fn div(self, rhs: f64) -> $the_type {
                $constructor(self.0 / rhs)
            }
        }
    };
}

impl_operators!(Px, Px);

impl PartialOrd for Px {
    fn partial_cmp(&self, other: &Px) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl From<Mm> for Px {
    fn from(mm: Mm) -> Px {
        Px(mm.0 * PX_PER_MM)
    }
}

impl From<Px> for Mm {
    fn from(px: Px) -> Mm {
        Mm(px.0 / PX_PER_MM)
    }
}

impl From<Px> for Pt {
    fn from(px: Px) -> Pt {
        Pt(px.0 * PT_PER_PX)
    }
}

/// Compares two float numbers to check if they're close enough to be
/// considered equal.
///
/// # Examples
///
/// ```
/// # use mathpro::units::nearly_equal;
/// assert_eq!(nearly_equal(3.0, 2.99999), true);
/// assert_eq!(nearly_equal(4.0, 3.999), false);
/// ```
pub fn nearly_equal(a: f64, b: f64) -> bool {
    let abs_a = a.abs();
    let abs_b = b.abs();
    let diff = (a - b).abs();

    if a == b {
        // Handle infinities.
        true
    } else if a == 0.0 || b == 0.0 || diff < f64::MIN_POSITIVE {
        // One of a or b is zero (or both are extremely close to it,) use absolute error.
        diff < (f64::EPSILON * f64::MIN_POSITIVE)
    } else {
        // Use relative error.
        (diff / f64::min(abs_a + abs_b, f64::MAX)) < 10e-5
    }
}

#[cfg(test)]
mod tests {
    use crate::units::{nearly_equal, Px};
    use printpdf::{Mm, Pt};

    #[test]
    fn convert_mm_to_px() {
        let px = Px::from(Mm(10.0));
        assert!(nearly_equal(px.0, 37.795));
    }

    #[test]
    fn convert_px_to_mm() {
        let mm: Mm = Px(37.795).into();
        assert!(nearly_equal(mm.0, 10.0));
    }

    #[test]
    fn convert_px_to_pt() {
        let pt: Pt = Px(34.0).into();
        assert!(nearly_equal(pt.0, 25.5));
    }

    #[test]
    fn operators() {
        let mut length = Px(34.0) + Px(34.0) - Px(17.0);
        length += Px(1.0);
        length -= Px(2.0);
        assert_eq!(length, Px(50.0));
        assert_eq!(length * 2.0, Px(100.0));
        assert_eq!(length / 2.0, Px(25.0));
        assert!(Px(33.0) < Px(34.0));
    }
}
