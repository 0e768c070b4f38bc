use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use fixed::types::I32F32;

const MM_PER_INCH: f32 = 25.4;
const PT_PER_INCH: f32 = 72.0;
const MILLI_PER_PT: i64 = 1000;

/// A length in PDF points. Every value sits on a 1/1000 pt grid, so two
/// lengths computed from the same inputs compare equal bit for bit.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Pt(I32F32);

impl Pt {
    pub const ZERO: Pt = Pt(I32F32::ZERO);

    pub fn from_f32(value: f32) -> Pt {
        let milli = (f64::from(value) * MILLI_PER_PT as f64).round();
        if !milli.is_finite() {
            return Pt::ZERO;
        }
        Pt::from_milli_i64(milli as i64)
    }

    pub fn from_mm(mm: f32) -> Pt {
        Pt::from_f32(mm * PT_PER_INCH / MM_PER_INCH)
    }

    pub fn from_milli_i64(milli: i64) -> Pt {
        Pt(I32F32::saturating_from_num(milli) / MILLI_PER_PT)
    }

    pub fn to_milli_i64(self) -> i64 {
        self.0
            .saturating_mul_int(MILLI_PER_PT)
            .saturating_round()
            .saturating_to_num::<i64>()
    }

    pub fn to_f32(self) -> f32 {
        self.to_milli_i64() as f32 / MILLI_PER_PT as f32
    }

    pub fn to_mm(self) -> f32 {
        self.to_f32() * MM_PER_INCH / PT_PER_INCH
    }

    pub fn max(self, other: Pt) -> Pt {
        if other > self { other } else { self }
    }

    pub fn min(self, other: Pt) -> Pt {
        if other < self { other } else { self }
    }

    /// `self * num / denom`, rounded to the nearest grid step.
    pub fn mul_ratio(self, num: i32, denom: i32) -> Pt {
        self.map_milli(|milli| div_round(milli.saturating_mul(i64::from(num)), i64::from(denom)))
    }

    /// How many whole times `other` fits into `self`. Zero for a non-positive
    /// divisor.
    pub fn div_floor(self, other: Pt) -> i64 {
        match other.to_milli_i64() {
            den if den > 0 => self.to_milli_i64().div_euclid(den),
            _ => 0,
        }
    }

    fn map_milli(self, f: impl FnOnce(i64) -> i64) -> Pt {
        Pt::from_milli_i64(f(self.to_milli_i64()))
    }
}

/// Integer division rounding halves away from zero; zero for a zero divisor.
fn div_round(num: i64, den: i64) -> i64 {
    if den == 0 {
        return 0;
    }
    let (quotient, remainder) = (num / den, num % den);
    if remainder.unsigned_abs() * 2 >= den.unsigned_abs() {
        quotient + num.signum() * den.signum()
    } else {
        quotient
    }
}

impl fmt::Display for Pt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}mm", self.to_mm())
    }
}

impl Add for Pt {
    type Output = Pt;

    fn add(self, rhs: Pt) -> Pt {
        self.map_milli(|milli| milli.saturating_add(rhs.to_milli_i64()))
    }
}

impl Sub for Pt {
    type Output = Pt;

    fn sub(self, rhs: Pt) -> Pt {
        self.map_milli(|milli| milli.saturating_sub(rhs.to_milli_i64()))
    }
}

impl AddAssign for Pt {
    fn add_assign(&mut self, rhs: Pt) {
        *self = *self + rhs;
    }
}

impl SubAssign for Pt {
    fn sub_assign(&mut self, rhs: Pt) {
        *self = *self - rhs;
    }
}

impl Mul<i32> for Pt {
    type Output = Pt;

    fn mul(self, rhs: i32) -> Pt {
        self.map_milli(|milli| milli.saturating_mul(i64::from(rhs)))
    }
}

impl Div<i32> for Pt {
    type Output = Pt;

    fn div(self, rhs: i32) -> Pt {
        self.map_milli(|milli| div_round(milli, i64::from(rhs)))
    }
}

impl Neg for Pt {
    type Output = Pt;

    fn neg(self) -> Pt {
        self.map_milli(|milli| milli.saturating_neg())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: Pt,
    pub height: Pt,
}

impl Size {
    pub const ZERO: Size = Size {
        width: Pt::ZERO,
        height: Pt::ZERO,
    };

    pub fn new(width: Pt, height: Pt) -> Self {
        Self { width, height }
    }

    pub fn a4() -> Self {
        Self::from_mm(210.0, 297.0)
    }

    pub fn from_mm(width_mm: f32, height_mm: f32) -> Self {
        Self {
            width: Pt::from_mm(width_mm),
            height: Pt::from_mm(height_mm),
        }
    }

    /// Shrinks both axes by `inset` on each side.
    pub fn inset(self, inset: Pt) -> Self {
        Self {
            width: self.width - inset * 2,
            height: self.height - inset * 2,
        }
    }

    /// Grows both axes by `amount` (once, not per side).
    pub fn grow(self, amount: Pt) -> Self {
        Self {
            width: self.width + amount,
            height: self.height + amount,
        }
    }

    pub fn with_width(self, width: Pt) -> Self {
        Self { width, ..self }
    }

    pub fn with_height(self, height: Pt) -> Self {
        Self { height, ..self }
    }

    pub fn is_positive(self) -> bool {
        self.width > Pt::ZERO && self.height > Pt::ZERO
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: Pt,
    pub y: Pt,
}

impl Point {
    pub const ORIGIN: Point = Point {
        x: Pt::ZERO,
        y: Pt::ZERO,
    };

    pub fn new(x: Pt, y: Pt) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: Pt,
    pub y: Pt,
    pub width: Pt,
    pub height: Pt,
}

impl Rect {
    pub fn new(x: Pt, y: Pt, width: Pt, height: Pt) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self::at(Point::ORIGIN, size)
    }

    pub fn at(origin: Point, size: Size) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
        }
    }

    pub fn right(&self) -> Pt {
        self.x + self.width
    }

    pub fn bottom(&self) -> Pt {
        self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: Pt,
    pub right: Pt,
    pub bottom: Pt,
    pub left: Pt,
}

impl Margins {
    pub fn from_mm(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top: Pt::from_mm(top),
            right: Pt::from_mm(right),
            bottom: Pt::from_mm(bottom),
            left: Pt::from_mm(left),
        }
    }

    /// The area left inside `page` once these margins are removed.
    pub fn printable(&self, page: Size) -> Size {
        Size {
            width: page.width - self.left - self.right,
            height: page.height - self.top - self.bottom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(level: f32) -> Self {
        Self {
            r: level,
            g: level,
            b: level,
        }
    }
}
