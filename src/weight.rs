use core::ops::{Add, AddAssign, Sub, SubAssign};

use rand::Rng;

/// A sampling weight, as stored by [`SamplingMap`](crate::SamplingMap) and
/// [`SamplingSet`](crate::SamplingSet).
///
/// Implemented for the primitive integers and floats. The distinction that
/// matters is resolved at compile time through this trait: integer weights
/// draw sampling positions uniformly from `[0, total - 1]` and treat any
/// position `>= total` as out of range, while float weights draw from
/// `[0, total)`, admit `total` itself (it addresses the maximum entry) plus
/// a couple of ulps of slack, and compare aggregates with a small relative
/// tolerance because sums are not exactly reconstructible.
///
/// `Default` must be the zero weight. Zero weights are allowed on entries
/// (such entries are simply never sampled); negative weights are not
/// meaningful and the containers do not attempt to detect them.
pub trait Weight:
    Copy + Default + PartialOrd + Add<Output = Self> + Sub<Output = Self> + AddAssign + SubAssign
{
    /// Draws one uniform sampling position for a tree of total weight
    /// `total`. Precondition: `total` is positive.
    fn draw_position<R: Rng + ?Sized>(rng: &mut R, total: Self) -> Self;

    /// Whether `position` can address an entry of a tree of total weight
    /// `total`.
    fn admissible(position: Self, total: Self) -> bool;

    /// Aggregate equality, as used by the consistency audit.
    fn tally_eq(a: Self, b: Self) -> bool;

    /// `factor * total`, for sampling from a position scaled into
    /// `[0, 1]`.
    fn scale(total: Self, factor: f64) -> Self;
}

macro_rules! unsigned_weight {
    ($($t:ty)*) => {$(
        impl Weight for $t {
            #[inline]
            fn draw_position<R: Rng + ?Sized>(rng: &mut R, total: Self) -> Self {
                rng.gen_range(0..total)
            }

            #[inline]
            fn admissible(position: Self, total: Self) -> bool {
                position < total
            }

            #[inline]
            fn tally_eq(a: Self, b: Self) -> bool {
                a == b
            }

            #[inline]
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            fn scale(total: Self, factor: f64) -> Self {
                (factor * total as f64) as $t
            }
        }
    )*};
}

macro_rules! signed_weight {
    ($($t:ty)*) => {$(
        impl Weight for $t {
            #[inline]
            fn draw_position<R: Rng + ?Sized>(rng: &mut R, total: Self) -> Self {
                rng.gen_range(0..total)
            }

            #[inline]
            fn admissible(position: Self, total: Self) -> bool {
                position >= 0 && position < total
            }

            #[inline]
            fn tally_eq(a: Self, b: Self) -> bool {
                a == b
            }

            #[inline]
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            fn scale(total: Self, factor: f64) -> Self {
                (factor * total as f64) as $t
            }
        }
    )*};
}

macro_rules! float_weight {
    ($($t:ty)*) => {$(
        impl Weight for $t {
            #[inline]
            fn draw_position<R: Rng + ?Sized>(rng: &mut R, total: Self) -> Self {
                rng.gen_range(0.0..total)
            }

            #[inline]
            fn admissible(position: Self, total: Self) -> bool {
                // `total` itself addresses the maximum entry; past that,
                // allow a couple of ulps before declaring out of range.
                position >= 0.0 && position - total <= 2.0 * <$t>::EPSILON * total
            }

            #[inline]
            fn tally_eq(a: Self, b: Self) -> bool {
                // core has no `abs` for floats.
                let abs = |x: $t| if x < 0.0 { -x } else { x };
                let mut scale = abs(a);
                if abs(b) > scale {
                    scale = abs(b);
                }
                if scale < 1.0 {
                    scale = 1.0;
                }
                abs(a - b) <= 100.0 * <$t>::EPSILON * scale
            }

            #[inline]
            #[allow(clippy::cast_possible_truncation)]
            fn scale(total: Self, factor: f64) -> Self {
                factor as $t * total
            }
        }
    )*};
}

unsigned_weight! { u8 u16 u32 u64 usize }
signed_weight! { i8 i16 i32 i64 isize }
float_weight! { f32 f64 }
