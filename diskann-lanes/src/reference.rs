/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Scalar ground truth for lane-wise operations.
//!
//! Every vector implementation, emulated or hardware backed, is expected to produce the
//! exact results expressed here for each lane. The traits also name the element types an
//! operator accepts, so generic code can bound on them. They are sealed.

use half::f16;

mod sealed {
    pub trait Sealed {}
}

macro_rules! impl_sealed {
    ($($T:ty),*) => {
        $(impl sealed::Sealed for $T {})*
    };
}

impl_sealed!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f16, f32, f64);

/// Core arithmetic.
///
/// Integer arithmetic always wraps. Unlike normal Rust, we do not check for overflow in
/// debug builds. Integer division by zero panics.
pub trait ReferenceScalarOps: Copy + sealed::Sealed {
    fn expected_add_(self, rhs: Self) -> Self;
    fn expected_sub_(self, rhs: Self) -> Self;
    fn expected_mul_(self, rhs: Self) -> Self;
    fn expected_div_(self, rhs: Self) -> Self;
}

macro_rules! impl_expected_ops_for_integers {
    ($($type:ty),* $(,)?) => {
        $(
            impl ReferenceScalarOps for $type {
                #[inline(always)]
                fn expected_add_(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }
                #[inline(always)]
                fn expected_sub_(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }
                #[inline(always)]
                fn expected_mul_(self, rhs: Self) -> Self {
                    self.wrapping_mul(rhs)
                }
                #[inline(always)]
                fn expected_div_(self, rhs: Self) -> Self {
                    self.wrapping_div(rhs)
                }
            }
        )*
    };
}

macro_rules! impl_expected_ops_for_floats {
    ($($type:ty),* $(,)?) => {
        $(
            impl ReferenceScalarOps for $type {
                #[inline(always)]
                fn expected_add_(self, rhs: Self) -> Self {
                    self + rhs
                }
                #[inline(always)]
                fn expected_sub_(self, rhs: Self) -> Self {
                    self - rhs
                }
                #[inline(always)]
                fn expected_mul_(self, rhs: Self) -> Self {
                    self * rhs
                }
                #[inline(always)]
                fn expected_div_(self, rhs: Self) -> Self {
                    self / rhs
                }
            }
        )*
    };
}

impl_expected_ops_for_integers!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
impl_expected_ops_for_floats!(f32, f64);

// Half precision arithmetic is carried out in single precision and rounded once.
impl ReferenceScalarOps for f16 {
    #[inline(always)]
    fn expected_add_(self, rhs: Self) -> Self {
        f16::from_f32(self.to_f32() + rhs.to_f32())
    }
    #[inline(always)]
    fn expected_sub_(self, rhs: Self) -> Self {
        f16::from_f32(self.to_f32() - rhs.to_f32())
    }
    #[inline(always)]
    fn expected_mul_(self, rhs: Self) -> Self {
        f16::from_f32(self.to_f32() * rhs.to_f32())
    }
    #[inline(always)]
    fn expected_div_(self, rhs: Self) -> Self {
        f16::from_f32(self.to_f32() / rhs.to_f32())
    }
}

//////////////
// Negation //
//////////////

/// Negation. Signed integers wrap, so the minimum value negates to itself.
pub trait ReferenceNeg: Copy + sealed::Sealed {
    fn expected_neg_(self) -> Self;
}

macro_rules! impl_neg {
    (integer, $($T:ty),*) => {
        $(
            impl ReferenceNeg for $T {
                #[inline(always)]
                fn expected_neg_(self) -> Self {
                    self.wrapping_neg()
                }
            }
        )*
    };
    (float, $($T:ty),*) => {
        $(
            impl ReferenceNeg for $T {
                #[inline(always)]
                fn expected_neg_(self) -> Self {
                    -self
                }
            }
        )*
    };
}

impl_neg!(integer, i8, i16, i32, i64, isize);
impl_neg!(float, f16, f32, f64);

////////////
// Shifts //
////////////

/// Shifts by a scalar amount shared by every lane.
///
/// Shifting by at least the bit width yields zero, except for right shifts of negative
/// signed values which yield `-1`.
pub trait ReferenceShifts: Copy + sealed::Sealed {
    fn expected_shr_(self, rhs: u32) -> Self;
    fn expected_shl_(self, rhs: u32) -> Self;
}

macro_rules! impl_shifts {
    (unsigned, $($type:ty),*) => {
        $(
            impl ReferenceShifts for $type {
                #[inline(always)]
                fn expected_shr_(self, rhs: u32) -> Self {
                    self.checked_shr(rhs).unwrap_or(0)
                }

                #[inline(always)]
                fn expected_shl_(self, rhs: u32) -> Self {
                    self.checked_shl(rhs).unwrap_or(0)
                }
            }
        )*
    };
    (signed, $($type:ty),*) => {
        $(
            impl ReferenceShifts for $type {
                #[inline(always)]
                fn expected_shr_(self, rhs: u32) -> Self {
                    match self.checked_shr(rhs) {
                        Some(v) => v,
                        None => if self < 0 { -1 } else { 0 },
                    }
                }

                #[inline(always)]
                fn expected_shl_(self, rhs: u32) -> Self {
                    self.checked_shl(rhs).unwrap_or(0)
                }
            }
        )*
    };
}

impl_shifts!(unsigned, u8, u16, u32, u64, usize);
impl_shifts!(signed, i8, i16, i32, i64, isize);

/////////////////////
// Floating Point //
/////////////////////

/// Elementary functions on floating point lanes.
///
/// Each function follows the scalar method of the same name on `f32` and `f64`.
pub trait ReferenceFloat: Copy + sealed::Sealed {
    fn expected_abs_(self) -> Self;
    fn expected_sqrt_(self) -> Self;
    fn expected_floor_(self) -> Self;
    fn expected_ceil_(self) -> Self;
    fn expected_min_(self, rhs: Self) -> Self;
    fn expected_max_(self, rhs: Self) -> Self;
    /// FMA **must** be done with only a single rounding.
    fn expected_fma_(self, rhs: Self, acc: Self) -> Self;

    fn expected_trunc_(self) -> Self;
    fn expected_round_(self) -> Self;
    fn expected_round_ties_even_(self) -> Self;
    fn expected_exp_(self) -> Self;
    fn expected_exp2_(self) -> Self;
    fn expected_exp_m1_(self) -> Self;
    fn expected_ln_(self) -> Self;
    fn expected_log2_(self) -> Self;
    fn expected_log10_(self) -> Self;
    fn expected_ln_1p_(self) -> Self;
    fn expected_cbrt_(self) -> Self;
    fn expected_sin_(self) -> Self;
    fn expected_cos_(self) -> Self;
    fn expected_tan_(self) -> Self;
    fn expected_asin_(self) -> Self;
    fn expected_acos_(self) -> Self;
    fn expected_atan_(self) -> Self;
    fn expected_sinh_(self) -> Self;
    fn expected_cosh_(self) -> Self;
    fn expected_tanh_(self) -> Self;
    fn expected_asinh_(self) -> Self;
    fn expected_acosh_(self) -> Self;
    fn expected_atanh_(self) -> Self;

    fn expected_powf_(self, rhs: Self) -> Self;
    fn expected_hypot_(self, rhs: Self) -> Self;
    fn expected_atan2_(self, rhs: Self) -> Self;
    fn expected_copysign_(self, rhs: Self) -> Self;
}

macro_rules! impl_float {
    ($($T:ty),*) => {
        $(
            impl ReferenceFloat for $T {
                #[inline(always)]
                fn expected_fma_(self, rhs: Self, acc: Self) -> Self {
                    self.mul_add(rhs, acc)
                }

                impl_float!(
                    @unary
                    abs => expected_abs_,
                    sqrt => expected_sqrt_,
                    floor => expected_floor_,
                    ceil => expected_ceil_,
                    trunc => expected_trunc_,
                    round => expected_round_,
                    round_ties_even => expected_round_ties_even_,
                    exp => expected_exp_,
                    exp2 => expected_exp2_,
                    exp_m1 => expected_exp_m1_,
                    ln => expected_ln_,
                    log2 => expected_log2_,
                    log10 => expected_log10_,
                    ln_1p => expected_ln_1p_,
                    cbrt => expected_cbrt_,
                    sin => expected_sin_,
                    cos => expected_cos_,
                    tan => expected_tan_,
                    asin => expected_asin_,
                    acos => expected_acos_,
                    atan => expected_atan_,
                    sinh => expected_sinh_,
                    cosh => expected_cosh_,
                    tanh => expected_tanh_,
                    asinh => expected_asinh_,
                    acosh => expected_acosh_,
                    atanh => expected_atanh_,
                );

                impl_float!(
                    @binary
                    min => expected_min_,
                    max => expected_max_,
                    powf => expected_powf_,
                    hypot => expected_hypot_,
                    atan2 => expected_atan2_,
                    copysign => expected_copysign_,
                );
            }
        )*
    };
    (@unary $($f:ident => $expected:ident),* $(,)?) => {
        $(
            #[inline(always)]
            fn $expected(self) -> Self {
                self.$f()
            }
        )*
    };
    (@binary $($f:ident => $expected:ident),* $(,)?) => {
        $(
            #[inline(always)]
            fn $expected(self, rhs: Self) -> Self {
                self.$f(rhs)
            }
        )*
    };
}

impl_float!(f32, f64);

////////////
// Limits //
////////////

/// Numeric limits of a scalar type.
pub trait ScalarLimits: Copy + sealed::Sealed {
    const MAX: Self;
    /// The smallest finite value. For floating point types this is `-MAX`.
    const MIN: Self;
}

/// Numeric limits only defined for floating point types.
pub trait FloatLimits: ScalarLimits {
    const EPSILON: Self;
    /// The smallest positive normal value.
    const MIN_POSITIVE: Self;
    /// The largest rounding error of a round to nearest operation, in ulps.
    const ROUND_ERROR: Self;
    /// The smallest positive subnormal value.
    const DENORM_MIN: Self;
    const INFINITY: Self;
    const NEG_INFINITY: Self;
    const NAN: Self;
    /// A NaN with the quiet bit clear.
    const SIGNALING_NAN: Self;
}

macro_rules! impl_limits {
    (integer, $($T:ty),*) => {
        $(
            impl ScalarLimits for $T {
                const MAX: Self = <$T>::MAX;
                const MIN: Self = <$T>::MIN;
            }
        )*
    };
    (float, $T:ty, half: $half:expr, snan: $snan:expr) => {
        impl ScalarLimits for $T {
            const MAX: Self = <$T>::MAX;
            const MIN: Self = <$T>::MIN;
        }

        impl FloatLimits for $T {
            const EPSILON: Self = <$T>::EPSILON;
            const MIN_POSITIVE: Self = <$T>::MIN_POSITIVE;
            const ROUND_ERROR: Self = $half;
            const DENORM_MIN: Self = <$T>::from_bits(1);
            const INFINITY: Self = <$T>::INFINITY;
            const NEG_INFINITY: Self = <$T>::NEG_INFINITY;
            const NAN: Self = <$T>::NAN;
            const SIGNALING_NAN: Self = <$T>::from_bits($snan);
        }
    };
}

impl_limits!(integer, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
impl_limits!(float, f16, half: f16::from_bits(0x3800), snan: 0x7d00);
impl_limits!(float, f32, half: 0.5, snan: 0x7fa0_0000);
impl_limits!(float, f64, half: 0.5, snan: 0x7ff4_0000_0000_0000);
