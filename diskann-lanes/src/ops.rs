/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! # Operator Algebra
//!
//! Lane-wise operators are synthesized once from the generic kernels in this module:
//!
//! * [`map`]: `result[i] = f(x[i])`.
//! * [`zip_with`]: `result[i] = f(x[i], y[i])`.
//! * [`compare`]: `mask[i] = f(x[i], y[i])`.
//!
//! Vector types with hardware registers lower an operator to an intrinsic when the
//! instruction set has one and to these kernels otherwise, so the observed results are
//! identical across implementations.
//!
//! Broadcast forms where one operand is a scalar (`v + 1` and `1 + v`) are generated by
//! the crate-internal `impl_scalar_broadcast!` macro for each primitive element type.
//! Compound assignment (`+=` and friends) is derived from the binary operator for any
//! right-hand side by `impl_assign_ops!`.
//!
//! Masks combine with `&`, `|`, `^` and `!`. Rust does not allow overloading the
//! short-circuiting `&&` and `||`, so the bitwise forms take their place.

use crate::{
    arch::Architecture,
    reference::{FloatLimits, ScalarLimits},
    traits::SIMDVector,
};

/////////////
// Kernels //
/////////////

/// Apply `f` to every lane of `x`.
#[inline(always)]
pub fn map<V, F>(x: V, mut f: F) -> V
where
    V: SIMDVector,
    F: FnMut(V::Scalar) -> V::Scalar,
{
    V::from_fn(x.arch(), |i| f(x.get(i)))
}

/// Combine corresponding lanes of `x` and `y` with `f`.
#[inline(always)]
pub fn zip_with<V, F>(x: V, y: V, mut f: F) -> V
where
    V: SIMDVector,
    F: FnMut(V::Scalar, V::Scalar) -> V::Scalar,
{
    V::from_fn(x.arch(), |i| f(x.get(i), y.get(i)))
}

/// Combine corresponding lanes of `x`, `y` and `z` with `f`.
#[inline(always)]
pub fn zip3_with<V, F>(x: V, y: V, z: V, mut f: F) -> V
where
    V: SIMDVector,
    F: FnMut(V::Scalar, V::Scalar, V::Scalar) -> V::Scalar,
{
    V::from_fn(x.arch(), |i| f(x.get(i), y.get(i), z.get(i)))
}

/// Evaluate the predicate `f` on corresponding lanes of `x` and `y`.
#[inline(always)]
pub fn compare<V, F>(x: V, y: V, mut f: F) -> <V::Arch as Architecture>::Mask
where
    V: SIMDVector,
    F: FnMut(V::Scalar, V::Scalar) -> bool,
{
    <V::Arch as Architecture>::Mask::from_fn(x.arch(), |i| f(x.get(i), y.get(i)))
}

/// Fold the lanes of `x` in index order.
#[inline(always)]
pub fn fold<V, B, F>(x: V, init: B, f: F) -> B
where
    V: SIMDVector,
    F: FnMut(B, V::Scalar) -> B,
{
    x.lanes().fold(init, f)
}

//////////
// Math //
//////////

/// Elementary functions lifted lane-wise over floating point vectors.
///
/// Every function matches the scalar method of the same name on each lane. The first
/// group has hardware lowerings on some architectures. The rest run lane by lane
/// everywhere.
pub trait LaneMath: SIMDVector {
    /// Lane-wise absolute value.
    fn abs(self) -> Self;

    /// Lane-wise square root.
    fn sqrt(self) -> Self;

    /// Lane-wise round toward negative infinity.
    fn floor(self) -> Self;

    /// Lane-wise round toward positive infinity.
    fn ceil(self) -> Self;

    /// Lane-wise minimum. If one lane is NaN, the other lane is returned.
    fn min(self, rhs: Self) -> Self;

    /// Lane-wise maximum. If one lane is NaN, the other lane is returned.
    fn max(self, rhs: Self) -> Self;

    /// Compute `self * rhs + acc` lane-wise with a single rounding.
    fn mul_add(self, rhs: Self, acc: Self) -> Self;

    /// Lane-wise round toward zero.
    fn trunc(self) -> Self;

    /// Lane-wise round to nearest, with ties away from zero.
    fn round(self) -> Self;

    /// Lane-wise round to nearest, with ties to even.
    fn round_ties_even(self) -> Self;

    /// Lane-wise `e^x`.
    fn exp(self) -> Self;

    /// Lane-wise `2^x`.
    fn exp2(self) -> Self;

    /// Lane-wise `e^x - 1`, accurate near zero.
    fn exp_m1(self) -> Self;

    /// Lane-wise natural logarithm.
    fn ln(self) -> Self;

    /// Lane-wise base 2 logarithm.
    fn log2(self) -> Self;

    /// Lane-wise base 10 logarithm.
    fn log10(self) -> Self;

    /// Lane-wise `ln(1 + x)`, accurate near zero.
    fn ln_1p(self) -> Self;

    /// Lane-wise cube root.
    fn cbrt(self) -> Self;

    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn tan(self) -> Self;
    fn asin(self) -> Self;
    fn acos(self) -> Self;
    fn atan(self) -> Self;
    fn sinh(self) -> Self;
    fn cosh(self) -> Self;
    fn tanh(self) -> Self;
    fn asinh(self) -> Self;
    fn acosh(self) -> Self;
    fn atanh(self) -> Self;

    /// Lane-wise `self^rhs`.
    fn powf(self, rhs: Self) -> Self;

    /// Lane-wise `sqrt(self^2 + rhs^2)` without intermediate overflow.
    fn hypot(self, rhs: Self) -> Self;

    /// Lane-wise four quadrant arctangent of `self / rhs`.
    fn atan2(self, rhs: Self) -> Self;

    /// Lane-wise magnitude of `self` with the sign of `rhs`.
    fn copysign(self, rhs: Self) -> Self;
}

/// The per-lane implementation of [`LaneMath`].
///
/// With no arguments, every function is generated. With `elementary`, only the functions
/// after `mul_add` are generated, for types that lower the rest to instructions.
macro_rules! impl_lane_math_by_lane {
    () => {
        $crate::ops::impl_lane_math_by_lane!(
            @unary
            abs => expected_abs_,
            sqrt => expected_sqrt_,
            floor => expected_floor_,
            ceil => expected_ceil_,
        );
        $crate::ops::impl_lane_math_by_lane!(
            @binary
            min => expected_min_,
            max => expected_max_,
        );

        #[inline(always)]
        fn mul_add(self, rhs: Self, acc: Self) -> Self {
            $crate::ops::zip3_with(self, rhs, acc, $crate::reference::ReferenceFloat::expected_fma_)
        }

        $crate::ops::impl_lane_math_by_lane!(elementary);
    };
    (elementary) => {
        $crate::ops::impl_lane_math_by_lane!(
            @unary
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
        $crate::ops::impl_lane_math_by_lane!(
            @binary
            powf => expected_powf_,
            hypot => expected_hypot_,
            atan2 => expected_atan2_,
            copysign => expected_copysign_,
        );
    };
    (@unary $($f:ident => $expected:ident),* $(,)?) => {
        $(
            #[inline(always)]
            fn $f(self) -> Self {
                $crate::ops::map(self, $crate::reference::ReferenceFloat::$expected)
            }
        )*
    };
    (@binary $($f:ident => $expected:ident),* $(,)?) => {
        $(
            #[inline(always)]
            fn $f(self, rhs: Self) -> Self {
                $crate::ops::zip_with(self, rhs, $crate::reference::ReferenceFloat::$expected)
            }
        )*
    };
}

pub(crate) use impl_lane_math_by_lane;

////////////
// Limits //
////////////

/// Broadcasts of the numeric limits of the scalar type.
pub trait LaneLimits: SIMDVector {
    /// Every lane holds the largest finite value.
    fn max_value(arch: Self::Arch) -> Self;

    /// Every lane holds the smallest finite value.
    fn min_value(arch: Self::Arch) -> Self;

    /// Every lane holds the lowest finite value. This equals [`LaneLimits::min_value`]
    /// for every scalar type, floating point included.
    fn lowest(arch: Self::Arch) -> Self;
}

impl<V> LaneLimits for V
where
    V: SIMDVector,
    V::Scalar: ScalarLimits,
{
    #[inline(always)]
    fn max_value(arch: Self::Arch) -> Self {
        Self::splat(arch, <V::Scalar as ScalarLimits>::MAX)
    }

    #[inline(always)]
    fn min_value(arch: Self::Arch) -> Self {
        Self::splat(arch, <V::Scalar as ScalarLimits>::MIN)
    }

    #[inline(always)]
    fn lowest(arch: Self::Arch) -> Self {
        Self::splat(arch, <V::Scalar as ScalarLimits>::MIN)
    }
}

/// Broadcasts of the limits and special values only floating point types have.
pub trait LaneFloatLimits: LaneLimits {
    /// Every lane holds the machine epsilon.
    fn epsilon(arch: Self::Arch) -> Self;

    /// Every lane holds the smallest positive normal value.
    fn min_positive(arch: Self::Arch) -> Self;

    /// Every lane holds the largest error of rounding to nearest, which is one half.
    fn round_error(arch: Self::Arch) -> Self;

    /// Every lane holds the smallest positive subnormal value.
    fn denorm_min(arch: Self::Arch) -> Self;

    /// Every lane holds positive infinity.
    fn infinity(arch: Self::Arch) -> Self;

    /// Every lane holds negative infinity.
    fn neg_infinity(arch: Self::Arch) -> Self;

    /// Every lane holds a quiet NaN.
    fn nan(arch: Self::Arch) -> Self;

    /// Every lane holds a signaling NaN.
    fn signaling_nan(arch: Self::Arch) -> Self;
}

macro_rules! float_limit {
    ($($f:ident => $C:ident),* $(,)?) => {
        $(
            #[inline(always)]
            fn $f(arch: Self::Arch) -> Self {
                Self::splat(arch, <V::Scalar as FloatLimits>::$C)
            }
        )*
    };
}

impl<V> LaneFloatLimits for V
where
    V: SIMDVector,
    V::Scalar: FloatLimits,
{
    float_limit!(
        epsilon => EPSILON,
        min_positive => MIN_POSITIVE,
        round_error => ROUND_ERROR,
        denorm_min => DENORM_MIN,
        infinity => INFINITY,
        neg_infinity => NEG_INFINITY,
        nan => NAN,
        signaling_nan => SIGNALING_NAN,
    );
}

//////////////////////////
// Operator Generation //
//////////////////////////

/// Derive every compound assignment operator from its binary counterpart, for any
/// right-hand side the binary operator accepts.
///
/// ```ignore
/// impl_assign_ops!({ T, const N: usize, A } Emulated<T, N, A>);
/// impl_assign_ops!({} i32x8);
/// ```
///
/// The right-hand side is bound to the generic parameter `Rhs`.
macro_rules! impl_assign_ops {
    ({ $($gen:tt)* } $V:ty) => {
        $crate::ops::impl_assign_ops!(@one { $($gen)* } $V, Add, add, AddAssign, add_assign);
        $crate::ops::impl_assign_ops!(@one { $($gen)* } $V, Sub, sub, SubAssign, sub_assign);
        $crate::ops::impl_assign_ops!(@one { $($gen)* } $V, Mul, mul, MulAssign, mul_assign);
        $crate::ops::impl_assign_ops!(@one { $($gen)* } $V, Div, div, DivAssign, div_assign);
        $crate::ops::impl_assign_ops!(
            @one { $($gen)* } $V, BitAnd, bitand, BitAndAssign, bitand_assign
        );
        $crate::ops::impl_assign_ops!(
            @one { $($gen)* } $V, BitOr, bitor, BitOrAssign, bitor_assign
        );
        $crate::ops::impl_assign_ops!(
            @one { $($gen)* } $V, BitXor, bitxor, BitXorAssign, bitxor_assign
        );
        $crate::ops::impl_assign_ops!(@one { $($gen)* } $V, Shl, shl, ShlAssign, shl_assign);
        $crate::ops::impl_assign_ops!(@one { $($gen)* } $V, Shr, shr, ShrAssign, shr_assign);
    };
    (@one { $($gen:tt)* } $V:ty, $Op:ident, $op:ident, $OpAssign:ident, $op_assign:ident) => {
        impl<Rhs, $($gen)*> std::ops::$OpAssign<Rhs> for $V
        where
            $V: std::ops::$Op<Rhs, Output = $V> + Copy,
        {
            #[inline(always)]
            fn $op_assign(&mut self, rhs: Rhs) {
                *self = std::ops::$Op::$op(*self, rhs);
            }
        }
    };
}

pub(crate) use impl_assign_ops;

/// Generate the scalar broadcast forms of the binary operators for a vector type `$V`
/// with scalar `$T`.
///
/// The categories select which operators are generated:
///
/// * `arith`: `+ - * /`.
/// * `bits`: `& | ^`.
/// * `cmp`: [`crate::SIMDPartialEq`] and [`crate::SIMDPartialOrd`] against a scalar.
///
/// Both operand orders are generated. The vector-vector operators must already exist.
macro_rules! impl_scalar_broadcast {
    ($gen:tt $V:ty, $T:ty where $bounds:tt; $($cat:ident),+) => {
        $(
            $crate::ops::impl_scalar_broadcast!(@$cat $gen $V, $T, $bounds);
        )+
    };
    (@arith { $($gen:tt)* } $V:ty, $T:ty, { $($bounds:tt)* }) => {
        $crate::ops::impl_scalar_broadcast!(@op { $($gen)* } $V, $T, { $($bounds)* }, Add, add);
        $crate::ops::impl_scalar_broadcast!(@op { $($gen)* } $V, $T, { $($bounds)* }, Sub, sub);
        $crate::ops::impl_scalar_broadcast!(@op { $($gen)* } $V, $T, { $($bounds)* }, Mul, mul);
        $crate::ops::impl_scalar_broadcast!(@op { $($gen)* } $V, $T, { $($bounds)* }, Div, div);
    };
    (@bits { $($gen:tt)* } $V:ty, $T:ty, { $($bounds:tt)* }) => {
        $crate::ops::impl_scalar_broadcast!(
            @op { $($gen)* } $V, $T, { $($bounds)* }, BitAnd, bitand
        );
        $crate::ops::impl_scalar_broadcast!(
            @op { $($gen)* } $V, $T, { $($bounds)* }, BitOr, bitor
        );
        $crate::ops::impl_scalar_broadcast!(
            @op { $($gen)* } $V, $T, { $($bounds)* }, BitXor, bitxor
        );
    };
    (@op { $($gen:tt)* } $V:ty, $T:ty, { $($bounds:tt)* }, $Op:ident, $op:ident) => {
        impl<$($gen)*> std::ops::$Op<$T> for $V
        where
            $($bounds)*
        {
            type Output = $V;
            #[inline(always)]
            fn $op(self, rhs: $T) -> $V {
                let rhs = <$V as $crate::SIMDVector>::splat(
                    $crate::SIMDVector::arch(self),
                    rhs,
                );
                std::ops::$Op::$op(self, rhs)
            }
        }

        impl<$($gen)*> std::ops::$Op<$V> for $T
        where
            $($bounds)*
        {
            type Output = $V;
            #[inline(always)]
            fn $op(self, rhs: $V) -> $V {
                let lhs = <$V as $crate::SIMDVector>::splat(
                    $crate::SIMDVector::arch(rhs),
                    self,
                );
                std::ops::$Op::$op(lhs, rhs)
            }
        }
    };
    (@cmp { $($gen:tt)* } $V:ty, $T:ty, { $($bounds:tt)* }) => {
        impl<$($gen)*> $crate::SIMDPartialEq<$T> for $V
        where
            $($bounds)*
        {
            type Mask = <$V as $crate::SIMDPartialEq>::Mask;

            #[inline(always)]
            fn eq_simd(self, rhs: $T) -> <$V as $crate::SIMDPartialEq>::Mask {
                let rhs = <$V as $crate::SIMDVector>::splat($crate::SIMDVector::arch(self), rhs);
                $crate::SIMDPartialEq::eq_simd(self, rhs)
            }

            #[inline(always)]
            fn ne_simd(self, rhs: $T) -> <$V as $crate::SIMDPartialEq>::Mask {
                let rhs = <$V as $crate::SIMDVector>::splat($crate::SIMDVector::arch(self), rhs);
                $crate::SIMDPartialEq::ne_simd(self, rhs)
            }
        }

        impl<$($gen)*> $crate::SIMDPartialOrd<$T> for $V
        where
            $($bounds)*
        {
            #[inline(always)]
            fn lt_simd(self, rhs: $T) -> <$V as $crate::SIMDPartialEq>::Mask {
                let rhs = <$V as $crate::SIMDVector>::splat($crate::SIMDVector::arch(self), rhs);
                $crate::SIMDPartialOrd::lt_simd(self, rhs)
            }

            #[inline(always)]
            fn le_simd(self, rhs: $T) -> <$V as $crate::SIMDPartialEq>::Mask {
                let rhs = <$V as $crate::SIMDVector>::splat($crate::SIMDVector::arch(self), rhs);
                $crate::SIMDPartialOrd::le_simd(self, rhs)
            }

            #[inline(always)]
            fn gt_simd(self, rhs: $T) -> <$V as $crate::SIMDPartialEq>::Mask {
                let rhs = <$V as $crate::SIMDVector>::splat($crate::SIMDVector::arch(self), rhs);
                $crate::SIMDPartialOrd::gt_simd(self, rhs)
            }

            #[inline(always)]
            fn ge_simd(self, rhs: $T) -> <$V as $crate::SIMDPartialEq>::Mask {
                let rhs = <$V as $crate::SIMDVector>::splat($crate::SIMDVector::arch(self), rhs);
                $crate::SIMDPartialOrd::ge_simd(self, rhs)
            }
        }

        impl<$($gen)*> $crate::SIMDPartialEq<$V> for $T
        where
            $($bounds)*
        {
            type Mask = <$V as $crate::SIMDPartialEq>::Mask;

            #[inline(always)]
            fn eq_simd(self, rhs: $V) -> <$V as $crate::SIMDPartialEq>::Mask {
                let lhs = <$V as $crate::SIMDVector>::splat($crate::SIMDVector::arch(rhs), self);
                $crate::SIMDPartialEq::eq_simd(lhs, rhs)
            }

            #[inline(always)]
            fn ne_simd(self, rhs: $V) -> <$V as $crate::SIMDPartialEq>::Mask {
                let lhs = <$V as $crate::SIMDVector>::splat($crate::SIMDVector::arch(rhs), self);
                $crate::SIMDPartialEq::ne_simd(lhs, rhs)
            }
        }

        impl<$($gen)*> $crate::SIMDPartialOrd<$V> for $T
        where
            $($bounds)*
        {
            #[inline(always)]
            fn lt_simd(self, rhs: $V) -> <$V as $crate::SIMDPartialEq>::Mask {
                let lhs = <$V as $crate::SIMDVector>::splat($crate::SIMDVector::arch(rhs), self);
                $crate::SIMDPartialOrd::lt_simd(lhs, rhs)
            }

            #[inline(always)]
            fn le_simd(self, rhs: $V) -> <$V as $crate::SIMDPartialEq>::Mask {
                let lhs = <$V as $crate::SIMDVector>::splat($crate::SIMDVector::arch(rhs), self);
                $crate::SIMDPartialOrd::le_simd(lhs, rhs)
            }

            #[inline(always)]
            fn gt_simd(self, rhs: $V) -> <$V as $crate::SIMDPartialEq>::Mask {
                let lhs = <$V as $crate::SIMDVector>::splat($crate::SIMDVector::arch(rhs), self);
                $crate::SIMDPartialOrd::gt_simd(lhs, rhs)
            }

            #[inline(always)]
            fn ge_simd(self, rhs: $V) -> <$V as $crate::SIMDPartialEq>::Mask {
                let lhs = <$V as $crate::SIMDVector>::splat($crate::SIMDVector::arch(rhs), self);
                $crate::SIMDPartialOrd::ge_simd(lhs, rhs)
            }
        }
    };
}

pub(crate) use impl_scalar_broadcast;
