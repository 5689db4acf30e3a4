/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Four 32-bit lanes in 128-bit registers.

// x86 intrinsics
use std::arch::x86_64::*;

use super::{Hidden, macros};
use crate::{
    arch::{Align16, Architecture, Isa, Target, Target1, Target2},
    constant::Const,
    lane::Lane,
    ops::{self, LaneMath},
    reference::{ReferenceFloat, ReferenceScalarOps},
    traits::{SIMDPartialEq, SIMDPartialOrd},
};

/// An [`Architecture`] with 4 lanes on 128-bit registers, requiring AVX and SSE 4.1.
///
/// `i32` and `f32` lanes use registers. Every other element type is emulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Avx4(Hidden);

macros::x86_define_arch!(Avx4, "sse4.1,avx", "sse4.1", "avx");

impl Architecture for Avx4 {
    const NAME: &'static str = "avx4";
    const WIDTH: usize = 4;
    const ALIGNMENT: usize = 16;
    const ALLOW_AVX: bool = true;
    const ALLOW_AVX2: bool = false;
    const ALLOW_AVX512: bool = false;
    const MIN_ISA: Isa = Isa::Avx;

    type Lanes = Const<4>;
    type Mask = mask32x4;
    type Align = Align16;

    macros::x86_architecture_methods!();
}

///////////
// Masks //
///////////

macros::x86_define_mask!(
    mask32x4,
    __m128i,
    4,
    Avx4,
    movemask = _mm_movemask_ps(_mm_castsi128_ps),
    setr = _mm_setr_epi32(1, 2, 4, 8),
    set1 = _mm_set1_epi32,
    cmpeq = _mm_cmpeq_epi32,
    and = _mm_and_si128,
    or = _mm_or_si128,
    xor = _mm_xor_si128,
);

///////////
// i32x4 //
///////////

macros::x86_define_register!(i32x4, __m128i, i32, 4, Avx4);
macros::x86_define_splat!(i32x4, i32, _mm_set1_epi32);
macros::x86_define_default!(i32x4, _mm_setzero_si128);

macros::x86_binary_op!(i32x4, Add, add, _mm_add_epi32);
macros::x86_binary_op!(i32x4, Sub, sub, _mm_sub_epi32);
macros::x86_binary_op!(i32x4, Mul, mul, _mm_mullo_epi32);
macros::x86_binary_op!(i32x4, BitAnd, bitand, _mm_and_si128);
macros::x86_binary_op!(i32x4, BitOr, bitor, _mm_or_si128);
macros::x86_binary_op!(i32x4, BitXor, bitxor, _mm_xor_si128);
macros::x86_shift_op!(i32x4, Shl, shl, _mm_sll_epi32);
macros::x86_shift_op!(i32x4, Shr, shr, _mm_sra_epi32);

// No integer division instruction.
impl std::ops::Div for i32x4 {
    type Output = Self;
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        ops::zip_with(self, rhs, i32::expected_div_)
    }
}

impl std::ops::Neg for i32x4 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instruction.
        Self(unsafe { _mm_sub_epi32(_mm_setzero_si128(), self.0) })
    }
}

impl std::ops::Not for i32x4 {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instructions.
        Self(unsafe { _mm_xor_si128(self.0, _mm_set1_epi32(-1)) })
    }
}

impl SIMDPartialEq for i32x4 {
    type Mask = mask32x4;

    #[inline(always)]
    fn eq_simd(self, rhs: Self) -> mask32x4 {
        // SAFETY: The existence of `self` witnesses the instruction.
        mask32x4(unsafe { _mm_cmpeq_epi32(self.0, rhs.0) })
    }

    #[inline(always)]
    fn ne_simd(self, rhs: Self) -> mask32x4 {
        !self.eq_simd(rhs)
    }
}

impl SIMDPartialOrd for i32x4 {
    #[inline(always)]
    fn lt_simd(self, rhs: Self) -> mask32x4 {
        // SAFETY: The existence of `self` witnesses the instruction.
        mask32x4(unsafe { _mm_cmplt_epi32(self.0, rhs.0) })
    }

    #[inline(always)]
    fn le_simd(self, rhs: Self) -> mask32x4 {
        !self.gt_simd(rhs)
    }

    #[inline(always)]
    fn gt_simd(self, rhs: Self) -> mask32x4 {
        // SAFETY: The existence of `self` witnesses the instruction.
        mask32x4(unsafe { _mm_cmpgt_epi32(self.0, rhs.0) })
    }

    #[inline(always)]
    fn ge_simd(self, rhs: Self) -> mask32x4 {
        !self.lt_simd(rhs)
    }
}

ops::impl_scalar_broadcast!({} i32x4, i32 where {}; arith, bits, cmp);
ops::impl_assign_ops!({} i32x4);

///////////
// f32x4 //
///////////

macros::x86_define_register!(f32x4, __m128, f32, 4, Avx4);
macros::x86_define_splat!(f32x4, f32, _mm_set1_ps);
macros::x86_define_default!(f32x4, _mm_setzero_ps);

macros::x86_binary_op!(f32x4, Add, add, _mm_add_ps);
macros::x86_binary_op!(f32x4, Sub, sub, _mm_sub_ps);
macros::x86_binary_op!(f32x4, Mul, mul, _mm_mul_ps);
macros::x86_binary_op!(f32x4, Div, div, _mm_div_ps);

impl std::ops::Neg for f32x4 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instructions.
        Self(unsafe { _mm_xor_ps(self.0, _mm_set1_ps(-0.0)) })
    }
}

macro_rules! f32x4_compare {
    ($name:ident, $predicate:ident) => {
        #[inline(always)]
        fn $name(self, rhs: Self) -> mask32x4 {
            // SAFETY: The existence of `self` witnesses the instructions.
            mask32x4(unsafe { _mm_castps_si128(_mm_cmp_ps::<$predicate>(self.0, rhs.0)) })
        }
    };
}

impl SIMDPartialEq for f32x4 {
    type Mask = mask32x4;
    f32x4_compare!(eq_simd, _CMP_EQ_OQ);
    f32x4_compare!(ne_simd, _CMP_NEQ_UQ);
}

impl SIMDPartialOrd for f32x4 {
    f32x4_compare!(lt_simd, _CMP_LT_OQ);
    f32x4_compare!(le_simd, _CMP_LE_OQ);
    f32x4_compare!(gt_simd, _CMP_GT_OQ);
    f32x4_compare!(ge_simd, _CMP_GE_OQ);
}

impl LaneMath for f32x4 {
    #[inline(always)]
    fn abs(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instructions.
        Self(unsafe { _mm_and_ps(self.0, _mm_castsi128_ps(_mm_set1_epi32(i32::MAX))) })
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instruction.
        Self(unsafe { _mm_sqrt_ps(self.0) })
    }

    #[inline(always)]
    fn floor(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instruction.
        Self(unsafe { _mm_floor_ps(self.0) })
    }

    #[inline(always)]
    fn ceil(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instruction.
        Self(unsafe { _mm_ceil_ps(self.0) })
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        ops::zip_with(self, rhs, f32::expected_min_)
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        ops::zip_with(self, rhs, f32::expected_max_)
    }

    // FMA is not part of this feature set.
    #[inline(always)]
    fn mul_add(self, rhs: Self, acc: Self) -> Self {
        ops::zip3_with(self, rhs, acc, f32::expected_fma_)
    }

    ops::impl_lane_math_by_lane!(elementary);
}

ops::impl_scalar_broadcast!({} f32x4, f32 where {}; arith, cmp);
ops::impl_assign_ops!({} f32x4);

///////////
// Lanes //
///////////

impl Lane<Avx4> for i32 {
    type Vector = i32x4;
}

impl Lane<Avx4> for f32 {
    type Vector = f32x4;
}

crate::lane::emulated_lanes!(
    Avx4, 4; u8, u16, u32, u64, usize, i8, i16, i64, isize, half::f16, f64
);

crate::loader::default_loader!(
    Avx4; u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, half::f16, f32, f64
);

///////////
// Tests //
///////////
