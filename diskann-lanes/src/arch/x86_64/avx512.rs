/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

// x86 intrinsics
use std::arch::x86_64::*;

use super::{Hidden, macros};
use crate::{
    arch::{Align64, Architecture, Isa, Target, Target1, Target2},
    bitmask::BitMask,
    constant::Const,
    lane::Lane,
    ops::{self, LaneMath},
    reference::{ReferenceFloat, ReferenceScalarOps},
    traits::{SIMDMask, SIMDPartialEq, SIMDPartialOrd, SIMDVector},
};

/// An [`Architecture`] with 16 lanes on 512-bit registers, requiring AVX-512F.
///
/// Masks are packed into a 16-bit integer, matching the predicate registers of the
/// instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Avx512x16(Hidden);

macros::x86_define_arch!(
    Avx512x16,
    "avx512f,avx2,avx,fma,sse4.1",
    "avx512f",
    "avx2",
    "avx",
    "fma",
    "sse4.1"
);

impl Architecture for Avx512x16 {
    const NAME: &'static str = "avx512x16";
    const WIDTH: usize = 16;
    const ALIGNMENT: usize = 64;
    const ALLOW_AVX: bool = true;
    const ALLOW_AVX2: bool = true;
    const ALLOW_AVX512: bool = true;
    const MIN_ISA: Isa = Isa::Avx512;

    type Lanes = Const<16>;
    type Mask = mask16;
    type Align = Align64;

    macros::x86_architecture_methods!();
}

/// The mask of [`Avx512x16`].
#[allow(non_camel_case_types)]
pub type mask16 = BitMask<16, Avx512x16>;

#[inline(always)]
fn to_mask(arch: Avx512x16, bits: __mmask16) -> mask16 {
    mask16::from_underlying(arch, bits)
}

////////////
// i32x16 //
////////////

macros::x86_define_register!(i32x16, __m512i, i32, 16, Avx512x16);
macros::x86_define_splat!(i32x16, i32, _mm512_set1_epi32);
macros::x86_define_default!(i32x16, _mm512_setzero_si512);

macros::x86_binary_op!(i32x16, Add, add, _mm512_add_epi32);
macros::x86_binary_op!(i32x16, Sub, sub, _mm512_sub_epi32);
macros::x86_binary_op!(i32x16, Mul, mul, _mm512_mullo_epi32);
macros::x86_binary_op!(i32x16, BitAnd, bitand, _mm512_and_si512);
macros::x86_binary_op!(i32x16, BitOr, bitor, _mm512_or_si512);
macros::x86_binary_op!(i32x16, BitXor, bitxor, _mm512_xor_si512);
macros::x86_shift_op!(i32x16, Shl, shl, _mm512_sll_epi32);
macros::x86_shift_op!(i32x16, Shr, shr, _mm512_sra_epi32);

impl std::ops::Div for i32x16 {
    type Output = Self;
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        ops::zip_with(self, rhs, i32::expected_div_)
    }
}

impl std::ops::Neg for i32x16 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instructions.
        Self(unsafe { _mm512_sub_epi32(_mm512_setzero_si512(), self.0) })
    }
}

impl std::ops::Not for i32x16 {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instructions.
        Self(unsafe { _mm512_xor_si512(self.0, _mm512_set1_epi32(-1)) })
    }
}

macro_rules! i32x16_compare {
    ($name:ident, $intrinsic:ident) => {
        #[inline(always)]
        fn $name(self, rhs: Self) -> mask16 {
            // SAFETY: The existence of `self` witnesses the instruction.
            to_mask(self.arch(), unsafe { $intrinsic(self.0, rhs.0) })
        }
    };
}

impl SIMDPartialEq for i32x16 {
    type Mask = mask16;
    i32x16_compare!(eq_simd, _mm512_cmpeq_epi32_mask);
    i32x16_compare!(ne_simd, _mm512_cmpneq_epi32_mask);
}

impl SIMDPartialOrd for i32x16 {
    i32x16_compare!(lt_simd, _mm512_cmplt_epi32_mask);
    i32x16_compare!(le_simd, _mm512_cmple_epi32_mask);
    i32x16_compare!(gt_simd, _mm512_cmpgt_epi32_mask);
    i32x16_compare!(ge_simd, _mm512_cmpge_epi32_mask);
}

ops::impl_scalar_broadcast!({} i32x16, i32 where {}; arith, bits, cmp);
ops::impl_assign_ops!({} i32x16);

////////////
// f32x16 //
////////////

macros::x86_define_register!(f32x16, __m512, f32, 16, Avx512x16);
macros::x86_define_splat!(f32x16, f32, _mm512_set1_ps);
macros::x86_define_default!(f32x16, _mm512_setzero_ps);

macros::x86_binary_op!(f32x16, Add, add, _mm512_add_ps);
macros::x86_binary_op!(f32x16, Sub, sub, _mm512_sub_ps);
macros::x86_binary_op!(f32x16, Mul, mul, _mm512_mul_ps);
macros::x86_binary_op!(f32x16, Div, div, _mm512_div_ps);

// The floating point logical instructions need AVX-512DQ, so sign manipulation goes
// through the integer domain.
impl std::ops::Neg for f32x16 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instructions.
        Self(unsafe {
            _mm512_castsi512_ps(_mm512_xor_si512(
                _mm512_castps_si512(self.0),
                _mm512_set1_epi32(i32::MIN),
            ))
        })
    }
}

macro_rules! f32x16_compare {
    ($name:ident, $predicate:ident) => {
        #[inline(always)]
        fn $name(self, rhs: Self) -> mask16 {
            // SAFETY: The existence of `self` witnesses the instruction.
            to_mask(self.arch(), unsafe {
                _mm512_cmp_ps_mask::<$predicate>(self.0, rhs.0)
            })
        }
    };
}

impl SIMDPartialEq for f32x16 {
    type Mask = mask16;
    f32x16_compare!(eq_simd, _CMP_EQ_OQ);
    f32x16_compare!(ne_simd, _CMP_NEQ_UQ);
}

impl SIMDPartialOrd for f32x16 {
    f32x16_compare!(lt_simd, _CMP_LT_OQ);
    f32x16_compare!(le_simd, _CMP_LE_OQ);
    f32x16_compare!(gt_simd, _CMP_GT_OQ);
    f32x16_compare!(ge_simd, _CMP_GE_OQ);
}

impl LaneMath for f32x16 {
    #[inline(always)]
    fn abs(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instructions.
        Self(unsafe {
            _mm512_castsi512_ps(_mm512_and_si512(
                _mm512_castps_si512(self.0),
                _mm512_set1_epi32(i32::MAX),
            ))
        })
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instruction.
        Self(unsafe { _mm512_sqrt_ps(self.0) })
    }

    // Round toward negative infinity and suppress exceptions.
    #[inline(always)]
    fn floor(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instruction.
        Self(unsafe { _mm512_roundscale_ps::<0x09>(self.0) })
    }

    // Round toward positive infinity and suppress exceptions.
    #[inline(always)]
    fn ceil(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instruction.
        Self(unsafe { _mm512_roundscale_ps::<0x0A>(self.0) })
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        ops::zip_with(self, rhs, f32::expected_min_)
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        ops::zip_with(self, rhs, f32::expected_max_)
    }

    #[inline(always)]
    fn mul_add(self, rhs: Self, acc: Self) -> Self {
        // SAFETY: The existence of `self` witnesses the instruction.
        Self(unsafe { _mm512_fmadd_ps(self.0, rhs.0, acc.0) })
    }

    ops::impl_lane_math_by_lane!(elementary);
}

ops::impl_scalar_broadcast!({} f32x16, f32 where {}; arith, cmp);
ops::impl_assign_ops!({} f32x16);

///////////
// Lanes //
///////////

impl Lane<Avx512x16> for i32 {
    type Vector = i32x16;
}

impl Lane<Avx512x16> for f32 {
    type Vector = f32x16;
}

crate::lane::emulated_lanes!(
    Avx512x16, 16; u8, u16, u32, u64, usize, i8, i16, i64, isize, half::f16, f64
);

crate::loader::default_loader!(
    Avx512x16; u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, half::f16, f32, f64
);

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::test_utils::{self, loader::check_loader};

    fn arch() -> Option<Avx512x16> {
        Avx512x16::new_checked_uncached()
    }

    #[test]
    fn test_i32x16_ops() {
        let Some(arch) = arch() else { return };
        let mut rng = StdRng::seed_from_u64(0x3141_5926_5358_9793);
        test_utils::check_ops!(i32x16, arch, &mut rng; arith, bits, shifts, neg);
        test_utils::check_comparisons::<i32x16>(arch, &mut rng);
    }

    #[test]
    fn test_f32x16_ops() {
        let Some(arch) = arch() else { return };
        let mut rng = StdRng::seed_from_u64(0x2718_2818_2845_9045);
        test_utils::check_ops!(f32x16, arch, &mut rng; arith, neg);
        test_utils::check_comparisons::<f32x16>(arch, &mut rng);
    }

    #[test]
    fn test_mask16() {
        let Some(arch) = arch() else { return };
        let mut rng = StdRng::seed_from_u64(0x1414_2135_6237_3095);
        test_utils::check_mask::<mask16>(arch, &mut rng);

        let x = i32x16::from_fn(arch, |i| i as i32);
        let m = x.lt_simd(5);
        assert_eq!(m.to_underlying(), 0b1_1111);
        assert_eq!(m.count(), 5);
        assert_eq!(m.first(), Some(0));
        assert!(x.ge_simd(16).none());
    }

    #[test]
    fn test_f32x16_math() {
        let Some(arch) = arch() else { return };
        let x = f32x16::from_fn(arch, |i| i as f32 - 7.5);
        assert_eq!(x.abs().get(0), 7.5);
        assert_eq!(x.abs().get(15), 7.5);
        assert_eq!((-x).get(3), 4.5);
        assert_eq!(x.floor().get(0), -8.0);
        assert_eq!(x.ceil().get(0), -7.0);
        assert_eq!(x.floor().get(8), 0.0);
        assert_eq!(x.ceil().get(8), 1.0);
        assert_eq!(f32x16::splat(arch, 16.0).sqrt().get(9), 4.0);
        assert_eq!(
            x.mul_add(f32x16::splat(arch, 2.0), f32x16::splat(arch, 15.0)).get(1),
            2.0
        );
    }

    #[test]
    fn test_loaders() {
        let Some(arch) = arch() else { return };
        let mut rng = StdRng::seed_from_u64(0xabad_1dea_0000_1111);
        check_loader::<i32, _>(arch, &mut rng);
        check_loader::<f32, _>(arch, &mut rng);
        check_loader::<i8, _>(arch, &mut rng);
        check_loader::<bool, _>(arch, &mut rng);
    }
}
