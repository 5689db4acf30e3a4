/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Eight 32-bit lanes in 256-bit registers, with hardware gathers.

// x86 intrinsics
use std::arch::x86_64::*;

use super::{Hidden, macros};
use crate::{
    arch::{Align32, Architecture, Isa, Target, Target1, Target2},
    constant::Const,
    lane::{Lane, LaneVector},
    loader::Loader,
    ops::{self, LaneMath},
    pointer::Pointers,
    reference::{ReferenceFloat, ReferenceScalarOps},
    traits::{SIMDPartialEq, SIMDPartialOrd},
};

/// An [`Architecture`] with 8 lanes on 256-bit registers, requiring AVX 2 and FMA.
///
/// `i32` and `f32` lanes use registers and gather instructions. Every other element type
/// is emulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Avx2x8(Hidden);

macros::x86_define_arch!(Avx2x8, "avx,avx2,fma", "avx", "avx2", "fma");

impl Architecture for Avx2x8 {
    const NAME: &'static str = "avx2x8";
    const WIDTH: usize = 8;
    const ALIGNMENT: usize = 32;
    const ALLOW_AVX: bool = true;
    const ALLOW_AVX2: bool = true;
    const ALLOW_AVX512: bool = false;
    const MIN_ISA: Isa = Isa::Avx2;

    type Lanes = Const<8>;
    type Mask = mask32x8;
    type Align = Align32;

    macros::x86_architecture_methods!();
}

///////////
// Masks //
///////////

macros::x86_define_mask!(
    mask32x8,
    __m256i,
    8,
    Avx2x8,
    movemask = _mm256_movemask_ps(_mm256_castsi256_ps),
    setr = _mm256_setr_epi32(1, 2, 4, 8, 16, 32, 64, 128),
    set1 = _mm256_set1_epi32,
    cmpeq = _mm256_cmpeq_epi32,
    and = _mm256_and_si256,
    or = _mm256_or_si256,
    xor = _mm256_xor_si256,
);

///////////
// i32x8 //
///////////

macros::x86_define_register!(i32x8, __m256i, i32, 8, Avx2x8);
macros::x86_define_splat!(i32x8, i32, _mm256_set1_epi32);
macros::x86_define_default!(i32x8, _mm256_setzero_si256);

macros::x86_binary_op!(i32x8, Add, add, _mm256_add_epi32);
macros::x86_binary_op!(i32x8, Sub, sub, _mm256_sub_epi32);
macros::x86_binary_op!(i32x8, Mul, mul, _mm256_mullo_epi32);
macros::x86_binary_op!(i32x8, BitAnd, bitand, _mm256_and_si256);
macros::x86_binary_op!(i32x8, BitOr, bitor, _mm256_or_si256);
macros::x86_binary_op!(i32x8, BitXor, bitxor, _mm256_xor_si256);
macros::x86_shift_op!(i32x8, Shl, shl, _mm256_sll_epi32);
macros::x86_shift_op!(i32x8, Shr, shr, _mm256_sra_epi32);

// No integer division instruction.
impl std::ops::Div for i32x8 {
    type Output = Self;
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        ops::zip_with(self, rhs, i32::expected_div_)
    }
}

impl std::ops::Neg for i32x8 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instruction.
        Self(unsafe { _mm256_sub_epi32(_mm256_setzero_si256(), self.0) })
    }
}

impl std::ops::Not for i32x8 {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instructions.
        Self(unsafe { _mm256_xor_si256(self.0, _mm256_set1_epi32(-1)) })
    }
}

impl SIMDPartialEq for i32x8 {
    type Mask = mask32x8;

    #[inline(always)]
    fn eq_simd(self, rhs: Self) -> mask32x8 {
        // SAFETY: The existence of `self` witnesses the instruction.
        mask32x8(unsafe { _mm256_cmpeq_epi32(self.0, rhs.0) })
    }

    #[inline(always)]
    fn ne_simd(self, rhs: Self) -> mask32x8 {
        !self.eq_simd(rhs)
    }
}

impl SIMDPartialOrd for i32x8 {
    #[inline(always)]
    fn lt_simd(self, rhs: Self) -> mask32x8 {
        rhs.gt_simd(self)
    }

    #[inline(always)]
    fn le_simd(self, rhs: Self) -> mask32x8 {
        !self.gt_simd(rhs)
    }

    #[inline(always)]
    fn gt_simd(self, rhs: Self) -> mask32x8 {
        // SAFETY: The existence of `self` witnesses the instruction.
        mask32x8(unsafe { _mm256_cmpgt_epi32(self.0, rhs.0) })
    }

    #[inline(always)]
    fn ge_simd(self, rhs: Self) -> mask32x8 {
        !self.lt_simd(rhs)
    }
}

ops::impl_scalar_broadcast!({} i32x8, i32 where {}; arith, bits, cmp);
ops::impl_assign_ops!({} i32x8);

///////////
// f32x8 //
///////////

macros::x86_define_register!(f32x8, __m256, f32, 8, Avx2x8);
macros::x86_define_splat!(f32x8, f32, _mm256_set1_ps);
macros::x86_define_default!(f32x8, _mm256_setzero_ps);

macros::x86_binary_op!(f32x8, Add, add, _mm256_add_ps);
macros::x86_binary_op!(f32x8, Sub, sub, _mm256_sub_ps);
macros::x86_binary_op!(f32x8, Mul, mul, _mm256_mul_ps);
macros::x86_binary_op!(f32x8, Div, div, _mm256_div_ps);

impl std::ops::Neg for f32x8 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instructions.
        Self(unsafe { _mm256_xor_ps(self.0, _mm256_set1_ps(-0.0)) })
    }
}

macro_rules! f32x8_compare {
    ($name:ident, $predicate:ident) => {
        #[inline(always)]
        fn $name(self, rhs: Self) -> mask32x8 {
            // SAFETY: The existence of `self` witnesses the instructions.
            mask32x8(unsafe { _mm256_castps_si256(_mm256_cmp_ps::<$predicate>(self.0, rhs.0)) })
        }
    };
}

impl SIMDPartialEq for f32x8 {
    type Mask = mask32x8;
    f32x8_compare!(eq_simd, _CMP_EQ_OQ);
    f32x8_compare!(ne_simd, _CMP_NEQ_UQ);
}

impl SIMDPartialOrd for f32x8 {
    f32x8_compare!(lt_simd, _CMP_LT_OQ);
    f32x8_compare!(le_simd, _CMP_LE_OQ);
    f32x8_compare!(gt_simd, _CMP_GT_OQ);
    f32x8_compare!(ge_simd, _CMP_GE_OQ);
}

impl LaneMath for f32x8 {
    #[inline(always)]
    fn abs(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instructions.
        Self(unsafe { _mm256_and_ps(self.0, _mm256_castsi256_ps(_mm256_set1_epi32(i32::MAX))) })
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instruction.
        Self(unsafe { _mm256_sqrt_ps(self.0) })
    }

    #[inline(always)]
    fn floor(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instruction.
        Self(unsafe { _mm256_floor_ps(self.0) })
    }

    #[inline(always)]
    fn ceil(self) -> Self {
        // SAFETY: The existence of `self` witnesses the instruction.
        Self(unsafe { _mm256_ceil_ps(self.0) })
    }

    // `_mm256_min_ps` returns the second operand when either is NaN, which differs from
    // `f32::min`.
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
        Self(unsafe { _mm256_fmadd_ps(self.0, rhs.0, acc.0) })
    }

    ops::impl_lane_math_by_lane!(elementary);
}

ops::impl_scalar_broadcast!({} f32x8, f32 where {}; arith, cmp);
ops::impl_assign_ops!({} f32x8);

/////////////
// Gathers //
/////////////

// The 64-bit indexed gathers read 4 lanes per instruction, so each 8 lane gather is
// split in two. Lanes 0-3 come from the first 4 addresses and lanes 4-7 from the last 4.
//
// Every address is passed as a byte offset from a null base.

/// Load the addresses of `src` as two registers of four 64-bit offsets.
#[inline(always)]
fn gather_offsets<T>(src: &Pointers<T, Avx2x8>) -> (__m256i, __m256i) {
    let ptr = src.as_ptr().cast::<__m256i>();
    // SAFETY: `Pointers` holds 8 contiguous 64-bit addresses, which is exactly two
    // registers. The presence of `Avx2x8` witnesses the instruction.
    unsafe { (_mm256_loadu_si256(ptr), _mm256_loadu_si256(ptr.add(1))) }
}

impl Loader<Avx2x8> for i32 {
    #[inline(always)]
    unsafe fn load(dst: &mut LaneVector<i32, Avx2x8>, src: Pointers<i32, Avx2x8>) {
        let (lo, hi) = gather_offsets(&src);
        // SAFETY: The caller asserts every lane is valid for reads. The presence of
        // `Avx2x8` witnesses the instructions.
        dst.0 = unsafe {
            _mm256_set_m128i(
                _mm256_i64gather_epi32::<1>(std::ptr::null(), hi),
                _mm256_i64gather_epi32::<1>(std::ptr::null(), lo),
            )
        };
    }

    #[inline(always)]
    unsafe fn load_masked(
        dst: &mut LaneVector<i32, Avx2x8>,
        src: Pointers<i32, Avx2x8>,
        mask: mask32x8,
    ) {
        let (lo, hi) = gather_offsets(&src);
        // SAFETY: The caller asserts every active lane is valid for reads. Inactive lanes
        // are not accessed. The presence of `Avx2x8` witnesses the instructions.
        dst.0 = unsafe {
            let m = mask.0;
            let d = dst.0;
            _mm256_set_m128i(
                _mm256_mask_i64gather_epi32::<1>(
                    _mm256_extracti128_si256::<1>(d),
                    std::ptr::null(),
                    hi,
                    _mm256_extracti128_si256::<1>(m),
                ),
                _mm256_mask_i64gather_epi32::<1>(
                    _mm256_castsi256_si128(d),
                    std::ptr::null(),
                    lo,
                    _mm256_castsi256_si128(m),
                ),
            )
        };
    }
}

impl Loader<Avx2x8> for f32 {
    #[inline(always)]
    unsafe fn load(dst: &mut LaneVector<f32, Avx2x8>, src: Pointers<f32, Avx2x8>) {
        let (lo, hi) = gather_offsets(&src);
        // SAFETY: The caller asserts every lane is valid for reads. The presence of
        // `Avx2x8` witnesses the instructions.
        dst.0 = unsafe {
            _mm256_set_m128(
                _mm256_i64gather_ps::<1>(std::ptr::null(), hi),
                _mm256_i64gather_ps::<1>(std::ptr::null(), lo),
            )
        };
    }

    #[inline(always)]
    unsafe fn load_masked(
        dst: &mut LaneVector<f32, Avx2x8>,
        src: Pointers<f32, Avx2x8>,
        mask: mask32x8,
    ) {
        let (lo, hi) = gather_offsets(&src);
        // SAFETY: The caller asserts every active lane is valid for reads. Inactive lanes
        // are not accessed. The presence of `Avx2x8` witnesses the instructions.
        dst.0 = unsafe {
            let m = _mm256_castsi256_ps(mask.0);
            let d = dst.0;
            _mm256_set_m128(
                _mm256_mask_i64gather_ps::<1>(
                    _mm256_extractf128_ps::<1>(d),
                    std::ptr::null(),
                    hi,
                    _mm256_extractf128_ps::<1>(m),
                ),
                _mm256_mask_i64gather_ps::<1>(
                    _mm256_castps256_ps128(d),
                    std::ptr::null(),
                    lo,
                    _mm256_castps256_ps128(m),
                ),
            )
        };
    }
}

///////////
// Lanes //
///////////

impl Lane<Avx2x8> for i32 {
    type Vector = i32x8;
}

impl Lane<Avx2x8> for f32 {
    type Vector = f32x8;
}

crate::lane::emulated_lanes!(
    Avx2x8, 8; u8, u16, u32, u64, usize, i8, i16, i64, isize, half::f16, f64
);

crate::loader::default_loader!(
    Avx2x8; u8, u16, u32, u64, usize, i8, i16, i64, isize, half::f16, f64
);

///////////
// Tests //
///////////

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{
        loader::by_lane,
        test_utils::{self, loader::check_loader},
        traits::{SIMDMask, SIMDVector},
    };

    fn arch() -> Option<Avx2x8> {
        Avx2x8::new_checked_uncached()
    }

    #[test]
    fn test_i32x8_ops() {
        let Some(arch) = arch() else { return };
        let mut rng = StdRng::seed_from_u64(0x7a3c_51e2_90d4_b86f);
        test_utils::check_ops!(i32x8, arch, &mut rng; arith, bits, shifts, neg);
        test_utils::check_comparisons::<i32x8>(arch, &mut rng);
    }

    #[test]
    fn test_f32x8_ops() {
        let Some(arch) = arch() else { return };
        let mut rng = StdRng::seed_from_u64(0x0c1d_2e3f_4051_6273);
        test_utils::check_ops!(f32x8, arch, &mut rng; arith, neg);
        test_utils::check_comparisons::<f32x8>(arch, &mut rng);
    }

    #[test]
    fn test_scalar_broadcast() {
        let Some(arch) = arch() else { return };
        let x = i32x8::from_fn(arch, |i| i as i32);
        assert_eq!((x + 1).to_array(), [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!((3i32 * x).to_array(), [0, 3, 6, 9, 12, 15, 18, 21]);
        assert_eq!((x ^ 1).to_array(), [1, 0, 3, 2, 5, 4, 7, 6]);
        assert_eq!(x.lt_simd(2).movemask(), 0b11);
        assert_eq!(5i32.le_simd(x).movemask(), 0b1110_0000);

        let y = f32x8::splat(arch, 2.0);
        assert_eq!((y / 4.0).to_array(), [0.5; 8]);
        assert_eq!(1.0f32.lt_simd(y).movemask(), 0xff);
        assert_eq!(y.ne_simd(2.0).movemask(), 0);
    }

    #[test]
    fn test_mask32x8() {
        let Some(arch) = arch() else { return };
        let mut rng = StdRng::seed_from_u64(0x8899_aabb_ccdd_eeff);
        test_utils::check_mask::<mask32x8>(arch, &mut rng);
        assert_eq!(mask32x8::keep_first(arch, 3).movemask(), 0b111);
        assert_eq!(mask32x8::keep_first(arch, 9).movemask(), 0xff);
    }

    #[test]
    fn test_f32x8_math() {
        let Some(arch) = arch() else { return };
        let x = f32x8::from_array(arch, [-1.5, 4.0, 0.25, -0.0, 9.0, -2.5, 2.5, 1.0]);
        assert_eq!(x.abs().to_array(), [1.5, 4.0, 0.25, 0.0, 9.0, 2.5, 2.5, 1.0]);
        assert_eq!(x.abs().sqrt().get(4), 3.0);
        assert_eq!(x.floor().to_array(), [-2.0, 4.0, 0.0, -0.0, 9.0, -3.0, 2.0, 1.0]);
        assert_eq!(x.ceil().to_array(), [-1.0, 4.0, 1.0, -0.0, 9.0, -2.0, 3.0, 1.0]);
        assert_eq!(x.trunc().to_array(), [-1.0, 4.0, 0.0, -0.0, 9.0, -2.0, 2.0, 1.0]);
        assert_eq!(x.round_ties_even().get(6), 2.0);
        assert_eq!(x.abs().cbrt().get(4), 9.0f32.cbrt());

        let y = f32x8::splat(arch, f32::NAN);
        assert_eq!(x.min(y).to_array(), x.to_array());
        assert_eq!(x.max(y).to_array(), x.to_array());

        let a = f32x8::splat(arch, 1.0 + f32::EPSILON);
        let b = f32x8::splat(arch, 1.0 - f32::EPSILON);
        let c = f32x8::splat(arch, -1.0);
        let expected = (1.0 + f32::EPSILON).mul_add(1.0 - f32::EPSILON, -1.0);
        assert!(a.mul_add(b, c).lanes().all(|v| v == expected));
    }

    // The two halves of the split gather must land in the same lanes as the per-lane
    // loads.
    #[test]
    fn test_gather_lane_order() {
        let Some(arch) = arch() else { return };
        let mut data: Vec<i32> = (0..16).map(|i| 100 * i).collect();
        let src = Pointers::from_slice(arch, &mut data, |i| 15 - 2 * i);

        let mut expected = <LaneVector<i32, Avx2x8>>::default(arch);
        let mut got = expected;
        // SAFETY: Every lane addresses `data`.
        unsafe {
            by_lane::load(&mut expected, src);
            <i32 as Loader<Avx2x8>>::load(&mut got, src);
        }
        assert_eq!(got.to_array(), [1500, 1300, 1100, 900, 700, 500, 300, 100]);
        assert_eq!(got, expected);

        let mask = mask32x8::from_movemask(arch, 0b1001_0110);
        let mut got = i32x8::splat(arch, -1);
        // SAFETY: Every lane addresses `data`.
        unsafe { <i32 as Loader<Avx2x8>>::load_masked(&mut got, src, mask) };
        assert_eq!(got.to_array(), [-1, 1300, 1100, -1, 700, -1, -1, 100]);
    }

    #[test]
    fn test_masked_gather_skips_null() {
        let Some(arch) = arch() else { return };
        let mut data = [1.0f32, 2.0, 3.0];
        let mut src = Pointers::from_slice(arch, &mut data, |i| i % 3);
        src.put(1, std::ptr::null_mut());
        src.put(6, std::ptr::null_mut());

        let mask = !src.is_null();
        let mut got = f32x8::splat(arch, 0.5);
        // SAFETY: Every active lane addresses `data`.
        unsafe { <f32 as Loader<Avx2x8>>::load_masked(&mut got, src, mask) };
        assert_eq!(got.to_array(), [1.0, 0.5, 3.0, 1.0, 2.0, 3.0, 0.5, 2.0]);
    }

    #[test]
    fn test_loaders() {
        let Some(arch) = arch() else { return };
        let mut rng = StdRng::seed_from_u64(0xfeed_face_cafe_beef);
        check_loader::<i32, _>(arch, &mut rng);
        check_loader::<f32, _>(arch, &mut rng);
        check_loader::<u64, _>(arch, &mut rng);
        check_loader::<f64, _>(arch, &mut rng);
        check_loader::<bool, _>(arch, &mut rng);
        check_loader::<half::f16, _>(arch, &mut rng);
    }
}
