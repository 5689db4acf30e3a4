/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use crate::{
    arch::Architecture,
    constant::Const,
    ops,
    reference::{ReferenceFloat, ReferenceNeg, ReferenceScalarOps, ReferenceShifts},
    traits::{Element, SIMDPartialEq, SIMDPartialOrd, SIMDVector},
};

/// A lane vector backed by a plain array.
///
/// This is the generic form of a lane vector: every operation runs as a scalar loop over
/// the lanes and relies on the compiler for any vectorization. It is used by the
/// [`crate::arch::Generic`] architectures for every element type, and by the hardware
/// architectures for element types without a register specialization.
///
/// The architecture `A` must have exactly `N` lanes.
#[derive(Debug, Clone, Copy)]
pub struct Emulated<T, const N: usize, A>(pub(crate) [T; N], A);

impl<T, const N: usize, A> Emulated<T, N, A> {
    /// Construct from the underlying array.
    #[inline(always)]
    pub fn from_underlying(arch: A, array: [T; N]) -> Self {
        Self(array, arch)
    }

    /// Return the underlying array.
    #[inline(always)]
    pub fn to_underlying(self) -> [T; N] {
        self.0
    }

    /// Borrow the lanes as a slice.
    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    /// Mutably borrow the lanes as a slice.
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.0
    }
}

impl<T, const N: usize, A> SIMDVector for Emulated<T, N, A>
where
    T: Element,
    A: Architecture<Lanes = Const<N>>,
{
    type Arch = A;
    type Scalar = T;
    const LANES: usize = N;
    const EMULATED: bool = true;

    #[inline(always)]
    fn arch(self) -> A {
        self.1
    }

    #[inline(always)]
    fn default(arch: A) -> Self {
        Self([T::zero(); N], arch)
    }

    #[inline(always)]
    fn splat(arch: A, value: T) -> Self {
        Self([value; N], arch)
    }

    #[inline(always)]
    fn from_fn<F>(arch: A, f: F) -> Self
    where
        F: FnMut(usize) -> T,
    {
        const { assert!(N == A::WIDTH, "emulated width must match the architecture") };
        Self(core::array::from_fn(f), arch)
    }

    #[inline(always)]
    fn get(&self, i: usize) -> T {
        debug_assert!(i < N, "lane {} out of bounds for width {}", i, N);
        self.0[i]
    }

    #[inline(always)]
    fn put(&mut self, i: usize, value: T) {
        debug_assert!(i < N, "lane {} out of bounds for width {}", i, N);
        self.0[i] = value;
    }

    #[inline(always)]
    fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.0, &mut other.0)
    }
}

impl<T, const N: usize, A> PartialEq for Emulated<T, N, A>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

////////////////
// Binary Ops //
////////////////

macro_rules! emulated_binary_op {
    ($Op:ident, $op:ident, $bound:path, $kernel:expr) => {
        impl<T, const N: usize, A> std::ops::$Op for Emulated<T, N, A>
        where
            T: Element + $bound,
            A: Architecture<Lanes = Const<N>>,
        {
            type Output = Self;
            #[inline(always)]
            fn $op(self, rhs: Self) -> Self {
                ops::zip_with(self, rhs, $kernel)
            }
        }
    };
}

emulated_binary_op!(Add, add, ReferenceScalarOps, T::expected_add_);
emulated_binary_op!(Sub, sub, ReferenceScalarOps, T::expected_sub_);
emulated_binary_op!(Mul, mul, ReferenceScalarOps, T::expected_mul_);
emulated_binary_op!(Div, div, ReferenceScalarOps, T::expected_div_);

emulated_binary_op!(BitAnd, bitand, std::ops::BitAnd<Output = T>, |x: T, y: T| x & y);
emulated_binary_op!(BitOr, bitor, std::ops::BitOr<Output = T>, |x: T, y: T| x | y);
emulated_binary_op!(BitXor, bitxor, std::ops::BitXor<Output = T>, |x: T, y: T| x ^ y);

impl<T, const N: usize, A> std::ops::Neg for Emulated<T, N, A>
where
    T: Element + ReferenceNeg,
    A: Architecture<Lanes = Const<N>>,
{
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        ops::map(self, T::expected_neg_)
    }
}

impl<T, const N: usize, A> std::ops::Not for Emulated<T, N, A>
where
    T: Element + std::ops::Not<Output = T>,
    A: Architecture<Lanes = Const<N>>,
{
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        ops::map(self, |x| !x)
    }
}

impl<T, const N: usize, A> std::ops::Shl<u32> for Emulated<T, N, A>
where
    T: Element + ReferenceShifts,
    A: Architecture<Lanes = Const<N>>,
{
    type Output = Self;
    #[inline(always)]
    fn shl(self, rhs: u32) -> Self {
        ops::map(self, |x| x.expected_shl_(rhs))
    }
}

impl<T, const N: usize, A> std::ops::Shr<u32> for Emulated<T, N, A>
where
    T: Element + ReferenceShifts,
    A: Architecture<Lanes = Const<N>>,
{
    type Output = Self;
    #[inline(always)]
    fn shr(self, rhs: u32) -> Self {
        ops::map(self, |x| x.expected_shr_(rhs))
    }
}

ops::impl_assign_ops!({ T, const N: usize, A } Emulated<T, N, A>);

/////////////////
// Comparisons //
/////////////////

impl<T, const N: usize, A> SIMDPartialEq for Emulated<T, N, A>
where
    T: Element + PartialEq,
    A: Architecture<Lanes = Const<N>>,
{
    type Mask = A::Mask;

    #[inline(always)]
    fn eq_simd(self, rhs: Self) -> A::Mask {
        ops::compare(self, rhs, |x, y| x == y)
    }

    #[inline(always)]
    fn ne_simd(self, rhs: Self) -> A::Mask {
        ops::compare(self, rhs, |x, y| x != y)
    }
}

impl<T, const N: usize, A> SIMDPartialOrd for Emulated<T, N, A>
where
    T: Element + PartialOrd,
    A: Architecture<Lanes = Const<N>>,
{
    #[inline(always)]
    fn lt_simd(self, rhs: Self) -> A::Mask {
        ops::compare(self, rhs, |x, y| x < y)
    }

    #[inline(always)]
    fn le_simd(self, rhs: Self) -> A::Mask {
        ops::compare(self, rhs, |x, y| x <= y)
    }

    #[inline(always)]
    fn gt_simd(self, rhs: Self) -> A::Mask {
        ops::compare(self, rhs, |x, y| x > y)
    }

    #[inline(always)]
    fn ge_simd(self, rhs: Self) -> A::Mask {
        ops::compare(self, rhs, |x, y| x >= y)
    }
}

//////////
// Math //
//////////

impl<T, const N: usize, A> ops::LaneMath for Emulated<T, N, A>
where
    T: Element + ReferenceFloat,
    A: Architecture<Lanes = Const<N>>,
{
    ops::impl_lane_math_by_lane!();
}

///////////////////////
// Scalar Broadcasts //
///////////////////////

macro_rules! emulated_broadcast {
    ($cats:tt => $($T:ty),+ $(,)?) => {
        $(emulated_broadcast!(@one $cats $T);)+
    };
    (@one [$($cat:ident),+] $T:ty) => {
        ops::impl_scalar_broadcast!(
            { const N: usize, A } Emulated<$T, N, A>, $T
            where { A: Architecture<Lanes = Const<N>> };
            $($cat),+
        );
    };
}

emulated_broadcast!([arith, bits, cmp] => u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
emulated_broadcast!([arith, cmp] => f32, f64);

///////////
// Tests //
///////////
