/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! # Struct-of-Arrays Vectors
//!
//! Aggregates are vectorized one field at a time: a lane vector of `(T0, T1)` holds one
//! lane vector of `T0` and one of `T1`. Lane access, construction and the operators all
//! recurse into the fields.
//!
//! * [`Pair`]: pairs, with fields `first` and `second`.
//! * [`Tuple3`] and [`Tuple4`]: wider tuples, with positional fields.
//! * [`ComplexLanes`]: [`num_complex::Complex`] numbers, with fields `re` and `im` and
//!   complex multiplication.

use num_complex::Complex;

use crate::{
    arch::Architecture,
    constant::SupportedLaneCount,
    ops,
    traits::{Element, SIMDPartialEq, SIMDVector},
};

//////////////
// Elements //
//////////////

impl<T0: Element, T1: Element> Element for (T0, T1) {
    #[inline(always)]
    fn zero() -> Self {
        (T0::zero(), T1::zero())
    }
}

impl<T0: Element, T1: Element, T2: Element> Element for (T0, T1, T2) {
    #[inline(always)]
    fn zero() -> Self {
        (T0::zero(), T1::zero(), T2::zero())
    }
}

impl<T0: Element, T1: Element, T2: Element, T3: Element> Element for (T0, T1, T2, T3) {
    #[inline(always)]
    fn zero() -> Self {
        (T0::zero(), T1::zero(), T2::zero(), T3::zero())
    }
}

impl<T: Element> Element for Complex<T> {
    #[inline(always)]
    fn zero() -> Self {
        Complex::new(T::zero(), T::zero())
    }
}

/// Evaluate `f` once per lane in ascending order, collecting the results.
#[inline(always)]
fn collect_lanes<A, T, F>(f: F) -> <A::Lanes as SupportedLaneCount>::Array<T>
where
    A: Architecture,
    T: Copy,
    F: FnMut(usize) -> T,
{
    <A::Lanes as SupportedLaneCount>::array_from_fn(f)
}

//////////
// Pair //
//////////

/// A lane vector of pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pair<V0, V1> {
    pub first: V0,
    pub second: V1,
}

impl<V0, V1> Pair<V0, V1> {
    pub fn new(first: V0, second: V1) -> Self {
        Self { first, second }
    }
}

impl<V0, V1> SIMDVector for Pair<V0, V1>
where
    V0: SIMDVector,
    V1: SIMDVector<Arch = V0::Arch>,
{
    type Arch = V0::Arch;
    type Scalar = (V0::Scalar, V1::Scalar);
    const LANES: usize = V0::LANES;
    const EMULATED: bool = V0::EMULATED || V1::EMULATED;

    #[inline(always)]
    fn arch(self) -> Self::Arch {
        self.first.arch()
    }

    #[inline(always)]
    fn default(arch: Self::Arch) -> Self {
        Self::new(V0::default(arch), V1::default(arch))
    }

    #[inline(always)]
    fn splat(arch: Self::Arch, (a, b): Self::Scalar) -> Self {
        Self::new(V0::splat(arch, a), V1::splat(arch, b))
    }

    #[inline(always)]
    fn from_fn<F>(arch: Self::Arch, f: F) -> Self
    where
        F: FnMut(usize) -> Self::Scalar,
    {
        let values = collect_lanes::<Self::Arch, _, _>(f);
        let values = values.as_ref();
        Self::new(
            V0::from_fn(arch, |i| values[i].0),
            V1::from_fn(arch, |i| values[i].1),
        )
    }

    #[inline(always)]
    fn get(&self, i: usize) -> Self::Scalar {
        (self.first.get(i), self.second.get(i))
    }

    #[inline(always)]
    fn put(&mut self, i: usize, (a, b): Self::Scalar) {
        self.first.put(i, a);
        self.second.put(i, b);
    }

    #[inline(always)]
    fn swap(&mut self, other: &mut Self) {
        self.first.swap(&mut other.first);
        self.second.swap(&mut other.second);
    }
}

impl<V0, V1> SIMDPartialEq for Pair<V0, V1>
where
    V0: SIMDPartialEq,
    V1: SIMDPartialEq<Mask = V0::Mask>,
{
    type Mask = V0::Mask;

    #[inline(always)]
    fn eq_simd(self, rhs: Self) -> V0::Mask {
        self.first.eq_simd(rhs.first) & self.second.eq_simd(rhs.second)
    }

    #[inline(always)]
    fn ne_simd(self, rhs: Self) -> V0::Mask {
        self.first.ne_simd(rhs.first) | self.second.ne_simd(rhs.second)
    }
}

////////////
// Tuples //
////////////

macro_rules! tuple_vector {
    ($name:ident, $doc:literal, $V0:ident $s0:ident 0, $($V:ident $S:ident $i:tt),+) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name<$V0, $($V),+>(pub $V0, $(pub $V),+);

        impl<$V0, $($V),+> SIMDVector for $name<$V0, $($V),+>
        where
            $V0: SIMDVector,
            $($V: SIMDVector<Arch = $V0::Arch>),+
        {
            type Arch = $V0::Arch;
            type Scalar = ($V0::Scalar, $($V::Scalar),+);
            const LANES: usize = $V0::LANES;
            const EMULATED: bool = $V0::EMULATED $(|| $V::EMULATED)+;

            #[inline(always)]
            fn arch(self) -> Self::Arch {
                self.0.arch()
            }

            #[inline(always)]
            fn default(arch: Self::Arch) -> Self {
                Self($V0::default(arch), $($V::default(arch)),+)
            }

            #[inline(always)]
            fn splat(arch: Self::Arch, ($s0, $($S),+): Self::Scalar) -> Self {
                Self($V0::splat(arch, $s0), $($V::splat(arch, $S)),+)
            }

            #[inline(always)]
            fn from_fn<F>(arch: Self::Arch, f: F) -> Self
            where
                F: FnMut(usize) -> Self::Scalar,
            {
                let values = collect_lanes::<Self::Arch, _, _>(f);
                let values = values.as_ref();
                Self(
                    $V0::from_fn(arch, |i| values[i].0),
                    $($V::from_fn(arch, |i| values[i].$i)),+
                )
            }

            #[inline(always)]
            fn get(&self, i: usize) -> Self::Scalar {
                (self.0.get(i), $(self.$i.get(i)),+)
            }

            #[inline(always)]
            fn put(&mut self, i: usize, ($s0, $($S),+): Self::Scalar) {
                self.0.put(i, $s0);
                $(self.$i.put(i, $S);)+
            }

            #[inline(always)]
            fn swap(&mut self, other: &mut Self) {
                self.0.swap(&mut other.0);
                $(self.$i.swap(&mut other.$i);)+
            }
        }

        impl<$V0, $($V),+> SIMDPartialEq for $name<$V0, $($V),+>
        where
            $V0: SIMDPartialEq,
            $($V: SIMDPartialEq<Mask = $V0::Mask>),+
        {
            type Mask = $V0::Mask;

            #[inline(always)]
            fn eq_simd(self, rhs: Self) -> $V0::Mask {
                self.0.eq_simd(rhs.0) $(& self.$i.eq_simd(rhs.$i))+
            }

            #[inline(always)]
            fn ne_simd(self, rhs: Self) -> $V0::Mask {
                self.0.ne_simd(rhs.0) $(| self.$i.ne_simd(rhs.$i))+
            }
        }

        impl<$V0, $($V),+> std::ops::Add for $name<$V0, $($V),+>
        where
            $V0: std::ops::Add<Output = $V0>,
            $($V: std::ops::Add<Output = $V>),+
        {
            type Output = Self;
            #[inline(always)]
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0, $(self.$i + rhs.$i),+)
            }
        }

        impl<$V0, $($V),+> std::ops::Sub for $name<$V0, $($V),+>
        where
            $V0: std::ops::Sub<Output = $V0>,
            $($V: std::ops::Sub<Output = $V>),+
        {
            type Output = Self;
            #[inline(always)]
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0, $(self.$i - rhs.$i),+)
            }
        }

        ops::impl_assign_ops!({ $V0, $($V),+ } $name<$V0, $($V),+>);
    };
}

tuple_vector!(Tuple3, "A lane vector of 3-tuples.", V0 s0 0, V1 s1 1, V2 s2 2);
tuple_vector!(
    Tuple4,
    "A lane vector of 4-tuples.",
    V0 s0 0,
    V1 s1 1,
    V2 s2 2,
    V3 s3 3
);

macro_rules! pair_op {
    ($Op:ident, $op:ident) => {
        impl<V0, V1> std::ops::$Op for Pair<V0, V1>
        where
            V0: std::ops::$Op<Output = V0>,
            V1: std::ops::$Op<Output = V1>,
        {
            type Output = Self;
            #[inline(always)]
            fn $op(self, rhs: Self) -> Self {
                Self::new(
                    std::ops::$Op::$op(self.first, rhs.first),
                    std::ops::$Op::$op(self.second, rhs.second),
                )
            }
        }
    };
}

pair_op!(Add, add);
pair_op!(Sub, sub);
pair_op!(Mul, mul);
pair_op!(Div, div);
pair_op!(BitAnd, bitand);
pair_op!(BitOr, bitor);
pair_op!(BitXor, bitxor);

ops::impl_assign_ops!({ V0, V1 } Pair<V0, V1>);

/////////////
// Complex //
/////////////

/// A lane vector of complex numbers with separate real and imaginary parts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexLanes<V> {
    pub re: V,
    pub im: V,
}

impl<V> ComplexLanes<V> {
    pub fn new(re: V, im: V) -> Self {
        Self { re, im }
    }
}

impl<V: SIMDVector> SIMDVector for ComplexLanes<V> {
    type Arch = V::Arch;
    type Scalar = Complex<V::Scalar>;
    const LANES: usize = V::LANES;
    const EMULATED: bool = V::EMULATED;

    #[inline(always)]
    fn arch(self) -> V::Arch {
        self.re.arch()
    }

    #[inline(always)]
    fn default(arch: V::Arch) -> Self {
        Self::new(V::default(arch), V::default(arch))
    }

    #[inline(always)]
    fn splat(arch: V::Arch, value: Complex<V::Scalar>) -> Self {
        Self::new(V::splat(arch, value.re), V::splat(arch, value.im))
    }

    #[inline(always)]
    fn from_fn<F>(arch: V::Arch, f: F) -> Self
    where
        F: FnMut(usize) -> Complex<V::Scalar>,
    {
        let values = collect_lanes::<V::Arch, _, _>(f);
        let values = values.as_ref();
        Self::new(
            V::from_fn(arch, |i| values[i].re),
            V::from_fn(arch, |i| values[i].im),
        )
    }

    #[inline(always)]
    fn get(&self, i: usize) -> Complex<V::Scalar> {
        Complex::new(self.re.get(i), self.im.get(i))
    }

    #[inline(always)]
    fn put(&mut self, i: usize, value: Complex<V::Scalar>) {
        self.re.put(i, value.re);
        self.im.put(i, value.im);
    }

    #[inline(always)]
    fn swap(&mut self, other: &mut Self) {
        self.re.swap(&mut other.re);
        self.im.swap(&mut other.im);
    }
}

impl<V> ComplexLanes<V>
where
    V: SIMDVector + std::ops::Neg<Output = V>,
{
    /// Lane-wise complex conjugate.
    #[inline(always)]
    pub fn conj(self) -> Self {
        Self::new(self.re, -self.im)
    }
}

impl<V> ComplexLanes<V>
where
    V: SIMDVector + std::ops::Add<Output = V> + std::ops::Mul<Output = V>,
{
    /// Lane-wise squared magnitude `re * re + im * im`.
    #[inline(always)]
    pub fn norm_sqr(self) -> V {
        self.re * self.re + self.im * self.im
    }
}

impl<V: std::ops::Add<Output = V>> std::ops::Add for ComplexLanes<V> {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl<V: std::ops::Sub<Output = V>> std::ops::Sub for ComplexLanes<V> {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl<V> std::ops::Mul for ComplexLanes<V>
where
    V: Copy
        + std::ops::Add<Output = V>
        + std::ops::Sub<Output = V>
        + std::ops::Mul<Output = V>,
{
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl<V: std::ops::Neg<Output = V>> std::ops::Neg for ComplexLanes<V> {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self::new(-self.re, -self.im)
    }
}

impl<V: SIMDPartialEq> SIMDPartialEq for ComplexLanes<V> {
    type Mask = V::Mask;

    #[inline(always)]
    fn eq_simd(self, rhs: Self) -> V::Mask {
        self.re.eq_simd(rhs.re) & self.im.eq_simd(rhs.im)
    }

    #[inline(always)]
    fn ne_simd(self, rhs: Self) -> V::Mask {
        self.re.ne_simd(rhs.re) | self.im.ne_simd(rhs.im)
    }
}

ops::impl_assign_ops!({ V } ComplexLanes<V>);
