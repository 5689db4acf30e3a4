/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Mapping from element types to their lane vector for each architecture.
//!
//! Generic code names a vector by its element type and architecture, for example
//! `LaneVector<i32, A>`, and the [`Lane`] implementation picks the layout: a hardware
//! register when the architecture has a specialization for the element type, or an
//! [`Emulated`] array otherwise.

use num_complex::Complex;

use crate::{
    arch::{Architecture, Current, Generic},
    composite::{ComplexLanes, Pair, Tuple3, Tuple4},
    constant::Const,
    emulated::Emulated,
    pointer::Pointers,
    traits::{Element, SIMDVector},
};

/// Element types with a lane vector for the architecture `A`.
pub trait Lane<A: Architecture>: Element {
    /// The vector holding `A::WIDTH` lanes of `Self`.
    type Vector: SIMDVector<Arch = A, Scalar = Self>;
}

/// The lane vector of `T` for the architecture `A`.
pub type LaneVector<T, A = Current> = <T as Lane<A>>::Vector;

/// The mask vector of the architecture `A`.
pub type MaskVector<A = Current> = <A as Architecture>::Mask;

/// A lane vector of addresses of `T`.
pub type PointerVector<T, A = Current> = Pointers<T, A>;

/// Map element types onto [`Emulated`] lanes for an architecture of fixed width.
macro_rules! emulated_lanes {
    ($arch:ty, $N:literal; $($T:ty),+ $(,)?) => {
        $(
            impl $crate::lane::Lane<$arch> for $T {
                type Vector = $crate::Emulated<$T, $N, $arch>;
            }
        )+
    };
}

pub(crate) use emulated_lanes;

macro_rules! generic_lanes {
    ($($T:ty),+ $(,)?) => {
        $(
            impl<const N: usize> Lane<Generic<N>> for $T
            where
                Generic<N>: Architecture<Lanes = Const<N>>,
            {
                type Vector = Emulated<$T, N, Generic<N>>;
            }
        )+
    };
}

generic_lanes!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, half::f16, f32, f64);

impl<A: Architecture> Lane<A> for bool {
    type Vector = A::Mask;
}

impl<T, A: Architecture> Lane<A> for *mut T {
    type Vector = Pointers<T, A>;
}

impl<A, T0, T1> Lane<A> for (T0, T1)
where
    A: Architecture,
    T0: Lane<A>,
    T1: Lane<A>,
{
    type Vector = Pair<T0::Vector, T1::Vector>;
}

impl<A, T0, T1, T2> Lane<A> for (T0, T1, T2)
where
    A: Architecture,
    T0: Lane<A>,
    T1: Lane<A>,
    T2: Lane<A>,
{
    type Vector = Tuple3<T0::Vector, T1::Vector, T2::Vector>;
}

impl<A, T0, T1, T2, T3> Lane<A> for (T0, T1, T2, T3)
where
    A: Architecture,
    T0: Lane<A>,
    T1: Lane<A>,
    T2: Lane<A>,
    T3: Lane<A>,
{
    type Vector = Tuple4<T0::Vector, T1::Vector, T2::Vector, T3::Vector>;
}

impl<A, T> Lane<A> for Complex<T>
where
    A: Architecture,
    T: Lane<A>,
{
    type Vector = ComplexLanes<T::Vector>;
}
