/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! # Gather and Scatter
//!
//! A [`Loader`] moves lanes between memory addressed by a [`Pointers`] vector and a lane
//! vector. Every (element type, architecture) pair has exactly one loader policy:
//!
//! * The default policy in [`by_lane`] issues one scalar access per lane. It is correct
//!   for every element type and for addresses that alias or overlap. Masked forms visit
//!   the active lanes in ascending order, so when stored lanes alias, the highest active
//!   lane wins.
//!
//! * Hardware policies replace the per-lane loop with gather instructions where the
//!   architecture provides them. They are observationally equivalent to the default
//!   policy for all valid inputs.
//!
//! Masked loads in this crate leave inactive destination lanes untouched, but generic
//! code should not rely on the contents of inactive lanes.
//!
//! # Safety
//!
//! Every memory function is `unsafe`. For each lane that is accessed (every lane for the
//! unmasked forms, the active lanes otherwise), the address must be valid for a read or
//! write of `T` and properly aligned. Inactive lanes may hold any address, including null.

use crate::{
    arch::{Architecture, Generic},
    lane::{Lane, LaneVector},
    pointer::Pointers,
    traits::{SIMDMask, SIMDVector},
};

/// The default per-lane policy.
///
/// These functions are generic over the vector type so that every loader, including the
/// hardware specializations, can be compared against them.
pub mod by_lane {
    use super::*;

    /// Read `*src[i]` into `dst[i]` for every lane `i`.
    ///
    /// # Safety
    ///
    /// Every lane of `src` must be valid for reads of `V::Scalar`.
    #[inline(always)]
    pub unsafe fn load<V>(dst: &mut V, src: Pointers<V::Scalar, V::Arch>)
    where
        V: SIMDVector,
    {
        for i in 0..V::LANES {
            // SAFETY: Inherited from the caller.
            dst.put(i, unsafe { src.get(i).read() });
        }
    }

    /// Read `*src[i]` into `dst[i]` for every active lane `i`.
    ///
    /// # Safety
    ///
    /// Every active lane of `src` must be valid for reads of `V::Scalar`.
    #[inline(always)]
    pub unsafe fn load_masked<V>(
        dst: &mut V,
        src: Pointers<V::Scalar, V::Arch>,
        mask: <V::Arch as Architecture>::Mask,
    ) where
        V: SIMDVector,
    {
        mask.foreach_active(|i| {
            // SAFETY: Inherited from the caller. Lane `i` is active.
            dst.put(i, unsafe { src.get(i).read() })
        })
    }

    /// Write `src[i]` to `*dst[i]` for every lane `i` in ascending order.
    ///
    /// # Safety
    ///
    /// Every lane of `dst` must be valid for writes of `V::Scalar`.
    #[inline(always)]
    pub unsafe fn store<V>(dst: Pointers<V::Scalar, V::Arch>, src: V)
    where
        V: SIMDVector,
    {
        for i in 0..V::LANES {
            // SAFETY: Inherited from the caller.
            unsafe { dst.get(i).write(src.get(i)) };
        }
    }

    /// Write `src[i]` to `*dst[i]` for every active lane `i` in ascending order.
    ///
    /// # Safety
    ///
    /// Every active lane of `dst` must be valid for writes of `V::Scalar`.
    #[inline(always)]
    pub unsafe fn store_masked<V>(
        dst: Pointers<V::Scalar, V::Arch>,
        src: V,
        mask: <V::Arch as Architecture>::Mask,
    ) where
        V: SIMDVector,
    {
        mask.foreach_active(|i| {
            // SAFETY: Inherited from the caller. Lane `i` is active.
            unsafe { dst.get(i).write(src.get(i)) }
        })
    }
}

/// The gather and scatter policy of an element type on the architecture `A`.
///
/// Every method defaults to the corresponding function in [`by_lane`].
pub trait Loader<A: Architecture>: Lane<A> {
    /// Gather every lane: `dst[i] = *src[i]`.
    ///
    /// # Safety
    ///
    /// Every lane of `src` must be valid for reads of `Self`.
    #[inline(always)]
    unsafe fn load(dst: &mut LaneVector<Self, A>, src: Pointers<Self, A>) {
        // SAFETY: Inherited from the caller.
        unsafe { by_lane::load(dst, src) }
    }

    /// Gather the active lanes: `dst[i] = *src[i]` where `mask[i]` is set.
    ///
    /// # Safety
    ///
    /// Every active lane of `src` must be valid for reads of `Self`.
    #[inline(always)]
    unsafe fn load_masked(dst: &mut LaneVector<Self, A>, src: Pointers<Self, A>, mask: A::Mask) {
        // SAFETY: Inherited from the caller.
        unsafe { by_lane::load_masked(dst, src, mask) }
    }

    /// Scatter every lane: `*dst[i] = src[i]`.
    ///
    /// # Safety
    ///
    /// Every lane of `dst` must be valid for writes of `Self`.
    #[inline(always)]
    unsafe fn store(dst: Pointers<Self, A>, src: LaneVector<Self, A>) {
        // SAFETY: Inherited from the caller.
        unsafe { by_lane::store(dst, src) }
    }

    /// Scatter the active lanes: `*dst[i] = src[i]` where `mask[i]` is set.
    ///
    /// # Safety
    ///
    /// Every active lane of `dst` must be valid for writes of `Self`.
    #[inline(always)]
    unsafe fn store_masked(dst: Pointers<Self, A>, src: LaneVector<Self, A>, mask: A::Mask) {
        // SAFETY: Inherited from the caller.
        unsafe { by_lane::store_masked(dst, src, mask) }
    }
}

impl<T, const N: usize> Loader<Generic<N>> for T
where
    Generic<N>: Architecture,
    T: Lane<Generic<N>>,
{
}

/// Use the default policy for every listed element type on `$arch`, along with the
/// composites, pointers and masks.
macro_rules! default_loader {
    ($arch:ty; $($T:ty),* $(,)?) => {
        $(impl $crate::loader::Loader<$arch> for $T {})*

        impl $crate::loader::Loader<$arch> for bool {}

        impl<T> $crate::loader::Loader<$arch> for *mut T {}

        impl<T0, T1> $crate::loader::Loader<$arch> for (T0, T1)
        where
            T0: $crate::lane::Lane<$arch>,
            T1: $crate::lane::Lane<$arch>,
        {
        }

        impl<T0, T1, T2> $crate::loader::Loader<$arch> for (T0, T1, T2)
        where
            T0: $crate::lane::Lane<$arch>,
            T1: $crate::lane::Lane<$arch>,
            T2: $crate::lane::Lane<$arch>,
        {
        }

        impl<T0, T1, T2, T3> $crate::loader::Loader<$arch> for (T0, T1, T2, T3)
        where
            T0: $crate::lane::Lane<$arch>,
            T1: $crate::lane::Lane<$arch>,
            T2: $crate::lane::Lane<$arch>,
            T3: $crate::lane::Lane<$arch>,
        {
        }

        impl<T> $crate::loader::Loader<$arch> for num_complex::Complex<T>
        where
            T: $crate::lane::Lane<$arch>,
        {
        }
    };
}

#[cfg_attr(not(target_arch = "x86_64"), allow(unused_imports))]
pub(crate) use default_loader;

////////////////////
// Free Functions //
////////////////////

/// Gather every lane of `src` into a new vector.
///
/// # Safety
///
/// Every lane of `src` must be valid for reads of `T`.
#[inline(always)]
pub unsafe fn load<T, A>(src: Pointers<T, A>) -> LaneVector<T, A>
where
    A: Architecture,
    T: Loader<A>,
{
    let mut dst = <LaneVector<T, A> as SIMDVector>::default(src.arch());
    // SAFETY: Inherited from the caller.
    unsafe { T::load(&mut dst, src) };
    dst
}

/// Gather the active lanes of `src` into `dst`, leaving inactive lanes untouched.
///
/// # Safety
///
/// Every active lane of `src` must be valid for reads of `T`.
#[inline(always)]
pub unsafe fn load_masked<T, A>(dst: &mut LaneVector<T, A>, src: Pointers<T, A>, mask: A::Mask)
where
    A: Architecture,
    T: Loader<A>,
{
    // SAFETY: Inherited from the caller.
    unsafe { T::load_masked(dst, src, mask) }
}

/// Scatter every lane of `src` to the addresses in `dst`.
///
/// # Safety
///
/// Every lane of `dst` must be valid for writes of `T`.
#[inline(always)]
pub unsafe fn store<T, A>(dst: Pointers<T, A>, src: LaneVector<T, A>)
where
    A: Architecture,
    T: Loader<A>,
{
    // SAFETY: Inherited from the caller.
    unsafe { T::store(dst, src) }
}

/// Scatter the active lanes of `src` to the addresses in `dst`.
///
/// # Safety
///
/// Every active lane of `dst` must be valid for writes of `T`.
#[inline(always)]
pub unsafe fn store_masked<T, A>(dst: Pointers<T, A>, src: LaneVector<T, A>, mask: A::Mask)
where
    A: Architecture,
    T: Loader<A>,
{
    // SAFETY: Inherited from the caller.
    unsafe { T::store_masked(dst, src, mask) }
}

/// Return the packed truth bits of `mask`.
#[inline(always)]
pub fn movemask<M: SIMDMask>(mask: M) -> u32 {
    mask.movemask()
}

/// Return `true` if any lane of `mask` is set.
#[inline(always)]
pub fn any<M: SIMDMask>(mask: M) -> bool {
    mask.any()
}

/// Return `true` if every lane of `mask` is set.
#[inline(always)]
pub fn all<M: SIMDMask>(mask: M) -> bool {
    mask.all()
}

/// Invoke `f(i)` for every set lane `i` of `mask` in ascending order.
#[inline(always)]
pub fn foreach_active<M, F>(mask: M, f: F)
where
    M: SIMDMask,
    F: FnMut(usize),
{
    mask.foreach_active(f)
}
