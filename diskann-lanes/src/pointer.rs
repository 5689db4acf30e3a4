/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::fmt::{self, Debug};

use crate::{
    arch::Architecture,
    constant::{ArrayOf, SupportedLaneCount},
    traits::{SIMDMask, SIMDVector},
};

/// A lane vector of raw addresses, one per lane.
///
/// This is the source of a gather and the destination of a scatter. No relationship is
/// implied between the lanes: addresses may repeat, overlap or be null. The addresses are
/// laid out contiguously with the alignment of the architecture, so a hardware loader may
/// read them directly as a register.
///
/// Constructing and offsetting addresses is safe. Only dereferencing them, through the
/// [`crate::Loader`] or [`crate::Indirect`], carries a safety contract.
#[repr(C)]
pub struct Pointers<T, A: Architecture> {
    lanes: ArrayOf<A::Lanes, *mut T>,
    arch: A,
    _align: [A::Align; 0],
}

impl<T, A: Architecture> Clone for Pointers<T, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, A: Architecture> Copy for Pointers<T, A> {}

impl<T, A: Architecture> Debug for Pointers<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pointers")
            .field(&self.lanes.as_ref())
            .finish()
    }
}

impl<T, A: Architecture> PartialEq for Pointers<T, A> {
    fn eq(&self, other: &Self) -> bool {
        self.lanes.as_ref() == other.lanes.as_ref()
    }
}

impl<T, A: Architecture> Eq for Pointers<T, A> {}

impl<T, A: Architecture> SIMDVector for Pointers<T, A> {
    type Arch = A;
    type Scalar = *mut T;
    const LANES: usize = A::WIDTH;
    const EMULATED: bool = true;

    #[inline(always)]
    fn arch(self) -> A {
        self.arch
    }

    #[inline(always)]
    fn default(arch: A) -> Self {
        Self::splat(arch, std::ptr::null_mut())
    }

    #[inline(always)]
    fn splat(arch: A, value: *mut T) -> Self {
        Self::from_fn(arch, |_| value)
    }

    #[inline(always)]
    fn from_fn<F>(arch: A, f: F) -> Self
    where
        F: FnMut(usize) -> *mut T,
    {
        Self {
            lanes: <A::Lanes as SupportedLaneCount>::array_from_fn(f),
            arch,
            _align: [],
        }
    }

    #[inline(always)]
    fn get(&self, i: usize) -> *mut T {
        debug_assert!(i < A::WIDTH, "lane {} out of bounds for width {}", i, A::WIDTH);
        self.lanes.as_ref()[i]
    }

    #[inline(always)]
    fn put(&mut self, i: usize, value: *mut T) {
        debug_assert!(i < A::WIDTH, "lane {} out of bounds for width {}", i, A::WIDTH);
        self.lanes.as_mut()[i] = value;
    }

    #[inline(always)]
    fn to_array(self) -> ArrayOf<A::Lanes, *mut T> {
        self.lanes
    }

    #[inline(always)]
    fn from_array(arch: A, lanes: ArrayOf<A::Lanes, *mut T>) -> Self {
        Self {
            lanes,
            arch,
            _align: [],
        }
    }
}

impl<T, A: Architecture> Pointers<T, A> {
    /// Return a vector with every lane null.
    #[inline(always)]
    pub fn null(arch: A) -> Self {
        Self::default(arch)
    }

    /// Address elements of `slice`, with lane `i` pointing at `slice[index(i)]`.
    ///
    /// Every address is derived from the same base pointer, so lanes may alias freely.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds for `slice`.
    pub fn from_slice<F>(arch: A, slice: &mut [T], mut index: F) -> Self
    where
        F: FnMut(usize) -> usize,
    {
        let len = slice.len();
        let base = slice.as_mut_ptr();
        Self::from_fn(arch, |i| {
            let j = index(i);
            assert!(j < len, "lane {i} addresses index {j} of a slice of length {len}");
            base.wrapping_add(j)
        })
    }

    /// Move every lane by `k` elements of `T`.
    ///
    /// This uses wrapping pointer arithmetic. The result is only dereferenceable where the
    /// moved address still lies within the allocation of the original.
    #[inline(always)]
    pub fn offset(self, k: isize) -> Self {
        Self::from_fn(self.arch, |i| self.get(i).wrapping_offset(k))
    }

    /// Return a mask of the null lanes.
    #[inline(always)]
    pub fn is_null(self) -> A::Mask {
        A::Mask::from_fn(self.arch, |i| self.get(i).is_null())
    }

    /// Return the numeric address held by lane `i`.
    #[inline(always)]
    pub fn address(&self, i: usize) -> usize {
        self.get(i) as usize
    }

    /// View the lanes as a slice.
    #[inline(always)]
    pub fn as_slice(&self) -> &[*mut T] {
        self.lanes.as_ref()
    }

    /// Return a pointer to the first lane. The lanes are contiguous.
    #[cfg_attr(not(target_arch = "x86_64"), allow(dead_code))]
    #[inline(always)]
    pub(crate) fn as_ptr(&self) -> *const *mut T {
        self.lanes.as_ref().as_ptr()
    }
}
