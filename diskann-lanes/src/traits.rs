/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::{
    fmt::Debug,
    ops::{BitAnd, BitOr, BitXor, Not},
};

use half::f16;

use super::{
    arch::Architecture,
    bitmask::{ActiveLanes, lane_mask},
    constant::{ArrayOf, SupportedLaneCount},
    element::{LaneMut, LaneRef, Lanes},
};

/// The array type with one entry per lane of `V`.
pub type LaneArray<V> = ArrayOf<
    <<V as SIMDVector>::Arch as Architecture>::Lanes,
    <V as SIMDVector>::Scalar,
>;

/// Types that may occupy a single lane of a vector.
///
/// The associated `zero` is the value used by [`SIMDVector::default`].
pub trait Element: Copy + Debug {
    fn zero() -> Self;
}

macro_rules! element {
    ($zero:expr, $($T:ty),* $(,)?) => {
        $(
            impl Element for $T {
                #[inline(always)]
                fn zero() -> Self {
                    $zero
                }
            }
        )*
    };
}

element!(0, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
element!(0.0, f32, f64);
element!(f16::ZERO, f16);
element!(false, bool);

impl<T> Element for *mut T {
    #[inline(always)]
    fn zero() -> Self {
        std::ptr::null_mut()
    }
}

/// Scalars supporting "base plus lane index" construction.
///
/// See [`SIMDVector::step`].
pub trait Step: Copy {
    /// Return `self` advanced by `n` units. Integers wrap on overflow.
    fn forward(self, n: usize) -> Self;
}

macro_rules! step {
    (integer, $($T:ty),*) => {
        $(
            impl Step for $T {
                #[inline(always)]
                fn forward(self, n: usize) -> Self {
                    self.wrapping_add(n as $T)
                }
            }
        )*
    };
    (float, $($T:ty),*) => {
        $(
            impl Step for $T {
                #[inline(always)]
                fn forward(self, n: usize) -> Self {
                    self + (n as $T)
                }
            }
        )*
    };
}

step!(integer, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
step!(float, f32, f64);

impl Step for f16 {
    #[inline(always)]
    fn forward(self, n: usize) -> Self {
        f16::from_f32(self.to_f32() + n as f32)
    }
}

/// A trait representing minimal behavior for a lane vector.
///
/// A lane vector can be thought of as a homogeneous array `[T; N]` (with potentially
/// stricter alignment requirements) that generally behaves for arithmetic purposes like a
/// scalar in the sense that
/// ```ignore
/// fn add<V>(a: V, b: V) -> V
/// where V: SIMDVector + std::ops::Add<Output = V> {
///     a + b
/// }
/// ```
/// broadcasts the `+` operation across all lanes in the vector.
///
/// The width of every vector is fixed by its [`Architecture`], and lane indices are only
/// valid in the range `0..LANES`.
pub trait SIMDVector: Copy + Debug {
    /// The architecture this vector belongs to.
    type Arch: Architecture;

    /// The type of each element in the vector.
    type Scalar: Copy + Debug;

    /// The number of lanes in the vector.
    const LANES: usize;

    /// Whether or not this is an emulated vector.
    ///
    /// Emulated vectors are backed by Rust arrays and use scalar loops to implement
    /// arithmetic operations.
    const EMULATED: bool;

    /// Return the architecture object associated with this vector.
    ///
    /// This is safe because construction of `self` serves as the witness that we are on
    /// a compatible architecture.
    fn arch(self) -> Self::Arch;

    /// Return the default value for the type. Every lane is the zero of the scalar type.
    fn default(arch: Self::Arch) -> Self;

    /// Broadcast the provided scalar across all lanes.
    fn splat(arch: Self::Arch, value: Self::Scalar) -> Self;

    /// Construct a vector by invoking `f` once for each lane in `0..LANES`, in order.
    fn from_fn<F>(arch: Self::Arch, f: F) -> Self
    where
        F: FnMut(usize) -> Self::Scalar;

    /// Return the value in lane `i`.
    ///
    /// The index is checked with a debug assertion. Release builds trust `i < LANES`
    /// though all safe implementations still panic on an out-of-bounds index.
    fn get(&self, i: usize) -> Self::Scalar;

    /// Overwrite lane `i` with `value`, leaving all other lanes untouched.
    ///
    /// The same indexing rules as [`SIMDVector::get`] apply.
    fn put(&mut self, i: usize, value: Self::Scalar);

    //////////////////////////////
    // Provided Implementations //
    //////////////////////////////

    /// Return the number of lanes in this vector.
    #[inline(always)]
    fn num_lanes() -> usize {
        Self::LANES
    }

    /// Retrieve the contents as an array.
    #[inline(always)]
    fn to_array(self) -> LaneArray<Self> {
        <<Self::Arch as Architecture>::Lanes as SupportedLaneCount>::array_from_fn(|i| {
            self.get(i)
        })
    }

    /// Construct from the associated array.
    #[inline(always)]
    fn from_array(arch: Self::Arch, x: LaneArray<Self>) -> Self {
        let x = x.as_ref();
        Self::from_fn(arch, |i| x[i])
    }

    /// Construct from the first `LANES` entries of `x`.
    ///
    /// # Panics
    ///
    /// Panics if `x.len() < LANES`.
    #[inline(always)]
    fn from_slice(arch: Self::Arch, x: &[Self::Scalar]) -> Self {
        let x = &x[..Self::LANES];
        Self::from_fn(arch, |i| x[i])
    }

    /// Write the lanes of `self` into the first `LANES` entries of `x`.
    ///
    /// # Panics
    ///
    /// Panics if `x.len() < LANES`.
    #[inline(always)]
    fn to_slice(self, x: &mut [Self::Scalar]) {
        x[..Self::LANES]
            .iter_mut()
            .enumerate()
            .for_each(|(i, x)| *x = self.get(i));
    }

    /// Construct a vector where lane `i` holds `base + i`.
    #[inline(always)]
    fn step(arch: Self::Arch, base: Self::Scalar) -> Self
    where
        Self::Scalar: Step,
    {
        Self::from_fn(arch, |i| base.forward(i))
    }

    /// Return lane `I`, where `I` is checked against `LANES` at compile time.
    #[inline(always)]
    fn get_const<const I: usize>(&self) -> Self::Scalar {
        const { assert!(I < Self::LANES, "lane index out of bounds") };
        self.get(I)
    }

    /// Overwrite lane `I`, where `I` is checked against `LANES` at compile time.
    #[inline(always)]
    fn put_const<const I: usize>(&mut self, value: Self::Scalar) {
        const { assert!(I < Self::LANES, "lane index out of bounds") };
        self.put(I, value)
    }

    /// Exchange the contents of `self` and `other`.
    #[inline(always)]
    fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other)
    }

    /// Return an iterator over the lanes of `self` in index order.
    #[inline(always)]
    fn lanes(self) -> Lanes<Self> {
        Lanes::new(self)
    }

    /// Return a shared reference proxy to lane `i`.
    #[inline(always)]
    fn lane(&self, i: usize) -> LaneRef<'_, Self> {
        LaneRef::new(self, i)
    }

    /// Return a mutable reference proxy to lane `i`.
    #[inline(always)]
    fn lane_mut(&mut self, i: usize) -> LaneMut<'_, Self> {
        LaneMut::new(self, i)
    }
}

/// A logical mask for lane-wise operations.
///
/// The representation of this type varies between architectures. For example:
///
/// * On AVX and AVX 2, a mask for 32-bit lanes is a register where every lane is either
///   all ones or all zeros.
///
/// * On AVX-512 and the generic architectures, the mask is simply a bit mask with bit `i`
///   holding lane `i`.
///
/// Regardless of representation, [`SIMDMask::movemask`] always returns the packed bit
/// form with no bits set at or above `LANES`.
pub trait SIMDMask:
    SIMDVector<Scalar = bool>
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
{
    /// The type of the underlying representation.
    type Underlying: Copy + Debug;

    /// Retrieve the underlying representation.
    fn to_underlying(self) -> Self::Underlying;

    /// Construct the mask from the underlying representation.
    fn from_underlying(arch: Self::Arch, value: Self::Underlying) -> Self;

    /// Return the packed truth bits with lane `i` at bit `i`.
    fn movemask(self) -> u32;

    /// Construct a mask from packed truth bits. Bits at or above `LANES` are ignored.
    fn from_movemask(arch: Self::Arch, bits: u32) -> Self;

    //////////////////////////////
    // Provided Implementations //
    //////////////////////////////

    /// Construct a new mask with the first `i` lanes set and the remainder cleared.
    ///
    /// If `i >= LANES` then all lanes will be set.
    #[inline(always)]
    fn keep_first(arch: Self::Arch, i: usize) -> Self {
        Self::from_movemask(arch, lane_mask(i))
    }

    /// Return `true` if any lane in the mask is set.
    #[inline(always)]
    fn any(self) -> bool {
        self.movemask() != 0
    }

    /// Return `true` if all lanes in the mask are set.
    #[inline(always)]
    fn all(self) -> bool {
        self.movemask() == lane_mask(Self::LANES)
    }

    /// Return `true` if no lanes in the mask are set.
    #[inline(always)]
    fn none(self) -> bool {
        !self.any()
    }

    /// Return the number of set lanes.
    #[inline(always)]
    fn count(self) -> usize {
        self.movemask().count_ones() as usize
    }

    /// Return the lowest set lane or `None` if no lanes are set.
    #[inline(always)]
    fn first(self) -> Option<usize> {
        self.active().next()
    }

    /// Invoke `f(i)` exactly once for every set lane `i`, in ascending order.
    #[inline(always)]
    fn foreach_active<F>(self, f: F)
    where
        F: FnMut(usize),
    {
        self.active().for_each(f)
    }

    /// Return an iterator over the indices of the set lanes in ascending order.
    #[inline(always)]
    fn active(self) -> ActiveLanes {
        ActiveLanes::new(self.movemask())
    }

    /// Lane-wise choose between `on_true` and `on_false`.
    #[inline(always)]
    fn select<V>(self, on_true: V, on_false: V) -> V
    where
        V: SIMDVector<Arch = Self::Arch>,
    {
        let bits = self.movemask();
        V::from_fn(on_true.arch(), |i| {
            if (bits >> i) & 1 == 1 {
                on_true.get(i)
            } else {
                on_false.get(i)
            }
        })
    }
}

/// Lane-wise equality producing a mask.
pub trait SIMDPartialEq<Rhs = Self> {
    /// The mask holding the per-lane results.
    type Mask: SIMDMask;

    /// Lane-wise `==`.
    fn eq_simd(self, rhs: Rhs) -> Self::Mask;

    /// Lane-wise `!=`.
    fn ne_simd(self, rhs: Rhs) -> Self::Mask;
}

/// Lane-wise ordering producing a mask.
pub trait SIMDPartialOrd<Rhs = Self>: SIMDPartialEq<Rhs> {
    /// Lane-wise `<`.
    fn lt_simd(self, rhs: Rhs) -> Self::Mask;

    /// Lane-wise `<=`.
    fn le_simd(self, rhs: Rhs) -> Self::Mask;

    /// Lane-wise `>`.
    fn gt_simd(self, rhs: Rhs) -> Self::Mask;

    /// Lane-wise `>=`.
    fn ge_simd(self, rhs: Rhs) -> Self::Mask;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_zero() {
        assert_eq!(<u8 as Element>::zero(), 0);
        assert_eq!(<i64 as Element>::zero(), 0);
        assert_eq!(<f32 as Element>::zero(), 0.0);
        assert_eq!(<f16 as Element>::zero(), f16::ZERO);
        assert!(!<bool as Element>::zero());
        assert!(<*mut u32 as Element>::zero().is_null());
    }

    #[test]
    fn test_step() {
        assert_eq!(5u8.forward(3), 8);
        assert_eq!(255u8.forward(1), 0);
        assert_eq!(i32::MAX.forward(1), i32::MIN);
        assert_eq!(1.5f32.forward(2), 3.5);
        assert_eq!(f16::from_f32(1.0).forward(1), f16::from_f32(2.0));
    }
}
