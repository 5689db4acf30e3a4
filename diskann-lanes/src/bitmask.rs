/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use super::{
    arch::Architecture,
    constant::{Const, SupportedLaneCount},
    traits::{SIMDMask, SIMDVector},
};

/// Return a `u32` with the lowest `lanes` bits set.
///
/// Saturates at 32 lanes.
#[inline(always)]
pub const fn lane_mask(lanes: usize) -> u32 {
    if lanes >= 32 {
        u32::MAX
    } else {
        (1u32 << lanes) - 1
    }
}

/// A lane-wise mask represented as a bit-mask.
///
/// The representation for this type is the smallest unsigned integer capable of holding
/// `N` bits. Bits at or above `N` are always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitMask<const N: usize, A>(
    pub <Const<N> as SupportedLaneCount>::BitMaskType,
    A,
)
where
    Const<N>: SupportedLaneCount;

impl<const N: usize, A> BitMask<N, A>
where
    Const<N>: SupportedLaneCount,
    A: Architecture,
{
    /// Retarget the mask to a different architecture of the same width.
    pub fn as_arch<B>(self, arch: B) -> BitMask<N, B>
    where
        B: Architecture,
    {
        BitMask(self.0, arch)
    }
}

/// Iterator over the set bits of a packed mask, lowest first.
///
/// Each step extracts and clears the lowest set bit.
#[derive(Debug, Clone, Copy)]
pub struct ActiveLanes {
    bits: u32,
}

impl ActiveLanes {
    /// Iterate over the set bits of `bits`.
    pub fn new(bits: u32) -> Self {
        Self { bits }
    }
}

impl Iterator for ActiveLanes {
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<usize> {
        if self.bits == 0 {
            None
        } else {
            let i = self.bits.trailing_zeros();
            self.bits &= self.bits - 1;
            Some(i as usize)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.bits.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for ActiveLanes {}
impl std::iter::FusedIterator for ActiveLanes {}

macro_rules! impl_bitmask {
    ($N:literal, $repr:ty) => {
        impl<A> SIMDVector for BitMask<$N, A>
        where
            A: Architecture<Lanes = Const<$N>>,
        {
            type Arch = A;
            type Scalar = bool;
            const LANES: usize = $N;
            const EMULATED: bool = true;

            #[inline(always)]
            fn arch(self) -> A {
                self.1
            }

            #[inline(always)]
            fn default(arch: A) -> Self {
                Self(0, arch)
            }

            #[inline(always)]
            fn splat(arch: A, value: bool) -> Self {
                Self(if value { lane_mask($N) as $repr } else { 0 }, arch)
            }

            #[inline(always)]
            fn from_fn<F>(arch: A, mut f: F) -> Self
            where
                F: FnMut(usize) -> bool,
            {
                let mut x: $repr = 0;
                for i in 0..$N {
                    if f(i) {
                        x |= 1 << i;
                    }
                }
                Self(x, arch)
            }

            #[inline(always)]
            fn get(&self, i: usize) -> bool {
                debug_assert!(i < $N, "lane {} out of bounds for width {}", i, $N);
                (self.0 >> i) & 1 == 1
            }

            #[inline(always)]
            fn put(&mut self, i: usize, value: bool) {
                debug_assert!(i < $N, "lane {} out of bounds for width {}", i, $N);
                if value {
                    self.0 |= 1 << i;
                } else {
                    self.0 &= !(1 << i);
                }
            }
        }

        impl<A> SIMDMask for BitMask<$N, A>
        where
            A: Architecture<Lanes = Const<$N>>,
        {
            type Underlying = $repr;

            #[inline(always)]
            fn to_underlying(self) -> $repr {
                self.0
            }

            #[inline(always)]
            fn from_underlying(arch: A, value: $repr) -> Self {
                Self(value & (lane_mask($N) as $repr), arch)
            }

            #[inline(always)]
            fn movemask(self) -> u32 {
                self.0.into()
            }

            #[inline(always)]
            fn from_movemask(arch: A, bits: u32) -> Self {
                Self((bits & lane_mask($N)) as $repr, arch)
            }
        }

        impl<A: Architecture> std::ops::BitAnd for BitMask<$N, A> {
            type Output = Self;
            #[inline(always)]
            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0, self.1)
            }
        }

        impl<A: Architecture> std::ops::BitOr for BitMask<$N, A> {
            type Output = Self;
            #[inline(always)]
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0, self.1)
            }
        }

        impl<A: Architecture> std::ops::BitXor for BitMask<$N, A> {
            type Output = Self;
            #[inline(always)]
            fn bitxor(self, rhs: Self) -> Self {
                Self(self.0 ^ rhs.0, self.1)
            }
        }

        impl<A: Architecture> std::ops::Not for BitMask<$N, A> {
            type Output = Self;
            #[inline(always)]
            fn not(self) -> Self {
                Self(self.0 ^ (lane_mask($N) as $repr), self.1)
            }
        }
    };
}

impl_bitmask!(1, u8);
impl_bitmask!(2, u8);
impl_bitmask!(4, u8);
impl_bitmask!(8, u8);
impl_bitmask!(16, u16);
impl_bitmask!(32, u32);

///////////
// Tests //
///////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::Generic;

    #[test]
    fn test_lane_mask() {
        assert_eq!(lane_mask(0), 0);
        assert_eq!(lane_mask(1), 0b1);
        assert_eq!(lane_mask(4), 0xf);
        assert_eq!(lane_mask(16), 0xffff);
        assert_eq!(lane_mask(32), u32::MAX);
        assert_eq!(lane_mask(40), u32::MAX);
    }

    #[test]
    fn test_active_lanes() {
        let lanes: Vec<usize> = ActiveLanes::new(0b1010_0101).collect();
        assert_eq!(lanes, vec![0, 2, 5, 7]);
        assert_eq!(ActiveLanes::new(0b1010_0101).len(), 4);
        assert_eq!(ActiveLanes::new(0).next(), None);

        let lanes: Vec<usize> = ActiveLanes::new(1 << 31).collect();
        assert_eq!(lanes, vec![31]);
    }

    #[test]
    fn test_not_respects_width() {
        let arch = Generic::<4>::new();
        let m = BitMask::<4, _>::from_movemask(arch, 0b0101);
        assert_eq!((!m).movemask(), 0b1010);
        assert_eq!((!BitMask::<4, _>::default(arch)).movemask(), 0xf);
    }

    #[test]
    fn test_from_movemask_truncates() {
        let arch = Generic::<8>::new();
        let m = BitMask::<8, _>::from_movemask(arch, 0xffff_ff0f);
        assert_eq!(m.movemask(), 0x0f);
        assert!(!m.all());
        assert!(m.any());
        assert_eq!(m.count(), 4);
    }

    #[test]
    fn test_put_get() {
        let arch = Generic::<16>::new();
        let mut m = BitMask::<16, _>::default(arch);
        m.put(3, true);
        m.put(15, true);
        assert!(m.get(3));
        assert!(m.get(15));
        assert!(!m.get(4));
        m.put(3, false);
        assert_eq!(m.movemask(), 1 << 15);
        assert_eq!(m.first(), Some(15));
    }

    #[test]
    fn test_keep_first() {
        let arch = Generic::<32>::new();
        assert_eq!(BitMask::<32, _>::keep_first(arch, 0).movemask(), 0);
        assert_eq!(BitMask::<32, _>::keep_first(arch, 5).movemask(), 0b11111);
        assert!(BitMask::<32, _>::keep_first(arch, 32).all());
        assert!(BitMask::<32, _>::keep_first(arch, 100).all());
    }
}
