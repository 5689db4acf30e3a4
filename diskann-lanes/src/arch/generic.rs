/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use super::{Architecture, Isa, Target, Target1, Target2, sealed::Sealed};
use crate::{BitMask, Const};

/// A portable architecture with `N` lanes.
///
/// All vector operations are implemented as scalar loops over plain arrays, relying on the
/// compiler for optimization. No hardware intrinsics are invoked, so this architecture is
/// always safe to construct.
///
/// `N` must be a power of two no larger than 32.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Generic<const N: usize>;

impl<const N: usize> Generic<N> {
    pub const fn new() -> Self {
        Self
    }
}

impl<const N: usize> Sealed for Generic<N> {}

macro_rules! generic_architecture {
    ($($N:literal),* $(,)?) => {
        $(
            impl Architecture for Generic<$N> {
                const NAME: &'static str = concat!("generic<", stringify!($N), ">");
                const WIDTH: usize = $N;
                const ALIGNMENT: usize = 1;
                const ALLOW_AVX: bool = false;
                const ALLOW_AVX2: bool = false;
                const ALLOW_AVX512: bool = false;
                const MIN_ISA: Isa = Isa::Scalar;

                type Lanes = Const<$N>;
                type Mask = BitMask<$N, Self>;
                type Align = ();

                #[inline(always)]
                fn new_checked() -> Option<Self> {
                    Some(Self)
                }

                #[inline(always)]
                fn run<F, R>(self, f: F) -> R
                where
                    F: Target<Self, R>,
                {
                    f.run(self)
                }

                #[inline(always)]
                fn run1<F, T0, R>(self, f: F, x0: T0) -> R
                where
                    F: Target1<Self, R, T0>,
                {
                    f.run(self, x0)
                }

                #[inline(always)]
                fn run2<F, T0, T1, R>(self, f: F, x0: T0, x1: T1) -> R
                where
                    F: Target2<Self, R, T0, T1>,
                {
                    f.run(self, x0, x1)
                }
            }
        )*
    };
}

generic_architecture!(1, 2, 4, 8, 16, 32);

#[cfg(test)]
mod tests {
    use super::*;

    fn check<A: Architecture>(width: usize, shift: u32) {
        assert_eq!(A::WIDTH, width);
        assert_eq!(A::SHIFT, shift);
        assert_eq!(A::SHIFT_MASK, width - 1);
        assert_eq!(A::WIDTH_MASK.count_ones() as usize, width);
        assert_eq!(A::WIDTH_MASK.trailing_ones() as usize, width);
        assert_eq!(A::ALIGNMENT, 1);
        assert_eq!(std::mem::align_of::<A::Align>(), A::ALIGNMENT);
        assert!(!A::ALLOW_AVX && !A::ALLOW_AVX2 && !A::ALLOW_AVX512);
        assert!(A::available(Isa::Scalar));
        assert!(A::available(Isa::MAX));
    }

    #[test]
    fn test_constants() {
        check::<Generic<1>>(1, 0);
        check::<Generic<2>>(2, 1);
        check::<Generic<4>>(4, 2);
        check::<Generic<8>>(8, 3);
        check::<Generic<16>>(16, 4);
        check::<Generic<32>>(32, 5);

        assert_eq!(Generic::<4>::WIDTH_MASK, 0xf);
        assert_eq!(Generic::<32>::WIDTH_MASK, u32::MAX);
        assert_eq!(Generic::<8>::NAME, "generic<8>");
    }
}
