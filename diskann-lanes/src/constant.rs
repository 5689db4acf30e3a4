/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::fmt::Debug;

/// Move a const-generic into the type domain to work around issues with the use and
/// compile-time computation involving const-generic parameters.
pub struct Const<const N: usize> {}

/// A trait to model compile-time constants.
pub trait Constant {
    type Type;
    fn value() -> Self::Type;
}

impl<const N: usize> Constant for Const<N> {
    type Type = usize;
    fn value() -> Self::Type {
        N
    }
}

/// Lane counts that an architecture descriptor may use.
///
/// Only powers of two up to 32 are supported. Any other width is rejected at compile time
/// since no implementation exists for it.
///
/// * `BitMaskType`: The smallest unsigned integer holding one bit per lane.
/// * `Array<T>`: The fixed-size array with one `T` per lane.
pub trait SupportedLaneCount: 'static {
    type BitMaskType: Default + Copy + Debug + Eq + Into<u32>;
    type Array<T: Copy>: Copy + AsRef<[T]> + AsMut<[T]>;

    /// The number of lanes.
    const LANES: usize;

    /// Construct an array by calling `f` once for each lane in ascending order.
    fn array_from_fn<T, F>(f: F) -> Self::Array<T>
    where
        T: Copy,
        F: FnMut(usize) -> T;
}

macro_rules! supported_lane_count {
    ($N:literal, $repr:ty) => {
        impl SupportedLaneCount for Const<$N> {
            type BitMaskType = $repr;
            type Array<T: Copy> = [T; $N];

            const LANES: usize = $N;

            #[inline(always)]
            fn array_from_fn<T, F>(f: F) -> [T; $N]
            where
                T: Copy,
                F: FnMut(usize) -> T,
            {
                core::array::from_fn(f)
            }
        }
    };
}

supported_lane_count!(1, u8);
supported_lane_count!(2, u8);
supported_lane_count!(4, u8);
supported_lane_count!(8, u8);
supported_lane_count!(16, u16);
supported_lane_count!(32, u32);

/// Alias for the lane array of `T` with length `N`.
pub type ArrayOf<N, T> = <N as SupportedLaneCount>::Array<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_const() {
        let x: usize = Const::<1>::value();
        assert_eq!(x, 1);

        let x: usize = Const::<8>::value();
        assert_eq!(x, 8);

        let x: usize = Const::<32>::value();
        assert_eq!(x, 32);
    }

    #[test]
    fn test_array_from_fn() {
        let x: [usize; 4] = <Const<4> as SupportedLaneCount>::array_from_fn(|i| 10 * i);
        assert_eq!(x, [0, 10, 20, 30]);

        let x = <Const<16> as SupportedLaneCount>::array_from_fn(|i| i as u8);
        assert_eq!(x.as_ref().len(), 16);
        assert_eq!(x[15], 15);
    }

    #[test]
    fn test_lanes_constant() {
        assert_eq!(<Const<1> as SupportedLaneCount>::LANES, 1);
        assert_eq!(<Const<2> as SupportedLaneCount>::LANES, 2);
        assert_eq!(<Const<16> as SupportedLaneCount>::LANES, 16);
        assert_eq!(<Const<32> as SupportedLaneCount>::LANES, 32);
    }
}
