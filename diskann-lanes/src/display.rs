/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Diagnostic formatting of lane vectors as `{ e0, e1, ... }`.
//!
//! Formatter flags (width, precision, sign) apply to each lane.

use std::fmt::{self, Display, Formatter};

use num_complex::Complex;

use crate::{
    arch::Architecture,
    bitmask::BitMask,
    composite::{ComplexLanes, Pair, Tuple3, Tuple4},
    constant::{Const, SupportedLaneCount},
    emulated::Emulated,
    traits::SIMDVector,
};

/// Write `lanes` in braces, formatting each with `each`.
pub(crate) fn write_lanes<I, F>(f: &mut Formatter<'_>, lanes: I, mut each: F) -> fmt::Result
where
    I: IntoIterator,
    F: FnMut(&mut Formatter<'_>, I::Item) -> fmt::Result,
{
    f.write_str("{ ")?;
    for (i, lane) in lanes.into_iter().enumerate() {
        if i != 0 {
            f.write_str(", ")?;
        }
        each(f, lane)?;
    }
    f.write_str(" }")
}

/// Write the lanes of `v` in braces using their `Display` implementation.
pub(crate) fn display_lanes<V>(f: &mut Formatter<'_>, v: V) -> fmt::Result
where
    V: SIMDVector,
    V::Scalar: Display,
{
    write_lanes(f, v.lanes(), |f, x| Display::fmt(&x, f))
}

impl<T, const N: usize, A> Display for Emulated<T, N, A>
where
    T: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_lanes(f, self.as_slice(), |f, x| Display::fmt(x, f))
    }
}

impl<const N: usize, A> Display for BitMask<N, A>
where
    Const<N>: SupportedLaneCount,
    A: Architecture,
    Self: SIMDVector<Scalar = bool>,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        display_lanes(f, *self)
    }
}

impl<V0, V1> Display for Pair<V0, V1>
where
    Self: SIMDVector,
    V0: SIMDVector<Scalar: Display>,
    V1: SIMDVector<Scalar: Display>,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_lanes(f, 0..V0::LANES, |f, i| {
            f.write_str("(")?;
            Display::fmt(&self.first.get(i), f)?;
            f.write_str(", ")?;
            Display::fmt(&self.second.get(i), f)?;
            f.write_str(")")
        })
    }
}

macro_rules! display_tuple {
    ($name:ident, $V0:ident, $($V:ident $i:tt),+) => {
        impl<$V0, $($V),+> Display for $name<$V0, $($V),+>
        where
            Self: SIMDVector,
            $V0: SIMDVector<Scalar: Display>,
            $($V: SIMDVector<Scalar: Display>),+
        {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write_lanes(f, 0..$V0::LANES, |f, i| {
                    f.write_str("(")?;
                    Display::fmt(&self.0.get(i), f)?;
                    $(
                        f.write_str(", ")?;
                        Display::fmt(&self.$i.get(i), f)?;
                    )+
                    f.write_str(")")
                })
            }
        }
    };
}

display_tuple!(Tuple3, V0, V1 1, V2 2);
display_tuple!(Tuple4, V0, V1 1, V2 2, V3 3);

impl<V> Display for ComplexLanes<V>
where
    V: SIMDVector,
    Complex<V::Scalar>: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        display_lanes(f, *self)
    }
}
