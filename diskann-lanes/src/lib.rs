/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! # Lanes - Portable Lane Vectors
//!
//! This crate provides fixed-width vectors of `W` independent lanes, parameterized by an
//! [`Architecture`] that fixes `W` at compile time and selects the hardware backend.
//!
//! ## Traits
//!
//! * [`SIMDVector`]: Creation and per-lane access for every lane vector, including masks,
//!   pointer vectors and composites.
//!
//! * [`SIMDMask`]: A lane vector of booleans. Comparisons produce masks, and every mask
//!   converts to and from a packed integer where bit `i` is lane `i`.
//!
//! * [`Architecture`]: A zero-sized descriptor of one hardware target. Every lane vector
//!   is uniquely associated with an architecture.
//!
//! * [`Lane`]: Maps an element type to its lane vector on an architecture. The alias
//!   [`LaneVector<T, A>`] names the result.
//!
//! * [`Loader`]: The gather and scatter policy of an element type on an architecture.
//!
//! ## Element Types
//!
//! Lane vectors exist for every fixed-width integer, `f16`, `f32`, `f64`, `bool`, raw
//! pointers, tuples of up to four element types ([`Pair`], [`Tuple3`], [`Tuple4`]) and
//! [`num_complex::Complex`] ([`ComplexLanes`]). Composite vectors store one lane vector per
//! field.
//!
//! ## Addressing
//!
//! * [`LaneRef`], [`LaneMut`], [`LanePtr`] and [`LanePtrMut`] refer to single lanes and
//!   walk across vector boundaries.
//!
//! * [`Pointers`] holds one address per lane. Combined with a [`Loader`] it gathers and
//!   scatters, and [`Indirect`] wraps it as a vector whose lanes are references.
//!
//! ## Safety
//!
//! Hardware intrinsics are only reachable through a register type, and a register can
//! only be built from an instance of its architecture. Architecture instances come from
//! [`Architecture::new_checked`], [`arch::require`], the dispatch functions or
//! [`arch::current`], each of which checks the running processor or the compilation
//! target. The unsafe constructors of the x86 descriptors shift that obligation to the
//! caller.
//!
//! Dereferencing addresses is the only other unsafe surface, and is confined to the
//! [`Loader`] functions and the [`Indirect`] constructors.
//!
//! # Testing and Architectural Levels
//!
//! Tests for descriptors the running processor lacks are skipped. To turn such skips into
//! failures, set
//! ```text
//! DISKANN_LANES_TEST_MIN_ISA="avx2"
//! ```
//! to require every descriptor at or below the given level. Accepted values are `scalar`,
//! `avx`, `avx2` and `avx512`.
//!
//! Independently, `DISKANN_LANES_MAX_ISA` caps runtime detection, which routes
//! [`arch::dispatch`] to lower levels on capable hardware.

mod constant;
pub use constant::{Const, Constant, SupportedLaneCount};

pub mod reference;

mod traits;
pub use traits::{Element, LaneArray, SIMDMask, SIMDPartialEq, SIMDPartialOrd, SIMDVector, Step};

mod bitmask;
pub use bitmask::{ActiveLanes, BitMask};

mod emulated;
pub use emulated::Emulated;

pub mod ops;
pub use ops::{LaneFloatLimits, LaneLimits, LaneMath};

mod element;
pub use element::{LaneIter, LaneMut, LanePtr, LanePtrMut, LaneRef, Lanes};

mod lane;
pub use lane::{Lane, LaneVector, MaskVector, PointerVector};

mod pointer;
pub use pointer::Pointers;

pub mod loader;
pub use loader::{
    Loader, all, any, foreach_active, load, load_masked, movemask, store, store_masked,
};

mod indirect;
pub use indirect::Indirect;

mod composite;
pub use composite::{ComplexLanes, Pair, Tuple3, Tuple4};

pub(crate) mod display;

/////////////////////////////
// Architecture Resolution //
/////////////////////////////

pub mod arch;
pub use arch::Architecture;

/// The current architecture that is the closest fit for the compilation target.
///
/// [`LaneVector`] and friends default to this architecture.
pub const ARCH: arch::Current = arch::current();

#[cfg(test)]
pub(crate) mod test_utils;

///////////
// Tests //
///////////

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_of_squares<A: Architecture>(arch: A, data: &[f32]) -> f32
    where
        f32: Lane<A>,
        LaneVector<f32, A>: std::ops::Mul<Output = LaneVector<f32, A>>
            + std::ops::AddAssign,
    {
        let mut acc = LaneVector::<f32, A>::default(arch);
        let mut chunks = data.chunks_exact(A::WIDTH);
        for chunk in chunks.by_ref() {
            let x = LaneVector::<f32, A>::from_slice(arch, chunk);
            acc += x * x;
        }
        acc.lanes().sum::<f32>() + chunks.remainder().iter().map(|x| x * x).sum::<f32>()
    }

    #[test]
    fn test_generic_code() {
        let data: Vec<f32> = (0..37).map(|i| i as f32).collect();
        let expected: f32 = data.iter().map(|x| x * x).sum();

        assert_eq!(sum_of_squares(arch::Scalar::new(), &data), expected);
        assert_eq!(sum_of_squares(arch::Generic::<8>::new(), &data), expected);
        assert_eq!(sum_of_squares(ARCH, &data), expected);
    }

    #[test]
    fn test_current_aliases() {
        let x: LaneVector<u32> = LaneVector::<u32>::splat(ARCH, 3);
        let m: MaskVector = x.eq_simd(LaneVector::<u32>::splat(ARCH, 3));
        assert!(m.all());

        let p: PointerVector<u32> = Pointers::null(ARCH);
        assert!(p.is_null().all());
        assert_eq!(LaneVector::<u32>::num_lanes(), <arch::Current as Architecture>::WIDTH);
    }
}
