/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! # Architecture Descriptors
//!
//! An [`Architecture`] is a zero-sized, compile-time constant bundle describing one
//! hardware target: its lane count, alignment, capability flags, and the range of
//! instruction sets ([`Isa`]) it may run on.
//!
//! Every lane vector is uniquely associated with an architecture, and an instance of the
//! architecture must be presented to construct one. Safe instances are obtained through
//! [`Architecture::new_checked`], [`require`], the dispatch functions, or [`current`]
//! (which only uses features enabled for the compilation target).
//!
//! ## Descriptors
//!
//! * [`Generic<N>`]: A portable fallback of any supported width. Always available.
//! * `x86_64::Avx4`: 4 lanes on 128-bit AVX registers.
//! * `x86_64::Avx2x8`: 8 lanes on 256-bit AVX2 registers, with gather support.
//! * `x86_64::Avx512x16`: 16 lanes on 512-bit AVX-512 registers with bit-mask predicates.
//!
//! ## Runtime Detection
//!
//! [`Isa::detect`] probes the running processor once and caches the result. The
//! environment variable named by [`MAX_ISA_VAR`] may cap the detected level, which is
//! useful for exercising fallback paths on capable hardware.

use std::{
    fmt::{self, Debug},
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
};

use thiserror::Error;

use crate::{
    bitmask::lane_mask,
    constant::SupportedLaneCount,
    traits::SIMDMask,
};

mod generic;
pub use generic::Generic;

/// The portable fallback used when no hardware descriptor applies.
pub type Scalar = Generic<1>;

/////////
// Isa //
/////////

/// Instruction set levels, ordered so that every level implies all levels below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Isa {
    /// No vector extensions.
    Scalar,
    /// AVX with SSE 4.1.
    Avx,
    /// AVX 2.
    Avx2,
    /// AVX-512 Foundation.
    Avx512,
}

/// Environment variable capping the detected [`Isa`].
///
/// Accepts the same names as [`Isa::from_str`]. Unrecognized values are ignored with a
/// warning.
pub const MAX_ISA_VAR: &str = "DISKANN_LANES_MAX_ISA";

// Cache for the resolved `Isa`.
//
// 0: Uninitialized
// n: `Isa` with discriminant `n - 1`
static ISA_NUMBER: AtomicU64 = AtomicU64::new(ISA_UNINITIALIZED);
const ISA_UNINITIALIZED: u64 = 0;

impl Isa {
    /// The highest supported level.
    pub const MAX: Isa = Isa::Avx512;

    const ALL: [Isa; 4] = [Isa::Scalar, Isa::Avx, Isa::Avx2, Isa::Avx512];

    /// Return the lowercase name of the level.
    pub const fn as_str(self) -> &'static str {
        match self {
            Isa::Scalar => "scalar",
            Isa::Avx => "avx",
            Isa::Avx2 => "avx2",
            Isa::Avx512 => "avx512",
        }
    }

    const fn number(self) -> u64 {
        self as u64 + 1
    }

    fn from_number(number: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|isa| isa.number() == number)
    }

    /// Return the level supported by the running processor.
    ///
    /// The first call probes the hardware and applies the cap from [`MAX_ISA_VAR`]. The
    /// result is cached for all later calls.
    #[inline]
    pub fn detect() -> Self {
        match Self::from_number(ISA_NUMBER.load(Ordering::Relaxed)) {
            Some(isa) => isa,
            None => resolve_isa(),
        }
    }

    /// Probe the running processor without consulting the cache or [`MAX_ISA_VAR`].
    pub fn probe() -> Self {
        cfg_if::cfg_if! {
            if #[cfg(target_arch = "x86_64")] {
                x86_64::probe()
            } else {
                Isa::Scalar
            }
        }
    }
}

impl fmt::Display for Isa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized [`Isa`] name.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
#[error("unrecognized instruction set \"{text}\" (expected scalar, avx, avx2 or avx512)")]
pub struct ParseIsaError {
    text: String,
}

impl ParseIsaError {
    /// The rejected input.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl FromStr for Isa {
    type Err = ParseIsaError;

    /// Parse a level name. Matching ignores case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|isa| isa.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ParseIsaError { text: s.to_owned() })
    }
}

/// Read the cap configured through [`MAX_ISA_VAR`], if any.
fn configured_max_isa() -> Option<Isa> {
    let value = std::env::var(MAX_ISA_VAR).ok()?;
    match value.parse::<Isa>() {
        Ok(isa) => Some(isa),
        Err(err) => {
            tracing::warn!(variable = MAX_ISA_VAR, %err, "ignoring instruction set cap");
            None
        }
    }
}

#[inline(never)]
fn resolve_isa() -> Isa {
    let probed = Isa::probe();
    let isa = match configured_max_isa() {
        Some(cap) if cap < probed => {
            tracing::info!(%probed, %cap, "instruction set capped by {}", MAX_ISA_VAR);
            cap
        }
        _ => probed,
    };
    ISA_NUMBER.store(isa.number(), Ordering::Relaxed);
    tracing::debug!(%isa, "resolved runtime instruction set");
    isa
}

/// Error returned by [`require`] when the running processor cannot support an
/// architecture.
#[derive(Debug, Clone, Copy, Error)]
#[non_exhaustive]
#[error("architecture {name} requires {required} but the processor provides {detected}")]
pub struct UnavailableError {
    name: &'static str,
    required: Isa,
    detected: Isa,
}

impl UnavailableError {
    /// The name of the requested architecture.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The minimum level the architecture needs.
    pub fn required(&self) -> Isa {
        self.required
    }

    /// The level reported by [`Isa::detect`].
    pub fn detected(&self) -> Isa {
        self.detected
    }
}

/// Obtain an instance of `A` if the running processor supports it.
pub fn require<A: Architecture>() -> Result<A, UnavailableError> {
    A::new_checked().ok_or_else(|| UnavailableError {
        name: A::NAME,
        required: A::MIN_ISA,
        detected: Isa::detect(),
    })
}

///////////////
// Alignment //
///////////////

macro_rules! define_align {
    ($name:ident, $bytes:literal) => {
        #[doc = concat!("A zero-sized type with ", stringify!($bytes), "-byte alignment.")]
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
        #[repr(align($bytes))]
        pub struct $name;

        const _: () = assert!(std::mem::size_of::<$name>() == 0);
        const _: () = assert!(std::mem::align_of::<$name>() == $bytes);
    };
}

define_align!(Align16, 16);
define_align!(Align32, 32);
define_align!(Align64, 64);

//////////////////
// Architecture //
//////////////////

mod sealed {
    pub trait Sealed: std::fmt::Debug + Copy + PartialEq + Send + Sync + 'static {}
}

pub(crate) use sealed::Sealed;

/// A compile-time description of one vector target.
///
/// Derived constants (`WIDTH_MASK`, `SHIFT` and `SHIFT_MASK`) provide fast division and
/// modulo by the width.
pub trait Architecture: sealed::Sealed {
    /// A human readable name.
    const NAME: &'static str;

    /// The number of lanes in every vector of this architecture.
    const WIDTH: usize;

    /// A mask with the lowest `WIDTH` bits set.
    const WIDTH_MASK: u32 = lane_mask(Self::WIDTH);

    /// `log2(WIDTH)`.
    const SHIFT: u32 = Self::WIDTH.trailing_zeros();

    /// `WIDTH - 1`.
    const SHIFT_MASK: usize = Self::WIDTH - 1;

    /// The alignment in bytes of the hardware register backing a vector.
    const ALIGNMENT: usize;

    /// Whether vectors may use AVX instructions.
    const ALLOW_AVX: bool;

    /// Whether vectors may use AVX 2 instructions.
    const ALLOW_AVX2: bool;

    /// Whether vectors may use AVX-512 instructions.
    const ALLOW_AVX512: bool;

    /// The lowest level this architecture runs on.
    const MIN_ISA: Isa;

    /// The highest level this architecture runs on.
    const MAX_ISA: Isa = Isa::MAX;

    /// `Const<WIDTH>`.
    type Lanes: SupportedLaneCount;

    /// The mask vector type.
    type Mask: SIMDMask<Arch = Self>;

    /// A zero-sized type with alignment `ALIGNMENT`.
    type Align: Debug + Default + Copy + Send + Sync + 'static;

    /// Return whether a processor supporting `isa` can run this architecture.
    ///
    /// This is a range check against `MIN_ISA..=MAX_ISA`, so it is monotonic in `isa` up
    /// to `MAX_ISA`.
    #[inline(always)]
    fn available(isa: Isa) -> bool {
        Self::MIN_ISA <= isa && isa <= Self::MAX_ISA
    }

    /// Return an instance of the architecture if it is available on the running
    /// processor.
    fn new_checked() -> Option<Self>;

    /// Run the provided closure targeting this architecture.
    ///
    /// This function is always safe to call, but the function `f` likely needs to be
    /// inlined into `run` for the correct target features to be applied.
    fn run<F, R>(self, f: F) -> R
    where
        F: Target<Self, R>;

    /// Run the provided closure targeting this architecture with an additional argument.
    fn run1<F, T0, R>(self, f: F, x0: T0) -> R
    where
        F: Target1<Self, R, T0>;

    /// Run the provided closure targeting this architecture with two additional arguments.
    fn run2<F, T0, T1, R>(self, f: F, x0: T0, x1: T1) -> R
    where
        F: Target2<Self, R, T0, T1>;
}

/////////////
// Targets //
/////////////

/// A functor that targets a particular architecture, accepting no additional arguments.
pub trait Target<A, R>
where
    A: Architecture,
{
    /// Run the operation with the provided `Architecture`.
    fn run(self, arch: A) -> R;
}

/// A functor that targets a particular architecture, accepting one additional argument.
pub trait Target1<A, R, T0>
where
    A: Architecture,
{
    /// Run the operation with the provided `Architecture`.
    fn run(self, arch: A, x0: T0) -> R;
}

/// A functor that targets a particular architecture, accepting two additional arguments.
pub trait Target2<A, R, T0, T1>
where
    A: Architecture,
{
    /// Run the operation with the provided `Architecture`.
    fn run(self, arch: A, x0: T0, x1: T1) -> R;
}

/// Run the closure with code generated for the specified architecture.
///
/// Note that if the body of the closure is not inlined, this will likely have no effect.
impl<A, R, F> Target<A, R> for F
where
    A: Architecture,
    F: FnOnce() -> R,
{
    #[inline]
    fn run(self, _: A) -> R {
        (self)()
    }
}

impl<A, R, T0, F> Target1<A, R, T0> for F
where
    A: Architecture,
    F: FnOnce(T0) -> R,
{
    #[inline]
    fn run(self, _: A, x0: T0) -> R {
        (self)(x0)
    }
}

impl<A, R, T0, T1, F> Target2<A, R, T0, T1> for F
where
    A: Architecture,
    F: FnOnce(T0, T1) -> R,
{
    #[inline]
    fn run(self, _: A, x0: T0, x1: T1) -> R {
        (self)(x0, x1)
    }
}

////////////////////////////
// Architecture Selection //
////////////////////////////

cfg_if::cfg_if! {
    if #[cfg(target_arch = "x86_64")] {
        pub mod x86_64;

        pub use x86_64::current;
        pub use x86_64::Current;

        pub use x86_64::dispatch;
        pub use x86_64::dispatch1;
        pub use x86_64::dispatch2;
    } else {
        /// The type of the [`Architecture`] most compatible with the program's
        /// compilation target.
        pub type Current = Scalar;

        /// Return the [`Architecture`] most compatible with the program's compilation
        /// target.
        pub const fn current() -> Current {
            Scalar::new()
        }

        /// Run `f` on the richest available architecture. Only [`Scalar`] exists here.
        #[inline]
        pub fn dispatch<T, R>(f: T) -> R
        where
            T: Target<Scalar, R>,
        {
            f.run(Scalar::new())
        }

        /// Run `f` on the richest available architecture. Only [`Scalar`] exists here.
        #[inline]
        pub fn dispatch1<T, T0, R>(f: T, x0: T0) -> R
        where
            T: Target1<Scalar, R, T0>,
        {
            f.run(Scalar::new(), x0)
        }

        /// Run `f` on the richest available architecture. Only [`Scalar`] exists here.
        #[inline]
        pub fn dispatch2<T, T0, T1, R>(f: T, x0: T0, x1: T1) -> R
        where
            T: Target2<Scalar, R, T0, T1>,
        {
            f.run(Scalar::new(), x0, x1)
        }
    }
}

///////////
// Tests //
///////////
