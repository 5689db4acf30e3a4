/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Shared drivers for the unit tests.
//!
//! Vector implementations are checked against the scalar reference semantics on seeded
//! random inputs. Hardware specific tests obtain their architecture through
//! `new_checked_uncached`, which consults [`test_min_isa`].

use std::sync::OnceLock;

use half::f16;
use rand::{Rng, rngs::StdRng};

use crate::{
    arch::{Architecture, Isa},
    traits::{Element, SIMDMask, SIMDPartialOrd, SIMDVector},
};

pub(crate) mod loader;

/// The number of random trials for each operator.
pub(crate) const NUM_TRIALS: usize = 64;

/// The environment variable naming the lowest [`Isa`] that hardware tests must exercise.
///
/// When set, tests for architectures at or below this level panic instead of silently
/// skipping on hardware that cannot run them.
pub(crate) const TEST_MIN_ISA_VAR: &str = "DISKANN_LANES_TEST_MIN_ISA";

/// Return the level configured by [`TEST_MIN_ISA_VAR`].
///
/// # Panics
///
/// Panics if the variable holds an unrecognized level.
pub(crate) fn test_min_isa() -> Option<Isa> {
    static REQUESTED: OnceLock<Option<Isa>> = OnceLock::new();
    *REQUESTED.get_or_init(|| {
        let value = std::env::var(TEST_MIN_ISA_VAR).ok()?;
        match value.parse::<Isa>() {
            Ok(isa) => Some(isa),
            Err(err) => panic!("{TEST_MIN_ISA_VAR}: {err}"),
        }
    })
}

/// Install a subscriber writing through the test harness for the current thread.
///
/// The filter is taken from `RUST_LOG` and defaults to `info`.
pub(crate) fn init_test_subscriber() -> tracing::subscriber::DefaultGuard {
    use tracing_subscriber::{
        EnvFilter, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_test_writer(),
        )
        .set_default()
}

////////////////////
// Random Vectors //
////////////////////

/// Scalars with a distribution suitable for property tests.
pub(crate) trait RandomScalar: Element + PartialEq {
    fn random(rng: &mut StdRng) -> Self;

    /// A non-zero value used to repair divisors.
    fn one() -> Self;

    /// Value equality where NaN matches NaN.
    fn same_as(self, other: Self) -> bool {
        self == other
    }
}

macro_rules! random_integer {
    ($($T:ty),*) => {
        $(
            impl RandomScalar for $T {
                fn random(rng: &mut StdRng) -> Self {
                    // Bias toward small magnitudes so that some lanes collide.
                    // Lanes hold the low bits of a 64-bit draw, which also covers the
                    // pointer-sized types.
                    if rng.random_bool(0.25) {
                        rng.random_range(0..8) as $T
                    } else {
                        rng.random::<u64>() as $T
                    }
                }

                fn one() -> Self {
                    1
                }
            }
        )*
    };
}

random_integer!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

macro_rules! random_float {
    ($($T:ty),*) => {
        $(
            impl RandomScalar for $T {
                fn random(rng: &mut StdRng) -> Self {
                    if rng.random_bool(0.25) {
                        rng.random_range(0..8) as $T
                    } else {
                        rng.random_range(-100.0..100.0)
                    }
                }

                fn one() -> Self {
                    1.0
                }

                fn same_as(self, other: Self) -> bool {
                    (self.is_nan() && other.is_nan()) || self.to_bits() == other.to_bits()
                }
            }
        )*
    };
}

random_float!(f32, f64);

impl RandomScalar for f16 {
    fn random(rng: &mut StdRng) -> Self {
        f16::from_f32(f32::random(rng))
    }

    fn one() -> Self {
        f16::ONE
    }

    fn same_as(self, other: Self) -> bool {
        (self.is_nan() && other.is_nan()) || self.to_bits() == other.to_bits()
    }
}

impl RandomScalar for bool {
    fn random(rng: &mut StdRng) -> Self {
        rng.random()
    }

    fn one() -> Self {
        true
    }
}

/// Vectors whose lanes can be drawn at random.
pub(crate) trait RandomLanes: SIMDVector {
    fn random_lanes(arch: Self::Arch, rng: &mut StdRng) -> Self;
}

impl<V> RandomLanes for V
where
    V: SIMDVector,
    V::Scalar: RandomScalar,
{
    fn random_lanes(arch: Self::Arch, rng: &mut StdRng) -> Self {
        V::from_fn(arch, |_| <V::Scalar as RandomScalar>::random(rng))
    }
}

/// Whether a right-hand side must avoid zero lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rhs {
    Any,
    NonZero,
}

/////////////
// Drivers //
/////////////

/// Check `vector(x, y)[i] == scalar(x[i], y[i])` for random `x` and `y`.
pub(crate) fn check_binary_op<V, F, G>(
    arch: V::Arch,
    rng: &mut StdRng,
    name: &str,
    rhs: Rhs,
    vector: F,
    scalar: G,
) where
    V: SIMDVector,
    V::Scalar: RandomScalar,
    F: Fn(V, V) -> V,
    G: Fn(V::Scalar, V::Scalar) -> V::Scalar,
{
    for trial in 0..NUM_TRIALS {
        let x = V::random_lanes(arch, rng);
        let mut y = V::random_lanes(arch, rng);
        if rhs == Rhs::NonZero {
            for i in 0..V::LANES {
                if y.get(i) == <V::Scalar as Element>::zero() {
                    y.put(i, <V::Scalar as RandomScalar>::one());
                }
            }
        }

        let z = vector(x, y);
        for i in 0..V::LANES {
            let expected = scalar(x.get(i), y.get(i));
            assert!(
                expected.same_as(z.get(i)),
                "{name} failed in lane {i} of trial {trial}: {:?} and {:?} gave {:?}, \
                 expected {:?}",
                x.get(i),
                y.get(i),
                z.get(i),
                expected,
            );
        }
    }
}

/// Check `vector(x, n)[i] == scalar(x[i], n)` for random `x` and every amount `n` up to
/// a few past the bit width of the scalar.
pub(crate) fn check_shift_op<V, F, G>(
    arch: V::Arch,
    rng: &mut StdRng,
    name: &str,
    vector: F,
    scalar: G,
) where
    V: SIMDVector,
    V::Scalar: RandomScalar,
    F: Fn(V, u32) -> V,
    G: Fn(V::Scalar, u32) -> V::Scalar,
{
    let bits = 8 * std::mem::size_of::<V::Scalar>() as u32;
    for amount in 0..(bits + 3) {
        let x = V::random_lanes(arch, rng);
        let z = vector(x, amount);
        for i in 0..V::LANES {
            let expected = scalar(x.get(i), amount);
            assert!(
                expected.same_as(z.get(i)),
                "{name} by {amount} failed in lane {i}: {:?} gave {:?}, expected {:?}",
                x.get(i),
                z.get(i),
                expected,
            );
        }
    }
}

/// Check every lane-wise comparison against the scalar comparison.
pub(crate) fn check_comparisons<V>(arch: V::Arch, rng: &mut StdRng)
where
    V: SIMDPartialOrd<Mask = <V::Arch as Architecture>::Mask> + SIMDVector,
    V::Scalar: RandomScalar + PartialOrd,
{
    for _ in 0..NUM_TRIALS {
        let x = V::random_lanes(arch, rng);
        let mut y = V::random_lanes(arch, rng);

        // Copy some lanes over to exercise equality.
        for i in 0..V::LANES {
            if rng.random_bool(0.3) {
                y.put(i, x.get(i));
            }
        }

        let check = |mask: <V::Arch as Architecture>::Mask,
                     name: &str,
                     f: fn(&V::Scalar, &V::Scalar) -> bool| {
            let expected = (0..V::LANES).fold(0u32, |bits, i| {
                bits | (u32::from(f(&x.get(i), &y.get(i))) << i)
            });
            assert_eq!(mask.movemask(), expected, "{name} failed for {x:?} and {y:?}");
        };

        check(x.eq_simd(y), "eq", <V::Scalar as PartialEq>::eq);
        check(x.ne_simd(y), "ne", <V::Scalar as PartialEq>::ne);
        check(x.lt_simd(y), "lt", <V::Scalar as PartialOrd>::lt);
        check(x.le_simd(y), "le", <V::Scalar as PartialOrd>::le);
        check(x.gt_simd(y), "gt", <V::Scalar as PartialOrd>::gt);
        check(x.ge_simd(y), "ge", <V::Scalar as PartialOrd>::ge);
    }
}

/// Check a mask type against a bit-for-bit model of its lanes.
pub(crate) fn check_mask<M>(arch: M::Arch, rng: &mut StdRng)
where
    M: SIMDMask,
{
    let width = crate::bitmask::lane_mask(M::LANES);
    for _ in 0..NUM_TRIALS {
        let a: u32 = rng.random::<u32>() & width;
        let b: u32 = rng.random::<u32>() & width;
        let x = M::from_movemask(arch, a);
        let y = M::from_movemask(arch, b);

        assert_eq!(x.movemask(), a);
        assert_eq!(x.any(), a != 0);
        assert_eq!(x.all(), a == width);
        assert_eq!(x.count(), a.count_ones() as usize);

        assert_eq!((x & y).movemask(), a & b);
        assert_eq!((x | y).movemask(), a | b);
        assert_eq!((x ^ y).movemask(), a ^ b);
        assert_eq!((!x).movemask(), !a & width);

        for i in 0..M::LANES {
            assert_eq!(x.get(i), (a >> i) & 1 == 1);
        }

        let mut visited = Vec::new();
        x.foreach_active(|i| visited.push(i));
        let expected: Vec<usize> = (0..M::LANES).filter(|i| (a >> i) & 1 == 1).collect();
        assert_eq!(visited, expected);

        let mut z = M::default(arch);
        for i in x.active() {
            z.put(i, true);
        }
        assert_eq!(z.movemask(), a);
    }
}

/// Run the operator checks for one or more categories:
///
/// * `arith`: `+ - * /` (divisors avoid zero).
/// * `bits`: `& | ^`.
/// * `shifts`: `<<` and `>>` by a scalar.
/// * `neg`: unary `-`.
macro_rules! check_ops {
    ($V:ty, $arch:expr, $rng:expr; $($cat:ident),+) => {
        $($crate::test_utils::check_ops!(@$cat $V, $arch, $rng);)+
    };
    (@arith $V:ty, $arch:expr, $rng:expr) => {{
        use $crate::{reference::ReferenceScalarOps, test_utils::{Rhs, check_binary_op}};
        let (arch, rng) = ($arch, $rng);
        check_binary_op::<$V, _, _>(
            arch, rng, "add", Rhs::Any, |a, b| a + b, |a, b| a.expected_add_(b),
        );
        check_binary_op::<$V, _, _>(
            arch, rng, "sub", Rhs::Any, |a, b| a - b, |a, b| a.expected_sub_(b),
        );
        check_binary_op::<$V, _, _>(
            arch, rng, "mul", Rhs::Any, |a, b| a * b, |a, b| a.expected_mul_(b),
        );
        check_binary_op::<$V, _, _>(
            arch, rng, "div", Rhs::NonZero, |a, b| a / b, |a, b| a.expected_div_(b),
        );
    }};
    (@bits $V:ty, $arch:expr, $rng:expr) => {{
        use $crate::test_utils::{Rhs, check_binary_op};
        check_binary_op::<$V, _, _>($arch, $rng, "and", Rhs::Any, |a, b| a & b, |a, b| a & b);
        check_binary_op::<$V, _, _>($arch, $rng, "or", Rhs::Any, |a, b| a | b, |a, b| a | b);
        check_binary_op::<$V, _, _>($arch, $rng, "xor", Rhs::Any, |a, b| a ^ b, |a, b| a ^ b);
        check_binary_op::<$V, _, _>($arch, $rng, "not", Rhs::Any, |a, _| !a, |a, _| !a);
    }};
    (@shifts $V:ty, $arch:expr, $rng:expr) => {{
        use $crate::{reference::ReferenceShifts, test_utils::check_shift_op};
        check_shift_op::<$V, _, _>($arch, $rng, "shl", |a, n| a << n, |a, n| a.expected_shl_(n));
        check_shift_op::<$V, _, _>($arch, $rng, "shr", |a, n| a >> n, |a, n| a.expected_shr_(n));
    }};
    (@neg $V:ty, $arch:expr, $rng:expr) => {{
        use $crate::{reference::ReferenceNeg, test_utils::{Rhs, check_binary_op}};
        check_binary_op::<$V, _, _>(
            $arch, $rng, "neg", Rhs::Any, |a, _| -a, |a, _| a.expected_neg_(),
        );
    }};
}

pub(crate) use check_ops;
