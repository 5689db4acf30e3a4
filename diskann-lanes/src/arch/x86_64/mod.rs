/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use super::{Architecture, Isa, Scalar, Target, Target1, Target2};

mod macros;

pub mod avx2;
pub mod avx4;
pub mod avx512;

pub use avx2::Avx2x8;
pub use avx4::Avx4;
pub use avx512::Avx512x16;

/// Restricts construction of the x86 descriptors to this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hidden;

/// Return the richest [`Isa`] supported by the running processor.
pub(super) fn probe() -> Isa {
    if is_x86_feature_detected!("avx") && is_x86_feature_detected!("sse4.1") {
        if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
            if is_x86_feature_detected!("avx512f") {
                Isa::Avx512
            } else {
                Isa::Avx2
            }
        } else {
            Isa::Avx
        }
    } else {
        Isa::Scalar
    }
}

/// Panic if the test configuration requires an architecture the hardware lacks.
#[cfg(test)]
fn check_required<A: Architecture>() {
    if crate::test_utils::test_min_isa().is_some_and(|min| A::MIN_ISA <= min) {
        panic!(
            "{} is required by {} but the processor only provides {}",
            A::NAME,
            crate::test_utils::TEST_MIN_ISA_VAR,
            Isa::probe(),
        );
    }
}

////////////////////////////
// Architecture Selection //
////////////////////////////

cfg_if::cfg_if! {
    if #[cfg(all(
        target_feature = "avx512f",
        target_feature = "avx2",
        target_feature = "fma",
    ))] {
        pub type Current = Avx512x16;

        pub const fn current() -> Current {
            // SAFETY: This function is gated by a CFG guard for the features needed by
            // `Avx512x16`.
            unsafe { Avx512x16::new() }
        }
    } else if #[cfg(all(target_feature = "avx2", target_feature = "fma"))] {
        pub type Current = Avx2x8;

        pub const fn current() -> Current {
            // SAFETY: This function is gated by a CFG guard for the features needed by
            // `Avx2x8`.
            unsafe { Avx2x8::new() }
        }
    } else if #[cfg(all(target_feature = "avx", target_feature = "sse4.1"))] {
        pub type Current = Avx4;

        pub const fn current() -> Current {
            // SAFETY: This function is gated by a CFG guard for the features needed by
            // `Avx4`.
            unsafe { Avx4::new() }
        }
    } else {
        /// The type of the [`Architecture`] most compatible with the program's
        /// compilation target.
        pub type Current = Scalar;

        /// Return the [`Architecture`] most compatible with the program's compilation
        /// target.
        pub const fn current() -> Current {
            Scalar::new()
        }
    }
}

//////////////
// Dispatch //
//////////////

macro_rules! impl_dispatch {
    (
        $name:ident,
        $at:ident,
        $target:ident,
        $method:ident,
        { $($x:ident)* },
        { $($A:ident)* }
    ) => {
        /// Run `f` on the richest architecture the running processor supports, with the
        /// target features of that architecture enabled.
        ///
        /// Falls back to [`Scalar`] when no vector extensions are available.
        #[inline]
        pub fn $name<T, R, $($A,)*>(f: T, $($x: $A,)*) -> R
        where
            T: $target<Avx512x16, R, $($A,)*>
                + $target<Avx2x8, R, $($A,)*>
                + $target<Avx4, R, $($A,)*>
                + $target<Scalar, R, $($A,)*>,
        {
            // SAFETY: `detect` never reports a level above the running processor.
            unsafe { $at(Isa::detect(), f, $($x,)*) }
        }

        /// Run `f` on the architecture of level `isa`.
        ///
        /// # Safety
        ///
        /// The running processor must support `isa`.
        #[inline(always)]
        unsafe fn $at<T, R, $($A,)*>(isa: Isa, f: T, $($x: $A,)*) -> R
        where
            T: $target<Avx512x16, R, $($A,)*>
                + $target<Avx2x8, R, $($A,)*>
                + $target<Avx4, R, $($A,)*>
                + $target<Scalar, R, $($A,)*>,
        {
            match isa {
                Isa::Avx512 => {
                    // SAFETY: The caller guarantees every feature `Avx512x16` needs.
                    let arch = unsafe { Avx512x16::new() };
                    // SAFETY: The features enabled by `run_with*` are present.
                    unsafe { arch.$method(f, $($x,)*) }
                }
                Isa::Avx2 => {
                    // SAFETY: The caller guarantees every feature `Avx2x8` needs.
                    let arch = unsafe { Avx2x8::new() };
                    // SAFETY: The features enabled by `run_with*` are present.
                    unsafe { arch.$method(f, $($x,)*) }
                }
                Isa::Avx => {
                    // SAFETY: The caller guarantees every feature `Avx4` needs.
                    let arch = unsafe { Avx4::new() };
                    // SAFETY: The features enabled by `run_with*` are present.
                    unsafe { arch.$method(f, $($x,)*) }
                }
                Isa::Scalar => <T as $target<Scalar, R, $($A,)*>>::run(f, Scalar::new(), $($x,)*),
            }
        }
    };
}

impl_dispatch!(dispatch, dispatch_at, Target, run_with, {}, {});
impl_dispatch!(dispatch1, dispatch1_at, Target1, run_with_1, { x0 }, { T0 });
impl_dispatch!(dispatch2, dispatch2_at, Target2, run_with_2, { x0 x1 }, { T0 T1 });

///////////
// Tests //
///////////

#[cfg(test)]
mod tests {
    use super::*;

    struct Name;

    impl<A: Architecture> Target<A, &'static str> for Name {
        fn run(self, _: A) -> &'static str {
            A::NAME
        }
    }

    impl<A: Architecture> Target1<A, String, &str> for Name {
        fn run(self, _: A, x0: &str) -> String {
            format!("{x0}:{}", A::NAME)
        }
    }

    impl<A: Architecture> Target2<A, usize, usize, usize> for Name {
        fn run(self, _: A, x0: usize, x1: usize) -> usize {
            A::WIDTH * x0 + x1
        }
    }

    fn name_of(isa: Isa) -> &'static str {
        match isa {
            Isa::Scalar => Scalar::NAME,
            Isa::Avx => Avx4::NAME,
            Isa::Avx2 => Avx2x8::NAME,
            Isa::Avx512 => Avx512x16::NAME,
        }
    }

    fn width_of(isa: Isa) -> usize {
        match isa {
            Isa::Scalar => Scalar::WIDTH,
            Isa::Avx => Avx4::WIDTH,
            Isa::Avx2 => Avx2x8::WIDTH,
            Isa::Avx512 => Avx512x16::WIDTH,
        }
    }

    #[test]
    fn test_dispatch_follows_detection() {
        let isa = Isa::detect();
        assert_eq!(dispatch(Name), name_of(isa));
        assert_eq!(dispatch1(Name, "x"), format!("x:{}", name_of(isa)));
        assert_eq!(dispatch2(Name, 2, 1), 2 * width_of(isa) + 1);
    }

    // Every level is reached without touching the detection cache, which other tests
    // read concurrently.
    #[test]
    fn test_dispatch_each_level() {
        let detected = Isa::detect();
        for isa in Isa::ALL.into_iter().filter(|isa| *isa <= detected) {
            // SAFETY: `isa` is at most the detected level.
            unsafe {
                assert_eq!(dispatch_at(isa, Name), name_of(isa), "dispatch at {isa}");
                assert_eq!(dispatch1_at(isa, Name, "y"), format!("y:{}", name_of(isa)));
                assert_eq!(dispatch2_at(isa, Name, 3, 2), 3 * width_of(isa) + 2);
            }
        }
        assert_eq!(Isa::detect(), detected);
    }

    #[test]
    fn test_probe_is_consistent() {
        let isa = probe();
        assert_eq!(Avx4::available(isa), isa >= Isa::Avx);
        assert_eq!(Avx2x8::available(isa), isa >= Isa::Avx2);
        assert_eq!(Avx512x16::available(isa), isa >= Isa::Avx512);
    }

    #[test]
    fn test_descriptor_constants() {
        assert_eq!(Avx4::WIDTH, 4);
        assert_eq!(Avx4::ALIGNMENT, 16);
        assert_eq!(Avx2x8::WIDTH, 8);
        assert_eq!(Avx2x8::SHIFT, 3);
        assert_eq!(Avx2x8::WIDTH_MASK, 0xff);
        assert_eq!(Avx512x16::WIDTH, 16);
        assert_eq!(Avx512x16::ALIGNMENT, 64);

        assert!(Avx4::ALLOW_AVX && !Avx4::ALLOW_AVX2 && !Avx4::ALLOW_AVX512);
        assert!(Avx2x8::ALLOW_AVX && Avx2x8::ALLOW_AVX2 && !Avx2x8::ALLOW_AVX512);
        assert!(Avx512x16::ALLOW_AVX && Avx512x16::ALLOW_AVX2 && Avx512x16::ALLOW_AVX512);

        assert!(!Avx4::available(Isa::Scalar));
        assert!(Avx4::available(Isa::Avx512));
        assert!(!Avx2x8::available(Isa::Avx));
        assert!(!Avx512x16::available(Isa::Avx2));

        assert_eq!(std::mem::align_of::<<Avx2x8 as Architecture>::Align>(), 32);
    }
}
