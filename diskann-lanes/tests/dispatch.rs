/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use diskann_lanes::{
    Architecture, LaneVector, Loader, Pointers, SIMDMask, SIMDPartialOrd, SIMDVector,
    arch::{self, Isa, Target1},
};

/// Count the gathered elements strictly greater than `threshold`.
///
/// Lane `i` of round `r` reads `data[(r * WIDTH + i) * STRIDE % len]`.
struct CountAbove {
    threshold: i32,
}

const STRIDE: usize = 7;

impl<A> Target1<A, usize, &mut [i32]> for CountAbove
where
    A: Architecture,
    i32: Loader<A>,
    LaneVector<i32, A>: SIMDPartialOrd<Mask = A::Mask>,
{
    #[inline(always)]
    fn run(self, arch: A, data: &mut [i32]) -> usize {
        let len = data.len();
        let threshold = LaneVector::<i32, A>::splat(arch, self.threshold);
        let rounds = len.div_ceil(A::WIDTH);

        let mut count = 0;
        for r in 0..rounds {
            let src = Pointers::from_slice(arch, data, |i| ((r * A::WIDTH + i) * STRIDE) % len);
            let valid = A::Mask::keep_first(arch, len - r * A::WIDTH);

            let mut x = threshold;
            // SAFETY: Every lane of `src` addresses `data`.
            unsafe { i32::load_masked(&mut x, src, valid) };
            count += (x.gt_simd(threshold) & valid).count();
        }
        count
    }
}

fn expected(data: &[i32], threshold: i32) -> usize {
    let len = data.len();
    (0..len)
        .filter(|j| data[(j * STRIDE) % len] > threshold)
        .count()
}

#[test]
fn dispatch_matches_scalar() {
    let mut data: Vec<i32> = (0..101).map(|i| (i * 37) % 53 - 20).collect();
    for threshold in [-30, -5, 0, 12, 40] {
        let want = expected(&data, threshold);
        assert_eq!(arch::dispatch1(CountAbove { threshold }, &mut data[..]), want);
        assert_eq!(
            CountAbove { threshold }.run(arch::Scalar::new(), &mut data[..]),
            want
        );
        assert_eq!(
            arch::Generic::<8>::new().run1(CountAbove { threshold }, &mut data[..]),
            want
        );
    }
}

#[test]
fn closures_dispatch() {
    let width = arch::dispatch(|| 4usize);
    assert_eq!(width, 4);

    let doubled = arch::dispatch2(|a: u32, b: u32| 2 * (a + b), 3, 4);
    assert_eq!(doubled, 14);
}

#[test]
fn detection_is_stable() {
    let isa = Isa::detect();
    assert_eq!(isa, Isa::detect());
    assert!(isa <= Isa::probe());
    assert!(arch::Scalar::available(isa));
    assert!(arch::Scalar::new_checked().is_some());
}

#[test]
fn require_reports_missing_levels() {
    match arch::require::<arch::Current>() {
        Ok(a) => assert_eq!(a, arch::current()),
        Err(err) => {
            let message = err.to_string();
            assert!(message.contains(<arch::Current as Architecture>::NAME), "{message}");
        }
    }
    assert!(arch::require::<arch::Scalar>().is_ok());
}
