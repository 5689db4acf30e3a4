/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use rand::{Rng, rngs::StdRng, seq::SliceRandom};

use super::{NUM_TRIALS, RandomLanes, RandomScalar};
use crate::{
    arch::Architecture,
    lane::LaneVector,
    loader::{Loader, by_lane},
    pointer::Pointers,
    traits::{SIMDMask, SIMDVector},
};

fn assert_same<V>(got: V, expected: V, context: &str)
where
    V: SIMDVector,
    V::Scalar: RandomScalar,
{
    for i in 0..V::LANES {
        assert!(
            got.get(i).same_as(expected.get(i)),
            "{context}: lane {i} is {:?}, expected {:?}",
            got.get(i),
            expected.get(i),
        );
    }
}

/// Check the loader of `T` on `A` against the per-lane policy.
///
/// * Gathers with random (possibly repeated) addresses must match [`by_lane::load`].
/// * Masked gathers must match [`by_lane::load_masked`], including the untouched
///   inactive lanes.
/// * Scatters through distinct addresses must round trip with gathers.
pub(crate) fn check_loader<T, A>(arch: A, rng: &mut StdRng)
where
    A: Architecture,
    T: Loader<A> + RandomScalar,
{
    let len = 4 * A::WIDTH;
    for trial in 0..NUM_TRIALS {
        let mut memory: Vec<T> = (0..len).map(|_| T::random(rng)).collect();
        let original = memory.clone();

        // Random gathers.
        let src = Pointers::from_slice(arch, &mut memory, |_| rng.random_range(0..len));
        let init = <LaneVector<T, A> as RandomLanes>::random_lanes(arch, rng);
        let mask = A::Mask::from_movemask(arch, rng.random());

        let mut expected = init;
        let mut got = init;
        // SAFETY: Every lane of `src` addresses `memory`.
        unsafe {
            by_lane::load(&mut expected, src);
            T::load(&mut got, src);
        }
        assert_same(got, expected, &format!("load in trial {trial}"));

        let mut expected = init;
        let mut got = init;
        // SAFETY: Every lane of `src` addresses `memory`.
        unsafe {
            by_lane::load_masked(&mut expected, src, mask);
            T::load_masked(&mut got, src, mask);
        }
        assert_same(got, expected, &format!("masked load in trial {trial}"));

        // Scatter round trips through distinct addresses.
        let mut indices: Vec<usize> = (0..len).collect();
        indices.shuffle(rng);
        let dst = Pointers::from_slice(arch, &mut memory, |i| indices[i]);

        // SAFETY: Every lane of `dst` addresses `memory`.
        let loaded = unsafe { crate::loader::load(dst) };
        // SAFETY: Every lane of `dst` addresses `memory`.
        unsafe { T::store(dst, loaded) };
        assert!(
            memory.iter().zip(original.iter()).all(|(a, b)| a.same_as(*b)),
            "storing a load changed memory in trial {trial}"
        );

        let dst = Pointers::from_slice(arch, &mut memory, |i| indices[i]);
        let values = <LaneVector<T, A> as RandomLanes>::random_lanes(arch, rng);
        // SAFETY: Every lane of `dst` addresses `memory`.
        let reloaded = unsafe {
            T::store_masked(dst, values, mask);
            T::store(dst, values);
            crate::loader::load(dst)
        };
        assert_same(reloaded, values, &format!("load after store in trial {trial}"));

        for (i, &j) in indices[..A::WIDTH].iter().enumerate() {
            assert!(memory[j].same_as(values.get(i)));
        }
        for &j in &indices[A::WIDTH..] {
            assert!(memory[j].same_as(original[j]), "untouched element {j} changed");
        }
    }
}
