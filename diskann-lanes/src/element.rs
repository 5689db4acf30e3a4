/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Reference and pointer proxies for individual lanes.
//!
//! A lane vector is a value type. Its lanes are not separately addressable, so this
//! module provides proxies that behave like references and pointers to a single lane:
//!
//! * [`LaneRef`] and [`LaneMut`]: A reference to lane `i` of one vector.
//! * [`LanePtr`] and [`LanePtrMut`]: A cursor over the flattened lanes of a slice of
//!   vectors. Arithmetic on a cursor moves lane by lane and steps to the neighboring vector
//!   when leaving `0..LANES`, using floor division so the lane index is never negative.
//! * [`LaneIter`]: A double-ended iterator between two cursors, so iterator algorithms
//!   work unmodified across vector boundaries.
//!
//! Cursors compare and subtract by the address of the lane they point to, so cursors made
//! from overlapping subslices of one allocation agree with each other.

use std::{cmp::Ordering, iter::FusedIterator};

use crate::traits::SIMDVector;

/// Return the flattened coordinate of `(vector, lane)` for vectors of type `V`.
#[inline(always)]
fn flatten<V: SIMDVector>(vector: isize, lane: usize) -> isize {
    vector * (V::LANES as isize) + (lane as isize)
}

/// Move `(vector, lane)` by `k` lanes.
#[inline(always)]
fn advance<V: SIMDVector>(vector: isize, lane: usize, k: isize) -> (isize, usize) {
    let width = V::LANES as isize;
    let i = lane as isize + k;
    (vector + i.div_euclid(width), i.rem_euclid(width) as usize)
}

/// Resolve a signed vector index into `base`.
///
/// Panics if the index is negative or past the end.
#[inline(always)]
fn resolve(len: usize, vector: isize) -> usize {
    match usize::try_from(vector) {
        Ok(i) if i < len => i,
        _ => panic!("lane pointer at vector {vector} is outside a slice of {len} vectors"),
    }
}

////////////////////
// By-value lanes //
////////////////////

/// By-value iterator over the lanes of a vector in index order.
///
/// Created by [`SIMDVector::lanes`].
#[derive(Debug, Clone, Copy)]
pub struct Lanes<V> {
    vector: V,
    front: usize,
    back: usize,
}

impl<V: SIMDVector> Lanes<V> {
    pub(crate) fn new(vector: V) -> Self {
        Self {
            vector,
            front: 0,
            back: V::LANES,
        }
    }
}

impl<V: SIMDVector> Iterator for Lanes<V> {
    type Item = V::Scalar;

    #[inline]
    fn next(&mut self) -> Option<V::Scalar> {
        if self.front < self.back {
            let x = self.vector.get(self.front);
            self.front += 1;
            Some(x)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl<V: SIMDVector> DoubleEndedIterator for Lanes<V> {
    #[inline]
    fn next_back(&mut self) -> Option<V::Scalar> {
        if self.front < self.back {
            self.back -= 1;
            Some(self.vector.get(self.back))
        } else {
            None
        }
    }
}

impl<V: SIMDVector> ExactSizeIterator for Lanes<V> {}
impl<V: SIMDVector> FusedIterator for Lanes<V> {}

////////////////
// References //
////////////////

/// A shared reference to lane `i` of a vector.
#[derive(Debug)]
pub struct LaneRef<'a, V> {
    vector: &'a V,
    lane: usize,
}

impl<V> Clone for LaneRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for LaneRef<'_, V> {}

impl<'a, V: SIMDVector> LaneRef<'a, V> {
    /// Reference lane `lane` of `vector`.
    pub fn new(vector: &'a V, lane: usize) -> Self {
        debug_assert!(lane < V::LANES);
        Self { vector, lane }
    }

    /// Read the referenced lane.
    #[inline(always)]
    pub fn get(&self) -> V::Scalar {
        self.vector.get(self.lane)
    }

    /// The index of the referenced lane.
    pub fn lane(&self) -> usize {
        self.lane
    }
}

impl<V> PartialEq for LaneRef<'_, V>
where
    V: SIMDVector,
    V::Scalar: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

/// A mutable reference to lane `i` of a vector. Writes store through to the vector.
#[derive(Debug)]
pub struct LaneMut<'a, V> {
    vector: &'a mut V,
    lane: usize,
}

impl<'a, V: SIMDVector> LaneMut<'a, V> {
    /// Reference lane `lane` of `vector`.
    pub fn new(vector: &'a mut V, lane: usize) -> Self {
        debug_assert!(lane < V::LANES);
        Self { vector, lane }
    }

    /// Read the referenced lane.
    #[inline(always)]
    pub fn get(&self) -> V::Scalar {
        self.vector.get(self.lane)
    }

    /// Overwrite the referenced lane.
    #[inline(always)]
    pub fn set(&mut self, value: V::Scalar) {
        self.vector.put(self.lane, value)
    }

    /// Overwrite the referenced lane, returning the previous value.
    #[inline(always)]
    pub fn replace(&mut self, value: V::Scalar) -> V::Scalar {
        let old = self.get();
        self.set(value);
        old
    }

    /// Replace the referenced lane `x` with `f(x)`.
    #[inline(always)]
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(V::Scalar) -> V::Scalar,
    {
        let x = self.get();
        self.set(f(x))
    }

    /// The index of the referenced lane.
    pub fn lane(&self) -> usize {
        self.lane
    }

    /// Reborrow as a shared reference.
    pub fn reborrow(&self) -> LaneRef<'_, V> {
        LaneRef::new(self.vector, self.lane)
    }
}

macro_rules! lane_mut_compound {
    ($($trait:ident::$f:ident),* $(,)?) => {
        $(
            impl<V, R> std::ops::$trait<R> for LaneMut<'_, V>
            where
                V: SIMDVector,
                V::Scalar: std::ops::$trait<R>,
            {
                #[inline(always)]
                fn $f(&mut self, rhs: R) {
                    let mut x = self.get();
                    std::ops::$trait::$f(&mut x, rhs);
                    self.set(x);
                }
            }
        )*
    };
}

lane_mut_compound!(
    AddAssign::add_assign,
    SubAssign::sub_assign,
    MulAssign::mul_assign,
    DivAssign::div_assign,
    BitAndAssign::bitand_assign,
    BitOrAssign::bitor_assign,
    BitXorAssign::bitxor_assign,
);

//////////////
// Pointers //
//////////////

/// A pointer to a single lane inside a slice of vectors.
///
/// The pointer is the pair `(vector, lane)` where `vector` may be any signed offset into
/// the slice (including one past the end) and `lane` is always in `0..V::LANES`.
/// Dereferencing is only valid when `vector` addresses an element of the slice.
#[derive(Debug)]
pub struct LanePtr<'a, V> {
    base: &'a [V],
    vector: isize,
    lane: usize,
}

impl<V> Clone for LanePtr<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for LanePtr<'_, V> {}

impl<'a, V: SIMDVector> LanePtr<'a, V> {
    /// Point at lane `lane` of `base[vector]`.
    pub fn new(base: &'a [V], vector: usize, lane: usize) -> Self {
        debug_assert!(lane < V::LANES);
        Self {
            base,
            vector: vector as isize,
            lane,
        }
    }

    /// Point at the first lane of `base`.
    pub fn begin(base: &'a [V]) -> Self {
        Self::new(base, 0, 0)
    }

    /// Point one past the last lane of `base`.
    pub fn end(base: &'a [V]) -> Self {
        Self::new(base, base.len(), 0)
    }

    /// Return the `(vector, lane)` coordinates of this pointer.
    pub fn position(&self) -> (isize, usize) {
        (self.vector, self.lane)
    }

    /// Return the lane position counted from the first lane of the slice.
    pub fn flat_index(&self) -> isize {
        flatten::<V>(self.vector, self.lane)
    }

    /// Return a pointer moved by `k` lanes. Negative `k` moves backwards.
    #[inline(always)]
    pub fn offset(self, k: isize) -> Self {
        let (vector, lane) = advance::<V>(self.vector, self.lane, k);
        Self {
            base: self.base,
            vector,
            lane,
        }
    }

    /// Advance by one lane.
    #[inline(always)]
    pub fn inc(&mut self) {
        *self = self.offset(1);
    }

    /// Retreat by one lane.
    #[inline(always)]
    pub fn dec(&mut self) {
        *self = self.offset(-1);
    }

    /// Return the flattened lane distance `self - origin`.
    ///
    /// # Panics
    ///
    /// Panics if the two slices do not start a whole number of vectors apart.
    #[inline(always)]
    pub fn offset_from(self, origin: Self) -> isize {
        match self.flat_from(&origin) {
            Some(flat) => flat - origin.flat_index(),
            None => panic!("lane pointers do not share a vector grid"),
        }
    }

    /// Return a reference to the pointed-to lane.
    ///
    /// # Panics
    ///
    /// Panics if the pointer is outside the slice.
    #[inline(always)]
    pub fn deref(&self) -> LaneRef<'a, V> {
        let i = resolve(self.base.len(), self.vector);
        LaneRef::new(&self.base[i], self.lane)
    }

    /// Read the pointed-to lane.
    ///
    /// # Panics
    ///
    /// Panics if the pointer is outside the slice.
    #[inline(always)]
    pub fn get(&self) -> V::Scalar {
        self.deref().get()
    }

    /// Iterate over the lanes in `self..end`.
    pub fn range(self, end: Self) -> LaneIter<'a, V> {
        debug_assert!(self.base_distance(&end).is_some());
        LaneIter {
            front: self,
            back: end,
        }
    }

    /// The number of whole vectors from the start of `other.base` to the start of
    /// `self.base`.
    fn base_distance(&self, other: &Self) -> Option<isize> {
        let size = std::mem::size_of::<V>().max(1) as isize;
        let bytes = (self.base.as_ptr() as isize).wrapping_sub(other.base.as_ptr() as isize);
        (bytes % size == 0).then_some(bytes / size)
    }

    /// The flattened coordinate of `self` counted from the first lane of `origin.base`.
    fn flat_from(&self, origin: &Self) -> Option<isize> {
        self.base_distance(origin)
            .map(|d| flatten::<V>(self.vector + d, self.lane))
    }
}

impl<V: SIMDVector> std::ops::Add<isize> for LanePtr<'_, V> {
    type Output = Self;
    #[inline(always)]
    fn add(self, k: isize) -> Self {
        self.offset(k)
    }
}

impl<V: SIMDVector> std::ops::Sub<isize> for LanePtr<'_, V> {
    type Output = Self;
    #[inline(always)]
    fn sub(self, k: isize) -> Self {
        self.offset(-k)
    }
}

impl<V: SIMDVector> std::ops::AddAssign<isize> for LanePtr<'_, V> {
    #[inline(always)]
    fn add_assign(&mut self, k: isize) {
        *self = self.offset(k);
    }
}

impl<V: SIMDVector> std::ops::SubAssign<isize> for LanePtr<'_, V> {
    #[inline(always)]
    fn sub_assign(&mut self, k: isize) {
        *self = self.offset(-k);
    }
}

impl<V: SIMDVector> std::ops::Sub for LanePtr<'_, V> {
    type Output = isize;
    #[inline(always)]
    fn sub(self, origin: Self) -> isize {
        self.offset_from(origin)
    }
}

impl<V: SIMDVector> PartialEq for LanePtr<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        self.flat_from(other) == Some(other.flat_index())
    }
}

impl<V: SIMDVector> Eq for LanePtr<'_, V> {}

impl<V: SIMDVector> PartialOrd for LanePtr<'_, V> {
    /// Pointers whose slices do not start a whole number of vectors apart are unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.flat_from(other)
            .map(|flat| flat.cmp(&other.flat_index()))
    }
}

/// A mutable pointer to a single lane inside a slice of vectors.
///
/// Holds the slice exclusively, so unlike [`LanePtr`] it is not `Copy`. Arithmetic
/// follows the same rules.
#[derive(Debug)]
pub struct LanePtrMut<'a, V> {
    base: &'a mut [V],
    vector: isize,
    lane: usize,
}

impl<'a, V: SIMDVector> LanePtrMut<'a, V> {
    /// Point at lane `lane` of `base[vector]`.
    pub fn new(base: &'a mut [V], vector: usize, lane: usize) -> Self {
        debug_assert!(lane < V::LANES);
        Self {
            base,
            vector: vector as isize,
            lane,
        }
    }

    /// Point at the first lane of `base`.
    pub fn begin(base: &'a mut [V]) -> Self {
        Self::new(base, 0, 0)
    }

    /// Return the `(vector, lane)` coordinates of this pointer.
    pub fn position(&self) -> (isize, usize) {
        (self.vector, self.lane)
    }

    /// Return the lane position counted from the first lane of the slice.
    pub fn flat_index(&self) -> isize {
        flatten::<V>(self.vector, self.lane)
    }

    /// Return a pointer moved by `k` lanes.
    #[inline(always)]
    pub fn offset(self, k: isize) -> Self {
        let (vector, lane) = advance::<V>(self.vector, self.lane, k);
        Self {
            base: self.base,
            vector,
            lane,
        }
    }

    /// Move this pointer by `k` lanes in place.
    #[inline(always)]
    pub fn shift(&mut self, k: isize) {
        (self.vector, self.lane) = advance::<V>(self.vector, self.lane, k);
    }

    /// Advance by one lane.
    #[inline(always)]
    pub fn inc(&mut self) {
        self.shift(1)
    }

    /// Retreat by one lane.
    #[inline(always)]
    pub fn dec(&mut self) {
        self.shift(-1)
    }

    /// Return a mutable reference to the pointed-to lane.
    ///
    /// # Panics
    ///
    /// Panics if the pointer is outside the slice.
    #[inline(always)]
    pub fn deref_mut(&mut self) -> LaneMut<'_, V> {
        let i = resolve(self.base.len(), self.vector);
        LaneMut::new(&mut self.base[i], self.lane)
    }

    /// Read the pointed-to lane.
    #[inline(always)]
    pub fn get(&self) -> V::Scalar {
        self.as_const().get()
    }

    /// Overwrite the pointed-to lane.
    #[inline(always)]
    pub fn set(&mut self, value: V::Scalar) {
        self.deref_mut().set(value)
    }

    /// Reborrow as a shared pointer at the same position.
    pub fn as_const(&self) -> LanePtr<'_, V> {
        LanePtr {
            base: self.base,
            vector: self.vector,
            lane: self.lane,
        }
    }

    /// Write every item of `values` to consecutive lanes starting at `self`, returning the
    /// pointer one past the last written lane.
    pub fn write_from<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V::Scalar>,
    {
        for v in values {
            self.set(v);
            self.inc();
        }
        self
    }
}

//////////////
// Iterator //
//////////////

/// Iterator over the lanes between two [`LanePtr`]s.
#[derive(Debug, Clone, Copy)]
pub struct LaneIter<'a, V> {
    front: LanePtr<'a, V>,
    back: LanePtr<'a, V>,
}

impl<'a, V: SIMDVector> LaneIter<'a, V> {
    /// Iterate over every lane of every vector in `base`.
    pub fn new(base: &'a [V]) -> Self {
        LanePtr::begin(base).range(LanePtr::end(base))
    }

    fn remaining(&self) -> usize {
        self.back.offset_from(self.front).max(0) as usize
    }
}

impl<V: SIMDVector> Iterator for LaneIter<'_, V> {
    type Item = V::Scalar;

    #[inline]
    fn next(&mut self) -> Option<V::Scalar> {
        if self.remaining() == 0 {
            None
        } else {
            let x = self.front.get();
            self.front.inc();
            Some(x)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<V::Scalar> {
        if n < self.remaining() {
            self.front += n as isize;
            self.next()
        } else {
            self.front = self.back;
            None
        }
    }
}

impl<V: SIMDVector> DoubleEndedIterator for LaneIter<'_, V> {
    #[inline]
    fn next_back(&mut self) -> Option<V::Scalar> {
        if self.remaining() == 0 {
            None
        } else {
            self.back.dec();
            Some(self.back.get())
        }
    }
}

impl<V: SIMDVector> ExactSizeIterator for LaneIter<'_, V> {}
impl<V: SIMDVector> FusedIterator for LaneIter<'_, V> {}

///////////
// Tests //
///////////

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{Emulated, arch::Generic};

    type V4 = Emulated<i32, 4, Generic<4>>;

    fn vectors(n: usize) -> Vec<V4> {
        let arch = Generic::<4>::new();
        (0..n)
            .map(|i| V4::step(arch, 4 * i as i32))
            .collect()
    }

    #[test]
    fn test_lanes_iterator() {
        let v = V4::step(Generic::<4>::new(), 10);
        assert_eq!(v.lanes().collect::<Vec<_>>(), vec![10, 11, 12, 13]);
        assert_eq!(v.lanes().rev().collect::<Vec<_>>(), vec![13, 12, 11, 10]);
        assert_eq!(v.lanes().len(), 4);
    }

    #[test]
    fn test_lane_references() {
        let mut v = V4::default(Generic::<4>::new());
        {
            let mut r = v.lane_mut(2);
            r.set(7);
            r += 3;
            assert_eq!(r.get(), 10);
            assert_eq!(r.replace(1), 10);
            r.update(|x| x * 5);
        }
        assert_eq!(v.to_array(), [0, 0, 5, 0]);
        assert_eq!(v.lane(2).get(), 5);
        assert_eq!(v.lane(2).lane(), 2);
    }

    #[test]
    fn test_floor_division() {
        let data = vectors(3);
        let p = LanePtr::new(&data, 1, 0);

        let q = p - 1;
        assert_eq!(q.position(), (0, 3));
        assert_eq!(q.get(), 3);

        let q = p - 5;
        assert_eq!(q.position(), (-1, 3));

        let q = p + 6;
        assert_eq!(q.position(), (2, 2));
        assert_eq!(q.get(), 10);
    }

    #[test]
    fn test_difference_and_order() {
        let data = vectors(3);
        let a = LanePtr::new(&data, 0, 3);
        let b = LanePtr::new(&data, 2, 1);
        assert_eq!(b - a, 4 * 2 + 1 - 3);
        assert_eq!(a - b, -(b - a));
        assert!(a < b);
        assert!(b > a);
        assert_eq!(a + (b - a), b);

        let other = vectors(3);
        let c = LanePtr::new(&other, 0, 3);
        assert_ne!(a, c);
    }

    #[test]
    fn test_overlapping_subslices() {
        let data = vectors(3);
        let a = LanePtr::new(&data[..], 1, 2);
        let b = LanePtr::new(&data[1..], 0, 2);
        assert_eq!(a, b);
        assert_eq!(a.partial_cmp(&b), Some(Ordering::Equal));
        assert_eq!(a.get(), b.get());

        assert_eq!((b + 3) - a, 3);
        assert_eq!(a - LanePtr::begin(&data[2..]), -2);
        assert!(LanePtr::begin(&data[1..]) > LanePtr::begin(&data[..]));

        let lanes = LanePtr::begin(&data[..]).range(LanePtr::end(&data[..2]));
        assert_eq!(lanes.collect::<Vec<_>>(), (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_increment_crosses_vectors() {
        let data = vectors(2);
        let mut p = LanePtr::new(&data, 0, 3);
        p.inc();
        assert_eq!(p.position(), (1, 0));
        p.dec();
        p.dec();
        assert_eq!(p.position(), (0, 2));
    }

    #[test]
    fn test_group_laws() {
        let data = vectors(4);
        let mut rng = StdRng::seed_from_u64(0x5eed_1a9e);
        for _ in 0..1000 {
            let p = LanePtr::new(&data, rng.random_range(0..4), rng.random_range(0..4));
            let a = rng.random_range(-40i64..40) as isize;
            let b = rng.random_range(-40i64..40) as isize;
            assert_eq!((p + a) + b, p + (a + b));
            assert_eq!((p + a) - p, a);
            assert_eq!((p + a) - a, p);
            assert!(p.offset(a).position().1 < 4);
        }
    }

    #[test]
    fn test_lane_iter() {
        let data = vectors(3);
        let all: Vec<i32> = LaneIter::new(&data).collect();
        assert_eq!(all, (0..12).collect::<Vec<_>>());

        let begin = LanePtr::begin(&data) + 2;
        let end = LanePtr::end(&data) - 3;
        let iter = begin.range(end);
        assert_eq!(iter.len(), 7);
        assert_eq!(iter.rev().collect::<Vec<_>>(), (2..9).rev().collect::<Vec<_>>());

        let mut iter = LaneIter::new(&data);
        assert_eq!(iter.nth(5), Some(5));
        assert_eq!(iter.next(), Some(6));
        assert_eq!(iter.nth(100), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_strided_predicate() {
        let data = vectors(4);
        let mut p = LanePtr::begin(&data) + 1;
        let end = LanePtr::end(&data);
        let mut seen = Vec::new();
        while p < end {
            seen.push(p.get());
            p += 3;
        }
        assert_eq!(seen, vec![1, 4, 7, 10, 13]);
    }

    #[test]
    fn test_write_from() {
        let arch = Generic::<4>::new();
        let mut data = vec![V4::default(arch); 3];
        let src = vectors(2);
        let end = LanePtrMut::new(&mut data, 0, 2).write_from(LaneIter::new(&src));
        assert_eq!(end.position(), (2, 2));
        assert_eq!(data[0].to_array(), [0, 0, 0, 1]);
        assert_eq!(data[1].to_array(), [2, 3, 4, 5]);
        assert_eq!(data[2].to_array(), [6, 7, 0, 0]);
    }

    #[test]
    fn test_mut_pointer() {
        let arch = Generic::<4>::new();
        let mut data = vec![V4::default(arch); 2];
        let mut p = LanePtrMut::begin(&mut data).offset(5);
        p.set(42);
        p.dec();
        assert_eq!(p.get(), 0);
        assert_eq!(p.flat_index(), 4);
        assert_eq!(data[1].to_array(), [0, 42, 0, 0]);
    }

    #[test]
    #[should_panic]
    fn test_deref_out_of_bounds() {
        let data = vectors(1);
        let p = LanePtr::begin(&data) - 1;
        let _ = p.get();
    }
}
