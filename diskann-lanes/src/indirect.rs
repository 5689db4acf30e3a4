/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::marker::PhantomData;

use crate::{
    arch::Architecture,
    lane::LaneVector,
    loader::Loader,
    pointer::Pointers,
    traits::SIMDVector,
};

/// A lane vector of references: lane `i` behaves as a reference to `*pointers[i]`.
///
/// Reading performs a gather, writing performs a scatter, and compound assignment
/// performs a gather, the lane-wise operation, then a scatter. All memory traffic goes
/// through the [`Loader`] of `T`.
///
/// Lanes may alias. A write then resolves in ascending lane order, so the highest lane
/// addressing an element determines its final value.
///
/// ```
/// use diskann_lanes::{Indirect, SIMDVector, arch::Generic};
///
/// let arch = Generic::<4>::new();
/// let mut histogram = [0u32; 3];
/// let mut counts = Indirect::from_slice(arch, &mut histogram, |i| i % 3);
/// counts += 1;
/// assert_eq!(counts.read().to_array(), [1, 1, 1, 1]);
/// drop(counts);
/// assert_eq!(histogram, [1, 1, 1]);
/// ```
#[derive(Debug)]
pub struct Indirect<'a, T, A: Architecture> {
    pointers: Pointers<T, A>,
    _lifetime: PhantomData<&'a mut T>,
}

impl<'a, T, A: Architecture> Indirect<'a, T, A> {
    /// Wrap raw addresses.
    ///
    /// # Safety
    ///
    /// For the lifetime `'a`, every lane of `pointers` must be valid for reads and writes
    /// of `T`, and no other code may access the addressed elements.
    #[inline(always)]
    pub unsafe fn new(pointers: Pointers<T, A>) -> Self {
        Self {
            pointers,
            _lifetime: PhantomData,
        }
    }

    /// Reference elements of `slice`, with lane `i` referring to `slice[index(i)]`.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds for `slice`.
    pub fn from_slice<F>(arch: A, slice: &'a mut [T], index: F) -> Self
    where
        F: FnMut(usize) -> usize,
    {
        let pointers = Pointers::from_slice(arch, slice, index);
        // SAFETY: Every lane is in bounds for `slice`, which stays exclusively borrowed for
        // `'a`. All lanes derive from the same base pointer, so aliasing lanes are allowed.
        unsafe { Self::new(pointers) }
    }

    /// Return the referenced addresses.
    #[inline(always)]
    pub fn pointers(&self) -> Pointers<T, A> {
        self.pointers
    }

    /// Return the architecture.
    #[inline(always)]
    pub fn arch(&self) -> A {
        self.pointers.arch()
    }
}

impl<T, A> Indirect<'_, T, A>
where
    A: Architecture,
    T: Loader<A>,
{
    /// Gather every lane.
    #[inline(always)]
    pub fn read(&self) -> LaneVector<T, A> {
        // SAFETY: Valid for reads by construction.
        unsafe { crate::loader::load(self.pointers) }
    }

    /// Gather the active lanes into `dst`. Inactive lanes of `dst` are left as they are.
    #[inline(always)]
    pub fn read_masked(&self, dst: &mut LaneVector<T, A>, mask: A::Mask) {
        // SAFETY: Valid for reads by construction.
        unsafe { T::load_masked(dst, self.pointers, mask) }
    }

    /// Scatter every lane of `value`.
    #[inline(always)]
    pub fn write(&mut self, value: LaneVector<T, A>) {
        // SAFETY: Valid for writes by construction.
        unsafe { T::store(self.pointers, value) }
    }

    /// Scatter the active lanes of `value`.
    #[inline(always)]
    pub fn write_masked(&mut self, value: LaneVector<T, A>, mask: A::Mask) {
        // SAFETY: Valid for writes by construction.
        unsafe { T::store_masked(self.pointers, value, mask) }
    }

    /// Read the element referenced by lane `i`.
    #[inline(always)]
    pub fn get(&self, i: usize) -> T {
        let ptr = self.pointers.get(i);
        // SAFETY: Valid for reads by construction.
        unsafe { ptr.read() }
    }

    /// Write `value` to the element referenced by lane `i`.
    #[inline(always)]
    pub fn set(&mut self, i: usize, value: T) {
        let ptr = self.pointers.get(i);
        // SAFETY: Valid for writes by construction.
        unsafe { ptr.write(value) }
    }

    /// Replace every referenced element with `f` applied to the gathered lanes.
    #[inline(always)]
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(LaneVector<T, A>) -> LaneVector<T, A>,
    {
        let value = f(self.read());
        self.write(value);
    }
}

macro_rules! indirect_assign {
    ($($Op:ident, $op:ident, $OpAssign:ident, $op_assign:ident);+ $(;)?) => {
        $(
            impl<T, A, R> std::ops::$OpAssign<R> for Indirect<'_, T, A>
            where
                A: Architecture,
                T: Loader<A>,
                LaneVector<T, A>: std::ops::$Op<R, Output = LaneVector<T, A>>,
            {
                #[inline(always)]
                fn $op_assign(&mut self, rhs: R) {
                    self.update(|x| std::ops::$Op::$op(x, rhs))
                }
            }
        )+
    };
}

indirect_assign!(
    Add, add, AddAssign, add_assign;
    Sub, sub, SubAssign, sub_assign;
    Mul, mul, MulAssign, mul_assign;
    Div, div, DivAssign, div_assign;
    BitAnd, bitand, BitAndAssign, bitand_assign;
    BitOr, bitor, BitOrAssign, bitor_assign;
    BitXor, bitxor, BitXorAssign, bitxor_assign;
    Shl, shl, ShlAssign, shl_assign;
    Shr, shr, ShrAssign, shr_assign;
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SIMDMask, arch::Generic};

    #[test]
    fn test_read_write() {
        let arch = Generic::<4>::new();
        let mut data = [1i32, 2, 3, 4, 5, 6];
        let mut r = Indirect::from_slice(arch, &mut data, |i| 2 * i % 6);
        assert_eq!(r.read().to_array(), [1, 3, 5, 1]);
        assert_eq!(r.get(1), 3);

        r.write(LaneVector::<i32, Generic<4>>::from_array(arch, [10, 30, 50, 70]));
        r.set(1, 33);
        drop(r);
        assert_eq!(data, [70, 2, 33, 4, 50, 6]);
    }

    #[test]
    fn test_masked() {
        let arch = Generic::<4>::new();
        let mut data = [1.0f32, 2.0, 3.0, 4.0];
        let mut r = Indirect::from_slice(arch, &mut data, |i| 3 - i);
        let mask = <Generic<4> as Architecture>::Mask::from_movemask(arch, 0b1001);

        let mut dst = LaneVector::<f32, Generic<4>>::splat(arch, 0.0);
        r.read_masked(&mut dst, mask);
        assert_eq!(dst.to_array(), [4.0, 0.0, 0.0, 1.0]);

        r.write_masked(LaneVector::<f32, Generic<4>>::splat(arch, -1.0), !mask);
        drop(r);
        assert_eq!(data, [1.0, -1.0, -1.0, 4.0]);
    }

    #[test]
    fn test_compound_assign() {
        let arch = Generic::<4>::new();
        let mut data = [1u32, 2, 3, 4];
        let mut r = Indirect::from_slice(arch, &mut data, |i| i);
        r += 1;
        r *= LaneVector::<u32, Generic<4>>::from_array(arch, [1, 2, 3, 4]);
        r <<= 1;
        r ^= 1;
        r -= 1;
        r >>= 1;
        r |= 0x100;
        r &= 0x1ff;
        r /= 2;
        drop(r);
        assert_eq!(data, [0x81, 0x83, 0x86, 0x8a]);
    }

    #[test]
    fn test_aliased_compound_assign() {
        let arch = Generic::<8>::new();
        let mut data = [0i64; 2];
        let mut r = Indirect::from_slice(arch, &mut data, |i| i / 4);
        r += LaneVector::<i64, Generic<8>>::step(arch, 1);
        drop(r);
        // Each element receives the value computed by its highest lane.
        assert_eq!(data, [4, 8]);
    }
}
