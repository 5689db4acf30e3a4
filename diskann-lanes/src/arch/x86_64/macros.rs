/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

// The x86 register wrappers all follow the same pattern, so the boilerplate lives in
// these macros. Intrinsic names are resolved at the invocation site, which is expected
// to import `std::arch::x86_64::*`.

/// Define a lane vector wrapping one hardware register.
///
/// The register must have the same size as `[$scalar; $lanes]`.
macro_rules! x86_define_register {
    ($type:ident, $impl:ty, $scalar:ty, $lanes:literal, $arch:ty) => {
        #[derive(Clone, Copy)]
        #[allow(non_camel_case_types)]
        #[repr(transparent)]
        pub struct $type(pub $impl);

        const _: () = assert!(
            std::mem::size_of::<$type>() == std::mem::size_of::<[$scalar; $lanes]>()
        );

        impl $type {
            /// Convert `self` to its corresponding [`crate::Emulated`] type.
            #[inline(always)]
            pub fn emulated(self) -> $crate::Emulated<$scalar, $lanes, $arch> {
                $crate::Emulated::from_underlying(
                    $crate::SIMDVector::arch(self),
                    $crate::SIMDVector::to_array(self),
                )
            }

            /// Return the underlying register.
            #[inline(always)]
            pub fn to_underlying(self) -> $impl {
                self.0
            }

            /// Wrap a register.
            #[inline(always)]
            pub fn from_underlying(_: $arch, repr: $impl) -> Self {
                Self(repr)
            }
        }

        impl std::fmt::Debug for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($type))
                    .field(&$crate::SIMDVector::to_array(*self))
                    .finish()
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                $crate::display::display_lanes(f, *self)
            }
        }

        impl PartialEq for $type {
            fn eq(&self, other: &Self) -> bool {
                $crate::SIMDVector::to_array(*self) == $crate::SIMDVector::to_array(*other)
            }
        }

        impl $crate::SIMDVector for $type {
            type Arch = $arch;
            type Scalar = $scalar;
            const LANES: usize = $lanes;
            const EMULATED: bool = false;

            #[inline(always)]
            fn arch(self) -> $arch {
                // SAFETY: The existence of `self` provides a witness that it is safe to
                // instantiate its architecture.
                unsafe { <$arch>::new() }
            }

            #[inline(always)]
            fn default(arch: $arch) -> Self {
                <Self as $crate::arch::x86_64::macros::X86Default>::x86_default(arch)
            }

            #[inline(always)]
            fn splat(arch: $arch, value: $scalar) -> Self {
                <Self as $crate::arch::x86_64::macros::X86Splat>::x86_splat(arch, value)
            }

            #[inline(always)]
            fn from_fn<F>(arch: $arch, f: F) -> Self
            where
                F: FnMut(usize) -> $scalar,
            {
                <Self as $crate::SIMDVector>::from_array(arch, std::array::from_fn(f))
            }

            #[inline(always)]
            fn to_array(self) -> [$scalar; $lanes] {
                // SAFETY: All bit patterns are valid for both the register and the array,
                // which have the same size. The value is taken by value, so alignment
                // does not matter.
                unsafe { std::mem::transmute::<Self, [$scalar; $lanes]>(self) }
            }

            #[inline(always)]
            fn from_array(_: $arch, x: [$scalar; $lanes]) -> Self {
                // SAFETY: See `to_array`.
                unsafe { std::mem::transmute::<[$scalar; $lanes], Self>(x) }
            }

            #[inline(always)]
            fn get(&self, i: usize) -> $scalar {
                debug_assert!(i < $lanes, "lane {} out of bounds for width {}", i, $lanes);
                $crate::SIMDVector::to_array(*self)[i]
            }

            #[inline(always)]
            fn put(&mut self, i: usize, value: $scalar) {
                debug_assert!(i < $lanes, "lane {} out of bounds for width {}", i, $lanes);
                let mut lanes = $crate::SIMDVector::to_array(*self);
                lanes[i] = value;
                let arch = $crate::SIMDVector::arch(*self);
                *self = <Self as $crate::SIMDVector>::from_array(arch, lanes);
            }
        }
    };
}

pub(super) use x86_define_register;

// Externalize splat and default so each register can pick its intrinsic.
pub(super) trait X86Splat: crate::SIMDVector {
    fn x86_splat(arch: Self::Arch, value: Self::Scalar) -> Self;
}

pub(super) trait X86Default: crate::SIMDVector {
    fn x86_default(arch: Self::Arch) -> Self;
}

macro_rules! x86_define_splat {
    ($type:ty, $scalar:ty, $intrinsic:ident) => {
        impl $crate::arch::x86_64::macros::X86Splat for $type {
            #[inline(always)]
            fn x86_splat(_: <$type as $crate::SIMDVector>::Arch, value: $scalar) -> Self {
                // SAFETY: The presence of the architecture witnesses the instruction.
                Self(unsafe { $intrinsic(value) })
            }
        }
    };
}

pub(super) use x86_define_splat;

macro_rules! x86_define_default {
    ($type:ty, $intrinsic:ident) => {
        impl $crate::arch::x86_64::macros::X86Default for $type {
            #[inline(always)]
            fn x86_default(_: <$type as $crate::SIMDVector>::Arch) -> Self {
                // SAFETY: The presence of the architecture witnesses the instruction.
                Self(unsafe { $intrinsic() })
            }
        }
    };
}

pub(super) use x86_define_default;

/// Lower a binary operator to a two-argument intrinsic.
macro_rules! x86_binary_op {
    ($type:ty, $Op:ident, $op:ident, $intrinsic:ident) => {
        impl std::ops::$Op for $type {
            type Output = Self;
            #[inline(always)]
            fn $op(self, rhs: Self) -> Self {
                // SAFETY: The existence of `self` witnesses the instruction.
                Self(unsafe { $intrinsic(self.0, rhs.0) })
            }
        }
    };
}

pub(super) use x86_binary_op;

/// Lower a shift by a scalar amount to an intrinsic taking the count in an `__m128i`.
///
/// Counts of at least 32 shift out every bit, matching the reference semantics.
macro_rules! x86_shift_op {
    ($type:ty, $Op:ident, $op:ident, $intrinsic:ident) => {
        impl std::ops::$Op<u32> for $type {
            type Output = Self;
            #[inline(always)]
            fn $op(self, rhs: u32) -> Self {
                // SAFETY: The existence of `self` witnesses the instruction. The count
                // is zero extended into the low 64 bits.
                Self(unsafe {
                    $intrinsic(self.0, std::arch::x86_64::_mm_cvtsi32_si128(rhs as i32))
                })
            }
        }
    };
}

pub(super) use x86_shift_op;

/// Define a mask holding each lane as all ones or all zeros in a 32-bit register lane.
///
/// * `$movemask` and `$cast` extract the sign bit of every lane.
/// * `$setr` with `$bit` constructs the register with lane `i` holding `1 << i`.
macro_rules! x86_define_mask {
    (
        $type:ident,
        $impl:ty,
        $lanes:literal,
        $arch:ty,
        movemask = $movemask:ident($cast:ident),
        setr = $setr:ident($($bit:literal),+),
        set1 = $set1:ident,
        cmpeq = $cmpeq:ident,
        and = $and:ident,
        or = $or:ident,
        xor = $xor:ident $(,)?
    ) => {
        #[derive(Clone, Copy)]
        #[allow(non_camel_case_types)]
        #[repr(transparent)]
        pub struct $type(pub $impl);

        impl std::fmt::Debug for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($type))
                    .field(&$crate::SIMDVector::to_array(*self))
                    .finish()
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                $crate::display::display_lanes(f, *self)
            }
        }

        impl PartialEq for $type {
            fn eq(&self, other: &Self) -> bool {
                $crate::SIMDMask::movemask(*self) == $crate::SIMDMask::movemask(*other)
            }
        }

        impl Eq for $type {}

        impl $crate::SIMDVector for $type {
            type Arch = $arch;
            type Scalar = bool;
            const LANES: usize = $lanes;
            const EMULATED: bool = false;

            #[inline(always)]
            fn arch(self) -> $arch {
                // SAFETY: The existence of `self` provides a witness that it is safe to
                // instantiate its architecture.
                unsafe { <$arch>::new() }
            }

            #[inline(always)]
            fn default(arch: $arch) -> Self {
                <Self as $crate::SIMDMask>::from_movemask(arch, 0)
            }

            #[inline(always)]
            fn splat(arch: $arch, value: bool) -> Self {
                let bits = if value { u32::MAX } else { 0 };
                <Self as $crate::SIMDMask>::from_movemask(arch, bits)
            }

            #[inline(always)]
            fn from_fn<F>(arch: $arch, mut f: F) -> Self
            where
                F: FnMut(usize) -> bool,
            {
                let bits = (0..$lanes).fold(0u32, |bits, i| bits | (u32::from(f(i)) << i));
                <Self as $crate::SIMDMask>::from_movemask(arch, bits)
            }

            #[inline(always)]
            fn get(&self, i: usize) -> bool {
                debug_assert!(i < $lanes, "lane {} out of bounds for width {}", i, $lanes);
                ($crate::SIMDMask::movemask(*self) >> i) & 1 == 1
            }

            #[inline(always)]
            fn put(&mut self, i: usize, value: bool) {
                debug_assert!(i < $lanes, "lane {} out of bounds for width {}", i, $lanes);
                let bits = $crate::SIMDMask::movemask(*self);
                let bits = if value { bits | (1 << i) } else { bits & !(1 << i) };
                let arch = $crate::SIMDVector::arch(*self);
                *self = <Self as $crate::SIMDMask>::from_movemask(arch, bits);
            }
        }

        impl $crate::SIMDMask for $type {
            type Underlying = $impl;

            #[inline(always)]
            fn to_underlying(self) -> $impl {
                self.0
            }

            #[inline(always)]
            fn from_underlying(_: $arch, value: $impl) -> Self {
                Self(value)
            }

            #[inline(always)]
            fn movemask(self) -> u32 {
                // SAFETY: The existence of `self` witnesses the instructions.
                unsafe { $movemask($cast(self.0)) as u32 }
            }

            #[inline(always)]
            fn from_movemask(_: $arch, bits: u32) -> Self {
                // SAFETY: The presence of the architecture witnesses the instructions.
                Self(unsafe {
                    let lanes = $setr($($bit),+);
                    $cmpeq($and($set1(bits as i32), lanes), lanes)
                })
            }
        }

        $crate::arch::x86_64::macros::x86_binary_op!($type, BitAnd, bitand, $and);
        $crate::arch::x86_64::macros::x86_binary_op!($type, BitOr, bitor, $or);
        $crate::arch::x86_64::macros::x86_binary_op!($type, BitXor, bitxor, $xor);

        impl std::ops::Not for $type {
            type Output = Self;
            #[inline(always)]
            fn not(self) -> Self {
                // SAFETY: The existence of `self` witnesses the instructions.
                Self(unsafe { $xor(self.0, $set1(-1)) })
            }
        }
    };
}

pub(super) use x86_define_mask;

/// Define the inherent constructors and the `run_with*` entry points of a descriptor.
macro_rules! x86_define_arch {
    ($arch:ident, $features:literal, $($feature_doc:literal),+) => {
        impl $arch {
            /// Construct a new instance of the architecture.
            ///
            /// # Safety
            ///
            /// The running processor must support all of the following features:
            $(#[doc = concat!("* `", $feature_doc, "`")])+
            pub const unsafe fn new() -> Self {
                Self(Hidden)
            }

            /// Probe the hardware directly, bypassing the cached detection and the
            /// configured cap.
            ///
            /// # Panics
            ///
            /// Panics when the architecture is missing but required by the test
            /// configuration.
            #[cfg(test)]
            pub(crate) fn new_checked_uncached() -> Option<Self> {
                if <Self as Architecture>::available(Isa::probe()) {
                    // SAFETY: The probe found every required feature.
                    Some(unsafe { Self::new() })
                } else {
                    super::check_required::<Self>();
                    None
                }
            }

            /// Run `f` with the target features of this architecture enabled.
            ///
            /// # Safety
            ///
            /// The running processor must support the features of this architecture.
            #[target_feature(enable = $features)]
            #[inline]
            pub(super) unsafe fn run_with<F, R>(self, f: F) -> R
            where
                F: Target<Self, R>,
            {
                f.run(self)
            }

            /// Run `f` with an argument and the target features of this architecture.
            ///
            /// # Safety
            ///
            /// The running processor must support the features of this architecture.
            #[target_feature(enable = $features)]
            #[inline]
            pub(super) unsafe fn run_with_1<F, T0, R>(self, f: F, x0: T0) -> R
            where
                F: Target1<Self, R, T0>,
            {
                f.run(self, x0)
            }

            /// Run `f` with two arguments and the target features of this architecture.
            ///
            /// # Safety
            ///
            /// The running processor must support the features of this architecture.
            #[target_feature(enable = $features)]
            #[inline]
            pub(super) unsafe fn run_with_2<F, T0, T1, R>(self, f: F, x0: T0, x1: T1) -> R
            where
                F: Target2<Self, R, T0, T1>,
            {
                f.run(self, x0, x1)
            }
        }

        impl $crate::arch::Sealed for $arch {}
    };
}

pub(super) use x86_define_arch;

/// Implement the [`crate::arch::Architecture`] methods shared by every x86 descriptor.
macro_rules! x86_architecture_methods {
    () => {
        #[inline(always)]
        fn new_checked() -> Option<Self> {
            if <Self as Architecture>::available(Isa::detect()) {
                // SAFETY: Detection found every required feature.
                Some(unsafe { Self::new() })
            } else {
                None
            }
        }

        #[inline(always)]
        fn run<F, R>(self, f: F) -> R
        where
            F: Target<Self, R>,
        {
            // SAFETY: The existence of `self` witnesses the required features.
            unsafe { self.run_with(f) }
        }

        #[inline(always)]
        fn run1<F, T0, R>(self, f: F, x0: T0) -> R
        where
            F: Target1<Self, R, T0>,
        {
            // SAFETY: The existence of `self` witnesses the required features.
            unsafe { self.run_with_1(f, x0) }
        }

        #[inline(always)]
        fn run2<F, T0, T1, R>(self, f: F, x0: T0, x1: T1) -> R
        where
            F: Target2<Self, R, T0, T1>,
        {
            // SAFETY: The existence of `self` witnesses the required features.
            unsafe { self.run_with_2(f, x0, x1) }
        }
    };
}

pub(super) use x86_architecture_methods;
