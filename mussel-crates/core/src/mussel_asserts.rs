#[cfg(all(not(test), not(feature = "debug-checks")))]
pub const MUSSEL_ASSERT_LEVEL_DEFINITION: u8 = MUSSEL_ASSERT_SIMPLE;

#[cfg(any(test, feature = "debug-checks"))]
pub const MUSSEL_ASSERT_LEVEL_DEFINITION: u8 = MUSSEL_ASSERT_ADVANCED;

pub const MUSSEL_ASSERT_SIMPLE: u8 = 1;
pub const MUSSEL_ASSERT_MODERATE: u8 = 2;
pub const MUSSEL_ASSERT_ADVANCED: u8 = 3;

#[macro_export]
#[doc(hidden)]
macro_rules! mussel_assert_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::MUSSEL_ASSERT_LEVEL_DEFINITION >= $crate::asserts::MUSSEL_ASSERT_SIMPLE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! mussel_assert_advanced {
    ($($arg:tt)*) => {
        if $crate::asserts::MUSSEL_ASSERT_LEVEL_DEFINITION >= $crate::asserts::MUSSEL_ASSERT_ADVANCED {
            assert!($($arg)*);
        }
    };
}
