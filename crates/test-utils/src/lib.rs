//! Shared test utilities for the workspace.

#[doc(hidden)]
pub use zmt_core::base::Digest;

/// Helper macro to create a digest whose last byte is `$v`.
#[macro_export]
macro_rules! digest {
    ($v:expr) => {{
        let mut arr = [0_u8; 32];
        arr[31] = $v;
        $crate::Digest::from(arr)
    }};
}

/// Helper macro to create a vector of digests, in the given order.
#[macro_export]
macro_rules! digests {
    ($($v:expr),* $(,)?) => {{
        vec![$( $crate::digest!($v) ),*]
    }};
}
