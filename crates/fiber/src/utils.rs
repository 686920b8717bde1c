//! Internal helper macros.

/// Returns early with `Err($error)` when `$predicate` is false.
///
/// ```ignore
/// ensure!(!host.is_empty(), TransportError::connect("no host", &header));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
