/// Returns early with an error if a condition is not met.
///
/// ```ignore
/// ensure!(!self.uri.is_empty(), FetchError::invalid_request("missing uri"));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error.into());
        }
    };
}

pub(crate) use ensure;
