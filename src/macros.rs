#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Builds a [`KnownDims`](crate::KnownDims) table from `name => size` pairs.
///
/// ```
/// use dimguard::dims;
///
/// let known = dims! { "N" => 24, "Z" => 16 };
/// assert_eq!(known.get("N"), Some(&24));
/// assert!(dims! {}.is_empty());
/// ```
#[macro_export]
macro_rules! dims {
    () => {
        $crate::KnownDims::new()
    };
    ($($name:expr => $size:expr),+ $(,)?) => {
        $crate::KnownDims::from([$(($name.to_string(), $size as i64)),+])
    };
}
