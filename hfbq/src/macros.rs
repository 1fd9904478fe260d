//! Macros building [`crate::error::LoaderError`] values.

/// Creates a [`crate::error::LoaderError`] from an [`crate::error::ErrorKind`] and a static
/// description.
///
/// The optional third argument is the dynamic detail shown after the description, for example
/// the HTTP status and body of a failed hub or BigQuery call. It is either any [`ToString`]
/// value or `detail = ` followed by an owned [`String`]. A trailing `source: err` keeps the
/// underlying `reqwest`, `yup_oauth2` or `io` error in the cause chain printed by the loader's
/// failure report.
///
/// ```
/// use hfbq::error::ErrorKind;
/// use hfbq::loader_error;
///
/// let err = loader_error!(
///     ErrorKind::SourceSplitNotFound,
///     "Split not found in the dataset",
///     format!("dataset `{}` has no split named `{}`", "stanfordnlp/imdb", "validation")
/// );
///
/// assert_eq!(err.kind(), ErrorKind::SourceSplitNotFound);
/// assert!(err.kind().is_fetch_error());
/// ```
#[macro_export]
macro_rules! loader_error {
    ($kind:expr, $desc:expr) => {
        $crate::error::LoaderError::from(($kind, $desc))
    };
    ($kind:expr, $desc:expr, source: $source:expr) => {
        $crate::error::LoaderError::from(($kind, $desc)).with_source($source)
    };
    ($kind:expr, $desc:expr, detail = $detail:expr) => {
        $crate::error::LoaderError::from(($kind, $desc, $detail))
    };
    ($kind:expr, $desc:expr, detail = $detail:expr, source: $source:expr) => {
        $crate::error::LoaderError::from(($kind, $desc, $detail)).with_source($source)
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        $crate::error::LoaderError::from(($kind, $desc, $detail.to_string()))
    };
    ($kind:expr, $desc:expr, $detail:expr, source: $source:expr) => {
        $crate::error::LoaderError::from(($kind, $desc, $detail.to_string())).with_source($source)
    };
}

/// Returns early with a [`crate::error::LoaderError`].
///
/// Takes the same arguments as [`loader_error!`]. Used where a response is well formed but
/// unusable, such as a split missing from `/splits` or a dataset in the wrong location.
#[macro_export]
macro_rules! bail {
    ($kind:expr, $desc:expr) => {
        return ::core::result::Result::Err($crate::loader_error!($kind, $desc))
    };
    ($kind:expr, $desc:expr, source: $source:expr) => {
        return ::core::result::Result::Err($crate::loader_error!($kind, $desc, source: $source))
    };
    ($kind:expr, $desc:expr, detail = $detail:expr) => {
        return ::core::result::Result::Err($crate::loader_error!($kind, $desc, detail = $detail))
    };
    ($kind:expr, $desc:expr, detail = $detail:expr, source: $source:expr) => {
        return ::core::result::Result::Err($crate::loader_error!(
            $kind,
            $desc,
            detail = $detail,
            source: $source
        ))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        return ::core::result::Result::Err($crate::loader_error!($kind, $desc, $detail))
    };
    ($kind:expr, $desc:expr, $detail:expr, source: $source:expr) => {
        return ::core::result::Result::Err($crate::loader_error!(
            $kind,
            $desc,
            $detail,
            source: $source
        ))
    };
}
