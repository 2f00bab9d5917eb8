//! Error types for editview.

use std::fmt;

/// Result type alias for editview operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for editview operations.
///
/// Most failures inside the display core are recovered locally (a view
/// reset, a clamped position, an uncached measurement). The variants here
/// are what the internal layers hand each other before that recovery, plus
/// the few configuration errors a caller can actually hit.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Host viewport dimension error (e.g., negative or NaN width/height).
    InvalidDimensions { width: f64, height: f64 },
    /// Line number outside the document.
    LineOutOfRange { line: usize, first: usize, count: usize },
    /// A rendered node no longer matches the view array.
    InconsistentView { line: usize },
    /// The host returned a degenerate box for a measurement.
    Measurement { line: usize, ch: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid dimensions: {width}x{height}")
            }
            Self::LineOutOfRange { line, first, count } => {
                write!(
                    f,
                    "line {line} out of range for document starting at {first} with {count} lines"
                )
            }
            Self::InconsistentView { line } => {
                write!(f, "rendered node for line {line} is detached from the view")
            }
            Self::Measurement { line, ch } => {
                write!(f, "no usable measurement for ({line}, {ch})")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidDimensions {
            width: -1.0,
            height: 100.0,
        };
        assert!(err.to_string().contains("-1x100"));

        let err = Error::LineOutOfRange {
            line: 12,
            first: 0,
            count: 3,
        };
        assert!(err.to_string().contains("line 12"));

        let err = Error::InconsistentView { line: 7 };
        assert!(err.to_string().contains("line 7"));

        let err = Error::Measurement { line: 1, ch: 4 };
        assert!(err.to_string().contains("(1, 4)"));
    }

    #[test]
    fn test_error_is_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&Error::InconsistentView { line: 0 });
    }
}
