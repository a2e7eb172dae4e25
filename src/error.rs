/// Custom Result type for genokey operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the genokey library.
///
/// Data-path operations (codecs, searches, normalization) never fail: out of
/// domain inputs fall back to hashed encodings and lookup misses return zero
/// values. Errors are reserved for acquiring and releasing the memory-mapped
/// stores.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Errors raised while opening, validating, or closing a mapped store
    #[error("Error accessing store: {0}")]
    StoreError(#[from] StoreError),

    /// Standard I/O errors
    #[error("Error with IO: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors specific to memory-mapped store handling
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The path does not point to a regular file (e.g. a directory)
    #[error("File is not regular")]
    IncompatibleFile,

    /// The handle was never opened, or was already closed
    #[error("Memory map is not open")]
    NotOpen,

    /// The mapped size cannot hold the structure the header declares
    #[error("File size does not match expectation - required {required} bytes, mapped {mapped}")]
    Truncated {
        /// Bytes required by the declared layout
        required: usize,
        /// Bytes actually mapped
        mapped: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_truncated_display() {
        let err = StoreError::Truncated {
            required: 216,
            mapped: 100,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("216"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn test_error_from_store_error() {
        let err: Error = StoreError::NotOpen.into();
        assert!(matches!(err, Error::StoreError(StoreError::NotOpen)));
    }

    #[test]
    fn test_error_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::IoError(_)));
    }
}
