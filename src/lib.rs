// IAM - Integer Array Model
// Compact, byte-order-explicit, memory-mappable tables of integer sequences

#![warn(rust_2018_idioms)]

pub mod config;
pub mod decode;
pub mod document;
pub mod encode;
pub mod format;
pub mod io;
pub mod model;
pub mod sequence;

// Re-exports for convenience
pub use config::CodecConfig;
pub use decode::{IndexView, ListingView, MappingView};
pub use encode::{Encode, IndexBuilder, ListingBuilder, MappingBuilder};
pub use format::Format;
pub use io::IndexFile;
pub use model::{Entry, Index, Listing, Mapping, MappingMode};
pub use sequence::{ByteOrder, NumericSequence, Width};

/// IAM error types
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Invalid header: {0}")]
        InvalidHeader(String),

        #[error("Invalid value: {0}")]
        InvalidValue(String),

        #[error("Invalid offset: {0}")]
        InvalidOffset(String),

        #[error("Invalid length: {0}")]
        InvalidLength(String),

        #[error("Value error: {0}")]
        Value(String),

        #[error("I/O error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Compression error: {0}")]
        Compression(String),

        #[error("Serialization error: {0}")]
        Serialization(String),

        #[error("Config error: {0}")]
        Config(String),
    }

    impl Error {
        /// Whether this error rejects an encoded buffer
        pub fn is_format_error(&self) -> bool {
            matches!(
                self,
                Error::InvalidHeader(_)
                    | Error::InvalidValue(_)
                    | Error::InvalidOffset(_)
                    | Error::InvalidLength(_)
            )
        }
    }

    pub type Result<T> = std::result::Result<T, Error>;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
