// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;
#[cfg(windows)]
use windows::Win32::Networking::WinSock::WSA_ERROR;

/// Any I/O error that may arise from either the low-level I/O operations provided by the
/// `oxidizer_io` crate or from higher-level I/O types that use these operations.
///
/// The type includes platform-specific enum variants. To write platform-neutral code, you
/// may ignore them and handle any unrecognized variants via variant-agnostic code.
///
/// # Thread safety
///
/// This type is thread-safe.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An API contract was violated, e.g. an operation that is required to always consume all
    /// bytes only written some of the bytes.
    ///
    /// Note: an API contract violation that indicates memory safety has been violated will
    /// panic instead of returning an error result.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// The operation was canceled due to a signal indicating that it is no longer relevant.
    ///
    /// This may be used, for example, when an I/O primitive is already closed by the
    /// time an operation starts or when an out of band cancel request is received.
    #[error("operation canceled")]
    Canceled,

    /// (Windows only) [The Windows Sockets API returned an error result][1] that is represented
    /// transparently.
    ///
    /// This is used if there is no platform-agnostic enum variant to report for a
    /// situation either in this type or in `std::io::ErrorKind`.
    ///
    /// [1]: https://learn.microsoft.com/en-us/windows/win32/winsock/windows-sockets-error-codes-2
    #[cfg(windows)]
    #[error("Winsock error {}", .0.0)]
    Winsock(WSA_ERROR),

    /// (Windows only) A Windows API returned an error result that is represented transparently.
    ///
    /// This is used if there is no platform-agnostic enum variant to report for a
    /// situation either in this type or in `std::io::ErrorKind`.
    #[cfg(windows)]
    #[error(transparent)]
    Windows(#[from] windows::core::Error),

    /// We are forwarding an error received from the standard library's I/O APIs.
    #[error(transparent)]
    StdIo(#[from] std::io::Error),

    /// We are forwarding an error of unknown type from an unspecified source.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// A specialized `Result` for use with I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents the Oxidizer I/O subsystem error as a standard I/O error.
/// This is often used when interoperating with other libraries that expect standard I/O errors.
impl From<Error> for std::io::Error {
    fn from(value: Error) -> Self {
        match value {
            Error::StdIo(error) => error,
            _ => Self::other(value),
        }
    }
}
