// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `shelly_bridge` library.
//!
//! Only failures the caller can act on are errors. A device answering with
//! something that is not a JSON object, a field naming an entity kind nobody
//! knows, or a model code missing from the identifier table all degrade to
//! empty or "unknown" results instead.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred during device operations.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),
}

/// Errors related to HTTP communication with the device.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed at the transport level (connect, DNS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A resolved endpoint template is not a valid URL.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors related to device operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// No property group with this name was discovered on the device.
    #[error("unknown property group: {0}")]
    UnknownGroup(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_address_display() {
        let err = ProtocolError::InvalidAddress("http://{provider_host}/".to_string());
        assert_eq!(
            err.to_string(),
            "invalid address: http://{provider_host}/"
        );
    }

    #[test]
    fn error_from_device_error() {
        let err: Error = DeviceError::UnknownGroup("Settings".to_string()).into();
        assert!(matches!(err, Error::Device(DeviceError::UnknownGroup(ref g)) if g == "Settings"));
        assert_eq!(
            err.to_string(),
            "device error: unknown property group: Settings"
        );
    }

    #[test]
    fn error_from_protocol_error() {
        let err: Error = ProtocolError::InvalidAddress("x".to_string()).into();
        assert!(matches!(err, Error::Protocol(ProtocolError::InvalidAddress(_))));
    }
}
