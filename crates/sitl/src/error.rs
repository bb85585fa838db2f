//! Simulated bus errors

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

/// Errors surfaced to the host side of the simulated bus.
///
/// These map onto `embedded_hal::i2c::ErrorKind` so the client crate sees
/// the same error surface a real Linux bus adapter would produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SimBusError {
    /// No slave acknowledged the address.
    #[error("address {0:#04x} not acknowledged")]
    NoAcknowledge(u8),

    /// Injected bus fault: the transaction died mid-flight and the device
    /// side dropped whatever was not fully received.
    #[error("arbitration lost mid-transaction")]
    ArbitrationLoss,
}

impl embedded_hal::i2c::Error for SimBusError {
    fn kind(&self) -> ErrorKind {
        match self {
            SimBusError::NoAcknowledge(_) => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
            }
            SimBusError::ArbitrationLoss => ErrorKind::ArbitrationLoss,
        }
    }
}
