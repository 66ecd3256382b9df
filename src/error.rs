use thiserror::Error;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("device reports no HID collections")]
    NoCollections,

    #[error("no telephony collection in report descriptor")]
    NoTelephonyCollection,

    #[error("output report {report_id} is {bit_len} bits long, not byte aligned")]
    UnalignedReport { report_id: u8, bit_len: u32 },

    #[error("device error: {0}")]
    Device(String),
}

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, Error>;
