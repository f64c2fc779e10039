//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate,
//! allowing for convenient glob imports:
//!
//! ```
//! use coap_wire::prelude::*;
//! ```

pub use crate::error::Error;
pub use crate::options::{MediaType, Opt, OptionNumber, OptionsIter};
pub use crate::packet::{MessageType, Method, Packet, ResponseCode};
pub use crate::pdu::Pdu;
pub use crate::{
    DEFAULT_MAX_AGE, DEFAULT_MAX_RETRANSMIT, DEFAULT_PORT, DEFAULT_RESPONSE_TIMEOUT,
    DEFAULT_URI_WELLKNOWN, DEFAULT_VERSION, INVALID_TID, MAX_PDU_SIZE,
};
