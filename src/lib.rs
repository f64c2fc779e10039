#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

//! # coap-wire
//!
//! This crate provides the means for parsing byte arrays into higher-level
//! CoAP PDU representations, and vice versa. It is designed to be used in
//! embedded environments and is a `no_std` crate by default.
//!
//! A PDU is a fixed 4-byte header, an ordered sequence of delta-coded
//! type-value option records, and an optional trailing payload. The sub-byte
//! header fields are packed into one canonical layout by explicit shift and
//! mask, so the emitted bytes are portable across host byte orders by
//! construction.
//!
//! ## Features
//!
//! - `no_std` compatible by default
//! - Zero-allocation parsing and construction
//! - Delta-coded option records with short and extended length forms
//! - Random option lookup over received buffers without a full decode
//! - Clean enum-based API for message types, methods, response codes and
//!   media types
//! - Wire format using smoltcp-inspired zero-copy pattern
//!
//! ## Architecture
//!
//! Following the smoltcp wire pattern:
//! - `packet` - Zero-copy wrapper around raw PDU buffers
//! - `pdu` - Owned builder assembling a PDU for transmission
//! - `options` - Delta-coded option record codec and option-area walker
//! - `field` - Field offset definitions

/// Error type for parsing and construction failures.
pub mod error;

/// Field offset definitions for all wire format structures.
pub mod field;

/// Option record codec, option-area walker, and option/media enumerations.
pub mod options;

/// Zero-copy packet wrapper for received CoAP PDUs.
pub mod packet;

/// Owned PDU builder for construction and serialization.
pub mod pdu;

/// Prelude module for convenient imports.
pub mod prelude;

/// Default CoAP UDP port.
pub const DEFAULT_PORT: u16 = 61616;

/// Maximum size of a CoAP PDU in bytes, header, options and payload included.
pub const MAX_PDU_SIZE: usize = 1400;

/// Default maximum object lifetime in seconds (the max-age option default).
pub const DEFAULT_MAX_AGE: u32 = 60;

/// Default response timeout in seconds.
pub const DEFAULT_RESPONSE_TIMEOUT: u32 = 1;

/// Default maximum number of retransmissions.
pub const DEFAULT_MAX_RETRANSMIT: u32 = 5;

/// Protocol version carried in the header's 2-bit version field.
pub const DEFAULT_VERSION: u8 = 1;

/// Transaction id value reserved as "no transaction".
pub const INVALID_TID: u16 = 0;

/// Compact form of the well-known resources URI.
pub const DEFAULT_URI_WELLKNOWN: &str = "/.well-known/r";


// Compile-time assertion that we don't link against an allocator in no_std mode
// This will fail to compile if somehow an allocator is required
#[cfg(not(test))]
unsafe extern "C" {
    // This symbol should NOT exist - if it's required, compilation will fail with "undefined reference"
    // Remove this if you ever need to add allocation support
    #[link_name = "\n\nERROR: This crate must not require an allocator\n\n"]
    fn __rust_alloc_trigger_compile_error() -> !;
}
