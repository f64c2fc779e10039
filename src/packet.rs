//! Packet module
//!
//! This module contains the `Packet` type, which is a read/write wrapper around a CoAP PDU buffer.

use crate::error::Error;
use crate::field;
use crate::options::OptionsIter;
use byteorder::{ByteOrder, NetworkEndian};
use core::fmt;

/// Result type alias using the crate's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// A read/write wrapper around a CoAP PDU buffer.
///
/// CoAP PDU format:
/// - Version (2 bits), type (2 bits), option count (4 bits)
/// - Code (1 byte)
/// - Transaction id (2 bytes, network byte order)
/// - Options (variable, delta-coded)
/// - Payload (variable)
///
/// All sub-byte fields are packed by explicit shift and mask into a canonical
/// byte layout, so the emitted bytes are identical on every host. Options are
/// not decoded eagerly; `option` and `payload` walk the option area on demand
/// by decoding exactly `opt_count` records.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> Packet<T> {
    /// Creates a new unchecked `Packet`.
    ///
    /// # Arguments
    ///
    /// * `buffer` - A buffer containing the PDU data.
    ///
    /// # Returns
    ///
    /// * `Packet` - A new `Packet` instance.
    pub const fn new_unchecked(buffer: T) -> Packet<T> {
        Packet { buffer }
    }

    /// Creates a new checked `Packet`.
    ///
    /// # Arguments
    ///
    /// * `buffer` - A buffer containing the PDU data.
    ///
    /// # Returns
    ///
    /// * `Result<Packet>` - A new `Packet` instance if the buffer holds at
    ///   least a full header.
    pub fn new_checked(buffer: T) -> Result<Packet<T>> {
        let packet = Self::new_unchecked(buffer);
        packet.check_len()?;
        Ok(packet)
    }

    /// Checks that the buffer can hold the fixed header.
    ///
    /// Option records are validated lazily, during lookup, not here.
    ///
    /// # Returns
    ///
    /// * `Result<()>` - Ok if the header fits, otherwise `MalformedHeader`.
    pub fn check_len(&self) -> Result<()> {
        if self.buffer.as_ref().len() < field::header::LENGTH {
            return Err(Error::MalformedHeader);
        }
        Ok(())
    }

    /// Returns the inner buffer.
    pub fn into_inner(self) -> T {
        self.buffer
    }

    /// Returns a reference to the inner buffer.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    /// Returns the 2-bit protocol version.
    pub fn version(&self) -> u8 {
        let vtoc = self.buffer.as_ref()[field::header::VTOC.start];
        (vtoc >> field::header::VERSION_SHIFT) & field::header::VERSION_MASK
    }

    /// Returns the 2-bit message type.
    ///
    /// The raw field value is returned without interpretation; see
    /// [`MessageType`] for the defined values.
    pub fn msg_type(&self) -> u8 {
        let vtoc = self.buffer.as_ref()[field::header::VTOC.start];
        (vtoc >> field::header::TYPE_SHIFT) & field::header::TYPE_MASK
    }

    /// Returns the 4-bit option count.
    pub fn opt_count(&self) -> u8 {
        self.buffer.as_ref()[field::header::VTOC.start] & field::header::OPTCNT_MASK
    }

    /// Returns the code byte: request method (1-10) or response code (40-255).
    ///
    /// No range validation is applied; code semantics belong to a higher
    /// layer.
    pub fn code(&self) -> u8 {
        self.buffer.as_ref()[field::header::CODE.start]
    }

    /// Returns the 16-bit transaction id.
    pub fn tid(&self) -> u16 {
        NetworkEndian::read_u16(&self.buffer.as_ref()[field::header::TID])
    }

    /// Returns an iterator over the option area.
    ///
    /// Yields `(absolute_number, value)` pairs for exactly `opt_count`
    /// records.
    pub fn options(&self) -> OptionsIter<'_> {
        let area = &self.buffer.as_ref()[field::header::OPTIONS_START..];
        OptionsIter::new(area, self.opt_count())
    }

    /// Looks up an option by absolute number.
    ///
    /// Linearly decodes records from the start of the option area,
    /// accumulating deltas, and returns the first record whose absolute
    /// number matches. The scan stops early once the accumulated number
    /// passes the target. Cost is O(option count) per lookup, a deliberate
    /// trade favoring the compact encoding; the header caps the count at 15.
    ///
    /// # Arguments
    ///
    /// * `number` - Absolute option number to find.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(value))` - The matching record's value bytes.
    /// * `Ok(None)` - No record with that number.
    /// * `Err(TruncatedOption)` - A record overruns the buffer.
    pub fn option(&self, number: u16) -> Result<Option<&[u8]>> {
        for item in self.options() {
            let (current, value) = item?;
            if current == number {
                return Ok(Some(value));
            }
            if current > number {
                return Ok(None);
            }
        }
        Ok(None)
    }

    /// Returns the payload: everything after the last declared option.
    ///
    /// The payload boundary is found by decoding exactly `opt_count` records;
    /// the wire format carries no payload length prefix.
    ///
    /// # Returns
    ///
    /// * `Ok(slice)` - The payload bytes (possibly empty).
    /// * `Err(TruncatedOption)` - A record overruns the buffer.
    pub fn payload(&self) -> Result<&[u8]> {
        let mut iter = self.options();
        for item in &mut iter {
            item?;
        }
        Ok(&self.buffer.as_ref()[field::header::OPTIONS_START + iter.offset()..])
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Sets the 2-bit protocol version.
    ///
    /// # Arguments
    ///
    /// * `version` - The version value (only the low 2 bits are used).
    pub fn set_version(&mut self, version: u8) {
        let vtoc = &mut self.buffer.as_mut()[field::header::VTOC.start];
        *vtoc = (*vtoc & !(field::header::VERSION_MASK << field::header::VERSION_SHIFT))
            | ((version & field::header::VERSION_MASK) << field::header::VERSION_SHIFT);
    }

    /// Sets the 2-bit message type.
    ///
    /// # Arguments
    ///
    /// * `msg_type` - The type value (only the low 2 bits are used).
    pub fn set_msg_type(&mut self, msg_type: u8) {
        let vtoc = &mut self.buffer.as_mut()[field::header::VTOC.start];
        *vtoc = (*vtoc & !(field::header::TYPE_MASK << field::header::TYPE_SHIFT))
            | ((msg_type & field::header::TYPE_MASK) << field::header::TYPE_SHIFT);
    }

    /// Sets the 4-bit option count.
    ///
    /// # Arguments
    ///
    /// * `count` - The option count (only the low 4 bits are used).
    pub fn set_opt_count(&mut self, count: u8) {
        let vtoc = &mut self.buffer.as_mut()[field::header::VTOC.start];
        *vtoc = (*vtoc & !field::header::OPTCNT_MASK) | (count & field::header::OPTCNT_MASK);
    }

    /// Sets the code byte.
    ///
    /// # Arguments
    ///
    /// * `code` - Request method or response code.
    pub fn set_code(&mut self, code: u8) {
        self.buffer.as_mut()[field::header::CODE.start] = code;
    }

    /// Sets the 16-bit transaction id.
    ///
    /// # Arguments
    ///
    /// * `tid` - The transaction id, written in network byte order.
    pub fn set_tid(&mut self, tid: u16) {
        NetworkEndian::write_u16(&mut self.buffer.as_mut()[field::header::TID], tid);
    }
}

impl<T: AsRef<[u8]>> fmt::Display for Packet<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "CoAP PDU: ver={}, type={}, optcnt={}, code={}, tid=0x{:04X}",
            self.version(),
            self.msg_type(),
            self.opt_count(),
            self.code(),
            self.tid()
        )
    }
}

/// Message type codes carried in the header's type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    /// Confirmable message (0), requires an acknowledgement or reset.
    Confirmable = 0,
    /// Non-confirmable message (1), one-shot.
    NonConfirmable = 1,
    /// Acknowledgement (2) for a confirmable message.
    Acknowledgement = 2,
    /// Reset (3), indicates an error in a received message.
    Reset = 3,
}

impl MessageType {
    /// Convert a u8 value to a MessageType.
    ///
    /// # Parameters
    /// * `value` - The type field value
    ///
    /// # Returns
    /// * `Some(MessageType)` for values 0-3
    /// * `None` otherwise
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(MessageType::Confirmable),
            1 => Some(MessageType::NonConfirmable),
            2 => Some(MessageType::Acknowledgement),
            3 => Some(MessageType::Reset),
            _ => None,
        }
    }

    /// Convert the MessageType to its u8 representation.
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// Request method codes carried in the header's code field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Method {
    /// GET (1).
    Get = 1,
    /// POST (2).
    Post = 2,
    /// PUT (3).
    Put = 3,
    /// DELETE (4).
    Delete = 4,
}

impl Method {
    /// Convert a u8 value to a Method.
    ///
    /// # Parameters
    /// * `value` - The code field value
    ///
    /// # Returns
    /// * `Some(Method)` for values 1-4
    /// * `None` otherwise
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Method::Get),
            2 => Some(Method::Post),
            3 => Some(Method::Put),
            4 => Some(Method::Delete),
            _ => None,
        }
    }

    /// Convert the Method to its u8 representation.
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// Response codes carried in the header's code field.
///
/// Codes follow the `http_class * 40 + http_remainder` convention, e.g.
/// HTTP 404 maps to `4 * 40 + 4 = 164`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseCode {
    /// 100 Continue (40).
    Continue = 40,
    /// 200 OK (80).
    Ok = 80,
    /// 201 Created (81).
    Created = 81,
    /// 304 Not Modified (124).
    NotModified = 124,
    /// 400 Bad Request (160).
    BadRequest = 160,
    /// 404 Not Found (164).
    NotFound = 164,
    /// 405 Method Not Allowed (165).
    MethodNotAllowed = 165,
    /// 415 Unsupported Media Type (175).
    UnsupportedMediaType = 175,
    /// 500 Internal Server Error (200).
    InternalServerError = 200,
    /// 504 Gateway Timeout (204).
    GatewayTimeout = 204,
}

impl ResponseCode {
    /// Convert a u8 value to a ResponseCode.
    ///
    /// # Parameters
    /// * `value` - The code field value
    ///
    /// # Returns
    /// * `Some(ResponseCode)` if value matches a defined response code
    /// * `None` otherwise
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            40 => Some(ResponseCode::Continue),
            80 => Some(ResponseCode::Ok),
            81 => Some(ResponseCode::Created),
            124 => Some(ResponseCode::NotModified),
            160 => Some(ResponseCode::BadRequest),
            164 => Some(ResponseCode::NotFound),
            165 => Some(ResponseCode::MethodNotAllowed),
            175 => Some(ResponseCode::UnsupportedMediaType),
            200 => Some(ResponseCode::InternalServerError),
            204 => Some(ResponseCode::GatewayTimeout),
            _ => None,
        }
    }

    /// Convert the ResponseCode to its u8 representation.
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Encodes an HTTP status code using the `class * 40 + remainder` rule.
    ///
    /// Not every encodable status has a named variant; the result is the raw
    /// code byte.
    ///
    /// # Parameters
    /// * `status` - HTTP status code, e.g. 404
    ///
    /// # Returns
    /// The wire code byte
    pub const fn from_http_status(status: u16) -> u8 {
        ((status / 100) * 40 + status % 100) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_new_unchecked() {
        let buffer = [0u8; 8];
        let packet = Packet::new_unchecked(&buffer[..]);
        assert_eq!(packet.as_slice().len(), 8);
    }

    #[test]
    fn test_packet_too_short() {
        let buffer = [0u8; 3];
        let result = Packet::new_checked(&buffer[..]);
        assert_eq!(result, Err(Error::MalformedHeader));
    }

    #[test]
    fn test_header_field_packing() {
        let mut buffer = [0u8; 4];
        let mut packet = Packet::new_unchecked(&mut buffer[..]);
        packet.set_version(1);
        packet.set_msg_type(MessageType::Acknowledgement.as_u8());
        packet.set_opt_count(5);
        packet.set_code(Method::Get.as_u8());
        packet.set_tid(0xBEEF);

        // Canonical layout: version in bits 7-6, type in 5-4, count in 3-0.
        assert_eq!(packet.as_slice()[0], 0b01_10_0101);
        assert_eq!(packet.as_slice()[1], 1);
        assert_eq!(packet.as_slice()[2..4], [0xBE, 0xEF]);

        assert_eq!(packet.version(), 1);
        assert_eq!(packet.msg_type(), 2);
        assert_eq!(packet.opt_count(), 5);
        assert_eq!(packet.code(), 1);
        assert_eq!(packet.tid(), 0xBEEF);
    }

    #[test]
    fn test_header_fields_do_not_clobber_each_other() {
        let mut buffer = [0u8; 4];
        let mut packet = Packet::new_unchecked(&mut buffer[..]);
        packet.set_opt_count(0x0F);
        packet.set_version(0x03);
        packet.set_msg_type(0x03);
        assert_eq!(packet.as_slice()[0], 0xFF);
        packet.set_msg_type(0);
        assert_eq!(packet.version(), 3);
        assert_eq!(packet.opt_count(), 15);
        assert_eq!(packet.msg_type(), 0);
    }

    #[test]
    fn test_header_roundtrip() {
        for version in 0..4u8 {
            for msg_type in 0..4u8 {
                for count in [0u8, 1, 7, 15] {
                    let mut buffer = [0u8; 4];
                    let mut packet = Packet::new_unchecked(&mut buffer[..]);
                    packet.set_version(version);
                    packet.set_msg_type(msg_type);
                    packet.set_opt_count(count);
                    packet.set_code(0xA4);
                    packet.set_tid(0x1234);
                    assert_eq!(packet.version(), version);
                    assert_eq!(packet.msg_type(), msg_type);
                    assert_eq!(packet.opt_count(), count);
                    assert_eq!(packet.code(), 0xA4);
                    assert_eq!(packet.tid(), 0x1234);
                }
            }
        }
    }

    #[test]
    fn test_packet_decode_known_bytes() {
        // Version 1, confirmable, 2 options, GET, tid 0x1234.
        // Options: uri-authority (5) "host", uri-path (9, delta 4) "x".
        let buffer = [
            0x42, 0x01, 0x12, 0x34, // header
            0x54, b'h', b'o', b's', b't', // delta 5, length 4
            0x41, b'x', // delta 4, length 1
            0xDE, 0xAD, // payload
        ];
        let packet = Packet::new_checked(&buffer[..]).unwrap();
        assert_eq!(packet.version(), 1);
        assert_eq!(packet.msg_type(), MessageType::Confirmable.as_u8());
        assert_eq!(packet.opt_count(), 2);
        assert_eq!(packet.code(), Method::Get.as_u8());
        assert_eq!(packet.tid(), 0x1234);

        assert_eq!(packet.option(5), Ok(Some(&b"host"[..])));
        assert_eq!(packet.option(9), Ok(Some(&b"x"[..])));
        assert_eq!(packet.payload(), Ok(&[0xDE, 0xAD][..]));
    }

    #[test]
    fn test_packet_option_not_found() {
        // Numbers 1 and 9; 5 falls in the gap, 13 past the end.
        let buffer = [
            0x42, 0x01, 0x00, 0x01, // header, 2 options
            0x11, b'a', // number 1
            0x81, b'b', // number 9 (delta 8)
        ];
        let packet = Packet::new_checked(&buffer[..]).unwrap();
        assert_eq!(packet.option(5), Ok(None));
        assert_eq!(packet.option(13), Ok(None));
        assert_eq!(packet.option(1), Ok(Some(&b"a"[..])));
    }

    #[test]
    fn test_packet_truncated_option_area() {
        // Header declares one option whose value overruns the buffer.
        let buffer = [0x41, 0x01, 0x00, 0x01, 0x13, 0xAA];
        let packet = Packet::new_checked(&buffer[..]).unwrap();
        assert_eq!(packet.option(1), Err(Error::TruncatedOption));
        assert_eq!(packet.payload(), Err(Error::TruncatedOption));
    }

    #[test]
    fn test_packet_payload_without_options() {
        let buffer = [0x40, 0x50, 0x00, 0x07, 0x01, 0x02, 0x03];
        let packet = Packet::new_checked(&buffer[..]).unwrap();
        assert_eq!(packet.payload(), Ok(&[0x01, 0x02, 0x03][..]));
    }

    #[test]
    fn test_message_type_table() {
        assert_eq!(MessageType::from_u8(0), Some(MessageType::Confirmable));
        assert_eq!(MessageType::from_u8(3), Some(MessageType::Reset));
        assert_eq!(MessageType::from_u8(4), None);
        assert_eq!(MessageType::NonConfirmable.as_u8(), 1);
    }

    #[test]
    fn test_method_table() {
        assert_eq!(Method::from_u8(1), Some(Method::Get));
        assert_eq!(Method::from_u8(4), Some(Method::Delete));
        assert_eq!(Method::from_u8(5), None);
        assert_eq!(Method::Put.as_u8(), 3);
    }

    #[test]
    fn test_response_code_table() {
        assert_eq!(ResponseCode::from_u8(80), Some(ResponseCode::Ok));
        assert_eq!(ResponseCode::from_u8(164), Some(ResponseCode::NotFound));
        assert_eq!(ResponseCode::from_u8(0), None);
        assert_eq!(ResponseCode::GatewayTimeout.as_u8(), 204);
    }

    #[test]
    fn test_response_code_http_convention() {
        assert_eq!(ResponseCode::from_http_status(100), 40);
        assert_eq!(ResponseCode::from_http_status(200), 80);
        assert_eq!(ResponseCode::from_http_status(404), 164);
        assert_eq!(ResponseCode::from_http_status(504), 204);
    }
}
