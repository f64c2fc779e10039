//! PDU builder.
//!
//! This module contains the `Pdu` type, an owned builder that assembles a
//! CoAP PDU for transmission: header fields, delta-coded options appended in
//! non-decreasing number order, and a trailing payload. The wire image is
//! kept contiguous in a fixed buffer at all times, so serialization is a
//! borrow, not a copy.

use crate::error::Error;
use crate::field;
use crate::options::{self, OptionsIter};
use crate::packet::Packet;
use crate::MAX_PDU_SIZE;
use core::fmt;

/// Result type alias using the crate's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// An owned CoAP PDU under construction.
///
/// A `Pdu` starts with a zeroed header, no options and no payload, and is
/// mutated exclusively through its append operations. Every operation either
/// fully applies its effect or leaves the PDU unchanged and reports the
/// failure.
///
/// Options must physically precede the payload in the byte stream, so
/// **appending an option discards any payload attached earlier**; callers
/// append all options first and call [`add_data`](Pdu::add_data) last, or
/// re-attach the payload after the final option.
///
/// # Examples
///
/// ```
/// use coap_wire::pdu::Pdu;
/// use coap_wire::packet::{Method, MessageType};
/// use coap_wire::options::OptionNumber;
///
/// let mut pdu = Pdu::new();
/// pdu.set_version(coap_wire::DEFAULT_VERSION);
/// pdu.set_msg_type(MessageType::Confirmable.as_u8());
/// pdu.set_code(Method::Get.as_u8());
/// pdu.set_tid(0x1234);
/// pdu.add_option(OptionNumber::UriPath.as_u16(), b"sensors").unwrap();
/// let wire = pdu.as_bytes();
/// assert_eq!(wire.len(), 4 + 1 + 7);
/// ```
#[derive(Clone)]
pub struct Pdu {
    buffer: [u8; MAX_PDU_SIZE],
    /// Length of header plus encoded options; the payload starts here.
    end: usize,
    payload_len: usize,
    /// Absolute number of the last appended option, for delta computation.
    last_number: u16,
}

impl Pdu {
    /// Creates an empty PDU: zeroed header, no options, no payload.
    ///
    /// The version field starts at zero like every other header field;
    /// callers set it explicitly (see [`DEFAULT_VERSION`](crate::DEFAULT_VERSION)).
    pub fn new() -> Pdu {
        Pdu {
            buffer: [0; MAX_PDU_SIZE],
            end: field::header::LENGTH,
            payload_len: 0,
            last_number: 0,
        }
    }

    fn header_mut(&mut self) -> Packet<&mut [u8]> {
        Packet::new_unchecked(&mut self.buffer[..])
    }

    fn header(&self) -> Packet<&[u8]> {
        Packet::new_unchecked(&self.buffer[..])
    }

    /// Returns the 2-bit protocol version.
    pub fn version(&self) -> u8 {
        self.header().version()
    }

    /// Sets the 2-bit protocol version.
    pub fn set_version(&mut self, version: u8) {
        self.header_mut().set_version(version);
    }

    /// Returns the 2-bit message type.
    pub fn msg_type(&self) -> u8 {
        self.header().msg_type()
    }

    /// Sets the 2-bit message type.
    pub fn set_msg_type(&mut self, msg_type: u8) {
        self.header_mut().set_msg_type(msg_type);
    }

    /// Returns the code byte.
    pub fn code(&self) -> u8 {
        self.header().code()
    }

    /// Sets the code byte: request method (1-10) or response code (40-255).
    pub fn set_code(&mut self, code: u8) {
        self.header_mut().set_code(code);
    }

    /// Returns the 16-bit transaction id.
    pub fn tid(&self) -> u16 {
        self.header().tid()
    }

    /// Sets the 16-bit transaction id (carried in network byte order).
    pub fn set_tid(&mut self, tid: u16) {
        self.header_mut().set_tid(tid);
    }

    /// Returns the number of options appended so far.
    pub fn opt_count(&self) -> u8 {
        self.header().opt_count()
    }

    /// Appends an option record.
    ///
    /// Options carry the delta from the previous option's absolute number on
    /// the wire, so they must be appended in non-decreasing number order and
    /// each step must fit the 4-bit delta field. A gap larger than 15 is not
    /// split automatically; bridge it by appending zero-length filler options
    /// at intermediate numbers.
    ///
    /// Appending an option discards any payload attached earlier, because
    /// options precede the payload in the byte stream. Re-attach the payload
    /// with [`add_data`](Pdu::add_data) after the final option. A *failed*
    /// call leaves the PDU, payload included, untouched.
    ///
    /// # Arguments
    ///
    /// * `number` - Absolute option number.
    /// * `value` - Raw option value, at most 270 bytes.
    ///
    /// # Returns
    ///
    /// * `Err(OptionCountExceeded)` - The header already declares 15 options.
    /// * `Err(OutOfOrderOption)` - `number` is below the last appended number.
    /// * `Err(DeltaTooLarge)` - The step from the last number exceeds 15.
    /// * `Err(OptionTooLong)` - The value exceeds 270 bytes.
    /// * `Err(PduOverflow)` - The record would pass the maximum PDU size.
    pub fn add_option(&mut self, number: u16, value: &[u8]) -> Result<()> {
        if self.opt_count() >= field::header::MAX_OPTIONS {
            return Err(Error::OptionCountExceeded);
        }
        if number < self.last_number {
            return Err(Error::OutOfOrderOption);
        }
        let delta = number - self.last_number;
        if delta > field::option::MAX_DELTA {
            return Err(Error::DeltaTooLarge(delta));
        }
        if value.len() > field::option::MAX_LENGTH {
            return Err(Error::OptionTooLong(value.len()));
        }
        let size = options::encoded_len(value.len());
        if self.end + size > MAX_PDU_SIZE {
            return Err(Error::PduOverflow);
        }

        // All checks passed; the record lands where the payload would start,
        // so the stored payload is dropped.
        self.payload_len = 0;
        options::emit(delta, value, &mut self.buffer[self.end..self.end + size])?;
        self.end += size;
        let count = self.opt_count() + 1;
        self.header_mut().set_opt_count(count);
        self.last_number = number;
        Ok(())
    }

    /// Attaches the trailing payload, replacing any prior payload.
    ///
    /// Call after the last option; a later [`add_option`](Pdu::add_option)
    /// discards the payload again.
    ///
    /// # Arguments
    ///
    /// * `data` - Payload bytes.
    ///
    /// # Returns
    ///
    /// * `Err(PduOverflow)` - Header plus options plus `data` would exceed
    ///   the maximum PDU size. The PDU is unchanged and remains usable.
    pub fn add_data(&mut self, data: &[u8]) -> Result<()> {
        if self.end + data.len() > MAX_PDU_SIZE {
            return Err(Error::PduOverflow);
        }
        self.buffer[self.end..self.end + data.len()].copy_from_slice(data);
        self.payload_len = data.len();
        Ok(())
    }

    /// Returns the total encoded size: header, options and payload.
    pub fn len(&self) -> usize {
        self.end + self.payload_len
    }

    /// Returns true if the PDU carries no options and no payload.
    pub fn is_empty(&self) -> bool {
        self.len() == field::header::LENGTH
    }

    /// Returns the final wire bytes: header, then options in append order,
    /// then payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.len()]
    }

    /// Returns the attached payload (empty if none).
    pub fn payload(&self) -> &[u8] {
        &self.buffer[self.end..self.len()]
    }

    /// Looks up an appended option by absolute number.
    ///
    /// Walks the encoded option area exactly like a receiver would; see
    /// [`Packet::option`](crate::packet::Packet::option).
    pub fn option(&self, number: u16) -> Result<Option<&[u8]>> {
        let area = &self.buffer[field::header::OPTIONS_START..self.end];
        for item in OptionsIter::new(area, self.opt_count()) {
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
}

impl Default for Pdu {
    fn default() -> Pdu {
        Pdu::new()
    }
}

impl fmt::Debug for Pdu {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Pdu")
            .field("version", &self.version())
            .field("msg_type", &self.msg_type())
            .field("opt_count", &self.opt_count())
            .field("code", &self.code())
            .field("tid", &self.tid())
            .field("len", &self.len())
            .finish()
    }
}

impl fmt::Display for Pdu {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "CoAP PDU: ver={}, type={}, optcnt={}, code={}, tid=0x{:04X}, len={}",
            self.version(),
            self.msg_type(),
            self.opt_count(),
            self.code(),
            self.tid(),
            self.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{MessageType, Method};

    #[test]
    fn test_new_pdu_is_zeroed() {
        let pdu = Pdu::new();
        assert_eq!(pdu.as_bytes(), &[0, 0, 0, 0]);
        assert_eq!(pdu.len(), 4);
        assert!(pdu.is_empty());
        assert_eq!(pdu.opt_count(), 0);
        assert!(pdu.payload().is_empty());
    }

    #[test]
    fn test_header_passthrough() {
        let mut pdu = Pdu::new();
        pdu.set_version(1);
        pdu.set_msg_type(MessageType::NonConfirmable.as_u8());
        pdu.set_code(Method::Post.as_u8());
        pdu.set_tid(0xCAFE);
        assert_eq!(pdu.as_bytes(), &[0x50, 0x02, 0xCA, 0xFE]);
    }

    #[test]
    fn test_add_option_computes_deltas() {
        let mut pdu = Pdu::new();
        pdu.add_option(1, &[0x2A]).unwrap();
        pdu.add_option(4, b"etag").unwrap();
        pdu.add_option(9, b"p").unwrap();
        assert_eq!(pdu.opt_count(), 3);
        // Numbers 1, 4, 9 encode as deltas 1, 3, 5.
        assert_eq!(
            pdu.as_bytes(),
            &[
                0x03, 0x00, 0x00, 0x00, // header: 3 options
                0x11, 0x2A, // delta 1, len 1
                0x34, b'e', b't', b'a', b'g', // delta 3, len 4
                0x51, b'p', // delta 5, len 1
            ]
        );
        assert_eq!(pdu.option(1), Ok(Some(&[0x2A][..])));
        assert_eq!(pdu.option(4), Ok(Some(&b"etag"[..])));
        assert_eq!(pdu.option(9), Ok(Some(&b"p"[..])));
        assert_eq!(pdu.option(5), Ok(None));
    }

    #[test]
    fn test_add_option_out_of_order() {
        let mut pdu = Pdu::new();
        pdu.add_option(9, b"p").unwrap();
        let before = pdu.as_bytes().to_vec();
        assert_eq!(pdu.add_option(5, b"x"), Err(Error::OutOfOrderOption));
        assert_eq!(pdu.as_bytes(), &before[..]);
        assert_eq!(pdu.opt_count(), 1);
    }

    #[test]
    fn test_add_option_equal_number_is_allowed() {
        // Delta 0 repeats the number, e.g. multiple uri-path segments.
        let mut pdu = Pdu::new();
        pdu.add_option(9, b"a").unwrap();
        pdu.add_option(9, b"b").unwrap();
        assert_eq!(pdu.as_bytes()[4..], [0x91, b'a', 0x01, b'b']);
    }

    #[test]
    fn test_add_option_delta_gap_needs_filler() {
        let mut pdu = Pdu::new();
        pdu.add_option(1, &[0]).unwrap();
        assert_eq!(pdu.add_option(20, b"block"), Err(Error::DeltaTooLarge(19)));
        assert_eq!(pdu.opt_count(), 1);
        // Bridge the gap with a zero-length filler at 16, as the wire format
        // requires, then the target number fits in one step.
        pdu.add_option(16, &[]).unwrap();
        pdu.add_option(20, b"block").unwrap();
        assert_eq!(pdu.opt_count(), 3);
        assert_eq!(pdu.option(16), Ok(Some(&[][..])));
        assert_eq!(pdu.option(20), Ok(Some(&b"block"[..])));
    }

    #[test]
    fn test_option_count_ceiling() {
        let mut pdu = Pdu::new();
        for _ in 0..15 {
            pdu.add_option(1, b"x").unwrap();
        }
        assert_eq!(pdu.opt_count(), 15);
        let before = pdu.as_bytes().to_vec();
        assert_eq!(pdu.add_option(1, b"x"), Err(Error::OptionCountExceeded));
        assert_eq!(pdu.as_bytes(), &before[..]);
    }

    #[test]
    fn test_add_option_discards_payload() {
        let mut pdu = Pdu::new();
        pdu.add_option(1, &[0]).unwrap();
        pdu.add_data(b"stale payload").unwrap();
        assert_eq!(pdu.payload(), b"stale payload");
        pdu.add_option(2, &[60]).unwrap();
        // The option lands where the payload sat; the payload is gone.
        assert!(pdu.payload().is_empty());
        assert_eq!(
            pdu.as_bytes(),
            &[0x02, 0x00, 0x00, 0x00, 0x11, 0x00, 0x11, 60]
        );
        // Re-attaching after the last option is the documented sequence.
        pdu.add_data(b"fresh").unwrap();
        assert_eq!(pdu.payload(), b"fresh");
    }

    #[test]
    fn test_failed_add_option_keeps_payload() {
        let mut pdu = Pdu::new();
        pdu.add_option(9, &[1]).unwrap();
        pdu.add_data(b"payload").unwrap();
        assert_eq!(pdu.add_option(5, &[2]), Err(Error::OutOfOrderOption));
        assert_eq!(pdu.payload(), b"payload");
    }

    #[test]
    fn test_add_data_replaces_payload() {
        let mut pdu = Pdu::new();
        pdu.add_data(b"first").unwrap();
        pdu.add_data(b"second!").unwrap();
        assert_eq!(pdu.payload(), b"second!");
        assert_eq!(pdu.len(), 4 + 7);
    }

    #[test]
    fn test_add_data_overflow_leaves_builder_usable() {
        let mut pdu = Pdu::new();
        let huge = [0u8; MAX_PDU_SIZE - field::header::LENGTH + 1];
        assert_eq!(pdu.add_data(&huge), Err(Error::PduOverflow));
        assert!(pdu.payload().is_empty());
        // A payload that fits still goes through afterwards.
        let exact = [0u8; MAX_PDU_SIZE - field::header::LENGTH];
        pdu.add_data(&exact).unwrap();
        assert_eq!(pdu.len(), MAX_PDU_SIZE);
    }

    #[test]
    fn test_add_option_overflow() {
        let mut pdu = Pdu::new();
        let big = [0u8; 270];
        // Five 272-byte records fit under 1400; the sixth does not.
        for _ in 0..5 {
            pdu.add_option(1, &big).unwrap();
        }
        assert_eq!(pdu.add_option(1, &big), Err(Error::PduOverflow));
        assert_eq!(pdu.opt_count(), 5);
        // Smaller records still fit.
        pdu.add_option(1, b"ok").unwrap();
        assert_eq!(pdu.opt_count(), 6);
    }

    #[test]
    fn test_add_option_value_too_long() {
        let mut pdu = Pdu::new();
        let overlong = [0u8; 271];
        assert_eq!(pdu.add_option(1, &overlong), Err(Error::OptionTooLong(271)));
        assert_eq!(pdu.len(), 4);
    }

    #[test]
    fn test_built_pdu_parses_back() {
        let mut pdu = Pdu::new();
        pdu.set_version(crate::DEFAULT_VERSION);
        pdu.set_msg_type(MessageType::Confirmable.as_u8());
        pdu.set_code(Method::Put.as_u8());
        pdu.set_tid(0x0102);
        pdu.add_option(1, &[crate::options::MediaType::TextPlain.as_u8()])
            .unwrap();
        pdu.add_option(9, b"temp").unwrap();
        pdu.add_data(b"21.5").unwrap();

        let packet = Packet::new_checked(pdu.as_bytes()).unwrap();
        assert_eq!(packet.version(), 1);
        assert_eq!(packet.msg_type(), 0);
        assert_eq!(packet.code(), 3);
        assert_eq!(packet.tid(), 0x0102);
        assert_eq!(packet.opt_count(), 2);
        assert_eq!(packet.option(1), Ok(Some(&[0][..])));
        assert_eq!(packet.option(9), Ok(Some(&b"temp"[..])));
        assert_eq!(packet.payload(), Ok(&b"21.5"[..]));
    }
}
