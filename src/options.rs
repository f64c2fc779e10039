//! Option record codec for CoAP PDUs.
//!
//! This module provides the zero-copy wrapper around a single delta-coded
//! option record, the emit path used by the PDU builder, and the iterator
//! that walks an encoded option area while accumulating deltas into absolute
//! option numbers. The well-known option number and media type enumerations
//! live here as well.

use crate::error::Error;
use crate::field;

/// Result type alias using the crate's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Returns the encoded size of an option record carrying `value_len` bytes.
///
/// Short form records cost one header byte, extended form records two. The
/// builder uses this to track total PDU size without re-encoding.
///
/// # Parameters
/// * `value_len` - Length of the option value in bytes
///
/// # Returns
/// Total record size in bytes including the control byte(s)
pub const fn encoded_len(value_len: usize) -> usize {
    if value_len <= field::option::MAX_SHORT_LENGTH {
        field::option::SHORT_HEADER_LEN + value_len
    } else {
        field::option::EXTENDED_HEADER_LEN + value_len
    }
}

/// Zero-copy wrapper around one encoded option record.
///
/// Wire format:
/// ```text
/// 0               1
/// 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Delta | Len   |  Len - 15     |  <- second byte only when Len == 15
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The low nibble of the control byte is the value length for the short form
/// (0-14); the value 15 flags the extended form, where the following byte
/// stores `length - 15` for lengths 15-270. The buffer handed to this wrapper
/// may extend past the record; accessors only touch the record's own bytes.
#[derive(Debug, Clone, Copy)]
pub struct Opt<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> Opt<T> {
    /// Create an option wrapper without validation.
    ///
    /// # Parameters
    /// * `buffer` - Buffer starting at the record's control byte
    ///
    /// # Safety
    /// This does not validate buffer length. Use `new_checked` for validation.
    pub const fn new_unchecked(buffer: T) -> Opt<T> {
        Opt { buffer }
    }

    /// Create an option wrapper with full length validation.
    ///
    /// # Parameters
    /// * `buffer` - Buffer starting at the record's control byte
    ///
    /// # Returns
    /// * `Ok(Opt)` if the control byte, extended-length byte (when flagged)
    ///   and the whole declared value fit in the buffer
    /// * `Err(Error::TruncatedOption)` otherwise
    pub fn new_checked(buffer: T) -> Result<Opt<T>> {
        let opt = Self::new_unchecked(buffer);
        opt.check_len()?;
        Ok(opt)
    }

    /// Validate that the whole record fits in the buffer.
    ///
    /// # Returns
    /// * `Ok(())` if the record is complete
    /// * `Err(Error::TruncatedOption)` if any part of it is missing
    pub fn check_len(&self) -> Result<()> {
        let len = self.buffer.as_ref().len();
        if len < field::option::SHORT_HEADER_LEN {
            return Err(Error::TruncatedOption);
        }
        if self.is_extended() && len < field::option::EXTENDED_HEADER_LEN {
            return Err(Error::TruncatedOption);
        }
        if len < self.total_len() {
            return Err(Error::TruncatedOption);
        }
        Ok(())
    }

    /// Returns the inner buffer.
    pub fn into_inner(self) -> T {
        self.buffer
    }

    /// Returns the 4-bit delta from the previous option's absolute number.
    pub fn delta(&self) -> u8 {
        let control = self.buffer.as_ref()[field::option::CONTROL.start];
        (control >> field::option::DELTA_SHIFT) & field::option::DELTA_MASK
    }

    /// Returns true if the record uses the extended length form.
    pub fn is_extended(&self) -> bool {
        let control = self.buffer.as_ref()[field::option::CONTROL.start];
        control & field::option::LENGTH_MASK == field::option::EXTENDED_FLAG
    }

    /// Returns the value length in bytes (0-270).
    ///
    /// Short form reads the low nibble directly; extended form reads the
    /// second byte, which stores `length - 15`.
    pub fn length(&self) -> usize {
        let data = self.buffer.as_ref();
        if self.is_extended() {
            data[field::option::EXT_LENGTH.start] as usize + field::option::EXTENDED_FLAG as usize
        } else {
            (data[field::option::CONTROL.start] & field::option::LENGTH_MASK) as usize
        }
    }

    /// Returns the record header length: 1 byte short form, 2 bytes extended.
    pub fn header_len(&self) -> usize {
        if self.is_extended() {
            field::option::EXTENDED_HEADER_LEN
        } else {
            field::option::SHORT_HEADER_LEN
        }
    }

    /// Returns the total encoded record size, header plus value.
    pub fn total_len(&self) -> usize {
        self.header_len() + self.length()
    }
}

impl<'a> Opt<&'a [u8]> {
    /// Returns the option value bytes.
    ///
    /// The slice borrows from the underlying buffer, not from the wrapper.
    pub fn value(&self) -> &'a [u8] {
        let range = field::option::VALUE(self.header_len(), self.length());
        &self.buffer[range]
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Opt<T> {
    /// Sets the 4-bit delta nibble, preserving the length nibble.
    ///
    /// # Parameters
    /// * `delta` - Delta from the previous option's absolute number (0-15)
    pub fn set_delta(&mut self, delta: u8) {
        let control = &mut self.buffer.as_mut()[field::option::CONTROL.start];
        *control = (*control & field::option::LENGTH_MASK)
            | ((delta & field::option::DELTA_MASK) << field::option::DELTA_SHIFT);
    }

    /// Sets the value length, choosing the short or extended form.
    ///
    /// Lengths up to 14 are stored in the control byte's low nibble; longer
    /// values set the extended flag and store `length - 15` in the second
    /// byte. The delta nibble is preserved.
    ///
    /// # Parameters
    /// * `length` - Value length in bytes (0-270)
    pub fn set_length(&mut self, length: usize) {
        let data = self.buffer.as_mut();
        let delta_bits = data[field::option::CONTROL.start]
            & (field::option::DELTA_MASK << field::option::DELTA_SHIFT);
        if length <= field::option::MAX_SHORT_LENGTH {
            data[field::option::CONTROL.start] =
                delta_bits | (length as u8 & field::option::LENGTH_MASK);
        } else {
            data[field::option::CONTROL.start] = delta_bits | field::option::EXTENDED_FLAG;
            data[field::option::EXT_LENGTH.start] =
                (length - field::option::EXTENDED_FLAG as usize) as u8;
        }
    }

    /// Returns a mutable slice over the value bytes.
    ///
    /// The length must have been set beforehand so the value range is known.
    pub fn value_mut(&mut self) -> &mut [u8] {
        let range = field::option::VALUE(self.header_len(), self.length());
        &mut self.buffer.as_mut()[range]
    }
}

/// Encodes one option record into `dst`.
///
/// Writes the control byte, the extended-length byte when needed, and the
/// value bytes. `dst` must hold at least `encoded_len(value.len())` bytes;
/// the PDU builder guarantees this by sizing the destination first.
///
/// # Parameters
/// * `delta` - Delta from the previous option's absolute number
/// * `value` - Raw option value bytes
/// * `dst` - Destination buffer, at least `encoded_len(value.len())` bytes
///
/// # Returns
/// * `Ok(size)` - Number of bytes written
/// * `Err(Error::DeltaTooLarge)` if `delta` exceeds 15
/// * `Err(Error::OptionTooLong)` if the value exceeds 270 bytes
pub fn emit(delta: u16, value: &[u8], dst: &mut [u8]) -> Result<usize> {
    if delta > field::option::MAX_DELTA {
        return Err(Error::DeltaTooLarge(delta));
    }
    if value.len() > field::option::MAX_LENGTH {
        return Err(Error::OptionTooLong(value.len()));
    }
    let size = encoded_len(value.len());
    let mut opt = Opt::new_unchecked(&mut dst[..size]);
    opt.set_delta(delta as u8);
    opt.set_length(value.len());
    opt.value_mut().copy_from_slice(value);
    Ok(size)
}

/// Iterator over an encoded option area.
///
/// Decodes exactly the declared number of records, accumulating each record's
/// delta into the running absolute option number. The byte offset reached by
/// the walk marks the payload boundary; there is no length prefix on the
/// option area.
///
/// Yields `Ok((absolute_number, value))` per record. A truncated record
/// yields one `Err(Error::TruncatedOption)` and ends the iteration.
#[derive(Debug, Clone)]
pub struct OptionsIter<'a> {
    buffer: &'a [u8],
    offset: usize,
    remaining: u8,
    number: u16,
}

impl<'a> OptionsIter<'a> {
    /// Create an iterator over an option area.
    ///
    /// # Parameters
    /// * `buffer` - The bytes following the PDU header (options then payload)
    /// * `count` - Declared option count from the header
    pub fn new(buffer: &'a [u8], count: u8) -> OptionsIter<'a> {
        OptionsIter {
            buffer,
            offset: 0,
            remaining: count,
            number: 0,
        }
    }

    /// Returns the byte offset consumed so far, relative to the area start.
    ///
    /// After the iterator is exhausted without error this is the payload
    /// boundary.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for OptionsIter<'a> {
    type Item = Result<(u16, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let area: &'a [u8] = self.buffer;
        let opt = match Opt::new_checked(&area[self.offset..]) {
            Ok(opt) => opt,
            Err(err) => {
                self.remaining = 0;
                return Some(Err(err));
            }
        };
        self.remaining -= 1;
        self.number += opt.delta() as u16;
        self.offset += opt.total_len();
        Some(Ok((self.number, opt.value())))
    }
}

/// Well-known option numbers.
///
/// These are the absolute option number assignments; on the wire a record
/// carries only the delta from its predecessor. The codec itself treats
/// numbers as opaque `u16` keys and does not require them to be from this
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum OptionNumber {
    /// Content-type of the payload (1), 8-bit media type code.
    ContentType = 1,
    /// Maximum object lifetime in seconds (2), defaults to 60.
    MaxAge = 2,
    /// URI scheme (3), string, defaults to "coap".
    UriScheme = 3,
    /// Entity tag (4), 1-4 opaque bytes.
    ETag = 4,
    /// URI authority (5), string.
    UriAuthority = 5,
    /// Location of a created resource (6), string.
    Location = 6,
    /// URI path (9), string.
    UriPath = 9,
    /// Block transfer descriptor (13), unsigned integer.
    Block = 13,
}

impl OptionNumber {
    /// Convert a u16 value to an OptionNumber.
    ///
    /// # Parameters
    /// * `value` - The option number to convert
    ///
    /// # Returns
    /// * `Some(OptionNumber)` if value matches a well-known number
    /// * `None` otherwise
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(OptionNumber::ContentType),
            2 => Some(OptionNumber::MaxAge),
            3 => Some(OptionNumber::UriScheme),
            4 => Some(OptionNumber::ETag),
            5 => Some(OptionNumber::UriAuthority),
            6 => Some(OptionNumber::Location),
            9 => Some(OptionNumber::UriPath),
            13 => Some(OptionNumber::Block),
            _ => None,
        }
    }

    /// Convert the OptionNumber to its u16 representation.
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

/// Media type codes carried in the content-type option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MediaType {
    /// text/plain (UTF-8), code 0.
    TextPlain = 0,
    /// text/xml (UTF-8), code 1.
    TextXml = 1,
    /// text/csv (UTF-8), code 2.
    TextCsv = 2,
    /// text/html (UTF-8), code 3.
    TextHtml = 3,
    /// image/gif, code 21.
    ImageGif = 21,
    /// image/jpeg, code 22.
    ImageJpeg = 22,
    /// image/png, code 23.
    ImagePng = 23,
    /// image/tiff, code 24.
    ImageTiff = 24,
    /// audio/raw, code 25.
    AudioRaw = 25,
    /// video/raw, code 26.
    VideoRaw = 26,
    /// application/link-format, code 40.
    ApplicationLinkFormat = 40,
    /// application/xml, code 41.
    ApplicationXml = 41,
    /// application/octet-stream, code 42.
    ApplicationOctetStream = 42,
    /// application/rdf+xml, code 43.
    ApplicationRdfXml = 43,
    /// application/soap+xml, code 44.
    ApplicationSoapXml = 44,
    /// application/atom+xml, code 45.
    ApplicationAtomXml = 45,
    /// application/xmpp+xml, code 46.
    ApplicationXmppXml = 46,
    /// application/exi, code 47.
    ApplicationExi = 47,
    /// application/x-bxml, code 48.
    ApplicationXBxml = 48,
    /// application/fastinfoset, code 49.
    ApplicationFastinfoset = 49,
    /// application/soap+fastinfoset, code 50.
    ApplicationSoapFastinfoset = 50,
    /// application/json, code 51.
    ApplicationJson = 51,
}

impl MediaType {
    /// Convert a u8 value to a MediaType.
    ///
    /// # Parameters
    /// * `value` - The media type code to convert
    ///
    /// # Returns
    /// * `Some(MediaType)` if value matches a defined media type
    /// * `None` otherwise
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(MediaType::TextPlain),
            1 => Some(MediaType::TextXml),
            2 => Some(MediaType::TextCsv),
            3 => Some(MediaType::TextHtml),
            21 => Some(MediaType::ImageGif),
            22 => Some(MediaType::ImageJpeg),
            23 => Some(MediaType::ImagePng),
            24 => Some(MediaType::ImageTiff),
            25 => Some(MediaType::AudioRaw),
            26 => Some(MediaType::VideoRaw),
            40 => Some(MediaType::ApplicationLinkFormat),
            41 => Some(MediaType::ApplicationXml),
            42 => Some(MediaType::ApplicationOctetStream),
            43 => Some(MediaType::ApplicationRdfXml),
            44 => Some(MediaType::ApplicationSoapXml),
            45 => Some(MediaType::ApplicationAtomXml),
            46 => Some(MediaType::ApplicationXmppXml),
            47 => Some(MediaType::ApplicationExi),
            48 => Some(MediaType::ApplicationXBxml),
            49 => Some(MediaType::ApplicationFastinfoset),
            50 => Some(MediaType::ApplicationSoapFastinfoset),
            51 => Some(MediaType::ApplicationJson),
            _ => None,
        }
    }

    /// Convert the MediaType to its u8 representation.
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}
