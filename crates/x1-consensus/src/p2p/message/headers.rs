//! Headers announcement message.
//!
//! Peers announce new blocks by sending their headers. Each header on the wire
//! is followed by two variable-length integers that are always zero: the
//! transaction count a generic block would carry, and a second count kept for
//! compatibility with older nodes. No transactions are ever included.
//!
//! ```text
//! varint(n) ‖ n × (header ‖ varint(0) ‖ varint(0))
//! ```

use crate::{
    blockdata::block::X1Header,
    consensus::{
        Decodable, EncodeDecodeError, Encodable, MAX_VEC_SIZE, VarInt, deserialize, serialize,
    },
    io::{Error as IoError, Read, Write},
};

/// A headers announcement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    /// Headers in announcement order.
    pub headers: Vec<X1Header>,
}

impl Headers {
    /// Creates a new `Headers` message with the specified headers.
    ///
    /// # Arguments
    ///
    /// * `headers` - The headers to announce, in order.
    pub fn new(headers: Vec<X1Header>) -> Self {
        Self { headers }
    }

    /// Returns the announced headers.
    pub fn headers(&self) -> &[X1Header] {
        &self.headers
    }

    /// Returns the number of headers in the message.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Checks if the message contains no headers.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Consumes the message and returns its headers.
    pub fn into_headers(self) -> Vec<X1Header> {
        self.headers
    }
}

impl From<Vec<X1Header>> for Headers {
    fn from(headers: Vec<X1Header>) -> Self {
        Self::new(headers)
    }
}

impl Encodable for Headers {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, IoError> {
        let mut len = VarInt::from(self.headers.len()).consensus_encode(writer)?;
        for header in &self.headers {
            len = len.saturating_add(header.consensus_encode(writer)?);
            len = len.saturating_add(VarInt(0).consensus_encode(writer)?);
            len = len.saturating_add(VarInt(0).consensus_encode(writer)?);
        }
        Ok(len)
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Length is bounded by MAX_VEC_SIZE"
)]
impl Decodable for Headers {
    fn consensus_decode_from_finite_reader<R: Read + ?Sized>(
        reader: &mut R,
    ) -> Result<Self, EncodeDecodeError> {
        let len = VarInt::consensus_decode_from_finite_reader(reader)?.0;

        if len > MAX_VEC_SIZE as u64 {
            return Err(EncodeDecodeError::ParseFailed(
                "Vector too large, exceeds MAX_VEC_SIZE",
            ));
        }

        // The count is untrusted; cap the preallocation.
        let capacity = (len as usize).min(MAX_VEC_SIZE / (X1Header::SIZE + 2));
        let mut headers = Vec::with_capacity(capacity);
        for _ in 0..len {
            headers.push(X1Header::consensus_decode_from_finite_reader(reader)?);
            // Both counts are read and discarded whatever their value.
            VarInt::consensus_decode_from_finite_reader(reader)?;
            VarInt::consensus_decode_from_finite_reader(reader)?;
        }

        Ok(Headers { headers })
    }
}

/// Encodes headers in announcement wire format.
pub fn encode_headers(headers: &[X1Header]) -> Vec<u8> {
    serialize(&Headers::new(headers.to_vec()))
}

/// Decodes headers from announcement wire format, preserving their order.
///
/// # Errors
///
/// Returns an error if the bytes are truncated, malformed, or followed by
/// unread data.
pub fn decode_headers(bytes: &[u8]) -> Result<Vec<X1Header>, EncodeDecodeError> {
    deserialize::<Headers>(bytes).map(Headers::into_headers)
}
