//! RFC 1035 wire-format codec for DoH queries and responses.
//!
//! Encoding builds a standard recursive query: a 12-byte header followed by
//! one question per requested record type. When IPv6 is requested the A and
//! AAAA questions share a single message (QDCOUNT=2); the decode side
//! correlates answers by owner name, never by question index, so the
//! combined form stays symmetric.
//!
//! Decoding follows RFC 1035 label compression. Pointer traversal is a
//! bounded walk: at most [`MAX_POINTER_HOPS`] hops per name, every target
//! bounds-checked, so a cyclic or out-of-range pointer in a hostile response
//! fails cleanly instead of looping.

use crate::error::{DecodeError, EncodeError};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Address record, 4-byte RDATA.
pub const TYPE_A: u16 = 1;
/// IPv6 address record, 16-byte RDATA.
pub const TYPE_AAAA: u16 = 28;
/// Internet class.
pub const CLASS_IN: u16 = 1;

/// Maximum length of a single label on the wire.
pub const MAX_LABEL_LEN: usize = 63;
/// Maximum length of a fully encoded name, terminator included.
pub const MAX_NAME_LEN: usize = 255;

const HEADER_LEN: usize = 12;
/// Upper bound on compression-pointer hops while decoding one name.
pub const MAX_POINTER_HOPS: usize = 64;

/// Standard query flags: RD (recursion desired) set, everything else zero.
const FLAGS_RD: u16 = 0x0100;

/// Encodes a hostname lookup into a DNS wire-format query message.
///
/// The transaction ID is randomized per query. It is not matched against
/// the response: the HTTPS exchange already correlates request and response,
/// and [`decode_answers`] filters records by owner name.
///
/// A single trailing dot (FQDN form) is accepted and ignored.
pub fn encode_query(hostname: &str, include_ipv6: bool) -> Result<Vec<u8>, EncodeError> {
    let labels = split_labels(hostname)?;

    let qdcount: u16 = if include_ipv6 { 2 } else { 1 };
    let name_len = encoded_name_len(&labels);
    let mut buf = Vec::with_capacity(HEADER_LEN + (name_len + 4) * qdcount as usize);

    buf.extend_from_slice(&fastrand::u16(..).to_be_bytes());
    buf.extend_from_slice(&FLAGS_RD.to_be_bytes());
    buf.extend_from_slice(&qdcount.to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes()); // ANCOUNT
    buf.extend_from_slice(&0u16.to_be_bytes()); // NSCOUNT
    buf.extend_from_slice(&0u16.to_be_bytes()); // ARCOUNT

    write_question(&mut buf, &labels, TYPE_A);
    if include_ipv6 {
        write_question(&mut buf, &labels, TYPE_AAAA);
    }

    Ok(buf)
}

/// Decodes a DNS wire-format response into the addresses answering
/// `hostname`, in the order they appear.
///
/// A response code other than NOERROR yields an empty list: absence of
/// records is a valid negative answer, distinguished from malformed input.
/// Record types other than A/AAAA are skipped without error. A/AAAA records
/// must carry a well-formed RDATA length whatever their owner name; only
/// records whose owner matches `hostname` contribute addresses.
pub fn decode_answers(hostname: &str, message: &[u8]) -> Result<Vec<IpAddr>, DecodeError> {
    if message.len() < HEADER_LEN {
        return Err(DecodeError::ShortHeader);
    }

    let flags = read_u16(message, 2);
    let rcode = flags & 0x000F;
    if rcode != 0 {
        return Ok(Vec::new());
    }

    let qdcount = read_u16(message, 4);
    let ancount = read_u16(message, 6);

    let mut pos = HEADER_LEN;
    for _ in 0..qdcount {
        let (_, next) = read_name(message, pos)?;
        pos = checked_advance(message, next, 4)?; // QTYPE + QCLASS
    }

    let wanted = hostname.strip_suffix('.').unwrap_or(hostname);
    let mut addrs = Vec::new();

    for _ in 0..ancount {
        let (owner, next) = read_name(message, pos)?;
        pos = next;

        // TYPE(2) CLASS(2) TTL(4) RDLENGTH(2)
        let fixed_end = checked_advance(message, pos, 10)?;
        let rtype = read_u16(message, pos);
        let rdlength = read_u16(message, pos + 8) as usize;
        pos = fixed_end;

        let rdata_end = checked_advance(message, pos, rdlength)?;
        let rdata = &message[pos..rdata_end];

        // Address records must be well-formed whatever their owner name;
        // a bad RDLENGTH is a malformed message, not a skippable record.
        let addr = match rtype {
            TYPE_A => {
                let octets: [u8; 4] = rdata
                    .try_into()
                    .map_err(|_| rdlength_error(rtype, rdlength, 4))?;
                Some(IpAddr::V4(Ipv4Addr::from(octets)))
            }
            TYPE_AAAA => {
                let octets: [u8; 16] = rdata
                    .try_into()
                    .map_err(|_| rdlength_error(rtype, rdlength, 16))?;
                Some(IpAddr::V6(Ipv6Addr::from(octets)))
            }
            // CNAME and friends carry no address; skip.
            _ => None,
        };

        if let Some(addr) = addr {
            if owner.eq_ignore_ascii_case(wanted) {
                addrs.push(addr);
            }
        }

        pos = rdata_end;
    }

    Ok(addrs)
}

fn rdlength_error(rtype: u16, declared: usize, expected: u16) -> DecodeError {
    DecodeError::BadRdLength {
        rtype,
        declared: declared as u16,
        expected,
    }
}

/// Splits and validates a hostname into its labels.
fn split_labels(hostname: &str) -> Result<Vec<&str>, EncodeError> {
    let trimmed = hostname.strip_suffix('.').unwrap_or(hostname);
    if trimmed.is_empty() {
        return Err(EncodeError::EmptyHostname);
    }

    let labels: Vec<&str> = trimmed.split('.').collect();
    for label in &labels {
        if label.is_empty() {
            return Err(EncodeError::EmptyLabel);
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(EncodeError::LabelTooLong((*label).to_string()));
        }
        // IDNA normalization happens upstream; the wire only ever carries
        // printable ASCII.
        if label
            .bytes()
            .any(|b| !b.is_ascii() || b.is_ascii_control() || b == b' ')
        {
            return Err(EncodeError::InvalidLabel((*label).to_string()));
        }
    }

    if encoded_name_len(&labels) > MAX_NAME_LEN {
        return Err(EncodeError::NameTooLong);
    }

    Ok(labels)
}

/// Length of the name on the wire: one length byte per label plus the
/// terminating zero label.
fn encoded_name_len(labels: &[&str]) -> usize {
    labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1
}

fn write_question(buf: &mut Vec<u8>, labels: &[&str], rtype: u16) {
    for label in labels {
        buf.push(label.len() as u8);
        buf.extend_from_slice(label.as_bytes());
    }
    buf.push(0);
    buf.extend_from_slice(&rtype.to_be_bytes());
    buf.extend_from_slice(&CLASS_IN.to_be_bytes());
}

fn read_u16(message: &[u8], pos: usize) -> u16 {
    u16::from_be_bytes([message[pos], message[pos + 1]])
}

/// Advances `pos` by `count`, failing with `Truncated` past the end.
fn checked_advance(message: &[u8], pos: usize, count: usize) -> Result<usize, DecodeError> {
    let end = pos.checked_add(count).ok_or(DecodeError::Truncated(pos))?;
    if end > message.len() {
        return Err(DecodeError::Truncated(end));
    }
    Ok(end)
}

/// Reads a possibly-compressed name starting at `start`.
///
/// Returns the dotted name and the offset of the first byte after the name
/// as it appears at `start` (after the first pointer, if any). The walk is
/// bounded: at most [`MAX_POINTER_HOPS`] pointer hops, every target checked
/// against the message bounds.
fn read_name(message: &[u8], start: usize) -> Result<(String, usize), DecodeError> {
    let mut labels: Vec<String> = Vec::new();
    let mut pos = start;
    let mut resume = None;
    let mut hops = 0usize;

    loop {
        let len_byte = *message.get(pos).ok_or(DecodeError::Truncated(pos))?;
        match len_byte {
            0 => {
                pos += 1;
                break;
            }
            b if b & 0xC0 == 0xC0 => {
                let low = *message.get(pos + 1).ok_or(DecodeError::Truncated(pos + 1))?;
                let target = (((b & 0x3F) as usize) << 8) | low as usize;
                if target >= message.len() {
                    return Err(DecodeError::BadPointer { target });
                }
                hops += 1;
                if hops > MAX_POINTER_HOPS {
                    return Err(DecodeError::PointerLoop(MAX_POINTER_HOPS));
                }
                if resume.is_none() {
                    resume = Some(pos + 2);
                }
                pos = target;
            }
            // 0x40 and 0x80 label types are reserved.
            b if b & 0xC0 != 0 => return Err(DecodeError::BadLabel(pos)),
            len => {
                let len = len as usize;
                let end = checked_advance(message, pos + 1, len)?;
                labels.push(String::from_utf8_lossy(&message[pos + 1..end]).into_owned());
                pos = end;
            }
        }
    }

    Ok((labels.join("."), resume.unwrap_or(pos)))
}
