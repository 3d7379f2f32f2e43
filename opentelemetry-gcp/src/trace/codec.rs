//! Encoding and decoding of `X-Cloud-Trace-Context` header values.
//!
//! A header value looks like
//!
//! `a0d3eee13de6a4bbcf291eb444b94f28/8528140779317015234;o=1`
//!
//! and is made of three fields:
//!
//!    - trace-id, 32 lowercase hex characters
//!    - span-id, the span id as an unsigned 64 bit decimal number
//!    - options, `o=1` when the trace is sampled, `o=0` otherwise
//!
//! See the [Cloud Trace docs] for more details.
//!
//! [Cloud Trace docs]: https://cloud.google.com/trace/docs/trace-context#legacy-http-header
use super::{CloudTraceContext, MAX_HEADER_LEN};
use opentelemetry::trace::{SpanId, TraceId};
use thiserror::Error;

const TRACE_ID_LEN: usize = 32;
const TRACE_ID_DELIMITER: char = '/';
const OPTIONS_DELIMITER: char = ';';
const OPTIONS_PREFIX: &str = "o=";
const SAMPLED: u64 = 1;

/// Reasons a single header field could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The field has no characters.
    #[error("field is empty")]
    Empty,
    /// The field does not have the required number of characters.
    #[error("expected {expected} characters, found {actual}")]
    Length {
        /// Required length.
        expected: usize,
        /// Length of the field that was received.
        actual: usize,
    },
    /// The field contains a character outside its alphabet.
    #[error("unexpected character {0:?}")]
    InvalidCharacter(char),
    /// The numeric value does not fit in 64 bits.
    #[error("value does not fit in 64 bits")]
    Overflow,
}

/// Errors returned by [`decode`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The header value is empty.
    #[error("header is empty")]
    HeaderEmpty,
    /// The header value is longer than [`MAX_HEADER_LEN`].
    #[error("header is {len} bytes long, at most {MAX_HEADER_LEN} are accepted")]
    HeaderTooLarge {
        /// Length of the received header value.
        len: usize,
    },
    /// A separator or the options prefix is missing.
    #[error("malformed header: {0}")]
    MalformedHeader(&'static str),
    /// The trace-id field is not a 32 character lowercase hex string.
    #[error("invalid trace id")]
    InvalidTraceId(#[source] FieldError),
    /// The span-id field is not an unsigned 64 bit decimal number.
    #[error("invalid span id")]
    InvalidSpanId(#[source] FieldError),
    /// The options value is not an unsigned 64 bit decimal number.
    #[error("invalid trace options")]
    InvalidOptions(#[source] FieldError),
}

/// Coarse classification of a [`DecodeError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecodeErrorKind {
    /// The header was rejected before parsing, it is empty or too large.
    UnusableHeader,
    /// The header does not have the `TRACE_ID/SPAN_ID;o=OPTIONS` structure.
    MalformedHeader,
    /// One of the fields could not be parsed.
    InvalidField,
}

impl DecodeError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            DecodeError::HeaderEmpty | DecodeError::HeaderTooLarge { .. } => {
                DecodeErrorKind::UnusableHeader
            }
            DecodeError::MalformedHeader(_) => DecodeErrorKind::MalformedHeader,
            DecodeError::InvalidTraceId(_)
            | DecodeError::InvalidSpanId(_)
            | DecodeError::InvalidOptions(_) => DecodeErrorKind::InvalidField,
        }
    }
}

/// Encode a context as an `X-Cloud-Trace-Context` header value.
///
/// Returns `None` if the trace id or the span id is invalid. Only the sampled
/// bit is written to the options field.
///
/// ```
/// use opentelemetry::trace::{SpanId, TraceId};
/// use opentelemetry_gcp::trace::{encode, CloudTraceContext};
///
/// let cx = CloudTraceContext::new(
///     TraceId::from_hex("a0d3eee13de6a4bbcf291eb444b94f28").unwrap(),
///     SpanId::from(8528140779317015234u64),
///     true,
/// );
/// assert_eq!(
///     encode(&cx).as_deref(),
///     Some("a0d3eee13de6a4bbcf291eb444b94f28/8528140779317015234;o=1"),
/// );
/// ```
pub fn encode(cx: &CloudTraceContext) -> Option<String> {
    if !cx.is_valid() {
        return None;
    }

    Some(format!(
        "{}/{};o={}",
        cx.trace_id(),
        u64::from_be_bytes(cx.span_id().to_bytes()),
        u8::from(cx.is_sampled()),
    ))
}

/// Decode an `X-Cloud-Trace-Context` header value.
///
/// Fields are checked left to right and the first failure is returned. A header
/// without the `;o=` options suffix is rejected as malformed.
///
/// A successfully decoded context may still carry a zero trace id or span id,
/// callers must check [`CloudTraceContext::is_valid`] before using it as a parent.
pub fn decode(header: &str) -> Result<CloudTraceContext, DecodeError> {
    let header = check_size(header)?;
    let (trace_id, rest) = take_trace_id(header)?;
    let (span_id, options) = take_span_id(rest)?;
    let sampled = take_options(options)?;

    Ok(CloudTraceContext::new(trace_id, span_id, sampled))
}

fn check_size(header: &str) -> Result<&str, DecodeError> {
    if header.is_empty() {
        return Err(DecodeError::HeaderEmpty);
    }
    if header.len() > MAX_HEADER_LEN {
        return Err(DecodeError::HeaderTooLarge { len: header.len() });
    }
    Ok(header)
}

/// Consumes `TRACE_ID/` and returns the trace id and everything after the slash.
fn take_trace_id(input: &str) -> Result<(TraceId, &str), DecodeError> {
    let (field, rest) = input
        .split_once(TRACE_ID_DELIMITER)
        .ok_or(DecodeError::MalformedHeader("missing '/' after trace id"))?;

    let trace_id = parse_trace_id(field).map_err(DecodeError::InvalidTraceId)?;
    Ok((trace_id, rest))
}

/// Consumes `SPAN_ID;` and returns the span id and the options field, if the
/// separator was present.
fn take_span_id(input: &str) -> Result<(SpanId, Option<&str>), DecodeError> {
    let (field, options) = match input.split_once(OPTIONS_DELIMITER) {
        Some((field, options)) => (field, Some(options)),
        None => (input, None),
    };

    let span_id = parse_decimal(field).map_err(DecodeError::InvalidSpanId)?;
    Ok((SpanId::from(span_id), options))
}

fn take_options(input: Option<&str>) -> Result<bool, DecodeError> {
    let value = input
        .and_then(|options| options.strip_prefix(OPTIONS_PREFIX))
        .ok_or(DecodeError::MalformedHeader("missing ';o=' options"))?;

    let options = parse_decimal(value).map_err(DecodeError::InvalidOptions)?;
    Ok(options == SAMPLED)
}

fn parse_trace_id(field: &str) -> Result<TraceId, FieldError> {
    if field.len() != TRACE_ID_LEN {
        return Err(FieldError::Length {
            expected: TRACE_ID_LEN,
            actual: field.len(),
        });
    }

    field
        .chars()
        .try_fold(0u128, |acc, c| {
            let digit = c
                .to_digit(16)
                .filter(|_| !c.is_ascii_uppercase())
                .ok_or(FieldError::InvalidCharacter(c))?;
            Ok((acc << 4) | u128::from(digit))
        })
        .map(TraceId::from)
}

/// Parses an unsigned decimal number. Unlike `u64::from_str`, a leading `+`
/// is rejected.
fn parse_decimal(field: &str) -> Result<u64, FieldError> {
    if field.is_empty() {
        return Err(FieldError::Empty);
    }

    field.chars().try_fold(0u64, |acc, c| {
        let digit = c.to_digit(10).ok_or(FieldError::InvalidCharacter(c))?;
        acc.checked_mul(10)
            .and_then(|acc| acc.checked_add(u64::from(digit)))
            .ok_or(FieldError::Overflow)
    })
}
