//! # Google Cloud Trace context
//!
//! Conversion between OpenTelemetry span contexts and the `X-Cloud-Trace-Context`
//! header used by Google Cloud load balancers, Cloud Run, App Engine and Cloud Trace.
//!
//! The [`codec`] module holds the header encoding itself and can be used without an
//! OpenTelemetry [`Context`](opentelemetry::Context). [`CloudTracePropagator`] plugs
//! the codec into OpenTelemetry's [`TextMapPropagator`] interface.
//!
//! [`TextMapPropagator`]: opentelemetry::propagation::TextMapPropagator
use opentelemetry::trace::{SpanContext, SpanId, TraceFlags, TraceId, TraceState};
use std::str::FromStr;

pub mod codec;
mod propagator;

pub use codec::{decode, encode, DecodeError, DecodeErrorKind, FieldError};
pub use propagator::CloudTracePropagator;

/// Name of the header carrying the Cloud Trace context.
///
/// Google documents the header as `X-Cloud-Trace-Context`. Header names are case
/// insensitive and carriers in the OpenTelemetry ecosystem normalize them to lower
/// case, so the lower case form is used here.
pub const CLOUD_TRACE_CONTEXT_HEADER: &str = "x-cloud-trace-context";

/// Longest header value accepted by [`decode`], in bytes.
pub const MAX_HEADER_LEN: usize = 200;

/// The trace context carried by an `X-Cloud-Trace-Context` header.
///
/// The header format only knows about the trace id, the span id and a single
/// sampled bit. Other trace flags and the trace state of a [`SpanContext`] are
/// not represented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CloudTraceContext {
    trace_id: TraceId,
    span_id: SpanId,
    sampled: bool,
}

impl CloudTraceContext {
    /// Create a new `CloudTraceContext`.
    pub const fn new(trace_id: TraceId, span_id: SpanId, sampled: bool) -> Self {
        CloudTraceContext {
            trace_id,
            span_id,
            sampled,
        }
    }

    /// The id of the trace this context belongs to.
    pub const fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// The id of the span that sent this context.
    pub const fn span_id(&self) -> SpanId {
        self.span_id
    }

    /// Whether the trace was selected for recording.
    pub const fn is_sampled(&self) -> bool {
        self.sampled
    }

    /// Returns `true` if both the trace id and the span id are non-zero.
    pub fn is_valid(&self) -> bool {
        self.trace_id != TraceId::INVALID && self.span_id != SpanId::INVALID
    }

    /// Build a remote [`SpanContext`] suitable as the parent of new spans.
    pub fn to_span_context(&self) -> SpanContext {
        let trace_flags = if self.sampled {
            TraceFlags::SAMPLED
        } else {
            TraceFlags::default()
        };

        SpanContext::new(
            self.trace_id,
            self.span_id,
            trace_flags,
            true,
            TraceState::default(),
        )
    }
}

impl From<&SpanContext> for CloudTraceContext {
    fn from(span_context: &SpanContext) -> Self {
        CloudTraceContext::new(
            span_context.trace_id(),
            span_context.span_id(),
            span_context.is_sampled(),
        )
    }
}

impl FromStr for CloudTraceContext {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_requires_both_ids() {
        let trace_id = TraceId::from_hex("a0d3eee13de6a4bbcf291eb444b94f28").unwrap();
        let span_id = SpanId::from_bytes(999u64.to_be_bytes());

        assert!(CloudTraceContext::new(trace_id, span_id, false).is_valid());
        assert!(!CloudTraceContext::new(TraceId::INVALID, span_id, true).is_valid());
        assert!(!CloudTraceContext::new(trace_id, SpanId::INVALID, true).is_valid());
    }

    #[test]
    fn span_context_keeps_only_sampled_flag() {
        let span_context = SpanContext::new(
            TraceId::from_hex("a0d3eee13de6a4bbcf291eb444b94f28").unwrap(),
            SpanId::from_hex("00000000000003e7").unwrap(),
            TraceFlags::new(0xff),
            false,
            TraceState::from_str("foo=bar").unwrap(),
        );

        let cx = CloudTraceContext::from(&span_context);
        assert!(cx.is_sampled());

        let remote = cx.to_span_context();
        assert!(remote.is_remote());
        assert_eq!(remote.trace_flags(), TraceFlags::SAMPLED);
        assert_eq!(remote.trace_state(), &TraceState::default());
        assert_eq!(remote.trace_id(), span_context.trace_id());
        assert_eq!(remote.span_id(), span_context.span_id());
    }

    #[test]
    fn parse_from_str() {
        let cx: CloudTraceContext = "a0d3eee13de6a4bbcf291eb444b94f28/999;o=0".parse().unwrap();
        assert_eq!(cx.span_id(), SpanId::from_hex("3e7").unwrap());
        assert!(!cx.is_sampled());

        assert!("a0d3eee13de6a4bbcf291eb444b94f28/999"
            .parse::<CloudTraceContext>()
            .is_err());
    }
}
