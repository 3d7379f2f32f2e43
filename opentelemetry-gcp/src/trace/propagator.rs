use super::{codec, CloudTraceContext, CLOUD_TRACE_CONTEXT_HEADER};
use opentelemetry::{
    otel_debug,
    propagation::{text_map_propagator::FieldIter, Extractor, Injector, TextMapPropagator},
    trace::{SpanContext, TraceContextExt},
    Context,
};
use std::sync::OnceLock;

static CLOUD_TRACE_CONTEXT_HEADER_FIELDS: OnceLock<[String; 1]> = OnceLock::new();

fn cloud_trace_context_header_fields() -> &'static [String; 1] {
    CLOUD_TRACE_CONTEXT_HEADER_FIELDS.get_or_init(|| [CLOUD_TRACE_CONTEXT_HEADER.to_owned()])
}

/// Extracts and injects `SpanContext`s into `Extractor`s or `Injector`s using the
/// Google Cloud Trace header format.
///
/// Extracts and injects values to/from the `X-Cloud-Trace-Context` header. The
/// header carries the trace id, the span id and the sampling decision, for example
///
/// `X-Cloud-Trace-Context: a0d3eee13de6a4bbcf291eb444b94f28/8528140779317015234;o=1`
///
/// Headers that fail to decode, or that decode to a zero trace id or span id, are
/// ignored and the context is returned unchanged.
///
/// ## Example
///
/// ```
/// use opentelemetry::global;
/// use opentelemetry_gcp::trace::CloudTracePropagator;
///
/// global::set_text_map_propagator(CloudTracePropagator::default());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CloudTracePropagator {
    _private: (),
}

impl CloudTracePropagator {
    /// Creates a new `CloudTracePropagator`.
    pub fn new() -> Self {
        CloudTracePropagator { _private: () }
    }

    fn extract_span_context(&self, extractor: &dyn Extractor) -> Option<SpanContext> {
        let header_value = extractor.get(CLOUD_TRACE_CONTEXT_HEADER).unwrap_or("");

        let cloud_trace_context: CloudTraceContext = match codec::decode(header_value) {
            Ok(cx) => cx,
            // An absent header is the common case for requests entering the system.
            Err(codec::DecodeError::HeaderEmpty) => return None,
            Err(err) => {
                otel_debug!(
                    name: "CloudTracePropagator.ExtractFailed",
                    reason = format!("{err}")
                );
                return None;
            }
        };

        if !cloud_trace_context.is_valid() {
            otel_debug!(name: "CloudTracePropagator.ExtractInvalidContext");
            return None;
        }

        Some(cloud_trace_context.to_span_context())
    }
}

impl TextMapPropagator for CloudTracePropagator {
    fn inject_context(&self, cx: &Context, injector: &mut dyn Injector) {
        let span = cx.span();
        let cloud_trace_context = CloudTraceContext::from(span.span_context());
        if let Some(header_value) = codec::encode(&cloud_trace_context) {
            injector.set(CLOUD_TRACE_CONTEXT_HEADER, header_value);
        }
    }

    fn extract_with_context(&self, cx: &Context, extractor: &dyn Extractor) -> Context {
        self.extract_span_context(extractor)
            .map(|sc| cx.with_remote_span_context(sc))
            .unwrap_or_else(|| cx.clone())
    }

    fn fields(&self) -> FieldIter<'_> {
        FieldIter::new(cloud_trace_context_header_fields())
    }
}
