//! This crate provides unofficial integration with Google Cloud Platform tracing.
//!
//! # Components
//! As for now, the only component provided in this crate is the Google Cloud Trace
//! context propagator, which reads and writes the `X-Cloud-Trace-Context` header.
//!
//! ### Cloud Trace Propagator
//! This propagator helps propagate tracing information between services running on
//! Google Cloud (Cloud Run, App Engine, GKE behind a Google load balancer) and services
//! instrumented with OpenTelemetry.
//!
//! The header value has the form
//!
//! `X-Cloud-Trace-Context: TRACE_ID/SPAN_ID;o=OPTIONS`
//!
//! where `TRACE_ID` is 32 lowercase hex characters, `SPAN_ID` is the span id in
//! unsigned decimal and `OPTIONS` is `1` when the trace is sampled.
//!
//! ### Quick start
//! ```no_run
//! use opentelemetry::{global, trace::Tracer};
//! use opentelemetry_gcp::trace::CloudTracePropagator;
//! use std::collections::HashMap;
//!
//! // Set the global propagator to the Cloud Trace propagator
//! global::set_text_map_propagator(CloudTracePropagator::default());
//!
//! let tracer = global::tracer("example");
//! tracer.in_span("doing_work", |cx| {
//!     // Replace with the headers of the outgoing request.
//!     let mut headers: HashMap<String, String> = HashMap::new();
//!     global::get_text_map_propagator(|propagator| {
//!         propagator.inject_context(&cx, &mut headers);
//!     });
//!     println!("Headers: {:?}", headers);
//! });
//! ```
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![cfg_attr(
    docsrs,
    feature(doc_cfg, doc_auto_cfg),
    deny(rustdoc::broken_intra_doc_links)
)]
#![cfg_attr(test, deny(warnings))]

#[cfg(feature = "trace")]
pub mod trace;

#[cfg(feature = "trace")]
pub use trace::CloudTracePropagator;
