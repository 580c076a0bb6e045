//! Tooling primitives for behavior tree evaluation.
//!
//! This crate is intentionally lightweight: it only defines the trace data and the sinks it can be
//! routed to. Rendering and inspection belong to the tools that consume a [`TraceLog`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{
    emit, NullTraceSink, TraceEvent, TraceLog, TraceSink, VecTraceSink, TRACE_LOG, TRACE_SINK,
};
