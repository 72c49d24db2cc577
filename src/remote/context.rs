//! Correlation data carried through the host's web-request context map.
//!
//! Zellij hands the context map of a web request back verbatim with its
//! result. Everything needed to route the reply is stored there: which call it
//! answers, the generation or attempt it belongs to (so stale replies can be
//! dropped), and the trace context of the span that issued it.

use crate::domain::{Result, ZeroCostError};
use std::collections::BTreeMap;

const KEY_KIND: &str = "zerocost.kind";
const KEY_GENERATION: &str = "zerocost.generation";
const KEY_ATTEMPT: &str = "zerocost.attempt";
const KEY_EVENT_ID: &str = "zerocost.event_id";
const KEY_TRACE_ID: &str = "zerocost.trace_id";
const KEY_PARENT_SPAN_ID: &str = "zerocost.parent_span_id";

/// Distributed tracing context for spans that cross a web request.
///
/// Captures the current trace and span IDs from OpenTelemetry so the span
/// handling the reply can be linked to the span that issued the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a hex string.
    pub trace_id: String,

    /// Parent span ID for linking the reply span.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Creates a trace context from the current tracing span.
    ///
    /// Returns `None` if the current span context is invalid or not sampled,
    /// which is always the case when no OpenTelemetry layer is installed.
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let span = tracing::Span::current();
        let otel_context = span.context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if !span_context.is_valid() {
            return None;
        }

        Some(Self {
            trace_id: format!("{:032x}", span_context.trace_id()),
            parent_span_id: format!("{:016x}", span_context.span_id()),
        })
    }

    /// Makes `span` a child of the span that captured this context.
    pub fn set_as_parent_of(&self, span: &tracing::Span) {
        use opentelemetry::trace::{
            SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState,
        };
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let (Ok(trace_id), Ok(span_id)) = (
            TraceId::from_hex(&self.trace_id),
            SpanId::from_hex(&self.parent_span_id),
        ) else {
            tracing::debug!(trace_id = %self.trace_id, "unparseable trace context, not re-parenting");
            return;
        };

        let span_context = SpanContext::new(
            trace_id,
            span_id,
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );
        span.set_parent(opentelemetry::Context::new().with_remote_span_context(span_context));
    }
}

/// Which call a reply answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTag {
    Nearby { generation: u64 },
    /// Shares the nearby generation sequence; see [`Endpoint::search`](super::Endpoint::search).
    Search { generation: u64 },
    Detail { id: String },
    Categories,
    Geolocate { attempt: u64 },
}

impl RequestTag {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Nearby { .. } => "nearby",
            Self::Search { .. } => "search",
            Self::Detail { .. } => "detail",
            Self::Categories => "categories",
            Self::Geolocate { .. } => "geolocate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub tag: RequestTag,
    pub trace: Option<TraceContext>,
}

impl RequestContext {
    /// Tags a new request with the trace context of the current span.
    #[must_use]
    pub fn capture(tag: RequestTag) -> Self {
        Self {
            tag,
            trace: TraceContext::from_current(),
        }
    }

    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert(KEY_KIND.to_string(), self.tag.kind().to_string());

        match &self.tag {
            RequestTag::Nearby { generation } | RequestTag::Search { generation } => {
                map.insert(KEY_GENERATION.to_string(), generation.to_string());
            }
            RequestTag::Detail { id } => {
                map.insert(KEY_EVENT_ID.to_string(), id.clone());
            }
            RequestTag::Geolocate { attempt } => {
                map.insert(KEY_ATTEMPT.to_string(), attempt.to_string());
            }
            RequestTag::Categories => {}
        }

        if let Some(trace) = &self.trace {
            map.insert(KEY_TRACE_ID.to_string(), trace.trace_id.clone());
            map.insert(KEY_PARENT_SPAN_ID.to_string(), trace.parent_span_id.clone());
        }
        map
    }

    /// Reads a context back from a reply's context map.
    ///
    /// # Errors
    ///
    /// Returns [`ZeroCostError::Config`] when the map was not produced by
    /// [`Self::to_map`]: missing kind, unknown kind or a missing or
    /// non-numeric correlation field.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self> {
        let kind = field(map, KEY_KIND)?;
        let tag = match kind {
            "nearby" => RequestTag::Nearby {
                generation: number(map, KEY_GENERATION)?,
            },
            "search" => RequestTag::Search {
                generation: number(map, KEY_GENERATION)?,
            },
            "detail" => RequestTag::Detail {
                id: field(map, KEY_EVENT_ID)?.to_string(),
            },
            "categories" => RequestTag::Categories,
            "geolocate" => RequestTag::Geolocate {
                attempt: number(map, KEY_ATTEMPT)?,
            },
            other => {
                return Err(ZeroCostError::Config(format!("unknown request kind '{other}'")));
            }
        };

        let trace = match (map.get(KEY_TRACE_ID), map.get(KEY_PARENT_SPAN_ID)) {
            (Some(trace_id), Some(parent_span_id)) => Some(TraceContext {
                trace_id: trace_id.clone(),
                parent_span_id: parent_span_id.clone(),
            }),
            _ => None,
        };

        Ok(Self { tag, trace })
    }
}

fn field<'a>(map: &'a BTreeMap<String, String>, key: &str) -> Result<&'a str> {
    map.get(key)
        .map(String::as_str)
        .ok_or_else(|| ZeroCostError::Config(format!("request context is missing '{key}'")))
}

fn number(map: &BTreeMap<String, String>, key: &str) -> Result<u64> {
    let raw = field(map, key)?;
    raw.parse()
        .map_err(|_| ZeroCostError::Config(format!("request context '{key}' is not a number: {raw}")))
}
