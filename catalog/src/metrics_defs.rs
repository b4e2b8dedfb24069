//! Metrics definitions for the catalog service.

use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Time to serve a catalog request in seconds. Tagged with route.",
};

pub const REQUEST_COUNT: MetricDef = MetricDef {
    name: "request.count",
    metric_type: MetricType::Counter,
    description: "Number of requests matched to a route. Tagged with route.",
};

pub const REQUEST_FAILED: MetricDef = MetricDef {
    name: "request.failed",
    metric_type: MetricType::Counter,
    description: "Number of requests answered with 500. Tagged with route.",
};

pub const REQUEST_NOT_FOUND: MetricDef = MetricDef {
    name: "request.not_found",
    metric_type: MetricType::Counter,
    description: "Number of requests for unknown paths",
};

pub const REQUESTS_INFLIGHT: MetricDef = MetricDef {
    name: "requests.inflight",
    metric_type: MetricType::Gauge,
    description: "Number of requests currently being processed",
};

pub const UPSTREAM_PAGES: MetricDef = MetricDef {
    name: "upstream.pages",
    metric_type: MetricType::Counter,
    description: "Number of list pages fetched from the provider",
};

pub const UPSTREAM_RETRIES: MetricDef = MetricDef {
    name: "upstream.retries",
    metric_type: MetricType::Counter,
    description: "Number of provider requests retried after a retriable status",
};

pub const ALL_METRICS: &[MetricDef] = &[
    REQUEST_DURATION,
    REQUEST_COUNT,
    REQUEST_FAILED,
    REQUEST_NOT_FOUND,
    REQUESTS_INFLIGHT,
    UPSTREAM_PAGES,
    UPSTREAM_RETRIES,
];
