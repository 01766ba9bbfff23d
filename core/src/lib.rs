//! Blocking HTTP bridge for JSON envelope APIs.
//!
//! # Overview
//! Builds form, JSON, raw-text and query-string requests as plain data, runs
//! them over one pooled client and maps `{success, code, msg, data}`-style
//! envelopes into a typed [`ApiResponse`] using caller-supplied extractors.
//!
//! # Design
//! - Builders in [`request`] are pure and fail only on bad input.
//! - [`decode`] turns a response body into an `ApiResponse` without I/O.
//! - [`EnvelopeClient`] is constructed once and shared; it collapses every
//!   failure into a returned value and never raises to the caller.
//! - The envelope shape lives entirely in [`Extractors`], so the bridge works
//!   with any API's field names.

pub mod client;
pub mod config;
pub mod decode;
pub mod envelope;
pub mod error;
pub mod http;
pub mod request;

pub use client::{EnvelopeClient, NO_STATUS};
pub use config::ClientConfig;
pub use decode::{decode_flat_response, decode_response};
pub use envelope::{
    bool_field, element_field, string_field, ApiResponse, Extractors, Failure, JsonObject, SYSTEM_BUSY,
};
pub use error::{BuildError, ConfigError, DecodeError, ExtractError};
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use request::{build_form, build_form_map, build_get, build_json, build_json_str, build_raw};
