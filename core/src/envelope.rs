//! Response envelopes and the extractors that read them.
//!
//! # Design
//! The bridge knows nothing about a particular API's envelope. Callers pass
//! an [`Extractors`] value holding closures that pull the success flag,
//! message, data element and (optionally) code out of the parsed JSON object.
//! Extractors are fallible: an `Err` is treated like any other decode failure
//! but is reported as [`Failure::Extractor`] so caller bugs stay visible.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DecodeError, ExtractError};

/// Opaque message returned for every collapsed failure.
pub const SYSTEM_BUSY: &str = "system busy";

/// The top-level JSON object of a response.
pub type JsonObject = Map<String, Value>;

type Getter<R> = Arc<dyn Fn(&JsonObject) -> Result<R, ExtractError> + Send + Sync>;

/// Why a call failed, when it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The server answered with a non-2xx status. The body was not read.
    HttpStatus(u16),
    /// Connecting, sending or reading the body failed.
    Transport,
    /// The body was not a JSON object or `data` did not fit the target type.
    Decode,
    /// A caller-supplied extractor returned an error.
    Extractor,
}

impl From<&DecodeError> for Failure {
    fn from(err: &DecodeError) -> Self {
        match err {
            DecodeError::Extract(_) => Failure::Extractor,
            _ => Failure::Decode,
        }
    }
}

/// Typed result of an executor call.
///
/// By extractor convention `data` is set only on success and `msg` only on
/// failure; the bridge does not enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: Option<String>,
    pub msg: Option<String>,
    pub data: Option<T>,
    #[serde(skip)]
    pub failure: Option<Failure>,
}

impl<T> ApiResponse<T> {
    /// Non-2xx status: nothing but the failure is populated.
    pub fn rejected(status: u16) -> Self {
        Self {
            success: false,
            code: None,
            msg: None,
            data: None,
            failure: Some(Failure::HttpStatus(status)),
        }
    }

    /// Generic failure carrying [`SYSTEM_BUSY`].
    pub fn system_busy(failure: Failure) -> Self {
        Self {
            success: false,
            code: None,
            msg: Some(SYSTEM_BUSY.to_string()),
            data: None,
            failure: Some(failure),
        }
    }
}

/// Caller-supplied functions that read one API's envelope convention.
#[derive(Clone)]
pub struct Extractors {
    success: Getter<bool>,
    msg: Getter<Option<String>>,
    data: Getter<Option<Value>>,
    code: Option<Getter<Option<String>>>,
}

impl Extractors {
    pub fn new<S, M, D>(success: S, msg: M, data: D) -> Self
    where
        S: Fn(&JsonObject) -> Result<bool, ExtractError> + Send + Sync + 'static,
        M: Fn(&JsonObject) -> Result<Option<String>, ExtractError> + Send + Sync + 'static,
        D: Fn(&JsonObject) -> Result<Option<Value>, ExtractError> + Send + Sync + 'static,
    {
        Self {
            success: Arc::new(success),
            msg: Arc::new(msg),
            data: Arc::new(data),
            code: None,
        }
    }

    /// Replace the default `code` lookup.
    pub fn with_code<C>(mut self, code: C) -> Self
    where
        C: Fn(&JsonObject) -> Result<Option<String>, ExtractError> + Send + Sync + 'static,
    {
        self.code = Some(Arc::new(code));
        self
    }

    /// `{success, code, msg, data}` read from fields of those names.
    pub fn conventional() -> Self {
        Self::new(
            |o| bool_field(o, "success"),
            |o| string_field(o, "msg"),
            |o| element_field(o, "data"),
        )
    }

    pub fn success(&self, object: &JsonObject) -> Result<bool, ExtractError> {
        (self.success)(object)
    }

    pub fn msg(&self, object: &JsonObject) -> Result<Option<String>, ExtractError> {
        (self.msg)(object)
    }

    pub fn data(&self, object: &JsonObject) -> Result<Option<Value>, ExtractError> {
        (self.data)(object)
    }

    /// Run the custom code extractor, or read the `code` field.
    pub fn code(&self, object: &JsonObject) -> Result<Option<String>, DecodeError> {
        match &self.code {
            Some(code) => Ok(code(object)?),
            None => code_field(object),
        }
    }
}

/// Read the envelope's `code` field as text.
pub(crate) fn code_field(object: &JsonObject) -> Result<Option<String>, DecodeError> {
    string_field(object, "code").map_err(|_| DecodeError::CodeNotScalar)
}

impl fmt::Debug for Extractors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractors")
            .field("custom_code", &self.code.is_some())
            .finish_non_exhaustive()
    }
}

/// Read a boolean flag. `"true"`/`"false"` strings are accepted.
pub fn bool_field(object: &JsonObject, key: &str) -> Result<bool, ExtractError> {
    match object.get(key) {
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(true),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(false),
        Some(other) => Err(ExtractError::new(format!("`{key}` is not a boolean: {other}"))),
        None => Err(ExtractError::new(format!("`{key}` is missing"))),
    }
}

/// Read a scalar as text. Absent fields are `None`; numbers and booleans are
/// rendered as text; null, arrays and objects are an error.
pub fn string_field(object: &JsonObject, key: &str) -> Result<Option<String>, ExtractError> {
    match object.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(ExtractError::new(format!("`{key}` is not a scalar: {other}"))),
    }
}

/// Clone a nested element out of the envelope.
pub fn element_field(object: &JsonObject, key: &str) -> Result<Option<Value>, ExtractError> {
    Ok(object.get(key).cloned())
}
