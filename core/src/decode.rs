//! Envelope decoding, the I/O-free half of the executor.
//!
//! `decode_response` and `decode_flat_response` apply the status rule to a
//! complete exchange: a non-2xx status yields a rejected response and the
//! body is ignored. The `decode_envelope`/`decode_flat` functions below them
//! work on a body already known to come from a 2xx response. Every failure is
//! returned as `Err`; the client decides how it is reported.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::envelope::{code_field, ApiResponse, Extractors, JsonObject};
use crate::error::DecodeError;
use crate::http::HttpResponse;

/// Decode an exchange with [`decode_envelope`] unless its status is non-2xx.
pub fn decode_response<T: DeserializeOwned>(
    response: &HttpResponse,
    extractors: &Extractors,
) -> Result<ApiResponse<T>, DecodeError> {
    if !response.is_success() {
        return Ok(ApiResponse::rejected(response.status));
    }
    decode_envelope(&response.body, extractors)
}

/// Decode an exchange with [`decode_flat`] unless its status is non-2xx.
pub fn decode_flat_response<T: DeserializeOwned>(
    response: &HttpResponse,
    extractors: &Extractors,
) -> Result<ApiResponse<T>, DecodeError> {
    if !response.is_success() {
        return Ok(ApiResponse::rejected(response.status));
    }
    decode_flat(&response.body, extractors)
}

/// Parse a body whose root must be a JSON object.
pub fn parse_object(body: &str) -> Result<JsonObject, DecodeError> {
    match serde_json::from_str::<Value>(body).map_err(DecodeError::Json)? {
        Value::Object(object) => Ok(object),
        _ => Err(DecodeError::NotAnObject),
    }
}

/// Decode an envelope whose payload is located by the data extractor.
///
/// An absent or `null` data element leaves `data` unset.
pub fn decode_envelope<T: DeserializeOwned>(
    body: &str,
    extractors: &Extractors,
) -> Result<ApiResponse<T>, DecodeError> {
    let object = parse_object(body)?;
    let success = extractors.success(&object)?;
    let code = extractors.code(&object)?;
    let mut response = ApiResponse {
        success,
        code,
        msg: None,
        data: None,
        failure: None,
    };
    if success {
        response.data = match extractors.data(&object)? {
            None | Some(Value::Null) => None,
            Some(element) => Some(serde_json::from_value(element).map_err(DecodeError::Data)?),
        };
    } else {
        response.msg = extractors.msg(&object)?;
    }
    Ok(response)
}

/// Decode an envelope whose payload is the envelope itself.
///
/// `code` is always read from the `code` field and removed before the rest
/// of the object is deserialized, so it never lands in the target type.
pub fn decode_flat<T: DeserializeOwned>(
    body: &str,
    extractors: &Extractors,
) -> Result<ApiResponse<T>, DecodeError> {
    let mut object = parse_object(body)?;
    let success = extractors.success(&object)?;
    let code = code_field(&object)?;
    let mut response = ApiResponse {
        success,
        code,
        msg: None,
        data: None,
        failure: None,
    };
    if success {
        object.remove("code");
        response.data = Some(serde_json::from_value(Value::Object(object)).map_err(DecodeError::Data)?);
    } else {
        response.msg = extractors.msg(&object)?;
    }
    Ok(response)
}
