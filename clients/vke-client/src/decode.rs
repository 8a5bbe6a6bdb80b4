// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Response classification
//!
//! A status outside `[200, 300)` becomes an [`ApiError`]. Success bodies are
//! parsed only when the caller asked for a result and the body is non-empty.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::dispatch::RawResponse;
use crate::error::{ApiError, DecodeError, Error};

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
}

/// Split a response into its success body or an API error
///
/// # Errors
/// Returns an [`ApiError`] for any non-success status.
pub fn check_status(response: RawResponse) -> Result<RawResponse, ApiError> {
    if response.status.is_success() {
        return Ok(response);
    }

    let query_id = response.query_id();
    let status = response.status.as_u16();
    let error = match serde_json::from_slice::<ErrorBody>(&response.body) {
        Ok(body) => ApiError {
            code: body.code.unwrap_or(status),
            message: body.message.unwrap_or_else(|| raw_text(&response)),
            query_id,
        },
        Err(_) => ApiError {
            code: status,
            message: raw_text(&response),
            query_id,
        },
    };
    Err(error)
}

/// Decode a success body into `T`
///
/// Returns `Ok(None)` for an empty success body.
///
/// # Errors
/// Returns [`Error::Api`] for a non-success status and [`Error::Decode`]
/// when the body does not parse as `T`.
pub fn decode<T: DeserializeOwned>(response: RawResponse) -> Result<Option<T>, Error> {
    let response = check_status(response)?;
    if response.body.is_empty() {
        return Ok(None);
    }
    let value = serde_json::from_slice(&response.body).map_err(DecodeError::from)?;
    Ok(Some(value))
}

/// Classify the status and ignore the body
///
/// # Errors
/// Returns [`Error::Api`] for a non-success status.
pub fn discard(response: RawResponse) -> Result<(), Error> {
    check_status(response)?;
    Ok(())
}

fn raw_text(response: &RawResponse) -> String {
    String::from_utf8_lossy(&response.body).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{HeaderMap, HeaderValue, StatusCode};
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use url::Url;

    use crate::dispatch::QUERY_ID_HEADER;

    fn response(status: u16, body: &'static str) -> RawResponse {
        RawResponse {
            url: Url::parse("https://api.vke.example/cluster/c1").unwrap(),
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pool {
        name: String,
    }

    #[test]
    fn test_structured_error_body() {
        let err = check_status(response(404, r#"{"code":404,"message":"not found"}"#)).unwrap_err();
        assert_eq!(
            err,
            ApiError {
                code: 404,
                message: "not found".to_string(),
                query_id: None,
            }
        );
    }

    #[test]
    fn test_non_json_error_body_becomes_message() {
        let err = check_status(response(500, "boom")).unwrap_err();
        assert_eq!(err.code, 500);
        assert_eq!(err.message, "boom");
    }

    #[test]
    fn test_body_code_overrides_status() {
        let err = check_status(response(400, r#"{"code":409,"message":"conflict"}"#)).unwrap_err();
        assert_eq!(err.code, 409);
    }

    #[test]
    fn test_missing_code_uses_status() {
        let err = check_status(response(403, r#"{"message":"forbidden"}"#)).unwrap_err();
        assert_eq!(err.code, 403);
        assert_eq!(err.message, "forbidden");
    }

    #[test]
    fn test_query_id_attached() {
        let mut raw = response(503, "unavailable");
        raw.headers
            .insert(QUERY_ID_HEADER, HeaderValue::from_static("EU.ext-1.abc"));
        let err = check_status(raw).unwrap_err();
        assert_eq!(err.query_id.as_deref(), Some("EU.ext-1.abc"));
    }

    #[test]
    fn test_informational_status_is_error() {
        assert!(check_status(response(101, "")).is_err());
        assert!(check_status(response(302, "")).is_err());
        assert!(check_status(response(299, "")).is_ok());
    }

    #[test]
    fn test_success_decodes_into_sink() {
        let pool: Option<Pool> = decode(response(200, r#"{"name":"workers"}"#)).unwrap();
        assert_eq!(
            pool,
            Some(Pool {
                name: "workers".to_string()
            })
        );
    }

    #[test]
    fn test_empty_success_body_is_not_parsed() {
        let pool: Option<Pool> = decode(response(204, "")).unwrap();
        assert_eq!(pool, None);
        assert!(discard(response(200, "not json at all")).is_ok());
    }

    #[test]
    fn test_malformed_success_body_is_decode_error() {
        let result: Result<Option<Pool>, Error> = decode(response(200, "{not json"));
        assert!(matches!(result, Err(Error::Decode(DecodeError::Json(_)))));
    }

    #[test]
    fn test_decode_surfaces_api_error() {
        let result: Result<Option<Pool>, Error> = decode(response(404, r#"{"message":"gone"}"#));
        assert_eq!(result.unwrap_err().api_error().map(|e| e.code), Some(404));
    }
}
