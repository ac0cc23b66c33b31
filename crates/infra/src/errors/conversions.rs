//! Conversions from external infrastructure errors into domain errors.

use opsdesk_domain::OpsDeskError;
use reqwest::Error as HttpError;
use reqwest::StatusCode;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub OpsDeskError);

impl From<InfraError> for OpsDeskError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<OpsDeskError> for InfraError {
    fn from(value: OpsDeskError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoOpsDeskError {
    fn into_opsdesk(self) -> OpsDeskError;
}

/// Map a non-success HTTP status (plus the body the backend sent) to a
/// domain error.
pub fn status_error(status: StatusCode, body: &str) -> OpsDeskError {
    let code = status.as_u16();
    let mut message =
        format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));
    let body = body.trim();
    if !body.is_empty() {
        message.push_str(": ");
        message.push_str(body);
    }

    match code {
        401 | 403 => OpsDeskError::Auth(message),
        404 => OpsDeskError::NotFound(message),
        429 => OpsDeskError::Network(message),
        400..=499 => OpsDeskError::InvalidInput(message),
        500..=599 => OpsDeskError::Backend(message),
        _ => OpsDeskError::Network(message),
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → OpsDeskError */
/* -------------------------------------------------------------------------- */

impl IntoOpsDeskError for HttpError {
    fn into_opsdesk(self) -> OpsDeskError {
        if self.is_timeout() {
            return OpsDeskError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return OpsDeskError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return OpsDeskError::Backend(format!("unexpected HTTP response body: {}", self));
        }

        if let Some(status) = self.status() {
            return status_error(status, "");
        }

        OpsDeskError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_opsdesk())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → OpsDeskError */
/* -------------------------------------------------------------------------- */

impl IntoOpsDeskError for serde_json::Error {
    fn into_opsdesk(self) -> OpsDeskError {
        OpsDeskError::Backend(format!("malformed JSON payload: {}", self))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_opsdesk())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn status_mapping_follows_error_taxonomy() {
        assert!(matches!(status_error(StatusCode::UNAUTHORIZED, ""), OpsDeskError::Auth(_)));
        assert!(matches!(status_error(StatusCode::FORBIDDEN, ""), OpsDeskError::Auth(_)));
        assert!(matches!(status_error(StatusCode::NOT_FOUND, ""), OpsDeskError::NotFound(_)));
        assert!(matches!(
            status_error(StatusCode::UNPROCESSABLE_ENTITY, ""),
            OpsDeskError::InvalidInput(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, ""),
            OpsDeskError::Network(_)
        ));
        assert!(matches!(status_error(StatusCode::BAD_GATEWAY, ""), OpsDeskError::Backend(_)));
    }

    #[test]
    fn status_error_keeps_backend_body() {
        let err = status_error(StatusCode::BAD_REQUEST, " {\"code\":\"23502\"} ");
        match err {
            OpsDeskError::InvalidInput(msg) => {
                assert_eq!(msg, "HTTP 400 Bad Request: {\"code\":\"23502\"}");
            }
            other => panic!("expected invalid input, got {:?}", other),
        }
    }

    #[test]
    fn malformed_json_maps_to_backend_error() {
        let err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let mapped: OpsDeskError = InfraError::from(err).into();
        assert!(matches!(mapped, OpsDeskError::Backend(_)));
    }

    #[tokio::test]
    async fn http_status_401_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: OpsDeskError = InfraError::from(error).into();
        match mapped {
            OpsDeskError::Auth(msg) => assert!(msg.contains("401")),
            other => panic!("expected auth error, got {:?}", other),
        }
    }
}
