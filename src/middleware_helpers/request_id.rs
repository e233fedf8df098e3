use crate::telemetry::RequestId;
use axum::{
    extract::Request,
    http::{header::HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

/// Header name for the request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tags each request with an id, echoes it on the response and scopes it for error bodies.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map(RequestId::new)
        .unwrap_or_default();

    let header_value = HeaderValue::from_str(request_id.as_str()).ok();
    if let Some(value) = header_value.clone() {
        request
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    request.extensions_mut().insert(request_id.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %request_id.as_str(),
        method = %request.method(),
        uri = %request.uri(),
    );

    let mut response = crate::telemetry::scope_request_id(
        request_id,
        async move { next.run(request).await }.instrument(span),
    )
    .await;

    if let Some(value) = header_value {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        extract::Extension,
        http::Request as HttpRequest,
        routing::get,
        Router,
    };
    use rstest::rstest;
    use tower::ServiceExt;

    async fn echo(Extension(request_id): Extension<RequestId>) -> String {
        request_id.as_str().to_string()
    }

    #[rstest]
    #[case::supplied(Some("route-42"), Some("route-42"))]
    #[case::blank(Some("   "), None)]
    #[case::missing(None, None)]
    #[tokio::test]
    async fn header_and_extension_carry_the_same_id(
        #[case] incoming: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let app = Router::new()
            .route("/", get(echo))
            .layer(axum::middleware::from_fn(request_id_middleware));

        let mut request = HttpRequest::builder().uri("/");
        if let Some(id) = incoming {
            request = request.header(REQUEST_ID_HEADER, id);
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let header = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .expect("id echoed on the response");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], header.as_bytes());
        assert!(!header.trim().is_empty());
        if let Some(expected) = expected {
            assert_eq!(header, expected);
        }
    }
}
