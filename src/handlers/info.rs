use serde_json::{json, Value};

use crate::api::{ApiRequest, ApiResponse, EdgeMetadata};
use crate::errors::AppResult;

const NOT_AVAILABLE: &str = "N/A";
const NOT_AVAILABLE_LOCAL: &str = "N/A (local dev)";

fn or_na(value: &Option<String>) -> Value {
    match value {
        Some(value) => json!(value),
        None => json!(NOT_AVAILABLE),
    }
}

/// `GET /api/demo/info`: reflects the edge location, connection details and
/// a few request headers back to the caller.
pub async fn request_info(req: &ApiRequest) -> AppResult<ApiResponse> {
    let edge = req.edge.clone().unwrap_or_default();
    let EdgeMetadata {
        colo,
        country,
        city,
        region,
        timezone,
        latitude,
        longitude,
        http_protocol,
        tls_version,
        asn,
        as_organization,
    } = &edge;

    Ok(ApiResponse::ok(json!({
        "method": req.method.to_string(),
        "url": req.url.as_str(),
        "edge": {
            "colo": colo.as_deref().unwrap_or(NOT_AVAILABLE_LOCAL),
            "country": or_na(country),
            "city": or_na(city),
            "region": or_na(region),
            "timezone": or_na(timezone),
            "latitude": or_na(latitude),
            "longitude": or_na(longitude),
        },
        "connection": {
            "httpProtocol": or_na(http_protocol),
            "tlsVersion": or_na(tls_version),
            "asn": asn.map(Value::from).unwrap_or_else(|| json!(NOT_AVAILABLE)),
            "asOrganization": or_na(as_organization),
        },
        "headers": {
            "userAgent": req.header("user-agent"),
            "acceptLanguage": req.header("accept-language"),
            "referer": req.header("referer"),
        },
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use worker::Method;

    fn get() -> ApiRequest {
        ApiRequest::new(Method::Get, "https://demo.dev/api/demo/info").unwrap()
    }

    #[test]
    fn falls_back_to_na_outside_the_edge() {
        let body = block_on(request_info(&get())).unwrap().body.unwrap();
        assert_eq!(body["method"], "GET");
        assert_eq!(body["edge"]["colo"], "N/A (local dev)");
        assert_eq!(body["edge"]["country"], "N/A");
        assert_eq!(body["connection"]["asn"], "N/A");
        assert_eq!(body["headers"]["userAgent"], Value::Null);
    }

    #[test]
    fn reflects_edge_metadata_and_headers() {
        let req = get()
            .with_header("User-Agent", "curl/8.4")
            .with_header("Referer", "https://example.com")
            .with_edge(EdgeMetadata {
                colo: Some("AMS".into()),
                country: Some("NL".into()),
                asn: Some(13335),
                http_protocol: Some("HTTP/2".into()),
                ..Default::default()
            });

        let body = block_on(request_info(&req)).unwrap().body.unwrap();
        assert_eq!(body["edge"]["colo"], "AMS");
        assert_eq!(body["edge"]["country"], "NL");
        assert_eq!(body["edge"]["city"], "N/A");
        assert_eq!(body["connection"]["asn"], 13335);
        assert_eq!(body["connection"]["httpProtocol"], "HTTP/2");
        assert_eq!(body["headers"]["userAgent"], "curl/8.4");
        assert_eq!(body["headers"]["referer"], "https://example.com");
    }
}
