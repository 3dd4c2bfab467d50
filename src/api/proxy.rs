// src/api/proxy.rs

use actix_web::http::StatusCode;
use actix_web::http::header as actix_header;
use actix_web::{HttpRequest, HttpResponse, route, web};
use reqwest::header as upstream_header;
use serde_json::json;
use uuid::Uuid;

use crate::AppState;

/// Forwards `/api/*` to the backend unchanged and relays its answer.
/// Nothing about payment state is interpreted here.
#[route(
    "/api/{tail:.*}",
    method = "GET",
    method = "POST",
    method = "PUT",
    method = "PATCH",
    method = "DELETE"
)]
pub async fn forward(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> HttpResponse {
    let request_id = Uuid::new_v4().to_string();

    // raw path: percent-escapes such as %3F must reach the backend intact
    let mut url = format!("{}{}", state.config.api_base_url, req.uri().path());
    if !req.query_string().is_empty() {
        url.push('?');
        url.push_str(req.query_string());
    }

    let method = match reqwest::Method::from_bytes(req.method().as_str().as_bytes()) {
        Ok(m) => m,
        Err(_) => return HttpResponse::MethodNotAllowed().finish(),
    };

    let mut upstream = state
        .http
        .request(method.clone(), &url)
        .header("X-Request-Id", &request_id);

    if let Some(ct) = header_str(&req, actix_header::CONTENT_TYPE) {
        upstream = upstream.header(upstream_header::CONTENT_TYPE, ct);
    }

    // caller's credential wins over the configured one
    match header_str(&req, actix_header::AUTHORIZATION) {
        Some(auth) => upstream = upstream.header(upstream_header::AUTHORIZATION, auth),
        None => {
            if let Some(token) = state.config.api_token.as_deref() {
                upstream = upstream.header(upstream_header::AUTHORIZATION, format!("Bearer {token}"));
            }
        }
    }

    if !body.is_empty() {
        upstream = upstream.body(body.to_vec());
    }

    log::info!("proxy {} {} request_id={}", method, url, request_id);

    let resp = match upstream.send().await {
        Ok(r) => r,
        Err(e) => {
            log::error!("proxy upstream error: {e} url={url} request_id={request_id}");
            return HttpResponse::BadGateway().json(json!({
                "error": "backend unavailable"
            }));
        }
    };

    let status = StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = resp
        .headers()
        .get(upstream_header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let bytes = match resp.bytes().await {
        Ok(b) => b,
        Err(e) => {
            log::error!("proxy read upstream body error: {e} request_id={request_id}");
            return HttpResponse::BadGateway().json(json!({
                "error": "backend unavailable"
            }));
        }
    };

    if !status.is_success() {
        log::warn!("proxy upstream status={} url={} request_id={}", status.as_u16(), url, request_id);
    }

    let mut out = HttpResponse::build(status);
    if let Some(ct) = content_type {
        out.insert_header((actix_header::CONTENT_TYPE, ct));
    }
    out.body(bytes.to_vec())
}

fn header_str(req: &HttpRequest, name: actix_header::HeaderName) -> Option<&str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}
