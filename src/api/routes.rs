use crate::record::SaintRecord;
use crate::service::{CacheStatus, Lookup, SaintService};
use crate::FetchError;
use axum::extract::{Path, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

/// Response header reporting whether the cache answered the request
pub const CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-status-cache");

/// Message returned by the cache-clear route
pub const CACHE_CLEARED_MESSAGE: &str = "Todos os caches foram limpos com sucesso";

#[derive(Debug, Serialize)]
struct ResultsBody {
    resultados: Vec<SaintRecord>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    erro: String,
}

#[derive(Debug, Serialize)]
struct MessageBody {
    mensagem: &'static str,
}

/// `GET /`
pub async fn today(State(service): State<Arc<SaintService>>) -> Response {
    lookup_response(service.today().await)
}

/// `GET /dia=<day>&mes=<month>`
pub async fn by_date(
    State(service): State<Arc<SaintService>>,
    Path(selector): Path<String>,
) -> Response {
    match parse_date_selector(&selector) {
        Some((day, month)) => lookup_response(service.for_date(day, month).await),
        None => with_cache_status(StatusCode::NOT_FOUND.into_response(), CacheStatus::Miss),
    }
}

/// `GET /limpar-cache`
pub async fn clear_cache(State(service): State<Arc<SaintService>>) -> Response {
    service.clear_caches();
    with_cache_status(
        Json(MessageBody {
            mensagem: CACHE_CLEARED_MESSAGE,
        })
        .into_response(),
        CacheStatus::Miss,
    )
}

fn lookup_response(result: Result<Lookup, FetchError>) -> Response {
    match result {
        Ok(lookup) => with_cache_status(
            Json(ResultsBody {
                resultados: lookup.records,
            })
            .into_response(),
            lookup.cache_status,
        ),
        Err(e) => {
            tracing::error!("Failed to resolve saints: {}", e);
            let body = Json(ErrorBody { erro: e.to_string() });
            with_cache_status(
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response(),
                CacheStatus::Miss,
            )
        }
    }
}

fn with_cache_status(mut response: Response, status: CacheStatus) -> Response {
    response.headers_mut().insert(
        CACHE_STATUS_HEADER,
        HeaderValue::from_static(status.as_str()),
    );
    response
}

/// Parses the `dia=<day>&mes=<month>` path segment
///
/// Both values must be present exactly once and be non-negative integers.
/// They are not checked against the calendar.
pub fn parse_date_selector(selector: &str) -> Option<(u32, u32)> {
    let mut day = None;
    let mut month = None;

    for pair in selector.split('&') {
        let (name, value) = pair.split_once('=')?;
        let slot = match name {
            "dia" => &mut day,
            "mes" => &mut month,
            _ => return None,
        };
        if slot.is_some() {
            return None;
        }
        *slot = Some(value.parse::<u32>().ok()?);
    }

    Some((day?, month?))
}
