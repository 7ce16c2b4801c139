//! Integration tests for the fetch → parse → cache pipeline
//!
//! These tests use wiremock to stand in for the origin site and exercise the
//! service, the refresh job, and the HTTP routes end-to-end.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Datelike, Local};
use daily_saints::api::{router, CACHE_CLEARED_MESSAGE};
use daily_saints::config::{Config, OriginConfig};
use daily_saints::{
    CacheStatus, FetchError, RefreshSchedule, RefreshScheduler, SaintQuery, SaintService,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SAINT_PATH: &str = "/reze-no-santuario/santo-do-dia";

/// Creates a test configuration pointing at the mock origin
fn create_test_config(origin: &str, timeout_secs: u64) -> Config {
    Config {
        origin: OriginConfig {
            base_url: origin.to_string(),
            saint_path: SAINT_PATH.to_string(),
            request_timeout_secs: timeout_secs,
            ..OriginConfig::default()
        },
        ..Config::default()
    }
}

fn create_service(server: &MockServer) -> Arc<SaintService> {
    Arc::new(
        SaintService::new(&create_test_config(&server.uri(), 5))
            .expect("Failed to create service"),
    )
}

/// A saint page with the given paragraphs
fn saint_page(name: &str, paragraphs: &[String]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<p>{}</p>", p))
        .collect();
    format!(
        r#"<html><body>
            <div class="feature">
                <img class="feature__portrait" src="/img/{name}.jpg">
                <div class="feature__name">{name}</div>
            </div>
            <div class="wg-text">{body}</div>
        </body></html>"#
    )
}

fn midnight() -> chrono::NaiveTime {
    chrono::NaiveTime::from_hms_opt(0, 0, 0).unwrap()
}

fn paragraphs(prefix: &str, n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{} P{}", prefix, i)).collect()
}

fn list_page(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        r#"<html><body><div class="saints-list">{}</div></body></html>"#,
        anchors
    )
}

async fn mount_html(server: &MockServer, at: &str, body: String, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Mounts a list page with three children, each six paragraphs long
async fn mount_three_saints(server: &MockServer) {
    mount_html(
        server,
        SAINT_PATH,
        list_page(&["/santo/a", "/santo/b", "/santo/c"]),
        1,
    )
    .await;

    for child in ["a", "b", "c"] {
        mount_html(
            server,
            &format!("/santo/{}", child),
            saint_page(child, &paragraphs(child, 6)),
            1,
        )
        .await;
    }
}

#[tokio::test]
async fn test_list_page_with_three_saints() {
    let server = MockServer::start().await;
    mount_three_saints(&server).await;

    let service = create_service(&server);
    let lookup = service.today().await.expect("Lookup failed");

    assert_eq!(lookup.cache_status, CacheStatus::Miss);
    assert_eq!(lookup.records.len(), 3);

    for (record, child) in lookup.records.iter().zip(["a", "b", "c"]) {
        assert_eq!(record.name(), child);
        assert_eq!(record.story(), format!("{0} P1\n\n{0} P2", child));
        assert_eq!(record.reflection(), format!("{} P4", child));
        assert_eq!(record.prayer(), format!("{} P6", child));
        assert_eq!(
            record.image_url(),
            Some(format!("{}/img/{}.jpg", server.uri(), child).as_str())
        );
    }
}

#[tokio::test]
async fn test_single_page_with_two_paragraphs() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        SAINT_PATH,
        saint_page("São Lucas", &paragraphs("x", 2)),
        1,
    )
    .await;

    let service = create_service(&server);
    let lookup = service.today().await.expect("Lookup failed");

    assert_eq!(lookup.records.len(), 1);
    let record = &lookup.records[0];
    assert_eq!(record.name(), "São Lucas");
    assert_eq!(record.story(), "");
    assert_eq!(record.reflection(), "");
    assert_eq!(record.prayer(), "x P2");
}

#[tokio::test]
async fn test_top_level_timeout_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SAINT_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(saint_page("late", &paragraphs("x", 6)))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let service = Arc::new(
        SaintService::new(&create_test_config(&server.uri(), 1)).expect("Failed to create service"),
    );

    let result = service.today().await;
    assert!(matches!(result, Err(FetchError::Timeout { .. })));
    assert!(service.cache().is_empty(), "failures must not be cached");
}

#[tokio::test]
async fn test_failed_child_is_dropped() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        SAINT_PATH,
        list_page(&["/santo/a", "/santo/b", "/santo/c"]),
        1,
    )
    .await;
    mount_html(&server, "/santo/a", saint_page("a", &paragraphs("a", 6)), 1).await;
    Mock::given(method("GET"))
        .and(path("/santo/b"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_html(&server, "/santo/c", saint_page("c", &paragraphs("c", 6)), 1).await;

    let service = create_service(&server);
    let lookup = service.today().await.expect("Lookup failed");

    let names: Vec<&str> = lookup.records.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["a", "c"]);
}

#[tokio::test]
async fn test_unextractable_child_is_dropped() {
    let server = MockServer::start().await;
    mount_html(&server, SAINT_PATH, list_page(&["/santo/a", "/santo/b"]), 1).await;
    mount_html(&server, "/santo/a", "<html>sem nome</html>".to_string(), 1).await;
    mount_html(&server, "/santo/b", saint_page("b", &paragraphs("b", 6)), 1).await;

    let service = create_service(&server);
    let lookup = service.today().await.expect("Lookup failed");

    assert_eq!(lookup.records.len(), 1);
    assert_eq!(lookup.records[0].name(), "b");
}

#[tokio::test]
async fn test_cache_hit_skips_fetching() {
    let server = MockServer::start().await;
    // Each page may be fetched once; a second fetch fails verification on drop.
    mount_three_saints(&server).await;

    let service = create_service(&server);

    let first = service.today().await.expect("First lookup failed");
    service.fetcher().clear_memo();
    let second = service.today().await.expect("Second lookup failed");

    assert_eq!(first.cache_status, CacheStatus::Miss);
    assert_eq!(second.cache_status, CacheStatus::Hit);
    assert_eq!(first.records, second.records);
}

#[tokio::test]
async fn test_empty_result_is_cached() {
    let server = MockServer::start().await;
    mount_html(&server, SAINT_PATH, list_page(&[]), 1).await;

    let service = create_service(&server);

    let first = service.today().await.expect("First lookup failed");
    service.fetcher().clear_memo();
    let second = service.today().await.expect("Second lookup failed");

    assert!(first.records.is_empty());
    assert_eq!(second.cache_status, CacheStatus::Hit);
}

#[tokio::test]
async fn test_clear_forces_refetch_and_is_idempotent() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        SAINT_PATH,
        saint_page("São Lucas", &paragraphs("x", 6)),
        2,
    )
    .await;

    let service = create_service(&server);

    service.today().await.expect("First lookup failed");
    service.clear_caches();
    service.clear_caches();
    assert!(service.cache().is_empty());
    assert_eq!(service.fetcher().memo_len(), 0);

    let lookup = service.today().await.expect("Lookup after clear failed");
    assert_eq!(lookup.cache_status, CacheStatus::Miss);
}

#[tokio::test]
async fn test_new_day_does_not_reuse_memoized_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SAINT_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(saint_page("ontem", &paragraphs("o", 6))),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_html(&server, SAINT_PATH, saint_page("hoje", &paragraphs("h", 6)), 1).await;

    let service = create_service(&server);
    let yesterday = chrono::NaiveDate::from_ymd_opt(2024, 10, 18).unwrap();
    let today = yesterday.succ_opt().unwrap();

    let first = service
        .lookup_on(SaintQuery::Today, yesterday)
        .await
        .expect("First lookup failed");
    assert_eq!(first.records[0].name(), "ontem");

    // No refresh job ran in between; only the date moved on.
    let second = service
        .lookup_on(SaintQuery::Today, today)
        .await
        .expect("Second lookup failed");
    assert_eq!(second.cache_status, CacheStatus::Miss);
    assert_eq!(second.records[0].name(), "hoje");
}

#[tokio::test]
async fn test_date_query_hits_origin_with_day_and_month() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SAINT_PATH))
        .and(query_param("day", "31"))
        .and(query_param("month", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(saint_page("x", &paragraphs("x", 3))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(&server);
    let lookup = service.for_date(31, 2).await.expect("Lookup failed");

    assert_eq!(lookup.records.len(), 1);
    assert_eq!(lookup.records[0].reflection(), "x P1");
}

#[tokio::test]
async fn test_refresh_job_prewarms_both_queries() {
    let server = MockServer::start().await;
    let today = Local::now().date_naive();

    // The date mock is mounted first so it wins over the catch-all page mock.
    Mock::given(method("GET"))
        .and(path(SAINT_PATH))
        .and(query_param("day", today.day().to_string()))
        .and(query_param("month", today.month().to_string()))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(saint_page("data", &paragraphs("d", 6))),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_html(&server, SAINT_PATH, saint_page("hoje", &paragraphs("h", 6)), 1).await;

    let service = create_service(&server);
    let scheduler = RefreshScheduler::new(Arc::clone(&service), midnight());

    let report = scheduler.run_job().await;
    assert_eq!(report.warmed, 2);
    assert_eq!(report.failed, 0);

    let today_lookup = service.today().await.expect("Today lookup failed");
    assert_eq!(today_lookup.cache_status, CacheStatus::Hit);
    assert_eq!(today_lookup.records[0].name(), "hoje");

    let date_lookup = service
        .for_date(today.day(), today.month())
        .await
        .expect("Date lookup failed");
    assert_eq!(date_lookup.cache_status, CacheStatus::Hit);
    assert_eq!(date_lookup.records[0].name(), "data");
}

#[tokio::test]
async fn test_refresh_job_isolates_failures() {
    let server = MockServer::start().await;
    let today = Local::now().date_naive();

    Mock::given(method("GET"))
        .and(path(SAINT_PATH))
        .and(query_param("day", today.day().to_string()))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(saint_page("data", &paragraphs("d", 6))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SAINT_PATH))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let service = create_service(&server);
    let scheduler = RefreshScheduler::new(Arc::clone(&service), midnight());

    let report = scheduler.run_job().await;
    assert_eq!(report.warmed, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(service.cache().len(), 1);

    // A failing job leaves the scheduler usable for the next firing.
    let report = scheduler.run_job().await;
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn test_refresh_job_clears_stale_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let service = create_service(&server);
    service.cache().set(
        SaintQuery::Date { day: 1, month: 1 }.cache_key(Local::now().date_naive()),
        Vec::new(),
        Duration::from_secs(3600),
    );

    let report = RefreshScheduler::new(Arc::clone(&service), midnight())
        .run_job()
        .await;

    assert_eq!(report.failed, 2);
    assert!(service.cache().is_empty());
}

#[tokio::test]
async fn test_scheduler_keeps_firing_after_failed_jobs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let service = create_service(&server);
    let handle = RefreshScheduler::with_schedule(
        Arc::clone(&service),
        RefreshSchedule::Every(Duration::from_millis(50)),
    )
    .start();

    // Every firing asks the origin for both queries, and failures are never
    // memoized, so four requests means at least two failed jobs.
    let fired_twice = async {
        loop {
            let requests = server
                .received_requests()
                .await
                .map(|requests| requests.len())
                .unwrap_or(0);
            if requests >= 4 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(5), fired_twice)
        .await
        .expect("Scheduler stopped firing after a failed job");

    tokio::time::timeout(Duration::from_secs(5), handle.stop())
        .await
        .expect("Scheduler did not stop");
    assert!(service.cache().is_empty());
}

#[tokio::test]
async fn test_scheduler_start_and_stop() {
    let server = MockServer::start().await;
    let service = create_service(&server);

    let handle = RefreshScheduler::new(service, midnight()).start();
    tokio::time::timeout(Duration::from_secs(5), handle.stop())
        .await
        .expect("Scheduler did not stop");
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Option<String>, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let cache_status = response
        .headers()
        .get("x-status-cache")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, cache_status, json)
}

#[tokio::test]
async fn test_route_today_reports_miss_then_hit() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        SAINT_PATH,
        saint_page("São Lucas", &paragraphs("x", 6)),
        1,
    )
    .await;

    let app = router(create_service(&server));

    let (status, cache_status, json) = get(app.clone(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_status.as_deref(), Some("MISS"));
    assert_eq!(json["resultados"][0]["nome"], "São Lucas");
    assert_eq!(json["resultados"][0]["oracao"], "x P6");

    let (status, cache_status, json) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_status.as_deref(), Some("HIT"));
    assert_eq!(json["resultados"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_route_by_date() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SAINT_PATH))
        .and(query_param("day", "18"))
        .and(query_param("month", "10"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(saint_page("São Lucas", &paragraphs("x", 6))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = router(create_service(&server));
    let (status, _, json) = get(app, "/dia=18&mes=10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["resultados"][0]["nome"], "São Lucas");
}

#[tokio::test]
async fn test_route_malformed_date_is_not_found() {
    let server = MockServer::start().await;
    let app = router(create_service(&server));

    let (status, _, _) = get(app, "/dia=dezoito&mes=10").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_route_pipeline_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let app = router(create_service(&server));
    let (status, cache_status, json) = get(app, "/").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(cache_status.as_deref(), Some("MISS"));
    assert!(json["erro"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_route_clear_cache() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        SAINT_PATH,
        saint_page("São Lucas", &paragraphs("x", 6)),
        2,
    )
    .await;

    let service = create_service(&server);
    let app = router(Arc::clone(&service));

    get(app.clone(), "/").await;
    assert_eq!(service.cache().len(), 1);

    let (status, _, json) = get(app.clone(), "/limpar-cache").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["mensagem"], CACHE_CLEARED_MESSAGE);
    assert!(service.cache().is_empty());

    let (_, cache_status, _) = get(app, "/").await;
    assert_eq!(cache_status.as_deref(), Some("MISS"));
}
