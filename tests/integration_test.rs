use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Mock, Server};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_profile(dir: &Path, server_url: &str) -> PathBuf {
    let path = dir.join("profile.json");
    let profile = format!(
        r#"{{
            "api_key": "test-api-key",
            "client_id": "test-client",
            "client_secret": "test-secret",
            "api_host": "{url}",
            "auth_host": "{url}",
            "retry": {{"max_attempts": 2, "initial_delay": 0.01}}
        }}"#,
        url = server_url
    );
    std::fs::write(&path, profile).unwrap();
    path
}

fn write_query(dir: &Path) -> PathBuf {
    let path = dir.join("query.json");
    std::fs::write(
        &path,
        r#"{
            "dataset_id": "dataset_brand_listenfirst",
            "start_date": "2022-07-10",
            "end_date": "2022-08-10",
            "filters": [{"field": "lfm.brand_view.id", "operator": "IN", "values": [1234]}],
            "metrics": ["lfm.post_engagement_score.comments_score_v5"]
        }"#,
    )
    .unwrap();
    path
}

fn mock_token(server: &mut Server) -> Mock {
    server
        .mock("POST", "/oauth2/token")
        .match_body(Matcher::UrlEncoded(
            "grant_type".into(),
            "client_credentials".into(),
        ))
        .with_status(200)
        .with_body(r#"{"access_token": "integration-token", "expires_in": 3600}"#)
        .create()
}

fn job_record(id: u64, state: &str, page_urls: &[String]) -> String {
    serde_json::json!({
        "record": {
            "id": id,
            "state": state,
            "created_at": "2022-08-11T00:00:00Z",
            "updated_at": "2022-08-11T00:05:00Z",
            "client_context": "integration",
            "schedule_config_id": null,
            "page_urls": page_urls
        }
    })
    .to_string()
}

fn page(values: &[i64], has_more_pages: bool) -> String {
    serde_json::json!({
        "columns": [
            {"id": "lfm.brand_view.id", "name": "Brand View ID", "class": "DIMENSION", "data_type": "INTEGER"}
        ],
        "records": values.iter().map(|v| vec![*v]).collect::<Vec<_>>(),
        "has_more_pages": has_more_pages
    })
    .to_string()
}

fn lfapi() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("lfapi"));
    cmd.env_remove("LF_PROFILE")
        .env_remove("LF_API_HOST")
        .env_remove("LF_API_KEY");
    cmd
}

#[test]
fn test_job_show() {
    let mut server = Server::new();
    let dir = tempdir().unwrap();
    let profile = write_profile(dir.path(), &server.url());

    let token = mock_token(&mut server);
    let show = server
        .mock("GET", "/v20200626/analytics/fetch_job/42")
        .match_header("authorization", "Bearer integration-token")
        .match_header("x-api-key", "test-api-key")
        .match_header("lf-client-library", "Rust SDK")
        .with_status(200)
        .with_body(job_record(42, "running", &[]))
        .create();

    lfapi()
        .arg("--profile")
        .arg(&profile)
        .arg("job")
        .arg("show")
        .arg("42")
        .assert()
        .success()
        .stdout(predicates::str::contains("\"id\": 42"))
        .stdout(predicates::str::contains("running"));

    token.assert();
    show.assert();
}

#[test]
fn test_fetch_prints_rows_from_every_page() {
    let mut server = Server::new();
    let dir = tempdir().unwrap();
    let profile = write_profile(dir.path(), &server.url());
    let query = write_query(dir.path());

    let _token = mock_token(&mut server);
    let first = server
        .mock("POST", "/v20200626/analytics/fetch")
        .match_body(Matcher::PartialJson(
            serde_json::json!({"page": 1, "per_page": 2}),
        ))
        .with_status(200)
        .with_body(page(&[1, 2], true))
        .create();
    let second = server
        .mock("POST", "/v20200626/analytics/fetch")
        .match_body(Matcher::PartialJson(
            serde_json::json!({"page": 2, "per_page": 2}),
        ))
        .with_status(200)
        .with_body(page(&[3], false))
        .create();

    lfapi()
        .arg("fetch")
        .arg(&query)
        .arg("--per-page")
        .arg("2")
        .arg("--labels")
        .arg("name")
        .arg("--profile")
        .arg(&profile)
        .assert()
        .success()
        .stdout(predicates::str::contains(r#"{"Brand View ID":1}"#))
        .stdout(predicates::str::contains(r#"{"Brand View ID":3}"#));

    first.assert();
    second.assert();
}

#[test]
fn test_fetch_job_wait_saves_pages() {
    let mut server = Server::new();
    let url = server.url();
    let dir = tempdir().unwrap();
    let profile = write_profile(dir.path(), &url);
    let query = write_query(dir.path());
    let out = dir.path().join("out");

    let page_urls = vec![format!("{}/pages/a.json", url), format!("{}/pages/b.json", url)];

    let _token = mock_token(&mut server);
    let create = server
        .mock("POST", "/v20200626/analytics/fetch_job")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "client_context": "integration",
            "fetch_params": {"dataset_id": "dataset_brand_listenfirst"}
        })))
        .with_status(201)
        .with_body(job_record(7, "pending", &[]))
        .create();
    let _show = server
        .mock("GET", "/v20200626/analytics/fetch_job/7")
        .with_status(200)
        .with_body(job_record(7, "completed", &page_urls))
        .create();
    let page_a = server
        .mock("GET", "/pages/a.json")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(page(&[10], false))
        .create();
    let page_b = server
        .mock("GET", "/pages/b.json")
        .with_status(200)
        .with_body(page(&[20], false))
        .create();

    lfapi()
        .arg("--profile")
        .arg(&profile)
        .arg("fetch-job")
        .arg(&query)
        .arg("--client-context")
        .arg("integration")
        .arg("--wait")
        .arg("--output")
        .arg(&out)
        .arg("--concurrency")
        .arg("2")
        .assert()
        .success();

    create.assert();
    page_a.assert();
    page_b.assert();

    let first = std::fs::read_to_string(out.join("page-0001.json")).unwrap();
    let second = std::fs::read_to_string(out.join("page-0002.json")).unwrap();
    assert!(first.contains("10"));
    assert!(second.contains("20"));
    assert!(!out.join("page-0003.json").exists());
}

#[test]
fn test_failed_fetch_job_exits_with_error() {
    let mut server = Server::new();
    let dir = tempdir().unwrap();
    let profile = write_profile(dir.path(), &server.url());
    let query = write_query(dir.path());

    let _token = mock_token(&mut server);
    let _create = server
        .mock("POST", "/v20200626/analytics/fetch_job")
        .with_status(201)
        .with_body(job_record(8, "pending", &[]))
        .create();
    let _show = server
        .mock("GET", "/v20200626/analytics/fetch_job/8")
        .with_status(200)
        .with_body(job_record(8, "failed", &[]))
        .create();

    lfapi()
        .arg("--profile")
        .arg(&profile)
        .arg("fetch-job")
        .arg(&query)
        .arg("--wait")
        .assert()
        .failure()
        .stderr(predicates::str::contains("fetch job 8 failed"));
}

#[test]
fn test_rejected_credentials() {
    let mut server = Server::new();
    let dir = tempdir().unwrap();
    let profile = write_profile(dir.path(), &server.url());

    let _token = server
        .mock("POST", "/oauth2/token")
        .with_status(401)
        .with_body(r#"{"error": "invalid_client"}"#)
        .create();

    lfapi()
        .arg("--profile")
        .arg(&profile)
        .arg("dataset")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicates::str::contains("authentication failed"));
}

#[test]
fn test_profile_from_environment() {
    let mut server = Server::new();

    let _token = mock_token(&mut server);
    let brands = server
        .mock("GET", "/v20200626/brand_views")
        .match_header("lfm-acting-account", "1001")
        .match_query(Matcher::UrlEncoded("per_page".into(), "1".into()))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "records": [{"id": 7, "name": "My Brand", "type": "BRAND", "dimensions": {}}],
                "has_more_pages": true
            })
            .to_string(),
        )
        .create();

    lfapi()
        .env("LF_API_KEY", "env-key")
        .env("LF_CLIENT_ID", "env-client")
        .env("LF_CLIENT_SECRET", "env-secret")
        .env("LF_ACCOUNT_ID", "1001")
        .env("LF_API_HOST", server.url())
        .env("LF_AUTH_HOST", server.url())
        .arg("brand")
        .arg("list")
        .arg("--per-page")
        .arg("1")
        .assert()
        .success()
        .stdout(predicates::str::contains("My Brand"));

    brands.assert();
}

#[test]
fn test_missing_profile_fails() {
    let dir = tempdir().unwrap();

    lfapi()
        .arg("--profile")
        .arg(dir.path().join("missing.json"))
        .arg("job")
        .arg("show")
        .arg("1")
        .assert()
        .failure()
        .stderr(predicates::str::contains("Failed to read"));
}
