use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use predicates::prelude::*;

static GENESIS_HTML: &str = include_str!("fixtures/genesis.html");

/// Serves the Genesis fixture under `/passage/` and reports each request URL.
fn spawn_passage_server() -> (
    String,
    mpsc::Receiver<String>,
    mpsc::Sender<()>,
    thread::JoinHandle<()>,
) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("start tiny_http server");
    let addr = server.server_addr();
    let base_url = format!("http://{addr}");

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
    let (requests_tx, requests_rx) = mpsc::channel::<String>();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            let request = match server.recv_timeout(Duration::from_millis(50)) {
                Ok(Some(req)) => req,
                Ok(None) => continue,
                Err(_) => break,
            };

            let url = request.url().to_string();
            let _ = requests_tx.send(url.clone());
            let path = url.split('?').next().unwrap_or(&url);

            let (status, body) = match path {
                "/passage/" => (200, GENESIS_HTML),
                "/maintenance/" => (503, "down for maintenance"),
                _ => (404, "not found"),
            };

            let mut response = tiny_http::Response::from_string(body).with_status_code(status);
            if status == 200 {
                let header = tiny_http::Header::from_bytes(
                    &b"Content-Type"[..],
                    &b"text/html; charset=utf-8"[..],
                )
                .expect("build header");
                response = response.with_header(header);
            }

            let _ = request.respond(response);
        }
    });

    (base_url, requests_rx, shutdown_tx, handle)
}

#[test]
fn fetches_print_interface_and_renders_markdown() -> anyhow::Result<()> {
    let (base_url, requests, shutdown_tx, server_handle) = spawn_passage_server();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("passagemd");
    cmd.env("PASSAGEMD_BASE_URL", format!("{base_url}/passage/"))
        .args(["--version", "NKJV", "Genesis 1:1-3; 2:1"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "## The History of Creation\n\n###### v1\n",
        ))
        .stdout(predicate::str::contains(
            "###### v2\nThe earth was without form, and void; and darkness *was* on the face of the deep.",
        ));

    let _ = shutdown_tx.send(());
    let _ = server_handle.join();

    let request_url = requests.recv_timeout(Duration::from_secs(1))?;
    assert_eq!(
        request_url,
        "/passage/?search=Genesis+1%3A1-3%3B+2%3A1&version=NKJV&interface=print"
    );
    Ok(())
}

#[test]
fn default_version_is_sent_when_not_given() -> anyhow::Result<()> {
    let (base_url, requests, shutdown_tx, server_handle) = spawn_passage_server();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("passagemd");
    cmd.env("PASSAGEMD_BASE_URL", format!("{base_url}/passage/"))
        .arg("John 1:1")
        .assert()
        .success();

    let _ = shutdown_tx.send(());
    let _ = server_handle.join();

    let request_url = requests.recv_timeout(Duration::from_secs(1))?;
    assert!(request_url.contains("&version=NKJV&"), "{request_url}");
    Ok(())
}

#[test]
fn http_error_status_is_fatal() {
    let (base_url, _requests, shutdown_tx, server_handle) = spawn_passage_server();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("passagemd");
    cmd.env("PASSAGEMD_BASE_URL", format!("{base_url}/maintenance/"))
        .arg("John 1:1")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("received HTTP response code 503"));

    let _ = shutdown_tx.send(());
    let _ = server_handle.join();
}
