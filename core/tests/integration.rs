//! Uploads against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port and posts real multipart bodies to
//! it with the blocking ureq transport. The server parses them with axum's
//! multipart extractor and echoes what it saw, so these tests check the
//! encoder against an independent parser.

use std::net::SocketAddr;

use formpost_core::{CancelToken, ClientConfig, FileField, MultipartForm, UploadClient, UploadError};
use mock_server::UploadReceipt;

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn client() -> UploadClient {
    UploadClient::new("formpost-integration/0.1")
}

fn receipt(body: &[u8]) -> UploadReceipt {
    serde_json::from_slice(body).unwrap()
}

#[test]
fn text_fields_round_trip_in_order() {
    let addr = start_server();
    let form = MultipartForm::new()
        .text("zeta", "26")
        .text("alpha", "1")
        .text("mixed", "ação, naïve, 東京")
        .text("multiline", "one\r\ntwo");

    let resp = client()
        .post(&format!("http://{addr}/upload"), &form)
        .unwrap();
    assert_eq!(resp.status, 200);

    let receipt = receipt(&resp.body);
    let got: Vec<(Option<&str>, Option<&str>)> = receipt
        .parts
        .iter()
        .map(|p| (p.name.as_deref(), p.text()))
        .collect();
    assert_eq!(
        got,
        vec![
            (Some("zeta"), Some("26")),
            (Some("alpha"), Some("1")),
            (Some("mixed"), Some("ação, naïve, 東京")),
            (Some("multiline"), Some("one\r\ntwo")),
        ]
    );
    assert!(receipt.parts.iter().all(|p| p.file_name.is_none()));
}

#[test]
fn binary_file_round_trips_unmodified() {
    let addr = start_server();
    let mut payload: Vec<u8> = (0u8..=255).collect();
    payload.extend_from_slice(b"\r\n\r\n--\0\0\r\n");

    let form = MultipartForm::new().file(
        "blob",
        FileField::new(payload.clone())
            .with_filename("blob.bin")
            .with_content_type("application/x-test"),
    );
    let resp = client()
        .post(&format!("http://{addr}/upload"), &form)
        .unwrap();
    assert_eq!(resp.status, 200);

    let receipt = receipt(&resp.body);
    assert_eq!(receipt.parts.len(), 1);
    let part = &receipt.parts[0];
    assert_eq!(part.name.as_deref(), Some("blob"));
    assert_eq!(part.file_name.as_deref(), Some("blob.bin"));
    assert_eq!(part.content_type.as_deref(), Some("application/x-test"));
    assert_eq!(part.data, payload);
}

#[test]
fn file_defaults_are_applied() {
    let addr = start_server();
    let form = MultipartForm::new()
        .text("title", "scan")
        .file("attachment", FileField::new(b"raw".to_vec()));

    let resp = client()
        .post(&format!("http://{addr}/upload"), &form)
        .unwrap();
    let receipt = receipt(&resp.body);

    let file = &receipt.parts[1];
    assert_eq!(file.name.as_deref(), Some("attachment"));
    assert_eq!(file.file_name.as_deref(), Some("attachment"));
    assert_eq!(file.content_type.as_deref(), Some("application/octet-stream"));
    assert_eq!(file.data, b"raw");
}

#[test]
fn request_headers_reach_the_server() {
    let addr = start_server();
    let form = MultipartForm::new().text("k", "v");
    let c = client();

    let expected = c
        .build_post(&format!("http://{addr}/upload"), &form)
        .unwrap();
    let resp = c.post(&format!("http://{addr}/upload"), &form).unwrap();
    let receipt = receipt(&resp.body);

    assert_eq!(receipt.user_agent.as_deref(), Some("formpost-integration/0.1"));
    let content_type = receipt.content_type.unwrap();
    let token = content_type
        .strip_prefix("multipart/form-data; boundary=----------")
        .unwrap();
    assert_eq!(token.len(), 32);
    assert_eq!(receipt.content_length, Some(expected.body.len() as u64));
}

#[test]
fn non_success_status_is_returned_as_response() {
    let addr = start_server();
    let form = MultipartForm::new().text("k", "v");

    let resp = client()
        .post(&format!("http://{addr}/status/422"), &form)
        .unwrap();
    assert_eq!(resp.status, 422);
    assert!(!resp.is_success());
    assert!(resp.text().starts_with("received "));
}

/// One-shot HTTP server that drains a request and answers `200` with `len`
/// bytes of body.
fn serve_large_response(len: usize) -> SocketAddr {
    use std::io::{BufRead, BufReader, Read, Write};

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
        }
        let mut request_body = vec![0u8; content_length];
        reader.read_exact(&mut request_body).unwrap();

        let mut stream = reader.into_inner();
        write!(
            stream,
            "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {len}\r\nConnection: close\r\n\r\n"
        )
        .unwrap();
        stream.write_all(&vec![b'x'; len]).unwrap();
        stream.flush().unwrap();
    });
    addr
}

#[test]
fn response_larger_than_ten_mebibytes_is_read_in_full() {
    let len = 12 * 1024 * 1024;
    let addr = serve_large_response(len);
    let form = MultipartForm::new().text("k", "v");

    let resp = client()
        .post(&format!("http://{addr}/download"), &form)
        .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body.len(), len);
    assert!(resp.body.iter().all(|&b| b == b'x'));
}

#[test]
fn connection_refused_is_a_transport_error() {
    // Bind then drop to get a port with nothing listening on it.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let err = client()
        .post(&format!("http://{addr}/upload"), &MultipartForm::new())
        .unwrap_err();
    assert!(matches!(err, UploadError::Transport(_)), "{err}");
    assert!(err.is_transport());
}

#[test]
fn invalid_url_fails_before_connecting() {
    let err = client()
        .post("mailto:someone@example.com", &MultipartForm::new())
        .unwrap_err();
    assert!(matches!(err, UploadError::InvalidUrl { .. }));
}

#[test]
fn cancellable_post_completes() {
    let addr = start_server();
    let form = MultipartForm::new().text("k", "v");
    let token = CancelToken::new();

    let resp = client()
        .post_cancellable(&format!("http://{addr}/upload"), &form, &token)
        .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(receipt(&resp.body).parts.len(), 1);
}

#[test]
fn cancelled_token_stops_post() {
    let addr = start_server();
    let token = CancelToken::new();
    token.cancel();

    let err = client()
        .post_cancellable(&format!("http://{addr}/upload"), &MultipartForm::new(), &token)
        .unwrap_err();
    assert!(matches!(err, UploadError::Cancelled));
}

#[test]
fn concurrent_posts_share_one_client() {
    let addr = start_server();
    let c = UploadClient::with_config(
        "formpost-integration/0.1",
        ClientConfig {
            timeout_ms: 10_000,
            ..ClientConfig::default()
        },
    );

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let c = c.clone();
            let url = format!("http://{addr}/upload");
            std::thread::spawn(move || {
                let form = MultipartForm::new().text("worker", i.to_string());
                let resp = c.post(&url, &form).unwrap();
                let receipt: UploadReceipt = serde_json::from_slice(&resp.body).unwrap();
                receipt.parts[0].text().map(str::to_string)
            })
        })
        .collect();

    let mut seen: Vec<String> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();
    seen.sort();
    assert_eq!(seen, vec!["0", "1", "2", "3"]);
}
