//! Request-shape tests for idcard-client against a local mock backend.
//!
//! Run with: cargo test --package idcard-client --test api_tests

use idcard_client::{AdminGate, ApiClient, ApiConfig, ClientError, DEFAULT_REGISTER_MESSAGE};
use idcard_core::{PhotoRef, PhotoUpload, RegistrationDraft, RegistrationUpdate};
use std::io::Read;
use std::sync::mpsc;
use std::thread;
use tiny_http::{Header, Response, Server};

/// What the mock backend saw.
#[derive(Debug)]
struct Recorded {
    method: String,
    url: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Recorded {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Serve `responses` in order, one per request, then stop.
fn mock_backend(responses: Vec<(u16, &'static str, Vec<u8>)>) -> (String, mpsc::Receiver<Recorded>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for (status, content_type, body) in responses {
            let mut request = match server.recv() {
                Ok(request) => request,
                Err(_) => return,
            };
            let mut received = Vec::new();
            let _ = request.as_reader().read_to_end(&mut received);
            let _ = tx.send(Recorded {
                method: request.method().to_string(),
                url: request.url().to_string(),
                headers: request
                    .headers()
                    .iter()
                    .map(|h| (h.field.to_string(), h.value.to_string()))
                    .collect(),
                body: received,
            });
            let response = Response::from_data(body)
                .with_status_code(status)
                .with_header(Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes()).unwrap());
            let _ = request.respond(response);
        }
    });

    (format!("http://127.0.0.1:{}", port), rx)
}

fn json(status: u16, body: &str) -> (u16, &'static str, Vec<u8>) {
    (status, "application/json", body.as_bytes().to_vec())
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::new(&ApiConfig::with_base_url(base_url).timeout_secs(5)).unwrap()
}

const ASHA: &str = r#"{"_id":"r1","name":"Asha","cluster":"Kunthoor","unit":"Kadaba",
    "designations":["Unit President"],"photoUrl":"/uploads/asha.png"}"#;

#[tokio::test]
async fn test_list_registrations() {
    let (base, seen) = mock_backend(vec![json(200, &format!("[{}]", ASHA))]);
    let registrations = client(&base).list_registrations().await.unwrap();

    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0].id, "r1");
    assert_eq!(registrations[0].photo_url.as_deref(), Some("/uploads/asha.png"));

    let request = seen.recv().unwrap();
    assert_eq!(request.method, "GET");
    assert_eq!(request.url, "/api/registrations");
}

#[tokio::test]
async fn test_register_sends_multipart_form() {
    let (base, seen) = mock_backend(vec![json(201, r#"{"message":"Saved"}"#)]);
    let draft = RegistrationDraft {
        name: "Asha".to_string(),
        cluster: "Kunthoor".to_string(),
        unit: "Kadaba".to_string(),
        designations: vec!["Unit President".to_string(), "Zone Councilor".to_string()],
        photo: Some(PhotoUpload::new("asha.png", b"\x89PNG\r\n\x1a\nrest".to_vec())),
    };
    let outcome = client(&base).register(&draft.validate().unwrap()).await.unwrap();
    assert_eq!(outcome.message, "Saved");
    assert!(outcome.registration.is_none());

    let request = seen.recv().unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.url, "/api/register");
    assert!(request
        .header("Content-Type")
        .unwrap()
        .starts_with("multipart/form-data"));
    let body = request.body_text();
    for field in ["name", "cluster", "unit", "designations", "photo"] {
        assert!(body.contains(&format!("name=\"{}\"", field)), "missing {}", field);
    }
    assert!(body.contains("Unit President,Zone Councilor"));
    assert!(body.contains("filename=\"asha.png\""));
    assert!(body.contains("image/png"));
}

#[tokio::test]
async fn test_register_default_message() {
    let (base, _seen) = mock_backend(vec![json(200, "{}")]);
    let draft = RegistrationDraft {
        name: "Ravi".to_string(),
        cluster: "Mardala".to_string(),
        unit: "Panya".to_string(),
        designations: vec!["Unit Treasurer".to_string()],
        photo: Some(PhotoUpload::new("ravi.jpg", vec![0xff, 0xd8, 0xff])),
    };
    let outcome = client(&base).register(&draft.validate().unwrap()).await.unwrap();
    assert_eq!(outcome.message, DEFAULT_REGISTER_MESSAGE);
}

#[tokio::test]
async fn test_register_failure_surfaces_server_message() {
    let (base, _seen) = mock_backend(vec![json(400, r#"{"message":"Photo too large"}"#)]);
    let draft = RegistrationDraft {
        name: "Ravi".to_string(),
        cluster: "Mardala".to_string(),
        unit: "Panya".to_string(),
        designations: vec!["Unit Treasurer".to_string()],
        photo: Some(PhotoUpload::new("ravi.jpg", vec![0xff, 0xd8, 0xff])),
    };
    let err = client(&base).register(&draft.validate().unwrap()).await.unwrap_err();
    match err {
        ClientError::Status { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Photo too large");
        }
        other => panic!("Expected Status, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_sends_json_and_returns_data() {
    let (base, seen) = mock_backend(vec![json(200, &format!(r#"{{"message":"ok","data":{}}}"#, ASHA))]);
    let session = AdminGate::default().login("admin", "admin").unwrap();
    let update = RegistrationUpdate::from_form("Asha", "Kunthoor", "Kadaba", "Unit President").unwrap();

    let updated = client(&base)
        .update_registration(&session, "r1", &update)
        .await
        .unwrap();
    assert_eq!(updated.id, "r1");

    let request = seen.recv().unwrap();
    assert_eq!(request.method, "PUT");
    assert_eq!(request.url, "/api/registration/r1");
    assert!(request.header("Content-Type").unwrap().starts_with("application/json"));
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["designations"][0], "Unit President");
    assert_eq!(body["unit"], "Kadaba");
}

#[tokio::test]
async fn test_delete_not_found() {
    let (base, seen) = mock_backend(vec![json(404, r#"{"message":"Registration not found"}"#)]);
    let session = AdminGate::default().login("admin", "admin").unwrap();
    let err = client(&base).delete_registration(&session, "missing").await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("Registration not found"));
    let request = seen.recv().unwrap();
    assert_eq!(request.method, "DELETE");
    assert_eq!(request.url, "/api/registration/missing");
}

#[tokio::test]
async fn test_error_without_json_uses_fallback() {
    let (base, _seen) = mock_backend(vec![(500, "text/html", b"<h1>oops</h1>".to_vec())]);
    let session = AdminGate::default().login("admin", "admin").unwrap();
    let err = client(&base).delete_registration(&session, "r1").await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Status { status: 500, ref message } if message == "Delete failed"
    ));
}

#[tokio::test]
async fn test_download_registrations_pdf() {
    let (base, seen) = mock_backend(vec![(200, "application/pdf", b"%PDF-1.7 fake".to_vec())]);
    let session = AdminGate::default().login("admin", "admin").unwrap();
    let bytes = client(&base).download_registrations_pdf(&session).await.unwrap();
    assert_eq!(bytes, b"%PDF-1.7 fake");

    let request = seen.recv().unwrap();
    assert_eq!(request.url, "/api/admin/export/registrations");
    assert_eq!(request.header("Accept"), Some("application/pdf"));
}

#[tokio::test]
async fn test_card_record_fetches_relative_photo() {
    let (base, seen) = mock_backend(vec![(200, "image/png", vec![1, 2, 3])]);
    let registration = serde_json::from_str(ASHA).unwrap();
    let record = client(&base).card_record(&registration).await.unwrap();

    assert_eq!(record.photo, Some(PhotoRef::Bytes(vec![1, 2, 3])));
    assert_eq!(seen.recv().unwrap().url, "/uploads/asha.png");
}

#[tokio::test]
async fn test_fetch_photo_rejects_empty_url() {
    let err = client("http://127.0.0.1:9").fetch_photo("  ").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidUrl(_)));
}
