//! Verify request building against JSON test vectors stored in `test-vectors/`.
//!
//! Each case names a fixed boundary, the ordered fields, and the exact request
//! the client must produce. Bodies are stored as text when they are valid
//! UTF-8 and as a byte array otherwise; both are compared byte for byte.

use formpost_core::{Boundary, FormField, MultipartForm, UploadClient};
use serde::Deserialize;

const USER_AGENT: &str = "formpost-vectors/1.0";

#[derive(Deserialize)]
struct Vectors {
    cases: Vec<Case>,
}

#[derive(Deserialize)]
struct Case {
    name: String,
    boundary: String,
    fields: Vec<NamedField>,
    expected_request: ExpectedRequest,
}

#[derive(Deserialize)]
struct NamedField {
    name: String,
    field: FormField,
}

#[derive(Deserialize)]
struct ExpectedRequest {
    url: String,
    headers: Vec<(String, String)>,
    body_text: Option<String>,
    body_bytes: Option<Vec<u8>>,
}

impl ExpectedRequest {
    fn body(&self) -> Vec<u8> {
        match (&self.body_text, &self.body_bytes) {
            (Some(text), None) => text.as_bytes().to_vec(),
            (None, Some(bytes)) => bytes.clone(),
            _ => panic!("vector must set exactly one of body_text / body_bytes"),
        }
    }
}

fn load() -> Vectors {
    let raw = include_str!("../../test-vectors/encode.json");
    serde_json::from_str(raw).unwrap()
}

#[test]
fn encode_test_vectors() {
    let client = UploadClient::new(USER_AGENT);
    let vectors = load();
    assert!(!vectors.cases.is_empty());

    for case in vectors.cases {
        let name = &case.name;
        let form: MultipartForm = case
            .fields
            .into_iter()
            .map(|f| (f.name, f.field))
            .collect();
        let boundary = Boundary::from_token(case.boundary.as_str());
        let expected = &case.expected_request;

        let req = client
            .build_post_with_boundary(&expected.url, &form, &boundary)
            .unwrap();

        assert_eq!(req.url, expected.url, "{name}: url");
        assert_eq!(req.headers, expected.headers, "{name}: headers");
        assert_eq!(
            String::from_utf8_lossy(&req.body),
            String::from_utf8_lossy(&expected.body()),
            "{name}: body"
        );
        assert_eq!(req.body, expected.body(), "{name}: body bytes");
    }
}

#[test]
fn vectors_keep_boundary_out_of_field_content() {
    // A fixture that embedded its own boundary would make the framing checks
    // above pass for the wrong reason.
    for case in load().cases {
        let form: MultipartForm = case
            .fields
            .into_iter()
            .map(|f| (f.name, f.field))
            .collect();
        let boundary = Boundary::from_token(case.boundary.as_str());
        assert!(
            formpost_core::check_framing(&form, &boundary).is_ok(),
            "{}: fixture collides with its boundary",
            case.name
        );
    }
}
