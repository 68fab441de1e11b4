// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Request and form generators.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Method, Request},
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

const BOUNDARY: &str = "----intake-relay-test-boundary";

/// Generate a pool of client addresses for testing.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

pub fn peer(ip: IpAddr) -> SocketAddr {
    SocketAddr::new(ip, 40000)
}

/// Hand-built multipart/form-data body.
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn fields(self, pairs: &[(&str, &str)]) -> Self {
        pairs
            .iter()
            .fold(self, |body, (name, value)| body.text(name, value))
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

/// Valid job application fields.
pub fn application_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("fullName", "Jane Doe"),
        ("email", "jane@example.com"),
        ("phone", "+256700000000"),
        ("education", "Bachelor of Commerce"),
        ("experience", "3 years in field sales"),
        ("motivation", "I enjoy meeting clients."),
    ]
}

/// Valid insurance inquiry fields.
pub fn inquiry_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("fullName", "John Doe"),
        ("email", "john@example.com"),
        ("phone", "+256711111111"),
        ("insuranceType", "Personal"),
        ("personalPlan", "Gold"),
        ("ageCategory", "26-35"),
        ("numberOfPeople", "4"),
    ]
}

/// A small PDF-looking payload.
pub fn pdf_bytes() -> Vec<u8> {
    b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\n%%EOF\n".to_vec()
}

/// Complete valid application body with a PDF CV.
pub fn valid_application() -> MultipartBody {
    MultipartBody::new()
        .fields(&application_fields())
        .file("cv", "jane-doe-cv.pdf", "application/pdf", &pdf_bytes())
}

pub fn multipart_request(uri: &str, ip: IpAddr, body: MultipartBody) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .extension(ConnectInfo(peer(ip)))
        .body(Body::from(body.finish()))
        .unwrap()
}

pub fn urlencoded_request(uri: &str, ip: IpAddr, pairs: &[(&str, &str)]) -> Request<Body> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter())
        .finish();

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .extension(ConnectInfo(peer(ip)))
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(uri: &str, ip: IpAddr, value: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .extension(ConnectInfo(peer(ip)))
        .body(Body::from(value.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str, ip: IpAddr) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .extension(ConnectInfo(peer(ip)))
        .body(Body::empty())
        .unwrap()
}
