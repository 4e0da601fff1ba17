//! AWS Signature V4 request signing.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use url::Url;

use crate::credentials::AwsCredentials;

const AWS_ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Signs requests for one service in one region.
#[derive(Clone)]
pub struct SigV4Signer {
    credentials: AwsCredentials,
    region: String,
    service: String,
}

impl SigV4Signer {
    pub fn new(credentials: AwsCredentials, region: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            credentials,
            region: region.into(),
            service: service.into(),
        }
    }

    /// Returns the headers that must be added to the request: `x-amz-date`,
    /// `x-amz-content-sha256`, `authorization` and, for temporary
    /// credentials, `x-amz-security-token`.
    pub fn sign(
        &self,
        method: &str,
        url: &Url,
        headers: &[(String, String)],
        body: &[u8],
    ) -> Vec<(String, String)> {
        self.sign_at(method, url, headers, body, &Utc::now())
    }

    fn sign_at(
        &self,
        method: &str,
        url: &Url,
        headers: &[(String, String)],
        body: &[u8],
        timestamp: &DateTime<Utc>,
    ) -> Vec<(String, String)> {
        let payload_hash = sha256_hex(body);
        let amz_date = format_datetime(timestamp);
        let date_stamp = format_date_stamp(timestamp);

        let mut added = vec![
            ("x-amz-date".to_string(), amz_date.clone()),
            ("x-amz-content-sha256".to_string(), payload_hash.clone()),
        ];
        if let Some(token) = self.credentials.session_token() {
            added.push(("x-amz-security-token".to_string(), token.to_string()));
        }

        let mut signing_headers: Vec<(String, String)> = vec![("host".to_string(), host_header(url))];
        signing_headers.extend(
            headers
                .iter()
                .filter(|(name, _)| !name.eq_ignore_ascii_case("host"))
                .cloned(),
        );
        signing_headers.extend(added.iter().cloned());

        let canonical_request = build_canonical_request(method, url, &signing_headers, &payload_hash);
        let credential_scope = format!("{}/{}/{}/aws4_request", date_stamp, self.region, self.service);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            AWS_ALGORITHM,
            amz_date,
            credential_scope,
            sha256_hex(canonical_request.as_bytes())
        );

        let signing_key = derive_signing_key(
            self.credentials.secret_access_key(),
            &date_stamp,
            &self.region,
            &self.service,
        );
        let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes()));

        added.push((
            "authorization".to_string(),
            format!(
                "{} Credential={}/{}, SignedHeaders={}, Signature={}",
                AWS_ALGORITHM,
                self.credentials.access_key_id(),
                credential_scope,
                build_signed_headers(&signing_headers),
                signature
            ),
        ));
        added
    }
}

impl std::fmt::Debug for SigV4Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigV4Signer")
            .field("region", &self.region)
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Signing helpers
// ============================================================================

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

fn format_date_stamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%d").to_string()
}

fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn derive_signing_key(secret_key: &str, date_stamp: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{}", secret_key).as_bytes(), date_stamp.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

fn build_signed_headers(headers: &[(String, String)]) -> String {
    let mut names: Vec<String> = headers.iter().map(|(n, _)| n.to_lowercase()).collect();
    names.sort();
    names.join(";")
}

fn build_canonical_headers(headers: &[(String, String)]) -> String {
    let mut sorted: Vec<(String, String)> = headers
        .iter()
        .map(|(n, v)| (n.to_lowercase(), v.trim().to_string()))
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    sorted.iter().map(|(n, v)| format!("{}:{}\n", n, v)).collect()
}

/// RFC 3986 unreserved characters pass through, everything else is `%XX`.
fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut result = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char);
            }
            b'/' if !encode_slash => result.push('/'),
            _ => result.push_str(&format!("%{:02X}", byte)),
        }
    }
    result
}

fn build_canonical_query_string(url: &Url) -> String {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (uri_encode(&k, true), uri_encode(&v, true)))
        .collect();
    params.sort();

    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Non-S3 services expect the already-escaped path to be escaped a second
/// time, which is what encoding `Url::path()` gives us.
fn build_canonical_request(
    method: &str,
    url: &Url,
    headers: &[(String, String)],
    payload_hash: &str,
) -> String {
    let path = match url.path() {
        "" => "/",
        p => p,
    };

    format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method,
        uri_encode(path, false),
        build_canonical_query_string(url),
        build_canonical_headers(headers),
        build_signed_headers(headers),
        payload_hash
    )
}
