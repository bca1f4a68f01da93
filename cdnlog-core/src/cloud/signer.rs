//! `SDK-HMAC-SHA256` request signing.
//!
//! ```text
//! canonical_request = METHOD \n PATH \n QUERY \n "host:<host>\nx-sdk-date:<long>\n" \n "host;x-sdk-date" \n hex(sha256(payload))
//! string_to_sign    = "SDK-HMAC-SHA256" \n <long> \n hex(sha256(canonical_request))
//! signing_key       = hmac_sha256("SDK" + secret_key, <short>)
//! signature         = hex(hmac_sha256(signing_key, string_to_sign))
//! ```
//!
//! `<long>` is `YYYYMMDDTHHMMSSZ` and `<short>` is `YYYYMMDD`, both UTC.
//!
//! The query string is part of the signed bytes, so the URL sent on the wire
//! must carry exactly the string returned by [`canonical_query`].

use crate::cloud::error::CloudError;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "SDK-HMAC-SHA256";
pub const SIGNED_HEADERS: &str = "host;x-sdk-date";
pub const DATE_HEADER: &str = "X-Sdk-Date";

const LONG_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const SHORT_DATE_FORMAT: &str = "%Y%m%d";

/// Unreserved characters plus `:` stay literal; everything else is percent-encoded.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b':');

/// The parts of an HTTP request covered by the signature.
#[derive(Debug, Clone)]
pub struct SigningInput<'a> {
    pub method: &'a str,
    pub host: &'a str,
    pub path: &'a str,
    /// Already in wire order.
    pub query: &'a [(&'a str, String)],
    pub payload: &'a [u8],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// Value for the `X-Sdk-Date` header.
    pub sdk_date: String,
    /// Value for the `Authorization` header.
    pub authorization: String,
}

pub struct Signer {
    access_key: String,
    secret_key: String,
}

impl Signer {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn sign(
        &self,
        input: &SigningInput<'_>,
        at: DateTime<Utc>,
    ) -> Result<SignedHeaders, CloudError> {
        let long_date = at.format(LONG_DATE_FORMAT).to_string();
        let short_date = at.format(SHORT_DATE_FORMAT).to_string();

        let canonical = canonical_request(input, &long_date);
        let string_to_sign = format!("{ALGORITHM}\n{long_date}\n{}", sha256_hex(canonical.as_bytes()));

        let signing_key = hmac_sha256(
            format!("SDK{}", self.secret_key).as_bytes(),
            short_date.as_bytes(),
        )?;
        let signature = hex(&hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

        Ok(SignedHeaders {
            authorization: format!(
                "{ALGORITHM} Access={}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
                self.access_key
            ),
            sdk_date: long_date,
        })
    }
}

/// `k=v` pairs joined by `&`, both sides percent-encoded, order preserved.
pub fn canonical_query(query: &[(&str, String)]) -> String {
    query
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k, QUERY_ENCODE_SET),
                utf8_percent_encode(v, QUERY_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

pub fn canonical_request(input: &SigningInput<'_>, long_date: &str) -> String {
    format!(
        "{}\n{}\n{}\nhost:{}\nx-sdk-date:{}\n\n{}\n{}",
        input.method,
        input.path,
        canonical_query(input.query),
        input.host,
        long_date,
        SIGNED_HEADERS,
        sha256_hex(input.payload)
    )
}

fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], msg: &[u8]) -> Result<Vec<u8>, CloudError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| CloudError::Signing(e.to_string()))?;
    mac.update(msg);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
