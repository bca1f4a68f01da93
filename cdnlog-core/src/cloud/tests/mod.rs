use crate::cloud::RemoteLogArtifact;
use crate::cloud::client::to_epoch_millis;
use crate::cloud::signer::{Signer, SigningInput, canonical_query, canonical_request};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

fn listing_query() -> Vec<(&'static str, String)> {
    vec![
        ("domain_name", "example.com".to_string()),
        ("end_time", "1696982400000".to_string()),
        ("page_size", "1000".to_string()),
        ("start_time", "1696896000000".to_string()),
    ]
}

fn input<'a>(query: &'a [(&'static str, String)]) -> SigningInput<'a> {
    SigningInput {
        method: "GET",
        host: "cdn.myhuaweicloud.com",
        path: "/v1.0/cdn/logs",
        query,
        payload: b"",
    }
}

//-----------------------------------------------------------------------------
// Signing
//-----------------------------------------------------------------------------

#[test]
fn canonical_request_layout() {
    let query = listing_query();

    let canonical = canonical_request(&input(&query), "20231010T135536Z");

    assert_eq!(
        canonical,
        "GET\n\
         /v1.0/cdn/logs\n\
         domain_name=example.com&end_time=1696982400000&page_size=1000&start_time=1696896000000\n\
         host:cdn.myhuaweicloud.com\n\
         x-sdk-date:20231010T135536Z\n\
         \n\
         host;x-sdk-date\n\
         e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn signature_matches_known_vector() {
    let query = listing_query();
    let signer = Signer::new("AKIDEXAMPLE", "SECRETEXAMPLE");
    let at = Utc.with_ymd_and_hms(2023, 10, 10, 13, 55, 36).unwrap();

    let signed = signer.sign(&input(&query), at).unwrap();

    assert_eq!(signed.sdk_date, "20231010T135536Z");
    assert_eq!(
        signed.authorization,
        "SDK-HMAC-SHA256 Access=AKIDEXAMPLE, SignedHeaders=host;x-sdk-date, \
         Signature=469374d099297e02adf4fde31f8098a35d90bb9545496764d13be236d224b95c"
    );
}

#[test]
fn signature_is_deterministic() {
    let query = listing_query();
    let signer = Signer::new("ak", "sk");
    let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

    let first = signer.sign(&input(&query), at).unwrap();
    let second = signer.sign(&input(&query), at).unwrap();

    assert_eq!(first, second);
}

#[test]
fn reordering_query_changes_signature() {
    let query = listing_query();
    let mut reordered = listing_query();
    reordered.reverse();
    let signer = Signer::new("ak", "sk");
    let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

    let a = signer.sign(&input(&query), at).unwrap();
    let b = signer.sign(&input(&reordered), at).unwrap();

    assert_ne!(a.authorization, b.authorization);
}

#[test]
fn empty_secret_still_signs() {
    let query = listing_query();
    let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

    let signed = Signer::new("ak", "").sign(&input(&query), at).unwrap();

    assert!(signed.authorization.starts_with("SDK-HMAC-SHA256 Access=ak, "));
}

#[test]
fn query_encoding_keeps_colons() {
    let query = vec![
        ("q", "a b/c:d".to_string()),
        ("u", "ü".to_string()),
        ("t", "2023-10-10T00:00:00Z".to_string()),
    ];

    assert_eq!(
        canonical_query(&query),
        "q=a%20b%2Fc:d&u=%C3%BC&t=2023-10-10T00:00:00Z"
    );
}

//-----------------------------------------------------------------------------
// Artifacts and time window
//-----------------------------------------------------------------------------

#[test]
fn artifact_name_strips_query_string() {
    let artifact = RemoteLogArtifact::from_link(
        "https://obs.example.com/cdn/2023/10/10/example.com_2023101013.gz?AccessKeyId=x&Expires=1",
    )
    .unwrap();

    assert_eq!(artifact.file_name, "example.com_2023101013.gz");
    assert!(artifact.download_url.ends_with("Expires=1"));
}

#[test]
fn artifact_without_basename_is_rejected() {
    assert_eq!(RemoteLogArtifact::from_link("https://obs.example.com/dir/"), None);
    assert_eq!(RemoteLogArtifact::from_link("https://obs.example.com"), None);
    assert_eq!(RemoteLogArtifact::from_link("not a url"), None);
}

#[test]
fn window_bounds_convert_to_epoch_millis() {
    assert_eq!(to_epoch_millis("2023-10-10T00:00:00Z").unwrap(), 1696896000000);
    assert_eq!(to_epoch_millis("2023-10-10T08:00:00+08:00").unwrap(), 1696896000000);
    assert!(to_epoch_millis("10/10/2023").is_err());
}
