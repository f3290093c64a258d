use std::time::Duration;

use leafscan::config::*;

#[test]
fn default_points_at_local_upload_api() {
    let config = UploadConfig::default();
    assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
    assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    assert_eq!(IMAGE_FIELD, "image");
}

#[test]
fn accepts_http_and_https_endpoints() {
    let config = UploadConfig::new("https://farm.example.com/predict", 15).unwrap();
    assert_eq!(config.endpoint.host_str(), Some("farm.example.com"));
    assert_eq!(config.timeout, Duration::from_secs(15));
    assert!(UploadConfig::new("http://10.0.0.2:9000/api/upload", 1).is_ok());
}

#[test]
fn rejects_bad_endpoints_and_zero_timeout() {
    assert!(UploadConfig::new("not a url", 10).is_err());
    assert!(UploadConfig::new("/api/upload", 10).is_err());

    let err = UploadConfig::new("ftp://example.com/upload", 10).unwrap_err();
    assert!(err.to_string().contains("http or https"));

    assert!(UploadConfig::new(DEFAULT_ENDPOINT, 0).is_err());
}
