#![forbid(unsafe_code)]

use netmon::prelude::*;

#[test]
fn feed_json_routes_packets() {
    let config = WaterfallConfig::default().with_lazy_updates(false);
    let mut list = RequestListController::new(config, 500.0);
    netmon::feed_json(
        &mut list,
        r#"{"type":"created","id":"r1","startedDateTime":"2024-05-01T12:00:00Z","method":"GET","url":"https://example.com/","isXHR":false}"#,
    )
    .unwrap();
    netmon::feed_json(
        &mut list,
        r#"{"type":"updated","id":"r1","data":{"totalTime":120,"contentSize":512}}"#,
    )
    .unwrap();

    assert_eq!(list.len(), 1);
    assert_eq!(list.summary_text(), "One request, 0.50 KB, 0.12 s");
}

#[test]
fn bad_timestamp_is_an_ingest_error() {
    let mut list = RequestListController::new(WaterfallConfig::default(), 500.0);
    let err = netmon::feed_json(
        &mut list,
        r#"{"type":"created","id":"r1","startedDateTime":"yesterday","method":"GET","url":"https://example.com/"}"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Ingest(_)));
    assert!(std::error::Error::source(&err).is_some());
    assert!(list.is_empty());
}

#[test]
fn config_errors_are_listed() {
    let parsed = netmon::core::config::WaterfallConfig::from_env_with(|key| {
        (key == "NETMON_UPDATE_DELAY_MS").then(|| "soon".to_owned())
    });
    let err = Error::Config(parsed.errors);
    assert!(err.to_string().starts_with("invalid configuration: update_delay_ms=soon"));
}
