use std::collections::HashMap;

use super::*;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_when_unset() {
    let cfg = ClientConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(cfg, ClientConfig::default());
    assert_eq!(cfg.reconnect.max_attempts, 5);
    assert_eq!(cfg.reconnect.delay, Duration::from_secs(1));
}

#[test]
fn parses_overrides() {
    let cfg = ClientConfig::from_lookup(lookup(&[
        ("DEEPBOARD_URL", "wss://boards.example.test/ws"),
        ("DEEPBOARD_RECONNECT_ATTEMPTS", "2"),
        ("DEEPBOARD_RECONNECT_DELAY_MS", "250"),
    ]))
    .unwrap();
    assert_eq!(cfg.url, "wss://boards.example.test/ws");
    assert_eq!(cfg.reconnect, ReconnectPolicy { max_attempts: 2, delay: Duration::from_millis(250) });
}

#[test]
fn rejects_bad_numbers() {
    let err = ClientConfig::from_lookup(lookup(&[("DEEPBOARD_RECONNECT_ATTEMPTS", "-1")])).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { var: "DEEPBOARD_RECONNECT_ATTEMPTS", value: "-1".into() });
}

#[test]
fn rejects_http_urls() {
    let err = ClientConfig::default().with_url("http://localhost:3000").unwrap_err();
    assert!(matches!(err, ConfigError::BadScheme(_)));
}
