#![allow(clippy::unwrap_used, clippy::expect_used)]

use nf_dispatch::config::SharedConfig;
use nf_dispatch::error::ConfigError;
use nf_dispatch::ids::NfId;
use std::io::Write;

const CHAIN: &str = r#"
nfs:
  - id: 1
    name: frontend
    n_threads: 2
  - id: 2
    name: currencyservice
    n_threads: 4
  - id: 3
    name: checkoutservice
    n_threads: 1
routes:
  - id: 0
    hops: [1, 2]
  - id: 4
    hops: [1, 3, 2, 3]
"#;

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = write_temp(CHAIN);
    let config = SharedConfig::load(file.path()).unwrap();

    let nf = config.nf(NfId(2)).unwrap();
    assert_eq!(nf.name, "currencyservice");
    assert_eq!(nf.n_threads, 4);
    assert!(config.nf(NfId(9)).is_none());

    let by_name = config.nf_ids_by_name();
    assert_eq!(by_name["checkoutservice"], NfId(3));
    assert_eq!(by_name.len(), 3);

    let routes = config.route_table();
    assert_eq!(routes.route_count(), 2);
    assert_eq!(routes.len(4), Some(4));
    assert_eq!(routes.hop(4, 1), Some(NfId(3)));
    assert_eq!(routes.hop(4, 3), Some(NfId(3)));
    assert_eq!(routes.hop(4, 4), None);
    assert_eq!(routes.hops(0), Some(&[NfId(1), NfId(2)][..]));
}

#[test]
fn test_routes_are_optional() {
    let config = SharedConfig::from_yaml("nfs:\n  - {id: 1, name: solo, n_threads: 1}\n").unwrap();
    assert!(config.route_table().is_empty());
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = SharedConfig::load(dir.path().join("nf.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_malformed_yaml() {
    let file = write_temp("nfs: [this is: not valid");
    assert!(matches!(
        SharedConfig::load(file.path()),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_validation_errors() {
    let cases: [(&str, fn(&ConfigError) -> bool); 4] = [
        ("nfs: []\n", |e| matches!(e, ConfigError::NoNetworkFunctions)),
        (
            "nfs:\n  - {id: 1, name: a, n_threads: 1}\n  - {id: 1, name: b, n_threads: 1}\n",
            |e| matches!(e, ConfigError::DuplicateNf { id: NfId(1) }),
        ),
        (
            "nfs:\n  - {id: 1, name: a, n_threads: 1}\nroutes:\n  - {id: 0, hops: [1, 7]}\n",
            |e| matches!(e, ConfigError::UnknownHop { route_id: 0, hop: NfId(7) }),
        ),
        (
            "nfs:\n  - {id: 1, name: a, n_threads: 1}\nroutes:\n  - {id: 2, hops: [1]}\n  - {id: 2, hops: [1]}\n",
            |e| matches!(e, ConfigError::DuplicateRoute { route_id: 2 }),
        ),
    ];

    for (yaml, check) in cases {
        let err = SharedConfig::from_yaml(yaml).unwrap_err();
        assert!(check(&err), "unexpected error {err:?} for {yaml:?}");
    }
}

#[test]
fn test_bundled_sample_config_is_valid() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/nf.yaml");
    let config = SharedConfig::load(path).unwrap();
    assert!(config.nf_ids_by_name().contains_key("currencyservice"));
}
