use std::fs;
use std::path::PathBuf;

use maria_arrow::config::{self, ConnectionConfig, SslMode};
use maria_arrow::{ConnectorError, CredentialResolver, Session};

use crate::fake::{self, FakeConnector};

fn full_config() -> ConnectionConfig {
    ConnectionConfig {
        username: "analyst".to_string(),
        host: "db.internal".to_string(),
        port: Some(3307),
        dbname: "warehouse".to_string(),
        sslmode: SslMode::VerifyIdentity,
        sslca: Some(PathBuf::from("/etc/ssl/ca.pem")),
        sslkey: Some(PathBuf::from("/etc/ssl/client.key")),
        sslcert: Some(PathBuf::from("/etc/ssl/client.pem")),
        password: Some("hunter2".to_string()),
    }
}

#[test]
fn round_trip_drops_password() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conn.yml");

    config::write_config(&path, &full_config()).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(!written.contains("password"), "{written}");
    assert!(!written.contains("hunter2"), "{written}");

    let read = config::read_config(&path, ConnectionConfig::placeholder()).unwrap();
    similar_asserts::assert_eq!(
        read,
        ConnectionConfig {
            password: None,
            ..full_config()
        }
    );
}

#[test]
fn missing_file_gets_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("conn.yml");

    let res = config::read_config(&path, ConnectionConfig::placeholder());
    match res {
        Err(ConnectorError::MissingConfigFile { path: reported }) => assert_eq!(reported, path),
        res => panic!("expected MissingConfigFile, got {res:?}"),
    }
    let written = fs::read_to_string(&path).unwrap();
    for key in [
        "username:", "host:", "port:", "dbname:", "sslmode:", "sslca:", "sslkey:", "sslcert:",
    ] {
        assert!(written.contains(key), "{key} missing from:\n{written}");
    }
    assert!(!written.contains("password"), "{written}");

    // the file now exists, but its placeholders are not enough to connect
    let mut session = Session::from_config_file(FakeConnector::default(), &path).unwrap();
    assert_eq!(session.config().host, "localhost");
    assert!(matches!(
        session.list_tables(),
        Err(ConnectorError::InvalidConfiguration(_))
    ));
    assert_eq!(session.connector().state().connect_attempts, 0);
}

#[test]
fn missing_file_with_complete_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conn.yml");

    let read = config::read_config(&path, fake::config()).unwrap();
    assert_eq!(read, fake::config());
    assert_eq!(
        config::read_config(&path, ConnectionConfig::placeholder()).unwrap(),
        fake::config()
    );
}

#[test]
fn empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conn.yml");
    fs::write(&path, "").unwrap();

    let res = config::read_config(&path, ConnectionConfig::placeholder());
    assert!(
        matches!(res, Err(ConnectorError::InvalidConfiguration(_))),
        "{res:?}"
    );
}

#[test]
fn malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conn.yml");
    fs::write(&path, "username: [unterminated").unwrap();

    let res = config::read_config(&path, ConnectionConfig::placeholder());
    assert!(matches!(res, Err(ConnectorError::Config(_))), "{res:?}");
}

#[test]
fn password_added_by_hand() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conn.yml");
    fs::write(
        &path,
        "username: analyst\nhost: localhost\ndbname: warehouse\npassword: typed-in\n",
    )
    .unwrap();

    let mut session = Session::from_config_file(FakeConnector::default(), &path)
        .unwrap()
        .with_credentials(CredentialResolver::none());
    assert_eq!(session.config().password.as_deref(), Some("typed-in"));

    session.list_tables().unwrap();
    assert_eq!(session.connector().state().connects, 1);
}
