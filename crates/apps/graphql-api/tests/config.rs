use std::collections::HashMap;
use std::time::Duration;

use graphql_api::{AppConfig, ConfigError};

fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_lookup(|name| vars.get(name).cloned())
}

#[test]
fn defaults_apply_when_nothing_is_set() {
    let config = config_from(&[]).unwrap();

    assert_eq!(config.listen_addr, "0.0.0.0:3000");
    assert_eq!(config.max_connections, 20);
    assert_eq!(config.hash_cost, 12);
    assert_eq!(config.repository_timeout, Some(Duration::from_secs(5)));
    assert!(config.database_url.starts_with("postgres://"));
}

#[test]
fn values_are_read_from_the_environment() {
    let config = config_from(&[
        ("DATABASE_URL", "postgres://db/todos"),
        ("LISTEN_ADDR", "127.0.0.1:8080"),
        ("DATABASE_MAX_CONNECTIONS", "5"),
        ("PASSWORD_HASH_COST", "10"),
        ("REPOSITORY_TIMEOUT_MS", "250"),
    ])
    .unwrap();

    assert_eq!(config.database_url, "postgres://db/todos");
    assert_eq!(config.listen_addr, "127.0.0.1:8080");
    assert_eq!(config.max_connections, 5);
    assert_eq!(config.user_service_config().hash_cost, 10);
    assert_eq!(
        config.todo_service_config().call_timeout,
        Some(Duration::from_millis(250))
    );
}

#[test]
fn zero_timeout_disables_the_deadline() {
    let config = config_from(&[("REPOSITORY_TIMEOUT_MS", "0")]).unwrap();

    assert_eq!(config.repository_timeout, None);
    assert_eq!(config.user_service_config().call_timeout, None);
}

#[test]
fn malformed_values_are_rejected() {
    for (name, value) in [
        ("DATABASE_MAX_CONNECTIONS", "many"),
        ("DATABASE_MAX_CONNECTIONS", "0"),
        ("PASSWORD_HASH_COST", "3"),
        ("PASSWORD_HASH_COST", "32"),
        ("REPOSITORY_TIMEOUT_MS", "-1"),
    ] {
        let result = config_from(&[(name, value)]);
        assert!(
            matches!(&result, Err(ConfigError::Invalid { name: n, .. }) if *n == name),
            "{name}={value} should be rejected, got {result:?}"
        );
    }
}
