use super::*;
use std::collections::HashMap;

fn base_vars() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("AUTH_REGION", "eu-west-1"),
        ("AUTH_USER_POOL_ID", "eu-west-1_AbCdEf123"),
        ("AUTH_USER_POOL_CLIENT_ID", "client-abc"),
        ("API_URL", "https://api.example.com/prod/"),
    ])
}

fn load(vars: &HashMap<&'static str, &'static str>) -> Result<AuthConfig, ConfigError> {
    AuthConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_owned()))
}

// =============================================================================
// from_lookup: happy path
// =============================================================================

#[test]
fn loads_required_vars_with_defaults() {
    let config = load(&base_vars()).unwrap();
    assert_eq!(config.region, "eu-west-1");
    assert_eq!(config.user_pool_id, "eu-west-1_AbCdEf123");
    assert_eq!(config.client_id, "client-abc");
    assert_eq!(config.api_url, "https://api.example.com/prod");
    assert_eq!(config.idp_endpoint, "https://cognito-idp.eu-west-1.amazonaws.com");
    assert_eq!(config.storage_dir, PathBuf::from(DEFAULT_STORAGE_DIR));
    assert_eq!(config.timeouts, Timeouts::default());
}

#[test]
fn optional_overrides_are_applied() {
    let mut vars = base_vars();
    vars.insert("AUTH_IDP_ENDPOINT", "http://127.0.0.1:9229/");
    vars.insert("AUTH_STORAGE_DIR", "/var/lib/app");
    vars.insert("AUTH_REQUEST_TIMEOUT_SECS", "5");
    vars.insert("AUTH_CONNECT_TIMEOUT_SECS", "2");
    let config = load(&vars).unwrap();
    assert_eq!(config.idp_endpoint, "http://127.0.0.1:9229");
    assert_eq!(config.storage_dir, PathBuf::from("/var/lib/app"));
    assert_eq!(config.timeouts, Timeouts { request_secs: 5, connect_secs: 2 });
    assert_eq!(config.timeouts.request(), Duration::from_secs(5));
}

#[test]
fn values_are_trimmed() {
    let mut vars = base_vars();
    vars.insert("AUTH_USER_POOL_CLIENT_ID", "  client-abc  ");
    assert_eq!(load(&vars).unwrap().client_id, "client-abc");
}

// =============================================================================
// from_lookup: failures
// =============================================================================

#[test]
fn missing_required_var_is_reported() {
    for var in ["AUTH_REGION", "AUTH_USER_POOL_ID", "AUTH_USER_POOL_CLIENT_ID", "API_URL"] {
        let mut vars = base_vars();
        vars.remove(var);
        assert_eq!(load(&vars), Err(ConfigError::Missing { var }), "expected missing {var}");
    }
}

#[test]
fn blank_required_var_counts_as_missing() {
    let mut vars = base_vars();
    vars.insert("AUTH_USER_POOL_CLIENT_ID", "   ");
    assert_eq!(load(&vars), Err(ConfigError::Missing { var: "AUTH_USER_POOL_CLIENT_ID" }));
}

#[test]
fn pool_id_region_mismatch_is_invalid() {
    let mut vars = base_vars();
    vars.insert("AUTH_USER_POOL_ID", "us-east-1_AbCdEf123");
    let err = load(&vars).unwrap_err();
    let ConfigError::Invalid { var, reason } = err else {
        panic!("expected invalid config");
    };
    assert_eq!(var, "AUTH_USER_POOL_ID");
    assert!(reason.contains("us-east-1"));
}

#[test]
fn pool_id_without_separator_is_invalid() {
    let mut vars = base_vars();
    vars.insert("AUTH_USER_POOL_ID", "AbCdEf123");
    assert!(matches!(load(&vars), Err(ConfigError::Invalid { var: "AUTH_USER_POOL_ID", .. })));
}

#[test]
fn pool_id_with_empty_suffix_is_invalid() {
    let mut vars = base_vars();
    vars.insert("AUTH_USER_POOL_ID", "eu-west-1_");
    assert!(matches!(load(&vars), Err(ConfigError::Invalid { var: "AUTH_USER_POOL_ID", .. })));
}

#[test]
fn api_url_must_be_http() {
    let mut vars = base_vars();
    vars.insert("API_URL", "api.example.com");
    assert!(matches!(load(&vars), Err(ConfigError::Invalid { var: "API_URL", .. })));
}

#[test]
fn zero_timeout_is_invalid() {
    let mut vars = base_vars();
    vars.insert("AUTH_REQUEST_TIMEOUT_SECS", "0");
    assert!(matches!(load(&vars), Err(ConfigError::Invalid { var: "AUTH_REQUEST_TIMEOUT_SECS", .. })));
}

#[test]
fn non_numeric_timeout_is_invalid() {
    let mut vars = base_vars();
    vars.insert("AUTH_CONNECT_TIMEOUT_SECS", "soon");
    assert!(matches!(load(&vars), Err(ConfigError::Invalid { var: "AUTH_CONNECT_TIMEOUT_SECS", .. })));
}

#[test]
fn default_idp_endpoint_uses_region() {
    assert_eq!(default_idp_endpoint("ap-south-1"), "https://cognito-idp.ap-south-1.amazonaws.com");
}
