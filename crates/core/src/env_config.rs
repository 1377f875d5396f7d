//! Environment variable parsing with warn-level logging for invalid values.

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    match std::env::var(var) {
        Ok(v) => match v.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        Err(_) => default,
    }
}

/// Read a non-empty, trimmed environment variable.
pub fn env_non_empty(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Read a comma-separated list; empty entries are dropped.
pub fn env_list(var: &str) -> Vec<String> {
    env_non_empty(var)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    // SAFETY (all tests): each test uses a unique variable name, so no other
    // thread reads or writes the same key concurrently.

    #[test]
    fn test_env_parse_valid_value() {
        let var_name = "TEST_CRM_ENV_PARSE_VALID_4411";
        unsafe { std::env::set_var(var_name, " 42 ") };
        let result: u32 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 42);
        unsafe { std::env::remove_var(var_name) };
    }

    #[test]
    fn test_env_parse_invalid_value() {
        let var_name = "TEST_CRM_ENV_PARSE_INVALID_4412";
        unsafe { std::env::set_var(var_name, "banana") };
        let result: u32 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 10);
        unsafe { std::env::remove_var(var_name) };
    }

    #[test]
    fn test_env_parse_missing_var() {
        let var_name = "TEST_CRM_ENV_PARSE_MISSING_4413";
        unsafe { std::env::remove_var(var_name) };
        let result: u32 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn test_env_list_splits_and_trims() {
        let var_name = "TEST_CRM_ENV_LIST_4414";
        unsafe { std::env::set_var(var_name, "http://a.test, ,http://b.test ") };
        assert_eq!(env_list(var_name), vec!["http://a.test", "http://b.test"]);
        unsafe { std::env::remove_var(var_name) };
    }

    #[test]
    fn test_env_non_empty_blank_is_none() {
        let var_name = "TEST_CRM_ENV_BLANK_4415";
        unsafe { std::env::set_var(var_name, "   ") };
        assert_eq!(env_non_empty(var_name), None);
        unsafe { std::env::remove_var(var_name) };
    }
}
