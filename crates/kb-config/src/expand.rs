//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// Strings without `${` are returned as-is. An unset variable without a
/// default is an error naming `field`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_literal_unchanged() {
        assert_eq!(
            expand_env("/api/v1/raw/", "render.raw_prefix").unwrap(),
            "/api/v1/raw/"
        );
    }

    #[test]
    fn test_expand_var() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("KB_TEST_EXPAND_PREFIX", "/raw");
        }
        let result = expand_env("${KB_TEST_EXPAND_PREFIX}/files/", "render.raw_prefix").unwrap();
        assert_eq!(result, "/raw/files/");
        unsafe {
            std::env::remove_var("KB_TEST_EXPAND_PREFIX");
        }
    }

    #[test]
    fn test_default_used_when_unset() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("KB_TEST_EXPAND_UNSET");
        }
        let result = expand_env("${KB_TEST_EXPAND_UNSET:-/docs/}", "render.docs_route").unwrap();
        assert_eq!(result, "/docs/");
    }

    #[test]
    fn test_missing_var_is_error() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("KB_TEST_EXPAND_MISSING");
        }
        let err = expand_env("${KB_TEST_EXPAND_MISSING}", "history.store_path").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert_eq!(
            err.to_string(),
            "Environment variable error in history.store_path: ${KB_TEST_EXPAND_MISSING} not set"
        );
    }
}
