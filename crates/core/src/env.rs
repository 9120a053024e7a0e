//! Process-environment credential lookup.
//!
//! The single upstream credential comes from the environment, never from
//! argv (argv leaks through process listings). A missing or empty value is
//! a fatal startup condition: the process must exit non-zero before the
//! protocol engine reads any input.

/// Read a required environment variable, trimmed.
///
/// # Errors
///
/// Returns an error naming the variable when it is unset or blank.
pub fn required(name: &str) -> anyhow::Result<String> {
    let value = std::env::var(name).unwrap_or_default();
    let value = value.trim();
    anyhow::ensure!(!value.is_empty(), "{name} environment variable is not set");
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_is_an_error_naming_it() {
        let err = required("INTELGATE_TEST_UNSET_VARIABLE").expect_err("unset");
        assert!(err.to_string().contains("INTELGATE_TEST_UNSET_VARIABLE"));
    }
}
