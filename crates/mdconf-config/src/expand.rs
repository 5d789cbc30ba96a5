//! `${VAR}` expansion for string values read from `mdconf.toml`.
//!
//! - `${VAR}` expands to the value of VAR and fails if it is unset
//! - `${VAR:-default}` falls back to `default`
//!
//! Bare `$VAR` is left untouched so tokens containing `$` survive.

use crate::ConfigError;

/// Variable lookup failure carried through `shellexpand`.
struct UnsetVar {
    name: String,
}

/// Expand variable references in `value`, attributing failures to `field`.
///
/// Only `${...}` references go through `shellexpand`; text between them is
/// copied as is.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        let Some(len) = reference_len(&rest[start..]) else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(&expand_reference(&rest[start..start + len], field)?);
        rest = &rest[start + len..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Byte length of the `${...}` reference at the start of `s`, braces balanced.
fn reference_len(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn expand_reference(reference: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env_with_context(reference, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar {
            name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.name),
    })
}

/// Expand an optional value in place.
pub(crate) fn expand_opt(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(raw) = value.as_deref() {
        *value = Some(expand_env(raw, field)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_passes_through() {
        assert_eq!(
            expand_env("DOCS", "confluence.space").unwrap(),
            "DOCS".to_owned()
        );
    }

    #[test]
    fn test_expands_set_variable() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("MDCONF_TEST_EXPAND_TOKEN", "abc123");
        }
        let result = expand_env("${MDCONF_TEST_EXPAND_TOKEN}", "confluence.api_token").unwrap();
        assert_eq!(result, "abc123");
        unsafe {
            std::env::remove_var("MDCONF_TEST_EXPAND_TOKEN");
        }
    }

    #[test]
    fn test_default_used_when_unset() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("MDCONF_TEST_EXPAND_UNSET");
        }
        let result = expand_env("${MDCONF_TEST_EXPAND_UNSET:-kroki.local}", "diagrams.kroki_url")
            .unwrap();
        assert_eq!(result, "kroki.local");
    }

    #[test]
    fn test_unset_without_default_names_field() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("MDCONF_TEST_EXPAND_MISSING");
        }
        let err = expand_env("${MDCONF_TEST_EXPAND_MISSING}", "confluence.email").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let message = err.to_string();
        assert!(message.contains("MDCONF_TEST_EXPAND_MISSING"));
        assert!(message.contains("confluence.email"));
    }

    #[test]
    fn test_bare_dollar_untouched() {
        assert_eq!(
            expand_env("pa$$word", "confluence.api_token").unwrap(),
            "pa$$word"
        );
    }

    #[test]
    fn test_bare_dollar_untouched_next_to_reference() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("MDCONF_TEST_EXPAND_MIXED", "abc");
        }
        let result = expand_env("${MDCONF_TEST_EXPAND_MIXED}$b-$$", "confluence.api_token");
        unsafe {
            std::env::remove_var("MDCONF_TEST_EXPAND_MIXED");
        }
        assert_eq!(result.unwrap(), "abc$b-$$");
    }

    #[test]
    fn test_unclosed_reference_kept_literally() {
        assert_eq!(
            expand_env("x${open", "confluence.space").unwrap(),
            "x${open"
        );
    }

    #[test]
    fn test_expand_opt_none_stays_none() {
        let mut value = None;
        expand_opt(&mut value, "confluence.parent_page_id").unwrap();
        assert!(value.is_none());
    }
}
