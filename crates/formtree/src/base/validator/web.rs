use super::as_text;
use formtree_core::{schema::Validator, value::Value};
use serde::{Deserialize, Serialize};

///
/// Url
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Url;

impl Validator for Url {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let s = as_text(value)?.trim();

        let Some(rest) = s
            .strip_prefix("https://")
            .or_else(|| s.strip_prefix("http://"))
        else {
            return Err(format!("URL '{s}' must start with 'http://' or 'https://'"));
        };

        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        if host.is_empty() || rest.chars().any(char::is_whitespace) {
            return Err(format!("URL '{s}' is not valid"));
        }

        Ok(())
    }
}

///
/// Email
/// Shape check only: one '@', a local part, and a dotted domain.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Email;

impl Validator for Email {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let s = as_text(value)?.trim();

        let valid = match s.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain
                        .split('.')
                        .filter(|label| !label.is_empty())
                        .count()
                        >= 2
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !s.chars().any(char::is_whitespace)
            }
            None => false,
        };

        if valid {
            Ok(())
        } else {
            Err(format!("'{s}' is not a valid email address"))
        }
    }
}

///
/// TESTS
///
