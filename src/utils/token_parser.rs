use crate::session::BearerToken;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum TokenParseError {
    #[error("No token found in the pasted text")]
    Empty,

    #[error("The pasted curl command has no authorization header")]
    NoAuthorizationHeader,
}

/// Extracts a bearer token from whatever the operator pasted: the bare
/// token, an `Authorization` value, or a full curl command copied from the
/// browser's network tab.
#[derive(Clone, Default)]
pub struct TokenParser;

impl TokenParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, text: &str) -> Result<BearerToken, TokenParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TokenParseError::Empty);
        }

        if text.starts_with("curl ") {
            return Self::from_curl(text);
        }

        let value = Self::strip_bearer(text);
        if value.is_empty() {
            return Err(TokenParseError::Empty);
        }
        Ok(BearerToken::new(value))
    }

    fn from_curl(curl_text: &str) -> Result<BearerToken, TokenParseError> {
        // Chrome breaks the command over continuation lines, Firefox keeps it
        // on one line. Flatten both and split on the header flag.
        let flat = curl_text
            .replace("\\\r\n", " ")
            .replace("\\\n", " ")
            .replace(['\r', '\n'], " ")
            .replace(" --header ", " -H ");

        for segment in flat.split(" -H ").skip(1) {
            let segment = segment.trim_start();
            let Some(quote) = segment.chars().next().filter(|c| *c == '\'' || *c == '"') else {
                continue;
            };
            let content = segment[1..].split(quote).next().unwrap_or_default();

            let Some((key, value)) = content.split_once(": ") else {
                continue;
            };

            if key.trim().eq_ignore_ascii_case("authorization") {
                let token = Self::strip_bearer(value.trim());
                if !token.is_empty() {
                    return Ok(BearerToken::new(token));
                }
            }
        }

        Err(TokenParseError::NoAuthorizationHeader)
    }

    fn strip_bearer(value: &str) -> &str {
        match value.split_once(' ') {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
            None if value.eq_ignore_ascii_case("bearer") => "",
            _ => value,
        }
    }
}
