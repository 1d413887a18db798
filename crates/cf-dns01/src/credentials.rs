//! Cloudflare authentication material

use std::fmt;

use reqwest::RequestBuilder;

use crate::types::Dns01Error;

const BOTH_PRESENT: &str =
    "the Cloudflare API key and API token cannot be both present simultaneously";
const NONE_GIVEN: &str =
    "no Cloudflare credential has been given (can be either an API key or an API token)";

/// Either a global API key with its account email, or a scoped API token
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    ApiKey { email: String, key: String },
    ApiToken { token: String },
}

impl Credentials {
    /// Picks the credential variant from raw configuration values.
    ///
    /// Empty strings count as absent. The email is only required with an API key.
    pub fn validate(email: &str, api_key: &str, api_token: &str) -> Result<Self, Dns01Error> {
        if !api_key.is_empty() && !api_token.is_empty() {
            return Err(Dns01Error::Config(BOTH_PRESENT.to_string()));
        }
        if (api_key.is_empty() && api_token.is_empty()) || (!api_key.is_empty() && email.is_empty())
        {
            return Err(Dns01Error::Config(NONE_GIVEN.to_string()));
        }

        if api_key.is_empty() {
            Ok(Self::ApiToken {
                token: api_token.to_string(),
            })
        } else {
            Ok(Self::ApiKey {
                email: email.to_string(),
                key: api_key.to_string(),
            })
        }
    }

    /// Adds the authentication headers for this credential to a request
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::ApiKey { email, key } => request
                .header("X-Auth-Email", email)
                .header("X-Auth-Key", key),
            Self::ApiToken { token } => request.bearer_auth(token),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::ApiKey { .. } => "api-key",
            Self::ApiToken { .. } => "api-token",
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey { email, .. } => f
                .debug_struct("ApiKey")
                .field("email", email)
                .field("key", &"****")
                .finish(),
            Self::ApiToken { .. } => f.debug_struct("ApiToken").field("token", &"****").finish(),
        }
    }
}
