use crate::error::AuthError;
use async_trait::async_trait;
use serde::Deserialize;
use todo_core::NewUser;
use url::Url;

/// The profile fields the service consumes from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderProfile {
    pub sub: String,
    pub email: String,
    pub name: String,
}

impl ProviderProfile {
    pub fn into_new_user(self) -> NewUser {
        NewUser {
            id: self.sub,
            name: self.name,
            email: self.email,
        }
    }
}

/// An OAuth 2.0 authorization-code provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Consent screen URL embedding the client id, callback and `state`.
    fn authorize_url(&self, state: &str) -> Url;

    /// Exchange an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<String, AuthError>;

    /// Fetch the signed-in user's profile with an access token.
    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, AuthError>;
}
