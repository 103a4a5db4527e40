//! Authentication service: OAuth login, user resolution, session checks.

use crate::error::AuthError;
use crate::provider::IdentityProvider;
use crate::session::{SessionClaims, SessionGrant, SessionManager};
use std::sync::Arc;
use todo_core::{User, UserRepository};
use url::Url;

pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepository>,
    sessions: SessionManager,
    frontend_url: Url,
}

impl AuthService {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserRepository>,
        sessions: SessionManager,
        frontend_url: &str,
    ) -> Result<Self, AuthError> {
        let frontend_url = Url::parse(frontend_url)
            .map_err(|e| AuthError::Config(format!("auth.frontend_url '{frontend_url}': {e}")))?;
        Ok(Self {
            provider,
            users,
            sessions,
            frontend_url,
        })
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Provider consent URL. Only builds a URL; nothing is stored.
    pub fn begin_login(&self) -> Result<Url, AuthError> {
        let state = self.sessions.issue_state()?;
        Ok(self.provider.authorize_url(&state))
    }

    /// Complete the authorization-code flow and mint a session.
    pub async fn handle_callback(
        &self,
        code: &str,
        state: Option<&str>,
    ) -> Result<SessionGrant, AuthError> {
        let state = state.ok_or_else(|| AuthError::InvalidGrant("missing oauth state".to_string()))?;
        self.sessions.verify_state(state)?;
        if code.trim().is_empty() {
            return Err(AuthError::InvalidGrant("missing authorization code".to_string()));
        }

        let access_token = self.provider.exchange_code(code).await?;
        let profile = self.provider.fetch_profile(&access_token).await?;
        let user = self.resolve_user(profile.into_new_user()).await?;

        let (token, claims) = self.sessions.issue(&user.id)?;
        tracing::info!(user_id = %user.id, expires_at = %claims.expires_at(), "session issued");

        Ok(SessionGrant {
            token,
            expires_at: claims.expires_at(),
            user,
        })
    }

    /// Validate a bearer token; returns the embedded claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.sessions.verify(token)
    }

    pub async fn current_user(&self, user_id: &str) -> Result<User, AuthError> {
        self.users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AuthError::TokenInvalid(format!("unknown user '{user_id}'")))
    }

    /// Sessions aren't tracked server-side; the client discards its token.
    pub fn logout(&self, user_id: &str, session_id: &str) {
        tracing::info!(user_id = %user_id, session_id = %session_id, "logout acknowledged");
    }

    /// Where the browser goes after login, carrying the session token.
    pub fn frontend_redirect(&self, token: &str) -> Url {
        let mut url = self.frontend_url.clone();
        url.query_pairs_mut().append_pair("token", token);
        url
    }

    async fn resolve_user(&self, profile: todo_core::NewUser) -> Result<User, AuthError> {
        match self.users.find_user(&profile.id).await? {
            Some(existing) if existing.profile_differs(&profile) => {
                tracing::info!(user_id = %profile.id, "refreshing user profile");
                Ok(self.users.refresh_profile(&profile).await?)
            }
            Some(existing) => Ok(existing),
            None => {
                let user = self.users.upsert_user(&profile).await?;
                tracing::info!(user_id = %user.id, "user created on first login");
                Ok(user)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderProfile;
    use async_trait::async_trait;
    use chrono::Duration;
    use todo_core::MemoryStore;

    struct FakeProvider {
        profile: ProviderProfile,
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        fn authorize_url(&self, state: &str) -> Url {
            let mut url = Url::parse("https://idp.test/authorize").unwrap();
            url.query_pairs_mut().append_pair("state", state);
            url
        }

        async fn exchange_code(&self, code: &str) -> Result<String, AuthError> {
            match code {
                "good-code" => Ok("access-token".to_string()),
                "down" => Err(AuthError::ProviderUnavailable("boom".to_string())),
                _ => Err(AuthError::InvalidGrant("bad code".to_string())),
            }
        }

        async fn fetch_profile(&self, _access_token: &str) -> Result<ProviderProfile, AuthError> {
            Ok(self.profile.clone())
        }
    }

    fn service_with(store: MemoryStore, name: &str) -> AuthService {
        let provider = FakeProvider {
            profile: ProviderProfile {
                sub: "google-42".to_string(),
                email: "alice@example.com".to_string(),
                name: name.to_string(),
            },
        };
        AuthService::new(
            Arc::new(provider),
            Arc::new(store),
            SessionManager::new(b"secret", Duration::hours(1)),
            "http://localhost:3000",
        )
        .unwrap()
    }

    fn state_of(url: &Url) -> String {
        url.query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_creates_user_and_issues_session() {
        let store = MemoryStore::new();
        let auth = service_with(store.clone(), "Alice");

        let url = auth.begin_login().unwrap();
        let grant = auth.handle_callback("good-code", Some(&state_of(&url))).await.unwrap();

        assert_eq!(grant.user.id, "google-42");
        let claims = auth.verify(&grant.token).unwrap();
        assert_eq!(claims.sub, "google-42");
        assert!(store.find_user("google-42").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_second_login_refreshes_profile() {
        let store = MemoryStore::new();
        let first = service_with(store.clone(), "Alice");
        let state = state_of(&first.begin_login().unwrap());
        first.handle_callback("good-code", Some(&state)).await.unwrap();

        let second = service_with(store.clone(), "Alice Cooper");
        let state = state_of(&second.begin_login().unwrap());
        let grant = second.handle_callback("good-code", Some(&state)).await.unwrap();

        assert_eq!(grant.user.name, "Alice Cooper");
        let stored = store.find_user("google-42").await.unwrap().unwrap();
        assert_eq!(stored.name, "Alice Cooper");
    }

    #[tokio::test]
    async fn test_simultaneous_first_logins_both_succeed() {
        let store = MemoryStore::new();
        let auth = service_with(store.clone(), "Alice");
        let (s1, s2) = (
            state_of(&auth.begin_login().unwrap()),
            state_of(&auth.begin_login().unwrap()),
        );

        let (a, b) = tokio::join!(
            auth.handle_callback("good-code", Some(&s1)),
            auth.handle_callback("good-code", Some(&s2)),
        );

        assert_eq!(a.unwrap().user.id, "google-42");
        assert_eq!(b.unwrap().user.id, "google-42");
        assert!(store.find_user("google-42").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_callback_errors() {
        let auth = service_with(MemoryStore::new(), "Alice");
        let state = state_of(&auth.begin_login().unwrap());

        assert!(matches!(
            auth.handle_callback("good-code", None).await,
            Err(AuthError::InvalidGrant(_))
        ));
        assert!(matches!(
            auth.handle_callback("good-code", Some("forged")).await,
            Err(AuthError::InvalidGrant(_))
        ));
        assert!(matches!(
            auth.handle_callback("bad-code", Some(&state)).await,
            Err(AuthError::InvalidGrant(_))
        ));
        assert!(matches!(
            auth.handle_callback("down", Some(&state)).await,
            Err(AuthError::ProviderUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_current_user_unknown_subject() {
        let auth = service_with(MemoryStore::new(), "Alice");
        assert!(matches!(auth.current_user("nobody").await, Err(AuthError::TokenInvalid(_))));
    }

    #[test]
    fn test_frontend_redirect_carries_token() {
        let auth = service_with(MemoryStore::new(), "Alice");
        let url = auth.frontend_redirect("abc.def.ghi");
        assert_eq!(url.as_str(), "http://localhost:3000/?token=abc.def.ghi");
    }
}
