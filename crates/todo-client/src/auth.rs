use crate::api::TodoApi;
use crate::loading::LoadingGuard;
use todo_core::User;
use url::Url;

/// Who is signed in, as far as the client knows.
#[derive(Debug)]
pub struct AuthContext {
    api: TodoApi,
    pub user: Option<User>,
    pub loading: bool,
}

impl AuthContext {
    pub fn new(api: TodoApi) -> Self {
        Self {
            api,
            user: None,
            loading: false,
        }
    }

    /// The API client, carrying the session token once logged in.
    pub fn api(&self) -> &TodoApi {
        &self.api
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Pull the session token out of the URL the server redirected to after
    /// login, e.g. `http://localhost:3000/?token=...`.
    pub fn token_from_redirect(redirect: &str) -> Option<String> {
        let url = Url::parse(redirect).ok()?;
        url.query_pairs()
            .find(|(k, _)| k == "token")
            .map(|(_, v)| v.into_owned())
            .filter(|t| !t.is_empty())
    }

    /// Adopt `token` and load the user it belongs to.
    ///
    /// The token is only kept once the server accepts it; a rejected or
    /// cancelled login leaves the context signed out.
    pub async fn login(&mut self, token: String) {
        let mut api = self.api.clone();
        api.set_token(Some(token));

        let _loading = LoadingGuard::set(&mut self.loading);
        match api.me().await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "signed in");
                self.api = api;
                self.user = Some(user);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load current user");
                self.api.set_token(None);
                self.user = None;
            }
        }
    }

    /// Tell the server, then forget the token regardless of its answer.
    pub async fn logout(&mut self) {
        if self.api.token().is_some() {
            if let Err(e) = self.api.logout().await {
                tracing::warn!(error = %e, "logout request failed; discarding token anyway");
            }
        }
        self.api.set_token(None);
        self.user = None;
    }
}
