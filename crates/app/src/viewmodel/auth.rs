//! Login and registration view model

use std::sync::Arc;

use cinema_core::{Credentials, Result};
use tracing::info;

use super::Route;
use crate::flow::FlowScope;
use crate::session::SessionManager;

pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const REGISTER_SUCCESS: &str = "Registration successful!";

pub struct AuthView {
    session: Arc<SessionManager>,
    scope: FlowScope,
}

impl AuthView {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            session,
            scope: FlowScope::new(),
        }
    }

    pub fn scope(&self) -> &FlowScope {
        &self.scope
    }

    /// Sign in; on success the user lands on the home page
    pub async fn login(&self, credentials: &Credentials) -> Result<Route> {
        let identity = self.scope.guard(self.session.login(credentials)).await?;
        info!(username = %identity.username, "{}", LOGIN_SUCCESS);
        Ok(Route::Home)
    }

    /// Create an account; the user is sent on to log in with it
    pub async fn register(&self, credentials: &Credentials) -> Result<Route> {
        self.scope.guard(self.session.register(credentials)).await?;
        Ok(Route::Login)
    }

    pub fn logout(&self) -> Result<Route> {
        self.session.logout()?;
        Ok(Route::Home)
    }
}

impl Drop for AuthView {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryBackend;
    use cinema_core::{Database, Error, SessionProvider};

    fn view(backend: Arc<InMemoryBackend>) -> (AuthView, Arc<SessionManager>) {
        let session = Arc::new(SessionManager::new(
            Database::open_in_memory().unwrap(),
            backend,
        ));
        (AuthView::new(session.clone()), session)
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let backend = InMemoryBackend::new().shared();
        let (view, session) = view(backend);
        let credentials = Credentials::new("anna", "secret");

        assert_eq!(view.register(&credentials).await.unwrap(), Route::Login);
        assert!(!session.is_authenticated());

        assert_eq!(view.login(&credentials).await.unwrap(), Route::Home);
        assert!(session.is_authenticated());

        assert_eq!(view.logout().unwrap(), Route::Home);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let backend = InMemoryBackend::new().shared();
        backend.add_account("anna", "secret");
        let (view, _) = view(backend);

        let err = view
            .register(&Credentials::new("anna", "other"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Authentication(m) if m.contains("already exist")));
    }

    #[tokio::test]
    async fn test_cancelled_login_is_discarded() {
        let backend = InMemoryBackend::new().shared();
        backend.add_account("anna", "secret");
        let (view, session) = view(backend);

        view.scope().cancel();
        let err = view
            .login(&Credentials::new("anna", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert!(!session.is_authenticated());
    }
}
