//! Session management
//!
//! Owns the signed-in identity, backed by the local session cache so a
//! restarted client comes back signed in.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use cinema_core::{
    AccountGateway, CinemaBackend, Credentials, Database, Error, Identity, Result,
    SessionProvider,
};
use tracing::{info, instrument};

pub struct SessionManager {
    db: Mutex<Database>,
    backend: Arc<dyn CinemaBackend>,
    current: RwLock<Option<Identity>>,
}

impl SessionManager {
    pub fn new(db: Database, backend: Arc<dyn CinemaBackend>) -> Self {
        Self {
            db: Mutex::new(db),
            backend,
            current: RwLock::new(None),
        }
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_current(&self, identity: Option<Identity>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = identity;
    }

    /// Pick up the identity cached by a previous run
    #[instrument(skip(self))]
    pub fn restore(&self) -> Result<Option<Identity>> {
        let cached = self.db().sessions().load()?;
        let identity = cached.map(|c| c.identity);
        if let Some(identity) = &identity {
            info!(username = %identity.username, "Restored cached session");
        }
        self.set_current(identity.clone());
        Ok(identity)
    }

    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Identity> {
        validate_credentials(credentials)?;

        let identity = self.backend.login(credentials).await?;
        self.db().sessions().save(&identity)?;
        self.set_current(Some(identity.clone()));

        info!("Logged in");
        Ok(identity)
    }

    /// Create an account. Does not sign in.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn register(&self, credentials: &Credentials) -> Result<()> {
        validate_credentials(credentials)?;

        self.backend.register(credentials).await?;
        info!("Registered account");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<()> {
        self.db().sessions().clear()?;
        self.set_current(None);
        info!("Logged out");
        Ok(())
    }
}

impl SessionProvider for SessionManager {
    fn current_identity(&self) -> Option<Identity> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn validate_credentials(credentials: &Credentials) -> Result<()> {
    if credentials.username.trim().is_empty() {
        return Err(Error::InvalidInput("Username is required".into()));
    }
    if credentials.password.is_empty() {
        return Err(Error::InvalidInput("Password is required".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryBackend;
    use tempfile::tempdir;

    fn manager(backend: Arc<InMemoryBackend>) -> SessionManager {
        SessionManager::new(Database::open_in_memory().unwrap(), backend)
    }

    #[tokio::test]
    async fn test_login_sets_identity() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.add_account("anna", "secret");
        let session = manager(backend);

        assert!(!session.is_authenticated());
        session
            .login(&Credentials::new("anna", "secret"))
            .await
            .unwrap();
        assert_eq!(session.current_identity().unwrap().username, "anna");
    }

    #[tokio::test]
    async fn test_failed_login_keeps_anonymous() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.add_account("anna", "secret");
        let session = manager(backend);

        let err = session
            .login(&Credentials::new("anna", "nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
        assert!(session.current_identity().is_none());
    }

    #[tokio::test]
    async fn test_empty_credentials_rejected_locally() {
        let backend = Arc::new(InMemoryBackend::new());
        let session = manager(backend.clone());

        let err = session
            .register(&Credentials::new(" ", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(backend.account_count(), 0);
    }

    #[tokio::test]
    async fn test_register_does_not_sign_in() {
        let backend = Arc::new(InMemoryBackend::new());
        let session = manager(backend.clone());

        session
            .register(&Credentials::new("bob", "pw"))
            .await
            .unwrap();
        assert_eq!(backend.account_count(), 1);
        assert!(session.current_identity().is_none());
    }

    #[tokio::test]
    async fn test_session_restored_after_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cinema.db");
        let backend = Arc::new(InMemoryBackend::new());
        backend.add_account("anna", "secret");

        {
            let session = SessionManager::new(Database::open(&path).unwrap(), backend.clone());
            session
                .login(&Credentials::new("anna", "secret"))
                .await
                .unwrap();
        }

        let session = SessionManager::new(Database::open(&path).unwrap(), backend);
        let restored = session.restore().unwrap().unwrap();
        assert_eq!(restored.username, "anna");
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_cache() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cinema.db");
        let backend = Arc::new(InMemoryBackend::new());
        backend.add_account("anna", "secret");

        let session = SessionManager::new(Database::open(&path).unwrap(), backend.clone());
        session
            .login(&Credentials::new("anna", "secret"))
            .await
            .unwrap();
        session.logout().unwrap();
        assert!(session.current_identity().is_none());

        let reopened = SessionManager::new(Database::open(&path).unwrap(), backend);
        assert!(reopened.restore().unwrap().is_none());
    }
}
