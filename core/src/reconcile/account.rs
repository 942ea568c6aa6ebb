//! Login and registration: the only writers of the session.

use crate::gateway::Gateway;
use crate::reconcile::{expect_status, SyncError};
use crate::session::{CurrentUser, Session};
use crate::types::{LoginData, User};

const MISSING_FIELDS: &str = "Please fill in all fields.";
const PASSWORD_MISMATCH: &str = "Passwords do not match.";

/// Raw contents of the registration form.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

pub struct AccountReconciler {
    gateway: Gateway,
    session: Session,
    error: Option<String>,
}

impl AccountReconciler {
    pub fn new(gateway: Gateway, session: Session) -> Self {
        Self {
            gateway,
            session,
            error: None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<CurrentUser, SyncError> {
        let result = self.try_login(email, password).await;
        self.record(&result);
        result
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<CurrentUser, SyncError> {
        if email.is_empty() || password.is_empty() {
            return Err(SyncError::Invalid(MISSING_FIELDS.to_string()));
        }
        let input = LoginData {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.gateway.login(&input).await?;
        if !response.is_status(200) {
            return Err(SyncError::Rejected {
                status: response.status,
                message: format!("Login rejected (status {})", response.status),
            });
        }
        self.session.sign_in(&response.data);
        Ok(self.session.current())
    }

    /// Register a new account. The session is left untouched: the user still
    /// has to log in afterwards.
    pub async fn register(&mut self, form: &Registration) -> Result<(), SyncError> {
        let result = self.try_register(form).await;
        self.record(&result);
        result
    }

    async fn try_register(&self, form: &Registration) -> Result<(), SyncError> {
        let fields = [&form.name, &form.email, &form.password, &form.confirm_password];
        if fields.iter().any(|f| f.is_empty()) {
            return Err(SyncError::Invalid(MISSING_FIELDS.to_string()));
        }
        if form.password != form.confirm_password {
            return Err(SyncError::Invalid(PASSWORD_MISMATCH.to_string()));
        }
        let user = User::registration(&form.name, &form.email, &form.password);
        let response = self.gateway.register(&user).await?;
        expect_status(response, 201)?;
        tracing::info!("registered {}", form.email);
        Ok(())
    }

    fn record<T>(&mut self, result: &Result<T, SyncError>) {
        self.error = match result {
            Ok(_) => None,
            Err(err) => {
                tracing::error!("account operation failed: {err:?}");
                Some(err.to_string())
            }
        };
    }
}
