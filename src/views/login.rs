use tracing::info;

use crate::auth::SessionManager;
use crate::views::auth_error_message;

const SIGN_IN_FALLBACK: &str = "Error al iniciar sesión";

#[derive(Debug, Default)]
pub struct LoginView {
    pub email: String,
    pub password: String,
    error: Option<String>,
    loading: bool,
}

impl LoginView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.loading {
            "Iniciando sesión..."
        } else {
            "Iniciar sesión"
        }
    }

    /// Attempt sign-in with the entered credentials.
    ///
    /// Returns true once a session exists. On failure the view keeps its
    /// fields and shows the cause-specific message.
    pub async fn submit(&mut self, sessions: &SessionManager) -> bool {
        self.error = None;
        self.loading = true;
        let result = sessions.sign_in(&self.email, &self.password).await;
        self.loading = false;

        match result {
            Ok(_) => {
                info!("Sign-in completed");
                self.password.clear();
                true
            }
            Err(e) => {
                self.error = Some(auth_error_message(&e, SIGN_IN_FALLBACK));
                false
            }
        }
    }
}
