//! Account creation in three steps: the registration form, the emailed
//! confirmation code, and a final notice pointing back to sign-in.

use tracing::info;

use crate::auth::SessionManager;
use crate::views::auth_error_message;

const REGISTER_FALLBACK: &str = "Error al registrarse";
const CONFIRM_FALLBACK: &str = "Error al confirmar";
const CODE_LENGTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterStep {
    #[default]
    Register,
    Confirm,
    Success,
}

#[derive(Debug, Default)]
pub struct RegisterView {
    pub name: String,
    pub email: String,
    pub password: String,
    code: String,
    step: RegisterStep,
    error: Option<String>,
}

impl RegisterView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> RegisterStep {
        self.step
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Keep only digits, at most six of them.
    pub fn set_code(&mut self, raw: &str) {
        self.code = raw
            .chars()
            .filter(char::is_ascii_digit)
            .take(CODE_LENGTH)
            .collect();
    }

    pub fn confirm_prompt(&self) -> String {
        format!(
            "Ingresa el código de {} dígitos que enviamos a {}",
            CODE_LENGTH,
            self.email.trim()
        )
    }

    /// Submit the registration form; moves to `Confirm` on success.
    pub async fn submit(&mut self, sessions: &SessionManager) {
        self.error = None;
        let display_name = Some(self.name.as_str()).filter(|n| !n.trim().is_empty());
        let result = sessions
            .register(&self.email, &self.password, display_name)
            .await;

        match result {
            Ok(()) => {
                info!("Account registered, awaiting confirmation");
                self.password.clear();
                self.step = RegisterStep::Confirm;
            }
            Err(e) => self.error = Some(auth_error_message(&e, REGISTER_FALLBACK)),
        }
    }

    /// Submit the confirmation code; moves to `Success` on success and
    /// stays on `Confirm` otherwise.
    pub async fn confirm(&mut self, sessions: &SessionManager) {
        self.error = None;
        let result = sessions.confirm_registration(&self.email, &self.code).await;

        match result {
            Ok(()) => {
                info!("Account confirmed");
                self.step = RegisterStep::Success;
            }
            Err(e) => self.error = Some(auth_error_message(&e, CONFIRM_FALLBACK)),
        }
    }
}
