//! Interactive terminal loop
//!
//! Each screen shows its state, asks for one action and hands navigation
//! back to the router. Prompting goes through [`Prompt`] so the loop can be
//! driven by a script in tests.

use std::sync::Arc;

use anyhow::Result;
use inquire::{Confirm, InquireError, Password, PasswordDisplayMode, Select, Text};
use tracing::debug;

use crate::auth::SessionManager;
use crate::models::Car;
use crate::routes::{Route, Router};
use crate::views::catalog::FormOutcome;
use crate::views::{CarForm, CatalogView, LoginView, RegisterStep, RegisterView};

/// Terminal input. `None` means the user backed out of the prompt (Esc).
pub trait Prompt {
    fn select(&self, message: &str, options: &[&str]) -> Result<Option<usize>>;
    fn text(&self, message: &str, initial: &str) -> Result<Option<String>>;
    fn password(&self, message: &str) -> Result<Option<String>>;
    fn confirm(&self, message: &str) -> Result<bool>;
    fn show(&self, text: &str);
}

pub struct InquirePrompt;

impl Prompt for InquirePrompt {
    fn select(&self, message: &str, options: &[&str]) -> Result<Option<usize>> {
        let choice = skippable(Select::new(message, options.to_vec()).raw_prompt())?;
        Ok(choice.map(|option| option.index))
    }

    fn text(&self, message: &str, initial: &str) -> Result<Option<String>> {
        Ok(Text::new(message)
            .with_initial_value(initial)
            .prompt_skippable()?)
    }

    fn password(&self, message: &str) -> Result<Option<String>> {
        Ok(Password::new(message)
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt_skippable()?)
    }

    fn confirm(&self, message: &str) -> Result<bool> {
        let answer = skippable(Confirm::new(message).with_default(false).prompt())?;
        Ok(answer.unwrap_or(false))
    }

    fn show(&self, text: &str) {
        println!("{text}");
    }
}

/// Esc becomes `None`; any other prompt failure (Ctrl+C included) is an error.
fn skippable<T>(result: Result<T, InquireError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

enum Flow {
    Continue,
    Quit,
}

#[derive(Clone, Copy)]
enum CatalogAction {
    Create,
    Edit,
    Delete,
    Reload,
    DismissError,
    SignOut,
    Quit,
}

impl CatalogAction {
    fn label(&self) -> &'static str {
        match self {
            CatalogAction::Create => "Nuevo auto",
            CatalogAction::Edit => "Editar auto",
            CatalogAction::Delete => "Eliminar auto",
            CatalogAction::Reload => "Recargar",
            CatalogAction::DismissError => "Cerrar aviso de error",
            CatalogAction::SignOut => "Cerrar sesión",
            CatalogAction::Quit => "Salir",
        }
    }
}

pub struct App<P: Prompt> {
    prompt: P,
    sessions: Arc<SessionManager>,
    router: Router,
    catalog: CatalogView,
}

impl<P: Prompt> App<P> {
    pub fn new(prompt: P, sessions: Arc<SessionManager>, catalog: CatalogView) -> Self {
        let router = Router::new(sessions.clone());
        Self {
            prompt,
            sessions,
            router,
            catalog,
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn catalog(&self) -> &CatalogView {
        &self.catalog
    }

    /// Run screens starting at `start` until the user quits.
    pub async fn run(&mut self, start: &str) -> Result<()> {
        self.router.begin(start);
        self.prompt.show("Cargando...");
        self.router.resolve().await;

        loop {
            debug!(location = self.router.location(), "Rendering screen");
            let flow = match self.router.route() {
                Route::Login => self.login_screen().await?,
                Route::Register => self.register_screen().await?,
                Route::Catalog => self.catalog_screen().await?,
            };
            if let Flow::Quit = flow {
                return Ok(());
            }
        }
    }

    async fn login_screen(&mut self) -> Result<Flow> {
        let mut view = LoginView::new();
        self.prompt.show("Iniciar sesión\nIngresa tus credenciales para acceder");
        if let Some(target) = self.router.return_to().filter(|p| *p != Route::Catalog.path()) {
            self.prompt.show(&format!("Inicia sesión para continuar a {target}"));
        }

        loop {
            if let Some(error) = view.error() {
                self.prompt.show(&format!("[error] {error}"));
            }
            let options = ["Iniciar sesión", "¿No tienes cuenta? Regístrate", "Salir"];
            match self.prompt.select("¿Qué quieres hacer?", &options)? {
                Some(0) => {
                    let Some(email) = self.prompt.text("Email", &view.email)? else {
                        continue;
                    };
                    view.email = email;
                    let Some(password) = self.prompt.password("Contraseña")? else {
                        continue;
                    };
                    view.password = password;

                    self.prompt.show(view.submit_label());
                    if view.submit(&self.sessions).await {
                        self.router.signed_in().await;
                        return Ok(Flow::Continue);
                    }
                }
                Some(1) => {
                    self.router.navigate(Route::Register.path()).await;
                    return Ok(Flow::Continue);
                }
                _ => return Ok(Flow::Quit),
            }
        }
    }

    async fn register_screen(&mut self) -> Result<Flow> {
        let mut view = RegisterView::new();
        self.prompt
            .show("Crear cuenta\nRegístrate para gestionar tu catálogo de autos");

        loop {
            if let Some(error) = view.error() {
                self.prompt.show(&format!("[error] {error}"));
            }
            match view.step() {
                RegisterStep::Register => {
                    let options = ["Registrarse", "¿Ya tienes cuenta? Iniciar sesión", "Salir"];
                    match self.prompt.select("¿Qué quieres hacer?", &options)? {
                        Some(0) => {
                            if self.fill_registration(&mut view)? {
                                self.prompt.show("Creando cuenta...");
                                view.submit(&self.sessions).await;
                            }
                        }
                        Some(1) => {
                            self.router.navigate(Route::Login.path()).await;
                            return Ok(Flow::Continue);
                        }
                        _ => return Ok(Flow::Quit),
                    }
                }
                RegisterStep::Confirm => {
                    self.prompt.show(&view.confirm_prompt());
                    let Some(code) = self.prompt.text("Código", view.code())? else {
                        self.router.navigate(Route::Login.path()).await;
                        return Ok(Flow::Continue);
                    };
                    view.set_code(&code);
                    self.prompt.show("Confirmando...");
                    view.confirm(&self.sessions).await;
                }
                RegisterStep::Success => {
                    self.prompt.show(
                        "¡Cuenta creada!\nRevisa tu email para confirmar tu cuenta. Luego podrás iniciar sesión.",
                    );
                    self.prompt.select("Continuar", &["Ir a iniciar sesión"])?;
                    self.router.navigate(Route::Login.path()).await;
                    return Ok(Flow::Continue);
                }
            }
        }
    }

    fn fill_registration(&self, view: &mut RegisterView) -> Result<bool> {
        let Some(name) = self.prompt.text("Nombre (opcional)", &view.name)? else {
            return Ok(false);
        };
        let Some(email) = self.prompt.text("Email", &view.email)? else {
            return Ok(false);
        };
        let Some(password) = self
            .prompt
            .password("Contraseña (mín. 8 caracteres, mayúsculas, minúsculas y números)")?
        else {
            return Ok(false);
        };
        view.name = name;
        view.email = email;
        view.password = password;
        Ok(true)
    }

    async fn catalog_screen(&mut self) -> Result<Flow> {
        self.prompt.show("Cargando...");
        self.catalog.refresh().await;

        loop {
            self.render_navbar().await;
            if let Some(notice) = self.catalog.take_notice() {
                self.prompt.show(&format!("[ok] {}", notice.message()));
            }
            self.prompt.show(&self.catalog.render());

            let mut actions = vec![CatalogAction::Create];
            if !self.catalog.store().cars().is_empty() {
                actions.extend([CatalogAction::Edit, CatalogAction::Delete]);
            }
            actions.push(CatalogAction::Reload);
            if self.catalog.store().error().is_some() {
                actions.push(CatalogAction::DismissError);
            }
            actions.extend([CatalogAction::SignOut, CatalogAction::Quit]);

            let labels: Vec<&str> = actions.iter().map(CatalogAction::label).collect();
            let Some(index) = self.prompt.select("¿Qué quieres hacer?", &labels)? else {
                continue;
            };
            let Some(action) = actions.get(index).copied() else {
                continue;
            };

            match action {
                CatalogAction::Create => self.edit_dialog(None).await?,
                CatalogAction::Edit => {
                    if let Some(picked) = self.pick_car("Editar Auto")? {
                        let car = self.catalog.load_for_edit(&picked.id).await.unwrap_or(picked);
                        self.edit_dialog(Some(car)).await?;
                    }
                }
                CatalogAction::Delete => {
                    if let Some(car) = self.pick_car("Eliminar auto")? {
                        self.delete_dialog(&car.id).await?;
                    }
                }
                CatalogAction::Reload => {
                    self.prompt.show("Cargando...");
                    self.catalog.refresh().await;
                }
                CatalogAction::DismissError => self.catalog.dismiss_error(),
                CatalogAction::SignOut => {
                    self.router.sign_out().await;
                    return Ok(Flow::Continue);
                }
                CatalogAction::Quit => return Ok(Flow::Quit),
            }
        }
    }

    async fn render_navbar(&self) {
        let bar = match self.sessions.current_user_email().await {
            Some(email) => format!("── Cars ── {email} ── [Cerrar sesión] ──"),
            None => "── Cars ── [Cerrar sesión] ──".to_string(),
        };
        self.prompt.show(&bar);
    }

    fn pick_car(&self, message: &str) -> Result<Option<Car>> {
        let cars = self.catalog.store().cars();
        let labels: Vec<&str> = cars.iter().map(|c| c.name.as_str()).collect();
        let choice = self.prompt.select(message, &labels)?;
        Ok(choice.and_then(|i| cars.get(i).cloned()))
    }

    /// Create (no `car`) or edit dialog. Stays open until saved or dismissed.
    async fn edit_dialog(&mut self, car: Option<Car>) -> Result<()> {
        let title = if car.is_some() { "Editar Auto" } else { "Nuevo Auto" };
        let mut form = car.as_ref().map(CarForm::from_car).unwrap_or_default();
        self.prompt.show(title);

        loop {
            let Some(name) = self.prompt.text("Nombre", &form.name)? else {
                return Ok(());
            };
            let Some(description) = self.prompt.text("Descripción", &form.description)? else {
                return Ok(());
            };
            form.name = name;
            form.description = description;

            self.prompt.show("Guardando...");
            let outcome = match &car {
                Some(car) => self.catalog.update(&car.id, &form).await,
                None => self.catalog.create(&form).await,
            };
            match outcome {
                FormOutcome::Saved => return Ok(()),
                FormOutcome::Incomplete => self.prompt.show("[error] El nombre es obligatorio"),
                FormOutcome::Failed(message) => self.prompt.show(&format!("[error] {message}")),
            }
        }
    }

    async fn delete_dialog(&mut self, id: &str) -> Result<()> {
        if self.catalog.request_delete(id).is_none() {
            return Ok(());
        }
        loop {
            let Some(question) = self.catalog.delete_prompt() else {
                return Ok(());
            };
            if !self.prompt.confirm(&question)? {
                self.catalog.cancel_delete();
                return Ok(());
            }
            match self.catalog.confirm_delete().await {
                Ok(()) => return Ok(()),
                Err(message) => self.prompt.show(&format!("[error] {message}")),
            }
        }
    }
}
