//! Catalog screen
//!
//! Wraps the store with the dialogs around it: create and edit forms that
//! stay open with an inline error on failure, a confirmation step before
//! deleting, and one-shot success notices.

use std::fmt::Write as _;

use tracing::warn;

use crate::models::Car;
use crate::store::CatalogStore;
use crate::views::form::CarForm;
use crate::views::format::{description_or_placeholder, format_date};

pub const EMPTY_STATE: &str = "No hay vehículos registrados";
pub const DELETE_TITLE: &str = "¿Eliminar auto?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Created,
    Updated,
    Deleted,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::Created => "Auto creado correctamente",
            Notice::Updated => "Auto actualizado correctamente",
            Notice::Deleted => "Auto eliminado correctamente",
        }
    }
}

/// Result of submitting a create or edit dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// The server accepted the change; the dialog closes.
    Saved,
    /// Blank name, nothing was sent; the dialog stays open.
    Incomplete,
    /// The server rejected the change; the dialog stays open with this message.
    Failed(String),
}

pub struct CatalogView {
    store: CatalogStore,
    notice: Option<Notice>,
    pending_delete: Option<Car>,
}

impl CatalogView {
    pub fn new(store: CatalogStore) -> Self {
        Self {
            store,
            notice: None,
            pending_delete: None,
        }
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Reload from the server. Failures end up in the banner.
    pub async fn refresh(&mut self) {
        let _ = self.store.list().await;
    }

    pub fn dismiss_error(&mut self) {
        self.store.dismiss_error();
    }

    /// The pending success notice, cleared once read.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub async fn create(&mut self, form: &CarForm) -> FormOutcome {
        let Some(payload) = form.payload() else {
            return FormOutcome::Incomplete;
        };
        match self.store.create(&payload).await {
            Ok(_) => {
                self.notice = Some(Notice::Created);
                FormOutcome::Saved
            }
            Err(e) => FormOutcome::Failed(e.to_string()),
        }
    }

    pub async fn update(&mut self, id: &str, form: &CarForm) -> FormOutcome {
        let Some(payload) = form.payload() else {
            return FormOutcome::Incomplete;
        };
        match self.store.update(id, &payload).await {
            Ok(_) => {
                self.notice = Some(Notice::Updated);
                FormOutcome::Saved
            }
            Err(e) => FormOutcome::Failed(e.to_string()),
        }
    }

    /// Latest server copy of `id` to prefill the edit dialog. Falls back to
    /// the cached record when the fetch fails.
    pub async fn load_for_edit(&mut self, id: &str) -> Option<Car> {
        match self.store.get(id).await {
            Ok(car) => Some(car),
            Err(e) => {
                warn!(id, "Could not refresh car before editing: {}", e);
                self.store.find(id).cloned()
            }
        }
    }

    /// Open the delete confirmation for `id`.
    pub fn request_delete(&mut self, id: &str) -> Option<&Car> {
        self.pending_delete = self.store.find(id).cloned();
        self.pending_delete.as_ref()
    }

    pub fn pending_delete(&self) -> Option<&Car> {
        self.pending_delete.as_ref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Issue the delete the user confirmed. The dialog stays open on failure.
    pub async fn confirm_delete(&mut self) -> Result<(), String> {
        let Some(target) = self.pending_delete.as_ref() else {
            warn!("Delete confirmed without a pending target");
            return Ok(());
        };
        let id = target.id.clone();
        self.store.delete(&id).await.map_err(|e| e.to_string())?;
        self.pending_delete = None;
        self.notice = Some(Notice::Deleted);
        Ok(())
    }

    pub fn delete_prompt(&self) -> Option<String> {
        self.pending_delete.as_ref().map(|car| {
            format!(
                "{} Se eliminará \"{}\". Esta acción no se puede deshacer.",
                DELETE_TITLE, car.name
            )
        })
    }

    /// Plain-text rendering of the list, banner included.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.store.is_loading() {
            out.push_str("Cargando...\n");
            return out;
        }
        if let Some(error) = self.store.error() {
            let _ = writeln!(out, "[error] {error}");
        }

        let _ = writeln!(out, "Catálogo de Autos");
        if self.store.cars().is_empty() {
            let _ = writeln!(out, "{EMPTY_STATE}");
            return out;
        }
        for (i, car) in self.store.cars().iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>2}. {}  ({})\n    {}",
                i + 1,
                car.name,
                format_date(car.created_at.as_deref()),
                description_or_placeholder(car)
            );
        }
        out
    }
}
