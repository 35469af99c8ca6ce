use crate::models::{Car, CarPayload};

/// Editable fields of a vehicle, shared by the create and edit dialogs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarForm {
    pub name: String,
    pub description: String,
}

impl CarForm {
    /// Prefilled from an existing record when editing.
    pub fn from_car(car: &Car) -> Self {
        Self {
            name: car.name.clone(),
            description: car.description.clone().unwrap_or_default(),
        }
    }

    /// Trimmed payload, or `None` when the name is blank. Nothing is sent
    /// to the server in that case.
    pub fn payload(&self) -> Option<CarPayload> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        Some(CarPayload::new(
            name,
            Some(self.description.trim().to_string()),
        ))
    }
}
