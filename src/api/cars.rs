//! Catalog endpoints
//!
//! One method per REST route of the catalog API.

use serde_json::Value;
use tracing::info;

use crate::api::client::{ApiClient, decode};
use crate::error::AppResult;
use crate::models::{Car, CarPayload, DeleteResponse};

#[derive(Clone)]
pub struct CarsApi {
    client: ApiClient,
}

impl CarsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /` - all records in server order.
    ///
    /// A success body that is not an array yields an empty list.
    pub async fn get_all(&self) -> AppResult<Vec<Car>> {
        let data = self.client.get(self.client.endpoint(&[])).await?;
        let cars: Vec<Car> = match data {
            Value::Array(_) => decode(data)?,
            _ => Vec::new(),
        };
        info!(total = cars.len(), "GET / - fetched cars");
        Ok(cars)
    }

    /// `GET /{id}`
    pub async fn get_by_id(&self, id: &str) -> AppResult<Car> {
        let data = self.client.get(self.client.endpoint(&[id])).await?;
        let car: Car = decode(data)?;
        info!(id = %car.id, "GET /{{id}} - fetched car");
        Ok(car)
    }

    /// `POST /`
    pub async fn create(&self, payload: &CarPayload) -> AppResult<Car> {
        let data = self.client.post(self.client.endpoint(&[]), payload).await?;
        let car: Car = decode(data)?;
        info!(id = %car.id, "POST / - car created");
        Ok(car)
    }

    /// `PUT /{id}`
    pub async fn update(&self, id: &str, payload: &CarPayload) -> AppResult<Car> {
        let data = self.client.put(self.client.endpoint(&[id]), payload).await?;
        let car: Car = decode(data)?;
        info!(id = %car.id, "PUT /{{id}} - car updated");
        Ok(car)
    }

    /// `DELETE /{id}`
    pub async fn delete(&self, id: &str) -> AppResult<DeleteResponse> {
        let data = self.client.delete(self.client.endpoint(&[id])).await?;
        let ack: DeleteResponse = decode(data)?;
        info!(id, message = %ack.message, "DELETE /{{id}} - car deleted");
        Ok(ack)
    }
}
