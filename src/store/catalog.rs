//! Catalog Store
//!
//! Client-side cache of the vehicle list. The cache only changes after the
//! server confirms a mutation, so there is nothing to roll back.
//!
//! Assumes one active user session per process: concurrent edits made
//! elsewhere are not reconciled. The cache reflects whatever the server last
//! returned for the records this client touched, until the next `list`.

use tracing::{error, info, warn};

use crate::api::CarsApi;
use crate::error::AppResult;
use crate::models::{Car, CarPayload};

pub struct CatalogStore {
    api: CarsApi,
    cars: Vec<Car>,
    loading: bool,
    error: Option<String>,
}

impl CatalogStore {
    /// Starts in the loading state until the first `list` completes.
    pub fn new(api: CarsApi) -> Self {
        Self {
            api,
            cars: Vec::new(),
            loading: true,
            error: None,
        }
    }

    /// Records in server order
    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn find(&self, id: &str) -> Option<&Car> {
        self.cars.iter().find(|c| c.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed `list`, if not dismissed
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Reload the whole list. On failure the cache is emptied so stale data
    /// never shows next to the error.
    pub async fn list(&mut self) -> AppResult<()> {
        self.loading = true;
        self.error = None;

        let result = self.api.get_all().await;
        self.loading = false;
        match result {
            Ok(cars) => {
                info!(total = cars.len(), "Catalog loaded");
                self.cars = cars;
                Ok(())
            }
            Err(e) => {
                error!("Catalog load failed: {}", e);
                self.error = Some(e.to_string());
                self.cars.clear();
                Err(e)
            }
        }
    }

    /// Fetch one record and refresh its cached copy.
    pub async fn get(&mut self, id: &str) -> AppResult<Car> {
        self.error = None;
        let car = self.api.get_by_id(id).await?;
        self.replace(car.clone());
        Ok(car)
    }

    /// Append the server-created record.
    pub async fn create(&mut self, payload: &CarPayload) -> AppResult<Car> {
        self.error = None;
        let created = self.api.create(payload).await?;
        self.cars.push(created.clone());
        info!(id = %created.id, "Car added to catalog");
        Ok(created)
    }

    /// Replace the cached record with the server's updated copy.
    ///
    /// If `id` is not cached the server result is returned and the cache
    /// is left as is.
    pub async fn update(&mut self, id: &str, payload: &CarPayload) -> AppResult<Car> {
        self.error = None;
        let updated = self.api.update(id, payload).await?;
        if !self.replace_id(id, updated.clone()) {
            warn!(id, "Updated car was not in the local catalog");
        }
        Ok(updated)
    }

    /// Remove the record once the server acknowledges the deletion.
    pub async fn delete(&mut self, id: &str) -> AppResult<()> {
        self.error = None;
        self.api.delete(id).await?;
        let before = self.cars.len();
        self.cars.retain(|c| c.id != id);
        if self.cars.len() == before {
            warn!(id, "Deleted car was not in the local catalog");
        }
        Ok(())
    }

    fn replace(&mut self, car: Car) -> bool {
        let id = car.id.clone();
        self.replace_id(&id, car)
    }

    fn replace_id(&mut self, id: &str, car: Car) -> bool {
        match self.cars.iter_mut().find(|c| c.id == id) {
            Some(slot) => {
                *slot = car;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::api::client::StaticToken;
    use crate::error::{AppError, SESSION_EXPIRED_MESSAGE};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record(id: &str, name: &str, description: &str, updated: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "description": description,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": updated
        })
    }

    async fn seeded(server: &MockServer) -> CatalogStore {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                record("a1", "Honda Civic", "Sedán", "2024-01-01T00:00:00Z"),
                record("b2", "Ford Ranger", "", "2024-01-01T00:00:00Z"),
                record("c3", "Fiat Uno", "Clásico", "2024-01-01T00:00:00Z"),
            ])))
            .up_to_n_times(1)
            .mount(server)
            .await;

        let base = Url::parse(&server.uri()).unwrap();
        let api = CarsApi::new(ApiClient::new(base, Arc::new(StaticToken(Some("t".into())))));
        let mut store = CatalogStore::new(api);
        assert!(store.is_loading());
        store.list().await.unwrap();
        assert!(!store.is_loading());
        store
    }

    #[tokio::test]
    async fn list_keeps_records_with_loose_timestamps() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                record("a1", "Honda Civic", "", "2024-01-05T10:00:00Z"),
                {
                    "id": "b2",
                    "name": "Ford Ranger",
                    "createdAt": "2024-01-05T10:00:00",
                    "updatedAt": "2024-01-05T10:00:00"
                },
                { "id": "c3", "name": "Fiat Uno" },
            ])))
            .mount(&server)
            .await;

        let base = Url::parse(&server.uri()).unwrap();
        let api = CarsApi::new(ApiClient::new(base, Arc::new(StaticToken(None))));
        let mut store = CatalogStore::new(api);

        store.list().await.unwrap();
        assert!(store.error().is_none());
        assert_eq!(store.cars().len(), 3);
        assert_eq!(store.cars()[1].created_at.as_deref(), Some("2024-01-05T10:00:00"));
        assert!(store.cars()[2].created_at.is_none());
    }

    #[tokio::test]
    async fn create_appends_server_record_last() {
        let server = MockServer::start().await;
        let mut store = seeded(&server).await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(record(
                "abc",
                "Toyota Corolla",
                "",
                "2024-01-01T00:00:00Z",
            )))
            .mount(&server)
            .await;

        let before = store.cars().len();
        let payload = CarPayload::new("Toyota Corolla", Some(String::new()));
        let created = store.create(&payload).await.unwrap();

        assert_eq!(store.cars().len(), before + 1);
        let last = store.cars().last().unwrap();
        assert_eq!(last, &created);
        assert_eq!(last.id, "abc");
        assert_eq!(last.name, "Toyota Corolla");
        assert_eq!(last.description.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn update_replaces_exactly_the_matching_record() {
        let server = MockServer::start().await;
        let mut store = seeded(&server).await;
        Mock::given(method("PUT"))
            .and(path("/b2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(record(
                "b2",
                "Ford Ranger XLT",
                "4x4",
                "2024-02-01T00:00:00Z",
            )))
            .mount(&server)
            .await;

        let untouched: Vec<Car> = store.cars().iter().filter(|c| c.id != "b2").cloned().collect();
        store
            .update("b2", &CarPayload::new("Ford Ranger XLT", Some("4x4".into())))
            .await
            .unwrap();

        assert_eq!(store.cars().len(), 3);
        assert_eq!(store.cars()[1].name, "Ford Ranger XLT");
        assert_eq!(store.cars()[1].created_at, store.cars()[0].created_at);
        let others: Vec<Car> = store.cars().iter().filter(|c| c.id != "b2").cloned().collect();
        assert_eq!(others, untouched);
    }

    #[tokio::test]
    async fn delete_removes_after_acknowledgment() {
        let server = MockServer::start().await;
        let mut store = seeded(&server).await;
        Mock::given(method("DELETE"))
            .and(path("/a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "deleted"})))
            .mount(&server)
            .await;

        store.delete("a1").await.unwrap();
        assert_eq!(store.cars().len(), 2);
        assert!(store.find("a1").is_none());
    }

    #[tokio::test]
    async fn failed_delete_keeps_record() {
        let server = MockServer::start().await;
        let mut store = seeded(&server).await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
            .mount(&server)
            .await;

        let err = store.delete("a1").await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(store.cars().len(), 3);
    }

    #[tokio::test]
    async fn list_failure_empties_cache_and_records_message() {
        let server = MockServer::start().await;
        let mut store = seeded(&server).await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        assert!(store.list().await.is_err());
        assert!(store.cars().is_empty());
        assert_eq!(store.error(), Some(SESSION_EXPIRED_MESSAGE));

        store.dismiss_error();
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn mutation_clears_previous_error() {
        let server = MockServer::start().await;
        let mut store = seeded(&server).await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "db down"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(record(
                "n1",
                "Nissan March",
                "",
                "2024-01-01T00:00:00Z",
            )))
            .mount(&server)
            .await;

        let _ = store.list().await;
        assert_eq!(store.error(), Some("db down"));

        store.create(&CarPayload::new("Nissan March", None)).await.unwrap();
        assert!(store.error().is_none());
        assert_eq!(store.cars().len(), 1);
    }

    #[tokio::test]
    async fn update_of_uncached_id_leaves_cache_alone() {
        let server = MockServer::start().await;
        let mut store = seeded(&server).await;
        Mock::given(method("PUT"))
            .and(path("/zz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(record(
                "zz",
                "Otro",
                "",
                "2024-01-01T00:00:00Z",
            )))
            .mount(&server)
            .await;

        let before = store.cars().to_vec();
        let updated = store.update("zz", &CarPayload::new("Otro", None)).await.unwrap();
        assert_eq!(updated.id, "zz");
        assert_eq!(store.cars(), before.as_slice());
    }

    #[tokio::test]
    async fn get_refreshes_cached_copy() {
        let server = MockServer::start().await;
        let mut store = seeded(&server).await;
        Mock::given(method("GET"))
            .and(path("/c3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(record(
                "c3",
                "Fiat Uno Way",
                "Clásico",
                "2024-03-01T00:00:00Z",
            )))
            .mount(&server)
            .await;

        store.get("c3").await.unwrap();
        assert_eq!(store.find("c3").unwrap().name, "Fiat Uno Way");
        assert_eq!(store.cars().len(), 3);
    }

    #[tokio::test]
    async fn unauthorized_mutation_reports_session_expired() {
        let server = MockServer::start().await;
        let mut store = seeded(&server).await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
            .mount(&server)
            .await;

        let err = store.update("a1", &CarPayload::new("X", None)).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
        assert_eq!(store.find("a1").unwrap().name, "Honda Civic");
    }
}
