use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{ClientRequest, ClientResponse, UserResponse};

impl ApiClient {
    /// `GET clients`
    pub async fn list_clients(&self) -> Result<Vec<ClientResponse>, Error> {
        self.get("clients").await
    }

    /// `GET clients/{id}`
    pub async fn get_client(&self, id: &str) -> Result<ClientResponse, Error> {
        self.get(&format!("clients/{id}")).await
    }

    /// `POST clients`
    pub async fn create_client(&self, body: &ClientRequest) -> Result<ClientResponse, Error> {
        debug!(name = %body.name, "creating client");
        self.post("clients", body).await
    }

    /// `PUT clients/{id}`
    pub async fn update_client(
        &self,
        id: &str,
        body: &ClientRequest,
    ) -> Result<ClientResponse, Error> {
        debug!(id, "updating client");
        self.put(&format!("clients/{id}"), body).await
    }

    /// `GET users`
    pub async fn list_users(&self) -> Result<Vec<UserResponse>, Error> {
        self.get("users").await
    }
}
