use crate::client::ApiClient;
use crate::error::Error;
use crate::types::SiteResponse;

impl ApiClient {
    /// Full site inventory.
    ///
    /// `GET sites`
    pub async fn list_sites(&self) -> Result<Vec<SiteResponse>, Error> {
        self.get("sites").await
    }

    /// `GET sites/{code}`
    pub async fn get_site(&self, code: &str) -> Result<SiteResponse, Error> {
        self.get(&format!("sites/{code}")).await
    }
}
