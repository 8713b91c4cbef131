// Reference data: settings, companies, mediums.

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{CompanyResponse, MediumResponse, SettingResponse};

impl ApiClient {
    /// `GET settings`
    pub async fn list_settings(&self) -> Result<Vec<SettingResponse>, Error> {
        self.get("settings").await
    }

    /// `GET companies`
    pub async fn list_companies(&self) -> Result<Vec<CompanyResponse>, Error> {
        self.get("companies").await
    }

    /// `GET mediums`
    pub async fn list_mediums(&self) -> Result<Vec<MediumResponse>, Error> {
        self.get("mediums").await
    }
}
