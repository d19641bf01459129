//! Store domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storecast_core::{ProfileId, StoreId};

/// A physical retail location owned by one client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Store {
    pub id: StoreId,
    pub owner_id: ProfileId,
    pub name: String,
    pub brand_company: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Create/update payload for a store.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StoreInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand_company: String,
    #[serde(default)]
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl StoreInput {
    /// Trim the text fields and check the coordinate ranges.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message naming the first invalid field.
    pub fn validate(self) -> Result<Self, String> {
        let name = self.name.trim().to_owned();
        let brand_company = self.brand_company.trim().to_owned();
        let address = self.address.trim().to_owned();

        if name.is_empty() {
            return Err("Store name is required".to_owned());
        }
        if brand_company.is_empty() {
            return Err("Brand/company is required".to_owned());
        }
        if address.is_empty() {
            return Err("Address is required".to_owned());
        }
        if let Some(lat) = self.latitude
            && !(-90.0..=90.0).contains(&lat)
        {
            return Err("Latitude must be between -90 and 90".to_owned());
        }
        if let Some(lng) = self.longitude
            && !(-180.0..=180.0).contains(&lng)
        {
            return Err("Longitude must be between -180 and 180".to_owned());
        }

        Ok(Self {
            name,
            brand_company,
            address,
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}
