//! Typed schemas and endpoint wrappers for the advertisement service.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::environment::{Settings, interpolate};
use crate::error::{Error, Result};
use crate::http::{ApiClient, HttpResponse, RequestInput};

pub mod endpoints {
    pub const CREATE_ITEM: &str = "/api/1/item";
    pub const ITEM: &str = "/api/1/item/{{id}}";
    pub const SELLER_ITEMS: &str = "/api/1/{{sellerId}}/item";
    pub const STATISTIC: &str = "/api/1/statistic/{{id}}";
    pub const DELETE_ITEM: &str = "/api/2/item/{{id}}";
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(default)]
    pub contacts: i64,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub view_count: i64,
}

/// Creation payload. `name` is required by the service; leaving it `None`
/// omits the key entirely, which is how the 400 path is exercised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdvertisement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub price: i64,
    pub seller_id: i64,
    pub statistics: Statistics,
}

impl NewAdvertisement {
    pub fn new(name: impl Into<String>, price: i64, seller_id: i64) -> Self {
        Self {
            name: Some(name.into()),
            price,
            seller_id,
            statistics: Statistics::default(),
        }
    }

    pub fn without_name(mut self) -> Self {
        self.name = None;
        self
    }
}

/// Body of a successful creation. `id` is kept loosely typed so a non-string
/// id can be reported instead of failing the decode. A JSON `null` still
/// counts as the key being present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedAdvertisement {
    #[serde(default, deserialize_with = "present")]
    id: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl CreatedAdvertisement {
    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }

    /// The server-assigned id, if present as a non-empty string.
    pub fn id(&self) -> Option<&str> {
        self.id
            .as_ref()
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advertisement {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub seller_id: Option<i64>,
    #[serde(default)]
    pub statistics: Option<Statistics>,
}

/// One element of the statistics endpoint's array. Counters are optional so
/// that a missing field is observable rather than a decode error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsRecord {
    pub likes: Option<i64>,
    pub view_count: Option<i64>,
    pub contacts: Option<i64>,
}

impl StatisticsRecord {
    pub fn fields(&self) -> [(&'static str, Option<i64>); 3] {
        [
            ("likes", self.likes),
            ("viewCount", self.view_count),
            ("contacts", self.contacts),
        ]
    }
}

/// Endpoint-level access to the service. Every call returns the raw response
/// so callers decide which status codes are acceptable.
#[derive(Debug, Clone)]
pub struct AdsApi {
    client: ApiClient,
    seller_id: i64,
    variables: HashMap<String, String>,
}

impl AdsApi {
    pub fn new(client: ApiClient, settings: &Settings) -> Self {
        Self {
            client,
            seller_id: settings.seller_id,
            variables: settings.variables(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = ApiClient::new(&settings.base_url, settings.timeout())?;
        Ok(Self::new(client, settings))
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn seller_id(&self) -> i64 {
        self.seller_id
    }

    pub async fn create(&self, ad: &NewAdvertisement) -> Result<HttpResponse> {
        let body = serde_json::to_value(ad).map_err(|source| Error::Encode {
            what: "advertisement payload",
            source,
        })?;
        self.client
            .send(RequestInput::post(endpoints::CREATE_ITEM, body))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<HttpResponse> {
        let path = self.path(endpoints::ITEM, Some(id));
        self.client.send(RequestInput::get(path)).await
    }

    pub async fn list_by_seller(&self, seller_id: i64) -> Result<HttpResponse> {
        let mut variables = self.variables.clone();
        variables.insert("sellerId".to_string(), seller_id.to_string());
        let path = interpolate(endpoints::SELLER_ITEMS, &variables);
        self.client.send(RequestInput::get(path)).await
    }

    pub async fn statistics(&self, id: &str) -> Result<HttpResponse> {
        let path = self.path(endpoints::STATISTIC, Some(id));
        self.client.send(RequestInput::get(path)).await
    }

    pub async fn delete(&self, id: &str) -> Result<HttpResponse> {
        let path = self.path(endpoints::DELETE_ITEM, Some(id));
        self.client.send(RequestInput::delete(path)).await
    }

    fn path(&self, template: &str, id: Option<&str>) -> String {
        match id {
            Some(id) => {
                let mut variables = self.variables.clone();
                variables.insert("id".to_string(), id.to_string());
                interpolate(template, &variables)
            }
            None => interpolate(template, &self.variables),
        }
    }
}
