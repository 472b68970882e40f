//! In-process stand-in for the advertisement service.
//!
//! A single catch-all wiremock mock routes every request into
//! [`FakeAdService`], which keeps advertisements in memory and can be told to
//! misbehave through [`Faults`].

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex, MutexGuard};

use adcheck::ads::AdsApi;
use adcheck::environment::Settings;
use serde_json::{Value, json};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const SELLER_ID: i64 = 999_999;

/// Ways the fake can deviate from the healthy contract.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    /// Answer every POST with this status and an error body.
    pub create_status: Option<u16>,
    /// Successful creation body carries no `id`.
    pub omit_id: bool,
    /// GET of an existing item answers 200 with a non-JSON body.
    pub malformed_item_body: bool,
    /// GET of an existing item answers this status with a JSON error object.
    pub item_status: Option<u16>,
    /// Statistics of an existing item is an empty array.
    pub empty_statistics: bool,
    /// Statistics report one like for every item.
    pub nonzero_statistics: bool,
    /// Seller listing always comes back empty.
    pub list_omits_created: bool,
    /// DELETE answers 200 but keeps the item.
    pub ignore_deletes: bool,
    /// POST without `name` is accepted.
    pub accept_missing_name: bool,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct State {
    ads: BTreeMap<String, Value>,
    next_id: u64,
    requests: Vec<RecordedRequest>,
}

#[derive(Debug, Clone)]
pub struct FakeAdService {
    faults: Faults,
    state: Arc<Mutex<State>>,
}

impl FakeAdService {
    pub fn new(faults: Faults) -> Self {
        Self {
            faults,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn stored_ids(&self) -> Vec<String> {
        self.state().ads.keys().cloned().collect()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    /// `"METHOD /path"` for every request received, in order.
    pub fn request_lines(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| format!("{} {}", request.method, request.path))
            .collect()
    }

    fn create(&self, body: Option<Value>) -> ResponseTemplate {
        if let Some(status) = self.faults.create_status {
            return ResponseTemplate::new(status).set_body_json(json!({"message": "unavailable"}));
        }

        let Some(Value::Object(mut ad)) = body else {
            return ResponseTemplate::new(400).set_body_json(json!({"message": "invalid body"}));
        };
        let has_name = ad.get("name").is_some_and(Value::is_string);
        if !has_name && !self.faults.accept_missing_name {
            return ResponseTemplate::new(400)
                .set_body_json(json!({"message": "field name is required"}));
        }

        let mut state = self.state();
        state.next_id += 1;
        let id = format!("ad-{}", state.next_id);
        ad.insert("id".to_string(), Value::String(id.clone()));
        ad.entry("statistics")
            .or_insert_with(|| json!({"contacts": 0, "likes": 0, "viewCount": 0}));
        let ad = Value::Object(ad);
        state.ads.insert(id, ad.clone());

        if self.faults.omit_id {
            return ResponseTemplate::new(200).set_body_json(json!({"status": "saved"}));
        }
        ResponseTemplate::new(200).set_body_json(ad)
    }

    fn get(&self, id: &str) -> ResponseTemplate {
        match self.state().ads.get(id) {
            Some(_) if self.faults.malformed_item_body => {
                ResponseTemplate::new(200).set_body_string("<html>oops</html>")
            }
            Some(ad) => match self.faults.item_status {
                Some(status) => {
                    ResponseTemplate::new(status).set_body_json(json!({"message": "boom"}))
                }
                None => ResponseTemplate::new(200).set_body_json(json!([ad])),
            },
            None => not_found(),
        }
    }

    fn list(&self, seller: &str) -> ResponseTemplate {
        if self.faults.list_omits_created {
            return ResponseTemplate::new(200).set_body_json(json!([]));
        }

        let ads: Vec<Value> = self
            .state()
            .ads
            .values()
            .filter(|ad| ad["sellerId"].to_string() == seller)
            .cloned()
            .collect();
        ResponseTemplate::new(200).set_body_json(Value::Array(ads))
    }

    fn statistics(&self, id: &str) -> ResponseTemplate {
        let state = self.state();
        let Some(ad) = state.ads.get(id) else {
            return not_found();
        };

        if self.faults.empty_statistics {
            return ResponseTemplate::new(200).set_body_json(json!([]));
        }
        let mut stats = ad["statistics"].clone();
        if self.faults.nonzero_statistics {
            stats["likes"] = json!(1);
        }
        ResponseTemplate::new(200).set_body_json(json!([stats]))
    }

    fn delete(&self, id: &str) -> ResponseTemplate {
        let mut state = self.state();
        if !state.ads.contains_key(id) {
            return not_found();
        }
        if !self.faults.ignore_deletes {
            state.ads.remove(id);
        }
        ResponseTemplate::new(200)
    }
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({"message": "not found"}))
}

impl Respond for FakeAdService {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let method = request.method.as_str().to_string();
        let path = request.url.path().to_string();
        let body = serde_json::from_slice::<Value>(&request.body).ok();

        self.state().requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            body: body.clone(),
        });

        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        match (method.as_str(), segments.as_slice()) {
            ("POST", ["api", "1", "item"]) => self.create(body),
            ("GET", ["api", "1", "item", id]) => self.get(id),
            ("GET", ["api", "1", "statistic", id]) => self.statistics(id),
            ("GET", ["api", "1", seller, "item"]) => self.list(seller),
            ("DELETE", ["api", "2", "item", id]) => self.delete(id),
            _ => not_found(),
        }
    }
}

/// Start a mock server backed by a fresh fake.
pub async fn start(faults: Faults) -> (MockServer, FakeAdService) {
    let server = MockServer::start().await;
    let service = FakeAdService::new(faults);
    Mock::given(any())
        .respond_with(service.clone())
        .mount(&server)
        .await;
    (server, service)
}

pub fn settings_for(base_url: &str) -> Settings {
    Settings {
        base_url: base_url.to_string(),
        seller_id: SELLER_ID,
        timeout_secs: Some(5),
    }
}

pub fn api_for(base_url: &str) -> AdsApi {
    AdsApi::from_settings(&settings_for(base_url)).expect("valid test settings")
}

/// A base URL nothing is listening on.
pub fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
