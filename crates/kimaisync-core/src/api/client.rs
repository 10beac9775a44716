//! Kimai REST client over reqwest.
//!
//! Requests are driven to completion on a private current-thread runtime, so
//! callers see plain blocking methods and never have more than one request
//! in flight.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use url::Url;

use super::traits::KimaiApi;
use super::types::{EntityRef, Page, Timesheet, TimesheetQuery};
use crate::error::ApiError;

const USER_AGENT: &str = concat!("kimaisync/", env!("CARGO_PKG_VERSION"));
const TOTAL_PAGES_HEADER: &str = "x-total-pages";

pub struct KimaiClient {
    base: Url,
    api_key: String,
    http: Client,
    runtime: tokio::runtime::Runtime,
    logged_on: bool,
}

impl KimaiClient {
    /// Build a client for the installation at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the url cannot be parsed or the HTTP client
    /// cannot be initialised.
    pub fn new(url: &str, api_key: &str) -> Result<Self, ApiError> {
        let mut root = url.trim().to_string();
        if !root.ends_with('/') {
            root.push('/');
        }
        root.push_str("api/");
        let base = Url::parse(&root).map_err(|e| ApiError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(60))
            .user_agent(USER_AGENT)
            .build()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            base,
            api_key: api_key.to_string(),
            http,
            runtime,
            logged_on: false,
        })
    }

    pub fn is_logged_on(&self) -> bool {
        self.logged_on
    }

    /// Customer by id.
    pub fn customer(&self, id: u64) -> Result<EntityRef, ApiError> {
        self.get(&format!("customers/{id}"))
    }

    /// Project by id.
    pub fn project(&self, id: u64) -> Result<EntityRef, ApiError> {
        self.get(&format!("projects/{id}"))
    }

    /// Activity by id.
    pub fn activity(&self, id: u64) -> Result<EntityRef, ApiError> {
        self.get(&format!("activities/{id}"))
    }

    fn ensure_logged_on(&self) -> Result<(), ApiError> {
        if self.logged_on {
            Ok(())
        } else {
            Err(ApiError::NotLoggedIn)
        }
    }

    fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.ensure_logged_on()?;
        let (_, body) = self.send(Method::GET, endpoint, None)?;
        Ok(serde_json::from_str(&body)?)
    }

    fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<(HeaderMap, String), ApiError> {
        let url = self.base.join(endpoint).map_err(|e| ApiError::InvalidUrl {
            url: format!("{}{endpoint}", self.base),
            message: e.to_string(),
        })?;
        tracing::trace!(%method, %url, "kimai request");

        self.runtime.block_on(async {
            let mut request = self.http.request(method, url).bearer_auth(&self.api_key);
            if let Some(body) = body {
                request = request.json(body);
            }
            let response = request.send().await?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED {
                return Err(ApiError::Unauthorized);
            }
            if !status.is_success() {
                return Err(ApiError::Status {
                    status: status.as_u16(),
                });
            }

            let headers = response.headers().clone();
            let text = response.text().await?;
            Ok::<_, ApiError>((headers, text))
        })
    }
}

fn with_query(endpoint: &str, pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return endpoint.to_string();
    }
    let query = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{endpoint}?{query}")
}

fn order_pairs(order_by: Option<&str>) -> Vec<(&'static str, String)> {
    order_by
        .map(|o| vec![("orderBy", o.to_string())])
        .unwrap_or_default()
}

impl KimaiApi for KimaiClient {
    fn login(&mut self) -> Result<(), ApiError> {
        self.send(Method::GET, "ping", None)?;
        self.logged_on = true;
        Ok(())
    }

    fn find_customer(&self, term: &str) -> Result<Option<EntityRef>, ApiError> {
        let customers: Vec<EntityRef> =
            self.get(&with_query("customers", &[("term", term.to_string())]))?;
        Ok(customers.into_iter().next())
    }

    fn projects(&self, customer: u64) -> Result<Vec<EntityRef>, ApiError> {
        self.get(&with_query("projects", &[("customer", customer.to_string())]))
    }

    fn all_projects(&self) -> Result<Vec<EntityRef>, ApiError> {
        self.get("projects")
    }

    fn activities(&self, project: u64, order_by: Option<&str>) -> Result<Vec<EntityRef>, ApiError> {
        let mut pairs = vec![("project", project.to_string())];
        pairs.extend(order_pairs(order_by));
        self.get(&with_query("activities", &pairs))
    }

    fn all_activities(&self, order_by: Option<&str>) -> Result<Vec<EntityRef>, ApiError> {
        self.get(&with_query("activities", &order_pairs(order_by)))
    }

    fn timesheets(&self, query: &TimesheetQuery) -> Result<Page<Timesheet>, ApiError> {
        self.ensure_logged_on()?;
        let (headers, body) =
            self.send(Method::GET, &with_query("timesheets", &query.pairs()), None)?;
        let items: Vec<Timesheet> = serde_json::from_str(&body)?;
        let total_pages = headers
            .get(TOTAL_PAGES_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        Ok(Page { items, total_pages })
    }

    fn save_timesheet(&self, mut payload: Map<String, Value>) -> Result<Value, ApiError> {
        self.ensure_logged_on()?;
        let (method, endpoint) = match payload.remove("id") {
            Some(Value::String(id)) => (Method::PATCH, format!("timesheets/{id}")),
            Some(id) => (Method::PATCH, format!("timesheets/{id}")),
            None => (Method::POST, "timesheets".to_string()),
        };
        let (_, body) = self.send(method, &endpoint, Some(&Value::Object(payload)))?;
        Ok(serde_json::from_str(&body)?)
    }
}
