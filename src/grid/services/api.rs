//! # Patient API Client
//!
//! Async client for the patient-list JSON API. Paths are relative to the
//! profile's base URL:
//!
//! ```text
//! GET    schema/
//! GET    patient/
//! POST   patient/
//! PUT    patient/{id}/{column}/
//! POST   patient/{id}/{column}/
//! PUT    patient/{id}/{column}/{item_id}/
//! DELETE patient/{id}/{column}/{item_id}/
//! ```

use crate::config::GridProfile;
use crate::grid::error::{GridError, PatientId};
use crate::grid::models::{Record, Schema};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde_json::Value;

pub fn schema_path() -> String {
    "schema/".to_string()
}

pub fn patients_path() -> String {
    "patient/".to_string()
}

pub fn cell_path(patient_id: PatientId, column: &str) -> String {
    format!("patient/{patient_id}/{column}/")
}

pub fn item_path(patient_id: PatientId, column: &str, item_id: i64) -> String {
    format!("patient/{patient_id}/{column}/{item_id}/")
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    user: Option<String>,
    password: Option<String>,
}

impl ApiClient {
    pub fn new(profile: &GridProfile) -> Result<Self, GridError> {
        let mut base = profile.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let mut builder = Client::builder();
        if let Some(timeout) = profile.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        tracing::debug!("API client created for {}", base_url);
        Ok(Self {
            client,
            base_url,
            user: profile.user.clone(),
            password: profile.password.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> Result<Url, GridError> {
        Ok(self.base_url.join(path)?)
    }

    pub async fn fetch_schema(&self) -> Result<Schema, GridError> {
        let response = self.send(Method::GET, &schema_path(), None).await?;
        response
            .json::<Schema>()
            .await
            .map_err(|e| GridError::MalformedPayload(format!("schema: {e}")))
    }

    pub async fn list_patients(&self) -> Result<Vec<Record>, GridError> {
        let response = self.send(Method::GET, &patients_path(), None).await?;
        let rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| GridError::MalformedPayload(format!("patient list: {e}")))?;
        rows.into_iter()
            .map(|row| match row {
                Value::Object(record) => Ok(record),
                other => Err(GridError::MalformedPayload(format!(
                    "patient row is not an object: {other}"
                ))),
            })
            .collect()
    }

    pub async fn create_patient(&self, body: &Record) -> Result<Record, GridError> {
        let response = self.send(Method::POST, &patients_path(), Some(body)).await?;
        read_record(response).await
    }

    pub async fn update_cell(
        &self,
        patient_id: PatientId,
        column: &str,
        body: &Record,
    ) -> Result<(), GridError> {
        self.send(Method::PUT, &cell_path(patient_id, column), Some(body))
            .await?;
        Ok(())
    }

    pub async fn create_item(
        &self,
        patient_id: PatientId,
        column: &str,
        body: &Record,
    ) -> Result<Record, GridError> {
        let response = self
            .send(Method::POST, &cell_path(patient_id, column), Some(body))
            .await?;
        read_record(response).await
    }

    pub async fn update_item(
        &self,
        patient_id: PatientId,
        column: &str,
        item_id: i64,
        body: &Record,
    ) -> Result<(), GridError> {
        self.send(
            Method::PUT,
            &item_path(patient_id, column, item_id),
            Some(body),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_item(
        &self,
        patient_id: PatientId,
        column: &str,
        item_id: i64,
    ) -> Result<(), GridError> {
        self.send(
            Method::DELETE,
            &item_path(patient_id, column, item_id),
            None,
        )
        .await?;
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Record>,
    ) -> Result<Response, GridError> {
        let url = self.url(path)?;
        tracing::debug!("{} {}", method, url);

        let mut request: RequestBuilder = self.client.request(method.clone(), url.clone());
        if let Some(user) = &self.user {
            request = request.basic_auth(user, self.password.as_ref());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{} {} returned {}", method, url, status);
            return Err(GridError::HttpStatus {
                method: method.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

async fn read_record(response: Response) -> Result<Record, GridError> {
    match response.json::<Value>().await {
        Ok(Value::Object(record)) => Ok(record),
        Ok(other) => Err(GridError::MalformedPayload(format!(
            "expected an object, got {other}"
        ))),
        Err(e) => Err(GridError::MalformedPayload(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_should_follow_the_resource_layout() {
        assert_eq!(cell_path(3, "diagnosis"), "patient/3/diagnosis/");
        assert_eq!(item_path(3, "diagnosis", 9), "patient/3/diagnosis/9/");
    }

    #[test]
    fn base_url_without_trailing_slash_should_still_join_below_it() {
        let profile = GridProfile::blank().with_base_url("http://ward.example/api/v0.1");
        let client = ApiClient::new(&profile).unwrap();
        assert_eq!(
            client.url(&cell_path(1, "location")).unwrap().as_str(),
            "http://ward.example/api/v0.1/patient/1/location/"
        );
    }

    #[test]
    fn invalid_base_url_should_be_rejected() {
        let profile = GridProfile::blank().with_base_url("not a url");
        assert!(matches!(
            ApiClient::new(&profile),
            Err(GridError::InvalidUrl(_))
        ));
    }
}
