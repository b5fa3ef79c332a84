//! SOAP client for the student service.

use reqwest::header::CONTENT_TYPE;
use tracing::warn;

use crate::envelope::{self, ClientReply};
use crate::record::Student;

/// Client mirroring the envelope codec in the opposite role.
///
/// Every failure, transport or decode, surfaces as `None`: callers get a
/// usable reply or nothing, never a raw connection error.
pub struct SoapClient {
    endpoint: String,
    http: reqwest::Client,
}

impl SoapClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Looks up one record by student number.
    pub async fn fetch(&self, nim: &str) -> Option<ClientReply> {
        self.call("getMahasiswa", envelope::encode_fetch_request(nim))
            .await
    }

    /// Registers a record with the service.
    pub async fn add(&self, student: &Student) -> Option<ClientReply> {
        self.call("tambahMahasiswa", envelope::encode_add_request(student))
            .await
    }

    async fn call(&self, action: &str, body: String) -> Option<ClientReply> {
        let response = self
            .http
            .post(self.endpoint.as_str())
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", action)
            .body(body)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                warn!(%err, action, "request failed");
                return None;
            }
        };

        let xml = match response.text().await {
            Ok(xml) => xml,
            Err(err) => {
                warn!(%err, action, "failed to read response body");
                return None;
            }
        };

        envelope::decode_reply(&xml)
    }
}
