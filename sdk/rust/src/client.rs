use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Prefix of the envelope produced when the server does not answer with JSON.
pub const NON_JSON_PREFIX: &str = "Response bukan JSON atau server error: ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: u64,
    pub nama: String,
    pub telepon: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub nama: String,
    pub telepon: String,
    pub email: String,
}

impl NewContact {
    pub fn new(nama: &str, telepon: &str, email: &str) -> Self {
        Self {
            nama: nama.to_string(),
            telepon: telepon.to_string(),
            email: email.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Created {
    pub id: u64,
}

/// The `{status, data|message}` wrapper returned by every call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope<T> {
    Success {
        data: Option<T>,
    },
    Error {
        message: String,
    },
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Envelope::Error { message } => Some(message),
            Envelope::Success { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Envelope::Success { data } => data,
            Envelope::Error { .. } => None,
        }
    }
}

pub struct ContactClient {
    client: Client,
    endpoint: String,
}

impl ContactClient {
    /// `endpoint` is the full contacts URL, e.g. `http://127.0.0.1:8000/api/contacts`.
    pub fn new(endpoint: &str) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    /// Search by name substring; `None` lists every contact.
    pub async fn search(&self, text: Option<&str>) -> Result<Envelope<Vec<Contact>>, reqwest::Error> {
        let mut req = self.client.get(&self.endpoint);
        if let Some(text) = text {
            req = req.query(&[("search", text)]);
        }
        self.call(req).await
    }

    pub async fn create(&self, contact: &NewContact) -> Result<Envelope<Created>, reqwest::Error> {
        self.call(self.client.post(&self.endpoint).json(contact)).await
    }

    pub async fn update(&self, id: u64, contact: &NewContact) -> Result<Envelope<()>, reqwest::Error> {
        let body = json!({
            "id": id,
            "nama": contact.nama,
            "telepon": contact.telepon,
            "email": contact.email,
        });
        self.call(self.client.put(&self.endpoint).json(&body)).await
    }

    pub async fn delete(&self, id: u64) -> Result<Envelope<()>, reqwest::Error> {
        self.call(
            self.client
                .request(Method::DELETE, &self.endpoint)
                .json(&json!({ "id": id })),
        )
        .await
    }

    /// Send a request with an arbitrary method and raw body.
    pub async fn raw(&self, method: Method, body: String) -> Result<Envelope<serde_json::Value>, reqwest::Error> {
        self.call(
            self.client
                .request(method, &self.endpoint)
                .header("content-type", "application/json")
                .body(body),
        )
        .await
    }

    /// Transport errors are returned as `Err`. A response that is not a JSON
    /// envelope becomes an error envelope carrying the HTTP status line.
    async fn call<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<Envelope<T>, reqwest::Error> {
        let resp = req.send().await?;
        let status_line = format!("{:?} {}", resp.version(), resp.status());
        let text = resp.text().await?;

        Ok(serde_json::from_str(&text).unwrap_or_else(|_| Envelope::Error {
            message: format!("{}{}", NON_JSON_PREFIX, status_line),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_parsing() {
        let ok: Envelope<()> = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert!(ok.is_success());

        let list: Envelope<Vec<Contact>> = serde_json::from_str(
            r#"{"status":"success","data":[{"id":1,"nama":"Andi","telepon":"0811","email":"andi@gmail.com"}]}"#,
        )
        .unwrap();
        assert_eq!(list.into_data().unwrap()[0].nama, "Andi");

        let err: Envelope<()> =
            serde_json::from_str(r#"{"status":"error","message":"Format email tidak valid"}"#).unwrap();
        assert_eq!(err.message(), Some("Format email tidak valid"));
    }
}
