//! Minimal client for a Confluent-compatible schema registry.

use crate::error::WatcherError;
use apache_avro::Schema;
use serde::Deserialize;
use tracing::instrument;

/// A schema as registered under a subject.
#[derive(Debug, Clone)]
pub struct RegisteredSchema {
    pub subject: String,
    /// Globally unique id; this is what goes into the record framing.
    pub id: u32,
    pub version: u32,
    pub schema: Schema,
}

/// Response of `GET /subjects/{subject}/versions/{version}`.
#[derive(Debug, Deserialize)]
struct SubjectVersion {
    subject: String,
    id: u32,
    version: u32,
    schema: String,
    /// Omitted by the registry for Avro, which is the default type.
    #[serde(rename = "schemaType", default)]
    schema_type: Option<String>,
}

#[derive(Clone)]
pub struct SchemaRegistryClient {
    base_url: String,
    /// `user:password`, as used by Confluent Cloud API keys.
    basic_auth: Option<(String, String)>,
    client: reqwest::Client,
}

impl std::fmt::Debug for SchemaRegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistryClient")
            .field("base_url", &self.base_url)
            .field("basic_auth", &self.basic_auth.as_ref().map(|(user, _)| user))
            .finish_non_exhaustive()
    }
}

impl SchemaRegistryClient {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            basic_auth: None,
            client,
        }
    }

    /// Authenticate with `user_info` of the form `user:password`.
    ///
    /// A value without a `:` is taken to be a user name with an empty password.
    pub fn with_basic_auth(mut self, user_info: &str) -> Self {
        let (user, password) = user_info.split_once(':').unwrap_or((user_info, ""));
        self.basic_auth = Some((user.to_string(), password.to_string()));
        self
    }

    /// Looks up the latest schema registered under `subject`.
    #[instrument(skip(self))]
    pub async fn latest_version(&self, subject: &str) -> Result<RegisteredSchema, WatcherError> {
        let fail = |reason: String| WatcherError::SchemaRegistry {
            subject: subject.to_string(),
            reason,
        };

        let url = format!("{}/subjects/{}/versions/latest", self.base_url, subject);
        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.schemaregistry.v1+json");
        if let Some((user, password)) = &self.basic_auth {
            request = request.basic_auth(user, Some(password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| fail(format!("send request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(fail(format!("status {status}: {body}")));
        }

        let version: SubjectVersion = response
            .json()
            .await
            .map_err(|e| fail(format!("parse response: {e}")))?;

        if let Some(schema_type) = version.schema_type.as_deref()
            && schema_type != "AVRO"
        {
            return Err(fail(format!("expected an AVRO schema, found {schema_type}")));
        }

        let schema =
            Schema::parse_str(&version.schema).map_err(|e| fail(format!("parse schema: {e}")))?;

        tracing::info!(
            subject = %version.subject,
            id = version.id,
            version = version.version,
            "loaded latest schema"
        );

        Ok(RegisteredSchema {
            subject: version.subject,
            id: version.id,
            version: version.version,
            schema,
        })
    }
}
