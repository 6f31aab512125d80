use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;

/// Thin typed client over the Supabase REST (PostgREST) and storage-object
/// APIs. Construct with the service-role key for the write pipeline, or the
/// anon key for read-only browsing.
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl SupabaseClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: super::http_client(),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Select rows matching all `eq` filters, optionally ordered
    /// (PostgREST `order` syntax, e.g. `feature_strength.asc`).
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        order: Option<&str>,
    ) -> anyhow::Result<Vec<T>> {
        let mut query: Vec<(&str, String)> = vec![("select", "*".to_string())];
        for (column, value) in filters {
            query.push((*column, format!("eq.{value}")));
        }
        if let Some(order) = order {
            query.push(("order", order.to_string()));
        }

        let response = self
            .auth(self.client.get(self.rest_url(table)))
            .query(&query)
            .send()
            .await
            .with_context(|| format!("select from {table} failed"))?;

        if !response.status().is_success() {
            return Err(super::api_error("supabase", response).await);
        }

        response
            .json()
            .await
            .with_context(|| format!("select from {table} JSON decode failed"))
    }

    pub async fn select_eq<T: DeserializeOwned>(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> anyhow::Result<Vec<T>> {
        self.select(table, &[(column, value.to_string())], None).await
    }

    /// Insert one row and return the stored representation.
    pub async fn insert<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        self.write(table, body, None).await
    }

    /// Atomic find-or-create: insert one row, merging with the existing row
    /// on a `on_conflict` unique-column collision, and return whichever row
    /// now holds the key.
    pub async fn upsert<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        on_conflict: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        self.write(table, body, Some(on_conflict)).await
    }

    async fn write<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
        on_conflict: Option<&str>,
    ) -> anyhow::Result<T> {
        let mut request = self
            .auth(self.client.post(self.rest_url(table)))
            .json(body);
        request = match on_conflict {
            Some(column) => request
                .query(&[("on_conflict", column)])
                .header("Prefer", "resolution=merge-duplicates,return=representation"),
            None => request.header("Prefer", "return=representation"),
        };

        let response = request
            .send()
            .await
            .with_context(|| format!("insert into {table} failed"))?;

        if !response.status().is_success() {
            return Err(super::api_error("supabase", response).await);
        }

        let rows: Vec<T> = response
            .json()
            .await
            .with_context(|| format!("insert into {table} JSON decode failed"))?;
        rows.into_iter().next().ok_or_else(|| {
            StoreError::NoRowReturned {
                table: table.to_string(),
            }
            .into()
        })
    }

    /// Upload an object, overwriting any existing object under the same key.
    pub async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> anyhow::Result<()> {
        let response = self
            .auth(
                self.client
                    .post(format!("{}/storage/v1/object/{bucket}/{path}", self.base_url)),
            )
            .header("x-upsert", "true")
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .with_context(|| format!("upload to {bucket}/{path} failed"))?;

        if !response.status().is_success() {
            return Err(super::api_error("supabase storage", response).await);
        }
        Ok(())
    }

    /// Public URL for an object in a public bucket. Constructed locally,
    /// no round trip.
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{path}", self.base_url)
    }
}
