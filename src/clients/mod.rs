pub mod fal;
pub mod goodfire;
pub mod supabase;

pub use fal::{FalClient, GeneratedImage, ImageResult};
pub use goodfire::{ChatMessage, Feature, GoodfireClient, Variant};
pub use supabase::SupabaseClient;

use crate::error::ApiError;

/// Convert a non-2xx response into an error carrying status and body.
pub(crate) async fn api_error(service: &'static str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ApiError::Status {
        service,
        status,
        body,
    }
    .into()
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
