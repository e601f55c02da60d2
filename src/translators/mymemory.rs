use crate::config::TranslatorConfig;
use crate::error::TranslationError;
use crate::translators::{normalize_language, Translator};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_status: serde_json::Value,
    #[serde(default)]
    response_data: Option<ResponseData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    translated_text: String,
}

/// Translator backed by the MyMemory public API
///
/// MyMemory reports failures inside a 200 response (`responseStatus` carries
/// the real status), so both layers are checked.
pub struct MyMemoryTranslator {
    client: Client,
    base_url: String,
    source_language: String,
}

impl MyMemoryTranslator {
    pub fn new(config: &TranslatorConfig) -> Result<Self, TranslationError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                TranslationError::Unavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            source_language: normalize_language(&config.source_language),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(base_url: String, source_language: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            source_language: normalize_language(source_language),
        }
    }
}

/// `responseStatus` is a number on success but sometimes a string on error
fn status_code(value: &serde_json::Value) -> Option<u16> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl Translator for MyMemoryTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        let langpair = format!(
            "{}|{}",
            self.source_language,
            normalize_language(target_language)
        );
        debug!("Translating {} chars ({})", text.len(), langpair);

        let response = self
            .client
            .get(format!("{}/get", self.base_url))
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::Api {
                status: status.as_u16(),
            });
        }

        let body: MyMemoryResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::Malformed(e.to_string()))?;

        match status_code(&body.response_status) {
            Some(200) => {}
            Some(status) => return Err(TranslationError::Api { status }),
            None => {
                return Err(TranslationError::Malformed(
                    "missing responseStatus".to_string(),
                ))
            }
        }

        let data = body
            .response_data
            .ok_or_else(|| TranslationError::Malformed("missing responseData".to_string()))?;

        Ok(html_escape::decode_html_entities(&data.translated_text).into_owned())
    }

    fn translator_name(&self) -> &str {
        "mymemory"
    }
}
