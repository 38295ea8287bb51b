//! AI summarization configuration and request assembly.
//!
//! The store holds and persists `AiConfig`; the summarization collaborator
//! reads it together with the block sequence. Only the provider-agnostic
//! part lives here: which provider is active, whether it has a key, and the
//! ordered parts of the request. Transport is the host's business.

use crate::ingest::parse_data_uri;
use crate::model::{Block, BlockKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "Extract and summarize the key information from the following content:";

/// Image MIME type assumed when a payload does not declare one.
const FALLBACK_IMAGE_MIME: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiError {
    #[error("the canvas is empty; nothing to summarize")]
    EmptyCanvas,
    #[error("no API key configured for {0}")]
    MissingApiKey(String),
    #[error("unsupported AI provider `{0}`")]
    UnsupportedProvider(String),
}

// ─── Providers ───────────────────────────────────────────────────────────

/// Providers the UI knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Google,
    SiliconFlow,
    Aliyun,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Google, Provider::SiliconFlow, Provider::Aliyun];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "google" => Some(Provider::Google),
            "siliconflow" => Some(Provider::SiliconFlow),
            "aliyun" => Some(Provider::Aliyun),
            _ => None,
        }
    }

    /// Key under `AiConfig::providers`.
    pub fn name(self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::SiliconFlow => "siliconflow",
            Provider::Aliyun => "aliyun",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Google => "Google Gemini",
            Provider::SiliconFlow => "SiliconFlow",
            Provider::Aliyun => "Aliyun Bailian",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Google => "gemini-2.5-flash",
            Provider::SiliconFlow => "deepseek-ai/DeepSeek-R1-0528-Qwen3-8B",
            Provider::Aliyun => "qwen3-coder-plus",
        }
    }
}

// ─── Config ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    pub providers: BTreeMap<String, ProviderConfig>,
    pub system_prompt: String,
    pub selected_provider: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        let providers = Provider::ALL
            .iter()
            .map(|p| {
                (
                    p.name().to_string(),
                    ProviderConfig {
                        api_key: String::new(),
                        model: p.default_model().to_string(),
                    },
                )
            })
            .collect();
        Self {
            providers,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            selected_provider: Provider::SiliconFlow.name().to_string(),
        }
    }
}

/// Whole-field replacement; `providers` is replaced as one map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AiConfigPatch {
    pub providers: Option<BTreeMap<String, ProviderConfig>>,
    pub system_prompt: Option<String>,
    pub selected_provider: Option<String>,
}

impl AiConfig {
    pub fn merge(&mut self, patch: AiConfigPatch) {
        if let Some(providers) = patch.providers {
            self.providers = providers;
        }
        if let Some(prompt) = patch.system_prompt {
            self.system_prompt = prompt;
        }
        if let Some(selected) = patch.selected_provider {
            self.selected_provider = selected;
        }
    }

    /// The selected provider and its settings, provided it has a key.
    pub fn active_provider(&self) -> Result<(Provider, &ProviderConfig), AiError> {
        let name = self.selected_provider.as_str();
        let provider = Provider::from_name(name)
            .ok_or_else(|| AiError::UnsupportedProvider(name.to_string()))?;
        match self.providers.get(name) {
            Some(cfg) if !cfg.api_key.trim().is_empty() => Ok((provider, cfg)),
            _ => Err(AiError::MissingApiKey(provider.display_name().to_string())),
        }
    }
}

// ─── Request ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PromptPart {
    Text { text: String },
    Image { mime: String, data: String },
}

/// Provider-agnostic summarization request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub provider: String,
    pub model: String,
    pub system_prompt: String,
    pub parts: Vec<PromptPart>,
}

impl SummaryRequest {
    /// Assemble a request from the canvas in sequence order.
    pub fn build(blocks: &[Arc<Block>], config: &AiConfig) -> Result<Self, AiError> {
        if blocks.is_empty() {
            return Err(AiError::EmptyCanvas);
        }
        let (provider, cfg) = config.active_provider()?;

        let parts = blocks.iter().filter_map(|b| prompt_part(b)).collect();

        Ok(Self {
            provider: provider.name().to_string(),
            model: cfg.model.clone(),
            system_prompt: config.system_prompt.clone(),
            parts,
        })
    }
}

fn prompt_part(block: &Block) -> Option<PromptPart> {
    match &block.kind {
        BlockKind::Text { content, .. } => Some(PromptPart::Text {
            text: content.clone(),
        }),
        BlockKind::Image { image_data, .. } => match parse_data_uri(image_data) {
            Ok(uri) => {
                let mime = if uri.mime.is_empty() {
                    FALLBACK_IMAGE_MIME
                } else {
                    uri.mime
                };
                Some(PromptPart::Image {
                    mime: mime.to_string(),
                    data: uri.payload.to_string(),
                })
            }
            Err(e) => {
                log::debug!("leaving image {} out of the summary: {e}", block.id);
                None
            }
        },
    }
}
