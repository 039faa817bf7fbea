//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::draft::{ChatClient, OpenAiChat, SenderProfile};
use crate::ocr::{OcrEngine, TesseractCli, EngineVersion};

/// Shared application state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    engine: Arc<dyn OcrEngine>,
    versions: Arc<dyn EngineVersion>,
    chat: Option<Arc<dyn ChatClient>>,
    sender: SenderProfile,
}

impl AppState {
    /// Create state backed by the Tesseract CLI named in the config
    pub fn new(config: Config) -> Self {
        let tesseract = Arc::new(TesseractCli::new(
            config.ocr.command.clone(),
            config.ocr.language.clone(),
            config.ocr.timeout,
        ));
        let state = Self::with_engine(config, tesseract.clone(), tesseract);

        let draft = state.config().draft.clone();
        let Some(api_key) = draft.api_key.as_deref() else {
            tracing::info!("No chat API key configured, email drafting disabled");
            return state;
        };
        match OpenAiChat::new(&draft.api_base, api_key, &draft.model, draft.timeout) {
            Ok(chat) => state.with_chat(Arc::new(chat)),
            Err(e) => {
                tracing::warn!("Failed to build chat client, email drafting disabled: {}", e);
                state
            }
        }
    }

    /// Create state with explicit engine and version implementations
    pub fn with_engine(
        config: Config,
        engine: Arc<dyn OcrEngine>,
        versions: Arc<dyn EngineVersion>,
    ) -> Self {
        let sender = SenderProfile {
            name: config.draft.sender_name.clone(),
            about: config.draft.sender_about.clone(),
        };
        Self {
            inner: Arc::new(AppStateInner {
                config,
                engine,
                versions,
                chat: None,
                sender,
            }),
        }
    }

    /// Enable email drafting through `chat`
    pub fn with_chat(self, chat: Arc<dyn ChatClient>) -> Self {
        let inner = &self.inner;
        Self {
            inner: Arc::new(AppStateInner {
                config: inner.config.clone(),
                engine: inner.engine.clone(),
                versions: inner.versions.clone(),
                chat: Some(chat),
                sender: inner.sender.clone(),
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the OCR engine
    pub fn engine(&self) -> &dyn OcrEngine {
        self.inner.engine.as_ref()
    }

    /// Get the engine version source
    pub fn versions(&self) -> &dyn EngineVersion {
        self.inner.versions.as_ref()
    }

    /// Get the chat client, if drafting is enabled
    pub fn chat(&self) -> Option<&dyn ChatClient> {
        self.inner.chat.as_deref()
    }

    /// Get the profile drafts are written for
    pub fn sender(&self) -> &SenderProfile {
        &self.inner.sender
    }
}
