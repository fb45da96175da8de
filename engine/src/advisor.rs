//! Advisor
//!
//! Ties retrieval, prompt composition and the completion call together. One
//! `answer` call is one independent request: validate, retrieve context,
//! render the prompt, send a single user message, return the first choice.

use crate::config::{Config, RetrievalSource};
use crate::llm::{self, CompletionRequest, CompletionSettings, LLMProvider};
use crate::prompt::{self, PromptInput, QueryFields};
use crate::retriever::{Context, DirectoryRetriever, Retriever};
use crate::secrets::SecretString;
use async_trait::async_trait;
use sdk::errors::AdvisorError;
use sdk::handle::{AdvisorHandle, AdvisorHandleImpl};
use sdk::types::{Advice, AdvisoryRequest};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Per-deployment knobs for the advisor
#[derive(Debug, Clone)]
pub struct AdvisorOptions {
    /// Model identifier sent with every completion request
    pub model: String,

    /// Which text is matched against the corpus
    pub retrieval_source: RetrievalSource,

    /// Answer with empty context instead of failing when the corpus is unreadable
    pub degrade_on_read_error: bool,
}

impl AdvisorOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            retrieval_source: RetrievalSource::default(),
            degrade_on_read_error: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm.model.clone(),
            retrieval_source: config.corpus.retrieval_source,
            degrade_on_read_error: config.corpus.degrade_on_read_error,
        }
    }
}

pub struct Advisor {
    retriever: Arc<dyn Retriever>,
    provider: Arc<dyn LLMProvider>,
    options: AdvisorOptions,
}

impl Advisor {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        provider: Arc<dyn LLMProvider>,
        options: AdvisorOptions,
    ) -> Self {
        Self {
            retriever,
            provider,
            options,
        }
    }

    /// Wire up the production advisor: directory corpus plus the remote
    /// completion service.
    ///
    /// # Errors
    ///
    /// Fails when the corpus directory is missing or the HTTP client cannot
    /// be built.
    pub fn from_config(config: &Config, api_key: SecretString) -> Result<Self, AdvisorError> {
        let retriever = DirectoryRetriever::open(&config.corpus.dir)?;
        let settings = CompletionSettings::from_config(&config.llm, api_key);
        let provider = llm::build_provider(&settings)?;

        tracing::info!(
            corpus = %config.corpus.dir.display(),
            provider = provider.name(),
            model = %config.llm.model,
            "Advisor ready"
        );

        Ok(Self::new(
            Arc::new(retriever),
            provider,
            AdvisorOptions::from_config(config),
        ))
    }

    pub fn options(&self) -> &AdvisorOptions {
        &self.options
    }

    /// Wrap this advisor in a handle for the transports
    pub fn into_handle(self) -> AdvisorHandle {
        AdvisorHandle::new(Arc::new(self))
    }

    /// Answer the four raw form fields.
    ///
    /// Fields are used as given; call `AdvisoryRequest::validate` first if
    /// they came from an untrusted source.
    pub async fn answer_fields(
        &self,
        question: &str,
        region: &str,
        temperature: &str,
        climate: &str,
    ) -> Result<String, AdvisorError> {
        let fields = QueryFields::new(question, region, temperature, climate);
        Ok(self.answer_query(&fields).await?.answer)
    }

    /// Validate and answer a request
    pub async fn answer(&self, request: &AdvisoryRequest) -> Result<Advice, AdvisorError> {
        request.validate()?;
        self.answer_query(&QueryFields::from_request(request)).await
    }

    async fn answer_query(&self, fields: &QueryFields<'_>) -> Result<Advice, AdvisorError> {
        if fields.question.trim().is_empty() {
            return Err(AdvisorError::EmptyQuestion);
        }

        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!(
            "advise",
            %request_id,
            provider = self.provider.name(),
            model = %self.options.model
        );

        async {
            let context = self
                .context_or_degraded(fields, self.options.retrieval_source)
                .await?;
            let prompt = self.compose_prompt(&context.joined(), fields);
            let prompt_chars = prompt.chars().count();
            tracing::debug!(context_documents = context.len(), prompt_chars, "Prompt composed");

            let request = CompletionRequest::single_user_message(&self.options.model, prompt);
            let started = Instant::now();
            let completion = self.provider.complete(&request).await?;

            tracing::info!(
                context_documents = context.len(),
                prompt_chars,
                latency_ms = started.elapsed().as_millis() as u64,
                finish_reason = completion.finish_reason.as_deref().unwrap_or("unknown"),
                "Answered question"
            );

            Ok::<_, AdvisorError>(Advice::new(completion.text, context.keys()))
        }
        .instrument(span)
        .await
    }

    async fn context_or_degraded(
        &self,
        fields: &QueryFields<'_>,
        source: RetrievalSource,
    ) -> Result<Context, AdvisorError> {
        match self.context_for(fields, source).await {
            Ok(context) => Ok(context),
            Err(AdvisorError::CorpusRead(msg)) if self.options.degrade_on_read_error => {
                tracing::warn!("Corpus unreadable, answering without context: {}", msg);
                Ok(Context::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Context for `fields`, matched against the text `source` selects
    pub async fn context_for(
        &self,
        fields: &QueryFields<'_>,
        source: RetrievalSource,
    ) -> Result<Context, AdvisorError> {
        self.retrieve(fields.retrieval_text(source)).await
    }

    /// Context for an arbitrary text, matched as-is
    pub async fn retrieve(&self, text: impl Into<String>) -> Result<Context, AdvisorError> {
        let retriever = Arc::clone(&self.retriever);
        let text = text.into();

        tokio::task::spawn_blocking(move || retriever.select(&text))
            .await
            .map_err(|e| AdvisorError::CorpusRead(format!("retrieval task failed: {}", e)))?
    }

    /// The prompt sent for `fields` with the given context
    pub fn compose_prompt(&self, context: &str, fields: &QueryFields<'_>) -> String {
        prompt::render_prompt(&PromptInput {
            context,
            fields: *fields,
        })
    }
}

#[async_trait]
impl AdvisorHandleImpl for Advisor {
    async fn advise(&self, request: AdvisoryRequest) -> Result<Advice, AdvisorError> {
        self.answer(&request).await
    }
}
