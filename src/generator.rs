use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::cache::GenerationCache;
use crate::error::GenerationResult;
use crate::llm::{ModelClient, prompt};
use crate::parser::{self, Identity};
use crate::question::{GenerationRequest, Question};

const MAX_CONCURRENT_GENERATIONS: usize = 4;

/// Prompt, model call, parse and cache, for one request at a time or a batch.
pub struct QuizGenerator<C> {
    client: C,
    cache: Arc<GenerationCache>,
}

impl<C: ModelClient> QuizGenerator<C> {
    pub fn new(client: C, cache: Arc<GenerationCache>) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &GenerationCache {
        &self.cache
    }

    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult<Arc<[Question]>> {
        self.run(request, true).await
    }

    /// Skips the cache read. A successful result replaces the cached entry.
    pub async fn regenerate(&self, request: &GenerationRequest) -> GenerationResult<Arc<[Question]>> {
        self.run(request, false).await
    }

    /// Results come back in the order of `requests`.
    pub async fn generate_many(
        &self,
        requests: &[GenerationRequest],
    ) -> Vec<GenerationResult<Arc<[Question]>>> {
        stream::iter(requests.iter().map(|request| self.generate(request)))
            .buffered(MAX_CONCURRENT_GENERATIONS)
            .collect()
            .await
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        read_cache: bool,
    ) -> GenerationResult<Arc<[Question]>> {
        request.validate()?;

        let identity = Identity::of(request);
        if read_cache {
            if let Some(entry) = self.cache.get(&identity) {
                debug!(%identity, "cache hit");
                return Ok(entry.questions);
            }
            debug!(%identity, "cache miss");
        }

        let prompt = prompt::build(&request.study_text, request.topic(), request.question_count);
        let raw = self
            .client
            .invoke(&request.credential, &prompt)
            .await
            .inspect_err(|err| warn!(%identity, %err, "model call failed"))?;

        let report = parser::parse_with_report(&raw, request.question_count)?;
        if report.questions.len() < request.question_count {
            info!(
                %identity,
                requested = request.question_count,
                parsed = report.questions.len(),
                skipped = report.skipped.len(),
                "model reply yielded fewer questions than requested"
            );
        }

        let questions: Arc<[Question]> = Arc::from(report.questions);
        self.cache.put(identity, Arc::clone(&questions));
        Ok(questions)
    }
}
