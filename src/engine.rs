//! Process-wide pipeline state: scrape once, index once, answer many.
//!
//! The corpus and its index are built lazily on first use behind a
//! build-once guard: concurrent first queries serialize on the lock, the
//! loser of the race observes the winner's finished build, and nothing
//! scrapes twice. `reset` is the only invalidation; there is no TTL.

use std::sync::Mutex;

use crate::config::ScrapeConfig;
use crate::llm::Synthesizer;
use crate::normalize::{normalize, NormalizeOpts};
use crate::scrape::corpus::{build_corpus, ScrapeError};
use crate::semantic::{CorpusIndex, Embedder, EmbeddingError, IndexError};

/// How many chunks are retrieved per query.
const RETRIEVE_K: usize = 2;

/// How much of the normalized corpus the front end previews.
pub const PREVIEW_CHARS: usize = 1000;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("scrape failed: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Where the raw corpus text comes from.
///
/// Production uses [`ScrapeSource`]; tests substitute stubs.
pub trait CorpusSource: Send + Sync {
    fn build_corpus(&self) -> Result<String, ScrapeError>;
}

/// The live scrape pipeline as a corpus source.
pub struct ScrapeSource {
    config: ScrapeConfig,
}

impl ScrapeSource {
    pub fn new(config: ScrapeConfig) -> Self {
        Self { config }
    }
}

impl CorpusSource for ScrapeSource {
    fn build_corpus(&self) -> Result<String, ScrapeError> {
        build_corpus(&self.config)
    }
}

struct EngineState {
    normalized: String,
    index: CorpusIndex,
}

pub struct Engine {
    source: Box<dyn CorpusSource>,
    embedder: Box<dyn Embedder>,
    synthesizer: Box<dyn Synthesizer>,
    state: Mutex<Option<EngineState>>,
}

impl Engine {
    pub fn new(
        source: Box<dyn CorpusSource>,
        embedder: Box<dyn Embedder>,
        synthesizer: Box<dyn Synthesizer>,
    ) -> Self {
        Self {
            source,
            embedder,
            synthesizer,
            state: Mutex::new(None),
        }
    }

    /// Answer a question about the scraped corpus.
    ///
    /// Retrieval failures propagate; synthesis failures are converted to
    /// a user-visible HTML error fragment, never a hard failure.
    pub fn answer(&self, question: &str) -> Result<String, EngineError> {
        let context = {
            let mut guard = self.lock_state()?;
            let state = self.ensure_ready(&mut guard)?;

            let query_vec = self.embedder.embed(question)?;
            let chunks = state.index.search(&query_vec, RETRIEVE_K)?;
            chunks.join("\n")
        };

        match self.synthesizer.synthesize(&context, question) {
            Ok(html) => Ok(html),
            Err(err) => {
                log::error!("answer synthesis failed: {err}");
                Ok(format!("<p>Error generating response: {err}</p>"))
            }
        }
    }

    /// First `PREVIEW_CHARS` characters of the normalized corpus.
    pub fn corpus_preview(&self) -> Result<String, EngineError> {
        let mut guard = self.lock_state()?;
        let state = self.ensure_ready(&mut guard)?;

        Ok(state.normalized.chars().take(PREVIEW_CHARS).collect())
    }

    /// Whether the corpus and index have been built yet.
    pub fn is_ready(&self) -> bool {
        self.state
            .lock()
            .ok()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Eagerly build the corpus and index.
    pub fn warm_up(&self) -> Result<(), EngineError> {
        let mut guard = self.lock_state()?;
        self.ensure_ready(&mut guard).map(|_| ())
    }

    /// Drop the cached corpus and index; the next query rebuilds.
    pub fn reset(&self) -> Result<(), EngineError> {
        let mut guard = self.lock_state()?;
        *guard = None;
        Ok(())
    }

    fn lock_state(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, Option<EngineState>>, EngineError> {
        self.state
            .lock()
            .map_err(|e| EngineError::Internal(format!("Lock poisoned: {}", e)))
    }

    fn ensure_ready<'a>(
        &self,
        guard: &'a mut Option<EngineState>,
    ) -> Result<&'a mut EngineState, EngineError> {
        if guard.is_none() {
            *guard = Some(self.build_state()?);
        }

        Ok(guard.as_mut().expect("state populated above"))
    }

    fn build_state(&self) -> Result<EngineState, EngineError> {
        log::info!("scraping fresh news data");

        let raw = self.source.build_corpus()?;
        let normalized = normalize(&raw, &NormalizeOpts::default());

        // The whole normalized corpus is embedded as a single chunk,
        // though the index accepts any ordered chunking.
        let index = CorpusIndex::build(vec![normalized.clone()], self.embedder.as_ref())?;

        log::info!("index built over {} chunk(s)", index.len());

        Ok(EngineState { normalized, index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        builds: Arc<AtomicUsize>,
    }

    impl CorpusSource for CountingSource {
        fn build_corpus(&self) -> Result<String, ScrapeError> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            // Widen the race window for the cache test
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok("HEADLINE: One CONTENT: prices rose sharply today".to_string())
        }
    }

    struct StubEmbedder;

    impl Embedder for StubEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(vec![1.0, 0.0, 0.0])
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    struct EchoSynthesizer;

    impl Synthesizer for EchoSynthesizer {
        fn synthesize(&self, context: &str, _question: &str) -> anyhow::Result<String> {
            Ok(format!("<p>{context}</p>"))
        }
    }

    struct FailingSynthesizer;

    impl Synthesizer for FailingSynthesizer {
        fn synthesize(&self, _context: &str, _question: &str) -> anyhow::Result<String> {
            anyhow::bail!("boom")
        }
    }

    fn engine_with(synthesizer: Box<dyn Synthesizer>) -> (Arc<Engine>, Arc<AtomicUsize>) {
        let builds = Arc::new(AtomicUsize::new(0));
        let engine = Engine::new(
            Box::new(CountingSource {
                builds: builds.clone(),
            }),
            Box::new(StubEmbedder),
            synthesizer,
        );
        (Arc::new(engine), builds)
    }

    #[test]
    fn concurrent_first_queries_build_once() {
        let (engine, builds) = engine_with(Box::new(EchoSynthesizer));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let engine = engine.clone();
                std::thread::spawn(move || engine.answer("what rose?").unwrap())
            })
            .collect();

        let answers: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(answers[0], answers[1]);
    }

    #[test]
    fn answer_retrieves_normalized_context() {
        let (engine, _) = engine_with(Box::new(EchoSynthesizer));

        let answer = engine.answer("what rose?").unwrap();
        // context is the normalized corpus: lowercased, "prices" lemmatized
        assert!(answer.contains("price rose sharply today"), "{answer}");
    }

    #[test]
    fn synthesis_failure_becomes_error_fragment() {
        let (engine, _) = engine_with(Box::new(FailingSynthesizer));

        let answer = engine.answer("anything").unwrap();
        assert_eq!(answer, "<p>Error generating response: boom</p>");
    }

    #[test]
    fn preview_is_capped_and_cached() {
        let (engine, builds) = engine_with(Box::new(EchoSynthesizer));

        let preview = engine.corpus_preview().unwrap();
        assert!(preview.chars().count() <= PREVIEW_CHARS);
        assert!(engine.is_ready());

        engine.corpus_preview().unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reset_forces_rebuild() {
        let (engine, builds) = engine_with(Box::new(EchoSynthesizer));

        engine.warm_up().unwrap();
        engine.reset().unwrap();
        assert!(!engine.is_ready());

        engine.warm_up().unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }
}
