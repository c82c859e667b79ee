//! Test fixtures for engine integration tests.

use std::sync::Arc;
use std::time::Duration;

use rouge::composer::MockGenerator;
use rouge::engine::{EngineServices, EngineSettings, QueryEngine};
use rouge::intent::{Category, ClarificationType, Domain, IntentRecord, MockClassifier};
use rouge::notes::InMemoryNoteStore;
use rouge::retrieval::{EvidenceItem, MockReranker, MockVectorSearch};

pub const SESSION_ID: &str = "session-under-test";

pub const LIPSTICK_LIST: [&str; 3] = ["MAC Ruby Woo", "Lakme Forever Matte", "Sugar Matte"];

/// Answer text that shows [`LIPSTICK_LIST`] as a numbered list.
pub const LIPSTICK_LIST_ANSWER: &str = "Here are three reds worth a look:\n\
1. **MAC Ruby Woo** - the classic blue red\n\
2. Lakme Forever Matte - budget friendly\n\
3. Sugar Matte - comfortable for long days\n\
\n\
Want me to go deeper on any of these?";

pub struct IntentBuilder {
    record: IntentRecord,
}

impl IntentBuilder {
    pub fn new(domain: Domain) -> Self {
        Self {
            record: IntentRecord::new(domain),
        }
    }

    pub fn product_question() -> Self {
        Self::new(Domain::ProductSpecific).retrieval()
    }

    pub fn retrieval(mut self) -> Self {
        self.record.needs_retrieval = true;
        self
    }

    pub fn ordinal(mut self) -> Self {
        self.record.has_ordinal = true;
        self.record.needs_context = true;
        self
    }

    pub fn followup(mut self) -> Self {
        self.record.is_followup = true;
        self.record.needs_context = true;
        self
    }

    pub fn product(mut self, name: &str) -> Self {
        self.record.detected_product = Some(name.to_string());
        self
    }

    pub fn brand(mut self, name: &str) -> Self {
        self.record.detected_brand = Some(name.to_string());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.record.detected_category = Some(category);
        self
    }

    pub fn clarify(mut self, kind: ClarificationType) -> Self {
        self.record.needs_clarification = true;
        self.record.clarification_type = Some(kind);
        self
    }

    pub fn build(self) -> IntentRecord {
        self.record
    }
}

/// A review section for `label`.
pub fn section(label: &str, section: &str, content: &str, score: f32) -> EvidenceItem {
    let id = format!(
        "{}-{}",
        label.to_lowercase().replace(' ', "-"),
        section.to_lowercase().replace(' ', "-")
    );
    EvidenceItem::new(id, label, section, content, score)
}

/// Three sections of one product review.
pub fn review(label: &str) -> Vec<EvidenceItem> {
    vec![
        section(label, "Overview", &format!("{label} is a long wearing matte."), 0.81),
        section(
            label,
            "Real Concerns",
            "Can feel dry by the afternoon and transfers onto cups.",
            0.74,
        ),
        section(label, "What I LOVE", "The color payoff in a single swipe.", 0.69),
    ]
}

/// Wires mock services into a [`QueryEngine`] and keeps handles for assertions.
pub struct Harness {
    pub engine: QueryEngine,
    pub classifier: Arc<MockClassifier>,
    pub search: Arc<MockVectorSearch>,
    pub reranker: Arc<MockReranker>,
    pub generator: Arc<MockGenerator>,
    pub notes: Arc<InMemoryNoteStore>,
}

pub struct HarnessBuilder {
    classifier: MockClassifier,
    search: MockVectorSearch,
    reranker: MockReranker,
    generator: MockGenerator,
    notes: InMemoryNoteStore,
    settings: EngineSettings,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            classifier: MockClassifier::new(),
            search: MockVectorSearch::new(),
            reranker: MockReranker::new(),
            generator: MockGenerator::default(),
            notes: InMemoryNoteStore::new(),
            settings: EngineSettings::default().with_call_timeout(Duration::from_secs(2)),
        }
    }
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classifier(mut self, classifier: MockClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn search(mut self, search: MockVectorSearch) -> Self {
        self.search = search;
        self
    }

    pub fn reranker(mut self, reranker: MockReranker) -> Self {
        self.reranker = reranker;
        self
    }

    pub fn generator(mut self, generator: MockGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn notes(mut self, notes: InMemoryNoteStore) -> Self {
        self.notes = notes;
        self
    }

    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.settings = self.settings.with_call_timeout(timeout);
        self
    }

    pub fn canned_off_topic(mut self) -> Self {
        self.settings = self.settings.with_canned_off_topic(true);
        self
    }

    pub fn build(self) -> Harness {
        let classifier = Arc::new(self.classifier);
        let search = Arc::new(self.search);
        let reranker = Arc::new(self.reranker);
        let generator = Arc::new(self.generator);
        let notes = Arc::new(self.notes);

        let engine = QueryEngine::new(
            EngineServices {
                classifier: classifier.clone(),
                search: search.clone(),
                reranker: reranker.clone(),
                generator: generator.clone(),
                notes: notes.clone(),
            },
            self.settings,
        );

        Harness {
            engine,
            classifier,
            search,
            reranker,
            generator,
            notes,
        }
    }
}

impl Harness {
    /// Seeds the session with [`LIPSTICK_LIST`] as if it had just been shown.
    pub async fn seed_lipstick_list(&self) {
        self.engine
            .sessions()
            .record_reference_list(
                SESSION_ID,
                LIPSTICK_LIST.iter().map(|s| s.to_string()).collect(),
                Some("lipstick".to_string()),
            )
            .await;
    }
}
