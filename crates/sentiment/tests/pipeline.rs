use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use proptest::prelude::*;

use revsense_sentiment::{
    AnalysisResult, InMemoryModelStore, InMemoryTrainingLog, ModelState, ModelStatus, ModelStore, RunStatus,
    SentimentAnalyzer, SentimentError, SentimentLabel, SentimentModel, TrainingConfig, TrainingCorpus, TrainingLog,
    fit_model,
};

fn reference_corpus(copies: usize) -> TrainingCorpus {
    let base = [
        ("I love this, excellent!", SentimentLabel::Positive),
        ("Terrible, broke immediately", SentimentLabel::Negative),
        ("It's fine, average", SentimentLabel::Neutral),
    ];
    TrainingCorpus::from_pairs((0..copies).flat_map(|_| base))
}

fn trained_analyzer() -> SentimentAnalyzer<InMemoryModelStore, InMemoryTrainingLog> {
    let analyzer = SentimentAnalyzer::new(
        TrainingConfig::default(),
        InMemoryModelStore::new(),
        InMemoryTrainingLog::new(),
    );
    analyzer.train(&reference_corpus(5), true).unwrap();
    analyzer
}

/// Store whose saves can be switched to fail.
#[derive(Default)]
struct FlakyStore {
    inner: InMemoryModelStore,
    fail_saves: AtomicBool,
    corrupt: bool,
}

impl ModelStore for FlakyStore {
    fn save(&self, model: &SentimentModel) -> Result<(), SentimentError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(SentimentError::Persistence("disk full".to_string()));
        }
        self.inner.save(model)
    }

    fn load(&self) -> Result<Option<SentimentModel>, SentimentError> {
        if self.corrupt {
            return Err(SentimentError::Persistence("checksum mismatch".to_string()));
        }
        self.inner.load()
    }

    fn location(&self) -> String {
        "flaky".to_string()
    }

    fn exists(&self) -> bool {
        self.corrupt || self.inner.exists()
    }
}

#[test]
fn fallback_for_empty_missing_and_blank_text() {
    let analyzer = trained_analyzer();
    assert_eq!(analyzer.analyze(""), AnalysisResult::fallback());
    assert_eq!(analyzer.analyze(None), AnalysisResult::fallback());
    assert_eq!(analyzer.analyze(" \n\t  "), AnalysisResult::fallback());

    let fallback = AnalysisResult::fallback();
    assert_eq!(fallback.sentiment_label, SentimentLabel::Neutral);
    assert_eq!(fallback.sentiment_score, 0.0);
    assert_eq!(fallback.confidence_score, 0.5);
    assert_eq!(
        (fallback.positive_score, fallback.negative_score, fallback.neutral_score),
        (0.33, 0.33, 0.34)
    );
}

#[test]
fn identical_corpus_and_seed_give_identical_metrics() {
    let config = TrainingConfig::default();
    let a = fit_model(&config, &TrainingCorpus::seed()).unwrap();
    let b = fit_model(&config, &TrainingCorpus::seed()).unwrap();

    let (ma, mb) = (a.metrics().unwrap(), b.metrics().unwrap());
    assert_eq!(ma.accuracy, mb.accuracy);
    assert_eq!(ma.precision, mb.precision);
    assert_eq!(ma.recall, mb.recall);
    assert_eq!(ma.f1, mb.f1);
    assert_eq!(ma, mb);
    assert_eq!(a.feature_count(), b.feature_count());
    assert_eq!(
        a.predict_proba("great quality but slow delivery"),
        b.predict_proba("great quality but slow delivery")
    );
}

#[test]
fn training_without_force_is_idempotent() {
    let analyzer = trained_analyzer();
    let before = analyzer.model_info().model_version;

    let run = analyzer.train(&reference_corpus(5), false).unwrap();
    assert_eq!(run.status, RunStatus::AlreadyTrained);
    assert_eq!(run.sample_count, 0);
    assert!(run.metrics.is_some());
    assert_eq!(analyzer.model_info().model_version, before);
    assert_eq!(run.model_version, before);
}

#[test]
fn five_examples_are_not_enough() {
    let analyzer = SentimentAnalyzer::new(
        TrainingConfig::default(),
        InMemoryModelStore::new(),
        InMemoryTrainingLog::new(),
    );
    let corpus = TrainingCorpus::from_pairs(reference_corpus(2).iter().take(5).map(|e| (e.text.as_str(), e.label)));
    let err = analyzer.train(&corpus, true).unwrap_err();
    assert!(matches!(err, SentimentError::InsufficientData { found: 5, required: 10 }));

    let run = analyzer.log().latest().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
}

#[test]
fn batch_failures_are_isolated() {
    let analyzer = trained_analyzer();
    let results = analyzer.batch_analyze(["I love this, excellent!", "", "Terrible, broke immediately"]);
    assert_eq!(results.len(), 3);
    assert!(!results[0].is_fallback());
    assert!(results[1].is_fallback());
    assert!(!results[2].is_fallback());
    assert_eq!(results[2].sentiment_label, SentimentLabel::Negative);
}

#[test]
fn end_to_end_positive_review() {
    let analyzer = trained_analyzer();
    let result = analyzer.analyze("I love this, excellent!");
    assert_eq!(result.sentiment_label, SentimentLabel::Positive);
    assert!(result.positive_score > result.negative_score);
    assert!(result.sentiment_score > 0.0);
    assert_eq!(result.confidence_score, result.positive_score);
}

#[test]
fn reanalysis_is_bit_identical() {
    let analyzer = trained_analyzer();
    let text = "Terrible, broke immediately. Not what I expected";
    let a = analyzer.analyze(text);
    let b = analyzer.analyze(text);
    assert_eq!(a.sentiment_score.to_bits(), b.sentiment_score.to_bits());
    assert_eq!(a.confidence_score.to_bits(), b.confidence_score.to_bits());
    assert_eq!(a, b);
}

#[test]
fn failed_save_keeps_the_active_model() {
    let store = Arc::new(FlakyStore::default());
    let analyzer = SentimentAnalyzer::new(TrainingConfig::default(), Arc::clone(&store), InMemoryTrainingLog::new());
    analyzer.train(&reference_corpus(5), true).unwrap();
    let before = analyzer.model_info().model_version;

    store.fail_saves.store(true, Ordering::SeqCst);
    let err = analyzer.train(&reference_corpus(6), true).unwrap_err();
    assert!(matches!(err, SentimentError::Persistence(_)));

    assert_eq!(analyzer.model_info().model_version, before);
    assert_eq!(analyzer.state(), ModelState::Active);
    assert_eq!(analyzer.analyze("I love this, excellent!").sentiment_label, SentimentLabel::Positive);

    let runs = analyzer.log().list().unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[1].status, RunStatus::Failed);
    assert!(runs[1].notes.contains("disk full"));
}

#[test]
fn open_trains_when_no_artifact_exists() {
    let analyzer = SentimentAnalyzer::open(
        TrainingConfig::default(),
        InMemoryModelStore::new(),
        InMemoryTrainingLog::new(),
        &reference_corpus(5),
    );
    assert_eq!(analyzer.state(), ModelState::Active);
    assert!(analyzer.store().exists());

    let info = analyzer.model_info();
    assert_eq!(info.status, ModelStatus::Trained);
    assert_eq!(info.algorithm, "Multinomial Naive Bayes with TF-IDF");
    assert!(info.feature_count.unwrap() > 0);
    assert_eq!(info.artifact_location, "memory");
}

#[test]
fn open_loads_an_existing_artifact_without_training() {
    let store = InMemoryModelStore::new();
    let model = fit_model(&TrainingConfig::default(), &reference_corpus(5)).unwrap();
    let version = model.version();
    store.save(&model).unwrap();

    let analyzer = SentimentAnalyzer::open(
        TrainingConfig::default(),
        store,
        InMemoryTrainingLog::new(),
        &TrainingCorpus::default(),
    );
    assert_eq!(analyzer.state(), ModelState::Active);
    assert_eq!(analyzer.model_info().model_version, Some(version));
    assert!(analyzer.log().list().unwrap().is_empty());
}

#[test]
fn corrupt_artifact_triggers_retraining() {
    let store = FlakyStore {
        corrupt: true,
        ..FlakyStore::default()
    };
    let analyzer = SentimentAnalyzer::open(
        TrainingConfig::default(),
        store,
        InMemoryTrainingLog::new(),
        &reference_corpus(5),
    );
    assert_eq!(analyzer.state(), ModelState::Active);
    assert_eq!(analyzer.log().latest().unwrap().unwrap().status, RunStatus::Completed);
}

#[test]
fn unavailable_when_loading_and_training_both_fail() {
    let analyzer = SentimentAnalyzer::open(
        TrainingConfig::default(),
        InMemoryModelStore::new(),
        InMemoryTrainingLog::new(),
        &reference_corpus(1),
    );
    assert_eq!(analyzer.state(), ModelState::Unavailable);
    assert_eq!(analyzer.model_info().status, ModelStatus::NotTrained);
    assert!(analyzer.analyze("I love this, excellent!").is_fallback());
    assert_eq!(
        analyzer.try_analyze("I love this, excellent!"),
        Err(SentimentError::ModelUnavailable)
    );
}

#[test]
fn inference_during_retrain_sees_one_whole_model() {
    const TEXT: &str = "I love this, excellent!";
    let analyzer = trained_analyzer();
    let old = analyzer.analyze(TEXT);
    let old_version = analyzer.model_info().model_version.unwrap();
    assert_eq!(old.sentiment_label, SentimentLabel::Positive);

    let flipped = TrainingCorpus::from_pairs((0..5).flat_map(|_| {
        [
            ("I love this, excellent!", SentimentLabel::Negative),
            ("Terrible, broke immediately", SentimentLabel::Positive),
            ("It's fine, average", SentimentLabel::Neutral),
        ]
    }));

    let done = AtomicBool::new(false);
    let start = std::sync::Barrier::new(5);
    let (done, start) = (&done, &start);
    let shared = &analyzer;
    let (observed, new) = std::thread::scope(|scope| {
        let readers: Vec<_> = (0..4)
            .map(move |_| {
                scope.spawn(move || {
                    let inference = shared.inference();
                    let mut seen = Vec::new();
                    start.wait();
                    loop {
                        let finished = done.load(Ordering::SeqCst);
                        let version = inference.slot().current().map(|m| m.version());
                        let result = inference.try_analyze(TEXT).unwrap();
                        seen.push((version, result));
                        if finished {
                            break;
                        }
                    }
                    seen
                })
            })
            .collect();

        start.wait();
        let run = analyzer.train(&flipped, true).unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        done.store(true, Ordering::SeqCst);

        let observed: Vec<_> = readers.into_iter().flat_map(|r| r.join().unwrap()).collect();
        (observed, analyzer.analyze(TEXT))
    });

    let new_version = analyzer.model_info().model_version.unwrap();
    assert_ne!(new_version, old_version);
    assert_eq!(new.sentiment_label, SentimentLabel::Negative);
    assert!(!observed.is_empty());

    for (version, result) in &observed {
        assert!(*version == Some(old_version) || *version == Some(new_version));
        assert!(!result.is_fallback());
        assert!(*result == old || *result == new, "mixed result: {result:?}");
        let sum = result.positive_score + result.negative_score + result.neutral_score;
        assert!((sum - 1.0).abs() < 1e-9);
    }
    // Every reader's last call started after the publish.
    assert!(observed.iter().any(|(_, r)| *r == new));
}

fn seed_analyzer() -> &'static SentimentAnalyzer<InMemoryModelStore, InMemoryTrainingLog> {
    static ANALYZER: OnceLock<SentimentAnalyzer<InMemoryModelStore, InMemoryTrainingLog>> = OnceLock::new();
    ANALYZER.get_or_init(|| {
        SentimentAnalyzer::open(
            TrainingConfig::default(),
            InMemoryModelStore::new(),
            InMemoryTrainingLog::new(),
            &TrainingCorpus::seed(),
        )
    })
}

fn review_text() -> impl Strategy<Value = String> {
    let words = prop::sample::select(vec![
        "great", "quality", "terrible", "broke", "love", "okay", "average", "price", "slow", "delivery",
        "excellent", "waste", "money", "fine", "!", ",", "http://x.io", "@shop", "#deal",
    ]);
    prop_oneof![
        prop::collection::vec(words, 0..12).prop_map(|w| w.join(" ")),
        ".{0,120}",
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn scores_are_bounded_and_sum_to_one(text in review_text()) {
        let result = seed_analyzer().analyze(text.as_str());
        prop_assert!((0.0..=1.0).contains(&result.confidence_score));
        prop_assert!((-1.0..=1.0).contains(&result.sentiment_score));
        for score in [result.positive_score, result.negative_score, result.neutral_score] {
            prop_assert!((0.0..=1.0).contains(&score));
        }
        let sum = result.positive_score + result.negative_score + result.neutral_score;
        prop_assert!((sum - 1.0).abs() < 1e-6, "sum was {}", sum);
    }

    #[test]
    fn analysis_is_deterministic(text in review_text()) {
        let analyzer = seed_analyzer();
        prop_assert_eq!(analyzer.analyze(text.as_str()), analyzer.analyze(text.as_str()));
    }
}
