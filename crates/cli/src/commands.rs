//! Subcommand implementations. Results are written to `out` as JSON.

use std::io::Write;

use anyhow::{Context, anyhow};
use serde::Serialize;
use tracing::warn;

use revsense_core::ReviewId;
use revsense_infra::{
    Backfill, DisplayHint, FileModelStore, JsonFileReviewSentimentStore, JsonReviewSource, JsonlTrainingLog,
    ReviewSentiment, ReviewSentimentStore, RevsenseConfig, load_corpus,
};
use revsense_sentiment::{
    AnalysisResult, ModelInfo, SentimentAnalyzer, SentimentSummary, TrainingCorpus, TrainingRun,
};

use crate::cli::Command;

type FileAnalyzer = SentimentAnalyzer<FileModelStore, JsonlTrainingLog>;

/// Sample shown after training so operators can eyeball the model.
const SAMPLE_REVIEW: &str = "This product is absolutely amazing! Great quality and fast delivery.";

#[derive(Serialize)]
struct TrainOutput<'a> {
    run: &'a TrainingRun,
    model: ModelInfo,
    sample: Analyzed<'a>,
}

#[derive(Serialize)]
struct Analyzed<'a> {
    text: &'a str,
    result: AnalysisResult,
}

#[derive(Serialize)]
struct ShowOutput<'a> {
    #[serde(flatten)]
    record: &'a ReviewSentiment,
    display_hint: DisplayHint,
}

fn analyzer(config: &RevsenseConfig) -> FileAnalyzer {
    SentimentAnalyzer::new(
        config.training.clone(),
        FileModelStore::new(&config.model_path),
        JsonlTrainingLog::new(&config.training_log_path),
    )
}

fn results_store(config: &RevsenseConfig) -> anyhow::Result<JsonFileReviewSentimentStore> {
    JsonFileReviewSentimentStore::open(&config.results_path).context("open review sentiment results")
}

fn print_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Execute one subcommand against the configured data files.
pub fn run<W: Write>(config: &RevsenseConfig, command: Command, out: &mut W) -> anyhow::Result<()> {
    match command {
        Command::Train { retrain, corpus } => {
            let corpus = match corpus {
                Some(path) => load_corpus(&path)?,
                None => TrainingCorpus::seed(),
            };
            let analyzer = analyzer(config);
            if !retrain {
                if let Err(err) = analyzer.load() {
                    warn!(error = %err, "stored model unusable, training a new one");
                }
            }
            let run = analyzer
                .train(&corpus, retrain)
                .context("sentiment model training failed")?;
            let output = TrainOutput {
                run: &run,
                model: analyzer.model_info(),
                sample: Analyzed {
                    text: SAMPLE_REVIEW,
                    result: analyzer.analyze(SAMPLE_REVIEW),
                },
            };
            print_json(out, &output)
        }
        Command::Backfill { reviews, force, limit } => {
            let analyzer = analyzer(config);
            analyzer.load_or_train(&TrainingCorpus::seed());
            let store = results_store(config)?;
            let report = Backfill { force, limit }
                .run(&JsonReviewSource::new(reviews), &store, &analyzer.inference())
                .context("backfill failed")?;
            print_json(out, &report)
        }
        Command::Analyze { texts } => {
            let analyzer = analyzer(config);
            analyzer.load_or_train(&TrainingCorpus::seed());
            for (text, result) in texts.iter().zip(analyzer.batch_analyze(texts.iter().map(String::as_str))) {
                print_json(out, &Analyzed { text, result })?;
            }
            Ok(())
        }
        Command::Info => {
            let analyzer = analyzer(config);
            if let Err(err) = analyzer.load() {
                warn!(error = %err, "stored model unusable");
            }
            print_json(out, &analyzer.model_info())
        }
        Command::Show { review_id } => show(config, review_id, out),
        Command::Summary => {
            let records = results_store(config)?.list()?;
            let summary = SentimentSummary::from_results(records.iter().map(|r| &r.result));
            print_json(out, &summary)
        }
    }
}

fn show<W: Write>(config: &RevsenseConfig, review_id: ReviewId, out: &mut W) -> anyhow::Result<()> {
    let store = results_store(config)?;
    let record = store
        .get(&review_id)?
        .ok_or_else(|| anyhow!("no sentiment stored for review {review_id}"))?;
    print_json(
        out,
        &ShowOutput {
            display_hint: record.display_hint(),
            record: &record,
        },
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::Value;

    use super::*;

    fn config(dir: &tempfile::TempDir) -> RevsenseConfig {
        RevsenseConfig::with_data_dir(dir.path().to_path_buf())
    }

    fn run_json(config: &RevsenseConfig, command: Command) -> Vec<Value> {
        let mut out = Vec::new();
        run(config, command, &mut out).unwrap();
        serde_json::Deserializer::from_slice(&out)
            .into_iter::<Value>()
            .map(Result::unwrap)
            .collect()
    }

    fn write_corpus(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("corpus.json");
        let base = [
            ("I love this, excellent!", "positive"),
            ("Terrible, broke immediately", "negative"),
            ("It's fine, average", "neutral"),
        ];
        let examples: Vec<Value> = (0..5)
            .flat_map(|_| base)
            .map(|(text, label)| serde_json::json!({"text": text, "label": label}))
            .collect();
        fs::write(&path, serde_json::to_vec(&examples).unwrap()).unwrap();
        path
    }

    #[test]
    fn train_then_train_again_reports_already_trained() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let corpus = write_corpus(&dir);

        let first = run_json(&config, Command::Train { retrain: false, corpus: Some(corpus.clone()) });
        assert_eq!(first[0]["run"]["status"], "completed");
        assert_eq!(first[0]["model"]["status"], "trained");

        let second = run_json(&config, Command::Train { retrain: false, corpus: Some(corpus.clone()) });
        assert_eq!(second[0]["run"]["status"], "already_trained");
        assert_eq!(second[0]["run"]["sample_count"], 0);

        let third = run_json(&config, Command::Train { retrain: true, corpus: Some(corpus) });
        assert_eq!(third[0]["run"]["status"], "completed");
        assert_ne!(third[0]["model"]["model_version"], first[0]["model"]["model_version"]);
    }

    #[test]
    fn training_failure_is_an_error_and_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let corpus = dir.path().join("tiny.json");
        fs::write(&corpus, r#"[{"text":"great","label":"positive"}]"#).unwrap();

        let mut out = Vec::new();
        let err = run(&config, Command::Train { retrain: true, corpus: Some(corpus) }, &mut out).unwrap_err();
        assert!(format!("{err:#}").contains("insufficient training data"));

        let log = fs::read_to_string(&config.training_log_path).unwrap();
        assert!(log.contains("\"failed\""));
    }

    #[test]
    fn info_without_a_model_reports_not_trained() {
        let dir = tempfile::tempdir().unwrap();
        let info = run_json(&config(&dir), Command::Info);
        assert_eq!(info[0]["status"], "not_trained");
        assert_eq!(info[0]["artifact_exists"], false);
        assert_eq!(info[0]["algorithm"], "Multinomial Naive Bayes with TF-IDF");
    }

    #[test]
    fn backfill_show_and_summary_work_together() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        run_json(&config, Command::Train { retrain: false, corpus: Some(write_corpus(&dir)) });

        let (happy, angry) = (ReviewId::new(), ReviewId::new());
        let reviews = dir.path().join("reviews.json");
        fs::write(
            &reviews,
            serde_json::json!([
                {"review_id": happy, "text": "I love this, excellent!"},
                {"review_id": angry, "text": "Terrible, broke immediately"},
            ])
            .to_string(),
        )
        .unwrap();

        let report = run_json(&config, Command::Backfill { reviews: reviews.clone(), force: false, limit: None });
        assert_eq!(report[0]["created"], 2);

        let shown = run_json(&config, Command::Show { review_id: happy });
        assert_eq!(shown[0]["sentiment_label"], "positive");
        assert_eq!(shown[0]["display_hint"], "success");

        let summary = run_json(&config, Command::Summary);
        assert_eq!(summary[0]["total"], 2);
        assert_eq!(summary[0]["counts"]["negative"], 1);
        assert_eq!(summary[0]["percentages"]["positive"], 50.0);
    }

    #[test]
    fn show_unknown_review_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        assert!(run(&config(&dir), Command::Show { review_id: ReviewId::new() }, &mut out).is_err());
    }

    #[test]
    fn analyze_prints_one_result_per_text() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        run_json(&config, Command::Train { retrain: false, corpus: Some(write_corpus(&dir)) });

        let results = run_json(
            &config,
            Command::Analyze {
                texts: vec!["I love this, excellent!".to_string(), "   ".to_string()],
            },
        );
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["result"]["sentiment_label"], "positive");
        assert_eq!(results[1]["result"]["confidence_score"], 0.5);
    }
}
