//! Demo: tune a predictor on synthetic survey responses, then run one
//! predict / record / retrain cycle.
//!
//! Set `RUST_LOG=survey_classifier=debug` to see every grid-search combination.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use survey_classifier::affiliation::SURVEY_ANSWER_OPTIONS;
use survey_classifier::{
    Affiliation, Dataset, MetricsSummary, NUM_AFFILIATIONS, Predictor, SURVEY_FEATURES,
    TrainerConfig, validate_answers,
};

const SAMPLES: usize = 400;
const SEED: u64 = 7;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run() {
        tracing::error!(%err, "demo failed");
        std::process::exit(1);
    }
}

fn run() -> survey_classifier::Result<()> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut rows = Vec::with_capacity(SAMPLES);
    let mut labels = Vec::with_capacity(SAMPLES);
    for _ in 0..SAMPLES {
        let label = rng.gen_range(0..NUM_AFFILIATIONS);
        rows.push(respondent(&mut rng, label));
        labels.push(label);
    }
    let dataset = Dataset::from_rows(&rows, &labels, NUM_AFFILIATIONS)?;

    let mut predictor = Predictor::new(dataset, TrainerConfig::survey())?;
    print_stats(predictor.model().metrics());

    let truth = rng.gen_range(0..NUM_AFFILIATIONS);
    let answers = respondent(&mut rng, truth);
    validate_answers(&answers)?;
    let predicted = Affiliation::try_from(predictor.predict(&answers)?)?;
    println!("The system predicts your party affiliation as follows: {predicted}");
    println!("Reported affiliation: {}", Affiliation::try_from(truth)?);

    predictor.record(&answers, truth)?;
    print_stats(predictor.model().metrics());
    Ok(())
}

/// One synthetic answer vector whose answers lean by party.
fn respondent(rng: &mut StdRng, label: usize) -> Vec<f64> {
    let mut answers = Vec::with_capacity(SURVEY_FEATURES);
    for (q, &options) in SURVEY_ANSWER_OPTIONS.iter().enumerate() {
        // Each party prefers a different answer on a different subset of questions.
        let preferred = (q + label * 2) % options + 1;
        let answer = if rng.gen_bool(0.7) {
            preferred
        } else {
            rng.gen_range(1..=options)
        };
        answers.push(answer as f64);
    }
    answers
}

fn print_stats(metrics: MetricsSummary) {
    let pct = |v: f64| format!("{:.0}%", v * 100.0);
    println!();
    println!("The following are the current model performance metrics:");
    println!("Accuracy: {}", pct(metrics.accuracy));
    println!("Recall: {}", pct(metrics.recall));
    println!("Precision: {}", pct(metrics.precision));
    println!("F1 Score: {}", pct(metrics.f1));
    println!();
}
