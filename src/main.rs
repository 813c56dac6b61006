use std::path::PathBuf;

use clap::Parser;
use topic_lda::{DocumentInput, LdaConfig, StopwordDictionary, TopicModel};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Fit an LDA topic model over a JSON array of {id, text} documents",
    long_about = None
)]
struct Args {
    path: PathBuf,
    #[clap(
        long,
        help = "JSON settings file ({numberTopics, sweeps, language, stem, displayingStopWords})"
    )]
    settings: Option<PathBuf>,
    #[clap(short, long)]
    topics: Option<usize>,
    #[clap(short, long)]
    sweeps: Option<usize>,
    #[clap(short, long)]
    language: Option<String>,
    #[clap(long, help = "Stem non-stopwords with the language's Snowball stemmer")]
    stem: bool,
    #[clap(long, help = "Extra stopwords, as a JSON object keyed by word or a JSON array")]
    stopwords: Option<PathBuf>,
    #[clap(long)]
    seed: Option<u64>,
    #[clap(long, help = "Include stopwords in the corpus vocabulary table")]
    show_stopwords: bool,
    #[clap(long, help = "Print ranked documents and vocabulary per topic as JSON")]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("topic_lda=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let raw = std::fs::read_to_string(&args.path)?;
    let documents: Vec<DocumentInput> = serde_json::from_str(&raw)?;
    let dictionary = match &args.stopwords {
        Some(path) => Some(StopwordDictionary::from_json_file(path)?),
        None => None,
    };

    let model = TopicModel::fit(config, documents, dictionary)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&model.reorder_documents())?);
        return Ok(());
    }

    println!(
        "📊 {} documents, {} distinct words, {} sweeps",
        model.documents().len(),
        model.vocabulary().vocabulary_size(),
        model.complete_sweeps()
    );
    for (topic, words) in model.display_topic_words()?.iter().enumerate() {
        println!("   Topic {:<2} {}", topic, words);
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<LdaConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.settings {
        Some(path) => LdaConfig::from_json_file(path)?,
        None => LdaConfig::default(),
    };
    if let Some(topics) = args.topics {
        config.number_topics = topics;
    }
    if let Some(sweeps) = args.sweeps {
        config.sweeps = sweeps;
    }
    if let Some(language) = &args.language {
        config.language = language.clone();
    }
    if args.stem {
        config.stem = true;
    }
    if args.show_stopwords {
        config.displaying_stop_words = true;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    Ok(config)
}
