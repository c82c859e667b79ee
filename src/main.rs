//! Rouge interactive console.

use std::sync::Arc;

use mimalloc::MiMalloc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;

use rouge::composer::GenaiGenerator;
use rouge::config::Config;
use rouge::engine::{EngineError, EngineServices, EngineSettings, QueryEngine, TurnOutcome};
use rouge::intent::GenaiClassifier;
use rouge::notes::FileNoteStore;
use rouge::retrieval::{
    HttpEmbedder, HttpReranker, LexicalReranker, QdrantSearch, RerankService,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const PROMPT: &str = "you> ";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!(
        r#"
 ____   ___  _   _  ____ _____
|  _ \ / _ \| | | |/ ___| ____|
| |_) | | | | | | | |  _|  _|
|  _ <| |_| | |_| | |_| | |___
|_| \_\\___/ \___/ \____|_____|

    ASK. ROUTE. RETRIEVE.
"#
    );

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!(
        qdrant_url = %config.qdrant_url,
        collection = %config.collection,
        classifier_model = %config.classifier_model,
        generation_model = %config.generation_model,
        rerank = config.rerank_url.is_some(),
        "Rouge starting"
    );

    let engine = build_engine(&config)?;
    let session_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(%session_id, "session opened");

    println!("Commands: exit | reset | context\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(PROMPT.as_bytes()).await?;
        stdout.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };
        let input = line.trim();

        match input.to_lowercase().as_str() {
            "" => continue,
            "exit" | "quit" | "q" => break,
            "reset" => {
                engine.reset_session(&session_id).await;
                println!("Context cleared.\n");
                continue;
            }
            "context" => {
                let state = engine.session_snapshot(&session_id).await;
                println!("{}\n", state.summarize());
                continue;
            }
            _ => {}
        }

        match engine.handle_turn(&session_id, input).await {
            Ok(outcome) => print_outcome(&outcome),
            Err(EngineError::InvalidQuery { reason }) => println!("{reason}\n"),
            Err(e) => {
                tracing::error!(error = %e, "turn failed");
                println!("Sorry, I couldn't put an answer together just now. Please try again.\n");
            }
        }
    }

    tracing::info!(%session_id, "Rouge shutdown complete");
    Ok(())
}

fn build_engine(config: &Config) -> anyhow::Result<QueryEngine> {
    let http = reqwest::Client::builder()
        .timeout(config.call_timeout)
        .build()?;
    let llm = genai::Client::default();

    let embedder = HttpEmbedder::new(
        http.clone(),
        &config.embedding_url,
        &config.embedding_model,
        config.embedding_api_key.clone(),
    );
    let search = QdrantSearch::new(&config.qdrant_url, &config.collection, embedder)?;

    let reranker: Arc<dyn RerankService> = match &config.rerank_url {
        Some(url) => Arc::new(HttpReranker::new(
            http,
            url,
            &config.rerank_model,
            config.rerank_api_key.clone(),
        )),
        None => {
            tracing::warn!("No ROUGE_RERANK_URL configured, using lexical reranker");
            Arc::new(LexicalReranker::new())
        }
    };

    let services = EngineServices {
        classifier: Arc::new(GenaiClassifier::new(llm.clone(), &config.classifier_model)),
        search: Arc::new(search),
        reranker,
        generator: Arc::new(GenaiGenerator::new(llm, &config.generation_model)),
        notes: Arc::new(FileNoteStore::new(config.notes_path.clone())),
    };

    Ok(QueryEngine::new(services, EngineSettings::from(config)))
}

fn print_outcome(outcome: &TurnOutcome) {
    println!("\nrouge> {}\n", outcome.answer);

    if outcome.is_degraded() {
        let codes: Vec<&str> = outcome.degradations.iter().map(|d| d.code()).collect();
        tracing::debug!(turn = outcome.turn, degradations = ?codes, "turn degraded");
    }
}
