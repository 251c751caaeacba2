use std::env;
use std::path::PathBuf;

use semdex_core::config::{Config, EngineConfig};
use semdex_core::types::SearchMode;
use semdex_engine::SearchSession;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {} <index|query|stats> [args...]", prog);
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn default_artifact(config: &Config) -> PathBuf {
    PathBuf::from(
        config
            .get::<String>("data.artifact_path")
            .unwrap_or_else(|_| "index.semdex.json".to_string()),
    )
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let engine_config = EngineConfig::from_config(&config);
    let (cmd, args) = parse_args();

    match cmd.as_str() {
        "index" => {
            let Some(text_path) = args.first().map(PathBuf::from) else {
                eprintln!("Usage: semdex index <text-file> [artifact]");
                std::process::exit(1);
            };
            let artifact = args
                .get(1)
                .map(PathBuf::from)
                .unwrap_or_else(|| default_artifact(&config));

            let text = std::fs::read_to_string(&text_path)?;
            let mut session = SearchSession::with_config(engine_config);
            session.setup_index(&text)?;

            match session.mode() {
                Some(SearchMode::Embedding) => {
                    session.save_index(&artifact)?;
                    let stats = session.stats();
                    let chunks = stats.map(|s| s.num_chunks).unwrap_or(0);
                    println!("✅ Indexed {} chunks into {}", chunks, artifact.display());
                }
                Some(SearchMode::Keyword) => {
                    println!("⚠️  Embedding model unavailable; nothing to persist.");
                    println!("   Queries against this document need a live session in keyword mode.");
                }
                None => {
                    println!("Nothing to index: {} is empty.", text_path.display());
                }
            }
        }
        "query" => {
            let (Some(artifact), Some(query_text)) = (args.first(), args.get(1)) else {
                eprintln!("Usage: semdex query <artifact> \"<query>\" [top-k]");
                std::process::exit(1);
            };
            let top_k = args
                .get(2)
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(5);

            let mut session = SearchSession::with_config(engine_config);
            session.load_index(&PathBuf::from(artifact))?;
            if session.mode() == Some(SearchMode::Keyword) {
                println!("⚠️  Embedding model unavailable; answering with keyword overlap.");
            }

            let results = session.search(query_text, top_k)?;
            println!("🔍 Found {} results for: \"{}\"", results.len(), query_text);
            for r in &results {
                println!(
                    "\n  {}. score={:.4}  relevance={}",
                    r.rank, r.score, r.relevance
                );
                println!("     📝 {}", r.chunk_text);
            }
        }
        "stats" => {
            let Some(artifact) = args.first() else {
                eprintln!("Usage: semdex stats <artifact>");
                std::process::exit(1);
            };
            let mut session = SearchSession::with_config(engine_config);
            session.load_index(&PathBuf::from(artifact))?;
            if let Some(stats) = session.stats() {
                println!("📊 {}", artifact);
                println!("  chunks:           {}", stats.num_chunks);
                println!("  total words:      {}", stats.total_words);
                println!("  avg words/chunk:  {:.1}", stats.avg_chunk_words);
                println!("  provider:         {}", stats.provider);
                println!("  backend:          {}", stats.backend);
            }
        }
        _ => {
            eprintln!("Unknown command: {}", cmd);
            std::process::exit(1);
        }
    }
    Ok(())
}
