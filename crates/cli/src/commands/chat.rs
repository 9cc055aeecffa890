//! `ragchat chat` — Interactive or single-message chat mode.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use ragchat_agent::{MessagePipeline, PipelineResult};
use ragchat_config::{AppConfig, ConfigError, MemoryConfig};
use ragchat_core::message::{Message, Role};
use ragchat_memory::{InMemoryContextStore, TextChunker};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::warn;

const TIPS: &str = "\
  Tips:
    - Questions are answered using loaded context and general knowledge
    - 'history' shows the conversation so far
    - 'clear' starts a fresh transcript
    - 'exit' or Ctrl+D quits";

pub async fn run(
    message: Option<String>,
    context_files: Vec<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    eprintln!("  Initializing chat system...");
    let mut pipeline = match MessagePipeline::from_config(&config) {
        Ok(pipeline) => pipeline,
        Err(ConfigError::MissingApiKey) => {
            print_key_help();
            return Err("No API key found. See above for setup instructions.".into());
        }
        Err(e) => return Err(format!("Error initializing chat system: {e}").into()),
    };

    let mut documents = 0;
    if config.memory.enabled {
        let store = load_context_store(&config.memory, &context_files).await;
        documents = store.len().await;
        pipeline.initialize(Arc::new(store));
    }

    if let Some(msg) = message {
        let result = pipeline.process_message(&msg).await;
        println!("{}", result.response);
        print_sources(&result);
    } else {
        print_banner(&config, documents);
        interactive(&pipeline).await?;
    }

    pipeline.cleanup();
    Ok(())
}

async fn interactive(pipeline: &MessagePipeline) -> Result<(), Box<dyn std::error::Error>> {
    let mut transcript = Transcript::default();
    let mut lines = BufReader::new(io::stdin()).lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Input::Empty => {}
            Input::Exit => break,
            Input::Help => println!("{TIPS}\n"),
            Input::Clear => {
                transcript.clear();
                println!("  Transcript cleared.\n");
            }
            Input::History => {
                if transcript.is_empty() {
                    println!("  (no messages yet)\n");
                } else {
                    println!("{}", transcript.render());
                }
            }
            Input::Message(text) => {
                transcript.push(Message::user(&text));

                eprint!("  ...");
                let result = pipeline.process_message(&text).await;
                eprint!("\r     \r");

                println!();
                for line in result.response.lines() {
                    println!("  Assistant > {line}");
                }
                print_sources(&result);
                println!();

                transcript.push(Message::assistant(result.response));
            }
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

/// Load `memory.documents` plus any `--context` files into a fresh store.
///
/// Unreadable files are skipped with a warning.
async fn load_context_store(memory: &MemoryConfig, extra: &[PathBuf]) -> InMemoryContextStore {
    let store = InMemoryContextStore::new()
        .with_max_results(memory.max_results)
        .with_chunker(TextChunker::new(memory.chunk_size, memory.chunk_overlap));

    for path in memory.documents.iter().chain(extra) {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable context file");
                continue;
            }
        };

        if let Err(e) = store.add_document(&text, &path.display().to_string()).await {
            warn!(path = %path.display(), error = %e, "Skipping context file");
        }
    }

    store
}

/// What the user typed, interpreted.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Empty,
    Exit,
    Help,
    Clear,
    History,
    Message(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    match line {
        "" => Input::Empty,
        "exit" | "quit" | "/exit" | "/quit" | ":q" => Input::Exit,
        "help" | "/help" => Input::Help,
        "clear" | "/clear" => Input::Clear,
        "history" | "/history" => Input::History,
        _ => Input::Message(line.to_string()),
    }
}

/// The linear record of the current chat session.
#[derive(Debug, Default)]
struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    fn clear(&mut self) {
        self.messages.clear();
    }

    fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for message in &self.messages {
            let who = match message.role() {
                Role::User => "You",
                Role::Assistant => "Assistant",
                Role::System => "System",
                Role::Tool => "Tool",
            };
            for line in message.content().lines() {
                out.push_str(&format!("  {who:>9} > {line}\n"));
            }
        }
        out
    }
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

fn print_sources(result: &PipelineResult) {
    if result.source_chunks.is_empty() {
        return;
    }
    println!("  Sources:");
    for (i, chunk) in result.source_chunks.iter().enumerate() {
        let preview: String = chunk.content.chars().take(80).collect();
        let preview = preview.replace('\n', " ");
        match &chunk.source {
            Some(source) => println!("    [{}] {source}: {preview}", i + 1),
            None => println!("    [{}] {preview}", i + 1),
        }
    }
}

fn print_banner(config: &AppConfig, documents: usize) {
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║          ragchat — Interactive Mode          ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.provider.name);
    println!("  Model:     {}", config.agent.model);
    if config.memory.enabled {
        println!("  Context:   {documents} snippet(s) loaded");
    } else {
        println!("  Context:   disabled");
    }
    println!();
    println!("{TIPS}");
    println!();
}

fn print_key_help() {
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    GROQ_API_KEY=gsk_...      (recommended)");
    eprintln!("    RAGCHAT_API_KEY=...       (generic)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_path().display());
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_commands_and_messages() {
        assert_eq!(parse_input("   "), Input::Empty);
        assert_eq!(parse_input("quit"), Input::Exit);
        assert_eq!(parse_input(" :q "), Input::Exit);
        assert_eq!(parse_input("/clear"), Input::Clear);
        assert_eq!(parse_input("help"), Input::Help);
        assert_eq!(parse_input("history"), Input::History);
        assert_eq!(
            parse_input("  what is clear?  "),
            Input::Message("what is clear?".into())
        );
    }

    #[test]
    fn transcript_renders_in_order_and_clears() {
        let mut transcript = Transcript::default();
        transcript.push(Message::user("Hello"));
        transcript.push(Message::assistant("Hi there\nHow can I help?"));

        let rendered = transcript.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("You > Hello"));
        assert!(lines[1].ends_with("Assistant > Hi there"));
        assert!(lines[2].ends_with("Assistant > How can I help?"));

        transcript.clear();
        assert!(transcript.is_empty());
    }

    #[tokio::test]
    async fn context_store_loads_files_and_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.md");
        tokio::fs::write(&notes, "Paris is the capital of France").await.unwrap();

        let memory = MemoryConfig {
            documents: vec![notes],
            ..MemoryConfig::default()
        };
        let store = load_context_store(&memory, &[dir.path().join("missing.md")]).await;
        assert_eq!(store.len().await, 1);

        let expected = dir.path().join("notes.md").display().to_string();
        let results = store.search("capital of France", 1).await;
        assert_eq!(results[0].1.source.as_deref(), Some(expected.as_str()));
    }
}
