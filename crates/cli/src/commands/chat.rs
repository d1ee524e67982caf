//! `recall chat`: Interactive chat over selected workspace content.

use crate::prompt::Prompter;
use recall_agent::Session;
use recall_agent::session::{PREVIEW_CHARS, preview};
use recall_config::ConfigError;
use recall_core::identity::OwnerKey;
use recall_core::memory::MemoryStore;
use recall_core::provider::SUPPORTED_MODELS;
use recall_core::workspace::{PageSummary, WorkspaceProvider};
use recall_memory::InMemoryStore;
use recall_workspace::{AggregatedContent, ContentLoader, LoadEvent, parse_selection};
use std::io::Write;
use std::sync::Arc;
use tokio::io::AsyncBufRead;
use tracing::info;

/// Longest title shown in the page picker.
const TITLE_WIDTH: usize = 50;

/// Consecutive unreadable input lines tolerated before the chat ends.
const MAX_INPUT_ERRORS: usize = 3;

pub struct ChatOptions {
    pub model: Option<String>,
    pub name: Option<String>,
    pub offline_memory: bool,
    pub load_content: bool,
}

/// What one line typed at the chat prompt asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum ChatCommand {
    Quit,
    Memory,
    Clear,
    Reload,
    Content,
    Empty,
    Message(String),
}

impl ChatCommand {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match input.to_lowercase().as_str() {
            "quit" | "exit" | "bye" => Self::Quit,
            "memory" => Self::Memory,
            "clear" => Self::Clear,
            "reload" => Self::Reload,
            "content" => Self::Content,
            "" => Self::Empty,
            _ => Self::Message(input.to_string()),
        }
    }
}

pub async fn run(options: ChatOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config()?;

    if let Some(model) = options.model {
        config.completion.model = model;
        config.validate().map_err(|e| {
            eprintln!("  Supported models: {}", SUPPORTED_MODELS.join(", "));
            e
        })?;
    }

    // Completion and memory keys are fatal when missing
    let credentials = if options.offline_memory {
        config.require_offline_credentials()
    } else {
        config.require_credentials()
    };
    let credentials = credentials.inspect_err(|e| {
        if let ConfigError::MissingCredential { name } = e {
            super::explain_missing(name);
        }
    })?;

    let provider = recall_providers::build_provider(&config.completion, &credentials.completion_key)?;
    let memory: Arc<dyn MemoryStore> = match &credentials.memory_key {
        Some(key) => recall_memory::build_store(&config.memory, key)?,
        None => Arc::new(InMemoryStore::new()),
    };
    let workspace = super::connect_workspace(&config)?;

    println!();
    println!("  Welcome to notion-recall!");
    println!("  {}", "=".repeat(50));

    let mut prompter = Prompter::stdin();
    let owner = match options.name {
        Some(name) => OwnerKey::from_name(&name)?,
        None => match ask_owner(&mut prompter).await? {
            Some(owner) => owner,
            None => return Ok(()),
        },
    };
    println!(
        "\n  Hello {}! Your conversations are saved under ID: {owner}",
        owner.display_name()
    );

    let mut session = Session::from_config(provider, memory, owner, &config);
    info!(
        owner = %session.owner(),
        model = session.model(),
        offline_memory = options.offline_memory,
        "Chat session started"
    );

    if let (Some(workspace), true) = (&workspace, options.load_content) {
        load_content(&mut prompter, workspace, &mut session).await?;
    }

    print_banner(&session);
    chat_loop(&mut prompter, &mut session, workspace.as_ref()).await;

    Ok(())
}

/// Read and answer turns until the user quits or input ends. A failing
/// turn is reported and the loop goes on.
async fn chat_loop<R: AsyncBufRead + Unpin>(
    prompter: &mut Prompter<R>,
    session: &mut Session,
    workspace: Option<&Arc<dyn WorkspaceProvider>>,
) {
    let label = session.owner().display_name();
    let mut input_errors = 0;

    loop {
        let input = match prompter.ask(&format!("\n{label}: ")).await {
            Ok(Some(input)) => {
                input_errors = 0;
                input
            }
            Ok(None) => {
                println!();
                break;
            }
            Err(e) => {
                println!("  Error reading input: {e}");
                input_errors += 1;
                if input_errors >= MAX_INPUT_ERRORS {
                    break;
                }
                continue;
            }
        };

        match ChatCommand::parse(&input) {
            ChatCommand::Quit => {
                println!("  Goodbye! Your memories have been saved.");
                break;
            }
            ChatCommand::Empty => continue,
            ChatCommand::Memory => show_memories(session).await,
            ChatCommand::Clear => match session.clear().await {
                Ok(()) if session.has_content() => {
                    println!("  Memory cleared. Loaded content was stored again.")
                }
                Ok(()) => println!("  Memory cleared."),
                Err(e) => println!("  Error clearing memory: {e}"),
            },
            ChatCommand::Reload => match workspace {
                Some(workspace) => {
                    if let Err(e) = load_content(prompter, workspace, session).await {
                        println!("  Error reloading content: {e}");
                    }
                }
                None => println!("  Workspace not connected; nothing to reload."),
            },
            ChatCommand::Content => show_content(session),
            ChatCommand::Message(text) => {
                print!("Assistant: ");
                std::io::stdout().flush().ok();
                match session.respond(&text).await {
                    Ok(reply) => println!("{reply}"),
                    Err(e) => println!("Error generating response: {e}"),
                }
            }
        }
    }
}

async fn ask_owner<R: AsyncBufRead + Unpin>(
    prompter: &mut Prompter<R>,
) -> std::io::Result<Option<OwnerKey>> {
    loop {
        let Some(name) = prompter.ask("\n  Please enter your name: ").await? else {
            return Ok(None);
        };
        match OwnerKey::from_name(&name) {
            Ok(owner) => return Ok(Some(owner)),
            Err(e) => println!("  {e}."),
        }
    }
}

/// Ask what to load, load it, and hand it to the session.
async fn load_content<R: AsyncBufRead + Unpin>(
    prompter: &mut Prompter<R>,
    workspace: &Arc<dyn WorkspaceProvider>,
    session: &mut Session,
) -> std::io::Result<()> {
    let loader = ContentLoader::new(workspace.clone());

    println!("\n  Notion Content Selection");
    println!("  {}", "=".repeat(50));

    let answer = prompter
        .ask("\n  Load database content? (y/n): ")
        .await?
        .unwrap_or_default()
        .to_lowercase();
    let include_tables = matches!(answer.as_str(), "y" | "yes");

    let selected = select_pages(prompter, &loader).await?;

    if !include_tables && selected.is_empty() {
        println!("  No Notion content selected. Continuing without Notion content.");
        return Ok(());
    }

    println!("\n  Processing selected content...");
    let report = loader.load(include_tables, &selected, &mut print_progress).await;

    for failure in &report.failures {
        println!("  Skipped {} '{}': {}", failure.kind.as_str(), failure.title, failure.reason);
    }

    if report.content.is_empty() {
        println!("  No content was loaded. Make sure pages and databases are shared with your integration.");
        if let Err(e) = session.load_content(AggregatedContent::default()).await {
            println!("  Error storing content in memory: {e}");
        }
        return Ok(());
    }

    let chars = report.content.char_count;
    let table_present = report.content.table_present;
    match session.load_content(report.content).await {
        Ok(()) => println!("\n  Loaded {chars} characters from Notion into memory"),
        Err(e) => println!("\n  Loaded {chars} characters; error storing them in memory: {e}"),
    }
    println!("   - Databases: {}", if table_present { "yes" } else { "no" });
    println!("   - Pages: {}", report.pages.len());
    for page in &report.pages {
        println!("      • {}", page.title);
    }

    Ok(())
}

async fn select_pages<R: AsyncBufRead + Unpin>(
    prompter: &mut Prompter<R>,
    loader: &ContentLoader,
) -> std::io::Result<Vec<PageSummary>> {
    println!("\n  Checking available pages...");
    let pages = match loader.list_pages().await {
        Ok(pages) => pages,
        Err(e) => {
            println!("  Error getting pages: {e}");
            return Ok(Vec::new());
        }
    };
    if pages.is_empty() {
        println!("  No accessible pages found");
        return Ok(Vec::new());
    }

    println!("\n  Found {} accessible pages:", pages.len());
    println!("  {}", "-".repeat(40));
    for (i, page) in pages.iter().enumerate() {
        let title: String = page.title.chars().take(TITLE_WIDTH).collect();
        println!("  {:2}. {title}", i + 1);
    }
    println!("\n  Page selection:");
    println!("  • Enter page numbers (e.g., 1,3,5 or 1-5)");
    println!("  • Type 'all' to load all pages");
    println!("  • Type 'none' or press Enter to skip pages");

    loop {
        let Some(input) = prompter.ask("\n  Select pages to load: ").await? else {
            return Ok(Vec::new());
        };
        match parse_selection(&input, pages.len()) {
            Ok(indices) => {
                let selected: Vec<PageSummary> =
                    indices.into_iter().map(|i| pages[i].clone()).collect();
                if selected.is_empty() {
                    println!("  Skipping pages");
                } else {
                    println!("  Will load {} pages", selected.len());
                }
                return Ok(selected);
            }
            Err(e) => println!("  {e}"),
        }
    }
}

fn print_progress(event: LoadEvent) {
    match event {
        LoadEvent::Started {
            kind,
            index,
            total,
            title,
        } => println!("   Processing {} {index}/{total}: {title}", kind.as_str()),
        LoadEvent::Loaded { .. } => println!("   Loaded successfully"),
        LoadEvent::Failed { kind, reason, .. } => {
            println!("   Error loading {}: {reason}", kind.as_str())
        }
    }
}

fn print_banner(session: &Session) {
    println!();
    println!("  notion-recall ready! (User: {}, model: {})", session.owner(), session.model());
    if !session.has_content() {
        println!("  No Notion content loaded: answers come from general knowledge only.");
    }
    println!("  Commands:");
    println!("   • 'quit' - Exit");
    println!("   • 'memory' - Show conversation memories");
    println!("   • 'clear' - Clear all memories");
    println!("   • 'reload' - Reload Notion content");
    println!("   • 'content' - Show currently loaded content");
    println!("{}", "=".repeat(80));
}

async fn show_memories(session: &Session) {
    match session.recent_memories().await {
        Ok(memories) if memories.is_empty() => {
            println!("\n  No conversation memories found for your user ID.")
        }
        Ok(memories) => {
            println!("\n  Your recent conversation memories:");
            println!("  {}", "-".repeat(60));
            for (i, memory) in memories.iter().enumerate() {
                println!("  {}. {}", i + 1, preview(&memory.text, PREVIEW_CHARS));
            }
            println!("  {}", "-".repeat(60));
        }
        Err(e) => {
            println!("  Error retrieving memories: {e}");
            println!("  Check your memory API key and network connection.");
        }
    }
}

fn show_content(session: &Session) {
    let report = session.report();
    if report.is_empty() {
        println!("  No Notion content is currently loaded.");
        return;
    }

    println!("\n  Currently loaded Notion content:");
    println!("  {}", "=".repeat(50));
    println!("  Databases: {}", u8::from(report.table_present));
    println!("  Pages: {}", report.page_count);
    println!("  Total characters: {}", report.char_count);
    if !report.page_titles.is_empty() {
        println!("\n  Loaded pages:");
        for title in &report.page_titles {
            println!("   • {title}");
        }
    }
}
