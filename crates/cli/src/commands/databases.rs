//! `recall databases`: Print every accessible database.

use recall_workspace::{ContentLoader, LoadEvent};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let loader = ContentLoader::new(super::require_workspace(&config)?);

    let (sections, failures) = loader
        .load_tables(&mut |event| {
            if let LoadEvent::Started { title, .. } = event {
                eprintln!("Processing database: {title}");
            }
        })
        .await;

    for failure in &failures {
        eprintln!("  Skipped '{}': {}", failure.title, failure.reason);
    }

    let content = recall_workspace::aggregate::<String, &str>(&sections, &[]);
    if content.is_empty() && failures.is_empty() {
        println!("No accessible databases found.");
    } else if content.is_empty() {
        return Err(format!("no databases could be loaded ({} failed)", failures.len()).into());
    } else {
        println!("{}", content.text);
    }

    Ok(())
}
