//! `recall pages`: List accessible pages.

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let workspace = super::require_workspace(&config)?;

    println!("Fetching accessible pages...");
    let pages = workspace.list_pages().await?;

    if pages.is_empty() {
        println!("  No accessible pages found!");
        println!("  Share pages with your integration first.");
        return Ok(());
    }

    println!("Found {} accessible page(s):", pages.len());
    println!("{}", "=".repeat(60));
    for (i, page) in pages.iter().enumerate() {
        println!("{:2}. {}", i + 1, page.title);
        println!("    Last edited: {}", page.last_edited_date());
        println!("{}", "-".repeat(60));
    }

    Ok(())
}
