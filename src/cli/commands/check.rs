//! Database connectivity check.

use console::style;

use crate::config::Settings;
use crate::repository::util::redact_url_password;

/// Open a connection and run a trivial query against the store.
pub async fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    let url = settings.database_url()?;
    println!("{} Checking database", style("→").cyan());
    println!("  Database: {}", redact_url_password(url));

    let ctx = settings.create_db_context()?;
    match ctx.test_connection().await {
        Ok(()) => {
            println!(
                "  {} {} store is reachable",
                style("✓").green(),
                ctx.store().backend_name()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("  {} Connection failed: {}", style("✗").red(), e);
            Err(anyhow::anyhow!("Database check failed: {}", e))
        }
    }
}
