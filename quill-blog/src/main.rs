use anyhow::Result;
use quill_blog::config::BlogSettings;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let ax = quill_blog::build()?;
    let addr = BlogSettings::from_app(&ax.app)?.addr();

    ax.listen(addr).await?;
    Ok(())
}
