use std::path::PathBuf;

use projconf::{ConfigStore, EngineSettings, SettingsLoader};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), projconf::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    // Optional settings file in the project root, then PROJCONF__* overrides
    let settings: EngineSettings = SettingsLoader::new()
        .with_file(root.join("projconf.toml"), false)
        .with_env("PROJCONF", "__")?
        .build()?;

    let store = ConfigStore::builder().with_settings(settings).build()?;

    let resolved = store.resolve_config_path(&root, false).await;
    println!("config: {} ({})", resolved.path.display(), resolved.variant);

    let config = store.load_or_create(&root, false, &json!({})).await?;
    println!(
        "project: {} by {}",
        config.get_str("projectName").unwrap_or("?"),
        config.get_str("projectAuthor").unwrap_or("?"),
    );

    for entry in store.load_multi_configs(&root, false).await? {
        println!(
            "secondary: {} -> {}",
            entry.path.display(),
            entry.document.get_str("projectName").unwrap_or("?"),
        );
    }

    Ok(())
}
