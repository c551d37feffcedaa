//! Check the compiling service setup.

use std::path::Path;
use std::time::Duration;

use bdclip_common::config::AppConfig;
use tokio::net::TcpStream;

use super::compile::{default_language, locale_from_env};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Report the resolved setup. With `save`, the resolved configuration is
/// written to `config_path` afterwards.
pub async fn run(config: &AppConfig, config_path: &Path, save: bool) -> anyhow::Result<()> {
    println!("bdclip Setup Check");
    println!("{}", "=".repeat(50));

    if config_path.exists() {
        println!("[OK] Config file: {}", config_path.display());
    } else {
        println!("[INFO] No config file at {}; using defaults", config_path.display());
    }

    let settings = &config.compiler;
    println!("[INFO] Settings:");
    for line in serde_json::to_string_pretty(settings)?.lines() {
        println!("     {line}");
    }

    match &settings.compiler_path {
        Some(path) if path.is_file() => println!("[OK] Compiler executable: {}", path.display()),
        Some(path) => println!("[WARN] Compiler executable not found: {}", path.display()),
        None => println!("[INFO] No compiler executable configured; a running service is expected"),
    }

    if settings.schema_dir.is_dir() {
        println!("[OK] Schema directory: {}", settings.schema_dir.display());
    } else {
        println!(
            "[WARN] Schema directory not found: {}",
            settings.schema_dir.display()
        );
    }

    if settings.temp_dir.is_dir() {
        println!("[OK] Workspace root: {}", settings.temp_dir.display());
    } else {
        println!(
            "[INFO] Workspace root will be created: {}",
            settings.temp_dir.display()
        );
    }

    let address = (settings.host.as_str(), settings.port);
    let reachable = matches!(
        tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(address)).await,
        Ok(Ok(_))
    );
    if reachable {
        println!("[OK] Service reachable: {}", settings.connection_string());
    } else {
        println!("[WARN] Service not reachable: {}", settings.connection_string());
    }
    tracing::debug!(reachable, host = %settings.host, port = settings.port, "Service reachability");

    println!(
        "[INFO] Default subtitle language: {}",
        default_language(config, locale_from_env())
    );

    if save {
        config.save_to(config_path)?;
        println!("[OK] Configuration written to {}", config_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn closed_port() -> u16 {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn test_save_writes_resolved_config() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.compiler.host = "127.0.0.1".to_string();
        config.compiler.port = closed_port().await;
        config.compiler.schema_dir = temp.path().join("schemas");
        config.default_language = Some("jpn".to_string());

        run(&config, &config_path, true).await.unwrap();

        let saved = AppConfig::load_from(&config_path);
        assert_eq!(saved.compiler, config.compiler);
        assert_eq!(saved.default_language.as_deref(), Some("jpn"));
    }

    #[tokio::test]
    async fn test_without_save_leaves_config_untouched() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.json");

        let mut config = AppConfig::default();
        config.compiler.host = "127.0.0.1".to_string();
        config.compiler.port = closed_port().await;

        run(&config, &config_path, false).await.unwrap();
        assert!(!config_path.exists());
    }
}
