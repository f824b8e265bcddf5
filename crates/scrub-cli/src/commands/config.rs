use anyhow::Result;
use scrub_config::Config;
use std::path::Path;

pub fn handle(config: &Config, path: &Path) -> Result<()> {
    println!("# {}", path.display());
    println!("{}", render(config)?);
    Ok(())
}

/// Effective configuration as TOML, with the API key hidden
fn render(config: &Config) -> Result<String> {
    let mut shown = config.clone();
    if shown.server.api_key.is_some() {
        shown.server.api_key = Some("<set>".to_string());
    }
    Ok(toml::to_string_pretty(&shown)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_hides_api_key() {
        let mut config = Config::default();
        config.server.api_key = Some("s3cret".to_string());

        let rendered = render(&config).unwrap();

        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("api_key = \"<set>\""));
        assert!(rendered.contains("[[connectors]]"));
    }

    #[test]
    fn test_rendered_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, render(&Config::default()).unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.server.port, 8080);
    }
}
