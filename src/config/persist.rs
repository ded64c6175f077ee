//! Configuration persistence using toml_edit to preserve formatting and comments.

use super::Config;
use anyhow::{Context, Result};
use std::path::Path;
use toml_edit::DocumentMut;

/// Save the entire config to a TOML file.
///
/// When the file already exists, each top-level section is replaced in place
/// so comments and unrelated keys in the existing document survive.
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    let new_content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config")?;
    let new_doc: DocumentMut = new_content
        .parse()
        .with_context(|| "Failed to parse serialized config")?;

    let doc = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let mut doc: DocumentMut = content
            .parse()
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        merge_sections(&mut doc, &new_doc);
        doc
    } else {
        new_doc
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }
    }

    std::fs::write(path, doc.to_string())
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}

/// Update just the manual_sources array of the config file
pub fn update_manual_sources(path: &Path, sources: &[super::ManualSource]) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut doc: DocumentMut = content
        .parse()
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    let sources_toml = toml::to_string(&ManualSourcesWrapper {
        manual_sources: sources.to_vec(),
    })
    .with_context(|| "Failed to serialize manual sources")?;
    let sources_doc: DocumentMut = sources_toml
        .parse()
        .with_context(|| "Failed to parse serialized manual sources")?;

    if let Some(item) = sources_doc.get("manual_sources") {
        doc["manual_sources"] = item.clone();
    } else {
        doc.remove("manual_sources");
    }

    std::fs::write(path, doc.to_string())
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}

fn merge_sections(doc: &mut DocumentMut, new_doc: &DocumentMut) {
    for (key, item) in new_doc.iter() {
        match (doc.get_mut(key).and_then(|i| i.as_table_mut()), item.as_table()) {
            // Keep the existing table (and its comments), overwrite values.
            (Some(existing), Some(table)) => {
                for (k, v) in table.iter() {
                    existing[k] = v.clone();
                }
            }
            _ => doc[key] = item.clone(),
        }
    }
}

#[derive(serde::Serialize)]
struct ManualSourcesWrapper {
    manual_sources: Vec<super::ManualSource>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config, ManualSource};
    use sourcepool_common::{Quality, VideoType};

    fn bunny() -> ManualSource {
        ManualSource {
            provider: None,
            video_type: VideoType::Movie,
            title: "Big Buck Bunny".to_string(),
            year: Some(2008),
            season: None,
            episode: None,
            url: "https://cdn.example.org/bbb.mp4".to_string(),
            quality: Some(Quality::Hd),
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.dispatch.max_results = 5;
        config.hosts.known = vec!["cdn.example.org".to_string()];
        config.manual_sources.push(bunny());

        save_config(&path, &config).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn save_preserves_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "# keep me\n[dispatch]\n# deadline\nsource_timeout_secs = 3\n",
        )
        .unwrap();

        let mut config = load_config(&path).unwrap();
        config.dispatch.source_timeout_secs = 7;
        save_config(&path, &config).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# keep me"));
        assert!(content.contains("source_timeout_secs = 7"));
        assert_eq!(load_config(&path).unwrap().dispatch.source_timeout_secs, 7);
    }

    #[test]
    fn update_manual_sources_replaces_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        save_config(&path, &Config::default()).unwrap();

        update_manual_sources(&path, &[bunny()]).unwrap();
        assert_eq!(load_config(&path).unwrap().manual_sources, vec![bunny()]);

        update_manual_sources(&path, &[]).unwrap();
        assert!(load_config(&path).unwrap().manual_sources.is_empty());
    }
}
