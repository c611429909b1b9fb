//! Loading boards and turn configurations from the command line.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use saloon_system_strategy::TurnConfig;
use saloon_world::{layout::parse_layout, BoardSnapshot};

use crate::board_transfer;

/// Reads a board from a transfer string or from a `.json`, `.toml` or `.txt`
/// file.
pub(crate) fn load_board(source: &str) -> Result<BoardSnapshot> {
    if board_transfer::is_transfer_string(source) {
        return board_transfer::decode(source).context("failed to decode board string");
    }

    let path = Path::new(source);
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase);

    let snapshot = match extension.as_deref() {
        Some("json") => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {} as JSON", path.display()))?,
        Some("toml") => toml::from_str(&contents)
            .with_context(|| format!("failed to parse {} as TOML", path.display()))?,
        Some("txt") => {
            let rows: Vec<&str> = contents.lines().collect();
            parse_layout(&rows)
                .with_context(|| format!("failed to parse {} as a layout", path.display()))?
        }
        _ if board_transfer::is_transfer_string(&contents) => board_transfer::decode(&contents)
            .with_context(|| format!("failed to decode board string in {}", path.display()))?,
        _ => bail!(
            "{} has no recognised board extension (expected .json, .toml or .txt)",
            path.display()
        ),
    };
    tracing::debug!(
        source,
        width = snapshot.width,
        height = snapshot.height,
        "loaded board"
    );
    Ok(snapshot)
}

/// Reads a turn configuration from a TOML file.
pub(crate) fn load_config(path: &Path) -> Result<TurnConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, process};

    fn scratch_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = env::temp_dir().join(format!("saloon-cli-{}-{name}", process::id()));
        fs::write(&path, contents).expect("write scratch file");
        path
    }

    #[test]
    fn boards_load_from_every_format() {
        let layout = parse_layout(&["#.P", "B.t"]).expect("valid layout");

        let txt = scratch_file("board.txt", "#.P\nB.t\n");
        let json = scratch_file(
            "board.json",
            &serde_json::to_string(&layout).expect("serialise board"),
        );
        let toml = scratch_file(
            "board.toml",
            &toml::to_string(&layout).expect("serialise board"),
        );
        let encoded = board_transfer::encode(&layout).expect("encode board");

        for source in [
            txt.display().to_string(),
            json.display().to_string(),
            toml.display().to_string(),
            encoded,
        ] {
            let loaded = load_board(&source).expect("board loads");
            assert_eq!(loaded, layout, "{source}");
        }

        for path in [txt, json, toml] {
            let _ = fs::remove_file(path);
        }
    }

    #[test]
    fn unknown_extensions_are_rejected() {
        let path = scratch_file("board.csv", "#.P");
        let error = load_board(&path.display().to_string()).expect_err("csv is not a board");
        assert!(error.to_string().contains("no recognised board extension"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn configs_keep_defaults_for_missing_keys() {
        let path = scratch_file("turn.toml", "strategy = \"cautious\"\n");
        let config = load_config(&path).expect("config loads");
        assert_eq!(config.strategy, saloon_system_strategy::Strategy::Cautious);
        assert_eq!(config.hazard_route_limit, TurnConfig::default().hazard_route_limit);
        let _ = fs::remove_file(path);
    }
}
