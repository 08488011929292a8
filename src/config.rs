//! Arena settings.
//!
//! Every field has a default, so a settings file only needs the keys it
//! changes. Start positions can also come from a plain text file holding one
//! FEN per line.

use std::fs;
use std::path::Path;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::codec::fen_generator::EnPassantPolicy;
use crate::errors::{ArenaError, ArenaResult};
use crate::game_state::chess_rules::DEFAULT_MATCH_FENS;

/// How much the arena writes to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogType {
    None,
    ErrorOnly,
    #[default]
    All,
}

impl LogType {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            LogType::None => LevelFilter::Off,
            LogType::ErrorOnly => LevelFilter::Error,
            LogType::All => LevelFilter::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    pub game_duration_ms: u64,
    pub increment_ms: u64,
    /// Minimum time between two applied automated moves.
    pub min_move_delay_ms: u64,
    pub run_bots_on_separate_thread: bool,
    /// Pause before a bot match continues with its next game.
    pub next_game_delay_ms: u64,
    pub fog_of_war: bool,
    pub en_passant_policy: EnPassantPolicy,
    /// Bot-match openings; the first is also where games with a human start.
    pub start_fens: Vec<String>,
    pub log_level: LogType,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            game_duration_ms: 60_000,
            increment_ms: 0,
            min_move_delay_ms: 0,
            run_bots_on_separate_thread: true,
            next_game_delay_ms: 600,
            fog_of_war: true,
            en_passant_policy: EnPassantPolicy::AlwaysInclude,
            start_fens: DEFAULT_MATCH_FENS.iter().map(|fen| (*fen).to_owned()).collect(),
            log_level: LogType::All,
        }
    }
}

impl ArenaSettings {
    pub fn load(path: &Path) -> ArenaResult<Self> {
        let text = read_text(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> ArenaResult<Self> {
        let settings: ArenaSettings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Replace `start_fens` with the contents of a one-FEN-per-line file.
    pub fn with_start_fens_file(mut self, path: &Path) -> ArenaResult<Self> {
        self.start_fens = load_start_fens(path)?;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> ArenaResult<()> {
        if self.start_fens.is_empty() {
            return Err(ArenaError::Config("start_fens must not be empty".to_owned()));
        }
        for (idx, fen) in self.start_fens.iter().enumerate() {
            let ranks = fen
                .split_whitespace()
                .next()
                .map_or(0, |board| board.split('/').count());
            if ranks != 8 {
                return Err(ArenaError::Config(format!(
                    "start_fens[{idx}] has {ranks} ranks, expected 8: '{fen}'"
                )));
            }
        }
        Ok(())
    }
}

pub fn load_start_fens(path: &Path) -> ArenaResult<Vec<String>> {
    Ok(read_text(path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

fn read_text(path: &Path) -> ArenaResult<String> {
    fs::read_to_string(path).map_err(|source| ArenaError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{load_start_fens, ArenaSettings, LogType};
    use crate::codec::fen_generator::EnPassantPolicy;
    use crate::errors::ArenaError;
    use crate::game_state::chess_rules::{DEFAULT_MATCH_FENS, STARTING_POSITION_FEN};

    #[test]
    fn defaults_match_the_arena_conventions() {
        let settings = ArenaSettings::default();
        assert_eq!(settings.game_duration_ms, 60_000);
        assert_eq!(settings.increment_ms, 0);
        assert_eq!(settings.min_move_delay_ms, 0);
        assert!(settings.run_bots_on_separate_thread);
        assert_eq!(settings.next_game_delay_ms, 600);
        assert_eq!(settings.start_fens.len(), DEFAULT_MATCH_FENS.len());
        assert_eq!(settings.start_fens[0], STARTING_POSITION_FEN);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_toml_overrides_only_given_keys() {
        let settings = ArenaSettings::from_toml_str(
            r#"
            increment_ms = 2000
            fog_of_war = false
            en_passant_policy = "capturable"
            log_level = "error_only"
            "#,
        )
        .expect("settings should parse");

        assert_eq!(settings.increment_ms, 2_000);
        assert!(!settings.fog_of_war);
        assert_eq!(settings.en_passant_policy, EnPassantPolicy::OnlyIfCapturable);
        assert_eq!(settings.log_level, LogType::ErrorOnly);
        assert_eq!(settings.game_duration_ms, 60_000);
    }

    #[test]
    fn invalid_start_fens_are_rejected() {
        let empty = ArenaSettings::from_toml_str("start_fens = []");
        assert!(matches!(empty, Err(ArenaError::Config(_))));

        let short = ArenaSettings::from_toml_str(r#"start_fens = ["8/8/8 w - - 0 1"]"#);
        assert!(matches!(short, Err(ArenaError::Config(_))));

        let typo = ArenaSettings::from_toml_str("game_duration_ms = \"long\"");
        assert!(matches!(typo, Err(ArenaError::SettingsParse(_))));
    }

    #[test]
    fn start_fen_file_skips_blank_lines() {
        let path = std::env::temp_dir().join(format!("fog_arena_fens_{}.txt", std::process::id()));
        std::fs::write(
            &path,
            format!("{STARTING_POSITION_FEN}\n\n  4k3/8/8/8/8/8/8/4K3 w - - 0 1  \n"),
        )
        .expect("temp file should be writable");

        let fens = load_start_fens(&path).expect("file should load");
        assert_eq!(fens.len(), 2);
        assert_eq!(fens[1], "4k3/8/8/8/8/8/8/4K3 w - - 0 1");

        let settings = ArenaSettings::default()
            .with_start_fens_file(&path)
            .expect("settings should accept file");
        assert_eq!(settings.start_fens, fens);

        let _ = std::fs::remove_file(&path);
        assert!(load_start_fens(&path).is_err());
    }
}
