use crate::commands::{CmdMessage, CmdResult};
use crate::config::FeedConfig;
use crate::error::Result;
use std::path::Path;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

pub fn run(config_dir: &Path, action: ConfigAction) -> Result<CmdResult> {
    match action {
        ConfigAction::ShowAll => {
            let config = FeedConfig::load(config_dir)?;
            Ok(CmdResult::default().with_config(config))
        }
        ConfigAction::ShowKey(key) => {
            let config = FeedConfig::load(config_dir)?;
            let message = match config.get(&key) {
                Some(val) => CmdMessage::info(val),
                None => CmdMessage::error(format!("Unknown config key: {}", key)),
            };
            Ok(CmdResult::default().with_message(message))
        }
        ConfigAction::Set(key, value) => {
            let mut config = FeedConfig::load(config_dir)?;
            if let Err(e) = config.set(&key, &value) {
                return Ok(CmdResult::default().with_message(CmdMessage::error(e)));
            }
            config.save(config_dir)?;
            let display_val = config.get(&key).unwrap_or(value);
            log::debug!("config {} = {}", key, display_val);
            Ok(CmdResult::default()
                .with_config(config)
                .with_message(CmdMessage::success(format!("{} set to {}", key, display_val))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;

    #[test]
    fn set_persists_and_show_key_reads_back() {
        let temp = tempfile::tempdir().unwrap();

        let result = run(
            temp.path(),
            ConfigAction::Set("collection".into(), "drafts".into()),
        )
        .unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Success);
        assert_eq!(result.messages[0].content, "collection set to drafts");

        let result = run(temp.path(), ConfigAction::ShowKey("collection".into())).unwrap();
        assert_eq!(result.messages[0].content, "drafts");

        let result = run(temp.path(), ConfigAction::ShowAll).unwrap();
        assert_eq!(result.config.unwrap().collection, "drafts");
    }

    #[test]
    fn invalid_values_are_reported_not_saved() {
        let temp = tempfile::tempdir().unwrap();
        let result = run(
            temp.path(),
            ConfigAction::Set("watch-interval-ms".into(), "never".into()),
        )
        .unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Error);
        assert!(!temp.path().join("config.json").exists());
    }

    #[test]
    fn unknown_key() {
        let temp = tempfile::tempdir().unwrap();
        let result = run(temp.path(), ConfigAction::ShowKey("colour".into())).unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Error);
    }
}
