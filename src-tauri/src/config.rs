//! Runtime configuration.
//!
//! Defaults mirror the hosted setup (gpt-4o, temperature 0.7, 15 rounds).
//! Every value can be overridden from the environment or a `.env` file.
//! The API key is deliberately absent: it is entered per session.

use crate::error::{Result, WellbeingError};
use crate::groupchat::SpeakerSelection;
use std::str::FromStr;

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_round: usize,
    pub max_consecutive_auto_reply: u32,
    pub speaker_selection: SpeakerSelection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 2048,
            api_url: OPENAI_API_URL.to_string(),
            request_timeout_secs: 60,
            connect_timeout_secs: 10,
            max_round: 15,
            max_consecutive_auto_reply: 10,
            speaker_selection: SpeakerSelection::Auto,
        }
    }
}

impl AppConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let selection = match lookup("WELLBEING_SPEAKER_SELECTION") {
            Some(raw) => SpeakerSelection::from_str(raw.trim()).ok_or_else(|| {
                WellbeingError::Config {
                    key: "WELLBEING_SPEAKER_SELECTION".to_string(),
                    value: raw.clone(),
                }
            })?,
            None => defaults.speaker_selection,
        };

        Ok(Self {
            model: lookup("WELLBEING_MODEL")
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(defaults.model),
            temperature: parse_or(&lookup, "WELLBEING_TEMPERATURE", defaults.temperature)?,
            max_tokens: parse_or(&lookup, "WELLBEING_MAX_TOKENS", defaults.max_tokens)?,
            api_url: lookup("WELLBEING_API_URL")
                .filter(|u| !u.trim().is_empty())
                .unwrap_or(defaults.api_url),
            request_timeout_secs: parse_or(&lookup, "WELLBEING_TIMEOUT_SECS", defaults.request_timeout_secs)?,
            connect_timeout_secs: defaults.connect_timeout_secs,
            max_round: parse_or(&lookup, "WELLBEING_MAX_ROUND", defaults.max_round)?,
            max_consecutive_auto_reply: parse_or(
                &lookup,
                "WELLBEING_MAX_AUTO_REPLY",
                defaults.max_consecutive_auto_reply,
            )?,
            speaker_selection: selection,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| WellbeingError::Config {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_round, 15);
        assert_eq!(config.max_consecutive_auto_reply, 10);
        assert_eq!(config.speaker_selection, SpeakerSelection::Auto);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("WELLBEING_MODEL", "gpt-4o-mini"),
            ("WELLBEING_MAX_ROUND", " 6 "),
            ("WELLBEING_SPEAKER_SELECTION", "round_robin"),
            ("WELLBEING_API_URL", "http://localhost:8080/v1/chat/completions"),
        ]))
        .unwrap();

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_round, 6);
        assert_eq!(config.speaker_selection, SpeakerSelection::RoundRobin);
        assert_eq!(config.api_url, "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_malformed_value_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("WELLBEING_TEMPERATURE", "warm")]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for WELLBEING_TEMPERATURE: warm"
        );

        assert!(AppConfig::from_lookup(lookup_from(&[("WELLBEING_SPEAKER_SELECTION", "random")])).is_err());
    }
}
