//! Application-level configuration loading, including the default team
//! roster and question pack used to seed a fresh game.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{info, warn};

use crate::state::game::{Question, QuestionKind, Team};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "QUIZBOARD_CONFIG_PATH";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    teams: Vec<Team>,
    categories: Vec<String>,
    questions: IndexMap<String, Vec<Question>>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in roster and question pack.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        teams = app_config.teams.len(),
                        categories = app_config.categories.len(),
                        "loaded game defaults from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// The team roster a fresh game starts with.
    pub fn default_teams(&self) -> Vec<Team> {
        self.teams.clone()
    }

    /// The category names a fresh game starts with, in board order.
    pub fn default_categories(&self) -> Vec<String> {
        self.categories.clone()
    }

    /// The question bank a fresh game starts with, all cells unanswered.
    pub fn default_questions(&self) -> IndexMap<String, Vec<Question>> {
        self.questions.clone()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let (categories, questions) = default_question_bank();
        Self {
            teams: default_teams(),
            categories,
            questions,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    teams: Vec<RawTeam>,
    categories: Vec<String>,
    questions: IndexMap<String, Vec<RawQuestion>>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let questions = value
            .categories
            .iter()
            .map(|category| {
                let cells = value
                    .questions
                    .get(category)
                    .map(|raw| raw.iter().cloned().map(Into::into).collect())
                    .unwrap_or_default();
                (category.clone(), cells)
            })
            .collect();

        Self {
            teams: value.teams.into_iter().map(Into::into).collect(),
            categories: value.categories,
            questions,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
/// JSON representation of a single roster entry inside the configuration file.
struct RawTeam {
    id: u32,
    name: String,
    color: String,
    icon: String,
    #[serde(default)]
    picture: Option<String>,
}

impl From<RawTeam> for Team {
    fn from(value: RawTeam) -> Self {
        Self {
            id: value.id,
            name: value.name,
            score: 0,
            color: value.color,
            icon: value.icon,
            active: true,
            picture: value.picture,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
/// JSON representation of a single question inside the configuration file.
struct RawQuestion {
    value: u32,
    prompt: String,
    expected_answer: String,
    #[serde(default)]
    kind: Option<String>,
}

impl From<RawQuestion> for Question {
    fn from(value: RawQuestion) -> Self {
        let kind = match value.kind.as_deref() {
            None | Some("standard") => QuestionKind::Standard,
            Some(_) => QuestionKind::Unknown,
        };
        Self {
            value: value.value,
            prompt: value.prompt,
            expected_answer: value.expected_answer,
            kind,
            answered: false,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in roster shipped with the binary.
fn default_teams() -> Vec<Team> {
    let roster = [
        (1, "Team Blue", "#3b82f6", "\u{1f535}"),
        (2, "Team Red", "#ef4444", "\u{1f534}"),
        (3, "Team Green", "#10b981", "\u{1f7e2}"),
    ];

    roster
        .into_iter()
        .map(|(id, name, color, icon)| Team {
            id,
            name: name.to_string(),
            score: 0,
            color: color.to_string(),
            icon: icon.to_string(),
            active: true,
            picture: None,
        })
        .collect()
}

/// Built-in question pack shipped with the binary.
fn default_question_bank() -> (Vec<String>, IndexMap<String, Vec<Question>>) {
    let bank: [(&str, [(u32, &str, &str); 5]); 5] = [
        (
            "Science",
            [
                (100, "This planet is known as the Red Planet", "What is Mars?"),
                (
                    200,
                    "H2O is the chemical formula for this substance",
                    "What is water?",
                ),
                (
                    300,
                    "This force keeps planets in orbit around the sun",
                    "What is gravity?",
                ),
                (400, "The smallest unit of life is called this", "What is a cell?"),
                (
                    500,
                    "This scientist developed the theory of relativity",
                    "Who is Einstein?",
                ),
            ],
        ),
        (
            "History",
            [
                (
                    100,
                    "This wall fell in 1989, reuniting Germany",
                    "What is the Berlin Wall?",
                ),
                (
                    200,
                    "The first president of the United States",
                    "Who is George Washington?",
                ),
                (
                    300,
                    "This year marked the signing of the Declaration of Independence",
                    "What is 1776?",
                ),
                (
                    400,
                    "This empire was ruled by Julius Caesar",
                    "What is the Roman Empire?",
                ),
                (500, "World War II ended in this year", "What is 1945?"),
            ],
        ),
        (
            "Pop Culture",
            [
                (
                    100,
                    "This streaming service is known for \"Stranger Things\"",
                    "What is Netflix?",
                ),
                (
                    200,
                    "She sang \"Bad Romance\" and \"Poker Face\"",
                    "Who is Lady Gaga?",
                ),
                (
                    300,
                    "This superhero team includes Iron Man and Captain America",
                    "What is the Avengers?",
                ),
                (
                    400,
                    "The highest-grossing film of all time (as of 2023)",
                    "What is Avatar?",
                ),
                (
                    500,
                    "This boy wizard attends Hogwarts School",
                    "Who is Harry Potter?",
                ),
            ],
        ),
        (
            "Geography",
            [
                (100, "The capital of France", "What is Paris?"),
                (200, "This ocean is the largest", "What is the Pacific Ocean?"),
                (
                    300,
                    "Mount Everest is located in this mountain range",
                    "What is the Himalayas?",
                ),
                (
                    400,
                    "This river is the longest in the world",
                    "What is the Nile?",
                ),
                (
                    500,
                    "The Great Barrier Reef is located off the coast of this country",
                    "What is Australia?",
                ),
            ],
        ),
        (
            "Sports",
            [
                (100, "This sport uses a puck and ice", "What is hockey?"),
                (
                    200,
                    "The number of players on a basketball team on court",
                    "What is 5?",
                ),
                (
                    300,
                    "This tennis tournament is held in Wimbledon",
                    "What is Wimbledon Championships?",
                ),
                (
                    400,
                    "This athlete has won the most Olympic gold medals",
                    "Who is Michael Phelps?",
                ),
                (
                    500,
                    "The Super Bowl is the championship game for this sport",
                    "What is American football?",
                ),
            ],
        ),
    ];

    let categories: Vec<String> = bank.iter().map(|(name, _)| name.to_string()).collect();
    let questions = bank
        .into_iter()
        .map(|(category, cells)| {
            let cells = cells
                .into_iter()
                .map(|(value, prompt, expected_answer)| Question {
                    value,
                    prompt: prompt.to_string(),
                    expected_answer: expected_answer.to_string(),
                    kind: QuestionKind::Standard,
                    answered: false,
                })
                .collect();
            (category.to_string(), cells)
        })
        .collect();

    (categories, questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_pack_has_five_by_five_shape() {
        let config = AppConfig::default();
        assert_eq!(config.default_teams().len(), 3);

        let categories = config.default_categories();
        assert_eq!(categories.len(), 5);

        let questions = config.default_questions();
        for category in &categories {
            let values: Vec<u32> = questions[category].iter().map(|q| q.value).collect();
            assert_eq!(values, vec![100, 200, 300, 400, 500]);
        }
    }

    #[test]
    fn raw_config_overrides_defaults() {
        let raw: RawConfig = serde_json::from_str(
            r##"{
                "teams": [{"id": 7, "name": "Quizzards", "color": "#ffffff", "icon": "Q"}],
                "categories": ["Movies"],
                "questions": {
                    "Movies": [
                        {"value": 100, "prompt": "p", "expected_answer": "a"},
                        {"value": 200, "prompt": "p2", "expected_answer": "a2", "kind": "daily_double"}
                    ]
                }
            }"##,
        )
        .unwrap();

        let config: AppConfig = raw.into();
        assert_eq!(config.teams[0].id, 7);
        assert_eq!(config.teams[0].score, 0);
        assert_eq!(config.categories, vec!["Movies".to_string()]);
        assert_eq!(config.questions["Movies"].len(), 2);
        assert_eq!(config.questions["Movies"][0].kind, QuestionKind::Standard);
        assert_eq!(config.questions["Movies"][1].kind, QuestionKind::Unknown);
    }
}
