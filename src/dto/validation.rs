//! Validation helpers for wholesale-replacement DTOs.
//!
//! The store never sees a malformed replacement: duplicate ids, duplicate
//! point values, and category/bank mismatches are rejected here with a 400.

use std::collections::HashSet;

use indexmap::IndexMap;
use validator::ValidationError;

use crate::dto::game::{QuestionInput, TeamInput};

/// Validates a replacement team roster: non-empty, unique ids, non-empty names.
pub fn validate_team_roster(teams: &[TeamInput]) -> Result<(), ValidationError> {
    if teams.is_empty() {
        let mut err = ValidationError::new("roster_empty");
        err.message = Some("team roster must not be empty".into());
        return Err(err);
    }

    let mut seen = HashSet::new();
    for team in teams {
        if !seen.insert(team.id) {
            let mut err = ValidationError::new("duplicate_team_id");
            err.message = Some(format!("duplicate team id `{}`", team.id).into());
            return Err(err);
        }
        if team.name.trim().is_empty() {
            let mut err = ValidationError::new("team_name_empty");
            err.message = Some(format!("team `{}` has an empty name", team.id).into());
            return Err(err);
        }
    }

    Ok(())
}

/// Validates a replacement question bank against its category list.
///
/// Categories must be non-empty and unique, every category must have a bank
/// entry (and vice versa), and point values must be unique per category.
pub fn validate_question_bank(
    categories: &[String],
    questions: &IndexMap<String, Vec<QuestionInput>>,
) -> Result<(), ValidationError> {
    if categories.is_empty() {
        let mut err = ValidationError::new("categories_empty");
        err.message = Some("category list must not be empty".into());
        return Err(err);
    }

    let mut names = HashSet::new();
    for category in categories {
        if category.trim().is_empty() {
            let mut err = ValidationError::new("category_name_empty");
            err.message = Some("category names must not be empty".into());
            return Err(err);
        }
        if !names.insert(category.as_str()) {
            let mut err = ValidationError::new("duplicate_category");
            err.message = Some(format!("duplicate category `{category}`").into());
            return Err(err);
        }
        if !questions.contains_key(category) {
            let mut err = ValidationError::new("category_without_questions");
            err.message = Some(format!("category `{category}` has no question list").into());
            return Err(err);
        }
    }

    for key in questions.keys() {
        if !names.contains(key.as_str()) {
            let mut err = ValidationError::new("questions_without_category");
            err.message =
                Some(format!("question list `{key}` is not in the category list").into());
            return Err(err);
        }
    }

    for (category, cells) in questions {
        let mut values = HashSet::new();
        for cell in cells {
            if !values.insert(cell.value) {
                let mut err = ValidationError::new("duplicate_question_value");
                err.message = Some(
                    format!("duplicate value `{}` in category `{category}`", cell.value).into(),
                );
                return Err(err);
            }
            if cell.prompt.trim().is_empty() {
                let mut err = ValidationError::new("question_prompt_empty");
                err.message = Some(
                    format!("empty prompt for `{category}`/{}", cell.value).into(),
                );
                return Err(err);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::game::QuestionKindDto;

    fn team(id: u32, name: &str) -> TeamInput {
        TeamInput {
            id,
            name: name.to_string(),
            score: 0,
            color: "#ffffff".into(),
            icon: "*".into(),
            active: true,
            picture: None,
        }
    }

    fn question(value: u32) -> QuestionInput {
        QuestionInput {
            value,
            prompt: format!("prompt {value}"),
            expected_answer: format!("answer {value}"),
            kind: QuestionKindDto::Standard,
            answered: false,
        }
    }

    #[test]
    fn valid_roster_passes() {
        assert!(validate_team_roster(&[team(1, "Blue"), team(2, "Red")]).is_ok());
    }

    #[test]
    fn duplicate_or_empty_roster_fails() {
        assert!(validate_team_roster(&[]).is_err());
        assert!(validate_team_roster(&[team(1, "Blue"), team(1, "Red")]).is_err());
        assert!(validate_team_roster(&[team(1, "  ")]).is_err());
    }

    #[test]
    fn valid_bank_passes() {
        let categories = vec!["Science".to_string()];
        let mut bank = IndexMap::new();
        bank.insert("Science".to_string(), vec![question(100), question(200)]);
        assert!(validate_question_bank(&categories, &bank).is_ok());
    }

    #[test]
    fn mismatched_bank_fails() {
        let categories = vec!["Science".to_string()];
        let mut missing = IndexMap::new();
        missing.insert("History".to_string(), vec![question(100)]);
        assert!(validate_question_bank(&categories, &missing).is_err());

        let mut extra = IndexMap::new();
        extra.insert("Science".to_string(), vec![question(100)]);
        extra.insert("History".to_string(), vec![question(100)]);
        assert!(validate_question_bank(&categories, &extra).is_err());
    }

    #[test]
    fn duplicate_values_in_category_fail() {
        let categories = vec!["Science".to_string()];
        let mut bank = IndexMap::new();
        bank.insert("Science".to_string(), vec![question(100), question(100)]);
        assert!(validate_question_bank(&categories, &bank).is_err());
    }
}
