use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::config::AppConfig;

/// Maximum number of judged answers kept in the history ring.
pub const HISTORY_LIMIT: usize = 20;

/// A team participating in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Stable identifier, unique within the roster.
    pub id: u32,
    /// Display name shown on the board.
    pub name: String,
    /// Running score; negative values are allowed.
    pub score: i64,
    /// Display color hint (e.g. `#3b82f6`).
    pub color: String,
    /// Display icon hint.
    pub icon: String,
    /// Whether the team takes part in the current round.
    pub active: bool,
    /// Optional reference to a team picture.
    pub picture: Option<String>,
}

/// Kind of a question; extensible on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    /// Plain prompt/answer question.
    Standard,
    /// Any kind this build does not know about.
    Unknown,
}

/// A single board cell: prompt, expected answer, and its point value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Point value, unique within its category.
    pub value: u32,
    /// Prompt read to the players.
    pub prompt: String,
    /// Answer the judge checks against.
    pub expected_answer: String,
    /// Question kind.
    pub kind: QuestionKind,
    /// Set once by judging; cleared only by a full game reset.
    pub answered: bool,
}

/// The question currently open on the board. At most one exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentQuestion {
    /// Category the question was taken from.
    pub category: String,
    /// Point value of the question.
    pub value: u32,
    /// Prompt read to the players.
    pub prompt: String,
    /// Answer the judge checks against.
    pub expected_answer: String,
    /// Question kind.
    pub kind: QuestionKind,
    /// Epoch milliseconds when the question was opened.
    pub selected_at: u64,
}

/// The accepted buzz for the current lock window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuzzRecord {
    /// Team that buzzed in.
    pub team_id: u32,
    /// Team name as reported by the buzzer device.
    pub team_name: String,
    /// Player holding the device.
    pub player_name: String,
    /// Epoch milliseconds when the buzz was processed.
    pub timestamp: u64,
}

/// Buzzer arbitration state.
///
/// `locked` is true iff a buzz has been accepted since the current question
/// was opened or since the last buzzer reset; `record` then holds the winner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuzzerState {
    /// Gate preventing more than one accepted buzz per window.
    pub locked: bool,
    /// The winning buzz, present exactly when `locked` is true.
    pub record: Option<BuzzRecord>,
}

/// Append-only record of a judged answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerHistoryEntry {
    /// Name of the judged team at judging time.
    pub team_name: String,
    /// Color of the judged team at judging time.
    pub team_color: String,
    /// Category of the judged question.
    pub category: String,
    /// Point value of the judged question.
    pub value: u32,
    /// Whether the answer was ruled correct.
    pub correct: bool,
    /// Points actually awarded (0 for incorrect answers).
    pub points_awarded: i64,
    /// Epoch milliseconds when the answer was judged.
    pub timestamp: u64,
}

/// Outcome of a successful judging operation, used for the targeted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgedAnswer {
    /// Team that was judged.
    pub team_id: u32,
    /// Name of the judged team.
    pub team_name: String,
    /// Whether the answer was ruled correct.
    pub correct: bool,
    /// Points actually awarded.
    pub points_awarded: i64,
    /// Team score after the award.
    pub new_score: i64,
}

/// The canonical shared game state.
///
/// Exactly one instance exists per running session. All mutations go through
/// the methods below; each checks its preconditions and applies its effect
/// within the same `&mut` borrow, so no observer can see a partial write.
/// Methods return `None` when preconditions fail, leaving the state
/// untouched — stale operations are dropped, not errored (a deliberate
/// choice for a live-hosted game).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    /// Participating teams in display order.
    pub teams: Vec<Team>,
    /// Category names in board order.
    pub categories: Vec<String>,
    /// Question bank, keyed by category, insertion order preserved.
    pub questions: IndexMap<String, Vec<Question>>,
    /// The question currently open, if any.
    pub current_question: Option<CurrentQuestion>,
    /// Buzzer arbitration state.
    pub buzzer: BuzzerState,
    /// Most recent judged answers, newest first, capped at [`HISTORY_LIMIT`].
    pub answer_history: VecDeque<AnswerHistoryEntry>,
    /// Set when the first question of the session is opened.
    pub game_started: bool,
    /// Epoch milliseconds of the last applied mutation.
    pub last_update: u64,
}

impl GameState {
    /// Build the initial state from the configured roster and question pack.
    pub fn new(config: &AppConfig, now: u64) -> Self {
        Self {
            teams: config.default_teams(),
            categories: config.default_categories(),
            questions: config.default_questions(),
            current_question: None,
            buzzer: BuzzerState::default(),
            answer_history: VecDeque::new(),
            game_started: false,
            last_update: now,
        }
    }

    /// Open a question on the board.
    ///
    /// No-op when the category or value does not exist or the question was
    /// already answered. On success the buzzer is unconditionally unlocked
    /// and any lingering buzz record cleared.
    pub fn select_question(
        &mut self,
        category: &str,
        value: u32,
        now: u64,
    ) -> Option<CurrentQuestion> {
        let question = self
            .questions
            .get(category)?
            .iter()
            .find(|q| q.value == value && !q.answered)?;

        let current = CurrentQuestion {
            category: category.to_string(),
            value,
            prompt: question.prompt.clone(),
            expected_answer: question.expected_answer.clone(),
            kind: question.kind,
            selected_at: now,
        };

        self.current_question = Some(current.clone());
        self.buzzer = BuzzerState::default();
        self.game_started = true;
        self.last_update = now;

        Some(current)
    }

    /// Dismiss the open question without judging it. Idempotent.
    pub fn close_question(&mut self, now: u64) {
        self.current_question = None;
        self.buzzer = BuzzerState::default();
        self.last_update = now;
    }

    /// Accept a buzz if the gate is open and a question is active.
    ///
    /// The first press to be *processed* wins the window exclusively; every
    /// later press is ignored until the buzzer is reset or a new question
    /// opens. Ignored presses return `None` and leave the state untouched.
    pub fn press_buzzer(
        &mut self,
        team_id: u32,
        team_name: &str,
        player_name: &str,
        now: u64,
    ) -> Option<BuzzRecord> {
        if self.buzzer.locked || self.current_question.is_none() {
            return None;
        }

        let record = BuzzRecord {
            team_id,
            team_name: team_name.to_string(),
            player_name: player_name.to_string(),
            timestamp: now,
        };

        self.buzzer.locked = true;
        self.buzzer.record = Some(record.clone());
        self.last_update = now;

        Some(record)
    }

    /// Reopen the buzzer gate without touching the current question.
    pub fn reset_buzzer(&mut self, now: u64) {
        self.buzzer = BuzzerState::default();
        self.last_update = now;
    }

    /// Judge the open question for a team.
    ///
    /// No-op when no question is open or the team is unknown. On success the
    /// referenced question is marked answered, the score is adjusted when the
    /// answer was correct, a history entry is prepended, and the question and
    /// buzzer state are cleared.
    pub fn judge_answer(
        &mut self,
        correct: bool,
        team_id: u32,
        points: i64,
        now: u64,
    ) -> Option<JudgedAnswer> {
        let current = self.current_question.as_ref()?;
        let team_index = self.teams.iter().position(|t| t.id == team_id)?;

        let category = current.category.clone();
        let value = current.value;
        let points_awarded = if correct { points } else { 0 };

        let team = &mut self.teams[team_index];
        team.score += points_awarded;
        let (team_name, team_color, new_score) =
            (team.name.clone(), team.color.clone(), team.score);

        // The bank may have been replaced while the question was open; the
        // judgment still stands even if the cell is gone.
        if let Some(question) = self
            .questions
            .get_mut(&category)
            .and_then(|list| list.iter_mut().find(|q| q.value == value))
        {
            question.answered = true;
        }

        self.answer_history.push_front(AnswerHistoryEntry {
            team_name: team_name.clone(),
            team_color,
            category,
            value,
            correct,
            points_awarded,
            timestamp: now,
        });
        self.answer_history.truncate(HISTORY_LIMIT);

        self.current_question = None;
        self.buzzer = BuzzerState::default();
        self.last_update = now;

        Some(JudgedAnswer {
            team_id,
            team_name,
            correct,
            points_awarded,
            new_score,
        })
    }

    /// Add `points` (possibly negative) to a team's score, independent of any
    /// open question. No-op when the team is unknown.
    pub fn adjust_score(&mut self, team_id: u32, points: i64, now: u64) -> Option<i64> {
        let team = self.teams.iter_mut().find(|t| t.id == team_id)?;
        team.score += points;
        self.last_update = now;
        Some(team.score)
    }

    /// Replace the whole team roster. Callers validate shape and id
    /// uniqueness before reaching this point.
    pub fn replace_teams(&mut self, teams: Vec<Team>, now: u64) {
        self.teams = teams;
        self.last_update = now;
    }

    /// Replace the categories and the question bank wholesale. Answered flags
    /// are taken from the payload, not preserved from the old bank.
    pub fn replace_questions(
        &mut self,
        categories: Vec<String>,
        questions: IndexMap<String, Vec<Question>>,
        now: u64,
    ) {
        self.categories = categories;
        self.questions = questions;
        self.last_update = now;
    }

    /// Restore the default question bank and zero every score while keeping
    /// team identities (names, colors, icons) intact.
    pub fn reset_game(&mut self, config: &AppConfig, now: u64) {
        self.categories = config.default_categories();
        self.questions = config.default_questions();
        for team in &mut self.teams {
            team.score = 0;
        }
        self.current_question = None;
        self.buzzer = BuzzerState::default();
        self.answer_history.clear();
        self.game_started = false;
        self.last_update = now;
    }

    /// Check the structural invariants the store maintains. Used by tests.
    #[cfg(test)]
    fn invariants_hold(&self) -> bool {
        self.buzzer.locked == self.buzzer.record.is_some()
            && self.answer_history.len() <= HISTORY_LIMIT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> GameState {
        GameState::new(&AppConfig::default(), 1_000)
    }

    fn open_science_100(state: &mut GameState) {
        assert!(state.select_question("Science", 100, 2_000).is_some());
    }

    #[test]
    fn initial_state_matches_defaults() {
        let state = fresh();
        assert_eq!(state.teams.len(), 3);
        assert!(state.teams.iter().all(|t| t.score == 0 && t.active));
        assert_eq!(state.categories.len(), 5);
        assert_eq!(state.questions.len(), 5);
        for category in &state.categories {
            let values: Vec<u32> = state.questions[category].iter().map(|q| q.value).collect();
            assert_eq!(values, vec![100, 200, 300, 400, 500]);
            assert!(state.questions[category].iter().all(|q| !q.answered));
        }
        assert!(state.current_question.is_none());
        assert!(!state.buzzer.locked);
        assert!(state.answer_history.is_empty());
        assert!(!state.game_started);
    }

    #[test]
    fn initialization_is_deterministic() {
        // Creating the state twice from the same config yields identical
        // states, which is what makes a second initialize a no-op upstream.
        assert_eq!(fresh(), fresh());
    }

    #[test]
    fn select_question_opens_and_unlocks() {
        let mut state = fresh();
        let current = state.select_question("Science", 100, 2_000).unwrap();
        assert_eq!(current.category, "Science");
        assert_eq!(current.value, 100);
        assert_eq!(current.selected_at, 2_000);
        assert!(state.game_started);
        assert!(!state.buzzer.locked);
        assert!(state.invariants_hold());
    }

    #[test]
    fn select_question_clears_lingering_buzzer_state() {
        let mut state = fresh();
        open_science_100(&mut state);
        assert!(state.press_buzzer(1, "Team Blue", "Ada", 2_100).is_some());

        // Opening another question must drop the stale lock and record.
        assert!(state.select_question("History", 200, 3_000).is_some());
        assert!(!state.buzzer.locked);
        assert!(state.buzzer.record.is_none());
    }

    #[test]
    fn select_unknown_or_answered_question_is_a_no_op() {
        let mut state = fresh();
        assert!(state.select_question("Botany", 100, 2_000).is_none());
        assert!(state.select_question("Science", 150, 2_000).is_none());

        open_science_100(&mut state);
        state.judge_answer(true, 1, 100, 2_500).unwrap();

        let before = state.clone();
        assert!(state.select_question("Science", 100, 3_000).is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn first_processed_buzz_wins_exclusively() {
        let mut state = fresh();
        open_science_100(&mut state);

        let winner = state.press_buzzer(1, "Team Blue", "Ada", 2_100).unwrap();
        assert_eq!(winner.team_id, 1);
        assert!(state.buzzer.locked);

        for late in 2..10 {
            assert!(
                state
                    .press_buzzer(late, "Someone", "Else", 2_100 + u64::from(late))
                    .is_none()
            );
        }

        assert_eq!(state.buzzer.record.as_ref().unwrap().team_id, 1);
        assert_eq!(state.buzzer.record.as_ref().unwrap().player_name, "Ada");
        assert!(state.invariants_hold());
    }

    #[test]
    fn buzz_without_open_question_is_ignored() {
        let mut state = fresh();
        assert!(state.press_buzzer(1, "Team Blue", "Ada", 2_000).is_none());
        assert!(!state.buzzer.locked);
    }

    #[test]
    fn reset_buzzer_allows_rebuzzing_same_question() {
        let mut state = fresh();
        open_science_100(&mut state);
        state.press_buzzer(1, "Team Blue", "Ada", 2_100).unwrap();

        state.reset_buzzer(2_200);
        assert!(!state.buzzer.locked);
        assert!(state.buzzer.record.is_none());
        assert!(state.current_question.is_some());

        let second = state.press_buzzer(2, "Team Red", "Grace", 2_300).unwrap();
        assert_eq!(second.team_id, 2);
    }

    #[test]
    fn judge_correct_awards_points_and_closes_question() {
        let mut state = fresh();
        open_science_100(&mut state);
        state.press_buzzer(1, "Team Blue", "Ada", 2_100).unwrap();
        // A second press from another team is ignored while locked.
        assert!(state.press_buzzer(2, "Team Red", "Grace", 2_101).is_none());

        let judged = state.judge_answer(true, 1, 100, 2_500).unwrap();
        assert_eq!(judged.points_awarded, 100);
        assert_eq!(judged.new_score, 100);
        assert_eq!(judged.team_name, "Team Blue");

        assert_eq!(state.teams[0].score, 100);
        assert!(state.questions["Science"][0].answered);
        assert!(state.current_question.is_none());
        assert!(!state.buzzer.locked);

        assert_eq!(state.answer_history.len(), 1);
        let entry = &state.answer_history[0];
        assert_eq!(entry.team_name, "Team Blue");
        assert_eq!(entry.value, 100);
        assert!(entry.correct);
        assert_eq!(entry.points_awarded, 100);
        assert!(state.invariants_hold());
    }

    #[test]
    fn judge_incorrect_awards_nothing_but_burns_question() {
        let mut state = fresh();
        open_science_100(&mut state);

        let judged = state.judge_answer(false, 2, 100, 2_500).unwrap();
        assert_eq!(judged.points_awarded, 0);
        assert_eq!(judged.new_score, 0);

        assert_eq!(state.teams[1].score, 0);
        assert!(state.questions["Science"][0].answered);
        assert!(!state.answer_history[0].correct);
    }

    #[test]
    fn judge_without_question_or_with_unknown_team_is_a_no_op() {
        let mut state = fresh();
        assert!(state.judge_answer(true, 1, 100, 2_000).is_none());

        open_science_100(&mut state);
        let before = state.clone();
        assert!(state.judge_answer(true, 99, 100, 2_500).is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn negative_points_decrease_score() {
        let mut state = fresh();
        open_science_100(&mut state);
        let judged = state.judge_answer(true, 1, -300, 2_500).unwrap();
        assert_eq!(judged.new_score, -300);
        assert_eq!(state.teams[0].score, -300);
    }

    #[test]
    fn adjust_score_round_trip_restores_prior_value() {
        let mut state = fresh();
        let before = state.teams[2].score;
        assert_eq!(state.adjust_score(3, -50, 2_000), Some(before - 50));
        assert_eq!(state.adjust_score(3, 50, 2_100), Some(before));
        assert!(state.adjust_score(42, 10, 2_200).is_none());
    }

    #[test]
    fn history_is_capped_and_newest_first() {
        let mut state = fresh();
        let mut judged = 0u64;

        // Judge 21 answers; the bank holds 25 questions, so each round opens
        // a fresh cell.
        'outer: for category in state.categories.clone() {
            for value in [100u32, 200, 300, 400, 500] {
                if judged == 21 {
                    break 'outer;
                }
                let now = 10_000 + judged * 10;
                assert!(state.select_question(&category, value, now).is_some());
                state
                    .judge_answer(true, 1, i64::from(value), now + 1)
                    .unwrap();
                judged += 1;
            }
        }

        assert_eq!(state.answer_history.len(), HISTORY_LIMIT);
        // The first judged answer (Science/100) has been evicted.
        assert!(
            !state
                .answer_history
                .iter()
                .any(|e| e.category == "Science" && e.value == 100)
        );
        // The most recent one sits at the front.
        assert_eq!(state.answer_history[0].timestamp, 10_000 + 20 * 10 + 1);
        assert!(state.invariants_hold());
    }

    #[test]
    fn close_question_clears_state_and_is_idempotent() {
        let mut state = fresh();
        open_science_100(&mut state);
        state.press_buzzer(1, "Team Blue", "Ada", 2_100).unwrap();

        state.close_question(2_200);
        assert!(state.current_question.is_none());
        assert!(!state.buzzer.locked);
        // Dismissing does not burn the question.
        assert!(!state.questions["Science"][0].answered);

        state.close_question(2_300);
        assert!(state.current_question.is_none());
    }

    #[test]
    fn reset_game_preserves_team_identity() {
        let config = AppConfig::default();
        let mut state = fresh();
        state.teams[0].name = "The Renamed".into();
        state.teams[0].color = "#123456".into();

        open_science_100(&mut state);
        state.judge_answer(true, 1, 100, 2_500).unwrap();
        state.adjust_score(2, 250, 2_600);

        state.reset_game(&config, 3_000);

        assert_eq!(state.teams[0].name, "The Renamed");
        assert_eq!(state.teams[0].color, "#123456");
        assert!(state.teams.iter().all(|t| t.score == 0));
        assert!(state.questions.values().flatten().all(|q| !q.answered));
        assert!(state.answer_history.is_empty());
        assert!(state.current_question.is_none());
        assert!(!state.buzzer.locked);
        assert!(!state.game_started);
    }

    #[test]
    fn replace_questions_drops_old_answered_flags() {
        let mut state = fresh();
        open_science_100(&mut state);
        state.judge_answer(true, 1, 100, 2_500).unwrap();

        let mut bank = IndexMap::new();
        bank.insert(
            "Science".to_string(),
            vec![Question {
                value: 100,
                prompt: "New prompt".into(),
                expected_answer: "New answer".into(),
                kind: QuestionKind::Standard,
                answered: false,
            }],
        );
        state.replace_questions(vec!["Science".into()], bank, 3_000);

        assert_eq!(state.categories, vec!["Science".to_string()]);
        assert!(!state.questions["Science"][0].answered);
        assert!(state.select_question("Science", 100, 3_100).is_some());
    }

    #[test]
    fn full_round_scenario() {
        let mut state = fresh();

        state.select_question("Science", 100, 2_000).unwrap();
        assert!(state.press_buzzer(1, "Team Blue", "Ada", 2_050).is_some());
        assert!(state.press_buzzer(2, "Team Red", "Grace", 2_051).is_none());

        let judged = state.judge_answer(true, 1, 100, 2_100).unwrap();
        assert_eq!(judged.new_score, 100);

        assert_eq!(state.teams[0].score, 100);
        assert!(state.questions["Science"][0].answered);
        assert!(state.current_question.is_none());
        assert!(!state.buzzer.locked);
        assert_eq!(state.answer_history.len(), 1);
        assert_eq!(state.answer_history[0].team_name, "Team Blue");
        assert_eq!(state.answer_history[0].value, 100);
        assert!(state.answer_history[0].correct);
        assert_eq!(state.answer_history[0].points_awarded, 100);
    }
}
