//! Incremental stat aggregation for a single game feed.
//!
//! `GameStats` is the only mutable state in the pipeline. The aggregator
//! mutates it through [`GameStats::apply`]; renderers only ever see a
//! [`ChartSnapshot`](crate::render::ChartSnapshot) built from it.

use crate::error::RecordValidationError;
use crate::models::{GameEvent, MomentumSample, PlayNote, PlayerState, TeamState};
use crate::render::ChartSnapshot;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use tracing::debug;

/// How many play-by-play notes are retained
pub const MAX_NOTES: usize = 64;

/// Highest team score accepted; keeps every momentum value representable
pub const MAX_TEAM_SCORE: u64 = i64::MAX as u64;

/// Outcome of one accepted event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub index: usize,
    pub points: u32,
    pub team_score: u64,
    pub momentum: i64,
}

#[derive(Debug, Clone, Default)]
pub struct GameStats {
    /// Teams in first-seen order
    teams: Vec<TeamState>,
    team_index: FxHashMap<String, usize>,
    /// Players in first-seen order, one entry per (team, player)
    players: Vec<PlayerState>,
    /// team -> player -> slot in `players`
    player_index: FxHashMap<String, FxHashMap<String, usize>>,
    momentum: Vec<MomentumSample>,
    notes: VecDeque<PlayNote>,
    applied: usize,
    rejected: usize,
}

impl GameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the running totals.
    ///
    /// A rejected event leaves every total untouched; only the rejection
    /// counter moves.
    pub fn apply(&mut self, event: &GameEvent) -> Result<Applied, RecordValidationError> {
        let checked = validate(event).and_then(|points| self.check_headroom(&event.team, points));
        let points = match checked {
            Ok(points) => points,
            Err(e) => {
                self.rejected += 1;
                return Err(e);
            }
        };

        let index = self.applied;
        let team_idx = self.team_slot(&event.team);
        let player_idx = self.player_slot(&event.team, &event.player);

        if points > 0 {
            let team = &mut self.teams[team_idx];
            team.score += u64::from(points);
            team.samples.push((index, team.score));
            // A player's total never exceeds their team's score.
            self.players[player_idx].points += u64::from(points);
        }

        let momentum = self.differential();
        self.momentum.push(MomentumSample {
            index,
            value: momentum,
        });

        if let Some(message) = event.message.as_deref().filter(|m| !m.trim().is_empty()) {
            if self.notes.len() == MAX_NOTES {
                self.notes.pop_front();
            }
            self.notes.push_back(PlayNote {
                index,
                timestamp: event.timestamp,
                team: event.team.clone(),
                player: event.player.clone(),
                points,
                message: message.to_string(),
            });
        }

        self.applied += 1;

        let team_score = self.teams[team_idx].score;
        debug!(
            "Applied #{}: {} {} +{} (team {}, momentum {})",
            index, event.team, event.player, points, team_score, momentum
        );

        Ok(Applied {
            index,
            points,
            team_score,
            momentum,
        })
    }

    fn team_slot(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.team_index.get(name) {
            return idx;
        }
        let idx = self.teams.len();
        self.teams.push(TeamState::new(name));
        self.team_index.insert(name.to_string(), idx);
        idx
    }

    fn player_slot(&mut self, team: &str, name: &str) -> usize {
        if let Some(&idx) = self.player_index.get(team).and_then(|roster| roster.get(name)) {
            return idx;
        }
        let idx = self.players.len();
        self.players.push(PlayerState::new(name, team));
        self.player_index
            .entry(team.to_string())
            .or_default()
            .insert(name.to_string(), idx);
        idx
    }

    /// Reject an event that would push its team past [`MAX_TEAM_SCORE`].
    fn check_headroom(&self, team: &str, points: u32) -> Result<u32, RecordValidationError> {
        let score = self.team(team).map_or(0, |t| t.score);
        match score.checked_add(u64::from(points)) {
            Some(total) if total <= MAX_TEAM_SCORE => Ok(points),
            _ => Err(RecordValidationError::ScoreOverflow {
                team: team.to_string(),
                score,
                points,
            }),
        }
    }

    /// Team A score minus team B score; a team not seen yet counts as 0.
    fn differential(&self) -> i64 {
        let score = |i: usize| {
            self.teams
                .get(i)
                .map_or(0, |t| i64::try_from(t.score).unwrap_or(i64::MAX))
        };
        score(0) - score(1)
    }

    pub fn teams(&self) -> &[TeamState] {
        &self.teams
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn team(&self, name: &str) -> Option<&TeamState> {
        self.team_index.get(name).map(|&i| &self.teams[i])
    }

    pub fn player(&self, team: &str, name: &str) -> Option<&PlayerState> {
        self.player_index
            .get(team)
            .and_then(|roster| roster.get(name))
            .map(|&i| &self.players[i])
    }

    pub fn momentum(&self) -> &[MomentumSample] {
        &self.momentum
    }

    pub fn current_momentum(&self) -> i64 {
        self.momentum.last().map_or(0, |m| m.value)
    }

    /// The two teams the momentum line compares, once both have appeared.
    pub fn momentum_pair(&self) -> Option<(&str, &str)> {
        match self.teams.as_slice() {
            [a, b, ..] => Some((a.name.as_str(), b.name.as_str())),
            _ => None,
        }
    }

    /// Highest-scoring player on `team`. Ties go to whoever joined the feed first.
    pub fn top_scorer(&self, team: &str) -> Option<&PlayerState> {
        self.players
            .iter()
            .filter(|p| p.team == team)
            .fold(None, |best: Option<&PlayerState>, p| match best {
                Some(b) if b.points >= p.points => Some(b),
                _ => Some(p),
            })
    }

    /// Top scorer for every team, in team order.
    pub fn top_scorers(&self) -> Vec<&PlayerState> {
        self.teams
            .iter()
            .filter_map(|t| self.top_scorer(&t.name))
            .collect()
    }

    /// Sum of player totals credited to `team`.
    pub fn player_points_for(&self, team: &str) -> u64 {
        self.players
            .iter()
            .filter(|p| p.team == team)
            .map(|p| p.points)
            .sum()
    }

    pub fn notes(&self) -> impl Iterator<Item = &PlayNote> {
        self.notes.iter()
    }

    pub fn latest_note(&self) -> Option<&PlayNote> {
        self.notes.back()
    }

    /// Number of accepted events (also the next event index)
    pub fn applied(&self) -> usize {
        self.applied
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn is_empty(&self) -> bool {
        self.applied == 0
    }

    /// Read-only copy of the current state for a renderer
    pub fn snapshot(&self, title: &str) -> ChartSnapshot {
        ChartSnapshot::capture(self, title)
    }
}

fn validate(event: &GameEvent) -> Result<u32, RecordValidationError> {
    if event.team.trim().is_empty() {
        return Err(RecordValidationError::MissingTeam);
    }
    if event.player.trim().is_empty() {
        return Err(RecordValidationError::MissingPlayer);
    }
    event.points()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;

    fn event(team: &str, player: &str, points: i64) -> GameEvent {
        let ts = NaiveDateTime::parse_from_str("2025-10-05 19:00:00", TIMESTAMP_FORMAT).unwrap();
        GameEvent::new(ts, "LVA-PHX-G1", team, player, points)
    }

    fn run(events: &[GameEvent]) -> GameStats {
        let mut stats = GameStats::new();
        for e in events {
            let _ = stats.apply(e);
        }
        stats
    }

    fn assert_team_player_invariant(stats: &GameStats) {
        for team in stats.teams() {
            assert_eq!(
                stats.player_points_for(&team.name),
                team.score,
                "player totals for {} must equal team score",
                team.name
            );
        }
    }

    #[test]
    fn test_aces_mercury_scenario() {
        let stats = run(&[
            event("Aces", "A'ja Wilson", 2),
            event("Mercury", "X", 3),
            event("Aces", "A'ja Wilson", 2),
        ]);

        assert_eq!(stats.team("Aces").unwrap().score, 4);
        assert_eq!(stats.team("Mercury").unwrap().score, 3);

        let momentum: Vec<i64> = stats.momentum().iter().map(|m| m.value).collect();
        assert_eq!(momentum, vec![2, -1, 1]);

        let top = stats.top_scorer("Aces").unwrap();
        assert_eq!(top.name, "A'ja Wilson");
        assert_eq!(top.points, 4);
        assert_eq!(stats.momentum_pair(), Some(("Aces", "Mercury")));
    }

    #[test]
    fn test_negative_points_rejected_without_mutation() {
        let mut stats = run(&[event("Aces", "A'ja Wilson", 2), event("Mercury", "X", 3)]);
        let before_teams = stats.teams().to_vec();
        let before_players = stats.players().to_vec();
        let before_momentum = stats.momentum().to_vec();

        let err = stats.apply(&event("Aces", "Chelsea Gray", -1)).unwrap_err();
        assert_eq!(err, RecordValidationError::NegativePoints(-1));

        assert_eq!(stats.teams(), before_teams.as_slice());
        assert_eq!(stats.players(), before_players.as_slice());
        assert_eq!(stats.momentum(), before_momentum.as_slice());
        assert!(stats.player("Aces", "Chelsea Gray").is_none());
        assert_eq!(stats.rejected(), 1);

        // The next valid event is still processed, at the next free index.
        let applied = stats.apply(&event("Aces", "Chelsea Gray", 3)).unwrap();
        assert_eq!(applied.index, 2);
        assert_eq!(stats.team("Aces").unwrap().score, 5);
    }

    #[test]
    fn test_non_numeric_points_rejected() {
        let mut bad = event("Aces", "p", 0);
        bad.points_scored = serde_json::json!("two");

        let mut stats = GameStats::new();
        assert!(matches!(
            stats.apply(&bad),
            Err(RecordValidationError::NonIntegerPoints(_))
        ));
        assert!(stats.teams().is_empty());
        assert!(stats.is_empty());
    }

    #[test]
    fn test_blank_team_rejected() {
        let mut stats = GameStats::new();
        assert_eq!(
            stats.apply(&event("  ", "p", 2)),
            Err(RecordValidationError::MissingTeam)
        );
        assert_eq!(
            stats.apply(&event("Aces", "", 2)),
            Err(RecordValidationError::MissingPlayer)
        );
        assert_eq!(stats.rejected(), 2);
    }

    #[test]
    fn test_zero_point_event_keeps_note_but_no_sample() {
        let mut stats = GameStats::new();
        stats.apply(&event("Aces", "A'ja Wilson", 2)).unwrap();
        let applied = stats
            .apply(&event("Aces", "Jackie Young", 0).with_message("Defensive rebound"))
            .unwrap();

        assert_eq!(applied.points, 0);
        let aces = stats.team("Aces").unwrap();
        assert_eq!(aces.score, 2);
        assert_eq!(aces.samples, vec![(0, 2)]);
        assert_eq!(stats.momentum().len(), 2);

        let note = stats.latest_note().unwrap();
        assert_eq!(note.message, "Defensive rebound");
        assert_eq!(note.points, 0);
        assert_eq!(note.index, 1);
    }

    #[test]
    fn test_note_ring_is_bounded() {
        let mut stats = GameStats::new();
        for i in 0..(MAX_NOTES + 10) {
            stats
                .apply(&event("Aces", "p", 1).with_message(format!("play {i}")))
                .unwrap();
        }
        assert_eq!(stats.notes().count(), MAX_NOTES);
        assert_eq!(stats.notes().next().unwrap().message, "play 10");
    }

    #[test]
    fn test_momentum_single_team_counts_missing_side_as_zero() {
        let stats = run(&[event("Aces", "a", 2), event("Aces", "b", 3)]);
        let momentum: Vec<i64> = stats.momentum().iter().map(|m| m.value).collect();
        assert_eq!(momentum, vec![2, 5]);
        assert_eq!(stats.momentum_pair(), None);
    }

    #[test]
    fn test_momentum_ignores_third_team() {
        let stats = run(&[
            event("Aces", "a", 2),
            event("Mercury", "b", 3),
            event("Storm", "c", 10),
        ]);
        assert_eq!(stats.current_momentum(), -1);
    }

    #[test]
    fn test_momentum_matches_team_scores_at_every_index() {
        let events = vec![
            event("Aces", "a", 2),
            event("Mercury", "b", 3),
            event("Mercury", "c", 0),
            event("Aces", "a", 3),
            event("Mercury", "b", 1),
        ];

        let mut stats = GameStats::new();
        let (mut a, mut b) = (0i64, 0i64);
        for e in &events {
            let applied = stats.apply(e).unwrap();
            match e.team.as_str() {
                "Aces" => a += applied.points as i64,
                _ => b += applied.points as i64,
            }
            assert_eq!(applied.momentum, a - b);
        }
    }

    #[test]
    fn test_team_score_is_sum_of_accepted_points() {
        let events = vec![
            event("Aces", "a", 2),
            event("Mercury", "b", 3),
            event("Aces", "c", -4),
            event("Aces", "a", 1),
            event("Mercury", "d", 2),
        ];
        let stats = run(&events);

        for team in stats.teams() {
            let expected: u64 = events
                .iter()
                .filter(|e| e.team == team.name)
                .filter_map(|e| e.points().ok())
                .map(u64::from)
                .sum();
            assert_eq!(team.score, expected);
        }
        assert_team_player_invariant(&stats);
    }

    #[test]
    fn test_invariant_holds_after_every_event() {
        let events = vec![
            event("Aces", "A'ja Wilson", 2),
            event("Mercury", "Alyssa Thomas", 3),
            event("Aces", "Jackie Young", 3),
            event("Mercury", "Kahleah Copper", 2),
            event("Aces", "A'ja Wilson", 1),
        ];
        let mut stats = GameStats::new();
        for e in &events {
            stats.apply(e).unwrap();
            assert_team_player_invariant(&stats);
        }
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let events = vec![
            event("Aces", "A'ja Wilson", 2),
            event("Mercury", "Alyssa Thomas", 3),
            event("Aces", "Jackie Young", -2),
            event("Aces", "Jackie Young", 3),
        ];
        let first = run(&events);
        let second = run(&events);

        assert_eq!(first.teams(), second.teams());
        assert_eq!(first.players(), second.players());
        assert_eq!(first.momentum(), second.momentum());
    }

    #[test]
    fn test_top_scorer_tie_keeps_first_player() {
        let stats = run(&[event("Aces", "first", 2), event("Aces", "second", 2)]);
        assert_eq!(stats.top_scorer("Aces").unwrap().name, "first");
        assert!(stats.top_scorer("Mercury").is_none());
    }

    #[test]
    fn test_same_name_on_two_teams_is_two_players() {
        let stats = run(&[event("Aces", "X", 2), event("Mercury", "X", 3)]);

        assert_eq!(stats.players().len(), 2);
        assert_eq!(stats.player("Aces", "X").unwrap().points, 2);
        assert_eq!(stats.player("Mercury", "X").unwrap().points, 3);
        assert!(stats.player("Storm", "X").is_none());

        let top = stats.top_scorer("Mercury").unwrap();
        assert_eq!((top.name.as_str(), top.team.as_str(), top.points), ("X", "Mercury", 3));
        assert_eq!(stats.top_scorers().len(), 2);
        assert_team_player_invariant(&stats);
    }

    #[test]
    fn test_score_past_u32_range_is_exact() {
        let stats = run(&[
            event("Aces", "a", i64::from(u32::MAX)),
            event("Aces", "b", 5),
        ]);

        let aces = stats.team("Aces").unwrap();
        assert_eq!(aces.score, u64::from(u32::MAX) + 5);
        assert_eq!(stats.current_momentum(), i64::from(u32::MAX) + 5);
        assert_team_player_invariant(&stats);
    }

    #[test]
    fn test_score_overflow_rejected_without_mutation() {
        let mut stats = run(&[event("Aces", "a", 2), event("Mercury", "b", 1)]);
        stats.teams[0].score = MAX_TEAM_SCORE - 1;
        let before_teams = stats.teams().to_vec();
        let before_players = stats.players().to_vec();

        let err = stats.apply(&event("Aces", "c", 2)).unwrap_err();
        assert!(matches!(err, RecordValidationError::ScoreOverflow { points: 2, .. }));
        assert_eq!(stats.teams(), before_teams.as_slice());
        assert_eq!(stats.players(), before_players.as_slice());
        assert!(stats.player("Aces", "c").is_none());
        assert_eq!(stats.rejected(), 1);
        assert_eq!(stats.applied(), 2);

        // Right up to the limit is still fine.
        let applied = stats.apply(&event("Aces", "c", 1)).unwrap();
        assert_eq!(applied.team_score, MAX_TEAM_SCORE);
        assert_eq!(applied.momentum, i64::MAX - 1);
    }

    #[test]
    fn test_team_samples_record_index_and_score() {
        let stats = run(&[
            event("Aces", "a", 2),
            event("Mercury", "b", 3),
            event("Aces", "a", 3),
        ]);
        assert_eq!(stats.team("Aces").unwrap().samples, vec![(0, 2), (2, 5)]);
        assert_eq!(stats.team("Mercury").unwrap().samples, vec![(1, 3)]);
    }
}
