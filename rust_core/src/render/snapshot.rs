//! Read-only view of the aggregate state, shaped for plotting.

use crate::models::PlayNote;
use crate::stats::GameStats;

/// Cumulative score line for one team
#[derive(Debug, Clone, PartialEq)]
pub struct TeamSeries {
    pub name: String,
    pub score: u64,
    /// Step line (x = event index, y = score) running to the latest index
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopScorer {
    pub team: String,
    pub player: String,
    pub points: u64,
}

impl TopScorer {
    pub fn label(&self) -> String {
        format!("{} top scorer: {} ({})", self.team, self.player, self.points)
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSnapshot {
    pub title: String,
    /// Index of the last applied event, `None` before the first one
    pub latest_index: Option<usize>,
    pub teams: Vec<TeamSeries>,
    pub momentum: Vec<(f64, f64)>,
    pub momentum_pair: Option<(String, String)>,
    pub current_momentum: i64,
    pub top_scorers: Vec<TopScorer>,
    pub latest_note: Option<PlayNote>,
    pub applied: usize,
    pub rejected: usize,
}

impl ChartSnapshot {
    pub fn capture(stats: &GameStats, title: &str) -> Self {
        let latest_index = stats.applied().checked_sub(1);
        let x_end = latest_index.unwrap_or(0) as f64;

        let teams = stats
            .teams()
            .iter()
            .map(|team| {
                let mut points = vec![(0.0, 0.0)];
                let mut prev = 0.0;
                for &(index, score) in &team.samples {
                    let x = index as f64;
                    points.push((x, prev));
                    points.push((x, score as f64));
                    prev = score as f64;
                }
                points.push((x_end, prev));
                TeamSeries {
                    name: team.name.clone(),
                    score: team.score,
                    points,
                }
            })
            .collect();

        let momentum = stats
            .momentum()
            .iter()
            .map(|m| (m.index as f64, m.value as f64))
            .collect();

        let top_scorers = stats
            .top_scorers()
            .into_iter()
            .map(|p| TopScorer {
                team: p.team.clone(),
                player: p.name.clone(),
                points: p.points,
            })
            .collect();

        Self {
            title: title.to_string(),
            latest_index,
            teams,
            momentum,
            momentum_pair: stats
                .momentum_pair()
                .map(|(a, b)| (a.to_string(), b.to_string())),
            current_momentum: stats.current_momentum(),
            top_scorers,
            latest_note: stats.latest_note().cloned(),
            applied: stats.applied(),
            rejected: stats.rejected(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.applied == 0
    }

    /// Right edge of the shared event axis
    pub fn x_max(&self) -> f64 {
        self.latest_index.unwrap_or(0).max(1) as f64
    }

    /// Score axis top: next multiple of 10 above the leading score (at least 20)
    pub fn score_y_max(&self) -> f64 {
        let max_score = self.teams.iter().map(|t| t.score).max().unwrap_or(0).max(10);
        round_up_to_tens(max_score)
    }

    /// Symmetric momentum axis bound: next multiple of 10 above the widest swing
    pub fn momentum_y_max(&self) -> f64 {
        let max_diff = self
            .momentum
            .iter()
            .map(|&(_, v)| v.abs() as u64)
            .max()
            .unwrap_or(0);
        round_up_to_tens(max_diff)
    }

    /// Latest point of a team's line, where its top-scorer label sits
    pub fn label_anchor(&self, team: &str) -> Option<(f64, f64)> {
        self.teams
            .iter()
            .find(|t| t.name == team)
            .and_then(|t| t.points.last().copied())
    }
}

fn round_up_to_tens(value: u64) -> f64 {
    (value / 10).saturating_add(1).saturating_mul(10) as f64
}
