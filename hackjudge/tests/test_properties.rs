use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use indexmap::IndexMap;
use proptest::prelude::*;

use hackjudge::engine::{JudgingEngine, Principal};
use hackjudge::error::EliminationError;
use hackjudge::judging::{LeaderboardScope, phase_leaderboard, plan_elimination};
use hackjudge::phase::{PhaseStatus, status};
use hackjudge::store::MemoryStore;
use hackjudge_core::{Hackathon, Phase, Registration, Score, Submission, TeamId};

fn phase(start_offset: i64, length: i64) -> Phase {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    Phase {
        name: "p".into(),
        description: String::new(),
        start_time: base + Duration::seconds(start_offset),
        end_time: base + Duration::seconds(start_offset + length),
        deliverables: vec![],
    }
}

/// One team per entry: `(handed_in, score)` for phase 0.
fn hackathon(teams: &[(bool, Option<u8>)]) -> Hackathon {
    Hackathon {
        code: "PROP".into(),
        name: String::new(),
        admins: vec![],
        phases: vec![phase(0, 3600)],
        registrations: teams
            .iter()
            .enumerate()
            .map(|(i, (handed_in, score))| {
                let mut deliverables = IndexMap::new();
                if *handed_in {
                    deliverables.insert("repo".to_string(), format!("https://git.example/{i}"));
                }
                Registration {
                    team_id: TeamId::new(format!("team-{i:02}")),
                    team_name: format!("Team {i}"),
                    leader: "lead".into(),
                    members: vec![],
                    submissions: vec![Submission {
                        phase_index: 0,
                        submitted_at: None,
                        deliverables,
                        score: score.map(|v| Score::try_from(i64::from(v)).unwrap()),
                    }],
                }
            })
            .collect(),
    }
}

fn team_strategy() -> impl Strategy<Value = (bool, Option<u8>)> {
    (any::<bool>(), proptest::option::of(0u8..=100))
}

proptest! {
    #[test]
    fn status_partitions_time(length in 1i64..100_000, offset in -200_000i64..200_000) {
        let p = phase(0, length);
        let now = p.start_time + Duration::seconds(offset);
        let expected = if offset < 0 {
            PhaseStatus::Upcoming
        } else if offset <= length {
            PhaseStatus::Active
        } else {
            PhaseStatus::Completed
        };
        prop_assert_eq!(status(&p, now), expected);
        prop_assert_eq!(status(&p, p.start_time), PhaseStatus::Active);
        prop_assert_eq!(status(&p, p.end_time), PhaseStatus::Active);
    }

    #[test]
    fn phase_view_excludes_teams_without_deliverables(
        teams in proptest::collection::vec(team_strategy(), 0..20)
    ) {
        let h = hackathon(&teams);
        let board = phase_leaderboard(&h, 0).unwrap();
        let handed_in = teams.iter().filter(|(d, _)| *d).count();
        prop_assert_eq!(board.len(), handed_in);
        for entry in &board.entries {
            prop_assert!(entry.has_submission);
        }
        let pending = teams.iter().filter(|(d, s)| *d && s.is_none()).count();
        prop_assert_eq!(board.pending_grades, pending);
        for pair in board.entries.windows(2) {
            prop_assert!(
                pair[0].score > pair[1].score
                    || (pair[0].score == pair[1].score && pair[0].team_id < pair[1].team_id)
            );
        }
    }

    #[test]
    fn elimination_never_empties_the_view(
        scores in proptest::collection::vec(0u8..=100, 1..15),
        count in 1i64..20
    ) {
        let teams: Vec<_> = scores.iter().map(|s| (true, Some(*s))).collect();
        let h = hackathon(&teams);
        match plan_elimination(&h, LeaderboardScope::Overall, count) {
            Ok(result) => {
                prop_assert!(!result.eliminated.is_empty());
                prop_assert!(result.eliminated.len() >= usize::try_from(count).unwrap());
                prop_assert!(result.remaining >= 1);
                for team in &h.registrations {
                    let score = u32::from(team.submissions[0].score.map_or(0, u8::from));
                    let gone = result.eliminated.contains(&team.team_id);
                    prop_assert_eq!(gone, score <= result.cutoff_score);
                }
            }
            Err(EliminationError::CannotEliminateAll { ranked, .. }) => {
                prop_assert_eq!(ranked, scores.len());
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn rescoring_is_idempotent(value in 0u8..=100, repeats in 1usize..4) {
        let engine = JudgingEngine::new(Arc::new(MemoryStore::with_hackathons([
            hackathon(&[(true, None), (false, Some(3))]),
        ])));
        let judge = Principal::new("judge");
        let raw = value.to_string();

        let snapshots = tokio_test::block_on(async {
            let mut out = Vec::new();
            for _ in 0..repeats {
                engine
                    .record_score(&judge, "PROP", &TeamId::new("team-00"), 0, &raw)
                    .await
                    .unwrap();
                out.push(engine.hackathon("PROP").await.unwrap());
            }
            out
        });

        for snapshot in &snapshots {
            prop_assert_eq!(snapshot, &snapshots[0]);
            prop_assert_eq!(snapshot.registrations[0].submissions.len(), 1);
        }
    }
}
