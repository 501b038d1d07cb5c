use rand::seq::SliceRandom;
use rand::Rng;

use crate::assign::assign_teams;
use crate::config::AssignmentConfig;
use crate::error::AssignError;
use crate::models::Assignment;
use crate::roster::Roster;
use crate::scoring::score_students;

/// A loaded roster together with the selection it is being matched on.
///
/// Each run scores and assigns from scratch; nothing carries over between
/// runs except the roster order, which [`Session::reshuffle`] changes.
#[derive(Debug, Clone)]
pub struct Session {
    roster: Roster,
    config: AssignmentConfig,
}

impl Session {
    pub fn new(roster: Roster, config: AssignmentConfig) -> Self {
        for prop in roster.unknown_properties(&config.properties) {
            tracing::warn!(
                property = prop,
                "selected property is not a roster column; scoring it as 0"
            );
        }
        Self { roster, config }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn config(&self) -> &AssignmentConfig {
        &self.config
    }

    pub fn run(&self) -> Result<Assignment, AssignError> {
        let scored = score_students(&self.roster.students, &self.config.properties)?;
        let teams = assign_teams(scored, &self.config.roles)?;

        let assignment = Assignment {
            properties: self.config.properties.clone(),
            teams,
        };
        let counts = assignment.placement_counts();
        tracing::info!(
            students = assignment.member_count(),
            teams = assignment.teams.len(),
            first_choice = counts.first_choice,
            second_choice = counts.second_choice,
            open_slot = counts.open_slot,
            overflow = counts.overflow,
            "matched students to teams"
        );
        Ok(assignment)
    }

    /// Permutes the roster order and runs again.
    pub fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Assignment, AssignError> {
        self.roster.students.shuffle(rng);
        tracing::debug!("reshuffled roster order");
        self.run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Placement, RoleRequirement};
    use crate::shuffle::rng_for;
    use proptest::prelude::*;

    const ROSTER: &str = "\
Name,Scrum Master,Quality Assurance,Developer
Avery Lee,5,3,9
Jules Moreno,2,4,4
Kiara Patel,8,1,7
Noor Haddad,1,1,1
Sam Ortiz,3,5,2
Rin Tanaka,4,4,4
Mateo Cruz,0,2,6
";

    fn session() -> Session {
        let roster = Roster::from_reader(ROSTER.as_bytes()).unwrap();
        let config = AssignmentConfig::new(
            vec![
                "Scrum Master".to_string(),
                "Quality Assurance".to_string(),
                "Developer".to_string(),
            ],
            vec![
                RoleRequirement::new("Scrum Master", 1),
                RoleRequirement::new("Quality Assurance", 1),
                RoleRequirement::new("Developer", 2),
            ],
        )
        .unwrap();
        Session::new(roster, config)
    }

    fn member_names(assignment: &Assignment) -> Vec<Vec<String>> {
        assignment
            .teams
            .iter()
            .map(|team| {
                team.members
                    .iter()
                    .map(|member| member.record.get("Name").unwrap_or_default().to_string())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn run_places_every_student_once() {
        let assignment = session().run().unwrap();
        assert_eq!(assignment.teams.len(), 2);
        assert_eq!(assignment.member_count(), 7);

        let mut names: Vec<String> = member_names(&assignment).into_iter().flatten().collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 7);
    }

    #[test]
    fn highest_scorers_get_first_pick() {
        let assignment = session().run().unwrap();
        let team = &assignment.teams[0];

        // Avery (17) and Kiara (16) lead the roster.
        assert_eq!(team.members[0].record.get("Name"), Some("Avery Lee"));
        assert_eq!(team.members[0].assigned_role.as_deref(), Some("Developer"));
        assert_eq!(team.members[1].record.get("Name"), Some("Kiara Patel"));
        assert_eq!(team.members[1].assigned_role.as_deref(), Some("Scrum Master"));
        assert_eq!(team.members[1].placement, Some(Placement::FirstChoice));
    }

    #[test]
    fn runs_without_reshuffle_are_identical() {
        let session = session();
        assert_eq!(session.run().unwrap(), session.run().unwrap());
    }

    #[test]
    fn reshuffle_keeps_every_student() {
        let mut session = session();
        let mut rng = rng_for(Some(99));
        for _ in 0..5 {
            let assignment = session.reshuffle(&mut rng).unwrap();
            assert_eq!(assignment.member_count(), 7);
        }
        assert_eq!(session.roster().students.len(), 7);
    }

    proptest! {
        #[test]
        fn any_reshuffle_places_every_student_once(
            seed in any::<u64>(),
            rounds in 1usize..4,
        ) {
            let mut session = session();
            let mut expected: Vec<String> = session
                .roster()
                .students
                .iter()
                .map(|student| student.get("Name").unwrap_or_default().to_string())
                .collect();
            expected.sort();

            let mut rng = rng_for(Some(seed));
            for _ in 0..rounds {
                let assignment = session.reshuffle(&mut rng).unwrap();
                let mut placed: Vec<String> =
                    member_names(&assignment).into_iter().flatten().collect();
                placed.sort();
                prop_assert_eq!(&placed, &expected);
            }
        }
    }

    #[test]
    fn seeded_reshuffles_replay() {
        let mut first = session();
        let mut second = session();
        let a = first.reshuffle(&mut rng_for(Some(5))).unwrap();
        let b = second.reshuffle(&mut rng_for(Some(5))).unwrap();
        assert_eq!(member_names(&a), member_names(&b));
    }
}
