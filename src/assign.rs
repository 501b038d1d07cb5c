use std::cmp::Ordering;

use crate::error::AssignError;
use crate::models::{Placement, RoleRequirement, ScoredStudent, Team};

/// Splits scored students into teams shaped by `requirements`.
///
/// Students are taken in descending aggregate score (stable, so input order
/// breaks ties) and placed first-fit by team index:
///
/// 1. into a team with room for their top-ranked role,
/// 2. then for their second-ranked role,
/// 3. then into any role a team still has room for,
/// 4. and finally, without consuming capacity, into the smallest team.
///
/// Every student ends up in exactly one team.
pub fn assign_teams(
    students: Vec<ScoredStudent>,
    requirements: &[RoleRequirement],
) -> Result<Vec<Team>, AssignError> {
    let team_capacity = team_capacity(requirements)?;

    let mut ordered = students;
    ordered.sort_by(|a, b| {
        b.aggregate_score
            .partial_cmp(&a.aggregate_score)
            .unwrap_or(Ordering::Equal)
    });

    let team_count = ordered.len().div_ceil(team_capacity);
    let mut teams: Vec<Team> = (0..team_count).map(|_| Team::new(requirements)).collect();
    tracing::debug!(
        students = ordered.len(),
        team_capacity,
        team_count,
        "prepared teams"
    );

    let unplaced = place_by_preference(&mut teams, ordered, 0, Placement::FirstChoice);
    tracing::debug!(unplaced = unplaced.len(), "first preference pass done");

    let unplaced = place_by_preference(&mut teams, unplaced, 1, Placement::SecondChoice);
    tracing::debug!(unplaced = unplaced.len(), "second preference pass done");

    let unplaced = place_in_open_slots(&mut teams, unplaced);
    if !unplaced.is_empty() {
        tracing::warn!(
            students = unplaced.len(),
            "role capacity exhausted, placing remaining students as overflow"
        );
    }
    place_overflow(&mut teams, requirements, unplaced);

    Ok(teams)
}

/// Total headcount of one team, after checking the requirements are usable.
pub fn team_capacity(requirements: &[RoleRequirement]) -> Result<usize, AssignError> {
    if requirements.is_empty() {
        return Err(AssignError::NoRoles);
    }
    if let Some(req) = requirements.iter().find(|req| req.count == 0) {
        return Err(AssignError::ZeroCount(req.role.clone()));
    }
    Ok(requirements.iter().map(|req| req.count).sum())
}

fn place_by_preference(
    teams: &mut [Team],
    students: Vec<ScoredStudent>,
    rank: usize,
    placement: Placement,
) -> Vec<ScoredStudent> {
    let mut unplaced = Vec::new();

    for student in students {
        let Some(role) = student.preference(rank).map(str::to_owned) else {
            unplaced.push(student);
            continue;
        };

        match teams.iter_mut().find(|team| team.has_room_for(&role)) {
            Some(team) => {
                if let Err(student) = team.seat(student, &role, placement) {
                    unplaced.push(student);
                }
            }
            None => unplaced.push(student),
        }
    }

    unplaced
}

fn place_in_open_slots(teams: &mut [Team], students: Vec<ScoredStudent>) -> Vec<ScoredStudent> {
    let mut unplaced = Vec::new();

    for student in students {
        let open = teams.iter_mut().find_map(|team| {
            let role = team.first_open_role()?.to_owned();
            Some((team, role))
        });

        match open {
            Some((team, role)) => {
                if let Err(student) = team.seat(student, &role, Placement::OpenSlot) {
                    unplaced.push(student);
                }
            }
            None => unplaced.push(student),
        }
    }

    unplaced
}

/// Seats everyone left over in the smallest team. A team is opened if there
/// are none, so no student is ever left out.
fn place_overflow(
    teams: &mut Vec<Team>,
    requirements: &[RoleRequirement],
    students: Vec<ScoredStudent>,
) {
    if teams.is_empty() && !students.is_empty() {
        teams.push(Team::new(requirements));
    }

    for student in students {
        // min_by_key keeps the first of equal minima, i.e. the lowest index.
        if let Some(team) = teams.iter_mut().min_by_key(|team| team.members.len()) {
            team.seat_overflow(student);
        }
    }
}
