use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Label used when grouping members that never received a role.
pub const UNASSIGNED_LABEL: &str = "Unassigned";

/// One roster row, kept in header order exactly as it was read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentRecord {
    fields: Vec<(String, String)>,
}

impl StudentRecord {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for StudentRecord {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        )
    }
}

impl Serialize for StudentRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// How a student ended up in their team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    FirstChoice,
    SecondChoice,
    OpenSlot,
    Overflow,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Placement::FirstChoice => "first choice",
            Placement::SecondChoice => "second choice",
            Placement::OpenSlot => "open slot",
            Placement::Overflow => "overflow",
        };
        f.write_str(label)
    }
}

/// A roster row plus everything derived from it during a run. The row is
/// serialized under `record` so roster columns never clash with derived keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredStudent {
    pub record: StudentRecord,
    pub preference_ranking: Vec<String>,
    pub aggregate_score: f64,
    pub assigned_role: Option<String>,
    pub placement: Option<Placement>,
}

impl ScoredStudent {
    /// The role ranked at `rank` (0 = most preferred), if the ranking is that long.
    pub fn preference(&self, rank: usize) -> Option<&str> {
        self.preference_ranking.get(rank).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRequirement {
    pub role: String,
    pub count: usize,
}

impl RoleRequirement {
    pub fn new(role: impl Into<String>, count: usize) -> Self {
        Self {
            role: role.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleSlot {
    pub role: String,
    pub remaining: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    pub members: Vec<ScoredStudent>,
    pub remaining: Vec<RoleSlot>,
}

impl Team {
    pub fn new(requirements: &[RoleRequirement]) -> Self {
        Self {
            members: Vec::new(),
            remaining: requirements
                .iter()
                .map(|req| RoleSlot {
                    role: req.role.clone(),
                    remaining: req.count,
                })
                .collect(),
        }
    }

    pub fn remaining_for(&self, role: &str) -> usize {
        self.remaining
            .iter()
            .filter(|slot| slot.role == role)
            .map(|slot| slot.remaining)
            .sum()
    }

    pub fn has_room_for(&self, role: &str) -> bool {
        self.remaining_for(role) > 0
    }

    /// First role in requirement order that still has capacity.
    pub fn first_open_role(&self) -> Option<&str> {
        self.remaining
            .iter()
            .find(|slot| slot.remaining > 0)
            .map(|slot| slot.role.as_str())
    }

    /// Places `student` into `role`, consuming one unit of capacity.
    /// Returns the student back if the role has no capacity left.
    pub fn seat(
        &mut self,
        mut student: ScoredStudent,
        role: &str,
        placement: Placement,
    ) -> Result<(), ScoredStudent> {
        match self
            .remaining
            .iter_mut()
            .find(|slot| slot.role == role && slot.remaining > 0)
        {
            Some(slot) => {
                slot.remaining -= 1;
                student.assigned_role = Some(slot.role.clone());
                student.placement = Some(placement);
                self.members.push(student);
                Ok(())
            }
            None => Err(student),
        }
    }

    /// Appends `student` without touching declared capacity.
    pub fn seat_overflow(&mut self, mut student: ScoredStudent) {
        student.placement = Some(Placement::Overflow);
        self.members.push(student);
    }

    pub fn remaining_total(&self) -> usize {
        self.remaining.iter().map(|slot| slot.remaining).sum()
    }

    /// Members grouped by assigned role, groups in order of first appearance.
    pub fn members_by_role(&self) -> Vec<(&str, Vec<&ScoredStudent>)> {
        let mut groups: Vec<(&str, Vec<&ScoredStudent>)> = Vec::new();
        for member in &self.members {
            let role = member.assigned_role.as_deref().unwrap_or(UNASSIGNED_LABEL);
            match groups.iter_mut().find(|(name, _)| *name == role) {
                Some((_, members)) => members.push(member),
                None => groups.push((role, vec![member])),
            }
        }
        groups
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlacementCounts {
    pub first_choice: usize,
    pub second_choice: usize,
    pub open_slot: usize,
    pub overflow: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub properties: Vec<String>,
    pub teams: Vec<Team>,
}

impl Assignment {
    pub fn member_count(&self) -> usize {
        self.teams.iter().map(|team| team.members.len()).sum()
    }

    pub fn placement_counts(&self) -> PlacementCounts {
        let mut counts = PlacementCounts::default();
        for member in self.teams.iter().flat_map(|team| team.members.iter()) {
            match member.placement {
                Some(Placement::FirstChoice) => counts.first_choice += 1,
                Some(Placement::SecondChoice) => counts.second_choice += 1,
                Some(Placement::OpenSlot) => counts.open_slot += 1,
                Some(Placement::Overflow) | None => counts.overflow += 1,
            }
        }
        counts
    }
}
