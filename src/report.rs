use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{Assignment, Placement, ScoredStudent, StudentRecord};

/// `Name - Prop: value, Prop: value` for one team member.
pub fn member_line(member: &ScoredStudent, properties: &[String], name_field: &str) -> String {
    let name = member.record.get(name_field).unwrap_or("(unnamed)");
    let values = properties
        .iter()
        .map(|prop| format!("{}: {}", prop, member.record.get(prop).unwrap_or("n/a")))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} - {}", name, values)
}

pub fn build_report(
    assignment: &Assignment,
    source: &str,
    generated_on: NaiveDate,
    name_field: &str,
) -> String {
    let counts = assignment.placement_counts();
    let mut output = String::new();

    let _ = writeln!(output, "# Team Assignment Report");
    let _ = writeln!(output, "Generated from {} on {}", source, generated_on);
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "{} students across {} teams, matched on: {}",
        assignment.member_count(),
        assignment.teams.len(),
        assignment.properties.join(", ")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Placement Summary");
    for (placement, count) in [
        (Placement::FirstChoice, counts.first_choice),
        (Placement::SecondChoice, counts.second_choice),
        (Placement::OpenSlot, counts.open_slot),
        (Placement::Overflow, counts.overflow),
    ] {
        let _ = writeln!(output, "- {}: {}", placement, count);
    }

    if assignment.teams.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "No students to place.");
        return output;
    }

    for (index, team) in assignment.teams.iter().enumerate() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Team {}", index + 1);

        if team.remaining_total() > 0 {
            let open: Vec<String> = team
                .remaining
                .iter()
                .filter(|slot| slot.remaining > 0)
                .map(|slot| format!("{} x{}", slot.role, slot.remaining))
                .collect();
            let _ = writeln!(output, "Open slots: {}", open.join(", "));
        }

        for (role, members) in team.members_by_role() {
            let _ = writeln!(output, "- **{} ({})**", role, members.len());
            for member in members {
                let _ = writeln!(
                    output,
                    "  - {}",
                    member_line(member, &assignment.properties, name_field)
                );
            }
        }
    }

    output
}

pub fn assignment_json(assignment: &Assignment) -> serde_json::Result<String> {
    serde_json::to_string_pretty(assignment)
}

pub fn records_json(records: &[StudentRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RoleRequirement, Team};

    fn member(name: &str, dev: &str, role: Option<&str>, placement: Placement) -> ScoredStudent {
        ScoredStudent {
            record: StudentRecord::from([("Name", name), ("Developer", dev)]),
            preference_ranking: vec!["Developer".to_string()],
            aggregate_score: 0.0,
            assigned_role: role.map(str::to_string),
            placement: Some(placement),
        }
    }

    fn sample() -> Assignment {
        let mut team = Team::new(&[
            RoleRequirement::new("Developer", 1),
            RoleRequirement::new("Tester", 1),
        ]);
        team.seat(
            member("Avery Lee", "9", None, Placement::FirstChoice),
            "Developer",
            Placement::FirstChoice,
        )
        .unwrap();
        team.seat_overflow(member("Jules Moreno", "4", None, Placement::Overflow));

        Assignment {
            properties: vec!["Developer".to_string(), "Tester".to_string()],
            teams: vec![team],
        }
    }

    #[test]
    fn member_line_lists_selected_values() {
        let line = member_line(
            &member("Avery Lee", "9", Some("Developer"), Placement::FirstChoice),
            &["Developer".to_string(), "Tester".to_string()],
            "Name",
        );
        assert_eq!(line, "Avery Lee - Developer: 9, Tester: n/a");
    }

    #[test]
    fn report_groups_members_by_role() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        let report = build_report(&sample(), "roster.csv", date, "Name");

        assert!(report.contains("Generated from roster.csv on 2026-02-02"));
        assert!(report.contains("- first choice: 1"));
        assert!(report.contains("- overflow: 1"));
        assert!(report.contains("## Team 1"));
        assert!(report.contains("Open slots: Tester x1"));
        assert!(report.contains("- **Developer (1)**\n  - Avery Lee - Developer: 9, Tester: n/a"));
        assert!(report.contains("- **Unassigned (1)**\n  - Jules Moreno"));
    }

    #[test]
    fn empty_assignment_says_so() {
        let assignment = Assignment {
            properties: vec!["Developer".to_string()],
            teams: Vec::new(),
        };
        let date = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        let report = build_report(&assignment, "roster.csv", date, "Name");
        assert!(report.contains("No students to place."));
    }

    #[test]
    fn json_carries_record_and_derived_fields() {
        let json = assignment_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value["teams"][0]["members"][0];
        assert_eq!(first["record"]["Name"], "Avery Lee");
        assert_eq!(first["assigned_role"], "Developer");
        assert_eq!(first["placement"], "first_choice");
        assert_eq!(value["teams"][0]["remaining"][1]["remaining"], 1);
    }

    #[test]
    fn roster_columns_named_like_derived_fields_stay_separate() {
        let mut team = Team::new(&[RoleRequirement::new("Developer", 1)]);
        let student = ScoredStudent {
            record: StudentRecord::from([("Name", "Kiara Patel"), ("placement", "remote")]),
            preference_ranking: vec!["Developer".to_string()],
            aggregate_score: 0.0,
            assigned_role: None,
            placement: None,
        };
        team.seat(student, "Developer", Placement::FirstChoice)
            .unwrap();
        let assignment = Assignment {
            properties: vec!["Developer".to_string()],
            teams: vec![team],
        };

        let json = assignment_json(&assignment).unwrap();
        assert_eq!(json.matches("\"placement\"").count(), 2);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let member = &value["teams"][0]["members"][0];
        assert_eq!(member["record"]["placement"], "remote");
        assert_eq!(member["placement"], "first_choice");
    }
}
