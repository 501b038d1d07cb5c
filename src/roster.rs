use std::io::Read;
use std::path::Path;

use anyhow::Context;

use crate::models::StudentRecord;

/// The parsed roster: header names plus one record per data row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    pub headers: Vec<String>,
    pub students: Vec<StudentRecord>,
}

impl Roster {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open roster {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("failed to read roster {}", path.display()))
    }

    /// Rows shorter than the header simply lack their tail fields; extra
    /// trailing fields are ignored. Blank lines are skipped by the reader, but
    /// a row of empty cells is still a student.
    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .context("roster has no header row")?
            .iter()
            .map(str::to_string)
            .collect();

        let mut students = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let row = result.with_context(|| format!("malformed roster row {}", index + 2))?;
            if row.len() < headers.len() {
                tracing::debug!(
                    row = index + 2,
                    fields = row.len(),
                    expected = headers.len(),
                    "short roster row"
                );
            }
            let fields = headers
                .iter()
                .zip(row.iter())
                .map(|(header, value)| (header.clone(), value.to_string()))
                .collect();
            students.push(StudentRecord::new(fields));
        }

        tracing::info!(
            students = students.len(),
            columns = headers.len(),
            "loaded roster"
        );
        Ok(Self { headers, students })
    }

    /// Headers whose filled-in values all read as numbers: the columns worth
    /// offering as preference signals.
    pub fn numeric_headers(&self) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|header| {
                let mut values = self
                    .students
                    .iter()
                    .filter_map(|student| student.get(header))
                    .filter(|value| !value.is_empty())
                    .peekable();
                values.peek().is_some()
                    && values.all(|value| value.parse::<f64>().is_ok_and(f64::is_finite))
            })
            .map(String::as_str)
            .collect()
    }

    /// Selected properties that do not appear in the header row.
    pub fn unknown_properties<'a>(&self, properties: &'a [String]) -> Vec<&'a str> {
        properties
            .iter()
            .filter(|prop| !self.headers.contains(*prop))
            .map(String::as_str)
            .collect()
    }
}
