/// Типы данных для предсказания

use serde::{Deserialize, Serialize};

use crate::dataset::Table;
use crate::error::Result;

/// Признаки одного студента, без целевой оценки по математике
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub gender: String,
    pub race_ethnicity: String,
    pub parental_level_of_education: String,
    pub lunch: String,
    pub test_preparation_course: String,
    pub reading_score: Option<f64>,
    pub writing_score: Option<f64>,
}

impl StudentRecord {
    pub const COLUMNS: [&'static str; 7] = [
        "gender",
        "race_ethnicity",
        "parental_level_of_education",
        "lunch",
        "test_preparation_course",
        "reading_score",
        "writing_score",
    ];

    fn values(&self) -> Vec<Option<String>> {
        let text = |v: &str| (!crate::dataset::is_missing(v)).then(|| v.to_string());
        vec![
            text(&self.gender),
            text(&self.race_ethnicity),
            text(&self.parental_level_of_education),
            text(&self.lunch),
            text(&self.test_preparation_course),
            self.reading_score.map(|v| v.to_string()),
            self.writing_score.map(|v| v.to_string()),
        ]
    }

    pub fn to_table(&self) -> Result<Table> {
        Self::records_to_table(std::slice::from_ref(self))
    }

    /// Одна строка таблицы на запись, в порядке записей
    pub fn records_to_table(records: &[StudentRecord]) -> Result<Table> {
        Table::new(
            Self::COLUMNS.iter().map(|c| c.to_string()).collect(),
            records.iter().map(StudentRecord::values).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> StudentRecord {
        StudentRecord {
            gender: "female".to_string(),
            race_ethnicity: "group B".to_string(),
            parental_level_of_education: "bachelor's degree".to_string(),
            lunch: "standard".to_string(),
            test_preparation_course: "none".to_string(),
            reading_score: Some(72.0),
            writing_score: None,
        }
    }

    #[test]
    fn converts_to_one_row_table() {
        let table = record().to_table().unwrap();
        assert_eq!(table.n_rows(), 1);
        assert_eq!(table.n_cols(), 7);
        assert_eq!(table.column("reading_score").unwrap(), vec![Some("72")]);
        assert_eq!(table.column("writing_score").unwrap(), vec![None]);
        assert_eq!(table.column("lunch").unwrap(), vec![Some("standard")]);
    }

    #[test]
    fn deserializes_from_json() {
        let json = r#"{
            "gender": "male",
            "race_ethnicity": "group A",
            "parental_level_of_education": "some college",
            "lunch": "free/reduced",
            "test_preparation_course": "completed",
            "reading_score": 57,
            "writing_score": 44
        }"#;
        let parsed: StudentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.writing_score, Some(44.0));
        assert_eq!(parsed.gender, "male");
    }
}
