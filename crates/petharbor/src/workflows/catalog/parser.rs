use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::workflows::adoption::{NewPet, NewShelter};

/// One validated roster line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CatalogRecord {
    pub(crate) line: u64,
    pub(crate) shelter: NewShelter,
    pub(crate) pet: Option<NewPet>,
}

/// Row-level problem reported with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RowError {
    pub(crate) line: u64,
    pub(crate) reason: String,
}

#[derive(Debug)]
pub(crate) enum ParseFailure {
    Csv(csv::Error),
    Row(RowError),
}

impl From<csv::Error> for ParseFailure {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<CatalogRecord>, ParseFailure> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for result in csv_reader.records() {
        let raw = result?;
        let line = raw.position().map_or(0, |position| position.line());
        let row: CatalogRow = raw.deserialize(Some(&headers))?;
        records.push(row.into_record(line).map_err(ParseFailure::Row)?);
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "Shelter")]
    shelter: String,
    #[serde(rename = "City", default)]
    city: String,
    #[serde(
        rename = "Foster Program",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    foster_program: Option<String>,
    #[serde(rename = "Rank", default, deserialize_with = "empty_string_as_none")]
    rank: Option<String>,
    #[serde(rename = "Pet", default, deserialize_with = "empty_string_as_none")]
    pet: Option<String>,
    #[serde(rename = "Breed", default)]
    breed: String,
    #[serde(rename = "Age", default, deserialize_with = "empty_string_as_none")]
    age: Option<String>,
    #[serde(
        rename = "Adoptable",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    adoptable: Option<String>,
}

impl CatalogRow {
    fn into_record(self, line: u64) -> Result<CatalogRecord, RowError> {
        let invalid = |reason: String| RowError { line, reason };

        let shelter_name = collapse_whitespace(&self.shelter);
        if shelter_name.is_empty() {
            return Err(invalid("shelter name is blank".to_string()));
        }

        let foster_program = match self.foster_program.as_deref() {
            Some(value) => parse_flag(value)
                .ok_or_else(|| invalid(format!("'{value}' is not a valid foster program flag")))?,
            None => false,
        };
        let rank = match self.rank.as_deref() {
            Some(value) => value
                .parse::<i32>()
                .map_err(|_| invalid(format!("'{value}' is not a valid rank")))?,
            None => 0,
        };

        let pet = match self.pet {
            Some(name) => {
                let age = match self.age.as_deref() {
                    Some(value) => value
                        .parse::<u32>()
                        .map_err(|_| invalid(format!("'{value}' is not a valid age")))?,
                    None => 0,
                };
                let adoptable = match self.adoptable.as_deref() {
                    Some(value) => parse_flag(value).ok_or_else(|| {
                        invalid(format!("'{value}' is not a valid adoptable flag"))
                    })?,
                    None => true,
                };
                Some(NewPet {
                    name: collapse_whitespace(&name),
                    breed: collapse_whitespace(&self.breed),
                    age,
                    adoptable,
                })
            }
            None => None,
        };

        Ok(CatalogRecord {
            line,
            shelter: NewShelter {
                name: shelter_name,
                city: self.city,
                foster_program,
                rank,
            },
            pet,
        })
    }
}

pub(crate) fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
