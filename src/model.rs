use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TodoError};

/// Separator used between tags inside the tags column.
pub const TAG_SEPARATOR: char = ';';

/// Ordered list of free text labels attached to a todo.
///
/// Shown to the user joined with commas, stored joined with
/// [`TAG_SEPARATOR`]. Empty labels are never kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Tags(
            tags.into_iter()
                .map(Into::into)
                .filter(|tag| !tag.is_empty())
                .collect(),
        )
    }

    /// Build tags from command line values. Every value may itself be a
    /// comma separated list, and the option may be repeated.
    pub fn from_args<S: AsRef<str>>(values: &[S]) -> Self {
        Tags::new(values.iter().flat_map(|value| value.as_ref().split(',')))
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tags can't contain any of the separators, they would come back split.
    pub fn validate(&self) -> Result<()> {
        match self
            .iter()
            .find(|tag| tag.contains(TAG_SEPARATOR) || tag.contains(','))
        {
            Some(tag) => Err(TodoError::Validation(format!(
                "tag '{}' can't contain '{}' or ','",
                tag, TAG_SEPARATOR
            ))),
            None => Ok(()),
        }
    }

    fn to_column(&self) -> String {
        let separator = TAG_SEPARATOR.to_string();
        self.0.join(&separator)
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

/// Parses the tags column. Older files joined tags with commas inside a
/// quoted field, so both separators are accepted.
impl FromStr for Tags {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Tags::new(s.split(|c| c == TAG_SEPARATOR || c == ',')))
    }
}

impl Serialize for Tags {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_column())
    }
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let column = String::deserialize(deserializer)?;
        let tags = match column.parse::<Tags>() {
            Ok(tags) => tags,
            Err(never) => match never {},
        };
        Ok(tags)
    }
}

/// A single todo, saved as a row of the todo file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    #[serde(rename = "todo_name")]
    pub name: String,
    pub tags: Tags,
    pub created_at: DateTime<Local>,
    pub completed_at: Option<DateTime<Local>>,
    pub is_completed: bool,
}

impl Todo {
    /// A fresh, pending todo.
    pub fn new(name: &str, tags: Tags, now: DateTime<Local>) -> Result<Todo> {
        validate_name(name)?;
        tags.validate()?;
        Ok(Todo {
            name: name.to_string(),
            tags,
            created_at: now,
            completed_at: None,
            is_completed: false,
        })
    }

    /// Mark as done. Returns false, and changes nothing, if it already was.
    pub fn complete(&mut self, now: DateTime<Local>) -> bool {
        if self.is_completed {
            return false;
        }
        self.is_completed = true;
        self.completed_at = Some(now);
        true
    }
}

pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TodoError::Validation("--name is required".to_string()));
    }
    Ok(())
}
