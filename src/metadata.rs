use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

use crate::{date::LogDate, error::ValidationError, fields::FieldReader};

pub const TITLE: &str = "title";
pub const DESCRIPTION: &str = "description";
pub const PUB_DATE: &str = "pubDate";
pub const UPDATED_DATE: &str = "updatedDate";
pub const HERO_IMAGE: &str = "heroImage";
pub const TAGS: &str = "tags";
pub const DRAFT: &str = "draft";

pub const FIELDS: [&str; 7] = [
    TITLE,
    DESCRIPTION,
    PUB_DATE,
    UPDATED_DATE,
    HERO_IMAGE,
    TAGS,
    DRAFT,
];

/// Front matter of one log entry after validation.
#[derive(Debug, PartialEq, Serialize, Clone, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogEntryMetadata {
    pub title: String,
    pub description: String,
    pub pub_date: LogDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<LogDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
    pub tags: Vec<String>,
    pub draft: bool,
}

/// What to do with front-matter keys the schema does not know about.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFields {
    #[default]
    Strip,
    Reject,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub unknown_fields: UnknownFields,
}

impl Schema {
    pub fn new(unknown_fields: UnknownFields) -> Self {
        Self { unknown_fields }
    }

    pub fn validate(&self, raw: &Mapping) -> Result<LogEntryMetadata, ValidationError> {
        let mut fields = FieldReader::new(raw);

        let title = fields.string(TITLE);
        let description = fields.string(DESCRIPTION);
        let pub_date = fields.date(PUB_DATE);
        let updated_date = fields.optional_date(UPDATED_DATE);
        let hero_image = fields.optional_string(HERO_IMAGE);
        let tags = fields.string_list(TAGS);
        let draft = fields.boolean(DRAFT);

        if self.unknown_fields == UnknownFields::Reject {
            fields.reject_unknown(&FIELDS);
        }

        let (Some(title), Some(description), Some(pub_date), Some(tags), Some(draft)) =
            (title, description, pub_date, tags, draft)
        else {
            return Err(fields.into_error());
        };
        fields.finish()?;

        Ok(LogEntryMetadata {
            title,
            description,
            pub_date,
            updated_date,
            hero_image,
            tags,
            draft,
        })
    }
}

/// Validates raw front matter with the default (permissive) schema.
pub fn validate(raw: &Mapping) -> Result<LogEntryMetadata, ValidationError> {
    Schema::default().validate(raw)
}
