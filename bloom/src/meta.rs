//! Article metadata from meta.toml

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the metadata file inside every article directory
pub const META_FILE_NAME: &str = "meta.toml";

/// Paragraph index of the "read more" marker when meta.toml does not set one
const DEFAULT_READ_MORE: usize = 6;

/// Contents of an article's meta.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaInfo {
    /// General article information
    pub base: BaseInfo,

    /// Options for publishing to the Hexo blog
    #[serde(default)]
    pub hexo: HexoInfo,
}

/// The `[base]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseInfo {
    /// URL-friendly slug, used for image directories and post names
    pub name: String,

    /// Kind of entry; only "article" is produced today
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,

    /// File name of the markdown document inside the article directory
    #[serde(default)]
    pub doc_name: String,

    /// English title
    #[serde(default)]
    pub title_en: String,

    /// Chinese title, kept in sync with the document's `# title`
    #[serde(default)]
    pub title_cn: String,

    /// When the article was created
    #[serde(with = "create_time_format")]
    pub create_time: DateTime<Local>,

    /// Tags, older files call them labels
    #[serde(default, alias = "labels")]
    pub tags: Vec<String>,
}

/// The `[hexo]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HexoInfo {
    /// Insert the "read more" marker before this body paragraph; 0 disables it
    #[serde(default = "default_read_more")]
    pub read_more: usize,
}

impl Default for HexoInfo {
    fn default() -> Self {
        Self {
            read_more: DEFAULT_READ_MORE,
        }
    }
}

fn default_kind() -> String {
    "article".to_string()
}

fn default_read_more() -> usize {
    DEFAULT_READ_MORE
}

impl MetaInfo {
    /// Metadata for a freshly created article
    pub fn new(name: String, doc_name: String, title_en: String, title_cn: String) -> Self {
        Self {
            base: BaseInfo {
                name,
                kind: default_kind(),
                doc_name,
                title_en,
                title_cn,
                create_time: Local::now(),
                tags: Vec::new(),
            },
            hexo: HexoInfo::default(),
        }
    }

    /// Load metadata from a meta.toml file
    ///
    /// # Parameters
    /// * `path` - Path to the meta.toml file
    ///
    /// # Returns
    /// * `Ok(MetaInfo)` - Successfully loaded metadata
    /// * `Err(MetaError)` - Error reading or parsing the file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MetaError> {
        let content = fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save metadata to a meta.toml file
    ///
    /// # Parameters
    /// * `path` - Path where the meta.toml file will be written
    ///
    /// # Returns
    /// * `Ok(())` - Successfully saved metadata
    /// * `Err(MetaError)` - Error serializing or writing the file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), MetaError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

/// Errors that can occur when loading or saving article metadata
#[derive(Error, Debug)]
pub enum MetaError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// `createTime` is stored as a native TOML datetime
///
/// Files written by older tools may hold a local datetime without offset, or
/// just a date; those are read as local time.
mod create_time_format {
    use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone};
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use toml::value::Datetime;

    pub fn serialize<S>(time: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let datetime: Datetime = time
            .to_rfc3339_opts(SecondsFormat::Secs, false)
            .parse()
            .map_err(S::Error::custom)?;
        datetime.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Local>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let datetime = Datetime::deserialize(deserializer)?;
        let text = datetime.to_string();
        parse(&text).ok_or_else(|| D::Error::custom(format!("invalid createTime `{}`", text)))
    }

    pub(super) fn parse(text: &str) -> Option<DateTime<Local>> {
        if let Ok(time) = DateTime::parse_from_rfc3339(text) {
            return Some(time.with_timezone(&Local));
        }
        let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })?;
        Local.from_local_datetime(&naive).earliest()
    }
}
