//! Media kinds and playback recurrence.

use serde::{Deserialize, Serialize};

/// Kind of media asset attached to a content item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "content_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Image,
    Video,
    Music,
}

impl ContentType {
    /// All kinds, in display order.
    pub const ALL: [Self; 3] = [Self::Image, Self::Video, Self::Music];

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Music => "music",
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Video => "Video",
            Self::Music => "Music",
        }
    }

    /// Guess the kind from a MIME type such as `video/mp4`.
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        let (top, _) = mime.split_once('/')?;
        match top.trim().to_ascii_lowercase().as_str() {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            "audio" => Some(Self::Music),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "music" | "audio" => Ok(Self::Music),
            other => Err(format!("invalid content type: {other}")),
        }
    }
}

/// How a scheduled item repeats inside its date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "recurrence_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    /// Plays continuously for the whole range.
    #[default]
    None,
    Daily,
    /// Plays only on the listed weekdays.
    Weekly,
    Monthly,
}

impl RecurrenceType {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Render the recurrence with its day list, e.g. `weekly (mon, fri)`.
    #[must_use]
    pub fn describe(self, days: &[String]) -> String {
        if days.is_empty() {
            self.as_str().to_owned()
        } else {
            format!("{} ({})", self.as_str(), days.join(", "))
        }
    }
}

impl std::fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecurrenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(format!("invalid recurrence type: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_mime() {
        assert_eq!(ContentType::from_mime("image/png"), Some(ContentType::Image));
        assert_eq!(ContentType::from_mime("video/mp4"), Some(ContentType::Video));
        assert_eq!(ContentType::from_mime("audio/mpeg"), Some(ContentType::Music));
        assert_eq!(ContentType::from_mime("application/pdf"), None);
        assert_eq!(ContentType::from_mime("garbage"), None);
    }

    #[test]
    fn test_content_type_parse_accepts_audio_alias() {
        assert_eq!("Audio".parse::<ContentType>().unwrap(), ContentType::Music);
        assert!("gif".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_recurrence_describe() {
        let days = vec!["mon".to_owned(), "fri".to_owned()];
        assert_eq!(RecurrenceType::Weekly.describe(&days), "weekly (mon, fri)");
        assert_eq!(RecurrenceType::Daily.describe(&[]), "daily");
        assert_eq!("".parse::<RecurrenceType>().unwrap(), RecurrenceType::None);
    }
}
