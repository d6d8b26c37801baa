use serde::{Deserialize, Serialize};

/// One attached media item. The hash is an opaque content identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl MediaReference {
    pub fn new(kind: &str, content_hash: Option<&str>) -> Self {
        Self {
            kind: kind.to_string(),
            content_hash: content_hash.map(|h| h.to_string()),
        }
    }

    /// Parse the `KIND[:HASH]` form used on the command line
    pub fn from_arg(arg: &str) -> Self {
        match arg.split_once(':') {
            Some((kind, hash)) if !hash.is_empty() => Self::new(kind, Some(hash)),
            Some((kind, _)) => Self::new(kind, None),
            None => Self::new(arg, None),
        }
    }
}

/// Caller-supplied metadata around a submitted URL.
///
/// A missing field means "no information". Empty strings and empty lists are
/// treated the same as missing by the accessors below, so evaluators never
/// have to distinguish the two.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tickers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<MediaReference>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_app: Option<String>,
}

impl Context {
    pub fn is_empty(&self) -> bool {
        self.channel.is_none()
            && self.message_id.is_none()
            && self.text().is_none()
            && self.mentions().is_none()
            && self.tickers().is_none()
            && self.media().is_none()
            && self.detected_app().is_none()
    }

    pub fn text(&self) -> Option<&str> {
        non_blank(self.text.as_deref())
    }

    pub fn mentions(&self) -> Option<&[String]> {
        non_empty(self.mentions.as_deref())
    }

    pub fn tickers(&self) -> Option<&[String]> {
        non_empty(self.tickers.as_deref())
    }

    pub fn media(&self) -> Option<&[MediaReference]> {
        non_empty(self.media.as_deref())
    }

    pub fn detected_app(&self) -> Option<&str> {
        non_blank(self.detected_app.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn non_empty<T>(value: Option<&[T]>) -> Option<&[T]> {
    value.filter(|v| !v.is_empty())
}
