use std::fmt;

/// A playable source descriptor, shaped like a `{ src, type }` entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
pub struct MediaSource {
    pub src: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl MediaSource {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

impl From<&str> for MediaSource {
    fn from(src: &str) -> Self {
        Self::new(src)
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Some(kind) => write!(f, "{} ({kind})", self.src),
            None => f.write_str(&self.src),
        }
    }
}
