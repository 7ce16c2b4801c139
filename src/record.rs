//! The saint record produced by extraction

use serde::Serialize;

/// One saint, as extracted from a single origin page
///
/// Field names on the wire follow the API consumers' contract
/// (`nome`, `imagem`, `historia`, `reflexao`, `oracao`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaintRecord {
    #[serde(rename = "nome")]
    name: String,

    #[serde(rename = "imagem")]
    image_url: Option<String>,

    #[serde(rename = "historia")]
    story: String,

    #[serde(rename = "reflexao")]
    reflection: String,

    #[serde(rename = "oracao")]
    prayer: String,
}

impl SaintRecord {
    pub fn new(
        name: impl Into<String>,
        image_url: Option<String>,
        story: impl Into<String>,
        reflection: impl Into<String>,
        prayer: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            image_url,
            story: story.into(),
            reflection: reflection.into(),
            prayer: prayer.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute portrait URL, if the page had one
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn story(&self) -> &str {
        &self.story
    }

    pub fn reflection(&self) -> &str {
        &self.reflection
    }

    pub fn prayer(&self) -> &str {
        &self.prayer
    }
}
