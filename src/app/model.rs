use serde::{Deserialize, Deserializer, Serialize};

/// A catalog entry as the view lists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(deserialize_with = "deserialize_book_id")]
    pub book_id: String,
    pub title: String,
    #[serde(default)]
    pub authors: String,
    #[serde(default, deserialize_with = "deserialize_languages")]
    pub languages: Vec<String>,
    /// Only an explicit analyze request attaches one; stored analyses the
    /// catalog echoes on listing and lookup are not decoded.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
}

impl Book {
    pub fn without_analysis(mut self) -> Self {
        self.analysis = None;
        self
    }

    pub fn languages_label(&self) -> String {
        self.languages.join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub summary: String,
    pub themes: Vec<String>,
    pub target_audience: String,
    pub writing_style: String,
    pub key_insights: Vec<String>,
    pub sentiment_analysis: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub main_characters: Vec<Character>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub main_places: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBookId {
    Text(String),
    Number(serde_json::Number),
}

fn deserialize_book_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawBookId::deserialize(deserializer)? {
        RawBookId::Text(text) => text,
        RawBookId::Number(number) => number.to_string(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLanguages {
    List(Vec<String>),
    Joined(String),
}

// Stored as "en | fr" by the catalog service.
fn deserialize_languages<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawLanguages>::deserialize(deserializer)?;
    Ok(match raw {
        None => Vec::new(),
        Some(RawLanguages::List(list)) => list,
        Some(RawLanguages::Joined(joined)) => joined
            .split('|')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_owned)
            .collect(),
    })
}
