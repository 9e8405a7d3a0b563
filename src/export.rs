/// Outbound command vocabulary and export routing
use serde_json::json;
use url::Url;

/// Separator between compound command fields. Definitions routinely contain
/// commas, pipes and colons, so the channel uses a glyph pair that cannot
/// occur in dictionary content.
pub const FIELD_DELIM: &str = "◳◴";

/// Single-glyph separator for short key/value style commands.
pub const PAIR_DELIM: &str = "◳";

/// A user selection routed to the host, tagged by payload type instead of by
/// comparing dictionary names at dispatch time.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportKind {
    Definition {
        dictionary: String,
        word: String,
        definition: String,
    },
    Image {
        word: String,
        urls: Vec<String>,
    },
    Audio {
        word: String,
        urls: Vec<String>,
    },
}

impl ExportKind {
    /// Route to the card-export command. An empty media selection yields
    /// nothing; the click is silently dropped.
    pub fn into_export_command(self) -> Option<Command> {
        match self {
            ExportKind::Definition {
                dictionary,
                word,
                definition,
            } => Some(Command::AddDefinition {
                dictionary,
                word,
                definition,
            }),
            ExportKind::Image { word, urls } => {
                (!urls.is_empty()).then(|| Command::ExportImages { word, urls })
            }
            ExportKind::Audio { word, urls } => {
                (!urls.is_empty()).then(|| Command::ExportAudio { word, urls })
            }
        }
    }

    /// Route to the send-to-field command family.
    pub fn into_field_command(self) -> Option<Command> {
        match self {
            ExportKind::Definition {
                dictionary,
                definition,
                ..
            } => Some(Command::SendToField {
                dictionary,
                definition,
            }),
            ExportKind::Image { urls, .. } => {
                (!urls.is_empty()).then(|| Command::SendImagesToField { urls })
            }
            ExportKind::Audio { urls, .. } => {
                (!urls.is_empty()).then(|| Command::SendAudioToField { urls })
            }
        }
    }
}

/// Everything the panel ever says to the host, one variant per verb.
/// Hand-off is fire-and-forget; there is no acknowledgment or retry.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ready,
    AddDefinition {
        dictionary: String,
        word: String,
        definition: String,
    },
    ExportImages {
        word: String,
        urls: Vec<String>,
    },
    ExportAudio {
        word: String,
        urls: Vec<String>,
    },
    SendToField {
        dictionary: String,
        definition: String,
    },
    SendImagesToField {
        urls: Vec<String>,
    },
    SendAudioToField {
        urls: Vec<String>,
    },
    DownloadAudio {
        urls: Vec<String>,
    },
    Clipped {
        text: String,
    },
    UpdateTerm {
        term: String,
    },
    SaveFontSizes {
        field: u32,
        body: u32,
    },
    SetDuplicateHeader {
        enabled: bool,
        dictionary: String,
    },
    FieldsSetting {
        dictionary: String,
        fields: Vec<String>,
    },
    OverwriteSetting {
        dictionary: String,
        mode: String,
    },
    MoreImages {
        term: String,
    },
}

impl Command {
    /// Encode as the `verb:rest` wire form.
    pub fn encode(&self) -> String {
        match self {
            Command::Ready => "AnkiDictionaryLoaded".to_string(),
            Command::AddDefinition {
                dictionary,
                word,
                definition,
            } => format!(
                "addDef:{}{delim}{}{delim}{}",
                underscored(dictionary),
                word,
                definition,
                delim = FIELD_DELIM
            ),
            Command::ExportImages { word, urls } => {
                format!("imgExport:{}{}{}", word, FIELD_DELIM, json_urls(urls))
            }
            Command::ExportAudio { word, urls } => {
                format!("audioExport:{}{}{}", word, FIELD_DELIM, json_urls(urls))
            }
            Command::SendToField {
                dictionary,
                definition,
            } => format!(
                "sendToField:{}{}{}",
                underscored(dictionary),
                FIELD_DELIM,
                definition
            ),
            Command::SendImagesToField { urls } => {
                format!("sendImgToField:{}", json_urls(urls))
            }
            Command::SendAudioToField { urls } => {
                format!("sendAudioToField:{}", json_urls(urls))
            }
            Command::DownloadAudio { urls } => format!("forvo:{}", json_urls(urls)),
            Command::Clipped { text } => format!("clipped:{}", text),
            Command::UpdateTerm { term } => format!("updateTerm:{}", term),
            Command::SaveFontSizes { field, body } => format!("saveFS:{}:{}", field, body),
            Command::SetDuplicateHeader {
                enabled,
                dictionary,
            } => format!(
                "setDup:{}{}{}",
                u8::from(*enabled),
                PAIR_DELIM,
                dictionary
            ),
            Command::FieldsSetting { dictionary, fields } => format!(
                "fieldsSetting:{}",
                json!({ "dictName": dictionary, "fields": fields })
            ),
            Command::OverwriteSetting { dictionary, mode } => format!(
                "overwriteSetting:{}",
                json!({ "name": dictionary, "type": mode })
            ),
            Command::MoreImages { term } => format!("getMoreImages::{}", term),
        }
    }
}

/// Drop anything that does not parse as an absolute URL before it is
/// serialized into a media command.
pub fn sanitize_urls(urls: Vec<String>) -> Vec<String> {
    urls.into_iter()
        .filter(|u| Url::parse(u).is_ok())
        .collect()
}

fn json_urls(urls: &[String]) -> String {
    serde_json::to_string(urls).unwrap_or_else(|_| "[]".to_string())
}

fn underscored(name: &str) -> String {
    name.replace(' ', "_")
}
