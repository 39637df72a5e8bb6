//! Polymorphic content blocks and typed references shared across tool results,
//! prompt messages, and sampling messages.
//!
//! [`ContentBlock`] is a forward-compatible union: unknown `type` discriminators
//! decode into [`ContentBlock::Unknown`] rather than failing, so a peer running a
//! newer protocol revision doesn't break older decoders. [`Reference`] has no such
//! escape hatch — completion only makes sense against a known reference kind, so an
//! unrecognized `type` there is a decode error.

use crate::types::resources::ResourceContents;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single block of content exchanged in tool results, prompt messages, and
/// sampling messages.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        annotations: Option<Value>,
    },

    #[serde(rename = "image")]
    Image {
        data: String, // base64
        #[serde(rename = "mimeType")]
        mime_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        annotations: Option<Value>,
    },

    #[serde(rename = "audio")]
    Audio {
        data: String, // base64
        #[serde(rename = "mimeType")]
        mime_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        annotations: Option<Value>,
    },

    #[serde(rename = "resource_link")]
    ResourceLink {
        uri: String,
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },

    #[serde(rename = "embedded_resource")]
    EmbeddedResource { resource: ResourceContents },

    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },

    #[serde(rename = "tool_result")]
    ToolResult {
        #[serde(rename = "toolUseId")]
        tool_use_id: String,
        content: Vec<ContentBlock>,
        #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },

    /// An unrecognized `type` discriminator, kept verbatim for forward
    /// compatibility. Never constructed by this crate; only produced by decode.
    #[serde(skip)]
    Unknown { kind: String, raw: Value },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            annotations: None,
        }
    }

    pub fn image(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self::Image {
            data: data.into(),
            mime_type: mime_type.into(),
            annotations: None,
        }
    }

    pub fn audio(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self::Audio {
            data: data.into(),
            mime_type: mime_type.into(),
            annotations: None,
        }
    }

    pub fn resource_link(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ResourceLink {
            uri: uri.into(),
            name: name.into(),
            description: None,
            mime_type: None,
        }
    }

    pub fn embedded_resource(resource: ResourceContents) -> Self {
        Self::EmbeddedResource { resource }
    }

    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    pub fn tool_result(tool_use_id: impl Into<String>, content: Vec<ContentBlock>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content,
            is_error: None,
        }
    }
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::custom("Missing 'type' discriminator on content block"))?
            .to_string();

        match kind.as_str() {
            "text" => {
                let text = value
                    .get("text")
                    .and_then(Value::as_str)
                    .ok_or_else(|| D::Error::custom("Text must be provided for 'text' type"))?
                    .to_string();
                Ok(Self::Text {
                    text,
                    annotations: value.get("annotations").cloned(),
                })
            }
            "image" => {
                let data = required_string(&value, "data", "image")?;
                let mime_type = required_string(&value, "mimeType", "image")?;
                Ok(Self::Image {
                    data,
                    mime_type,
                    annotations: value.get("annotations").cloned(),
                })
            }
            "audio" => {
                let data = required_string(&value, "data", "audio")?;
                let mime_type = required_string(&value, "mimeType", "audio")?;
                Ok(Self::Audio {
                    data,
                    mime_type,
                    annotations: value.get("annotations").cloned(),
                })
            }
            "resource_link" => {
                let uri = required_string(&value, "uri", "resource_link")?;
                let name = value
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        D::Error::custom("Name must be provided for 'resource_link' type")
                    })?
                    .to_string();
                Ok(Self::ResourceLink {
                    uri,
                    name,
                    description: value
                        .get("description")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    mime_type: value
                        .get("mimeType")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                })
            }
            "embedded_resource" => {
                let resource = value
                    .get("resource")
                    .cloned()
                    .ok_or_else(|| {
                        D::Error::custom(
                            "Resource must be provided for 'embedded_resource' type",
                        )
                    })
                    .and_then(|v| {
                        serde_json::from_value(v).map_err(D::Error::custom)
                    })?;
                Ok(Self::EmbeddedResource { resource })
            }
            "tool_use" => {
                let id = required_string(&value, "id", "tool_use")?;
                let name = required_string(&value, "name", "tool_use")?;
                let input = value.get("input").cloned().unwrap_or(Value::Null);
                Ok(Self::ToolUse { id, name, input })
            }
            "tool_result" => {
                let tool_use_id = required_string(&value, "toolUseId", "tool_result")?;
                let content = value
                    .get("content")
                    .cloned()
                    .map(serde_json::from_value)
                    .transpose()
                    .map_err(D::Error::custom)?
                    .unwrap_or_default();
                Ok(Self::ToolResult {
                    tool_use_id,
                    content,
                    is_error: value.get("isError").and_then(Value::as_bool),
                })
            }
            _ => Ok(Self::Unknown { kind, raw: value }),
        }
    }
}

fn required_string<E: serde::de::Error>(
    value: &Value,
    field: &str,
    kind: &str,
) -> Result<String, E> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| E::custom(format!("'{field}' must be provided for '{kind}' type")))
}

/// A typed reference used by `completion/complete` to identify what is being
/// completed: a prompt by name, or a resource by URI template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Reference {
    #[serde(rename = "ref/prompt")]
    Prompt { name: String },

    #[serde(rename = "ref/resource")]
    Resource {
        #[serde(rename = "uri")]
        uri_template: String,
    },
}

impl Reference {
    pub fn prompt(name: impl Into<String>) -> Self {
        Self::Prompt { name: name.into() }
    }

    pub fn resource(uri_template: impl Into<String>) -> Self {
        Self::Resource {
            uri_template: uri_template.into(),
        }
    }
}
