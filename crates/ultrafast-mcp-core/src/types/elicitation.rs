//! Elicitation: a server-initiated request for user input, either a structured
//! form (JSON-Schema-flavoured) or consent to navigate to a URL.
//!
//! [`PrimitiveSchemaDefinition`] discrimination is structural, not tag-based: the
//! `type` string alone is ambiguous (`"string"` covers five different variants
//! depending on which of `enum`/`enumNames`/`oneOf` accompany it), so decoding
//! walks the table in the order given by the specification.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A single property of a [`ElicitationSchema`]'s `properties` map.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum PrimitiveSchemaDefinition {
    /// `type:"string"` plain.
    String {
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// `type:"number"` or `type:"integer"`.
    Number {
        #[serde(rename = "type")]
        integer: NumberKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// `type:"boolean"`.
    Boolean {
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<bool>,
    },
    /// `type:"string"` + `enum` alone: untitled single-select.
    EnumUntitled {
        #[serde(rename = "enum")]
        values: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// `type:"string"` + `enum` + `enumNames`: legacy titled enum (deprecated,
    /// still accepted on decode).
    EnumLegacyTitled {
        #[serde(rename = "enum")]
        values: Vec<String>,
        #[serde(rename = "enumNames")]
        names: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// `type:"string"` + `oneOf[{const,title}]`: titled single-select.
    EnumTitled {
        #[serde(rename = "oneOf")]
        options: Vec<EnumOption>,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// `type:"array"` + `items.enum`: untitled multi-select.
    MultiSelectUntitled {
        items: EnumItems,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// `type:"array"` + `items.anyOf`: titled multi-select.
    MultiSelectTitled {
        items: AnyOfItems,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NumberKind {
    Number,
    Integer,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnumOption {
    #[serde(rename = "const")]
    pub value: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnumItems {
    #[serde(rename = "enum")]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnyOfItems {
    #[serde(rename = "anyOf")]
    pub options: Vec<EnumOption>,
}

impl<'de> Deserialize<'de> for PrimitiveSchemaDefinition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let ty = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::custom("Elicitation schema must carry a 'type'"))?;
        let title = value
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string);
        let description = value
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);

        match ty {
            "string" => {
                if let Some(names) = value.get("enumNames") {
                    let values = string_array(&value, "enum")?;
                    let names = serde_json::from_value::<Vec<String>>(names.clone())
                        .map_err(D::Error::custom)?;
                    return Ok(Self::EnumLegacyTitled {
                        values,
                        names,
                        title,
                    });
                }
                if value.get("enum").is_some() {
                    let values = string_array(&value, "enum")?;
                    return Ok(Self::EnumUntitled { values, title });
                }
                if let Some(one_of) = value.get("oneOf") {
                    let options = serde_json::from_value(one_of.clone()).map_err(D::Error::custom)?;
                    return Ok(Self::EnumTitled { options, title });
                }
                Ok(Self::String { title, description })
            }
            "number" | "integer" => Ok(Self::Number {
                integer: if ty == "integer" {
                    NumberKind::Integer
                } else {
                    NumberKind::Number
                },
                title,
                description,
            }),
            "boolean" => Ok(Self::Boolean {
                title,
                description,
                default: value.get("default").and_then(Value::as_bool),
            }),
            "array" => {
                let items = value
                    .get("items")
                    .ok_or_else(|| D::Error::custom("Array elicitation schema requires 'items'"))?;
                if items.get("anyOf").is_some() {
                    let items: AnyOfItems =
                        serde_json::from_value(items.clone()).map_err(D::Error::custom)?;
                    return Ok(Self::MultiSelectTitled { items, title });
                }
                if items.get("enum").is_some() {
                    let items: EnumItems =
                        serde_json::from_value(items.clone()).map_err(D::Error::custom)?;
                    return Ok(Self::MultiSelectUntitled { items, title });
                }
                Err(D::Error::custom(
                    "Array elicitation schema's 'items' must carry 'enum' or 'anyOf'",
                ))
            }
            other => Err(D::Error::custom(format!(
                "Unsupported elicitation schema type: {other}"
            ))),
        }
    }
}

fn string_array<E: serde::de::Error>(value: &Value, field: &str) -> Result<Vec<String>, E> {
    value
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| E::custom(format!("'{field}' must be an array")))?
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| E::custom(format!("'{field}' entries must be strings")))
        })
        .collect()
}

/// Server-initiated request for user input or URL consent.
///
/// Discriminated structurally: the presence of `url` selects URL mode, the
/// presence of `requestedSchema` selects form mode. A request with neither (or
/// both) fails to decode.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ElicitationRequest {
    Form {
        message: String,
        #[serde(rename = "requestedSchema")]
        requested_schema: RequestedSchema,
    },
    Url {
        message: String,
        url: String,
    },
}

/// The raw `requestedSchema` payload, kept as JSON so the per-property
/// [`PrimitiveSchemaDefinition`] discrimination only runs when a caller asks
/// for a specific property's typed form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestedSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: HashMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl RequestedSchema {
    /// Decode a named property into its typed [`PrimitiveSchemaDefinition`].
    pub fn property(&self, name: &str) -> Option<Result<PrimitiveSchemaDefinition, serde_json::Error>> {
        self.properties.get(name).map(|v| serde_json::from_value(v.clone()))
    }
}

impl<'de> Deserialize<'de> for ElicitationRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::custom("Elicitation request must carry a 'message'"))?
            .to_string();

        let has_url = value.get("url").is_some();
        let has_schema = value.get("requestedSchema").is_some();

        match (has_url, has_schema) {
            (true, false) => {
                let url = value.get("url").and_then(Value::as_str).unwrap().to_string();
                Ok(Self::Url { message, url })
            }
            (false, true) => {
                let requested_schema = serde_json::from_value(value["requestedSchema"].clone())
                    .map_err(D::Error::custom)?;
                Ok(Self::Form {
                    message,
                    requested_schema,
                })
            }
            (true, true) => Err(D::Error::custom(
                "Elicitation request cannot carry both 'url' and 'requestedSchema'",
            )),
            (false, false) => Err(D::Error::custom(
                "Elicitation request must carry either 'url' or 'requestedSchema'",
            )),
        }
    }
}

impl ElicitationRequest {
    pub fn form(message: impl Into<String>, requested_schema: RequestedSchema) -> Self {
        Self::Form {
            message: message.into(),
            requested_schema,
        }
    }

    pub fn url(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Url {
            message: message.into(),
            url: url.into(),
        }
    }

    pub fn is_url_mode(&self) -> bool {
        matches!(self, Self::Url { .. })
    }
}

/// The outcome of an elicitation request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ElicitationAction {
    Accept,
    Decline,
    Cancel,
}

/// Response to an elicitation request. `content` is only present when `action`
/// is `accept`; it holds the user's answers keyed by the schema's property
/// names (form mode) or is absent (URL mode, which only signals consent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElicitationResponse {
    pub action: ElicitationAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<HashMap<String, Value>>,
}

impl ElicitationResponse {
    pub fn accept(content: HashMap<String, Value>) -> Self {
        Self {
            action: ElicitationAction::Accept,
            content: Some(content),
        }
    }

    pub fn decline() -> Self {
        Self {
            action: ElicitationAction::Decline,
            content: None,
        }
    }

    pub fn cancel() -> Self {
        Self {
            action: ElicitationAction::Cancel,
            content: None,
        }
    }
}
