//! Declared tool inputs and their validation.
//!
//! Tool inputs are flat objects of named parameters. Each parameter is
//! either a string or an array of strings, and is either required or
//! optional. The same declaration renders the JSON Schema advertised in
//! `tools/list` and validates incoming arguments.

use serde_json::{json, Map, Value};

/// The type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A JSON string.
    String,
    /// A JSON array whose items are all strings.
    StringArray,
}

impl ParamKind {
    fn json_schema(self) -> Value {
        match self {
            Self::String => json!({ "type": "string" }),
            Self::StringArray => json!({ "type": "array", "items": { "type": "string" } }),
        }
    }

    const fn expected(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::StringArray => "an array of strings",
        }
    }
}

/// A single declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter name.
    pub name: &'static str,
    /// Parameter type.
    pub kind: ParamKind,
    /// Whether the parameter must be supplied.
    pub required: bool,
    /// Description shown to the AI host.
    pub description: &'static str,
}

/// The declared input of a tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSchema {
    params: Vec<ParamSpec>,
}

impl InputSchema {
    /// Creates an empty schema (no parameters).
    #[must_use]
    pub const fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Adds a required parameter.
    #[must_use]
    pub fn required(mut self, name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        self.params.push(ParamSpec {
            name,
            kind,
            required: true,
            description,
        });
        self
    }

    /// Adds an optional parameter.
    #[must_use]
    pub fn optional(mut self, name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        self.params.push(ParamSpec {
            name,
            kind,
            required: false,
            description,
        });
        self
    }

    /// Returns the declared parameters in declaration order.
    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Renders the schema as a JSON Schema object.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.params {
            let mut schema = param.kind.json_schema();
            schema["description"] = Value::from(param.description);
            properties.insert(param.name.to_string(), schema);
        }

        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Checks `input` against the declared parameters.
    ///
    /// Undeclared fields are dropped. An optional field set to `null` is
    /// treated as absent.
    ///
    /// # Errors
    ///
    /// Returns every violated constraint if validation fails.
    pub fn validate(&self, input: &Value) -> Result<ToolArguments, Vec<String>> {
        let empty = Map::new();
        let obj = match input {
            Value::Object(obj) => obj,
            Value::Null => &empty,
            _ => return Err(vec!["arguments must be a JSON object".to_string()]),
        };

        let mut violations = Vec::new();
        let mut accepted = Map::new();

        for param in &self.params {
            match obj.get(param.name) {
                None | Some(Value::Null) => {
                    if param.required {
                        violations.push(format!("missing required field '{}'", param.name));
                    }
                }
                Some(value) => match check_kind(param, value) {
                    Ok(()) => {
                        accepted.insert(param.name.to_string(), value.clone());
                    }
                    Err(violation) => violations.push(violation),
                },
            }
        }

        if violations.is_empty() {
            Ok(ToolArguments(accepted))
        } else {
            Err(violations)
        }
    }
}

fn check_kind(param: &ParamSpec, value: &Value) -> Result<(), String> {
    let ok = match param.kind {
        ParamKind::String => value.is_string(),
        ParamKind::StringArray => {
            if let Some(items) = value.as_array() {
                if let Some(index) = items.iter().position(|item| !item.is_string()) {
                    return Err(format!(
                        "field '{}' item {index} must be a string",
                        param.name
                    ));
                }
                true
            } else {
                false
            }
        }
    };

    if ok {
        Ok(())
    } else {
        Err(format!(
            "field '{}' must be {}",
            param.name,
            param.kind.expected()
        ))
    }
}

/// Arguments that passed schema validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments(Map<String, Value>);

impl ToolArguments {
    /// Returns a string argument, or `None` if it was not supplied.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Returns a required string argument.
    ///
    /// Validation guarantees presence, so a missing value yields `""`.
    #[must_use]
    pub fn str(&self, name: &str) -> &str {
        self.get_str(name).unwrap_or_default()
    }

    /// Returns a string-array argument as JSON values, or an empty list.
    #[must_use]
    pub fn string_array(&self, name: &str) -> Vec<Value> {
        self.0
            .get(name)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }
}
