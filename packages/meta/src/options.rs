use crate::error::{MetaError, MetaResult};
use serde::{Deserialize, Serialize};

/// Configuration options for metadata extraction
///
/// Deserializes from the camelCase JSON shape used by editor integrations:
///
/// ```json
/// { "forceUseTs": true, "noDeclarations": true, "schema": { "ignore": ["Foo"] }, "printer": { "newLine": 1 } }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaCheckerOptions {
    /// Analyze untyped sources as if they were typed
    #[serde(rename = "forceUseTs")]
    pub force_typed_analysis: bool,

    /// Leave `declarations` empty in every property
    #[serde(rename = "noDeclarations")]
    pub suppress_declaration_sites: bool,

    pub schema: SchemaOption,

    pub printer: PrinterOptions,
}

/// `true`, `false`, or `{ "ignore": [...] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOption {
    Enabled(bool),
    Ignore { ignore: Vec<String> },
}

impl Default for SchemaOption {
    fn default() -> Self {
        SchemaOption::Enabled(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterOptions {
    #[serde(rename = "newLine")]
    pub new_line: NewLine,
}

/// Line ending of multi-line renderings; `0` is CRLF and `1` is LF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NewLine {
    CarriageReturnLineFeed,
    #[default]
    LineFeed,
}

impl NewLine {
    pub fn as_str(self) -> &'static str {
        match self {
            NewLine::CarriageReturnLineFeed => "\r\n",
            NewLine::LineFeed => "\n",
        }
    }
}

impl TryFrom<u8> for NewLine {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(NewLine::CarriageReturnLineFeed),
            1 => Ok(NewLine::LineFeed),
            other => Err(format!("newLine must be 0 or 1, found {}", other)),
        }
    }
}

impl From<NewLine> for u8 {
    fn from(value: NewLine) -> Self {
        match value {
            NewLine::CarriageReturnLineFeed => 0,
            NewLine::LineFeed => 1,
        }
    }
}

impl MetaCheckerOptions {
    /// Parse options from their JSON form and validate them
    pub fn from_json(json: &str) -> MetaResult<Self> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| MetaError::InvalidOptions(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Reject ignore entries that can never match a rendered type
    pub fn validate(&self) -> MetaResult<()> {
        if let Some(name) = self.ignored_types().iter().find(|name| name.trim().is_empty()) {
            return Err(MetaError::InvalidOptions(format!(
                "schema.ignore contains an empty type name ({:?})",
                name
            )));
        }
        Ok(())
    }

    pub fn schema_enabled(&self) -> bool {
        !matches!(self.schema, SchemaOption::Enabled(false))
    }

    pub fn ignored_types(&self) -> &[String] {
        match &self.schema {
            SchemaOption::Ignore { ignore } => ignore,
            SchemaOption::Enabled(_) => &[],
        }
    }

    pub fn newline(&self) -> &'static str {
        self.printer.new_line.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        let json = r#"{
            "forceUseTs": true,
            "noDeclarations": true,
            "schema": { "ignore": ["MyIgnoredNestedProps"] },
            "printer": { "newLine": 1 }
        }"#;

        let options = MetaCheckerOptions::from_json(json).unwrap();
        assert!(options.force_typed_analysis);
        assert!(options.suppress_declaration_sites);
        assert!(options.schema_enabled());
        assert_eq!(options.ignored_types(), ["MyIgnoredNestedProps".to_string()]);
        assert_eq!(options.newline(), "\n");
    }

    #[test]
    fn test_default_options() {
        let options = MetaCheckerOptions::from_json("{}").unwrap();
        assert_eq!(options, MetaCheckerOptions::default());
        assert!(options.schema_enabled());
        assert!(options.ignored_types().is_empty());
    }

    #[test]
    fn test_schema_disabled_and_crlf() {
        let options = MetaCheckerOptions::from_json(r#"{ "schema": false, "printer": { "newLine": 0 } }"#).unwrap();
        assert!(!options.schema_enabled());
        assert_eq!(options.newline(), "\r\n");
    }

    #[test]
    fn test_invalid_options() {
        assert!(matches!(
            MetaCheckerOptions::from_json(r#"{ "schema": { "ignore": ["  "] } }"#),
            Err(MetaError::InvalidOptions(_))
        ));
        assert!(matches!(
            MetaCheckerOptions::from_json(r#"{ "printer": { "newLine": 2 } }"#),
            Err(MetaError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_serializes_to_camel_case() {
        let json = serde_json::to_value(MetaCheckerOptions::default()).unwrap();
        assert_eq!(json["forceUseTs"], false);
        assert_eq!(json["schema"], true);
        assert_eq!(json["printer"]["newLine"], 1);
    }
}
