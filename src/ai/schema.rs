//! Structured-output contracts.
//!
//! Each contract is declared once as a static field tree and rendered two
//! ways: as a native response schema for providers that enforce one, and as
//! an inline JSON skeleton that is pasted into the prompt for providers that
//! only offer a JSON-object mode. Both renderings walk the same tree, so they
//! cannot describe different shapes.

use std::fmt;

use serde_json::{json, Map, Value};

use crate::ai::provider::Provider;

/// Type of a single contract field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldType {
    /// Free text.
    String,
    /// Floating point number within an inclusive range.
    Number {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// Whole number within an inclusive range.
    Integer {
        /// Lower bound.
        min: i64,
        /// Upper bound.
        max: i64,
    },
    /// True or false.
    Boolean,
    /// One of a fixed set of strings.
    Enum(&'static [&'static str]),
    /// Homogeneous list.
    Array(&'static FieldType),
    /// Nested object.
    Object(&'static [Field]),
}

/// A named field inside a contract.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Field {
    /// JSON property name.
    pub name: &'static str,
    /// Value type.
    pub ty: FieldType,
    /// Hint passed to the model.
    pub description: &'static str,
    /// Whether the property must be present.
    pub required: bool,
}

impl Field {
    const fn required(name: &'static str, ty: FieldType, description: &'static str) -> Self {
        Self {
            name,
            ty,
            description,
            required: true,
        }
    }

    const fn optional(name: &'static str, ty: FieldType, description: &'static str) -> Self {
        Self {
            name,
            ty,
            description,
            required: false,
        }
    }
}

const SCORE: FieldType = FieldType::Number {
    min: 0.0,
    max: 100.0,
};
const LEVEL: FieldType = FieldType::Integer { min: 1, max: 10 };
const STRING_LIST: FieldType = FieldType::Array(&FieldType::String);

/// Accepted values for `suggestedSettings.vocalGender`.
pub const VOCAL_GENDERS: &[&str] = &["male", "female"];

const SCORE_FIELDS: &[Field] = &[
    Field::required("theology", SCORE, "Biblical depth and accuracy"),
    Field::required("structure", SCORE, "Suno section structure and tag usage"),
    Field::required("flow", SCORE, "Rhythm, rhyme and singability"),
    Field::required("imagery", SCORE, "Emotional impact and metaphor"),
    Field::required("innovation", SCORE, "Creativity and freshness"),
];

const TAGS_CHECK_FIELDS: &[Field] = &[
    Field::required("valid", FieldType::Boolean, "Whether the Suno structure tags are valid"),
    Field::required(
        "missingTags",
        STRING_LIST,
        "Standard section tags that are missing, e.g. Outro",
    ),
    Field::required("message", FieldType::String, "Feedback on the song structure"),
];

const ANALYSIS_FIELDS: &[Field] = &[
    Field::required("scores", FieldType::Object(SCORE_FIELDS), "Per-pillar scores"),
    Field::required("overallScore", SCORE, "Average of the five scores"),
    Field::required(
        "feedback",
        FieldType::String,
        "Professional summary critique of the lyrics, in Chinese",
    ),
    Field::required(
        "suggestions",
        STRING_LIST,
        "Specific actionable improvements, in Chinese",
    ),
    Field::required(
        "sunoTagsCheck",
        FieldType::Object(TAGS_CHECK_FIELDS),
        "Structural validity verdict",
    ),
];

const SETTINGS_FIELDS: &[Field] = &[
    Field::required(
        "experimentalism",
        LEVEL,
        "How far Suno may stray from conventional arrangements",
    ),
    Field::required(
        "styleAdherence",
        LEVEL,
        "How strictly Suno should follow the style prompt",
    ),
    Field::optional(
        "vocalGender",
        FieldType::Enum(VOCAL_GENDERS),
        "Preferred lead vocal",
    ),
];

const GENERATION_FIELDS: &[Field] = &[
    Field::required("title", FieldType::String, "Song title in Chinese"),
    Field::required("stylePrompts", FieldType::String, "English style tags for Suno"),
    Field::required("negativePrompts", FieldType::String, "Styles to avoid"),
    Field::required(
        "lyrics",
        FieldType::String,
        "Complete lyrics with section tags, starting with [Intro]",
    ),
    Field::optional(
        "suggestedSettings",
        FieldType::Object(SETTINGS_FIELDS),
        "Suggested Suno generation settings",
    ),
];

const ASSETS_FIELDS: &[Field] = &[
    Field::required(
        "caption",
        FieldType::String,
        "Short social media caption with emojis and hashtags",
    ),
    Field::required(
        "stylizedTitle",
        FieldType::String,
        "Decorated title using unicode symbols",
    ),
];

/// The structured-output contracts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Contract {
    /// Lyric analysis scores and feedback.
    Analysis,
    /// A generated song package.
    Generation,
    /// Release assets: caption and stylized title.
    Assets,
}

impl Contract {
    /// Every contract.
    pub const ALL: [Self; 3] = [Self::Analysis, Self::Generation, Self::Assets];

    /// Top-level fields of the contract.
    pub fn fields(self) -> &'static [Field] {
        match self {
            Self::Analysis => ANALYSIS_FIELDS,
            Self::Generation => GENERATION_FIELDS,
            Self::Assets => ASSETS_FIELDS,
        }
    }

    /// Dotted paths of every field, depth first, in declaration order.
    pub fn field_paths(self) -> Vec<String> {
        let mut paths = Vec::new();
        collect_paths(self.fields(), "", &mut paths);
        paths
    }

    /// Renders the contract as a native response schema.
    pub fn native_schema(self) -> Value {
        native_object(self.fields())
    }

    /// Renders the contract as a JSON skeleton for inclusion in a prompt.
    pub fn inline_description(self) -> String {
        let mut out = String::new();
        write_object(&mut out, self.fields(), 0);
        out
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analysis => write!(f, "Analysis"),
            Self::Generation => write!(f, "Generation"),
            Self::Assets => write!(f, "Assets"),
        }
    }
}

/// A contract rendered for a particular provider.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderedSchema {
    /// Schema object sent alongside the request.
    Native(Value),
    /// Shape description concatenated into the prompt body.
    Inline(String),
}

/// Renders `contract` in the form `provider` understands.
pub fn render(contract: Contract, provider: Provider) -> RenderedSchema {
    if provider.supports_native_schema() {
        RenderedSchema::Native(contract.native_schema())
    } else {
        RenderedSchema::Inline(contract.inline_description())
    }
}

fn collect_paths(fields: &[Field], prefix: &str, paths: &mut Vec<String>) {
    for field in fields {
        let path = if prefix.is_empty() {
            field.name.to_string()
        } else {
            format!("{prefix}.{}", field.name)
        };
        paths.push(path.clone());
        if let FieldType::Object(inner) = field.ty {
            collect_paths(inner, &path, paths);
        }
    }
}

// ── Native rendering ────────────────────────────────────────────────

fn native_object(fields: &[Field]) -> Value {
    let mut properties = Map::new();
    for field in fields {
        let mut property = native_type(&field.ty);
        property["description"] = json!(field.description);
        properties.insert(field.name.to_string(), property);
    }
    let ordering: Vec<&str> = fields.iter().map(|f| f.name).collect();
    let required: Vec<&str> = fields
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name)
        .collect();

    json!({
        "type": "OBJECT",
        "properties": properties,
        "propertyOrdering": ordering,
        "required": required,
    })
}

fn native_type(ty: &FieldType) -> Value {
    match ty {
        FieldType::String => json!({ "type": "STRING" }),
        FieldType::Number { min, max } => {
            json!({ "type": "NUMBER", "minimum": min, "maximum": max })
        }
        FieldType::Integer { min, max } => {
            json!({ "type": "INTEGER", "minimum": min, "maximum": max })
        }
        FieldType::Boolean => json!({ "type": "BOOLEAN" }),
        FieldType::Enum(values) => json!({ "type": "STRING", "enum": values }),
        FieldType::Array(items) => json!({ "type": "ARRAY", "items": native_type(items) }),
        FieldType::Object(fields) => native_object(fields),
    }
}

// ── Inline rendering ────────────────────────────────────────────────

fn write_object(out: &mut String, fields: &[Field], depth: usize) {
    out.push_str("{\n");
    for (i, field) in fields.iter().enumerate() {
        push_indent(out, depth + 1);
        out.push_str(&format!("\"{}\": ", field.name));
        match field.ty {
            FieldType::Object(inner) => {
                let mut hint = String::from("// ");
                if !field.required {
                    hint.push_str("optional, ");
                }
                hint.push_str(field.description);
                write_object_with_hint(out, inner, depth + 1, &hint);
            }
            ty => out.push_str(&placeholder(&ty, field)),
        }
        if i + 1 < fields.len() {
            out.push(',');
        }
        out.push('\n');
    }
    push_indent(out, depth);
    out.push('}');
}

fn write_object_with_hint(out: &mut String, fields: &[Field], depth: usize, hint: &str) {
    let mut body = String::new();
    write_object(&mut body, fields, depth);
    // Put the hint after the opening brace so the skeleton stays line-oriented.
    out.push_str("{ ");
    out.push_str(hint);
    out.push_str(&body[1..]);
}

fn placeholder(ty: &FieldType, field: &Field) -> String {
    let mut hint = type_hint(ty);
    if !field.required {
        hint.push_str(", optional");
    }
    format!("<{hint}: {}>", field.description)
}

fn type_hint(ty: &FieldType) -> String {
    match ty {
        FieldType::String => "string".to_string(),
        FieldType::Number { min, max } => format!("number {min}-{max}"),
        FieldType::Integer { min, max } => format!("integer {min}-{max}"),
        FieldType::Boolean => "boolean".to_string(),
        FieldType::Enum(values) => {
            let quoted: Vec<String> = values.iter().map(|v| format!("\"{v}\"")).collect();
            format!("one of {}", quoted.join(" | "))
        }
        FieldType::Array(items) => format!("array of {}", type_hint(items)),
        FieldType::Object(_) => "object".to_string(),
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}
