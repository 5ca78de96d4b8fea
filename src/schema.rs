//! Schema types for the provider configuration, resources and data sources.
//!
//! A schema tells the host which attributes exist, which of them the user
//! must set, which the provider fills in, and which are secret. The same
//! schema drives [`crate::validation::validate`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scalar type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// UTF-8 string.
    String,
    /// Signed 64-bit integer.
    Int64,
    /// 64-bit float; integers are accepted too.
    Float64,
}

/// Who sets an attribute, and whether it is secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AttributeFlags {
    /// Must be set in configuration.
    pub required: bool,
    /// May be set in configuration.
    pub optional: bool,
    /// Filled in by the provider.
    pub computed: bool,
    /// Never shown in plans or logs.
    pub sensitive: bool,
}

impl AttributeFlags {
    const NONE: Self = Self {
        required: false,
        optional: false,
        computed: false,
        sensitive: false,
    };
    const REQUIRED: Self = Self {
        required: true,
        ..Self::NONE
    };
    const OPTIONAL: Self = Self {
        optional: true,
        ..Self::NONE
    };
    const COMPUTED: Self = Self {
        computed: true,
        ..Self::NONE
    };

    /// Set by the provider and never by the user.
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

/// One scalar attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Scalar type.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Usage flags, serialized inline.
    #[serde(flatten)]
    pub flags: AttributeFlags,
    /// Shown in generated documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// On update, a planned value that is `null` or deferred takes the prior
    /// state value.
    #[serde(default)]
    pub use_state_for_unknown: bool,
}

impl Attribute {
    fn of(attr_type: AttributeType, flags: AttributeFlags) -> Self {
        Self {
            attr_type,
            flags,
            description: None,
            use_state_for_unknown: false,
        }
    }

    /// Optional string.
    pub fn optional_string() -> Self {
        Self::of(AttributeType::String, AttributeFlags::OPTIONAL)
    }

    /// Computed string.
    pub fn computed_string() -> Self {
        Self::of(AttributeType::String, AttributeFlags::COMPUTED)
    }

    /// Required int64.
    pub fn required_int64() -> Self {
        Self::of(AttributeType::Int64, AttributeFlags::REQUIRED)
    }

    /// Computed int64.
    pub fn computed_int64() -> Self {
        Self::of(AttributeType::Int64, AttributeFlags::COMPUTED)
    }

    /// Computed float64.
    pub fn computed_float64() -> Self {
        Self::of(AttributeType::Float64, AttributeFlags::COMPUTED)
    }

    /// Attach a description.
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }

    /// See [`Attribute::use_state_for_unknown`].
    pub fn with_use_state_for_unknown(self) -> Self {
        Self {
            use_state_for_unknown: true,
            ..self
        }
    }

    /// Mark as secret.
    pub fn sensitive(mut self) -> Self {
        self.flags.sensitive = true;
        self
    }
}

/// How many objects a nested block holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlockNestingMode {
    /// At most one object.
    #[default]
    Single,
    /// An ordered list.
    List,
}

/// Attributes and nested blocks at one level of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Block {
    /// Scalar attributes by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Attribute>,
    /// Nested blocks by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub blocks: BTreeMap<String, NestedBlock>,
    /// Shown in generated documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Block {
    /// An empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }

    /// Add or replace a nested block.
    pub fn with_block(mut self, name: impl Into<String>, block: NestedBlock) -> Self {
        self.blocks.insert(name.into(), block);
        self
    }

    /// Attach a description.
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }
}

/// A block nested under a name, with item bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedBlock {
    /// Shape of each item.
    #[serde(flatten)]
    pub block: Block,
    /// Single object or list.
    #[serde(default)]
    pub nesting_mode: BlockNestingMode,
    /// Fewest items accepted.
    #[serde(default)]
    pub min_items: u32,
    /// Most items accepted; 0 means no limit.
    #[serde(default)]
    pub max_items: u32,
    /// Filled in entirely by the provider; skipped by validation.
    #[serde(default)]
    pub computed: bool,
}

impl NestedBlock {
    fn nested(block: Block, nesting_mode: BlockNestingMode, max_items: u32) -> Self {
        Self {
            block,
            nesting_mode,
            min_items: 0,
            max_items,
            computed: false,
        }
    }

    /// Zero or one object.
    pub fn single(block: Block) -> Self {
        Self::nested(block, BlockNestingMode::Single, 1)
    }

    /// Any number of objects.
    pub fn list(block: Block) -> Self {
        Self::nested(block, BlockNestingMode::List, 0)
    }

    /// At least one item.
    pub fn required(self) -> Self {
        Self {
            min_items: 1,
            ..self
        }
    }

    /// See [`NestedBlock::computed`].
    pub fn computed(self) -> Self {
        Self {
            computed: true,
            ..self
        }
    }
}

/// Versioned root block of the provider configuration, a resource or a
/// data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Schema {
    /// Bumped when stored state needs upgrading.
    #[serde(default)]
    pub version: u64,
    /// Top-level attributes and blocks.
    #[serde(flatten)]
    pub block: Block,
}

impl Schema {
    /// An empty schema at version 0.
    pub fn v0() -> Self {
        Self::default()
    }

    /// See [`Block::with_description`].
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            block: self.block.with_description(description),
            ..self
        }
    }

    /// See [`Block::with_attribute`].
    pub fn with_attribute(self, name: impl Into<String>, attr: Attribute) -> Self {
        Self {
            block: self.block.with_attribute(name, attr),
            ..self
        }
    }

    /// See [`Block::with_block`].
    pub fn with_block(self, name: impl Into<String>, block: NestedBlock) -> Self {
        Self {
            block: self.block.with_block(name, block),
            ..self
        }
    }
}

/// Everything the provider exposes, keyed by full type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProviderSchema {
    /// Provider configuration.
    #[serde(default)]
    pub provider: Schema,
    /// Resources, e.g. `fsd_order`.
    #[serde(default)]
    pub resources: BTreeMap<String, Schema>,
    /// Data sources, e.g. `fsd_coffees`.
    #[serde(default)]
    pub data_sources: BTreeMap<String, Schema>,
}

impl ProviderSchema {
    /// Set the provider configuration schema.
    pub fn with_provider_config(self, provider: Schema) -> Self {
        Self { provider, ..self }
    }

    /// Register a resource schema.
    pub fn with_resource(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.resources.insert(name.into(), schema);
        self
    }

    /// Register a data source schema.
    pub fn with_data_source(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.data_sources.insert(name.into(), schema);
        self
    }
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// A message for the user, optionally pinned to an attribute path such as
/// `items.0.coffee.id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Errors fail the operation; warnings do not.
    pub severity: DiagnosticSeverity,
    /// One-line headline, e.g. `Missing fsd API Host`.
    pub summary: String,
    /// Longer guidance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Dotted path of the offending attribute; `None` for general errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    fn with_severity(severity: DiagnosticSeverity, summary: impl Into<String>) -> Self {
        Self {
            severity,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// An error with only a summary.
    pub fn error(summary: impl Into<String>) -> Self {
        Self::with_severity(DiagnosticSeverity::Error, summary)
    }

    /// A warning with only a summary.
    pub fn warning(summary: impl Into<String>) -> Self {
        Self::with_severity(DiagnosticSeverity::Warning, summary)
    }

    /// Attach guidance.
    pub fn with_detail(self, detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..self
        }
    }

    /// Pin to an attribute path.
    pub fn with_attribute(self, attribute: impl Into<String>) -> Self {
        Self {
            attribute: Some(attribute.into()),
            ..self
        }
    }

    /// `true` for errors.
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

/// Whether any diagnostic is an error.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}
