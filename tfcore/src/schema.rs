//! Schema model and builders for resources and providers.

use std::collections::HashMap;

/// Terraform's attribute type system.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(HashMap<String, AttributeType>),
}

/// Schema returned by providers and resources. Version is used for state
/// migration.
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64,
    pub block: Block,
}

/// A configuration block: attributes plus nested blocks.
#[derive(Debug, Clone)]
pub struct Block {
    pub attributes: Vec<Attribute>,
    pub block_types: Vec<NestedBlock>,
    pub description: String,
}

/// A single configuration attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
}

/// A nested configuration block, e.g. `backup_policy { ... }`.
#[derive(Debug, Clone)]
pub struct NestedBlock {
    pub type_name: String,
    pub block: Block,
    pub nesting: NestingMode,
    pub min_items: i64,
    pub max_items: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NestingMode {
    Single,
    List,
    Set,
}

/// Fluent builder for attributes.
///
/// ```ignore
/// AttributeBuilder::new("file_system_id", AttributeType::String)
///     .description("The ID of the file system")
///     .required()
///     .build()
/// ```
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, r#type: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
            },
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.attribute.description = description.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// Fluent builder for schemas.
pub struct SchemaBuilder {
    version: i64,
    description: String,
    attributes: Vec<Attribute>,
    block_types: Vec<NestedBlock>,
}

impl SchemaBuilder {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            version: 0,
            description: String::new(),
            attributes: Vec::new(),
            block_types: Vec::new(),
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn block(mut self, block: NestedBlock) -> Self {
        self.block_types.push(block);
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            version: self.version,
            block: Block {
                attributes: self.attributes,
                block_types: self.block_types,
                description: self.description,
            },
        }
    }
}

/// Builder for nested blocks.
pub struct NestedBlockBuilder {
    type_name: String,
    nesting: NestingMode,
    min_items: i64,
    max_items: i64,
    attributes: Vec<Attribute>,
    description: String,
}

impl NestedBlockBuilder {
    pub fn new(type_name: &str, nesting: NestingMode) -> Self {
        Self {
            type_name: type_name.to_string(),
            nesting,
            min_items: 0,
            max_items: 0,
            attributes: Vec::new(),
            description: String::new(),
        }
    }

    pub fn min_items(mut self, min: i64) -> Self {
        self.min_items = min;
        self
    }

    pub fn max_items(mut self, max: i64) -> Self {
        self.max_items = max;
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn build(self) -> NestedBlock {
        NestedBlock {
            type_name: self.type_name,
            block: Block {
                attributes: self.attributes,
                block_types: Vec::new(),
                description: self.description,
            },
            nesting: self.nesting,
            min_items: self.min_items,
            max_items: self.max_items,
        }
    }
}

impl Schema {
    /// Look up a top-level attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attributes.iter().find(|a| a.name == name)
    }

    /// Look up a nested block by type name.
    pub fn nested_block(&self, type_name: &str) -> Option<&NestedBlock> {
        self.block
            .block_types
            .iter()
            .find(|b| b.type_name == type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_attribute_flags() {
        let schema = SchemaBuilder::new()
            .version(1)
            .description("test schema")
            .attribute(
                AttributeBuilder::new("endpoint", AttributeType::String)
                    .description("API endpoint")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("api_token", AttributeType::String)
                    .required()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("insecure", AttributeType::Bool)
                    .optional()
                    .build(),
            )
            .build();

        assert_eq!(schema.version, 1);
        assert!(schema.attribute("endpoint").unwrap().required);
        assert!(schema.attribute("api_token").unwrap().sensitive);
        assert!(schema.attribute("insecure").unwrap().optional);
        assert!(schema.attribute("missing").is_none());
    }

    #[test]
    fn nested_blocks_carry_item_bounds() {
        let schema = SchemaBuilder::new()
            .block(
                NestedBlockBuilder::new("backup_policy", NestingMode::List)
                    .min_items(1)
                    .max_items(1)
                    .attribute(
                        AttributeBuilder::new("status", AttributeType::String)
                            .required()
                            .build(),
                    )
                    .build(),
            )
            .build();

        let block = schema.nested_block("backup_policy").unwrap();
        assert_eq!(block.nesting, NestingMode::List);
        assert_eq!(block.min_items, 1);
        assert_eq!(block.max_items, 1);
        assert_eq!(block.block.attributes.len(), 1);
    }
}
