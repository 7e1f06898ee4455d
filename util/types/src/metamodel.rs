//! Metamodel description: object types, attribute schemas, type lookup.
//!
//! The metamodel is a consumed interface: the store enforces it but never
//! defines domain content. Domain crates build a [`StaticMetamodel`] (or
//! implement [`Metamodel`] themselves) and hand it to the design at
//! construction. Graph constraints are carried separately, one crate above
//! this layer, because they are defined over frames.

use std::collections::BTreeMap;
use std::sync::Arc;

use semver::Version;

use crate::structure::StructuralKind;
use crate::value::{ValueType, Variant};

/// Schema of a single attribute of an object type.
#[derive(Clone, Debug)]
pub struct AttributeDescriptor {
    name: String,
    value_type: ValueType,
    default: Option<Variant>,
}

impl AttributeDescriptor {
    /// Creates a descriptor without a default value.
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        AttributeDescriptor {
            name: name.into(),
            value_type,
            default: None,
        }
    }

    /// Creates a descriptor with a default value.
    ///
    /// The default must already be of the declared type; the loader and the
    /// frame API convert explicit values, defaults are trusted.
    pub fn with_default(
        name: impl Into<String>,
        value_type: ValueType,
        default: Variant,
    ) -> Self {
        AttributeDescriptor {
            name: name.into(),
            value_type,
            default: Some(default),
        }
    }

    /// Attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared value type.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Default value, if declared.
    pub fn default(&self) -> Option<&Variant> {
        self.default.as_ref()
    }
}

/// Metadata flags of an object type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TypeFlags {
    /// System types are managed by tooling rather than users.
    pub system: bool,
}

/// Description of one object type: name, structural kind and attribute
/// schema.
#[derive(Clone, Debug)]
pub struct ObjectType {
    name: String,
    structural_kind: StructuralKind,
    attributes: Vec<AttributeDescriptor>,
    flags: TypeFlags,
}

impl ObjectType {
    /// Creates an object type.
    pub fn new(
        name: impl Into<String>,
        structural_kind: StructuralKind,
        attributes: Vec<AttributeDescriptor>,
    ) -> Self {
        ObjectType {
            name: name.into(),
            structural_kind,
            attributes,
            flags: TypeFlags::default(),
        }
    }

    /// Sets the metadata flags.
    pub fn with_flags(mut self, flags: TypeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Structural kind every snapshot of this type must carry.
    pub fn structural_kind(&self) -> StructuralKind {
        self.structural_kind
    }

    /// Declared attribute descriptors, in declaration order.
    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    /// Metadata flags.
    pub fn flags(&self) -> TypeFlags {
        self.flags
    }

    /// Looks up an attribute descriptor by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|attr| attr.name() == name)
    }

    /// Whether the type declares the named attribute.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Default value of the named attribute, if declared.
    pub fn default_value(&self, name: &str) -> Option<&Variant> {
        self.attribute(name).and_then(AttributeDescriptor::default)
    }
}

/// Consumed metamodel interface.
pub trait Metamodel {
    /// Metamodel name.
    fn name(&self) -> &str;

    /// Metamodel version.
    fn version(&self) -> &Version;

    /// Looks up an object type by name.
    fn object_type(&self, name: &str) -> Option<Arc<ObjectType>>;

    /// All object types, in name order.
    fn object_types(&self) -> Vec<Arc<ObjectType>>;
}

/// A metamodel backed by a static type table.
#[derive(Clone, Debug)]
pub struct StaticMetamodel {
    name: String,
    version: Version,
    types: BTreeMap<String, Arc<ObjectType>>,
}

impl StaticMetamodel {
    /// Creates a metamodel from a list of object types.
    pub fn new(name: impl Into<String>, version: Version, types: Vec<ObjectType>) -> Self {
        let types = types
            .into_iter()
            .map(|object_type| (object_type.name().to_string(), Arc::new(object_type)))
            .collect();
        StaticMetamodel {
            name: name.into(),
            version,
            types,
        }
    }
}

impl Metamodel for StaticMetamodel {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &Version {
        &self.version
    }

    fn object_type(&self, name: &str) -> Option<Arc<ObjectType>> {
        self.types.get(name).cloned()
    }

    fn object_types(&self) -> Vec<Arc<ObjectType>> {
        self.types.values().cloned().collect()
    }
}
