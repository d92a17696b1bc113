//! Three-level batch model for ingested log records.
//!
//! A [`Batch`] mirrors the shape of an OTLP logs export request:
//!
//! ```text
//! Batch
//!  └─ ResourceGroup   (resource attributes)
//!      └─ ScopeGroup  (instrumentation scope attributes)
//!          └─ Record  (log record attributes)
//! ```
//!
//! Every level carries an ordered list of [`Attribute`]s. Attribute values
//! keep their original kind, but only string values take part in attribute
//! resolution (see [`resolver`](crate::resolver)).
//!
//! # Examples
//!
//! ```rust
//! use conteggio::batch::{Batch, Record, ResourceGroup, ScopeGroup};
//!
//! let batch = Batch::new().with_resource(
//!     ResourceGroup::new()
//!         .with_attribute("env", "production")
//!         .with_scope(
//!             ScopeGroup::new()
//!                 .with_record(Record::new().with_attribute("service", "user-service"))
//!                 .with_record(Record::new()),
//!         ),
//! );
//!
//! assert_eq!(batch.record_count(), 2);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The value of an attribute.
///
/// The variants follow the OTLP `AnyValue` kinds.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AttributeValue {
    /// No value was set.
    #[default]
    Empty,
    /// A UTF-8 string.
    String(String),
    /// A boolean.
    Bool(bool),
    /// A signed 64-bit integer.
    Int(i64),
    /// A 64-bit float.
    Double(f64),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// A homogeneous or heterogeneous list of values.
    Array(Vec<AttributeValue>),
    /// A nested list of key-value pairs.
    Map(Vec<Attribute>),
}

impl AttributeValue {
    /// Returns the string payload, or `None` for every other kind.
    ///
    /// ```rust
    /// use conteggio::batch::AttributeValue;
    ///
    /// assert_eq!(AttributeValue::from("v1.0").as_str(), Some("v1.0"));
    /// assert_eq!(AttributeValue::from(42i64).as_str(), None);
    /// ```
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Double(value)
    }
}

/// A single key-value pair.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Attribute {
    /// The attribute key.
    pub key: String,
    /// The attribute value.
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: AttributeValue,
}

impl Attribute {
    /// Creates a new attribute.
    pub fn new(key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Finds the first string-valued attribute stored under `key`.
///
/// Attributes with a matching key but a non-string value are skipped, so a
/// later string-valued duplicate is still found.
///
/// ```rust
/// use conteggio::batch::{find_str, Attribute};
///
/// let attributes = vec![
///     Attribute::new("service", 7i64),
///     Attribute::new("service", "checkout"),
/// ];
/// assert_eq!(find_str(&attributes, "service"), Some("checkout"));
/// assert_eq!(find_str(&attributes, "env"), None);
/// ```
pub fn find_str<'a>(attributes: &'a [Attribute], key: &str) -> Option<&'a str> {
    attributes
        .iter()
        .filter(|attr| attr.key == key)
        .find_map(|attr| attr.value.as_str())
}

/// A single log record.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Record {
    /// Record-level attributes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub attributes: Vec<Attribute>,
}

impl Record {
    /// Creates a record without attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute, returning `self` for method chaining.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.push(Attribute::new(key, value));
        self
    }
}

/// Records emitted by one instrumentation scope.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScopeGroup {
    /// Scope-level attributes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub attributes: Vec<Attribute>,
    /// Records in arrival order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub records: Vec<Record>,
}

impl ScopeGroup {
    /// Creates an empty scope group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a scope attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.push(Attribute::new(key, value));
        self
    }

    /// Appends a record.
    pub fn with_record(mut self, record: Record) -> Self {
        self.records.push(record);
        self
    }
}

/// Scope groups emitted by one resource.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResourceGroup {
    /// Resource-level attributes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub attributes: Vec<Attribute>,
    /// Scope groups in arrival order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub scopes: Vec<ScopeGroup>,
}

impl ResourceGroup {
    /// Creates an empty resource group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.push(Attribute::new(key, value));
        self
    }

    /// Appends a scope group.
    pub fn with_scope(mut self, scope: ScopeGroup) -> Self {
        self.scopes.push(scope);
        self
    }
}

/// One ingestion unit.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Batch {
    /// Resource groups in arrival order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub resources: Vec<ResourceGroup>,
}

impl Batch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a resource group.
    pub fn with_resource(mut self, resource: ResourceGroup) -> Self {
        self.resources.push(resource);
        self
    }

    /// Returns the total number of records across all groups.
    pub fn record_count(&self) -> usize {
        self.resources
            .iter()
            .flat_map(|resource| &resource.scopes)
            .map(|scope| scope.records.len())
            .sum()
    }

    /// Returns `true` if the batch holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }
}
