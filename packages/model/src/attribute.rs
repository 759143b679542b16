use serde::{Deserialize, Serialize};

/// Kind of control an attribute is edited with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    /// Pick one value out of a closed list
    #[default]
    Select,
}

/// One discrete option within an attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeValue {
    /// Machine key, stored in variant assignments
    pub value: String,
    /// Human label
    pub display_name: String,
    #[serde(default)]
    pub order: u32,
}

impl AttributeValue {
    pub fn new(value: impl Into<String>, display_name: impl Into<String>, order: u32) -> Self {
        Self {
            value: value.into(),
            display_name: display_name.into(),
            order,
        }
    }
}

/// A named, ordered dimension of product variation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: String,
    /// Unique key within an `AttributeSet`
    pub slug: String,
    #[serde(default, rename = "type")]
    pub kind: AttributeKind,
    #[serde(default)]
    pub values: Vec<AttributeValue>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            kind: AttributeKind::Select,
            values: Vec::new(),
        }
    }

    /// Append a value, numbering it after the existing ones
    pub fn with_value(mut self, value: impl Into<String>, display_name: impl Into<String>) -> Self {
        let order = self.values.len() as u32;
        self.values.push(AttributeValue::new(value, display_name, order));
        self
    }

    pub fn value(&self, value: &str) -> Option<&AttributeValue> {
        self.values.iter().find(|v| v.value == value)
    }

    pub fn value_position(&self, value: &str) -> Option<usize> {
        self.values.iter().position(|v| v.value == value)
    }

    /// Display label for a machine value, falling back to the value itself
    pub fn display_name_of<'a>(&'a self, value: &'a str) -> &'a str {
        self.value(value)
            .map(|v| v.display_name.as_str())
            .unwrap_or(value)
    }

    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }

    /// Renumber `order` to match list position
    pub fn renumber(&mut self) {
        for (i, value) in self.values.iter_mut().enumerate() {
            value.order = i as u32;
        }
    }
}

/// Ordered collection of attributes.
///
/// Order matters: the first two attributes are the matrix axes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet {
    attributes: Vec<Attribute>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attributes(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.attributes.iter()
    }

    pub fn as_slice(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn get(&self, slug: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.slug == slug)
    }

    pub fn get_mut(&mut self, slug: &str) -> Option<&mut Attribute> {
        self.attributes.iter_mut().find(|a| a.slug == slug)
    }

    pub fn position(&self, slug: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.slug == slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.position(slug).is_some()
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.slug.as_str())
    }

    /// Attributes that contribute a dimension (at least one value)
    pub fn with_values(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|a| a.has_values())
    }

    /// Row and column axes of the matrix: the first two attributes
    pub fn axes(&self) -> Option<(&Attribute, &Attribute)> {
        match self.attributes.as_slice() {
            [first, second, ..] => Some((first, second)),
            _ => None,
        }
    }

    /// Insert at `index` (clamped to the end)
    pub fn insert(&mut self, index: usize, attribute: Attribute) {
        let index = index.min(self.attributes.len());
        self.attributes.insert(index, attribute);
    }

    pub fn push(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    pub fn remove(&mut self, slug: &str) -> Option<(usize, Attribute)> {
        let index = self.position(slug)?;
        Some((index, self.attributes.remove(index)))
    }

    pub fn into_vec(self) -> Vec<Attribute> {
        self.attributes
    }
}

impl<'a> IntoIterator for &'a AttributeSet {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}

impl FromIterator<Attribute> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}
