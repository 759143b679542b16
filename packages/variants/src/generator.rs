//! # Variant Generation
//!
//! Expands an `AttributeSet` into one `Variant` per combination of values.
//!
//! Attributes without values contribute no dimension. They are dropped with
//! an `info` note rather than failing generation; only a set where *every*
//! attribute is empty is an error.

use std::collections::HashSet;

use stonecat_model::{Assignment, Attribute, AttributeSet, AttributeValue, Variant, NAME_SEPARATOR};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("Add at least one attribute before generating variants")]
    EmptyAttributeSet,

    #[error("Add values to at least one attribute before generating variants")]
    NoAttributeValues,
}

/// Number of variants a generation would produce (0 when nothing is generable)
pub fn combination_count(attributes: &AttributeSet) -> usize {
    let mut dims = attributes.with_values().peekable();
    if dims.peek().is_none() {
        return 0;
    }
    dims.map(|a| distinct_values(a).len()).product()
}

/// Expand the full cartesian product of `attributes`.
///
/// The first attribute with values is the outermost loop; the last is the
/// innermost. Every variant starts at price 0, stock 0.
#[instrument(skip(attributes), fields(attributes = attributes.len()))]
pub fn generate(attributes: &AttributeSet) -> Result<Vec<Variant>, GenerateError> {
    if attributes.is_empty() {
        return Err(GenerateError::EmptyAttributeSet);
    }

    let mut dims: Vec<(&Attribute, Vec<&AttributeValue>)> = Vec::new();
    for attribute in attributes {
        if !attribute.has_values() {
            info!(attribute = %attribute.slug, "Attribute has no values - excluded from generation");
            continue;
        }
        dims.push((attribute, distinct_values(attribute)));
    }

    if dims.is_empty() {
        return Err(GenerateError::NoAttributeValues);
    }

    let expected: usize = dims.iter().map(|(_, values)| values.len()).product();
    let mut variants = Vec::with_capacity(expected);
    let mut chosen = Vec::with_capacity(dims.len());
    expand(&dims, &mut chosen, &mut variants);

    info!(
        dimensions = dims.len(),
        variants = variants.len(),
        "Variant generation complete"
    );
    Ok(variants)
}

fn expand<'a>(
    dims: &[(&'a Attribute, Vec<&'a AttributeValue>)],
    chosen: &mut Vec<(&'a Attribute, &'a AttributeValue)>,
    out: &mut Vec<Variant>,
) {
    let Some(((attribute, values), rest)) = dims.split_first() else {
        out.push(build_variant(chosen));
        return;
    };

    for value in values {
        chosen.push((*attribute, *value));
        expand(rest, chosen, out);
        chosen.pop();
    }
}

fn build_variant(chosen: &[(&Attribute, &AttributeValue)]) -> Variant {
    let assignment: Assignment = chosen
        .iter()
        .map(|(attribute, value)| (attribute.slug.clone(), value.value.clone()))
        .collect();

    let name = chosen
        .iter()
        .map(|(_, value)| value.display_name.as_str())
        .collect::<Vec<_>>()
        .join(NAME_SEPARATOR);

    debug!(variant = %name, "Generated variant");
    Variant::new(assignment, name)
}

/// Values of an attribute with repeated machine keys removed (first wins)
fn distinct_values(attribute: &Attribute) -> Vec<&AttributeValue> {
    let mut seen = HashSet::new();
    let mut values = Vec::with_capacity(attribute.values.len());
    for value in &attribute.values {
        if seen.insert(value.value.as_str()) {
            values.push(value);
        } else {
            warn!(attribute = %attribute.slug, value = %value.value, "Duplicate attribute value skipped");
        }
    }
    values
}

/// Display name for an assignment, in attribute order.
///
/// Slugs missing from the assignment are skipped; values unknown to the
/// attribute fall back to the raw value.
pub fn variant_name(attributes: &AttributeSet, assignment: &Assignment) -> String {
    attributes
        .iter()
        .filter_map(|attribute| {
            assignment
                .get(&attribute.slug)
                .map(|value| attribute.display_name_of(value))
        })
        .collect::<Vec<_>>()
        .join(NAME_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str, slug: &str, values: &[&str]) -> Attribute {
        values
            .iter()
            .fold(Attribute::new(name, slug), |a, v| a.with_value(*v, *v))
    }

    fn tuples(variants: &[Variant], slugs: &[&str]) -> Vec<Vec<String>> {
        variants
            .iter()
            .map(|v| {
                slugs
                    .iter()
                    .map(|s| v.value_of(s).unwrap_or_default().to_string())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_empty_set_fails() {
        let result = generate(&AttributeSet::new());
        assert_eq!(result, Err(GenerateError::EmptyAttributeSet));
    }

    #[test]
    fn test_all_empty_attributes_fail() {
        let set = AttributeSet::from_attributes(vec![
            Attribute::new("Size", "size"),
            Attribute::new("Grade", "grade"),
        ]);
        assert_eq!(generate(&set), Err(GenerateError::NoAttributeValues));
        assert_eq!(combination_count(&set), 0);
    }

    #[test]
    fn test_ordering_outermost_first() {
        let set = AttributeSet::from_attributes(vec![
            attr("A", "a", &["a1", "a2"]),
            attr("B", "b", &["b1", "b2"]),
        ]);

        let variants = generate(&set).unwrap();
        assert_eq!(
            tuples(&variants, &["a", "b"]),
            vec![
                vec!["a1", "b1"],
                vec!["a1", "b2"],
                vec!["a2", "b1"],
                vec!["a2", "b2"],
            ]
        );
    }

    #[test]
    fn test_names_join_display_names() {
        let set = AttributeSet::from_attributes(vec![
            Attribute::new("Size", "size").with_value("300", "300 mm"),
            Attribute::new("Grade", "grade").with_value("1", "Grade 1"),
        ]);

        let variants = generate(&set).unwrap();
        assert_eq!(variants[0].name, "300 mm × Grade 1");
    }

    #[test]
    fn test_empty_attribute_is_excluded() {
        let set = AttributeSet::from_attributes(vec![
            attr("Size", "size", &["A", "B"]),
            Attribute::new("Finish", "finish"),
            attr("Grade", "grade", &["1", "2", "3"]),
        ]);

        let variants = generate(&set).unwrap();
        assert_eq!(variants.len(), 6);
        assert_eq!(combination_count(&set), 6);
        assert!(variants.iter().all(|v| !v.assignment.contains_key("finish")));
        assert_eq!(variants[0].name, "A × 1");
    }

    #[test]
    fn test_duplicate_values_do_not_duplicate_tuples() {
        let set = AttributeSet::from_attributes(vec![attr("Size", "size", &["A", "A", "B"])]);

        let variants = generate(&set).unwrap();
        assert_eq!(variants.len(), 2);
        assert_eq!(combination_count(&set), 2);
    }

    #[test]
    fn test_variant_name_follows_attribute_order() {
        let set = AttributeSet::from_attributes(vec![
            Attribute::new("Size", "size").with_value("A", "Small"),
            Attribute::new("Grade", "grade").with_value("1", "First"),
        ]);
        let mut assignment = Assignment::new();
        assignment.insert("grade".to_string(), "1".to_string());
        assignment.insert("size".to_string(), "A".to_string());

        assert_eq!(variant_name(&set, &assignment), "Small × First");
    }
}
