//! Generation properties across attribute shapes

use std::collections::HashSet;

use stonecat_model::{Attribute, AttributeSet, Decimal, VariantKey};
use stonecat_variants::{combination_count, generate, TemplateId, VariantIndex};

fn attribute_with(slug: &str, count: usize) -> Attribute {
    (0..count).fold(Attribute::new(slug.to_uppercase(), slug), |a, i| {
        a.with_value(format!("{}{}", slug, i), format!("{} {}", slug, i))
    })
}

#[test]
fn test_product_of_value_counts() {
    let shapes: &[&[usize]] = &[&[1], &[5], &[2, 2], &[7, 4], &[3, 1, 2], &[2, 3, 4, 2]];

    for shape in shapes {
        let set: AttributeSet = shape
            .iter()
            .enumerate()
            .map(|(i, n)| attribute_with(&format!("a{}", i), *n))
            .collect();

        let variants = generate(&set).unwrap();
        let expected: usize = shape.iter().product();
        assert_eq!(variants.len(), expected, "shape {:?}", shape);
        assert_eq!(combination_count(&set), expected);

        let keys: HashSet<VariantKey> = variants.iter().map(|v| v.key()).collect();
        assert_eq!(keys.len(), expected, "tuples must be unique for {:?}", shape);

        for variant in &variants {
            assert_eq!(variant.assignment.len(), shape.len());
            assert_eq!(variant.price, Decimal::ZERO);
            assert_eq!(variant.stock, 0);
        }
    }
}

#[test]
fn test_innermost_attribute_varies_fastest() {
    let set: AttributeSet = vec![
        attribute_with("x", 2),
        attribute_with("y", 2),
        attribute_with("z", 2),
    ]
    .into_iter()
    .collect();

    let names: Vec<String> = generate(&set).unwrap().into_iter().map(|v| v.name).collect();
    assert_eq!(
        names,
        vec![
            "x 0 × y 0 × z 0",
            "x 0 × y 0 × z 1",
            "x 0 × y 1 × z 0",
            "x 0 × y 1 × z 1",
            "x 1 × y 0 × z 0",
            "x 1 × y 0 × z 1",
            "x 1 × y 1 × z 0",
            "x 1 × y 1 × z 1",
        ]
    );
}

#[test]
fn test_regeneration_is_structurally_idempotent() {
    let set = TemplateId::TsvetnikRitualnyi.attribute_set();

    let mut first = generate(&set).unwrap();
    first[0].price = Decimal::from(1500);
    first[0].stock = 3;

    let second = generate(&set).unwrap();
    let first_keys: Vec<_> = first.iter().map(|v| v.key()).collect();
    let second_keys: Vec<_> = second.iter().map(|v| v.key()).collect();

    assert_eq!(first_keys, second_keys);
    assert_eq!(second[0].price, Decimal::ZERO);
    assert_eq!(second[0].stock, 0);
}

#[test]
fn test_size_grade_scenario() {
    let set = AttributeSet::from_attributes(vec![
        Attribute::new("Size", "size").with_value("A", "A").with_value("B", "B"),
        Attribute::new("Grade", "grade").with_value("1", "1").with_value("2", "2"),
    ]);

    let variants = generate(&set).unwrap();
    let names: Vec<_> = variants.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["A × 1", "A × 2", "B × 1", "B × 2"]);

    let index = VariantIndex::with_axes(&variants, "size", "grade");
    let position = index.find("B", "2").unwrap();
    assert_eq!(variants[position].name, "B × 2");
    assert_eq!(index.find("C", "2"), None);
}

#[test]
fn test_every_template_generates() {
    for id in TemplateId::ALL {
        let template = id.template();
        let variants = generate(&template.attribute_set()).unwrap();
        assert_eq!(variants.len(), template.combination_count(), "{}", id);
    }
}

#[test]
fn test_tumba_template_yields_28_cells() {
    let set = TemplateId::TumbaRitualnaya.attribute_set();
    let variants = generate(&set).unwrap();
    assert_eq!(variants.len(), 28);

    let (rows, cols) = set.axes().unwrap();
    let index = VariantIndex::with_axes(&variants, &rows.slug, &cols.slug);
    for row in &rows.values {
        for col in &cols.values {
            assert!(index.find(&row.value, &col.value).is_some());
        }
    }
    assert!(index.duplicates().is_empty());
}
