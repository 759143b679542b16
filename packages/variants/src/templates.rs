//! # Attribute Templates
//!
//! Static library of ready-made attribute sets, taken from the price lists
//! the catalog is built from. Templates carry names, slugs and values but no
//! prices.
//!
//! The catalog is closed: every template is a `TemplateId` variant and its
//! data lives in a static registry below. Adding a template means adding an
//! enum variant and a registry entry.

use serde::{Deserialize, Serialize};
use std::fmt;
use stonecat_model::{Attribute, AttributeSet, ProductType};

/// Identifier of a predefined template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateId {
    PlitaMramornaya,
    TumbaRitualnaya,
    Vazy,
    StelaRitualnaya,
    TsvetnikRitualnyi,
    ZakaznayaPlita,
}

/// Badge shown next to a template in pickers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateIcon {
    Package,
    Tag,
    Sparkles,
    Settings,
}

/// Attribute definition inside a template
#[derive(Debug)]
pub struct TemplateAttribute {
    pub name: &'static str,
    pub slug: &'static str,
    /// `(value, display name)` pairs, in order
    pub values: &'static [(&'static str, &'static str)],
}

/// A named, predefined attribute set
#[derive(Debug)]
pub struct AttributeTemplate {
    pub id: TemplateId,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub icon: TemplateIcon,
    pub attributes: &'static [TemplateAttribute],
}

impl AttributeTemplate {
    /// Fresh, owned attribute set (order preserved)
    pub fn attribute_set(&self) -> AttributeSet {
        self.attributes
            .iter()
            .map(|attr| {
                attr.values
                    .iter()
                    .fold(Attribute::new(attr.name, attr.slug), |a, (value, display)| {
                        a.with_value(*value, *display)
                    })
            })
            .collect()
    }

    /// Number of variants the template expands to
    pub fn combination_count(&self) -> usize {
        self.attributes.iter().map(|a| a.values.len()).product()
    }

    /// Whether the template fits a product pricing type.
    ///
    /// Single-variant products take one-attribute templates, matrix products
    /// take templates with at least two attributes; other types take any.
    pub fn fits(&self, product_type: ProductType) -> bool {
        match product_type {
            ProductType::SingleVariant => self.attributes.len() == 1,
            ProductType::Matrix => self.attributes.len() >= 2,
            _ => true,
        }
    }
}

impl TemplateId {
    pub const ALL: [TemplateId; 6] = [
        TemplateId::PlitaMramornaya,
        TemplateId::TumbaRitualnaya,
        TemplateId::Vazy,
        TemplateId::StelaRitualnaya,
        TemplateId::TsvetnikRitualnyi,
        TemplateId::ZakaznayaPlita,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::PlitaMramornaya => "plita-mramornaya",
            TemplateId::TumbaRitualnaya => "tumba-ritualnaya",
            TemplateId::Vazy => "vazy",
            TemplateId::StelaRitualnaya => "stela-ritualnaya",
            TemplateId::TsvetnikRitualnyi => "tsvetnik-ritualnyi",
            TemplateId::ZakaznayaPlita => "zakaznaya-plita",
        }
    }

    pub fn template(&self) -> &'static AttributeTemplate {
        match self {
            TemplateId::PlitaMramornaya => &PLITA_MRAMORNAYA,
            TemplateId::TumbaRitualnaya => &TUMBA_RITUALNAYA,
            TemplateId::Vazy => &VAZY,
            TemplateId::StelaRitualnaya => &STELA_RITUALNAYA,
            TemplateId::TsvetnikRitualnyi => &TSVETNIK_RITUALNYI,
            TemplateId::ZakaznayaPlita => &ZAKAZNAYA_PLITA,
        }
    }

    pub fn attribute_set(&self) -> AttributeSet {
        self.template().attribute_set()
    }

    /// Templates offered for a product type, in catalog order
    pub fn for_product_type(product_type: ProductType) -> Vec<&'static AttributeTemplate> {
        Self::ALL
            .iter()
            .map(|id| id.template())
            .filter(|t| t.fits(product_type))
            .collect()
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TemplateId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("Unknown template: {}", s))
    }
}

// Registry

static PLITA_MRAMORNAYA: AttributeTemplate = AttributeTemplate {
    id: TemplateId::PlitaMramornaya,
    name: "Плита мраморная",
    description: "Размер × Сорт (2×2 = 4 варианта)",
    category: "Плита из мрамора",
    icon: TemplateIcon::Package,
    attributes: &[
        TemplateAttribute {
            name: "Размер",
            slug: "size",
            values: &[
                ("300*300*15", "300×300×15 мм"),
                ("300*600*15", "300×600×15 мм"),
            ],
        },
        TemplateAttribute {
            name: "Сорт",
            slug: "grade",
            values: &[("1", "Сорт 1"), ("2", "Сорт 2")],
        },
    ],
};

static TUMBA_RITUALNAYA: AttributeTemplate = AttributeTemplate {
    id: TemplateId::TumbaRitualnaya,
    name: "Тумба ритуальная",
    description: "Размер основания × Высота (7×4 = 28 вариантов)",
    category: "Ритуальные изделия",
    icon: TemplateIcon::Tag,
    attributes: &[
        TemplateAttribute {
            name: "Размер основания",
            slug: "base_size",
            values: &[
                ("500*150", "500×150 мм"),
                ("550*150", "550×150 мм"),
                ("600*150", "600×150 мм"),
                ("500*200", "500×200 мм"),
                ("550*200", "550×200 мм"),
                ("600*200", "600×200 мм"),
                ("700*200", "700×200 мм"),
            ],
        },
        TemplateAttribute {
            name: "Высота",
            slug: "height",
            values: &[
                ("70", "70 мм"),
                ("120", "120 мм"),
                ("130", "130 мм"),
                ("150", "150 мм"),
            ],
        },
    ],
};

static VAZY: AttributeTemplate = AttributeTemplate {
    id: TemplateId::Vazy,
    name: "Вазы",
    description: "Размер (6 вариантов)",
    category: "Ритуальные изделия",
    icon: TemplateIcon::Package,
    attributes: &[TemplateAttribute {
        name: "Размер",
        slug: "size",
        values: &[
            ("200*110", "200×110 мм"),
            ("250*120", "250×120 мм"),
            ("300*120", "300×120 мм"),
            ("350*130", "350×130 мм"),
            ("400*130", "400×130 мм"),
            ("500*130", "500×130 мм"),
        ],
    }],
};

static STELA_RITUALNAYA: AttributeTemplate = AttributeTemplate {
    id: TemplateId::StelaRitualnaya,
    name: "Стела ритуальная",
    description: "Размер (16 вариантов с весом)",
    category: "Ритуальные изделия",
    icon: TemplateIcon::Sparkles,
    attributes: &[TemplateAttribute {
        name: "Размер",
        slug: "size",
        values: &[
            ("600*400*60", "600×400×60 мм"),
            ("700*400*60", "700×400×60 мм"),
            ("800*400*60", "800×400×60 мм"),
            ("900*400*60", "900×400×60 мм"),
            ("1000*400*60", "1000×400×60 мм"),
            ("800*450*70", "800×450×70 мм"),
            ("900*450*70", "900×450×70 мм"),
            ("1000*450*70", "1000×450×70 мм"),
            ("1100*450*70", "1100×450×70 мм"),
            ("1200*450*70", "1200×450×70 мм"),
            ("1000*500*70", "1000×500×70 мм"),
            ("1100*500*70", "1100×500×70 мм"),
            ("1200*500*70", "1200×500×70 мм"),
            ("1000*600*70", "1000×600×70 мм"),
            ("1100*600*70", "1100×600×70 мм"),
            ("1200*600*70", "1200×600×70 мм"),
        ],
    }],
};

static TSVETNIK_RITUALNYI: AttributeTemplate = AttributeTemplate {
    id: TemplateId::TsvetnikRitualnyi,
    name: "Цветник ритуальный",
    description: "Размер × Обработка (4×2 = 8 вариантов)",
    category: "Ритуальные изделия",
    icon: TemplateIcon::Settings,
    attributes: &[
        TemplateAttribute {
            name: "Размер",
            slug: "size",
            values: &[
                ("1000*70*40", "1000×70×40 мм (2 шт), 500/600×70×40 (1 шт)"),
                ("1000*70*50", "1000×70×50 мм (2 шт), 500/600×70×50 (1 шт)"),
                ("1100*70*50", "1100×70×50 мм (2 шт), 500/600×70×50 (1 шт)"),
                ("1200*70*50", "1200×70×50 мм (2 шт), 500/600×70×50 (1 шт)"),
            ],
        },
        TemplateAttribute {
            name: "Обработка",
            slug: "finish",
            values: &[("sawed", "Пилен"), ("polished", "Полир")],
        },
    ],
};

static ZAKAZNAYA_PLITA: AttributeTemplate = AttributeTemplate {
    id: TemplateId::ZakaznayaPlita,
    name: "Заказная плита",
    description: "Толщина × Диапазон размеров",
    category: "Плита из мрамора",
    icon: TemplateIcon::Package,
    attributes: &[TemplateAttribute {
        name: "Толщина",
        slug: "thickness",
        values: &[
            ("10", "10 мм (L до 400мм, W 300мм)"),
            ("15", "15 мм (L до 600мм, W 400мм)"),
            ("20-1", "20 мм (L до 600мм, W до 400мм)"),
            ("20-2", "20 мм (L 600-1200мм, W до 600мм)"),
            ("30", "30 мм (L до 1200мм, W до 600мм)"),
            ("40", "40 мм (L до 1200мм, W до 600мм)"),
        ],
    }],
};
