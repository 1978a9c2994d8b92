#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelCatalogEntry {
    pub label: &'static str,
    pub slug: &'static str,
    pub src: &'static str,
    pub base_scale: f32,
}

pub const DEFAULT_MODEL_SLUG: &str = "koinobori";

pub const MODEL_CATALOG: &[ModelCatalogEntry] = &[
    ModelCatalogEntry {
        label: "こいのぼり",
        slug: "koinobori",
        src: "models/koinobori.glb",
        base_scale: 1.0,
    },
    ModelCatalogEntry {
        label: "ちょうちん",
        slug: "chochin",
        src: "models/chochin.glb",
        base_scale: 0.6,
    },
    ModelCatalogEntry {
        label: "だるま",
        slug: "daruma",
        src: "models/daruma.glb",
        base_scale: 0.8,
    },
];

pub fn model_by_slug(slug: &str) -> Option<&'static ModelCatalogEntry> {
    let trimmed = slug.trim();
    MODEL_CATALOG.iter().find(|entry| entry.slug == trimmed)
}

pub fn model_or_default(slug: &str) -> &'static ModelCatalogEntry {
    model_by_slug(slug).unwrap_or_else(default_model)
}

pub fn default_model() -> &'static ModelCatalogEntry {
    MODEL_CATALOG
        .iter()
        .find(|entry| entry.slug == DEFAULT_MODEL_SLUG)
        .unwrap_or(&MODEL_CATALOG[0])
}
