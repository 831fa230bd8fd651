use gloo_net::http::Request;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

use crate::config::StackConfig;
use crate::deck::CardItem;

const MANIFEST_URL: &str = "assets/gift.json";

#[derive(Debug, Clone, PartialEq)]
pub struct GiftManifest {
    pub cards: Vec<CardItem>,
    pub config: StackConfig,
}

#[derive(Debug)]
pub enum DataError {
    NotFound(String),
    Network(String),
    Parse(String),
    Empty,
}

impl DataError {
    fn network<E: fmt::Display>(err: E) -> Self {
        Self::Network(err.to_string())
    }

    fn parse<E: fmt::Display>(err: E) -> Self {
        Self::Parse(err.to_string())
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::NotFound(url) => write!(f, "{url} not found"),
            DataError::Network(message) => write!(f, "network error: {message}"),
            DataError::Parse(message) => write!(f, "invalid manifest: {message}"),
            DataError::Empty => f.write_str("manifest does not contain any cards"),
        }
    }
}

impl std::error::Error for DataError {}

#[derive(Deserialize)]
struct RawManifest {
    #[serde(default)]
    cards: Vec<RawCard>,
    #[serde(default)]
    config: StackConfig,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCard {
    Image(String),
    Detailed {
        #[serde(default)]
        id: Option<String>,
        image: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        subtitle: Option<String>,
        #[serde(default)]
        description: Option<String>,
    },
}

pub async fn load_manifest() -> Result<GiftManifest, DataError> {
    let response = Request::get(MANIFEST_URL)
        .send()
        .await
        .map_err(DataError::network)?;

    if response.status() == 404 {
        return Err(DataError::NotFound(MANIFEST_URL.to_owned()));
    }

    if !response.ok() {
        return Err(DataError::Network(format!(
            "HTTP {} while fetching {}",
            response.status(),
            MANIFEST_URL
        )));
    }

    let text = response.text().await.map_err(DataError::network)?;
    parse_manifest(&text)
}

pub fn parse_manifest(text: &str) -> Result<GiftManifest, DataError> {
    let raw: RawManifest = serde_json::from_str(text).map_err(DataError::parse)?;
    if raw.cards.is_empty() {
        return Err(DataError::Empty);
    }

    let mut seen = HashSet::new();
    let mut cards = Vec::with_capacity(raw.cards.len());

    for (index, raw_card) in raw.cards.into_iter().enumerate() {
        let (explicit_id, image, title, subtitle, description) = match raw_card {
            RawCard::Image(image) => (None, image, None, None, None),
            RawCard::Detailed {
                id,
                image,
                title,
                subtitle,
                description,
            } => (id, image, title, subtitle, description),
        };

        let image = image.trim().to_string();
        if image.is_empty() {
            return Err(DataError::Parse(format!("Card {} has no image", index)));
        }

        let mut candidate = explicit_id
            .as_deref()
            .map(slugify)
            .unwrap_or_else(|| slugify(file_stem(&image)));
        if candidate.is_empty() {
            candidate = format!("card-{}", index);
        }

        cards.push(CardItem {
            id: ensure_unique_id(&mut seen, candidate),
            image,
            title: non_blank(title),
            subtitle: non_blank(subtitle),
            description: non_blank(description),
        });
    }

    Ok(GiftManifest {
        cards,
        config: raw.config,
    })
}

/// Four sample cards shipped with the widget, used when no manifest loads.
pub fn default_manifest() -> GiftManifest {
    let sample = |n: usize, title: &str, subtitle: &str, description: &str| CardItem {
        id: format!("image{n}"),
        image: format!("assets/image{n}.svg"),
        title: Some(title.to_string()),
        subtitle: Some(subtitle.to_string()),
        description: Some(description.to_string()),
    };
    GiftManifest {
        cards: vec![
            sample(1, "Gift Card 1", "Special Offer", "Get 20% off on your next purchase"),
            sample(2, "Gift Card 2", "Premium Deal", "Exclusive access to premium features"),
            sample(3, "Gift Card 3", "Limited Time", "Flash sale - 50% off everything"),
            sample(4, "Gift Card 4", "VIP Access", "Join our VIP membership program"),
        ],
        config: StackConfig::default(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}

fn ensure_unique_id(seen: &mut HashSet<String>, base: String) -> String {
    if seen.insert(base.clone()) {
        return base;
    }

    let mut counter = 2;
    loop {
        let candidate = format!("{}-{}", base, counter);
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

fn slugify(input: &str) -> String {
    let mut slug = String::new();

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || matches!(ch, '-' | '_' | '.') {
            if !slug.ends_with('-') {
                slug.push('-');
            }
        }
    }

    slug.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Green Apple"), "green-apple");
        assert_eq!(slugify("  Mango!!!  "), "mango");
    }

    #[test]
    fn file_stem_strips_dirs_and_extension() {
        assert_eq!(file_stem("/assets/photos/beach.day.jpg"), "beach.day");
        assert_eq!(file_stem("image1.svg"), "image1");
        assert_eq!(file_stem(".hidden"), ".hidden");
    }

    #[test]
    fn mixed_cards_parse_with_unique_ids() {
        let manifest = parse_manifest(
            r#"{
                "cards": [
                    "photos/cat.png",
                    "other/cat.jpg",
                    { "image": "dog.png", "title": "Dog", "subtitle": "  " },
                    { "id": "Best Card", "image": "x.png" },
                    "!!!.png"
                ],
                "config": { "timing": { "exit_ms": 400 } }
            }"#,
        )
        .unwrap();
        let ids: Vec<_> = manifest.cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["cat", "cat-2", "dog", "best-card", "card-4"]);
        assert_eq!(manifest.cards[2].title.as_deref(), Some("Dog"));
        assert_eq!(manifest.cards[2].subtitle, None);
        assert_eq!(manifest.config.timing.exit_ms, 400);
        assert_eq!(manifest.config.timing.return_ms, 300);
    }

    #[test]
    fn rejects_empty_and_blank() {
        assert!(matches!(parse_manifest(r#"{ "cards": [] }"#), Err(DataError::Empty)));
        assert!(matches!(parse_manifest("{}"), Err(DataError::Empty)));
        assert!(matches!(
            parse_manifest(r#"{ "cards": ["  "] }"#),
            Err(DataError::Parse(_))
        ));
        assert!(matches!(parse_manifest("not json"), Err(DataError::Parse(_))));
    }

    #[test]
    fn default_manifest_has_four_cards() {
        let manifest = default_manifest();
        assert_eq!(manifest.cards.len(), 4);
        assert_eq!(manifest.cards[0].image, "assets/image1.svg");
        assert_eq!(manifest.config, StackConfig::default());
    }

    #[test]
    fn shipped_images_exist() {
        let shipped = parse_manifest(include_str!("../assets/gift.json")).unwrap();
        let fallback = default_manifest();
        let ids = |m: &GiftManifest| m.cards.iter().map(|c| c.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&shipped), ids(&fallback));

        let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
        for card in shipped.cards.iter().chain(fallback.cards.iter()) {
            assert!(root.join(&card.image).is_file(), "missing {}", card.image);
        }
    }
}
