//! DTOs for decoding Board Game Atlas JSON responses.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::domain::{GameDetails, GameTag};

#[derive(Debug, Deserialize)]
pub(super) struct SearchResponseDto {
    #[serde(default)]
    pub(super) games: Vec<GameDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GameDto {
    pub(super) id: String,
    #[serde(default)]
    pub(super) name: String,
    #[serde(default)]
    pub(super) description: Option<String>,
    #[serde(default)]
    pub(super) mechanics: Vec<TagRefDto>,
    #[serde(default)]
    pub(super) categories: Vec<TagRefDto>,
    pub(super) image_url: Option<String>,
    pub(super) thumb_url: Option<String>,
    pub(super) rank: Option<u32>,
    pub(super) year_published: Option<u32>,
    pub(super) min_players: Option<u32>,
    pub(super) max_players: Option<u32>,
    pub(super) url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TagRefDto {
    pub(super) id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct MechanicsResponseDto {
    #[serde(default)]
    pub(super) mechanics: Vec<NamedTagDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CategoriesResponseDto {
    #[serde(default)]
    pub(super) categories: Vec<NamedTagDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct NamedTagDto {
    pub(super) id: String,
    #[serde(default)]
    pub(super) name: String,
}

/// Body of a 429 answer.
#[derive(Debug, Deserialize)]
pub(super) struct ThrottledDto {
    pub(super) message: Option<String>,
}

static MARKUP_RE: OnceLock<Regex> = OnceLock::new();

fn markup_regex() -> &'static Regex {
    MARKUP_RE.get_or_init(|| {
        Regex::new(r"(?s)<.*?>")
            .unwrap_or_else(|error| panic!("markup regex failed to compile: {error}"))
    })
}

/// Remove every `<...>` span, including ones spanning lines.
pub(super) fn strip_markup(raw: &str) -> String {
    markup_regex().replace_all(raw, "").into_owned()
}

impl GameDto {
    pub(super) fn mechanic_ids(&self) -> impl Iterator<Item = &str> {
        self.mechanics.iter().map(|tag| tag.id.as_str())
    }

    pub(super) fn category_ids(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|tag| tag.id.as_str())
    }

    /// Map into the domain record, naming tags through the two resolvers.
    pub(super) fn into_domain(
        self,
        mechanic_name: impl Fn(&str) -> String,
        category_name: impl Fn(&str) -> String,
    ) -> GameDetails {
        GameDetails {
            id: self.id,
            name: self.name,
            description: self
                .description
                .as_deref()
                .map(strip_markup)
                .unwrap_or_default(),
            mechanics: resolve_tags(self.mechanics, mechanic_name),
            categories: resolve_tags(self.categories, category_name),
            image_url: self.image_url,
            thumb_url: self.thumb_url,
            rank: self.rank,
            year_published: self.year_published,
            min_players: self.min_players,
            max_players: self.max_players,
            url: self.url,
        }
    }
}

fn resolve_tags(refs: Vec<TagRefDto>, name: impl Fn(&str) -> String) -> Vec<GameTag> {
    refs.into_iter()
        .map(|tag| GameTag {
            name: name(&tag.id),
            id: tag.id,
        })
        .collect()
}
