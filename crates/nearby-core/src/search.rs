use std::sync::Arc;

use crate::{
    credentials::TokenManager,
    domain::Coordinate,
    geo::{bounding_box, SEARCH_RADIUS_KM},
    ports::{OneMapApi, ThemeQuery},
    results::format_results,
    themes::Theme,
    Result,
};

/// Reply used when a label does not name a known category.
pub const THEME_UNAVAILABLE: &str = "This search theme is currently not available";

/// Runs one nearby-facility lookup end to end.
///
/// Sequence per call: token check (optionally one login), then exactly one
/// theme search, then formatting.
pub struct FacilitySearch {
    api: Arc<dyn OneMapApi>,
    tokens: Arc<TokenManager>,
}

impl FacilitySearch {
    pub fn new(api: Arc<dyn OneMapApi>, tokens: Arc<TokenManager>) -> Self {
        Self { api, tokens }
    }

    pub async fn search(&self, label: &str, origin: Coordinate) -> Result<String> {
        let Some(theme) = Theme::resolve(label) else {
            return Ok(THEME_UNAVAILABLE.to_string());
        };

        let token = self.tokens.get_token().await?;
        let query = ThemeQuery {
            query_name: theme.code().to_string(),
            token,
            extents: bounding_box(origin, SEARCH_RADIUS_KM),
        };

        let body = self.api.retrieve_theme(&query).await?;
        format_results(&body, origin, theme)
    }
}
