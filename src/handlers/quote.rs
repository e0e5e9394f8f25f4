use crate::error::AdagenError;
use crate::handlers::AppState;
use crate::models::{PriceQuote, DEFAULT_DURATION_SECONDS};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct QuoteParams {
    duration: Option<String>,
}

/// GET /api/price: quote for the requested duration. A missing, unparsable
/// or zero duration falls back to the 4-second default.
pub async fn get_price(
    State(state): State<AppState>,
    Query(params): Query<QuoteParams>,
) -> Result<Json<PriceQuote>, AdagenError> {
    let duration = normalize_duration(params.duration.as_deref());
    let quote = state.pricing.quote(duration).await?;
    Ok(Json(quote))
}

fn normalize_duration(raw: Option<&str>) -> u32 {
    match raw.and_then(|v| v.trim().parse::<u32>().ok()) {
        Some(d) if d > 0 => d,
        _ => DEFAULT_DURATION_SECONDS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_falls_back_to_default() {
        assert_eq!(normalize_duration(None), 4);
        assert_eq!(normalize_duration(Some("")), 4);
        assert_eq!(normalize_duration(Some("abc")), 4);
        assert_eq!(normalize_duration(Some("0")), 4);
        assert_eq!(normalize_duration(Some("-5")), 4);
    }

    #[test]
    fn valid_duration_passes_through() {
        assert_eq!(normalize_duration(Some("8")), 8);
        assert_eq!(normalize_duration(Some(" 12 ")), 12);
    }
}
