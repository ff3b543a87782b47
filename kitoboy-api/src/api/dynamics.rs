//! Attribute dynamics chart for one avatar

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Datelike, FixedOffset, NaiveDate};
use kitoboy_common::dynamics::counter::parse_posted_at;
use kitoboy_common::dynamics::{calculate_chart_data, ChartData, ChartInput, Granularity, MessageLog};
use kitoboy_common::models::Attribute;
use serde::{Deserialize, Serialize};

use crate::db::{attributes, avatars};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Offsets beyond ±18h are rejected by chrono
const MAX_OFFSET_MINUTES: i32 = 18 * 60;

/// Widest month or year chart served, in calendar years
///
/// Day charts are capped by bucket count instead.
const MAX_SPAN_YEARS: i32 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub granularity: Option<String>,
    /// Comma-separated attribute ids, in display order
    pub attribute_ids: Option<String>,
    pub utc_offset_minutes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicsResponse {
    #[serde(flatten)]
    pub chart: ChartData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Attributes present on the avatar's posts, for the selection control
    pub available_attributes: Vec<Attribute>,
}

impl DynamicsQuery {
    fn utc_offset(&self) -> ApiResult<FixedOffset> {
        let minutes = match self.utc_offset_minutes.as_deref().map(str::trim) {
            None | Some("") => 0,
            Some(raw) => raw
                .parse::<i32>()
                .ok()
                .filter(|m| m.abs() <= MAX_OFFSET_MINUTES)
                .ok_or_else(|| ApiError::bad_request("Incorrect utcOffsetMinutes"))?,
        };

        FixedOffset::east_opt(minutes * 60)
            .ok_or_else(|| ApiError::bad_request("Incorrect utcOffsetMinutes"))
    }

    /// Dates accept `YYYY-MM-DD` or a full timestamp; anything else is absent
    fn date(raw: Option<&str>, offset: &FixedOffset) -> Option<NaiveDate> {
        raw.and_then(|value| parse_posted_at(value, offset))
    }

    fn granularity(&self) -> Option<Granularity> {
        self.granularity.as_deref().and_then(|g| g.parse().ok())
    }

    fn attribute_ids(&self) -> Vec<String> {
        self.attribute_ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Reject month and year ranges wider than [`MAX_SPAN_YEARS`]
fn check_span(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    granularity: Option<Granularity>,
) -> ApiResult<()> {
    let (Some(start), Some(end), Some(Granularity::Month | Granularity::Year)) =
        (start, end, granularity)
    else {
        return Ok(());
    };

    if end.year() - start.year() > MAX_SPAN_YEARS {
        return Err(ApiError::bad_request(format!(
            "Period too long: at most {} years",
            MAX_SPAN_YEARS
        )));
    }

    Ok(())
}

/// GET /get-avatar/:avatarId/dynamics
///
/// Missing or unparseable dates and granularity yield an empty chart.
/// Selected ids are resolved against the attribute catalogue in request
/// order; unknown ids are dropped.
pub async fn get_avatar_dynamics(
    State(state): State<AppState>,
    Path(avatar_id): Path<String>,
    Query(query): Query<DynamicsQuery>,
) -> ApiResult<Json<DynamicsResponse>> {
    let avatar = avatars::fetch_avatar_view(&state.db, avatar_id.trim())
        .await?
        .ok_or_else(|| ApiError::not_found("Avatar not found"))?;

    let utc_offset = query.utc_offset()?;
    let ids = query.attribute_ids();
    let catalogue = attributes::attributes_by_ids(&state.db, &ids).await?;
    let selected: Vec<Attribute> = ids
        .iter()
        .filter_map(|id| catalogue.get(id).cloned())
        .collect();

    let start_date = DynamicsQuery::date(query.start_date.as_deref(), &utc_offset);
    let end_date = DynamicsQuery::date(query.end_date.as_deref(), &utc_offset);
    let granularity = query.granularity();
    check_span(start_date, end_date, granularity)?;

    let input = ChartInput {
        start_date,
        end_date,
        granularity,
        selected_attributes: &selected,
        posts: &avatar.posts,
        utc_offset,
    };

    let log = MessageLog::new();
    let chart = calculate_chart_data(&input, &log);
    let warning = log.into_messages().into_iter().next();

    Ok(Json(DynamicsResponse {
        chart,
        warning,
        available_attributes: avatar.distinct_attributes(),
    }))
}
