//! HTTP handler functions for the emissions dashboard API.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use carbon_dash_dashboard::AppContext;
use carbon_dash_dashboard::layout::build_layout;
use carbon_dash_dashboard_models::DispatchRequest;
use carbon_dash_projection::periods::require_periods;
use carbon_dash_projection::progress::NullProgress;
use carbon_dash_server_models::{
    AllProjectionParams, ApiHealth, NationsResponse, ProjectionParams, ProjectionResponse,
};

use crate::AppState;

/// A failed request: status code plus the message returned as
/// `{ "error": ... }`.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    fn into_response(self) -> HttpResponse {
        if self.status.is_server_error() {
            log::error!("{}", self.message);
        }
        HttpResponse::build(self.status).json(serde_json::json!({
            "error": self.message
        }))
    }
}

fn respond<T: serde::Serialize>(result: Result<T, ApiError>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => e.into_response(),
    }
}

/// Target years from a query parameter, or the configured defaults.
fn resolve_years(ctx: &AppContext, years: Option<&str>) -> Result<Vec<i32>, ApiError> {
    match years {
        Some(input) => require_periods(input).map_err(|e| ApiError::bad_request(e.to_string())),
        None => Ok(ctx.config().projection.default_years.clone()),
    }
}

fn project_nation(
    ctx: &AppContext,
    params: &ProjectionParams,
) -> Result<ProjectionResponse, ApiError> {
    let years = resolve_years(ctx, params.years.as_deref())?;
    let history = ctx
        .dataset()
        .history(&params.nation)
        .ok_or_else(|| ApiError::not_found(format!("Unknown nation '{}'", params.nation)))?;

    let series = ctx
        .engine()
        .merged_series(history, &years)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(ProjectionResponse {
        nation: Some(history.entity().to_string()),
        years,
        series,
    })
}

fn project_every_nation(
    ctx: &AppContext,
    params: &AllProjectionParams,
) -> Result<ProjectionResponse, ApiError> {
    let years = resolve_years(ctx, params.years.as_deref())?;
    let histories = ctx.dataset().histories();

    let series = ctx
        .engine()
        .combined_series(histories, &years, &NullProgress)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(ProjectionResponse {
        nation: None,
        years,
        series,
    })
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/nations`
pub async fn nations(state: web::Data<AppState>) -> HttpResponse {
    let dataset = state.ctx.dataset();
    HttpResponse::Ok().json(NationsResponse {
        nations: dataset.nations().into_iter().map(str::to_string).collect(),
        year_bounds: dataset.year_bounds(),
    })
}

/// `GET /api/layout`
///
/// Page structure plus every value produced by the initial render.
pub async fn layout(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(build_layout(&state.ctx, &state.registry))
}

/// `GET /api/callbacks`
pub async fn callbacks(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.registry.describe())
}

/// `POST /api/callbacks`
///
/// Runs every callback affected by one user interaction.
pub async fn dispatch(
    state: web::Data<AppState>,
    body: web::Json<DispatchRequest>,
) -> HttpResponse {
    let response = state.registry.dispatch(&state.ctx, body.into_inner());
    HttpResponse::Ok().json(response)
}

/// `GET /api/projection?nation=&years=`
pub async fn projection(
    state: web::Data<AppState>,
    params: web::Query<ProjectionParams>,
) -> HttpResponse {
    respond(project_nation(&state.ctx, &params))
}

/// `GET /api/projection/all?years=`
///
/// Runs on the blocking pool; every nation is scored.
pub async fn projection_all(
    state: web::Data<AppState>,
    params: web::Query<AllProjectionParams>,
) -> HttpResponse {
    let params = params.into_inner();
    let result = web::block(move || project_every_nation(&state.ctx, &params)).await;

    match result {
        Ok(result) => respond(result),
        Err(e) => ApiError::internal(format!("Projection task failed: {e}")).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use carbon_dash_dashboard::DashboardConfig;
    use carbon_dash_dataset::Dataset;
    use carbon_dash_projection::{EncodedRecord, FeatureSchema, PredictError};
    use carbon_dash_projection_models::SourceTag;

    use super::*;

    const CSV: &str = "\
Nation,Year,Emissions from solid fuel consumption
ALPHA,2019,100
ALPHA,2020,110
BETA,2020,7
";

    fn solid(record: &EncodedRecord) -> Result<f64, PredictError> {
        Ok(record.get("Emissions from solid fuel consumption").unwrap_or(0.0))
    }

    fn context() -> AppContext {
        let mut config = DashboardConfig::default();
        config.projection.default_years = vec![2021];
        let dataset = Dataset::parse(CSV, &config.projection.settings).unwrap();
        let schema =
            FeatureSchema::parse("Year\nEmissions from solid fuel consumption").unwrap();
        AppContext::new(config, dataset, schema, Box::new(solid)).unwrap()
    }

    fn params(nation: &str, years: Option<&str>) -> ProjectionParams {
        ProjectionParams {
            nation: nation.to_string(),
            years: years.map(str::to_string),
        }
    }

    #[test]
    fn projects_one_nation_with_default_years() {
        let ctx = context();
        let response = project_nation(&ctx, &params("ALPHA", None)).unwrap();
        assert_eq!(response.years, vec![2021]);
        let periods: Vec<i32> = response.series.iter().map(|p| p.period).collect();
        assert_eq!(periods, vec![2019, 2020, 2021]);
    }

    #[test]
    fn rejects_bad_years_and_unknown_nations() {
        let ctx = context();
        let err = project_nation(&ctx, &params("ALPHA", Some("soon"))).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = project_nation(&ctx, &params("GAMMA", None)).unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Unknown nation 'GAMMA'");
    }

    #[test]
    fn all_nations_keeps_actual_rows_of_short_histories() {
        let ctx = context();
        let response = project_every_nation(
            &ctx,
            &AllProjectionParams {
                years: Some("2022, 2021".to_string()),
            },
        )
        .unwrap();
        assert_eq!(response.years, vec![2021, 2022]);
        assert!(response.nation.is_none());

        let rows: Vec<(&str, i32, SourceTag)> = response
            .series
            .iter()
            .map(|p| (p.entity.as_str(), p.period, p.source))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("ALPHA", 2019, SourceTag::Actual),
                ("ALPHA", 2020, SourceTag::Actual),
                ("BETA", 2020, SourceTag::Actual),
                ("ALPHA", 2021, SourceTag::Predicted),
                ("ALPHA", 2022, SourceTag::Predicted),
            ]
        );
    }
}
