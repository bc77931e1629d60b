use chrono::NaiveDate;
use thiserror::Error;

use crate::forecast::engine::ForecastTable;

// ---------------------------------------------------------------------------
// Chart objects: plain point series, ready for egui_plot
// ---------------------------------------------------------------------------

/// The result was unusable for charting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("nothing to chart: the forecast result is empty")]
    EmptyResult,
}

/// Historical observations plus forecast line and uncertainty band.
#[derive(Debug, Clone, PartialEq)]
pub struct OverallChart {
    pub actual: Vec<[f64; 2]>,
    pub forecast: Vec<[f64; 2]>,
    pub lower: Vec<[f64; 2]>,
    pub upper: Vec<[f64; 2]>,
}

/// Decomposed contributions: trend, weekly, and (when present) yearly.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentsChart {
    pub trend: Vec<[f64; 2]>,
    pub weekly: Vec<[f64; 2]>,
    pub yearly: Option<Vec<[f64; 2]>>,
}

/// Days since the Unix epoch, the x coordinate used by both charts.
pub fn date_to_x(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(date);
    (date - epoch).num_days() as f64
}

/// Build the overall forecast chart from a prediction table.
pub fn overall_chart(result: &ForecastTable) -> Result<OverallChart, RenderError> {
    if result.is_empty() {
        return Err(RenderError::EmptyResult);
    }

    let mut chart = OverallChart {
        actual: Vec::new(),
        forecast: Vec::with_capacity(result.len()),
        lower: Vec::with_capacity(result.len()),
        upper: Vec::with_capacity(result.len()),
    };
    for row in &result.rows {
        let x = date_to_x(row.ds);
        if let Some(y) = row.actual {
            chart.actual.push([x, y]);
        }
        chart.forecast.push([x, row.yhat]);
        chart.lower.push([x, row.yhat_lower]);
        chart.upper.push([x, row.yhat_upper]);
    }
    Ok(chart)
}

/// Build the component decomposition chart from a prediction table.
pub fn components_chart(result: &ForecastTable) -> Result<ComponentsChart, RenderError> {
    if result.is_empty() {
        return Err(RenderError::EmptyResult);
    }

    let trend = result
        .rows
        .iter()
        .map(|row| [date_to_x(row.ds), row.trend])
        .collect();
    let weekly = result
        .rows
        .iter()
        .map(|row| [date_to_x(row.ds), row.weekly])
        .collect();
    let yearly = result
        .rows
        .iter()
        .any(|row| row.yearly.is_some())
        .then(|| {
            result
                .rows
                .iter()
                .map(|row| [date_to_x(row.ds), row.yearly.unwrap_or(0.0)])
                .collect()
        });

    Ok(ComponentsChart {
        trend,
        weekly,
        yearly,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::forecast::engine::ForecastRow;

    fn table(n_hist: usize, n_future: usize) -> ForecastTable {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let rows = (0..n_hist + n_future)
            .map(|i| ForecastRow {
                ds: start + Duration::days(i as i64),
                actual: (i < n_hist).then(|| 100.0 + i as f64),
                yhat: 100.0 + i as f64,
                yhat_lower: 90.0 + i as f64,
                yhat_upper: 110.0 + i as f64,
                trend: 100.0,
                weekly: 1.5,
                yearly: None,
            })
            .collect();
        ForecastTable { rows }
    }

    #[test]
    fn empty_result_is_a_render_error() {
        let empty = ForecastTable::default();
        assert_eq!(overall_chart(&empty).unwrap_err(), RenderError::EmptyResult);
        assert_eq!(
            components_chart(&empty).unwrap_err(),
            RenderError::EmptyResult
        );
    }

    #[test]
    fn series_lengths_follow_the_table() {
        let chart = overall_chart(&table(10, 5)).unwrap();
        assert_eq!(chart.actual.len(), 10);
        assert_eq!(chart.forecast.len(), 15);
        assert_eq!(chart.lower.len(), 15);
        assert_eq!(chart.upper.len(), 15);
    }

    #[test]
    fn x_coordinates_advance_by_one_day() {
        let chart = overall_chart(&table(3, 0)).unwrap();
        let xs: Vec<f64> = chart.forecast.iter().map(|p| p[0]).collect();
        assert_eq!(xs[1] - xs[0], 1.0);
        assert_eq!(xs[2] - xs[1], 1.0);
    }

    #[test]
    fn yearly_series_appears_only_when_present() {
        let without = components_chart(&table(5, 2)).unwrap();
        assert!(without.yearly.is_none());

        let mut with_yearly = table(5, 2);
        for row in &mut with_yearly.rows {
            row.yearly = Some(0.25);
        }
        let chart = components_chart(&with_yearly).unwrap();
        assert_eq!(chart.yearly.map(|s| s.len()), Some(7));
    }
}
