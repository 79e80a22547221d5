use crate::config::Config;
use crate::providers::google::fitness_v1_types::{DataPoint, DataSource};
use crate::providers::Provider;
use crate::window::{format_millis, nanos_to_millis, DatasetId, TimeWindow};
use chrono::{DateTime, Utc};
use std::io::Write;

/// Shown in place of a reading when a point carries no floating point value.
pub const MISSING_VALUE: f64 = 0.0;

/// Keeps the sources whose declared data type is exactly `data_type`, in their original order.
pub fn filter_by_data_type(sources: Vec<DataSource>, data_type: &str) -> Vec<DataSource> {
    sources
        .into_iter()
        .filter(|source| source.data_type_name() == Some(data_type))
        .collect()
}

/// The first floating point reading of a point. Extra values are ignored.
pub fn display_value(point: &DataPoint) -> f64 {
    point
        .value
        .as_ref()
        .and_then(|values| values.first())
        .and_then(|value| value.fp_val)
        .unwrap_or(MISSING_VALUE)
}

pub fn format_point(point: &DataPoint) -> String {
    let millis = nanos_to_millis(point.start_time_nanos.unwrap_or(0));
    format!("{}=>{:?}", format_millis(millis), display_value(point))
}

fn marker(tag: &str, data_source_id: &str, dataset_id: &DatasetId) -> String {
    format!(
        "<{}:\t data-source-id[{}], dataset-id[{}]>",
        tag, data_source_id, dataset_id
    )
}

/// Writes one source's points between its begin and end markers.
pub fn write_dataset<W: Write>(
    out: &mut W,
    data_source_id: &str,
    dataset_id: &DatasetId,
    points: &[DataPoint],
) -> std::io::Result<()> {
    writeln!(out, "{}", marker("BOD", data_source_id, dataset_id))?;
    for point in points {
        writeln!(out, "{}", format_point(point))?;
    }
    writeln!(out, "{}", marker("EOD", data_source_id, dataset_id))?;
    out.flush()
}

/// Fetches and prints the points of one source over `window`.
pub async fn show_data<W: Write>(
    provider: &dyn Provider,
    out: &mut W,
    data_source_id: &str,
    window: TimeWindow,
) -> anyhow::Result<usize> {
    let dataset_id = window.dataset_id();
    let points = provider.dataset_points(data_source_id, &dataset_id).await?;
    log::debug!(
        "{} points from {} in {}",
        points.len(),
        data_source_id,
        dataset_id
    );
    write_dataset(out, data_source_id, &dataset_id, &points)?;
    Ok(points.len())
}

/// Lists the user's sources, keeps the configured data type, and prints the lookback window
/// of each match. `clock` is read once per matching source. Returns the number of sources shown.
pub async fn run<W, C>(
    config: &Config,
    provider: &dyn Provider,
    out: &mut W,
    clock: C,
) -> anyhow::Result<usize>
where
    W: Write,
    C: Fn() -> DateTime<Utc>,
{
    let sources = provider.list_data_sources().await?;
    let matching = filter_by_data_type(sources, &config.data_type);
    if matching.is_empty() {
        log::info!("no data source of type {} registered", config.data_type);
    }

    for source in &matching {
        let window = TimeWindow::ending_at(clock(), config.lookback);
        show_data(provider, out, source.data_stream_id(), window).await?;
    }
    Ok(matching.len())
}
