//! Request and response shapes of the Google Fitness REST API (v1) used by this tool.
//! Unknown fields are ignored; every field the API may omit is optional.

use serde::Deserialize;

/// OAuth scopes of the Fitness API. Only the read scopes are listed; the tool never writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitnessScopes {
    FitnessActivityRead,
    FitnessBloodGlucoseRead,
    FitnessBloodPressureRead,
    FitnessBodyRead,
    FitnessBodyTemperatureRead,
    FitnessHeartRateRead,
    FitnessLocationRead,
    FitnessNutritionRead,
    FitnessOxygenSaturationRead,
    FitnessReproductiveHealthRead,
    FitnessSleepRead,
}

impl FitnessScopes {
    pub fn all_read() -> Vec<FitnessScopes> {
        vec![
            FitnessScopes::FitnessActivityRead,
            FitnessScopes::FitnessBloodGlucoseRead,
            FitnessScopes::FitnessBloodPressureRead,
            FitnessScopes::FitnessBodyRead,
            FitnessScopes::FitnessBodyTemperatureRead,
            FitnessScopes::FitnessHeartRateRead,
            FitnessScopes::FitnessLocationRead,
            FitnessScopes::FitnessNutritionRead,
            FitnessScopes::FitnessOxygenSaturationRead,
            FitnessScopes::FitnessReproductiveHealthRead,
            FitnessScopes::FitnessSleepRead,
        ]
    }
}

impl AsRef<str> for FitnessScopes {
    fn as_ref(&self) -> &str {
        match self {
            FitnessScopes::FitnessActivityRead => {
                "https://www.googleapis.com/auth/fitness.activity.read"
            }
            FitnessScopes::FitnessBloodGlucoseRead => {
                "https://www.googleapis.com/auth/fitness.blood_glucose.read"
            }
            FitnessScopes::FitnessBloodPressureRead => {
                "https://www.googleapis.com/auth/fitness.blood_pressure.read"
            }
            FitnessScopes::FitnessBodyRead => "https://www.googleapis.com/auth/fitness.body.read",
            FitnessScopes::FitnessBodyTemperatureRead => {
                "https://www.googleapis.com/auth/fitness.body_temperature.read"
            }
            FitnessScopes::FitnessHeartRateRead => {
                "https://www.googleapis.com/auth/fitness.heart_rate.read"
            }
            FitnessScopes::FitnessLocationRead => {
                "https://www.googleapis.com/auth/fitness.location.read"
            }
            FitnessScopes::FitnessNutritionRead => {
                "https://www.googleapis.com/auth/fitness.nutrition.read"
            }
            FitnessScopes::FitnessOxygenSaturationRead => {
                "https://www.googleapis.com/auth/fitness.oxygen_saturation.read"
            }
            FitnessScopes::FitnessReproductiveHealthRead => {
                "https://www.googleapis.com/auth/fitness.reproductive_health.read"
            }
            FitnessScopes::FitnessSleepRead => "https://www.googleapis.com/auth/fitness.sleep.read",
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DataTypeField {
    pub name: Option<String>,
    pub format: Option<String>,
    pub optional: Option<bool>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct DataType {
    pub name: Option<String>,
    pub field: Option<Vec<DataTypeField>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Device {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    #[serde(rename = "type")]
    pub typ: Option<String>,
    pub uid: Option<String>,
    pub version: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub name: Option<String>,
    pub package_name: Option<String>,
    pub version: Option<String>,
    pub details_url: Option<String>,
}

/// A registered producer of one data type.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub data_stream_id: Option<String>,
    pub data_stream_name: Option<String>,
    pub data_type: Option<DataType>,
    #[serde(rename = "type")]
    pub typ: Option<String>,
    pub device: Option<Device>,
    pub application: Option<Application>,
}

impl DataSource {
    pub fn data_type_name(&self) -> Option<&str> {
        self.data_type.as_ref()?.name.as_deref()
    }

    pub fn data_stream_id(&self) -> &str {
        self.data_stream_id.as_deref().unwrap_or("")
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListDataSourcesResponse {
    pub data_source: Option<Vec<DataSource>>,
}

/// One reading attached to a data point. Which field is set depends on the data type.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    pub fp_val: Option<f64>,
    pub int_val: Option<i32>,
    pub string_val: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    #[serde(default, deserialize_with = "int64_str::deserialize")]
    pub start_time_nanos: Option<i64>,
    #[serde(default, deserialize_with = "int64_str::deserialize")]
    pub end_time_nanos: Option<i64>,
    pub data_type_name: Option<String>,
    pub origin_data_source_id: Option<String>,
    pub value: Option<Vec<Value>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default, deserialize_with = "int64_str::deserialize")]
    pub min_start_time_ns: Option<i64>,
    #[serde(default, deserialize_with = "int64_str::deserialize")]
    pub max_end_time_ns: Option<i64>,
    pub point: Option<Vec<DataPoint>>,
    pub next_page_token: Option<String>,
}

/// The API encodes int64 as JSON strings; plain numbers are accepted as well.
mod int64_str {
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        match Option::<Raw>::deserialize(d)? {
            None => Ok(None),
            Some(Raw::Number(n)) => Ok(Some(n)),
            Some(Raw::Text(s)) => s.parse().map(Some).map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_data_source_listing() {
        let body = r#"{
            "dataSource": [{
                "dataStreamId": "derived:com.google.heart_rate.bpm:com.google.android.gms:merge_heart_rate_bpm",
                "dataStreamName": "merge_heart_rate_bpm",
                "type": "derived",
                "dataType": {
                    "name": "com.google.heart_rate.bpm",
                    "field": [{"name": "bpm", "format": "floatPoint"}]
                },
                "application": {"packageName": "com.google.android.gms"},
                "dataQualityStandard": []
            }]
        }"#;
        let resp: ListDataSourcesResponse = serde_json::from_str(body).unwrap();
        let sources = resp.data_source.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].data_type_name(), Some("com.google.heart_rate.bpm"));
        assert_eq!(sources[0].typ.as_deref(), Some("derived"));
        assert_eq!(
            sources[0].data_stream_id(),
            "derived:com.google.heart_rate.bpm:com.google.android.gms:merge_heart_rate_bpm"
        );
    }

    #[test]
    fn empty_listing_has_no_sources() {
        let resp: ListDataSourcesResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.data_source.is_none());
    }

    #[test]
    fn int64_fields_accept_strings_and_numbers() {
        let body = r#"{
            "minStartTimeNs": "1000000000000000000",
            "maxEndTimeNs": 1000086400000000000,
            "point": [
                {"startTimeNanos": "1000000100000000000", "endTimeNanos": "1000000100000000000",
                 "value": [{"fpVal": 61.0, "mapVal": []}]},
                {"startTimeNanos": "1000000200000000000", "value": []}
            ]
        }"#;
        let dataset: Dataset = serde_json::from_str(body).unwrap();
        assert_eq!(dataset.min_start_time_ns, Some(1_000_000_000_000_000_000));
        assert_eq!(dataset.max_end_time_ns, Some(1_000_086_400_000_000_000));
        let points = dataset.point.unwrap();
        assert_eq!(points[0].start_time_nanos, Some(1_000_000_100_000_000_000));
        assert_eq!(points[0].value.as_ref().unwrap()[0].fp_val, Some(61.0));
        assert_eq!(points[1].end_time_nanos, None);
        assert!(dataset.next_page_token.is_none());
    }

    #[test]
    fn malformed_int64_is_rejected() {
        let body = r#"{"startTimeNanos": "soon"}"#;
        assert!(serde_json::from_str::<DataPoint>(body).is_err());
    }

    #[test]
    fn scopes_are_read_only() {
        let scopes = FitnessScopes::all_read();
        assert!(scopes.iter().all(|s| s.as_ref().ends_with(".read")));
        assert!(scopes.contains(&FitnessScopes::FitnessHeartRateRead));
    }
}
