//! Typed records for the backend's JSON payloads.
//!
//! Configs arrive as loosely-typed JSON. They are decoded into records with
//! every field spelled out, then converted into [`ScheduleConfig`] with the
//! structural checks applied once, here at the boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::editor::ConfigError;
use crate::log_summary;
use crate::models::{BreakSlot, Day, ScheduleConfig, TimetableEntry};
use crate::time::ClockTime;

/// Errors decoding backend payloads.
#[derive(Error, Debug)]
pub enum WireError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakRecord {
    pub after_period: u32,
    pub duration_minutes: u32,
    #[serde(default)]
    pub name: String,
}

/// A schedule config as exchanged with the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfigRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester_id: Option<String>,
    /// Read-only label supplied by the backend.
    #[serde(default, skip_serializing)]
    pub semester_name: Option<String>,
    pub name: String,
    pub start_time: String,
    pub period_duration_minutes: u32,
    pub periods_per_day: u32,
    #[serde(default)]
    pub breaks: Option<Vec<BreakRecord>>,
    #[serde(default)]
    pub working_days: Option<Vec<String>>,
}

impl ScheduleConfigRecord {
    /// Convert into a config, logging collapsed duplicate breaks at `verbosity` >= 1.
    pub fn into_config(self, verbosity: u8) -> Result<ScheduleConfig, ConfigError> {
        let start_time = ClockTime::parse_24h(&self.start_time)?;
        if self.period_duration_minutes == 0 {
            return Err(ConfigError::NotPositive {
                field: "period_duration_minutes",
            });
        }

        let mut breaks = Vec::new();
        for record in self.breaks.unwrap_or_default() {
            if record.duration_minutes == 0 {
                return Err(ConfigError::NotPositive {
                    field: "break duration_minutes",
                });
            }
            breaks.push(BreakSlot::new(
                record.after_period,
                record.duration_minutes,
                record.name,
            ));
        }

        let mut days = Vec::new();
        for raw in self.working_days.unwrap_or_default() {
            days.push(Day::parse(&raw).ok_or(ConfigError::UnknownDay(raw))?);
        }

        let mut config = ScheduleConfig::new(
            self.name,
            start_time,
            self.period_duration_minutes,
            self.periods_per_day,
        )
        .with_working_days(days);
        let collapsed = config.set_breaks(breaks);
        if collapsed > 0 {
            log_summary!(
                verbosity,
                "Config {:?}: {} break(s) shared an anchor; kept the last of each",
                config.name,
                collapsed
            );
        }
        config.id = self.id;
        config.semester_id = self.semester_id;
        Ok(config)
    }
}

impl TryFrom<ScheduleConfigRecord> for ScheduleConfig {
    type Error = ConfigError;

    fn try_from(record: ScheduleConfigRecord) -> Result<Self, Self::Error> {
        record.into_config(0)
    }
}

impl From<&ScheduleConfig> for ScheduleConfigRecord {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            id: config.id.clone(),
            semester_id: config.semester_id.clone(),
            semester_name: None,
            name: config.name.clone(),
            start_time: config.start_time.format_24h(),
            period_duration_minutes: config.period_duration_minutes,
            periods_per_day: config.periods_per_day,
            breaks: Some(
                config
                    .breaks()
                    .iter()
                    .map(|b| BreakRecord {
                        after_period: b.after_period,
                        duration_minutes: b.duration_minutes,
                        name: b.name.clone(),
                    })
                    .collect(),
            ),
            working_days: Some(
                config
                    .working_days()
                    .iter()
                    .map(|d| d.name().to_string())
                    .collect(),
            ),
        }
    }
}

/// Decode one schedule config object.
pub fn decode_schedule_config(json: &str, verbosity: u8) -> Result<ScheduleConfig, WireError> {
    let record: ScheduleConfigRecord = serde_json::from_str(json)?;
    Ok(record.into_config(verbosity)?)
}

/// Decode a list of schedule configs. One bad record fails the whole list.
pub fn decode_schedule_configs(json: &str, verbosity: u8) -> Result<Vec<ScheduleConfig>, WireError> {
    let records: Vec<ScheduleConfigRecord> = serde_json::from_str(json)?;
    records
        .into_iter()
        .map(|r| r.into_config(verbosity).map_err(WireError::from))
        .collect()
}

/// Serialize a config as a create/update payload.
pub fn encode_schedule_config(config: &ScheduleConfig) -> serde_json::Result<String> {
    serde_json::to_string(&ScheduleConfigRecord::from(config))
}

/// Decode a finished entry list.
pub fn decode_entries(json: &str) -> Result<Vec<TimetableEntry>, WireError> {
    Ok(serde_json::from_str(json)?)
}

/// Parameters for a generation request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub program_id: String,
    pub batch_id: String,
    pub semester_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_ids: Option<Vec<String>>,
}

/// Result of asking the backend to generate a timetable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationOutcome {
    Started { message: String },
    Failed { reason: String },
}

const GENERATION_FAILED: &str = "generation failed";

#[derive(Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl GenerationOutcome {
    /// Interpret a generation response body. Error bodies carry `detail`,
    /// which may be a string or a structured object.
    ///
    /// A failure body that is not JSON (a proxy error page) becomes the
    /// failure reason as-is. Only a malformed success body is an error.
    pub fn from_response(success: bool, body: &str) -> Result<Self, WireError> {
        if success {
            let response: GenerationResponse = serde_json::from_str(body)?;
            return Ok(GenerationOutcome::Started {
                message: response.message.unwrap_or_default(),
            });
        }
        let reason = match serde_json::from_str::<GenerationResponse>(body) {
            Ok(GenerationResponse {
                detail: Some(serde_json::Value::String(s)),
                ..
            }) => s,
            Ok(GenerationResponse {
                detail: Some(other),
                ..
            }) => other.to_string(),
            Ok(GenerationResponse {
                message: Some(message),
                ..
            }) => message,
            Ok(_) => GENERATION_FAILED.to_string(),
            Err(_) if body.trim().is_empty() => GENERATION_FAILED.to_string(),
            Err(_) => body.trim().to_string(),
        };
        Ok(GenerationOutcome::Failed { reason })
    }
}
