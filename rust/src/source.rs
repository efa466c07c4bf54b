//! The external backend seen from the engine: configs, entries and generation.
//!
//! The engine never performs I/O itself. Callers fetch through a
//! [`ScheduleSource`], then hand the results to the pure resolver, column
//! builder and projector. The authenticated actor is always passed in
//! explicitly.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::columns::build_columns;
use crate::config::{EditorDefaults, GridOptions};
use crate::editor::ConfigError;
use crate::grid::{project, Grid};
use crate::models::{ScheduleConfig, TimetableEntry};
use crate::wire::{GenerateRequest, GenerationOutcome, WireError};

/// Errors reported by a schedule source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Schedule config not found: {0}")]
    ConfigNotFound(String),
    #[error("Timetable not found: {0}")]
    TimetableNotFound(String),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Wire(#[from] WireError),
}

/// The authenticated caller, passed to every backend call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActorContext {
    pub token: String,
    pub user_id: String,
}

impl ActorContext {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
        }
    }
}

/// Access to the backend that stores configs and generates timetables.
pub trait ScheduleSource {
    fn list_configs(&self, actor: &ActorContext) -> Result<Vec<ScheduleConfig>, SourceError>;

    /// The config that applies to a semester: its own, else the global default.
    fn config_for_semester(
        &self,
        actor: &ActorContext,
        semester_id: &str,
    ) -> Result<Option<ScheduleConfig>, SourceError> {
        let configs = self.list_configs(actor)?;
        Ok(select_config(&configs, Some(semester_id)).cloned())
    }

    /// Create (no id) or update (with id). Returns the stored config.
    fn save_config(
        &mut self,
        actor: &ActorContext,
        config: ScheduleConfig,
    ) -> Result<ScheduleConfig, SourceError>;

    fn delete_config(&mut self, actor: &ActorContext, id: &str) -> Result<(), SourceError>;

    fn timetable_entries(
        &self,
        actor: &ActorContext,
        timetable_id: &str,
    ) -> Result<Vec<TimetableEntry>, SourceError>;

    /// Entries of the actor's personal schedule.
    fn my_entries(&self, actor: &ActorContext) -> Result<Vec<TimetableEntry>, SourceError>;

    fn generate(
        &mut self,
        actor: &ActorContext,
        request: &GenerateRequest,
    ) -> Result<GenerationOutcome, SourceError>;
}

/// Pick the applicable config: semester-specific first, then the global default.
///
/// With several candidates at the same level the first in list order wins.
pub fn select_config<'a>(
    configs: &'a [ScheduleConfig],
    semester_id: Option<&str>,
) -> Option<&'a ScheduleConfig> {
    semester_id
        .and_then(|sem| {
            configs
                .iter()
                .find(|c| c.semester_id.as_deref() == Some(sem))
        })
        .or_else(|| configs.iter().find(|c| c.is_global()))
}

/// Config used when the backend has none: the editor defaults, unsaved.
pub fn fallback_config(defaults: &EditorDefaults) -> ScheduleConfig {
    ScheduleConfig::new(
        defaults.name.clone(),
        defaults.start_time,
        defaults.period_duration_minutes,
        defaults.periods_per_day,
    )
    .with_working_days(defaults.working_days.iter().copied())
}

/// Fetch a timetable and its applicable config, then project it.
pub fn load_timetable_grid<S: ScheduleSource + ?Sized>(
    source: &S,
    actor: &ActorContext,
    semester_id: Option<&str>,
    timetable_id: &str,
    options: &GridOptions,
) -> Result<Grid, SourceError> {
    let configs = source.list_configs(actor)?;
    let config = select_config(&configs, semester_id)
        .cloned()
        .unwrap_or_else(|| fallback_config(&EditorDefaults::default()));
    let entries = source.timetable_entries(actor, timetable_id)?;
    Ok(project(
        &build_columns(&config),
        config.working_days(),
        &entries,
        options,
    ))
}

/// Ask for generation only when the applicable config is complete.
///
/// A config with no working days (or no periods) is reported as a failure
/// without calling the backend.
pub fn request_generation<S: ScheduleSource + ?Sized>(
    source: &mut S,
    actor: &ActorContext,
    request: &GenerateRequest,
) -> Result<GenerationOutcome, SourceError> {
    match source.config_for_semester(actor, &request.semester_id)? {
        Some(config) if !config.is_generation_ready() => Ok(GenerationOutcome::Failed {
            reason: format!(
                "Schedule config {:?} is incomplete: needs working days and at least one period",
                config.name
            ),
        }),
        _ => source.generate(actor, request),
    }
}

/// Deterministic in-memory source for tests and local tooling.
#[derive(Clone, Debug, Default)]
pub struct InMemorySource {
    tokens: FxHashMap<String, String>,
    configs: Vec<ScheduleConfig>,
    timetables: FxHashMap<String, Vec<TimetableEntry>>,
    personal: FxHashMap<String, Vec<TimetableEntry>>,
    generation_failure: Option<String>,
    generated: Vec<GenerateRequest>,
    next_id: u32,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `actor.token` as a valid credential for `actor.user_id`.
    pub fn authorize(&mut self, actor: &ActorContext) {
        self.tokens.insert(actor.token.clone(), actor.user_id.clone());
    }

    pub fn insert_timetable(&mut self, timetable_id: impl Into<String>, entries: Vec<TimetableEntry>) {
        self.timetables.insert(timetable_id.into(), entries);
    }

    pub fn insert_personal(&mut self, user_id: impl Into<String>, entries: Vec<TimetableEntry>) {
        self.personal.insert(user_id.into(), entries);
    }

    /// Make subsequent generation requests fail with `reason`.
    pub fn fail_generation(&mut self, reason: impl Into<String>) {
        self.generation_failure = Some(reason.into());
    }

    /// Generation requests received so far.
    pub fn generated(&self) -> &[GenerateRequest] {
        &self.generated
    }

    fn check(&self, actor: &ActorContext) -> Result<(), SourceError> {
        match self.tokens.get(&actor.token) {
            Some(user) if *user == actor.user_id => Ok(()),
            _ => Err(SourceError::Unauthenticated),
        }
    }
}

impl ScheduleSource for InMemorySource {
    fn list_configs(&self, actor: &ActorContext) -> Result<Vec<ScheduleConfig>, SourceError> {
        self.check(actor)?;
        Ok(self.configs.clone())
    }

    fn save_config(
        &mut self,
        actor: &ActorContext,
        mut config: ScheduleConfig,
    ) -> Result<ScheduleConfig, SourceError> {
        self.check(actor)?;
        match config.id.clone() {
            Some(id) => {
                let existing = self
                    .configs
                    .iter_mut()
                    .find(|c| c.id.as_deref() == Some(id.as_str()))
                    .ok_or(SourceError::ConfigNotFound(id))?;
                *existing = config.clone();
            }
            None => {
                self.next_id += 1;
                config.id = Some(format!("cfg-{}", self.next_id));
                self.configs.push(config.clone());
            }
        }
        Ok(config)
    }

    fn delete_config(&mut self, actor: &ActorContext, id: &str) -> Result<(), SourceError> {
        self.check(actor)?;
        let idx = self
            .configs
            .iter()
            .position(|c| c.id.as_deref() == Some(id))
            .ok_or_else(|| SourceError::ConfigNotFound(id.to_string()))?;
        self.configs.remove(idx);
        Ok(())
    }

    fn timetable_entries(
        &self,
        actor: &ActorContext,
        timetable_id: &str,
    ) -> Result<Vec<TimetableEntry>, SourceError> {
        self.check(actor)?;
        self.timetables
            .get(timetable_id)
            .cloned()
            .ok_or_else(|| SourceError::TimetableNotFound(timetable_id.to_string()))
    }

    fn my_entries(&self, actor: &ActorContext) -> Result<Vec<TimetableEntry>, SourceError> {
        self.check(actor)?;
        Ok(self.personal.get(&actor.user_id).cloned().unwrap_or_default())
    }

    fn generate(
        &mut self,
        actor: &ActorContext,
        request: &GenerateRequest,
    ) -> Result<GenerationOutcome, SourceError> {
        self.check(actor)?;
        self.generated.push(request.clone());
        Ok(match &self.generation_failure {
            Some(reason) => GenerationOutcome::Failed {
                reason: reason.clone(),
            },
            None => GenerationOutcome::Started {
                message: "Generation started in background".to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;
    use crate::models::{BreakSlot, Day};
    use crate::time::ClockTime;

    fn actor() -> ActorContext {
        ActorContext::new("token-abc", "admin")
    }

    fn source() -> InMemorySource {
        let mut source = InMemorySource::new();
        source.authorize(&actor());
        source
    }

    fn config(name: &str, semester: Option<&str>) -> ScheduleConfig {
        let config = ScheduleConfig::new(name, ClockTime::from_minutes(9 * 60), 60, 4)
            .with_working_days(vec![Day::Monday, Day::Tuesday]);
        match semester {
            Some(sem) => config.with_semester(sem),
            None => config,
        }
    }

    fn request(semester: &str) -> GenerateRequest {
        GenerateRequest {
            program_id: "prog".to_string(),
            batch_id: "batch".to_string(),
            semester_id: semester.to_string(),
            section_ids: None,
        }
    }

    #[test]
    fn test_select_config_prefers_semester() {
        let configs = vec![config("Global", None), config("Sem 3", Some("sem-3"))];

        assert_eq!(select_config(&configs, Some("sem-3")).unwrap().name, "Sem 3");
        assert_eq!(select_config(&configs, Some("sem-9")).unwrap().name, "Global");
        assert_eq!(select_config(&configs, None).unwrap().name, "Global");
        assert!(select_config(&configs[1..], Some("sem-9")).is_none());
    }

    #[test]
    fn test_save_assigns_id_then_updates() {
        let mut source = source();
        let saved = source.save_config(&actor(), config("Global", None)).unwrap();
        assert_eq!(saved.id.as_deref(), Some("cfg-1"));

        let mut edited = saved.clone();
        edited.periods_per_day = 6;
        source.save_config(&actor(), edited).unwrap();

        let configs = source.list_configs(&actor()).unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].periods_per_day, 6);
    }

    #[test]
    fn test_update_and_delete_unknown_id() {
        let mut source = source();
        let ghost = config("Ghost", None).with_id("cfg-99");
        assert!(matches!(
            source.save_config(&actor(), ghost),
            Err(SourceError::ConfigNotFound(id)) if id == "cfg-99"
        ));
        assert!(matches!(
            source.delete_config(&actor(), "cfg-99"),
            Err(SourceError::ConfigNotFound(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_actor() {
        let source = source();
        let stranger = ActorContext::new("forged", "admin");
        assert!(matches!(
            source.list_configs(&stranger),
            Err(SourceError::Unauthenticated)
        ));
    }

    #[test]
    fn test_config_for_semester_falls_back_to_global() {
        let mut source = source();
        source.save_config(&actor(), config("Global", None)).unwrap();
        let found = source.config_for_semester(&actor(), "sem-1").unwrap();
        assert_eq!(found.unwrap().name, "Global");
    }

    #[test]
    fn test_load_timetable_grid_uses_semester_config() {
        let mut source = source();
        source.save_config(&actor(), config("Global", None)).unwrap();
        source
            .save_config(
                &actor(),
                config("Sem 1", Some("sem-1"))
                    .with_breaks(vec![BreakSlot::new(1, 15, "Tea")]),
            )
            .unwrap();
        source.insert_timetable(
            "tt-1",
            vec![
                TimetableEntry::new("Monday", 2).with_names(Some("Math"), None, None),
                TimetableEntry::new("Monday", 9),
            ],
        );

        let grid =
            load_timetable_grid(&source, &actor(), Some("sem-1"), "tt-1", &GridOptions::default())
                .unwrap();

        assert_eq!(grid.plan().len(), 5);
        assert_eq!(grid.dropped().len(), 1);
        assert!(matches!(grid.cell(Day::Monday, 2), Some(Cell::Occupied(_))));
    }

    #[test]
    fn test_load_grid_without_configs_uses_defaults() {
        let mut source = source();
        source.insert_timetable("tt-1", vec![]);

        let grid =
            load_timetable_grid(&source, &actor(), None, "tt-1", &GridOptions::default()).unwrap();

        assert_eq!(grid.plan().period_count(), 8);
        assert_eq!(grid.rows().len(), 5);
    }

    #[test]
    fn test_load_grid_unknown_timetable() {
        let source = source();
        assert!(matches!(
            load_timetable_grid(&source, &actor(), None, "nope", &GridOptions::default()),
            Err(SourceError::TimetableNotFound(_))
        ));
    }

    #[test]
    fn test_generation_blocked_for_incomplete_config() {
        let mut source = source();
        let mut incomplete = config("Sem 2", Some("sem-2"));
        incomplete.set_working_days(vec![]);
        source.save_config(&actor(), incomplete).unwrap();

        let outcome = request_generation(&mut source, &actor(), &request("sem-2")).unwrap();

        assert!(matches!(outcome, GenerationOutcome::Failed { .. }));
        assert!(source.generated().is_empty());
    }

    #[test]
    fn test_generation_forwarded_and_failure_surfaced() {
        let mut source = source();
        source.save_config(&actor(), config("Global", None)).unwrap();

        let outcome = request_generation(&mut source, &actor(), &request("sem-1")).unwrap();
        assert!(matches!(outcome, GenerationOutcome::Started { .. }));

        source.fail_generation("No feasible timetable");
        let outcome = request_generation(&mut source, &actor(), &request("sem-1")).unwrap();
        assert_eq!(
            outcome,
            GenerationOutcome::Failed {
                reason: "No feasible timetable".to_string()
            }
        );
        assert_eq!(source.generated().len(), 2);
    }

    #[test]
    fn test_my_entries_are_per_actor() {
        let mut source = source();
        source.insert_personal("admin", vec![TimetableEntry::new("Friday", 1)]);
        assert_eq!(source.my_entries(&actor()).unwrap().len(), 1);

        let other = ActorContext::new("token-xyz", "faculty-7");
        source.authorize(&other);
        assert!(source.my_entries(&other).unwrap().is_empty());
    }
}
