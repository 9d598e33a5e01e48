//! Weekly schedule data and copy-on-write mutations
//!
//! A [`ScheduleData`] is an index-addressable list of days, each holding a
//! list of events. Days and events are reference counted: every mutation
//! returns a new `ScheduleData` in which only the touched day (and within it
//! only the touched event) is a new allocation. Callers can therefore detect
//! changes with [`Arc::ptr_eq`] instead of deep comparison.
//!
//! Ordering rules:
//!
//! - [`ScheduleData::add`] re-sorts the day by the `time` string, compared
//!   lexically (`"12:00 PM"` sorts before `"7:00 AM"`)
//! - [`ScheduleData::edit`] keeps the current position even if `time` changed

use crate::error::{Result, StudymateError};
use crate::i18n::Translator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One entry in a day's plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEvent {
    /// Unique identifier
    #[serde(default)]
    pub id: String,
    /// Free-form time text, e.g. `9:00 AM - 10:30 AM`
    pub time: String,
    /// Short title
    pub title: String,
    /// Longer description
    #[serde(default)]
    pub description: String,
}

/// Fields of an event that does not have an id yet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub time: String,
    pub title: String,
    pub description: String,
}

impl EventDraft {
    /// Create a draft
    pub fn new(
        time: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            time: time.into(),
            title: title.into(),
            description: description.into(),
        }
    }

    /// Check that time and title are present
    ///
    /// # Errors
    ///
    /// Returns `StudymateError::Validation` with the translated alert when
    /// the time or title is blank
    pub fn validate(&self, translator: &Translator) -> Result<()> {
        if self.time.trim().is_empty() || self.title.trim().is_empty() {
            return Err(
                StudymateError::Validation(translator.t("addModal.validationAlert").to_string())
                    .into(),
            );
        }
        Ok(())
    }

    fn into_event(self, id: String) -> ScheduleEvent {
        ScheduleEvent {
            id,
            time: self.time,
            title: self.title,
            description: self.description,
        }
    }
}

/// A labelled day and its events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDay {
    /// Day label, e.g. `Monday`
    pub day: String,
    /// Events in display order
    #[serde(default)]
    pub events: Vec<Arc<ScheduleEvent>>,
}

impl ScheduleDay {
    /// Create a day from owned events
    pub fn new(day: impl Into<String>, events: Vec<ScheduleEvent>) -> Self {
        Self {
            day: day.into(),
            events: events.into_iter().map(Arc::new).collect(),
        }
    }

    /// Find an event by id
    pub fn event(&self, id: &str) -> Option<&Arc<ScheduleEvent>> {
        self.events.iter().find(|e| e.id == id)
    }
}

/// Generate an id for a locally created event
pub fn generate_event_id() -> String {
    format!("event-{}", uuid::Uuid::new_v4().simple())
}

/// Ordered list of days
///
/// Serializes as a bare JSON array of days, the same shape the model is
/// asked to produce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleData {
    days: Vec<Arc<ScheduleDay>>,
}

impl ScheduleData {
    /// Build from owned days
    pub fn new(days: Vec<ScheduleDay>) -> Self {
        Self {
            days: days.into_iter().map(Arc::new).collect(),
        }
    }

    /// Days in order
    pub fn days(&self) -> &[Arc<ScheduleDay>] {
        &self.days
    }

    /// Day at `index`
    pub fn day(&self, index: usize) -> Option<&Arc<ScheduleDay>> {
        self.days.get(index)
    }

    /// Number of days
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether there are no days
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Total number of events across all days
    pub fn event_count(&self) -> usize {
        self.days.iter().map(|d| d.events.len()).sum()
    }

    /// Locate an event by id across all days
    pub fn find_event(&self, id: &str) -> Option<(usize, &Arc<ScheduleEvent>)> {
        self.days
            .iter()
            .enumerate()
            .find_map(|(idx, day)| day.event(id).map(|event| (idx, event)))
    }

    /// Give every event with a blank id a generated one
    ///
    /// Returns the number of ids that were filled in.
    pub fn fill_missing_ids(&mut self) -> usize {
        let mut filled = 0;
        for day in &mut self.days {
            if day.events.iter().all(|e| !e.id.trim().is_empty()) {
                continue;
            }
            let day = Arc::make_mut(day);
            for event in &mut day.events {
                if event.id.trim().is_empty() {
                    Arc::make_mut(event).id = generate_event_id();
                    filled += 1;
                }
            }
        }
        filled
    }

    /// Add an event to a day and re-sort that day by time
    ///
    /// The new event gets a fresh id. Sorting is stable, so events with
    /// equal `time` keep their relative order and the new one goes last.
    ///
    /// # Errors
    ///
    /// Returns `StudymateError::Schedule` if `day_index` is out of range
    ///
    /// # Examples
    ///
    /// ```
    /// use studymate::schedule::{EventDraft, ScheduleData, ScheduleDay};
    ///
    /// let data = ScheduleData::new(vec![ScheduleDay::new("Monday", vec![])]);
    /// let updated = data.add(0, EventDraft::new("09:00", "Math", "")).unwrap();
    /// assert_eq!(updated.day(0).unwrap().events.len(), 1);
    /// assert!(updated.day(0).unwrap().events[0].id.starts_with("event-"));
    /// assert!(data.day(0).unwrap().events.is_empty());
    /// ```
    pub fn add(&self, day_index: usize, draft: EventDraft) -> Result<Self> {
        let day = self.require_day(day_index)?;
        let event = Arc::new(draft.into_event(generate_event_id()));
        tracing::debug!("Adding event {} to day {}", event.id, day_index);

        let mut events = day.events.clone();
        events.push(event);
        events.sort_by(|a, b| a.time.cmp(&b.time));

        Ok(self.with_day(
            day_index,
            ScheduleDay {
                day: day.day.clone(),
                events,
            },
        ))
    }

    /// Replace the event whose id matches `updated.id`
    ///
    /// All four fields are replaced and the event keeps its position. Should
    /// a reply ever carry duplicate ids, every event with that id is replaced.
    ///
    /// # Errors
    ///
    /// Returns `StudymateError::Schedule` if `day_index` is out of range or
    /// the day has no event with that id
    pub fn edit(&self, day_index: usize, updated: ScheduleEvent) -> Result<Self> {
        let day = self.require_day(day_index)?;
        if day.event(&updated.id).is_none() {
            return Err(StudymateError::Schedule(format!(
                "No event with id '{}' on day {}",
                updated.id, day_index
            ))
            .into());
        }
        tracing::debug!("Editing event {} on day {}", updated.id, day_index);

        let updated = Arc::new(updated);
        let events = day
            .events
            .iter()
            .map(|e| {
                if e.id == updated.id {
                    Arc::clone(&updated)
                } else {
                    Arc::clone(e)
                }
            })
            .collect();

        Ok(self.with_day(
            day_index,
            ScheduleDay {
                day: day.day.clone(),
                events,
            },
        ))
    }

    /// Remove the event with `event_id` from a day
    ///
    /// Removing an id that is not present returns an unchanged copy.
    ///
    /// # Errors
    ///
    /// Returns `StudymateError::Schedule` if `day_index` is out of range
    pub fn delete(&self, day_index: usize, event_id: &str) -> Result<Self> {
        let day = self.require_day(day_index)?;
        if day.event(event_id).is_none() {
            tracing::debug!("Event {} not found on day {}, nothing to delete", event_id, day_index);
            return Ok(self.clone());
        }

        let events = day
            .events
            .iter()
            .filter(|e| e.id != event_id)
            .cloned()
            .collect();

        Ok(self.with_day(
            day_index,
            ScheduleDay {
                day: day.day.clone(),
                events,
            },
        ))
    }

    fn require_day(&self, day_index: usize) -> Result<&Arc<ScheduleDay>> {
        self.days.get(day_index).ok_or_else(|| {
            StudymateError::Schedule(format!(
                "Day index {} is out of range ({} days)",
                day_index,
                self.days.len()
            ))
            .into()
        })
    }

    fn with_day(&self, day_index: usize, day: ScheduleDay) -> Self {
        let mut days = self.days.clone();
        days[day_index] = Arc::new(day);
        Self { days }
    }
}

/// Scheduler mode state
///
/// `Empty` until a generation succeeds, `Populated` afterwards. Mutations on
/// an empty store are errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScheduleStore {
    #[default]
    Empty,
    Populated(ScheduleData),
}

impl ScheduleStore {
    /// Current schedule, if any
    pub fn data(&self) -> Option<&ScheduleData> {
        match self {
            Self::Empty => None,
            Self::Populated(data) => Some(data),
        }
    }

    /// Whether no schedule has been generated
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Install a freshly generated schedule
    pub fn populate(&mut self, data: ScheduleData) {
        *self = Self::Populated(data);
    }

    /// Drop the current schedule
    pub fn reset(&mut self) {
        *self = Self::Empty;
    }

    /// See [`ScheduleData::add`]
    ///
    /// # Errors
    ///
    /// Returns error if the store is empty or the add fails
    pub fn add(&mut self, day_index: usize, draft: EventDraft) -> Result<()> {
        let next = self.require()?.add(day_index, draft)?;
        self.populate(next);
        Ok(())
    }

    /// See [`ScheduleData::edit`]
    ///
    /// # Errors
    ///
    /// Returns error if the store is empty or the edit fails
    pub fn edit(&mut self, day_index: usize, updated: ScheduleEvent) -> Result<()> {
        let next = self.require()?.edit(day_index, updated)?;
        self.populate(next);
        Ok(())
    }

    /// See [`ScheduleData::delete`]
    ///
    /// # Errors
    ///
    /// Returns error if the store is empty or the day index is invalid
    pub fn delete(&mut self, day_index: usize, event_id: &str) -> Result<()> {
        let next = self.require()?.delete(day_index, event_id)?;
        self.populate(next);
        Ok(())
    }

    fn require(&self) -> Result<&ScheduleData> {
        self.data()
            .ok_or_else(|| StudymateError::Schedule("No schedule has been generated".to_string()).into())
    }
}
