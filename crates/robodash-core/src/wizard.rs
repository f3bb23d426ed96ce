//! Delivery-request wizard.
//!
//! The wizard is a plain state machine: it never performs I/O itself. Methods
//! that need the outside world return [`Effect`]s, and the driver feeds the
//! outcomes back (`set_users`, `set_stations`, `apply_classification`).

use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{Command, NewTask};
use crate::ids::{IdSource, TaskId};
use crate::model::{BaseStation, Category, ClassificationResult, User};
use crate::stations::{common_slots, dropoff_options, find_station};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    Recipient,
    Location,
    ItemDetails,
    Review,
    Progress,
}

impl Step {
    fn next(self) -> Step {
        match self {
            Step::Recipient => Step::Location,
            Step::Location => Step::ItemDetails,
            Step::ItemDetails => Step::Review,
            Step::Review | Step::Progress => Step::Progress,
        }
    }

    fn prev(self) -> Option<Step> {
        match self {
            Step::Recipient => None,
            Step::Location => Some(Step::Recipient),
            Step::ItemDetails => Some(Step::Location),
            Step::Review => Some(Step::ItemDetails),
            Step::Progress => Some(Step::Review),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Recipient => "Recipient",
            Step::Location => "Location",
            Step::ItemDetails => "Item Details",
            Step::Review => "Review",
            Step::Progress => "Progress",
        }
    }
}

/// Work the driver must carry out on the wizard's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadUsers,
    FetchStations,
    Classify { description: String },
    Dispatch(Command),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Please select a recipient before proceeding.")]
    MissingRecipient,
    #[error("{0} is not a known user.")]
    UnknownRecipient(String),
    #[error("Please select pickup station, slot, and dropoff station before proceeding.")]
    IncompleteLocation,
    #[error("Unknown station: {0}")]
    UnknownStation(String),
    #[error("Pickup and dropoff must be different stations.")]
    SameStation,
    #[error("No available slots between selected stations.")]
    NoCommonSlots,
    #[error("Slot {0} is not available at both stations.")]
    SlotUnavailable(u32),
    #[error("Failed to load base station data.")]
    StationsUnavailable,
    #[error("Please describe the item before proceeding.")]
    MissingDescription,
}

#[derive(Debug, Clone)]
pub struct TaskWizard {
    step: Step,
    sender: Option<String>,
    users: Option<Vec<User>>,
    receiver: Option<String>,
    stations: Vec<BaseStation>,
    pickup: Option<String>,
    dropoff: Option<String>,
    slot: Option<u32>,
    description: String,
    classification: Option<ClassificationResult>,
    task_id: Option<TaskId>,
    dispatched: bool,
    error: Option<WizardError>,
    id_source: IdSource,
}

impl TaskWizard {
    /// Start a wizard for `sender` (the signed-in user, when known).
    pub fn new(sender: Option<String>, id_source: IdSource) -> (Self, Vec<Effect>) {
        let wizard = Self {
            step: Step::Recipient,
            sender,
            users: None,
            receiver: None,
            stations: Vec::new(),
            pickup: None,
            dropoff: None,
            slot: None,
            description: String::new(),
            classification: None,
            task_id: None,
            dispatched: false,
            error: None,
            id_source,
        };
        (wizard, vec![Effect::LoadUsers])
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn error(&self) -> Option<&WizardError> {
        self.error.as_ref()
    }

    pub fn task_id(&self) -> Option<&TaskId> {
        self.task_id.as_ref()
    }

    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    pub fn users(&self) -> &[User] {
        self.users.as_deref().unwrap_or_default()
    }

    pub fn receiver(&self) -> Option<&str> {
        self.receiver.as_deref()
    }

    pub fn stations(&self) -> &[BaseStation] {
        &self.stations
    }

    pub fn pickup(&self) -> Option<&str> {
        self.pickup.as_deref()
    }

    pub fn dropoff(&self) -> Option<&str> {
        self.dropoff.as_deref()
    }

    pub fn slot(&self) -> Option<u32> {
        self.slot
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn classification(&self) -> Option<&ClassificationResult> {
        self.classification.as_ref()
    }

    pub fn is_dispatched(&self) -> bool {
        self.dispatched
    }

    // -- recipient ---------------------------------------------------------

    /// Directory listing for the recipient picker. An empty list disables the
    /// membership check.
    pub fn set_users(&mut self, users: Vec<User>) {
        self.users = (!users.is_empty()).then_some(users);
    }

    pub fn select_receiver(&mut self, username: impl Into<String>) {
        let username = username.into();
        let username = username.trim();
        self.receiver = (!username.is_empty()).then(|| username.to_string());
        self.error = None;
    }

    // -- location ----------------------------------------------------------

    /// Result of a station fetch. A failure empties the list and shows an
    /// error until the next successful load.
    pub fn set_stations(&mut self, outcome: Result<Vec<BaseStation>, String>) {
        match outcome {
            Ok(stations) => {
                self.stations = stations;
                if matches!(self.error, Some(WizardError::StationsUnavailable)) {
                    self.error = None;
                }
                self.revalidate_location();
            }
            Err(e) => {
                warn!(error = %e, "station availability fetch failed");
                self.stations.clear();
                self.pickup = None;
                self.dropoff = None;
                self.slot = None;
                self.error = Some(WizardError::StationsUnavailable);
            }
        }
    }

    pub fn refresh_stations(&self) -> Vec<Effect> {
        vec![Effect::FetchStations]
    }

    fn revalidate_location(&mut self) {
        if let Some(p) = &self.pickup {
            if find_station(&self.stations, p).is_none() {
                self.pickup = None;
                self.dropoff = None;
                self.slot = None;
                return;
            }
        }
        if let Some(d) = &self.dropoff {
            if find_station(&self.stations, d).is_none() {
                self.dropoff = None;
                self.slot = None;
                return;
            }
        }
        if let Some(s) = self.slot {
            if !self.slot_options().contains(&s) {
                self.slot = None;
            }
        }
    }

    /// Choosing a pickup resets dropoff and slot.
    pub fn select_pickup(&mut self, station: &str) -> Result<(), WizardError> {
        if find_station(&self.stations, station).is_none() {
            return Err(self.fail(WizardError::UnknownStation(station.to_string())));
        }
        self.pickup = Some(station.to_string());
        self.dropoff = None;
        self.slot = None;
        self.error = None;
        Ok(())
    }

    pub fn dropoff_options(&self) -> Vec<&str> {
        match &self.pickup {
            Some(p) => dropoff_options(&self.stations, p),
            None => Vec::new(),
        }
    }

    /// Choose the dropoff station and return the slots shared with the pickup.
    /// An empty intersection is not rejected, but the wizard shows
    /// [`WizardError::NoCommonSlots`] and cannot advance without a slot.
    pub fn select_dropoff(&mut self, station: &str) -> Result<Vec<u32>, WizardError> {
        if find_station(&self.stations, station).is_none() {
            return Err(self.fail(WizardError::UnknownStation(station.to_string())));
        }
        if self.pickup.as_deref() == Some(station) {
            return Err(self.fail(WizardError::SameStation));
        }
        self.dropoff = Some(station.to_string());
        self.slot = None;
        let slots = self.slot_options();
        self.error = slots.is_empty().then_some(WizardError::NoCommonSlots);
        Ok(slots)
    }

    pub fn slot_options(&self) -> Vec<u32> {
        match (&self.pickup, &self.dropoff) {
            (Some(p), Some(d)) => common_slots(&self.stations, p, d),
            _ => Vec::new(),
        }
    }

    pub fn select_slot(&mut self, slot: u32) -> Result<(), WizardError> {
        if !self.slot_options().contains(&slot) {
            return Err(self.fail(WizardError::SlotUnavailable(slot)));
        }
        self.slot = Some(slot);
        self.error = None;
        Ok(())
    }

    // -- item details ------------------------------------------------------

    /// Replacing the description drops any classification made for the old
    /// text.
    pub fn set_description(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.trim() != self.description.trim() {
            self.classification = None;
        }
        self.description = text;
        self.error = None;
    }

    pub fn apply_classification(&mut self, result: ClassificationResult) {
        debug!(category = %result.category, priority = %result.priority, source = ?result.source, "classified");
        self.classification = Some(result);
    }

    pub fn set_category_manually(&mut self, category: Category) {
        self.classification = Some(ClassificationResult::manual(category));
    }

    // -- navigation --------------------------------------------------------

    /// The task as it would be dispatched. Available once the id is assigned.
    pub fn draft(&self) -> Option<NewTask> {
        Some(NewTask {
            task_id: self.task_id.clone()?,
            start: self.pickup.clone()?,
            end: self.dropoff.clone()?,
            slot: self.slot?,
            priority: self.classification.as_ref()?.priority,
            receiver: self.receiver.clone()?,
            sender: self.sender.clone(),
            description: self.description.trim().to_string(),
        })
    }

    /// Try to move forward. On failure the step is unchanged and the error is
    /// also kept for display.
    pub fn next(&mut self) -> Result<Vec<Effect>, WizardError> {
        let effects = match self.step {
            Step::Recipient => {
                self.check_recipient()?;
                vec![Effect::FetchStations]
            }
            Step::Location => {
                if self.pickup.is_none() || self.dropoff.is_none() || self.slot.is_none() {
                    return Err(self.fail(WizardError::IncompleteLocation));
                }
                Vec::new()
            }
            Step::ItemDetails => {
                let description = self.description.trim();
                if description.is_empty() {
                    return Err(self.fail(WizardError::MissingDescription));
                }
                if self.classification.is_none() {
                    return Ok(vec![Effect::Classify {
                        description: description.to_string(),
                    }]);
                }
                let source = self.id_source;
                self.task_id.get_or_insert_with(source);
                Vec::new()
            }
            Step::Review => self.dispatch_once(),
            Step::Progress => return Ok(Vec::new()),
        };

        self.error = None;
        self.step = self.step.next();
        debug!(step = self.step.title(), "wizard advanced");
        Ok(effects)
    }

    /// Go back one step; a no-op on the first step. Entering a step that
    /// shows remote data asks for a fresh copy of it.
    pub fn back(&mut self) -> Vec<Effect> {
        let Some(prev) = self.step.prev() else {
            return Vec::new();
        };
        self.step = prev;
        self.error = None;
        debug!(step = prev.title(), "wizard went back");
        match prev {
            Step::Recipient => vec![Effect::LoadUsers],
            Step::Location => vec![Effect::FetchStations],
            Step::ItemDetails | Step::Review | Step::Progress => Vec::new(),
        }
    }

    fn check_recipient(&mut self) -> Result<(), WizardError> {
        let Some(receiver) = self.receiver.clone() else {
            return Err(self.fail(WizardError::MissingRecipient));
        };
        if let Some(users) = &self.users {
            if !users.iter().any(|u| u.username == receiver) {
                return Err(self.fail(WizardError::UnknownRecipient(receiver)));
            }
        }
        Ok(())
    }

    fn dispatch_once(&mut self) -> Vec<Effect> {
        if self.dispatched {
            return Vec::new();
        }
        match self.draft() {
            Some(task) => {
                self.dispatched = true;
                vec![Effect::Dispatch(Command::AddTask(task))]
            }
            // Unreachable through the gates above; never emit a partial task.
            None => Vec::new(),
        }
    }

    fn fail(&mut self, err: WizardError) -> WizardError {
        self.error = Some(err.clone());
        err
    }
}
