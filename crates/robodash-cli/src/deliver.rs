//! Terminal driver for the delivery wizard.

use std::io::{BufRead, Write};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use robodash_client::DashboardClient;
use robodash_core::api::Command;
use robodash_core::wizard::{Effect, Step, TaskWizard};
use robodash_core::{BaseStation, Category, ClassificationResult, TaskId, User};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::views;

/// Everything the wizard needs from the outside world.
#[async_trait]
pub trait DeliveryServices: Send + Sync {
    async fn users(&self) -> Result<Vec<User>>;

    async fn stations(&self) -> Result<Vec<BaseStation>>;

    /// Never fails; falls back to keyword rules.
    async fn classify(&self, description: &str) -> ClassificationResult;

    /// Fire-and-forget send.
    fn dispatch(&self, command: Command);
}

/// Live services backed by the HTTP client. Dispatched commands run in the
/// background; [`settle`](Self::settle) waits for them before exit.
pub struct LiveServices {
    client: DashboardClient,
    inflight: Mutex<Vec<JoinHandle<()>>>,
}

impl LiveServices {
    pub fn new(client: DashboardClient) -> Self {
        Self {
            client,
            inflight: Mutex::new(Vec::new()),
        }
    }

    pub async fn settle(self) {
        let handles = match self.inflight.into_inner() {
            Ok(h) => h,
            Err(poisoned) => poisoned.into_inner(),
        };
        for h in handles {
            let _ = h.await;
        }
    }
}

#[async_trait]
impl DeliveryServices for LiveServices {
    async fn users(&self) -> Result<Vec<User>> {
        Ok(self.client.list_users().await?)
    }

    async fn stations(&self) -> Result<Vec<BaseStation>> {
        Ok(self.client.fetch_availability().await?)
    }

    async fn classify(&self, description: &str) -> ClassificationResult {
        self.client.classify(description).await
    }

    fn dispatch(&self, command: Command) {
        let handle = self.client.fire(command);
        match self.inflight.lock() {
            Ok(mut v) => v.push(handle),
            Err(poisoned) => poisoned.into_inner().push(handle),
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

struct Driver<'a, S, R, W> {
    svc: &'a S,
    input: R,
    out: W,
    wizard: TaskWizard,
}

/// Run the wizard until the task is submitted (returns its id) or the user
/// quits / input ends (returns `None`).
pub async fn run_wizard<S, R, W>(svc: &S, sender: Option<String>, input: R, out: W) -> Result<Option<TaskId>>
where
    S: DeliveryServices,
    R: BufRead,
    W: Write,
{
    let (wizard, effects) = TaskWizard::new(sender, TaskId::generate);
    let mut driver = Driver {
        svc,
        input,
        out,
        wizard,
    };
    writeln!(driver.out, "New delivery. Type :back to go back, :quit to cancel.")?;
    driver.apply(effects).await?;

    loop {
        let flow = match driver.wizard.step() {
            Step::Recipient => driver.recipient().await?,
            Step::Location => driver.location().await?,
            Step::ItemDetails => driver.item_details().await?,
            Step::Review => driver.review().await?,
            Step::Progress => {
                let id = driver.wizard.task_id().cloned();
                if let Some(id) = &id {
                    writeln!(driver.out, "Task {id} submitted. Track it with `robodash tasks`.")?;
                }
                return Ok(id);
            }
        };
        if let Flow::Quit = flow {
            writeln!(driver.out, "Cancelled.")?;
            return Ok(None);
        }
    }
}

impl<S, R, W> Driver<'_, S, R, W>
where
    S: DeliveryServices,
    R: BufRead,
    W: Write,
{
    async fn apply(&mut self, effects: Vec<Effect>) -> Result<()> {
        for effect in effects {
            match effect {
                Effect::LoadUsers => match self.svc.users().await {
                    Ok(users) => self.wizard.set_users(users),
                    Err(e) => {
                        warn!("user directory unavailable: {e:#}");
                        writeln!(self.out, "(user list unavailable, any username accepted)")?;
                    }
                },
                Effect::FetchStations => {
                    let outcome = self.svc.stations().await.map_err(|e| format!("{e:#}"));
                    self.wizard.set_stations(outcome);
                }
                Effect::Classify { description } => {
                    let result = self.svc.classify(&description).await;
                    self.wizard.apply_classification(result);
                }
                Effect::Dispatch(command) => self.svc.dispatch(command),
            }
        }
        Ok(())
    }

    /// Read one trimmed line. `None` on end of input or `:quit`.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.out, "{label}: ")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line == ":quit" {
            return Ok(None);
        }
        Ok(Some(line.to_string()))
    }

    fn show_error(&mut self) -> Result<()> {
        if let Some(e) = self.wizard.error() {
            writeln!(self.out, "! {e}")?;
        }
        Ok(())
    }

    /// Handles `:back`; true when the answer was consumed.
    async fn navigate(&mut self, answer: &str) -> Result<bool> {
        if answer != ":back" {
            return Ok(false);
        }
        let effects = self.wizard.back();
        self.apply(effects).await?;
        Ok(true)
    }

    async fn advance(&mut self) -> Result<()> {
        match self.wizard.next() {
            Ok(effects) => self.apply(effects).await,
            Err(_) => self.show_error(),
        }
    }

    async fn recipient(&mut self) -> Result<Flow> {
        writeln!(self.out, "\n== {} ==", Step::Recipient.title())?;
        let names: Vec<String> = self.wizard.users().iter().map(|u| u.username.clone()).collect();
        if !names.is_empty() {
            writeln!(self.out, "Users: {}", names.join(", "))?;
        }
        let Some(answer) = self.prompt("Recipient")? else {
            return Ok(Flow::Quit);
        };
        if !self.navigate(&answer).await? {
            self.wizard.select_receiver(answer);
            self.advance().await?;
        }
        Ok(Flow::Continue)
    }

    async fn location(&mut self) -> Result<Flow> {
        writeln!(self.out, "\n== {} ==", Step::Location.title())?;
        if self.wizard.stations().is_empty() {
            self.show_error()?;
            let Some(answer) = self.prompt("No stations loaded. Enter to retry")? else {
                return Ok(Flow::Quit);
            };
            if !self.navigate(&answer).await? {
                let effects = self.wizard.refresh_stations();
                self.apply(effects).await?;
            }
            return Ok(Flow::Continue);
        }
        write!(self.out, "{}", views::render_stations(self.wizard.stations()))?;

        let Some(pickup) = self.prompt("Pickup station")? else {
            return Ok(Flow::Quit);
        };
        if self.navigate(&pickup).await? {
            return Ok(Flow::Continue);
        }
        if self.wizard.select_pickup(&pickup).is_err() {
            self.show_error()?;
            return Ok(Flow::Continue);
        }

        let options = self.wizard.dropoff_options().join(", ");
        let Some(dropoff) = self.prompt(&format!("Dropoff station [{options}]"))? else {
            return Ok(Flow::Quit);
        };
        if self.navigate(&dropoff).await? {
            return Ok(Flow::Continue);
        }
        match self.wizard.select_dropoff(&dropoff) {
            Ok(slots) if slots.is_empty() => {
                self.show_error()?;
                return Ok(Flow::Continue);
            }
            Ok(_) => {}
            Err(_) => {
                self.show_error()?;
                return Ok(Flow::Continue);
            }
        }

        let slots: Vec<String> = self.wizard.slot_options().iter().map(u32::to_string).collect();
        let Some(slot) = self.prompt(&format!("Slot [{}]", slots.join(", ")))? else {
            return Ok(Flow::Quit);
        };
        if self.navigate(&slot).await? {
            return Ok(Flow::Continue);
        }
        match slot.parse::<u32>() {
            Ok(n) => match self.wizard.select_slot(n) {
                Ok(()) => self.advance().await?,
                Err(_) => self.show_error()?,
            },
            Err(_) => writeln!(self.out, "! Slot must be a number.")?,
        }
        Ok(Flow::Continue)
    }

    async fn item_details(&mut self) -> Result<Flow> {
        writeln!(self.out, "\n== {} ==", Step::ItemDetails.title())?;
        let Some(description) = self.prompt("Item description")? else {
            return Ok(Flow::Quit);
        };
        if self.navigate(&description).await? {
            return Ok(Flow::Continue);
        }
        self.wizard.set_description(description);

        // First attempt asks for a classification when none is held.
        match self.wizard.next() {
            Ok(effects) => self.apply(effects).await?,
            Err(_) => return self.show_error().map(|_| Flow::Continue),
        }
        if self.wizard.step() != Step::ItemDetails {
            return Ok(Flow::Continue);
        }

        if let Some(result) = self.wizard.classification().cloned() {
            write!(self.out, "{}", views::render_classification(&result))?;
            let names: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
            let Some(answer) =
                self.prompt(&format!("Category (Enter to accept, or {})", names.join(" / ")))?
            else {
                return Ok(Flow::Quit);
            };
            if self.navigate(&answer).await? {
                return Ok(Flow::Continue);
            }
            if !answer.is_empty() {
                match answer.parse::<Category>() {
                    Ok(c) => self.wizard.set_category_manually(c),
                    Err(e) => {
                        writeln!(self.out, "! {e}")?;
                        return Ok(Flow::Continue);
                    }
                }
            }
        }
        self.advance().await?;
        Ok(Flow::Continue)
    }

    async fn review(&mut self) -> Result<Flow> {
        writeln!(self.out, "\n== {} ==", Step::Review.title())?;
        if let Some(draft) = self.wizard.draft() {
            write!(self.out, "{}", views::render_draft(&draft))?;
        }
        let Some(answer) = self.prompt("Submit? [y/N]")? else {
            return Ok(Flow::Quit);
        };
        if self.navigate(&answer).await? {
            return Ok(Flow::Continue);
        }
        if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") {
            self.advance().await?;
            Ok(Flow::Continue)
        } else {
            Ok(Flow::Quit)
        }
    }
}
