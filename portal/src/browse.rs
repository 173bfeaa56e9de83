//! Interactive employee browser.
//!
//! [`Session`] is a synchronous state machine fed by [`SessionEvent`]s: typed
//! lines and fetch, save, or delete outcomes. It returns [`Effect`]s for the
//! runner to perform. [`run`] wires it to a line reader and worker threads
//! through one mpsc channel, so every transition happens on a single thread.

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::commands::{employee_screen, notice_line};
use crate::core::controller::{FetchTicket, ListController, ListEvent, RenderState};
use crate::core::display::DELETE_EMPLOYEE_WARNING;
use crate::core::editor::{
    DeleteConfirm, DeleteEvent, Editor, EditorEvent, EditorStep, Mutation, delete_outcome,
};
use crate::core::filter::FilterEvent;
use crate::core::types::EmployeeDraft;
use crate::io::api::PortalApi;

pub const HELP: &str = "\
Commands:
  all                 clear every filter
  expiring            toggle contracts expiring this month
  full-time           toggle full-time contracts
  part-time           toggle part-time contracts
  search <text>       filter by name (empty text clears)
  page <n> | next | prev
  refresh             reload the current page
  delete <id>         delete an employee (asks for confirmation)
  add                 start a new employee draft
  edit <id>           edit an employee on the current page
  set <field> <text>  first, last, email, mobile or address (empty text clears)
  show                print the open draft
  save                submit the draft; on failure it stays open to retry
  cancel              discard the draft
  help | quit";

const NO_DRAFT: &str = "No open draft; use 'add' or 'edit <id>'.";
const SAVING: &str = "Draft is being saved.";
const RETRY_HINT: &str = "Draft kept; 'save' to retry or 'cancel' to discard.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Input(String),
    /// Input stream ended; treated like `quit`.
    InputClosed,
    List(ListEvent),
    DeleteFinished { id: i64, result: Result<(), String> },
    SaveFinished(Result<(), String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(FetchTicket),
    Delete(i64),
    Save(Mutation<EmployeeDraft>),
    Print(String),
    Quit,
}

/// Parsed browser command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Filter(FilterEvent),
    Page(u32),
    Next,
    Previous,
    Refresh,
    Delete(i64),
    Add,
    Edit(i64),
    Set(DraftField, String),
    Show,
    Save,
    Cancel,
    Help,
    Quit,
}

/// Employee draft field addressed by `set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    FirstName,
    LastName,
    Email,
    Mobile,
    Address,
}

impl DraftField {
    fn parse(word: &str) -> Option<Self> {
        Some(match word.to_ascii_lowercase().as_str() {
            "first" | "first-name" => DraftField::FirstName,
            "last" | "last-name" => DraftField::LastName,
            "email" => DraftField::Email,
            "mobile" => DraftField::Mobile,
            "address" => DraftField::Address,
            _ => return None,
        })
    }

    /// Copy of `draft` with this field set; empty optional fields become `None`.
    fn set(self, draft: &EmployeeDraft, value: String) -> EmployeeDraft {
        let optional = Some(value.clone()).filter(|value| !value.is_empty());
        let mut next = draft.clone();
        match self {
            DraftField::FirstName => next.first_name = value,
            DraftField::LastName => next.last_name = value,
            DraftField::Email => next.email = optional,
            DraftField::Mobile => next.mobile_number = value,
            DraftField::Address => next.address = optional,
        }
        next
    }
}

pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let command = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "all" => Command::Filter(FilterEvent::All),
        "expiring" => Command::Filter(FilterEvent::Expiring),
        "full-time" | "fulltime" => Command::Filter(FilterEvent::FullTime),
        "part-time" | "parttime" => Command::Filter(FilterEvent::PartTime),
        "search" => Command::Filter(FilterEvent::Search(rest.to_string())),
        "page" => Command::Page(
            rest.parse()
                .map_err(|_| format!("page expects a number, got {rest:?}"))?,
        ),
        "next" => Command::Next,
        "prev" | "previous" => Command::Previous,
        "refresh" => Command::Refresh,
        "delete" => Command::Delete(
            rest.parse()
                .map_err(|_| format!("delete expects an employee id, got {rest:?}"))?,
        ),
        "add" | "new" => Command::Add,
        "edit" => Command::Edit(
            rest.parse()
                .map_err(|_| format!("edit expects an employee id, got {rest:?}"))?,
        ),
        "set" => {
            let (name, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let field = DraftField::parse(name).ok_or_else(|| {
                format!("unknown field {name:?}; use first, last, email, mobile or address")
            })?;
            Command::Set(field, value.trim().to_string())
        }
        "show" => Command::Show,
        "save" => Command::Save,
        "cancel" => Command::Cancel,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command {other:?}; type 'help'")),
    };
    Ok(Some(command))
}

#[derive(Debug, Clone)]
pub struct Session {
    controller: ListController,
    editor: Editor<EmployeeDraft>,
    confirm: DeleteConfirm,
    deletes_in_flight: usize,
    quitting: bool,
}

impl Session {
    pub fn new(page_size: u32) -> Self {
        Self {
            controller: ListController::new(page_size),
            editor: Editor::default(),
            confirm: DeleteConfirm::default(),
            deletes_in_flight: 0,
            quitting: false,
        }
    }

    pub fn controller(&self) -> &ListController {
        &self.controller
    }

    pub fn editor(&self) -> &Editor<EmployeeDraft> {
        &self.editor
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    /// Mount the list.
    pub fn start(&mut self) -> Vec<Effect> {
        self.list(ListEvent::Mount)
    }

    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        let mut effects = match event {
            SessionEvent::Input(line) => self.input(&line),
            SessionEvent::InputClosed => {
                self.quitting = true;
                Vec::new()
            }
            SessionEvent::List(event) => self.list(event),
            SessionEvent::DeleteFinished { id, result } => self.delete_finished(id, result),
            SessionEvent::SaveFinished(result) => self.save_finished(result),
        };
        if self.quitting && self.is_idle() {
            effects.push(Effect::Quit);
        }
        effects
    }

    fn is_idle(&self) -> bool {
        self.controller.in_flight().is_none()
            && self.deletes_in_flight == 0
            && !self.editor.is_submitting()
    }

    fn input(&mut self, line: &str) -> Vec<Effect> {
        if let DeleteConfirm::Pending(id) = self.confirm {
            let answer = line.trim().to_ascii_lowercase();
            let event = if matches!(answer.as_str(), "y" | "yes") {
                DeleteEvent::Confirm
            } else {
                DeleteEvent::Dismiss
            };
            return match self.confirm.apply(event) {
                Some(confirmed) => {
                    self.deletes_in_flight += 1;
                    vec![Effect::Delete(confirmed)]
                }
                None => vec![Effect::Print(format!("Kept employee #{id}."))],
            };
        }
        if self.quitting {
            return Vec::new();
        }
        let command = match parse_command(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Vec::new(),
            Err(message) => return vec![Effect::Print(message)],
        };
        let touches_draft = matches!(
            command,
            Command::Add | Command::Edit(_) | Command::Set(..) | Command::Cancel
        );
        if touches_draft && self.editor.is_submitting() {
            return vec![Effect::Print(SAVING.to_string())];
        }
        match command {
            Command::Filter(event) => self.list(ListEvent::Filter(event)),
            Command::Page(page) => self.list(ListEvent::GoToPage(page)),
            Command::Next => self.list(ListEvent::NextPage),
            Command::Previous => self.list(ListEvent::PreviousPage),
            Command::Refresh => self.list(ListEvent::Refresh),
            Command::Delete(id) => {
                self.confirm.apply(DeleteEvent::Request(id));
                vec![Effect::Print(format!(
                    "Delete employee #{id}? {DELETE_EMPLOYEE_WARNING} [y/N]"
                ))]
            }
            Command::Add => {
                self.editor.apply(EditorEvent::OpenNew(EmployeeDraft::default()));
                vec![Effect::Print(self.draft_text())]
            }
            Command::Edit(id) => self.open_edit(id),
            Command::Set(field, value) => {
                let Some(draft) = self.editor.draft() else {
                    return vec![Effect::Print(NO_DRAFT.to_string())];
                };
                let next = field.set(draft, value);
                self.editor.apply(EditorEvent::Change(next));
                Vec::new()
            }
            Command::Show => vec![Effect::Print(self.draft_text())],
            Command::Save => self.save(),
            Command::Cancel => {
                self.editor.apply(EditorEvent::Cancel);
                Vec::new()
            }
            Command::Help => vec![Effect::Print(HELP.to_string())],
            Command::Quit => {
                self.quitting = true;
                Vec::new()
            }
        }
    }

    fn list(&mut self, event: ListEvent) -> Vec<Effect> {
        let is_outcome = matches!(
            event,
            ListEvent::FetchSucceeded { .. } | ListEvent::FetchFailed { .. }
        );
        let step = self.controller.apply(event);
        if step.stale {
            debug!("dropped superseded fetch outcome");
            return Vec::new();
        }
        let mut effects = Vec::new();
        if let Some(notice) = &step.notice {
            effects.push(Effect::Print(notice_line(notice)));
        }
        match step.fetch {
            Some(ticket) => effects.push(Effect::Fetch(ticket)),
            None if is_outcome => effects.push(Effect::Print(employee_screen(&self.controller))),
            None => {}
        }
        effects
    }

    fn open_edit(&mut self, id: i64) -> Vec<Effect> {
        let RenderState::Populated(rows) = self.controller.render() else {
            return vec![Effect::Print(format!("Employee #{id} is not on this page."))];
        };
        let Some(employee) = rows.iter().find(|employee| employee.id == Some(id)) else {
            return vec![Effect::Print(format!("Employee #{id} is not on this page."))];
        };
        let draft = EmployeeDraft::from(employee);
        self.editor.apply(EditorEvent::OpenEdit(id, draft));
        vec![Effect::Print(self.draft_text())]
    }

    fn save(&mut self) -> Vec<Effect> {
        if !self.editor.is_open() {
            return vec![Effect::Print(NO_DRAFT.to_string())];
        }
        let step = self.editor.apply(EditorEvent::Submit);
        if let Some(invalid) = step.invalid {
            return vec![Effect::Print(invalid.to_string())];
        }
        step.mutation.map(Effect::Save).into_iter().collect()
    }

    fn save_finished(&mut self, result: Result<(), String>) -> Vec<Effect> {
        let failed = result.is_err();
        let event = match result {
            Ok(()) => EditorEvent::Succeeded,
            Err(message) => {
                warn!(message = %message, "save failed");
                EditorEvent::Failed(message)
            }
        };
        let step = self.editor.apply(event);
        let mut effects = Vec::new();
        if let Some(notice) = &step.notice {
            effects.push(Effect::Print(notice_line(notice)));
        }
        if failed && !self.quitting {
            effects.push(Effect::Print(RETRY_HINT.to_string()));
        }
        if step.refresh && !self.quitting {
            effects.extend(self.list(ListEvent::Refresh));
        }
        effects
    }

    /// Title and fields of the open draft.
    fn draft_text(&self) -> String {
        let (Some(title), Some(draft)) = (self.editor.title(), self.editor.draft()) else {
            return NO_DRAFT.to_string();
        };
        let optional = |value: &Option<String>| value.clone().unwrap_or_default();
        format!(
            "{title}\n  first:   {}\n  last:    {}\n  email:   {}\n  mobile:  {}\n  address: {}",
            draft.first_name,
            draft.last_name,
            optional(&draft.email),
            draft.mobile_number,
            optional(&draft.address),
        )
    }

    fn delete_finished(&mut self, id: i64, result: Result<(), String>) -> Vec<Effect> {
        self.deletes_in_flight = self.deletes_in_flight.saturating_sub(1);
        if let Err(message) = &result {
            warn!(id, message = %message, "delete failed");
        }
        let step: EditorStep<()> = delete_outcome("employee", result);
        let mut effects = Vec::new();
        if let Some(notice) = &step.notice {
            effects.push(Effect::Print(notice_line(notice)));
        }
        if step.refresh && !self.quitting {
            effects.extend(self.list(ListEvent::Refresh));
        }
        effects
    }
}

/// Run the browser until `quit` or end of input.
///
/// Lines are read on a dedicated thread; each fetch and delete runs on its
/// own worker. Outstanding work is drained before returning.
pub fn run<R>(api: Arc<dyn PortalApi>, page_size: u32, input: R, out: &mut dyn Write) -> Result<()>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    spawn_reader(input, tx.clone());

    let mut session = Session::new(page_size);
    writeln!(out, "Type 'help' for commands.")?;
    let mut pending = session.start();
    loop {
        for effect in pending.drain(..) {
            match effect {
                Effect::Fetch(ticket) => spawn_fetch(&api, ticket, tx.clone()),
                Effect::Delete(id) => spawn_delete(&api, id, tx.clone()),
                Effect::Save(mutation) => spawn_save(&api, mutation, tx.clone()),
                Effect::Print(text) => writeln!(out, "{text}")?,
                Effect::Quit => {
                    info!("browse session finished");
                    return Ok(());
                }
            }
        }
        out.flush()?;
        let Ok(event) = rx.recv() else {
            return Ok(());
        };
        pending = session.handle(event);
    }
}

fn spawn_reader<R>(input: R, tx: Sender<SessionEvent>)
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else { break };
            if tx.send(SessionEvent::Input(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(SessionEvent::InputClosed);
    });
}

fn spawn_fetch(api: &Arc<dyn PortalApi>, ticket: FetchTicket, tx: Sender<SessionEvent>) {
    let api = Arc::clone(api);
    thread::spawn(move || {
        let event = match api.list_employees(&ticket.query) {
            Ok(items) => ListEvent::FetchSucceeded { ticket, items },
            Err(err) => ListEvent::FetchFailed {
                ticket,
                message: err.message,
            },
        };
        let _ = tx.send(SessionEvent::List(event));
    });
}

fn spawn_delete(api: &Arc<dyn PortalApi>, id: i64, tx: Sender<SessionEvent>) {
    let api = Arc::clone(api);
    thread::spawn(move || {
        let result = api.delete_employee(id).map_err(|err| err.message);
        let _ = tx.send(SessionEvent::DeleteFinished { id, result });
    });
}

fn spawn_save(
    api: &Arc<dyn PortalApi>,
    mutation: Mutation<EmployeeDraft>,
    tx: Sender<SessionEvent>,
) {
    let api = Arc::clone(api);
    thread::spawn(move || {
        let result = match &mutation {
            Mutation::Create(draft) => api.create_employee(draft),
            Mutation::Update(id, draft) => api.update_employee(*id, draft),
        };
        let result = result.map(drop).map_err(|err| err.message);
        let _ = tx.send(SessionEvent::SaveFinished(result));
    });
}
