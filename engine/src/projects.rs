//! Project collection controller.
//!
//! Owns the in-memory project list and reconciles it with the backend.
//!
//! # Request lifecycle
//!
//! Each operation spawns its request on the tokio runtime and returns
//! immediately with a [`Dispatch`]. Completed requests come back over a
//! channel and are applied by [`ProjectsController::process_events`] (called
//! once per frame) or [`ProjectsController::settle`], in the order they
//! complete. Independent operations are therefore last-applied-wins.
//!
//! # Guarantees
//!
//! - At most one load, one create, and one delete per project id in flight.
//!   Repeated intents return [`Dispatch::InFlight`] and send nothing.
//! - Failures never touch the collection; they become a single error toast.
//! - Deletes are applied only after the backend confirms them.
//! - Cancelled requests are never applied, even if they already completed.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{AbortHandle, Abortable};
use tokio::sync::mpsc;

use slate_client::{ClientError, ProjectsApi};
use slate_types::{DraftError, NamePolicy, NewProject, Project, ProjectId, filter_projects};

use crate::notifications::Notifications;
use crate::session::Session;

pub const LOAD_FAILED: &str = "Failed to load projects";
pub const CREATE_FAILED: &str = "Failed to create project";
pub const CREATE_SUCCEEDED: &str = "Project created successfully!";
pub const DELETE_FAILED: &str = "Failed to delete project";
pub const DELETE_SUCCEEDED: &str = "Project deleted successfully!";

/// Collection lifecycle. There is no error state: a failed load lands in `Loaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
}

/// Key for the in-flight guard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    Load,
    Create,
    Delete(ProjectId),
}

/// What happened when an operation was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Started,
    /// The same operation is already in flight; nothing was sent.
    InFlight,
    /// No session subject; loading waits for sign-in.
    NoSession,
    /// The draft failed local validation; nothing was sent.
    Rejected(DraftError),
}

impl Dispatch {
    #[must_use]
    pub fn is_started(&self) -> bool {
        matches!(self, Dispatch::Started)
    }
}

/// A completed request after it has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    Loaded { count: usize },
    LoadFailed,
    Created(ProjectId),
    CreateFailed,
    Deleted(ProjectId),
    DeleteFailed(ProjectId),
}

#[derive(Debug)]
enum Outcome {
    Loaded(Result<Vec<Project>, ClientError>),
    Created(Result<Project, ClientError>),
    Deleted(Result<Project, ClientError>),
}

#[derive(Debug)]
struct Completion {
    ticket: u64,
    op: Operation,
    outcome: Outcome,
}

#[derive(Debug)]
struct InFlight {
    ticket: u64,
    abort: AbortHandle,
}

pub struct ProjectsController {
    api: ProjectsApi,
    session: Arc<dyn Session>,
    policy: NamePolicy,
    projects: Vec<Project>,
    state: LoadState,
    notifications: Notifications,
    in_flight: HashMap<Operation, InFlight>,
    next_ticket: u64,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl std::fmt::Debug for ProjectsController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectsController")
            .field("state", &self.state)
            .field("projects", &self.projects.len())
            .field("in_flight", &self.in_flight.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ProjectsController {
    #[must_use]
    pub fn new(api: ProjectsApi, session: Arc<dyn Session>, policy: NamePolicy) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            session,
            policy,
            projects: Vec::new(),
            state: LoadState::Idle,
            notifications: Notifications::new(),
            in_flight: HashMap::new(),
            next_ticket: 0,
            tx,
            rx,
        }
    }

    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    #[must_use]
    pub fn get(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn state(&self) -> LoadState {
        self.state
    }

    #[must_use]
    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    #[must_use]
    pub fn is_in_flight(&self, op: &Operation) -> bool {
        self.in_flight.contains_key(op)
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Projects whose name or description contains `query`, ignoring case.
    /// Never mutates the collection.
    #[must_use]
    pub fn filter(&self, query: &str) -> Vec<&Project> {
        filter_projects(&self.projects, query)
    }

    /// Fetch the whole collection and replace the local copy on success.
    pub fn load(&mut self) -> Dispatch {
        if self.session.subject().is_none() {
            tracing::debug!("Skipping project load: no session subject");
            return Dispatch::NoSession;
        }
        if self.is_in_flight(&Operation::Load) {
            tracing::debug!("Project load already in flight");
            return Dispatch::InFlight;
        }

        let api = self.api.clone();
        let credential = self.session.credential();
        self.state = LoadState::Loading;
        self.spawn(Operation::Load, async move {
            Outcome::Loaded(api.list(credential.as_ref()).await)
        });
        Dispatch::Started
    }

    /// Create a project; the server's copy is prepended once it answers.
    pub fn create(&mut self, name: impl Into<String>, description: impl Into<String>) -> Dispatch {
        let draft = NewProject::new(name, description);
        if let Err(err) = self.policy.check(&draft) {
            self.notifications.error(capitalize(&err.to_string()));
            return Dispatch::Rejected(err);
        }
        if self.is_in_flight(&Operation::Create) {
            tracing::debug!("Project create already in flight");
            return Dispatch::InFlight;
        }

        let api = self.api.clone();
        let credential = self.session.credential();
        self.spawn(Operation::Create, async move {
            Outcome::Created(api.create(&draft, credential.as_ref()).await)
        });
        Dispatch::Started
    }

    /// Delete a project; it leaves the collection only after the backend confirms.
    pub fn delete(&mut self, id: &ProjectId) -> Dispatch {
        let op = Operation::Delete(id.clone());
        if self.is_in_flight(&op) {
            tracing::debug!(project = %id, "Project delete already in flight");
            return Dispatch::InFlight;
        }

        let api = self.api.clone();
        let credential = self.session.credential();
        let id = id.clone();
        self.spawn(op, async move {
            Outcome::Deleted(api.delete(&id, credential.as_ref()).await)
        });
        Dispatch::Started
    }

    /// Apply every completion that has already arrived. Never blocks.
    pub fn process_events(&mut self) -> Vec<ControllerEvent> {
        let mut events = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            if let Some(event) = self.apply(completion) {
                events.push(event);
            }
        }
        events
    }

    /// Wait for every in-flight request, applying each as it completes.
    pub async fn settle(&mut self) -> Vec<ControllerEvent> {
        let mut events = self.process_events();
        while self.has_pending() {
            let Some(completion) = self.rx.recv().await else {
                break;
            };
            if let Some(event) = self.apply(completion) {
                events.push(event);
            }
        }
        events
    }

    /// Abort every in-flight request. Their results are discarded.
    pub fn cancel_all(&mut self) {
        for (op, in_flight) in self.in_flight.drain() {
            tracing::debug!(?op, "Cancelling request");
            in_flight.abort.abort();
        }
        if self.state == LoadState::Loading {
            self.state = if self.projects.is_empty() {
                LoadState::Idle
            } else {
                LoadState::Loaded
            };
        }
    }

    fn spawn<F>(&mut self, op: Operation, request: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let ticket = self.next_ticket;
        self.next_ticket += 1;

        let (abort, registration) = AbortHandle::new_pair();
        let tx = self.tx.clone();
        let task_op = op.clone();
        tokio::spawn(async move {
            if let Ok(outcome) = Abortable::new(request, registration).await {
                let _ = tx.send(Completion {
                    ticket,
                    op: task_op,
                    outcome,
                });
            }
        });

        self.in_flight.insert(op, InFlight { ticket, abort });
    }

    fn apply(&mut self, completion: Completion) -> Option<ControllerEvent> {
        let Completion {
            ticket,
            op,
            outcome,
        } = completion;

        match self.in_flight.get(&op) {
            Some(current) if current.ticket == ticket => {
                self.in_flight.remove(&op);
            }
            _ => {
                tracing::debug!(?op, ticket, "Discarding completion of cancelled request");
                return None;
            }
        }

        let event = match (op, outcome) {
            (_, Outcome::Loaded(Ok(projects))) => {
                self.replace_all(projects);
                self.state = LoadState::Loaded;
                ControllerEvent::Loaded {
                    count: self.projects.len(),
                }
            }
            (_, Outcome::Loaded(Err(err))) => {
                tracing::warn!("Error loading projects: {err}");
                self.notifications.error(LOAD_FAILED);
                self.state = LoadState::Loaded;
                ControllerEvent::LoadFailed
            }
            (_, Outcome::Created(Ok(project))) => {
                let id = project.id.clone();
                self.prepend(project);
                self.notifications.success(CREATE_SUCCEEDED);
                ControllerEvent::Created(id)
            }
            (_, Outcome::Created(Err(err))) => {
                tracing::warn!("Error creating project: {err}");
                self.notifications.error(CREATE_FAILED);
                ControllerEvent::CreateFailed
            }
            (Operation::Delete(id), Outcome::Deleted(Ok(_echo))) => {
                self.projects.retain(|p| p.id != id);
                self.notifications.success(DELETE_SUCCEEDED);
                ControllerEvent::Deleted(id)
            }
            (Operation::Delete(id), Outcome::Deleted(Err(err))) => {
                tracing::warn!(project = %id, "Error deleting project: {err}");
                self.notifications.error(DELETE_FAILED);
                ControllerEvent::DeleteFailed(id)
            }
            (op, Outcome::Deleted(_)) => {
                tracing::error!(?op, "Delete outcome under a non-delete operation");
                return None;
            }
        };
        Some(event)
    }

    fn replace_all(&mut self, projects: Vec<Project>) {
        let mut unique: Vec<Project> = Vec::with_capacity(projects.len());
        for project in projects {
            if unique.iter().any(|p| p.id == project.id) {
                tracing::warn!(project = %project.id, "Duplicate project id in load response");
                continue;
            }
            unique.push(project);
        }
        self.projects = unique;
    }

    fn prepend(&mut self, project: Project) {
        self.projects.retain(|p| p.id != project.id);
        self.projects.insert(0, project);
    }
}

impl Drop for ProjectsController {
    fn drop(&mut self) {
        for in_flight in self.in_flight.values() {
            in_flight.abort.abort();
        }
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
