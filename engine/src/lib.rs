//! Core engine for Slate - state machine and orchestration.
//!
//! This crate contains the App state machine without TUI dependencies.
//!
//! ```text
//! Session ──bootstrap──> Route::Projects ──> ProjectsController::load()
//!                                   │
//!      TUI intents ──> App ─────────┴──> create / delete / filter
//!                       ^                        │
//!                       └── tick(): process_events() <── request tasks
//! ```

mod app;
mod notifications;
mod projects;
mod route;
mod session;

pub use app::{App, AppSettings, CreateField, CreateModal, InputMode};
pub use notifications::{Notifications, Toast, ToastId, ToastLevel};
pub use projects::{
    CREATE_FAILED, CREATE_SUCCEEDED, ControllerEvent, DELETE_FAILED, DELETE_SUCCEEDED, Dispatch,
    LOAD_FAILED, LoadState, Operation, ProjectsController,
};
pub use route::Route;
pub use session::{Session, StaticSession, bootstrap};

pub use slate_client::{self, ApiClient, ClientError, ProjectsApi};
pub use slate_types::{
    Credential, DraftError, NamePolicy, NewProject, Project, ProjectId, SubjectId, UiOptions,
    ViewMode,
};
