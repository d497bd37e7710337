//! Application state: current screen, list view state, and modal lifecycle.
//!
//! `App` holds pure UI state (search query, view mode, selection, open
//! modal) and forwards every data mutation to the [`ProjectsController`].

use std::sync::Arc;
use std::time::Instant;

use slate_client::ProjectsApi;
use slate_types::{NamePolicy, Project, ProjectId, UiOptions, ViewMode};

use crate::notifications::Notifications;
use crate::projects::{ControllerEvent, Dispatch, LoadState, Operation, ProjectsController};
use crate::route::Route;
use crate::session::{Session, bootstrap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Keystrokes edit the search query.
    Search,
    /// The create modal has focus.
    Create,
    /// Waiting for y/n on a pending delete.
    ConfirmDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateField {
    #[default]
    Name,
    Description,
}

/// Draft held by the create modal while it is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateModal {
    name: String,
    description: String,
    focus: CreateField,
}

impl CreateModal {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn focus(&self) -> CreateField {
        self.focus
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            CreateField::Name => &mut self.name,
            CreateField::Description => &mut self.description,
        }
    }

    fn next_field(&mut self) {
        self.focus = match self.focus {
            CreateField::Name => CreateField::Description,
            CreateField::Description => CreateField::Name,
        };
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AppSettings {
    pub view_mode: ViewMode,
    pub name_policy: NamePolicy,
    pub ui_options: UiOptions,
}

pub struct App {
    route: Route,
    session: Arc<dyn Session>,
    projects: ProjectsController,
    ui_options: UiOptions,
    view_mode: ViewMode,
    search: String,
    selected: usize,
    input_mode: InputMode,
    create: Option<CreateModal>,
    pending_delete: Option<ProjectId>,
    frame: u64,
    should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(api: ProjectsApi, session: Arc<dyn Session>, settings: AppSettings) -> Self {
        let projects = ProjectsController::new(api, Arc::clone(&session), settings.name_policy);
        Self {
            route: Route::Root,
            session,
            projects,
            ui_options: settings.ui_options,
            view_mode: settings.view_mode,
            search: String::new(),
            selected: 0,
            input_mode: InputMode::Normal,
            create: None,
            pending_delete: None,
            frame: 0,
            should_quit: false,
        }
    }

    /// Enter through the root gate.
    pub fn start(&mut self) {
        self.navigate(Route::Root);
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn route(&self) -> &Route {
        &self.route
    }

    #[must_use]
    pub fn session(&self) -> &dyn Session {
        self.session.as_ref()
    }

    #[must_use]
    pub fn projects(&self) -> &ProjectsController {
        &self.projects
    }

    #[must_use]
    pub fn notifications(&self) -> &Notifications {
        self.projects.notifications()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.ui_options
    }

    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    #[must_use]
    pub fn search_query(&self) -> &str {
        &self.search
    }

    #[must_use]
    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    #[must_use]
    pub fn create_modal(&self) -> Option<&CreateModal> {
        self.create.as_ref()
    }

    #[must_use]
    pub fn pending_delete(&self) -> Option<&Project> {
        self.pending_delete
            .as_ref()
            .and_then(|id| self.projects.get(id))
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.projects.state() == LoadState::Loading
    }

    #[must_use]
    pub fn is_creating(&self) -> bool {
        self.projects.is_in_flight(&Operation::Create)
    }

    #[must_use]
    pub fn is_deleting(&self, id: &ProjectId) -> bool {
        self.projects.is_in_flight(&Operation::Delete(id.clone()))
    }

    /// Frame counter for spinners.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Projects matching the current search query.
    #[must_use]
    pub fn visible_projects(&self) -> Vec<&Project> {
        self.projects.filter(&self.search)
    }

    /// Index into [`Self::visible_projects`].
    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn selected_project(&self) -> Option<&Project> {
        self.visible_projects().get(self.selected).copied()
    }

    // ------------------------------------------------------------------
    // Frame loop
    // ------------------------------------------------------------------

    /// Apply completed requests and expire old toasts. Called once per frame.
    pub fn tick(&mut self, now: Instant) {
        let events = self.projects.process_events();
        self.handle_events(events);
        self.projects.notifications_mut().expire(now);
        self.frame = self.frame.wrapping_add(1);
    }

    /// Wait for every in-flight request and apply the results.
    pub async fn settle(&mut self) {
        let events = self.projects.settle().await;
        self.handle_events(events);
    }

    fn handle_events(&mut self, events: Vec<ControllerEvent>) {
        for event in events {
            match event {
                ControllerEvent::Created(_) => self.close_create(),
                ControllerEvent::Loaded { .. } | ControllerEvent::Deleted(_) => {
                    self.clamp_selection();
                    if self.pending_delete.is_some() && self.pending_delete().is_none() {
                        tracing::debug!("Pending delete target is gone; closing prompt");
                        self.cancel_delete();
                    }
                }
                ControllerEvent::LoadFailed
                | ControllerEvent::CreateFailed
                | ControllerEvent::DeleteFailed(_) => {}
            }
        }
    }

    /// Stop outstanding requests before the app goes away.
    pub fn shutdown(&mut self) {
        self.projects.cancel_all();
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn navigate(&mut self, route: Route) {
        let route = match route {
            Route::Root => bootstrap(self.session.as_ref()),
            Route::Projects | Route::ProjectDetail(_) if !self.session.is_signed_in() => {
                Route::SignIn
            }
            other => other,
        };
        tracing::debug!(from = %self.route, to = %route, "Navigate");

        self.input_mode = InputMode::Normal;
        self.create = None;
        self.pending_delete = None;

        let entering_list = route == Route::Projects && self.route != Route::Projects;
        self.route = route;
        if entering_list {
            self.projects.load();
        }
    }

    pub fn open_selected(&mut self) {
        if let Some(id) = self.selected_project().map(|p| p.id.clone()) {
            self.navigate(Route::ProjectDetail(id));
        }
    }

    pub fn back(&mut self) {
        match self.route {
            Route::ProjectDetail(_) => self.navigate(Route::Projects),
            Route::SignUp => self.navigate(Route::SignIn),
            Route::Root | Route::SignIn | Route::Projects => {}
        }
    }

    pub fn show_sign_up(&mut self) {
        self.navigate(Route::SignUp);
    }

    pub fn show_sign_in(&mut self) {
        self.navigate(Route::SignIn);
    }

    // ------------------------------------------------------------------
    // List view
    // ------------------------------------------------------------------

    pub fn reload(&mut self) -> Dispatch {
        self.projects.load()
    }

    pub fn toggle_view_mode(&mut self) {
        self.view_mode = self.view_mode.toggle();
    }

    /// Move the selection by `delta` items, clamped to the visible list.
    pub fn move_selection(&mut self, delta: isize) {
        let len = self.visible_projects().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let target = self.selected.saturating_add_signed(delta);
        self.selected = target.min(len - 1);
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_projects().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn dismiss_notification(&mut self) {
        self.projects.notifications_mut().dismiss_latest();
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    pub fn begin_search(&mut self) {
        self.input_mode = InputMode::Search;
    }

    pub fn end_search(&mut self) {
        if self.input_mode == InputMode::Search {
            self.input_mode = InputMode::Normal;
        }
    }

    pub fn search_insert(&mut self, c: char) {
        self.search.push(c);
        self.selected = 0;
    }

    pub fn search_backspace(&mut self) {
        self.search.pop();
        self.selected = 0;
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
        self.selected = 0;
    }

    pub fn clear_search(&mut self) {
        self.set_search(String::new());
    }

    // ------------------------------------------------------------------
    // Create modal
    // ------------------------------------------------------------------

    pub fn open_create(&mut self) {
        if self.create.is_none() {
            self.create = Some(CreateModal::default());
        }
        self.input_mode = InputMode::Create;
    }

    pub fn close_create(&mut self) {
        self.create = None;
        if self.input_mode == InputMode::Create {
            self.input_mode = InputMode::Normal;
        }
    }

    pub fn create_insert(&mut self, c: char) {
        if let Some(modal) = self.create.as_mut() {
            modal.field_mut().push(c);
        }
    }

    pub fn create_backspace(&mut self) {
        if let Some(modal) = self.create.as_mut() {
            modal.field_mut().pop();
        }
    }

    pub fn create_next_field(&mut self) {
        if let Some(modal) = self.create.as_mut() {
            modal.next_field();
        }
    }

    /// Submit the modal. It stays open until the backend confirms.
    pub fn submit_create(&mut self) -> Option<Dispatch> {
        let modal = self.create.as_ref()?;
        let (name, description) = (modal.name.clone(), modal.description.clone());
        Some(self.projects.create(name, description))
    }

    // ------------------------------------------------------------------
    // Delete confirmation
    // ------------------------------------------------------------------

    pub fn request_delete(&mut self) {
        if let Some(id) = self.selected_project().map(|p| p.id.clone()) {
            self.pending_delete = Some(id);
            self.input_mode = InputMode::ConfirmDelete;
        }
    }

    pub fn confirm_delete(&mut self) -> Option<Dispatch> {
        let id = self.pending_delete.take()?;
        self.input_mode = InputMode::Normal;
        Some(self.projects.delete(&id))
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        if self.input_mode == InputMode::ConfirmDelete {
            self.input_mode = InputMode::Normal;
        }
    }
}
