use std::fmt;

use slate_types::ProjectId;

/// Screens the application can show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    /// Entry point; resolved by [`crate::bootstrap`] before anything renders.
    #[default]
    Root,
    SignIn,
    SignUp,
    Projects,
    ProjectDetail(ProjectId),
}

impl Route {
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Route::Root => "/".to_string(),
            Route::SignIn => "/sign-in".to_string(),
            Route::SignUp => "/sign-up".to_string(),
            Route::Projects => "/projects".to_string(),
            Route::ProjectDetail(id) => format!("/projects/{id}"),
        }
    }

    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Route::SignIn | Route::SignUp)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
