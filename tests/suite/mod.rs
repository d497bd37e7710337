mod bootstrap;
mod config;
mod projects;
mod ui;
