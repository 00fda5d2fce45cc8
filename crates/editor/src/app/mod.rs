pub(crate) mod bootstrap;
mod editor;
pub(crate) mod loop_runner;
