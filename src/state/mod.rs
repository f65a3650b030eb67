//! Application state modules
//!
//! The browse screen's state lives in an immutable struct advanced by a
//! pure transition function; side effects come back as values for the app
//! to execute. Transfers keep a polled task slot instead, since they never
//! race with each other.

mod browse;
mod transfer;

pub use browse::{
    transition, BrowseAction, BrowseEffect, BrowseSettings, BrowseState, ListingTarget,
    PickerKind, ViewMode,
};
pub use transfer::TransferState;

/// Events that state poll methods can return.
/// These communicate results back to the app without direct mutation.
#[derive(Debug)]
pub enum StateEvent {
    /// Update the status message
    StatusMessage(String),

    /// A transfer changed the local directory; refresh the local list
    RefreshLocal,

    /// Log an error message
    LogError(String),
}
