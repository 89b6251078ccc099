//! Shared traits for domain entities.

/// Exposes a stable identifier for entities kept in session state.
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}
