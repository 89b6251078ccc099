pub mod config;
pub mod expense;
pub mod itinerary;
pub mod system;
pub mod weather;

use crate::cli::registry::CommandRegistry;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    for entry in itinerary::definitions()
        .into_iter()
        .chain(weather::definitions())
        .chain(expense::definitions())
        .chain(config::definitions())
        .chain(system::definitions())
    {
        registry.register(entry);
    }
}
