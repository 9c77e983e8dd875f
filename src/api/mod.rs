mod sheets;
mod store;

pub use sheets::SheetsClient;
pub use store::RosterStore;

#[cfg(test)]
pub use store::testing;
