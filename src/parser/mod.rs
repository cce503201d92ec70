mod machine;
mod state;

pub(crate) use machine::parse_url;
pub use state::State;
