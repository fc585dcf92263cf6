// Guided exploration of an external relational table:
// connect -> pick table -> menu (info / missing / duplicates / search)

pub mod error;
pub mod machine;
pub mod source;
pub mod state;

pub use error::ExploreError;
pub use machine::{Conversations, Event, Limits, MenuOption, Reply};
pub use source::ExternalSource;
pub use state::ExploreState;
