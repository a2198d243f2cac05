pub mod credentials;
pub mod guard;
pub mod prompt;

pub use guard::check_size;
pub use prompt::ReviewPrompt;
