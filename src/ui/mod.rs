pub mod answer;
pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use answer::{EMPTY_INPUT_REPLY, format_answer, welcome_message};
pub use icons::Icons;
pub use output::{chat_prompt, dim, header, info, section, success, summary_row, timing, warn};
pub use progress::{SeedProgress, Spinner};
pub use table::{TableBuilder, stats_table};
pub use theme::{Theme, theme};
