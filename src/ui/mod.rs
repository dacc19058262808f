pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{error, header, info, section, success};
pub use table::{kv_table, records_table};
pub use theme::{theme, Theme};
