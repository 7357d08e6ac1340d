pub mod sidecar;
pub mod transcript;

pub use sidecar::{read_info, update_file_name, write_info, Sidecar};
pub use transcript::{combine_pages, format_xml};
