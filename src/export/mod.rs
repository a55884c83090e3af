//! Codeplug CSV rendering. Pure functions, no I/O.

mod tyt;

pub use tyt::{
    CHANNEL_HEADERS, CONTACT_HEADERS, CsvPreview, PREVIEW_ROWS, preview, render_channels,
    render_contacts,
};
