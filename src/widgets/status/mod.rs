//! Status widgets - loading progress and viewer state readout

mod progress_bar;
mod status;

pub use progress_bar::ProgressBar;
pub use status::StatusBar;
