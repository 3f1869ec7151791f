pub mod app;
pub mod audio;
pub mod surface;
pub mod ui;

use std::error::Error;

pub fn run(source: &str, index: Option<usize>, single: bool) -> Result<(), Box<dyn Error>> {
    app::run(source, index, single)
}
