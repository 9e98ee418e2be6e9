/// Dataset container, numeric traits and input validation
pub mod dataset;
