pub mod stages;
pub mod synth;
pub mod validate;
