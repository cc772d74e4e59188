// src/nn/mod.rs
// Layers and losses whose second-order derivatives are provided downstream.

pub mod init;
pub mod layers;
pub mod losses;
pub mod module;
pub mod parameter;

pub use layers::{Flatten, Linear, ReLU, View, SELU};
pub use losses::{CrossEntropyLoss, Loss, MSELoss, Reduction};
pub use module::Module;
pub use parameter::Parameter;
