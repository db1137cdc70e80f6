// SPDX-License-Identifier: GPL-3.0-only
pub mod traits;
pub mod headless;

pub use traits::{Navigator, Route};
pub use headless::LogNavigator;
