// SPDX-License-Identifier: GPL-3.0-only
pub mod traits;
pub mod static_token;

pub use traits::TokenProvider;
pub use static_token::StaticToken;
