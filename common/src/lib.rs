// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

pub mod config;
pub mod display;
pub mod refresher;
pub mod sensor;
