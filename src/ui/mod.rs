// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the AdPlace client.

pub mod canvas;
pub mod gallery;
pub mod notifications;
pub mod overlay;
pub mod render;
pub mod results;
pub mod toolbar;
