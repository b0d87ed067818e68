// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: selection, ad region, tasks and reports.

pub mod ad_type;
pub mod region;
pub mod report;
pub mod selection;
pub mod task;
