// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: backend client, media and report files.

pub mod api;
pub mod media;
pub mod serialization;
