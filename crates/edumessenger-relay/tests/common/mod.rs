// Copyright 2024-Present eduMessenger. https://edumessenger.org/
// SPDX-License-Identifier: Apache-2.0

pub mod helpers;
pub mod mocks;
